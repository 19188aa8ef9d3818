//! Sparse linear algebra used by `regionfem`.
//!
//! The only solver provided is a (preconditioned) Conjugate-Gradient method,
//! which is sufficient for the symmetric positive definite systems produced by
//! the elliptic forms assembled in `regionfem`.
pub mod cg;

pub extern crate nalgebra_sparse;
