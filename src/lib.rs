//! Finite element assembly of variational forms whose integrals are restricted to tagged,
//! possibly overlapping, regions of a triangulated domain.
pub mod assembly;
pub mod config;
pub mod connectivity;
pub mod element;
pub mod field;
pub mod form;
pub mod io;
pub mod mesh;
pub mod partition;
pub mod pipeline;
pub mod quadrature;
pub mod region;
pub mod report;
pub mod solve;
pub mod space;

pub mod procedural {
    pub use crate::mesh::procedural::*;
}

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;
pub extern crate vtkio;
