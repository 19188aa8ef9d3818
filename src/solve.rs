//! Linear solvers and the driver that turns a pair of forms into a solution field.
use crate::assembly::{AssemblyError, SystemAssembler};
use crate::field::SolutionField;
use crate::form::{BilinearForm, LinearForm};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use regionfem_sparse::cg::{
    self, ConjugateGradient, JacobiPreconditioner, NonPositiveDiagonal, RelativeResidualCriterion,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Settings for iterative linear solvers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LinearSolverSettings {
    /// Relative residual tolerance `|r| <= tol * |b|`.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for LinearSolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 10_000,
        }
    }
}

#[derive(Debug)]
pub enum LinearSolveError {
    DimensionMismatch { nrows: usize, ncols: usize, rhs_len: usize },
    Cg(cg::SolveError<f64>),
    /// The system matrix is singular or not positive definite.
    NotPositiveDefinite,
    NonFiniteSolution,
}

impl fmt::Display for LinearSolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { nrows, ncols, rhs_len } => write!(
                f,
                "cannot solve {}x{} system with right-hand side of length {}",
                nrows, ncols, rhs_len
            ),
            Self::Cg(err) => write!(f, "{}", err),
            Self::NotPositiveDefinite => write!(f, "system matrix is not positive definite"),
            Self::NonFiniteSolution => write!(f, "solution contains non-finite values"),
        }
    }
}

impl Error for LinearSolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cg(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NonPositiveDiagonal> for LinearSolveError {
    fn from(_: NonPositiveDiagonal) -> Self {
        Self::NotPositiveDefinite
    }
}

/// Solves a sparse linear system `A x = b`.
pub trait LinearSolver {
    fn solve(&self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError>;
}

impl<'a, S: LinearSolver + ?Sized> LinearSolver for &'a S {
    fn solve(&self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        S::solve(self, matrix, rhs)
    }
}

fn check_dimensions(matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<(), LinearSolveError> {
    if matrix.nrows() != matrix.ncols() || matrix.nrows() != rhs.len() {
        return Err(LinearSolveError::DimensionMismatch {
            nrows: matrix.nrows(),
            ncols: matrix.ncols(),
            rhs_len: rhs.len(),
        });
    }
    Ok(())
}

fn check_finite(x: DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
    if x.iter().all(|x_i| x_i.is_finite()) {
        Ok(x)
    } else {
        Err(LinearSolveError::NonFiniteSolution)
    }
}

/// Jacobi-preconditioned conjugate gradient, for symmetric positive definite systems.
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradientSolver {
    settings: LinearSolverSettings,
}

impl ConjugateGradientSolver {
    pub fn new(settings: LinearSolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &LinearSolverSettings {
        &self.settings
    }
}

impl LinearSolver for ConjugateGradientSolver {
    fn solve(&self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        check_dimensions(matrix, rhs)?;
        let preconditioner = JacobiPreconditioner::from_csr(matrix)?;
        let mut x = DVector::zeros(rhs.len());
        let output = ConjugateGradient::new()
            .with_operator(matrix)
            .with_preconditioner(&preconditioner)
            .with_stopping_criterion(RelativeResidualCriterion::new(self.settings.tolerance))
            .with_max_iter(self.settings.max_iterations)
            .solve_with_guess(rhs, &mut x)
            .map_err(LinearSolveError::Cg)?;
        debug!("CG converged in {} iterations", output.num_iterations);
        check_finite(x)
    }
}

/// Direct solve by dense Cholesky factorization.
///
/// Only suitable for small systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseCholeskySolver;

impl LinearSolver for DenseCholeskySolver {
    fn solve(&self, matrix: &CsrMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, LinearSolveError> {
        check_dimensions(matrix, rhs)?;
        let dense = DMatrix::from(matrix);
        let cholesky = dense.cholesky().ok_or(LinearSolveError::NotPositiveDefinite)?;
        check_finite(cholesky.solve(rhs))
    }
}

#[derive(Debug)]
pub enum SolveError {
    Assembly(AssemblyError),
    LinearSolve(LinearSolveError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assembly(err) => write!(f, "assembly failed: {}", err),
            Self::LinearSolve(err) => write!(f, "linear solve failed: {}", err),
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Assembly(err) => Some(err),
            Self::LinearSolve(err) => Some(err),
        }
    }
}

impl From<AssemblyError> for SolveError {
    fn from(err: AssemblyError) -> Self {
        Self::Assembly(err)
    }
}

impl From<LinearSolveError> for SolveError {
    fn from(err: LinearSolveError) -> Self {
        Self::LinearSolve(err)
    }
}

/// Finds `u` such that `a(u, v) = L(v)` for all test functions `v`.
///
/// No boundary conditions are imposed, so `a` must be coercive on the whole space.
pub fn solve(
    a: &BilinearForm,
    l: &LinearForm,
    assembler: &SystemAssembler,
    solver: &impl LinearSolver,
) -> Result<SolutionField, SolveError> {
    let matrix = assembler.assemble_matrix(a)?;
    let rhs = assembler.assemble_vector(l)?;
    info!("Solving linear system with {} unknowns", rhs.len());
    let coefficients = solver.solve(&matrix, &rhs)?;
    Ok(SolutionField::new(assembler.space().signature(), coefficients))
}
