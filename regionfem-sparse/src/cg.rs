use core::fmt;
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use nalgebra_sparse::ops::serial::spmm_csr_dense;
use nalgebra_sparse::ops::Op;
use nalgebra_sparse::CsrMatrix;
use num::Zero;
use std::error::Error;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

/// An operator `x -> y = A x` acting on dense vectors.
pub trait LinearOperator<T: Scalar> {
    fn apply(&self, y: &mut DVector<T>, x: &DVector<T>) -> Result<(), Box<dyn Error + Send + Sync>>;
}

impl<'a, T, A> LinearOperator<T> for &'a A
where
    T: Scalar,
    A: ?Sized + LinearOperator<T>,
{
    fn apply(&self, y: &mut DVector<T>, x: &DVector<T>) -> Result<(), Box<dyn Error + Send + Sync>> {
        <A as LinearOperator<T>>::apply(self, y, x)
    }
}

/// Returned by operators when the vectors they are applied to have incompatible dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDimensionMismatch {
    pub operator_shape: (usize, usize),
    pub x_len: usize,
    pub y_len: usize,
}

impl fmt::Display for OperatorDimensionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nrows, ncols) = self.operator_shape;
        write!(
            f,
            "cannot apply {}x{} operator to vector of length {} (output length {})",
            nrows, ncols, self.x_len, self.y_len
        )
    }
}

impl Error for OperatorDimensionMismatch {}

fn check_dimensions(shape: (usize, usize), x_len: usize, y_len: usize) -> Result<(), Box<dyn Error + Send + Sync>> {
    if shape.1 != x_len || shape.0 != y_len {
        Err(Box::new(OperatorDimensionMismatch {
            operator_shape: shape,
            x_len,
            y_len,
        }))
    } else {
        Ok(())
    }
}

impl<T> LinearOperator<T> for DMatrix<T>
where
    T: RealField + Copy,
{
    fn apply(&self, y: &mut DVector<T>, x: &DVector<T>) -> Result<(), Box<dyn Error + Send + Sync>> {
        check_dimensions(self.shape(), x.len(), y.len())?;
        y.gemv(T::one(), self, x, T::zero());
        Ok(())
    }
}

impl<T> LinearOperator<T> for CsrMatrix<T>
where
    T: RealField + Copy,
{
    fn apply(&self, y: &mut DVector<T>, x: &DVector<T>) -> Result<(), Box<dyn Error + Send + Sync>> {
        check_dimensions((self.nrows(), self.ncols()), x.len(), y.len())?;
        spmm_csr_dense(T::zero(), &mut *y, T::one(), Op::NoOp(self), Op::NoOp(x));
        Ok(())
    }
}

pub struct IdentityOperator;

impl<T: Scalar> LinearOperator<T> for IdentityOperator {
    fn apply(&self, y: &mut DVector<T>, x: &DVector<T>) -> Result<(), Box<dyn Error + Send + Sync>> {
        check_dimensions((x.len(), x.len()), x.len(), y.len())?;
        y.copy_from(x);
        Ok(())
    }
}

/// The diagonal entry of the given row is missing, zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonPositiveDiagonal {
    pub row: usize,
}

impl fmt::Display for NonPositiveDiagonal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagonal entry in row {} is not positive", self.row)
    }
}

impl Error for NonPositiveDiagonal {}

/// Diagonal (Jacobi) preconditioner `P = diag(A)^-1`.
#[derive(Debug, Clone)]
pub struct JacobiPreconditioner<T: Scalar> {
    inverse_diagonal: DVector<T>,
}

impl<T> JacobiPreconditioner<T>
where
    T: RealField + Copy,
{
    /// Builds the preconditioner from the diagonal of a square CSR matrix.
    ///
    /// Fails if any diagonal entry is not strictly positive, since the preconditioner
    /// would then not be positive definite.
    pub fn from_csr(matrix: &CsrMatrix<T>) -> Result<Self, NonPositiveDiagonal> {
        assert_eq!(matrix.nrows(), matrix.ncols(), "Matrix must be square.");
        let mut inverse_diagonal = DVector::zeros(matrix.nrows());
        for (i, row) in matrix.row_iter().enumerate() {
            let diagonal_entry = row
                .col_indices()
                .iter()
                .zip(row.values())
                .find(|&(&j, _)| j == i)
                .map(|(_, &a_ii)| a_ii)
                .unwrap_or_else(T::zero);
            if diagonal_entry <= T::zero() {
                return Err(NonPositiveDiagonal { row: i });
            }
            inverse_diagonal[i] = T::one() / diagonal_entry;
        }
        Ok(Self { inverse_diagonal })
    }

    pub fn inverse_diagonal(&self) -> &DVector<T> {
        &self.inverse_diagonal
    }
}

impl<T> LinearOperator<T> for JacobiPreconditioner<T>
where
    T: RealField + Copy,
{
    fn apply(&self, y: &mut DVector<T>, x: &DVector<T>) -> Result<(), Box<dyn Error + Send + Sync>> {
        let n = self.inverse_diagonal.len();
        check_dimensions((n, n), x.len(), y.len())?;
        y.copy_from(x);
        y.component_mul_assign(&self.inverse_diagonal);
        Ok(())
    }
}

pub trait CgStoppingCriterion<T: Scalar> {
    fn has_converged(&self, b_norm: T, iteration: usize, approx_residual: &DVector<T>) -> bool;
}

/// Relative residual tolerance ||r|| <= tol * ||b||.
///
/// Note that we use the *approximate* residual given by Conjugate-Gradient. For ill-conditioned
/// problems, it is possible that CG's residual converges, but the real residual does not.
#[derive(Debug, Clone, Copy)]
pub struct RelativeResidualCriterion<T: Scalar> {
    tol: T,
}

impl<T: Scalar + Zero> RelativeResidualCriterion<T> {
    pub fn new(tol: T) -> Self {
        Self { tol }
    }
}

impl Default for RelativeResidualCriterion<f64> {
    fn default() -> Self {
        Self::new(1e-8)
    }
}

impl Default for RelativeResidualCriterion<f32> {
    fn default() -> Self {
        Self::new(1e-4)
    }
}

impl<T> CgStoppingCriterion<T> for RelativeResidualCriterion<T>
where
    T: RealField + Copy,
{
    fn has_converged(&self, b_norm: T, _iteration: usize, approx_residual: &DVector<T>) -> bool {
        approx_residual.norm() <= self.tol * b_norm
    }
}

#[derive(Debug, Clone)]
#[allow(non_snake_case)]
pub struct CgWorkspace<T: Scalar> {
    r: DVector<T>,
    z: DVector<T>,
    p: DVector<T>,
    Ap: DVector<T>,
}

#[allow(non_snake_case)]
struct Buffers<'a, T: Scalar> {
    r: &'a mut DVector<T>,
    z: &'a mut DVector<T>,
    p: &'a mut DVector<T>,
    Ap: &'a mut DVector<T>,
}

impl<T: Scalar + Zero> Default for CgWorkspace<T> {
    fn default() -> Self {
        Self {
            r: DVector::zeros(0),
            z: DVector::zeros(0),
            p: DVector::zeros(0),
            Ap: DVector::zeros(0),
        }
    }
}

impl<T: Scalar + Zero> CgWorkspace<T> {
    fn prepare_buffers(&mut self, dim: usize) -> Buffers<T> {
        self.r.resize_vertically_mut(dim, T::zero());
        self.z.resize_vertically_mut(dim, T::zero());
        self.p.resize_vertically_mut(dim, T::zero());
        self.Ap.resize_vertically_mut(dim, T::zero());
        Buffers {
            r: &mut self.r,
            z: &mut self.z,
            p: &mut self.p,
            Ap: &mut self.Ap,
        }
    }
}

#[derive(Debug)]
enum OwnedOrMutRef<'a, T> {
    Owned(T),
    MutRef(&'a mut T),
}

impl<'a, T> Deref for OwnedOrMutRef<'a, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Owned(owned) => owned,
            Self::MutRef(mutref) => mutref,
        }
    }
}

impl<'a, T> DerefMut for OwnedOrMutRef<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Self::Owned(owned) => owned,
            Self::MutRef(mutref) => mutref,
        }
    }
}

#[derive(Debug)]
pub struct ConjugateGradient<'a, T, A, P, Criterion>
where
    T: Scalar,
{
    workspace: OwnedOrMutRef<'a, CgWorkspace<T>>,
    operator: A,
    preconditioner: P,
    stopping_criterion: Criterion,
    max_iter: Option<usize>,
}

impl<'a, T: Scalar + Zero> ConjugateGradient<'a, T, (), IdentityOperator, ()> {
    pub fn new() -> Self {
        Self {
            workspace: OwnedOrMutRef::Owned(CgWorkspace::default()),
            operator: (),
            preconditioner: IdentityOperator,
            stopping_criterion: (),
            max_iter: None,
        }
    }
}

impl<'a, T: Scalar + Zero> Default for ConjugateGradient<'a, T, (), IdentityOperator, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Scalar> ConjugateGradient<'a, T, (), IdentityOperator, ()> {
    pub fn with_workspace(workspace: &'a mut CgWorkspace<T>) -> Self {
        Self {
            workspace: OwnedOrMutRef::MutRef(workspace),
            operator: (),
            preconditioner: IdentityOperator,
            stopping_criterion: (),
            max_iter: None,
        }
    }
}

impl<'a, T: Scalar, P, Criterion> ConjugateGradient<'a, T, (), P, Criterion> {
    pub fn with_operator<A>(self, operator: A) -> ConjugateGradient<'a, T, A, P, Criterion> {
        ConjugateGradient {
            workspace: self.workspace,
            operator,
            preconditioner: self.preconditioner,
            stopping_criterion: self.stopping_criterion,
            max_iter: self.max_iter,
        }
    }
}

impl<'a, T: Scalar, A, P, Criterion> ConjugateGradient<'a, T, A, P, Criterion> {
    pub fn with_preconditioner<P2>(self, preconditioner: P2) -> ConjugateGradient<'a, T, A, P2, Criterion> {
        ConjugateGradient {
            workspace: self.workspace,
            operator: self.operator,
            preconditioner,
            stopping_criterion: self.stopping_criterion,
            max_iter: self.max_iter,
        }
    }

    pub fn with_max_iter(self, max_iter: usize) -> Self {
        Self {
            max_iter: Some(max_iter),
            ..self
        }
    }
}

impl<'a, T: Scalar, A, P> ConjugateGradient<'a, T, A, P, ()> {
    pub fn with_stopping_criterion<Criterion>(
        self,
        stopping_criterion: Criterion,
    ) -> ConjugateGradient<'a, T, A, P, Criterion> {
        ConjugateGradient {
            workspace: self.workspace,
            operator: self.operator,
            preconditioner: self.preconditioner,
            stopping_criterion,
            max_iter: self.max_iter,
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum SolveErrorKind {
    OperatorError(Box<dyn Error + Send + Sync>),
    PreconditionerError(Box<dyn Error + Send + Sync>),
    IndefiniteOperator,
    IndefinitePreconditioner,
    MaxIterationsReached { max_iter: usize },
}

impl fmt::Display for SolveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OperatorError(err) => write!(f, "Error applying operator: {}", err),
            Self::PreconditionerError(err) => write!(f, "Error applying preconditioner: {}", err),
            Self::IndefiniteOperator => write!(f, "Operator appears to be indefinite"),
            Self::IndefinitePreconditioner => write!(f, "Indefinite preconditioner"),
            Self::MaxIterationsReached { max_iter } => {
                write!(f, "Max iterations ({}) reached", max_iter)
            }
        }
    }
}

#[non_exhaustive]
#[derive(Debug)]
pub struct SolveError<T> {
    pub output: CgOutput<T>,
    pub kind: SolveErrorKind,
}

impl<T> SolveError<T> {
    fn new(output: CgOutput<T>, kind: SolveErrorKind) -> Self {
        Self { output, kind }
    }
}

impl<T> fmt::Display for SolveError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CG solve failed after {} iterations. Error: {}",
            self.output.num_iterations, self.kind
        )
    }
}

impl<T: fmt::Debug> Error for SolveError<T> {}

#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct CgOutput<T> {
    /// Number of iterations of the solver.
    ///
    /// Corresponds to the number of updates made to the (initial) solution vector,
    pub num_iterations: usize,
    marker: PhantomData<T>,
}

impl<'a, T, A, P, Criterion> ConjugateGradient<'a, T, A, P, Criterion>
where
    T: RealField + Copy,
    A: LinearOperator<T>,
    P: LinearOperator<T>,
    Criterion: CgStoppingCriterion<T>,
{
    /// Solves `A x = b`, using the contents of `x` as the initial guess.
    ///
    /// # Panics
    ///
    /// Panics if `b` and `x` have different lengths.
    #[allow(non_snake_case)]
    pub fn solve_with_guess(&mut self, b: &DVector<T>, x: &mut DVector<T>) -> Result<CgOutput<T>, SolveError<T>> {
        use SolveErrorKind::*;
        assert_eq!(b.len(), x.len());

        let mut output = CgOutput {
            num_iterations: 0,
            marker: PhantomData,
        };

        let Buffers { r, z, p, Ap } = self.workspace.prepare_buffers(x.len());

        // r = b - Ax
        if let Err(err) = self.operator.apply(r, x) {
            return Err(SolveError::new(output, OperatorError(err)));
        }
        r.axpy(T::one(), b, -T::one());

        // z = Pr
        if let Err(err) = self.preconditioner.apply(z, r) {
            return Err(SolveError::new(output, PreconditionerError(err)));
        }

        // p = z
        p.copy_from(z);

        let mut zTr = z.dot(r);

        let b_norm = b.norm();

        if b_norm == T::zero() {
            x.fill(T::zero());
            return Ok(output);
        }

        loop {
            if self
                .stopping_criterion
                .has_converged(b_norm, output.num_iterations, r)
            {
                break;
            } else if let Some(max_iter) = self.max_iter {
                if output.num_iterations >= max_iter {
                    return Err(SolveError::new(output, MaxIterationsReached { max_iter }));
                }
            }

            // Ap = A * p
            if let Err(err) = self.operator.apply(Ap, p) {
                return Err(SolveError::new(output, OperatorError(err)));
            }
            let pAp = p.dot(Ap);

            if pAp <= T::zero() {
                return Err(SolveError::new(output, IndefiniteOperator));
            }
            if zTr <= T::zero() {
                return Err(SolveError::new(output, IndefinitePreconditioner));
            }

            let alpha = zTr / pAp;
            // x <- x + alpha * p
            x.axpy(alpha, p, T::one());
            // r <- r - alpha * Ap
            r.axpy(-alpha, Ap, T::one());

            // Number of iterations corresponds to number of updates to the x vector
            output.num_iterations += 1;

            // z <- P r
            if let Err(err) = self.preconditioner.apply(z, r) {
                return Err(SolveError::new(output, PreconditionerError(err)));
            }
            let zTr_next = z.dot(r);
            let beta = zTr_next / zTr;

            // p <- z + beta * p
            p.axpy(T::one(), z, beta);

            zTr = zTr_next;
        }

        Ok(output)
    }
}
