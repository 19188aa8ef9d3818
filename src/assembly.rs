//! Assembly of region-restricted forms into sparse matrices, vectors and scalars.
use crate::element::FiniteElement;
use crate::form::{BilinearForm, BilinearIntegrand, LinearForm};
use crate::partition::CellTagging;
use crate::quadrature::{self, Quadrature2d, QuadraturePair2d};
use crate::region::{RegionError, RegionRegistry, Selector, TagSet};
use crate::space::{FunctionSpace, SpaceSignature};
use itertools::izip;
use log::debug;
use nalgebra::{DMatrix, DVector, DVectorView, Matrix2xX, MatrixView2xX, Point2, Vector2};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// A form or field was built over a different function space than the assembler's.
    SpaceMismatch {
        expected: SpaceSignature,
        actual: SpaceSignature,
    },
    /// The cell tagging does not have one entry per mesh cell.
    TaggingMismatch { num_cells: usize, num_tags: usize },
    Region(RegionError),
    NonFiniteCoefficient { cell_index: usize },
    DegenerateCell { cell_index: usize },
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpaceMismatch { expected, actual } => {
                write!(f, "function space mismatch: expected {}, got {}", expected, actual)
            }
            Self::TaggingMismatch { num_cells, num_tags } => write!(
                f,
                "cell tagging has {} entries, but the mesh has {} cells",
                num_tags, num_cells
            ),
            Self::Region(err) => write!(f, "failed to resolve integration region: {}", err),
            Self::NonFiniteCoefficient { cell_index } => {
                write!(f, "coefficient is not finite in cell {}", cell_index)
            }
            Self::DegenerateCell { cell_index } => write!(f, "cell {} is degenerate", cell_index),
        }
    }
}

impl Error for AssemblyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Region(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegionError> for AssemblyError {
    fn from(err: RegionError) -> Self {
        Self::Region(err)
    }
}

/// Basis function values and physical gradients at the quadrature points of a single cell.
///
/// Values for quadrature point `q` occupy entries `q * n..(q + 1) * n` of `basis` and the same
/// columns of `gradients`, with `n` the number of nodes of the cell.
#[derive(Debug)]
struct CellBuffer {
    num_nodes: usize,
    weights: Vec<f64>,
    points: Vec<Point2<f64>>,
    basis: DVector<f64>,
    gradients: Matrix2xX<f64>,
    reference_gradients: Vec<Vector2<f64>>,
}

impl Default for CellBuffer {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            weights: Vec::new(),
            points: Vec::new(),
            basis: DVector::zeros(0),
            gradients: Matrix2xX::zeros(0),
            reference_gradients: Vec::new(),
        }
    }
}

impl CellBuffer {
    fn resize(&mut self, num_nodes: usize, num_points: usize) {
        self.num_nodes = num_nodes;
        self.weights.resize(num_points, 0.0);
        self.points.resize(num_points, Point2::origin());
        let len = num_points * num_nodes;
        if self.basis.len() != len {
            self.basis = DVector::zeros(len);
            self.gradients = Matrix2xX::zeros(len);
        }
        self.reference_gradients.resize(num_nodes, Vector2::zeros());
    }

    fn num_points(&self) -> usize {
        self.weights.len()
    }

    fn basis(&self, q: usize) -> DVectorView<'_, f64> {
        let n = self.num_nodes;
        self.basis.rows(q * n, n)
    }

    /// Physical gradients of all basis functions at point `q`, one per column.
    fn gradients(&self, q: usize) -> MatrixView2xX<'_, f64> {
        let n = self.num_nodes;
        self.gradients.columns(q * n, n)
    }
}

/// Assembles forms over a function space whose cells are tagged into regions.
///
/// Each term of a form only receives contributions from the cells selected by its measure.
/// Terms are assembled independently, so a cell covered by several terms contributes to
/// each of them.
#[derive(Debug)]
pub struct SystemAssembler<'a> {
    space: &'a FunctionSpace,
    tagging: &'a CellTagging,
    regions: &'a RegionRegistry,
    quadrature: QuadraturePair2d,
}

impl<'a> SystemAssembler<'a> {
    /// Creates an assembler using a strength 4 quadrature, which is exact for the
    /// mass matrix of quadratic elements.
    pub fn new(space: &'a FunctionSpace, tagging: &'a CellTagging, regions: &'a RegionRegistry) -> Self {
        Self {
            space,
            tagging,
            regions,
            quadrature: quadrature::tri_quadrature_strength_4(),
        }
    }

    pub fn with_quadrature(self, quadrature: QuadraturePair2d) -> Self {
        Self { quadrature, ..self }
    }

    pub fn space(&self) -> &'a FunctionSpace {
        self.space
    }

    pub fn tagging(&self) -> &'a CellTagging {
        self.tagging
    }

    pub fn regions(&self) -> &'a RegionRegistry {
        self.regions
    }

    fn check_consistency(&self, space: SpaceSignature) -> Result<(), AssemblyError> {
        let expected = self.space.signature();
        if space != expected {
            return Err(AssemblyError::SpaceMismatch {
                expected,
                actual: space,
            });
        }
        if self.tagging.len() != self.space.num_cells() {
            return Err(AssemblyError::TaggingMismatch {
                num_cells: self.space.num_cells(),
                num_tags: self.tagging.len(),
            });
        }
        Ok(())
    }

    fn cell_tag(&self, cell_index: usize) -> usize {
        self.tagging
            .tag(cell_index)
            .expect("Tagging length is checked before assembly")
    }

    fn prepare_cell(&self, cell_index: usize, buffer: &mut CellBuffer) -> Result<(), AssemblyError> {
        let element = self.space.element(cell_index);
        let n = element.num_nodes();
        let weights = self.quadrature.weights();
        let points = self.quadrature.points();
        buffer.resize(n, weights.len());

        for (q, (w, xi)) in izip!(weights, points).enumerate() {
            let j = element.reference_jacobian(xi);
            let j_det = j.determinant();
            let j_inv_t = j
                .try_inverse()
                .filter(|_| j_det != 0.0 && j_det.is_finite())
                .ok_or(AssemblyError::DegenerateCell { cell_index })?
                .transpose();

            buffer.weights[q] = w * j_det.abs();
            buffer.points[q] = element.map_reference_coords(xi);
            element.populate_basis(&mut buffer.basis.as_mut_slice()[q * n..(q + 1) * n], xi);
            element.populate_reference_gradients(&mut buffer.reference_gradients, xi);
            for (i, reference_gradient) in buffer.reference_gradients.iter().enumerate() {
                buffer
                    .gradients
                    .set_column(q * n + i, &(j_inv_t * reference_gradient));
            }
        }
        Ok(())
    }

    fn resolve<'s>(&self, selectors: impl Iterator<Item = &'s Selector>) -> Result<Vec<TagSet>, AssemblyError> {
        selectors
            .map(|selector| self.regions.lookup(selector).map_err(AssemblyError::from))
            .collect()
    }

    /// Assembles the matrix `A_ij = a(φ_j, φ_i)`.
    pub fn assemble_matrix(&self, form: &BilinearForm) -> Result<CsrMatrix<f64>, AssemblyError> {
        self.check_consistency(form.space())?;
        let tag_sets = self.resolve(form.terms().iter().map(|term| term.measure.selector()))?;

        let num_dofs = self.space.num_dofs();
        let n = self.space.nodes_per_cell();
        let mut coo = CooMatrix::new(num_dofs, num_dofs);
        let mut buffer = CellBuffer::default();
        let mut local = DMatrix::zeros(n, n);

        for cell_index in 0..self.space.num_cells() {
            let tag = self.cell_tag(cell_index);
            if !tag_sets.iter().any(|tags| tags.contains(tag)) {
                continue;
            }

            self.prepare_cell(cell_index, &mut buffer)?;
            local.fill(0.0);

            for (term, tags) in izip!(form.terms(), &tag_sets) {
                if !tags.contains(tag) {
                    continue;
                }
                for q in 0..buffer.num_points() {
                    let c = term.coefficient.evaluate(&buffer.points[q]);
                    if !c.is_finite() {
                        return Err(AssemblyError::NonFiniteCoefficient { cell_index });
                    }
                    let w = buffer.weights[q] * c;
                    match term.integrand {
                        // local += w G^T G
                        BilinearIntegrand::GradDotGrad => {
                            let g = buffer.gradients(q);
                            local.gemm_tr(w, &g, &g, 1.0);
                        }
                        // local += w φ φ^T
                        BilinearIntegrand::Product => {
                            let phi = buffer.basis(q);
                            local.ger(w, &phi, &phi, 1.0);
                        }
                    }
                }
            }

            let dofs = self.space.cell_dofs(cell_index);
            for (i, &row) in dofs.iter().enumerate() {
                for (j, &col) in dofs.iter().enumerate() {
                    coo.push(row, col, local[(i, j)]);
                }
            }
        }

        let matrix = CsrMatrix::from(&coo);
        debug!(
            "Assembled {}x{} matrix with {} non-zeros from {} terms",
            matrix.nrows(),
            matrix.ncols(),
            matrix.nnz(),
            form.terms().len()
        );
        Ok(matrix)
    }

    /// Assembles the vector `b_i = L(φ_i)`.
    pub fn assemble_vector(&self, form: &LinearForm) -> Result<DVector<f64>, AssemblyError> {
        self.check_consistency(form.space())?;
        let tag_sets = self.resolve(form.terms().iter().map(|term| term.measure.selector()))?;

        let mut b = DVector::zeros(self.space.num_dofs());
        let mut buffer = CellBuffer::default();

        for cell_index in 0..self.space.num_cells() {
            let tag = self.cell_tag(cell_index);
            if !tag_sets.iter().any(|tags| tags.contains(tag)) {
                continue;
            }

            self.prepare_cell(cell_index, &mut buffer)?;
            let dofs = self.space.cell_dofs(cell_index);

            for (term, tags) in izip!(form.terms(), &tag_sets) {
                if !tags.contains(tag) {
                    continue;
                }
                for q in 0..buffer.num_points() {
                    let c = term.coefficient.evaluate(&buffer.points[q]);
                    if !c.is_finite() {
                        return Err(AssemblyError::NonFiniteCoefficient { cell_index });
                    }
                    let w = buffer.weights[q] * c;
                    for (&dof, phi_i) in izip!(dofs, buffer.basis(q).iter()) {
                        b[dof] += w * phi_i;
                    }
                }
            }
        }

        debug!("Assembled vector of length {} from {} terms", b.len(), form.terms().len());
        Ok(b)
    }

    /// Computes `∫ u dx(selector)` for the function with nodal coefficients `u`.
    pub fn assemble_integral(
        &self,
        space: SpaceSignature,
        u: &DVector<f64>,
        selector: &Selector,
    ) -> Result<f64, AssemblyError> {
        self.check_consistency(space)?;
        let tags = self.regions.lookup(selector)?;
        let mut buffer = CellBuffer::default();
        let mut integral = 0.0;

        for cell_index in 0..self.space.num_cells() {
            if !tags.contains(self.cell_tag(cell_index)) {
                continue;
            }
            self.prepare_cell(cell_index, &mut buffer)?;
            let dofs = self.space.cell_dofs(cell_index);
            let u_local = DVector::from_iterator(dofs.len(), dofs.iter().map(|&dof| u[dof]));
            for q in 0..buffer.num_points() {
                let u_q = buffer.basis(q).dot(&u_local);
                integral += buffer.weights[q] * u_q;
            }
        }
        Ok(integral)
    }

    /// Computes `b_i = ∫ ∂u/∂x_k φ_i dx` over the whole domain for both components `k`.
    ///
    /// These are the right-hand sides of the L2 projection of the gradient of `u`.
    pub fn assemble_gradient_load(
        &self,
        space: SpaceSignature,
        u: &DVector<f64>,
    ) -> Result<[DVector<f64>; 2], AssemblyError> {
        self.check_consistency(space)?;
        let num_dofs = self.space.num_dofs();
        let mut b = [DVector::zeros(num_dofs), DVector::zeros(num_dofs)];
        let mut buffer = CellBuffer::default();

        for cell_index in 0..self.space.num_cells() {
            self.prepare_cell(cell_index, &mut buffer)?;
            let dofs = self.space.cell_dofs(cell_index);
            let u_local = DVector::from_iterator(dofs.len(), dofs.iter().map(|&dof| u[dof]));
            for q in 0..buffer.num_points() {
                let grad_u: Vector2<f64> = buffer.gradients(q) * &u_local;
                let w = buffer.weights[q];
                for (&dof, phi_i) in izip!(dofs, buffer.basis(q).iter()) {
                    b[0][dof] += w * grad_u.x * phi_i;
                    b[1][dof] += w * grad_u.y * phi_i;
                }
            }
        }
        Ok(b)
    }
}
