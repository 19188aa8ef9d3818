use crate::assembly::SystemAssembler;
use crate::form::{BilinearForm, Measure};
use crate::solve::{LinearSolver, SolveError};
use crate::space::SpaceSignature;
use log::debug;
use nalgebra::{DVector, Vector2};

/// A scalar finite element function, stored as nodal coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionField {
    space: SpaceSignature,
    coefficients: DVector<f64>,
}

impl SolutionField {
    /// # Panics
    ///
    /// Panics if the number of coefficients does not match the number of dofs of the space.
    pub fn new(space: SpaceSignature, coefficients: DVector<f64>) -> Self {
        assert_eq!(
            space.num_dofs,
            coefficients.len(),
            "Number of coefficients must match number of dofs."
        );
        Self { space, coefficients }
    }

    pub fn space(&self) -> SpaceSignature {
        self.space
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coefficients
    }

    pub fn into_coefficients(self) -> DVector<f64> {
        self.coefficients
    }
}

/// A vector-valued field with one nodal coefficient vector per component.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    space: SpaceSignature,
    components: [DVector<f64>; 2],
}

impl VectorField {
    /// # Panics
    ///
    /// Panics if either component does not have one coefficient per dof.
    pub fn new(space: SpaceSignature, components: [DVector<f64>; 2]) -> Self {
        for component in &components {
            assert_eq!(space.num_dofs, component.len(), "Component length must match number of dofs.");
        }
        Self { space, components }
    }

    pub fn space(&self) -> SpaceSignature {
        self.space
    }

    pub fn component(&self, index: usize) -> &DVector<f64> {
        &self.components[index]
    }

    /// The value at the given dof.
    pub fn value(&self, dof: usize) -> Vector2<f64> {
        Vector2::new(self.components[0][dof], self.components[1][dof])
    }

    /// Node values as interleaved `[x0, y0, x1, y1, ...]`.
    pub fn interleaved(&self) -> Vec<f64> {
        self.components[0]
            .iter()
            .zip(self.components[1].iter())
            .flat_map(|(&x, &y)| [x, y])
            .collect()
    }
}

/// Computes the L2 projection of `∇u` onto the space of `u`, one component at a time.
///
/// Each component `w_k` satisfies `∫ w_k v dx = ∫ ∂u/∂x_k v dx` for every test function `v`.
pub fn project_gradient(
    u: &SolutionField,
    assembler: &SystemAssembler,
    solver: &impl LinearSolver,
) -> Result<VectorField, SolveError> {
    let mass_form = BilinearForm::for_signature(u.space()).with_product(1.0, Measure::everywhere());
    let mass = assembler.assemble_matrix(&mass_form)?;
    let [b_x, b_y] = assembler.assemble_gradient_load(u.space(), u.coefficients())?;
    let w_x = solver.solve(&mass, &b_x)?;
    let w_y = solver.solve(&mass, &b_y)?;
    debug!("Projected gradient onto {}", u.space());
    Ok(VectorField::new(u.space(), [w_x, w_y]))
}
