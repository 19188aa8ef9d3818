//! Evaluation of region integrals of a solution and hand-off to visualization.
use crate::assembly::{AssemblyError, SystemAssembler};
use crate::field::{self, SolutionField, VectorField};
use crate::partition::CellTagging;
use crate::region::Selector;
use crate::solve::{LinearSolver, SolveError};
use crate::space::FunctionSpace;
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value of `∫ u dx(label)`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegionIntegral {
    pub label: String,
    pub value: f64,
}

impl fmt::Display for RegionIntegral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\int u dx({}) = {}", self.label, self.value)
    }
}

/// Receives fields for display.
///
/// `interactive` is called once after all fields have been plotted.
pub trait Visualizer {
    fn plot_scalar(
        &mut self,
        space: &FunctionSpace,
        tagging: &CellTagging,
        field: &SolutionField,
        title: &str,
    ) -> eyre::Result<()>;

    fn plot_vector(
        &mut self,
        space: &FunctionSpace,
        tagging: &CellTagging,
        field: &VectorField,
        title: &str,
    ) -> eyre::Result<()>;

    fn interactive(&mut self) -> eyre::Result<()>;
}

/// Discards everything it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisualizer;

impl Visualizer for NullVisualizer {
    fn plot_scalar(&mut self, _: &FunctionSpace, _: &CellTagging, _: &SolutionField, _: &str) -> eyre::Result<()> {
        Ok(())
    }

    fn plot_vector(&mut self, _: &FunctionSpace, _: &CellTagging, _: &VectorField, _: &str) -> eyre::Result<()> {
        Ok(())
    }

    fn interactive(&mut self) -> eyre::Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct ResultReporter<'a> {
    assembler: &'a SystemAssembler<'a>,
}

impl<'a> ResultReporter<'a> {
    pub fn new(assembler: &'a SystemAssembler<'a>) -> Self {
        Self { assembler }
    }

    /// Computes `∫ u dx(selector)`.
    pub fn integrate(&self, u: &SolutionField, selector: &Selector) -> Result<f64, AssemblyError> {
        self.assembler
            .assemble_integral(u.space(), u.coefficients(), selector)
    }

    /// Integrates `u` over each selector independently, in the given order.
    pub fn report(&self, u: &SolutionField, selectors: &[Selector]) -> Result<Vec<RegionIntegral>, AssemblyError> {
        selectors
            .iter()
            .map(|selector| {
                let value = self.integrate(u, selector)?;
                let label = self.assembler.regions().label(selector);
                trace!("Integral of u over {} is {}", label, value);
                Ok(RegionIntegral { label, value })
            })
            .collect()
    }

    pub fn project_gradient(&self, u: &SolutionField, solver: &impl LinearSolver) -> Result<VectorField, SolveError> {
        field::project_gradient(u, self.assembler, solver)
    }

    /// Plots `u` and its gradient, then hands control to the visualizer.
    pub fn display(
        &self,
        u: &SolutionField,
        gradient: &VectorField,
        visualizer: &mut dyn Visualizer,
    ) -> eyre::Result<()> {
        let space = self.assembler.space();
        let tagging = self.assembler.tagging();
        visualizer.plot_scalar(space, tagging, u, "u")?;
        visualizer.plot_vector(space, tagging, gradient, "Projected grad(u)")?;
        visualizer.interactive()
    }
}
