//! The overlapping regions problem, from mesh generation to reported integrals.
//!
//! The unit square is split into Left (`x < 0.3`, tag 1), Mid (`0.3 <= x <= 0.7`, tag 2) and
//! Right (`x > 0.7`, tag 3). The overlapping regions LeftAndMid, Mid and RightAndMid group
//! these tags, and the source term of the problem is scoped to them.
use crate::assembly::SystemAssembler;
use crate::config::OverlappingRegionsConfig;
use crate::field::{SolutionField, VectorField};
use crate::form::{dx, BilinearForm, Coefficient, LinearForm, Measure};
use crate::mesh::procedural::create_unit_square_uniform_tri_mesh_2d;
use crate::partition::{left_mid_right_predicates, mark_cells};
use crate::region::{NamedRegion, RegionError, RegionRegistry, Selector};
use crate::report::{RegionIntegral, ResultReporter, Visualizer};
use crate::solve::{self, LinearSolver};
use crate::space::FunctionSpace;
use eyre::WrapErr;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;

pub const DOMAIN_NAME: &str = "MyDomain";
pub const LEFT_AND_MID: &str = "LeftAndMid";
pub const MID: &str = "Mid";
pub const RIGHT_AND_MID: &str = "RightAndMid";

/// The registered regions of the problem.
#[derive(Debug, Clone)]
pub struct OverlappingRegions {
    pub registry: RegionRegistry,
    pub left_and_mid: NamedRegion,
    pub mid: NamedRegion,
    pub right_and_mid: NamedRegion,
}

impl OverlappingRegions {
    pub fn new() -> Result<Self, RegionError> {
        let mut registry = RegionRegistry::with_domain_name(DOMAIN_NAME);
        let left_and_mid = registry.register(LEFT_AND_MID, [1, 2])?;
        let mid = registry.register(MID, [2])?;
        let right_and_mid = registry.register(RIGHT_AND_MID, [2, 3])?;
        Ok(Self {
            registry,
            left_and_mid,
            mid,
            right_and_mid,
        })
    }

    /// The selectors whose integrals are reported: the tags 0 to 3, the three regions and
    /// the whole domain.
    pub fn report_selectors(&self) -> Vec<Selector> {
        vec![
            Selector::Tag(0),
            Selector::Tag(1),
            Selector::Tag(2),
            Selector::Tag(3),
            Selector::from(&self.right_and_mid),
            Selector::from(&self.left_and_mid),
            Selector::from(&self.mid),
            Selector::Everywhere,
        ]
    }
}

/// Builds `a(u, v) = α ∇u·∇v dx + u v dx` and
/// `L(v) = f v dx(RightAndMid) + g v dx(LeftAndMid) - (f+g)/2 v dx(Mid)`.
pub fn overlapping_regions_forms(
    space: &FunctionSpace,
    config: &OverlappingRegionsConfig,
    regions: &OverlappingRegions,
) -> (BilinearForm, LinearForm) {
    let alpha = Coefficient::constant(config.alpha);
    let f = Coefficient::constant(config.f);
    let g = Coefficient::constant(config.g);

    let a = BilinearForm::new(space)
        .with_grad_dot_grad(alpha, Measure::everywhere())
        .with_product(1.0, Measure::everywhere());
    let l = LinearForm::new(space)
        .with_source(f.clone(), dx(&regions.right_and_mid))
        .with_source(g.clone(), dx(&regions.left_and_mid))
        .with_source(-((f + g) / 2.0), dx(&regions.mid));
    (a, l)
}

#[derive(Debug, Clone)]
pub struct OverlappingRegionsReport {
    pub integrals: Vec<RegionIntegral>,
    pub solution: SolutionField,
    pub gradient: VectorField,
    /// Number of cells per tag.
    pub tag_counts: BTreeMap<usize, usize>,
}

impl fmt::Display for OverlappingRegionsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for integral in &self.integrals {
            writeln!(f, "{}", integral)?;
        }
        Ok(())
    }
}

/// Solves the overlapping regions problem and reports `∫ u dx(R)` for every reported selector.
///
/// The solution and its projected gradient are handed to the visualizer before returning.
pub fn run_overlapping_regions(
    config: &OverlappingRegionsConfig,
    solver: &impl LinearSolver,
    visualizer: &mut dyn Visualizer,
) -> eyre::Result<OverlappingRegionsReport> {
    config.validate().wrap_err("invalid configuration")?;

    let n = config.mesh_resolution;
    let mesh = create_unit_square_uniform_tri_mesh_2d(n, n, config.diagonal);
    info!("Created {}x{} unit square mesh with {} cells", n, n, mesh.num_cells());

    let tagging = mark_cells(&mesh, &left_mid_right_predicates(), config.marking_rule);
    let tag_counts = tagging.histogram();
    info!("Tagged cells");
    debug!("Cells per tag: {:?}", tag_counts);

    let regions = OverlappingRegions::new().wrap_err("failed to register regions")?;
    info!("Registered {} regions", regions.registry.len());

    let space = FunctionSpace::new(mesh, config.polynomial_degree).wrap_err("failed to create function space")?;
    debug!("Function space has {} dofs", space.num_dofs());

    let (a, l) = overlapping_regions_forms(&space, config, &regions);
    debug!("a(u, v) = {}", a);
    debug!("L(v) = {}", l);

    let assembler = SystemAssembler::new(&space, &tagging, &regions.registry);
    let u = solve::solve(&a, &l, &assembler, solver).wrap_err("failed to solve variational problem")?;
    info!("Solved variational problem");

    let reporter = ResultReporter::new(&assembler);
    let integrals = reporter
        .report(&u, &regions.report_selectors())
        .wrap_err("failed to integrate solution")?;
    let gradient = reporter
        .project_gradient(&u, solver)
        .wrap_err("failed to project gradient")?;
    info!("Evaluated {} region integrals", integrals.len());

    reporter
        .display(&u, &gradient, visualizer)
        .wrap_err("failed to display solution")?;

    Ok(OverlappingRegionsReport {
        integrals,
        solution: u,
        gradient,
        tag_counts,
    })
}
