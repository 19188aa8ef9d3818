use eyre::WrapErr;
use regionfem::config::OverlappingRegionsConfig;
use regionfem::io::vtk::VtkVisualizer;
use regionfem::pipeline::run_overlapping_regions;
use regionfem::report::{NullVisualizer, Visualizer};
use regionfem::solve::ConjugateGradientSolver;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "overlapping_regions",
    about = "Solves a problem whose source term is restricted to overlapping regions of the unit square"
)]
struct Options {
    /// JSON file with problem parameters. Missing fields take their default values.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Write the solution and its gradient as VTK files to this directory.
    #[structopt(long, parse(from_os_str))]
    vtk_dir: Option<PathBuf>,
}

fn load_config(path: &PathBuf) -> eyre::Result<OverlappingRegionsConfig> {
    let file = File::open(path).wrap_err_with(|| format!("failed to open config file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("failed to parse config file {}", path.display()))
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    let options = Options::from_args();

    let config = match &options.config {
        Some(path) => load_config(path)?,
        None => OverlappingRegionsConfig::default(),
    };
    let solver = ConjugateGradientSolver::new(config.linear_solver);

    let mut visualizer: Box<dyn Visualizer> = match options.vtk_dir {
        Some(dir) => Box::new(VtkVisualizer::new(dir)),
        None => Box::new(NullVisualizer),
    };

    let report = run_overlapping_regions(&config, &solver, visualizer.as_mut())?;
    print!("{}", report);
    Ok(())
}
