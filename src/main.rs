use clap::Parser;
use log::{error, info};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use tonnage_cvrp::checker::check_solution;
use tonnage_cvrp::config::Config;
use tonnage_cvrp::construction::Construction;
use tonnage_cvrp::error::SolverError;
use tonnage_cvrp::problem::Problem;
use tonnage_cvrp::report::save_report;
use tonnage_cvrp::Solver;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Instance file
    instance: PathBuf,

    /// Where the solution file is written
    #[arg(short, long, default_value = "solution.txt")]
    output: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    construction: Option<Construction>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    gls_iterations: Option<usize>,

    #[arg(long)]
    tabu_iterations: Option<usize>,

    /// Time limit per search phase, in seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Verify the written solution file against the instance
    #[arg(long)]
    check: bool,

    #[arg(short, long)]
    debug: bool,
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => Config::new(),
    };

    if let Some(construction) = cli.construction {
        config = config.with_construction(construction);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(iterations) = cli.gls_iterations {
        config = config.with_gls_iterations(iterations);
    }
    if let Some(iterations) = cli.tabu_iterations {
        config = config.with_tabu_iterations(iterations);
    }
    if let Some(seconds) = cli.time_limit {
        config = config.with_time_limit(Duration::from_secs(seconds));
    }

    Ok(config)
}

fn check(problem: &Problem, path: &Path) -> Result<(), Box<dyn Error>> {
    let report = check_solution(problem, BufReader::new(File::open(path)?))?;
    info!(
        "Solution file is valid: {} routes, total cost {:.4}",
        report.routes, report.total_cost
    );
    Ok(())
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    info!("Loading problem from: {}", cli.instance.display());
    let problem = Problem::from_file(&cli.instance)?;
    info!(
        "Loaded problem: {} with {} customers, total demand {:.2} (at least {} vehicles)",
        problem.name,
        problem.get_customer_count(),
        problem.total_demand(),
        (problem.total_demand() / problem.vehicle_capacity).ceil()
    );

    let config = load_config(cli)?;
    let mut solver = Solver::new(problem.clone(), config);
    let solution = solver.solve()?;

    let report = save_report(solution, &problem, &cli.output)?;
    info!(
        "Saved {} routes with tonnage cost {:.4} to {}",
        report.routes.len(),
        report.total_cost,
        cli.output.display()
    );
    info!("{}", solver.statistics.format());

    if cli.check {
        check(&problem, &cli.output)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(SolverError::Infeasible { customer }) = e.downcast_ref::<SolverError>() {
                error!("No feasible solution: customer {} does not fit any vehicle", customer);
            } else {
                error!("{}", e);
            }
            ExitCode::FAILURE
        }
    }
}
