use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use spareflow::models::replenishment::model::ReplenishmentSolver;
use spareflow::problem::Problem;
use spareflow::report::{write_summary, LogDigest, PlanReport};
use spareflow::solver::SolverConfig;

/// Multi-period spare-parts distribution and replenishment planning.
#[derive(Parser)]
#[clap(name = "spareflow")]
struct Args {
    /// Path to a problem instance (JSON)
    instance: PathBuf,

    /// Solver time budget in seconds
    #[clap(long, default_value_t = 60.0)]
    time_limit: f64,

    /// Mirror engine diagnostics to the log
    #[clap(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let file = File::open(&args.instance)?;
    let problem: Problem = serde_json::from_reader(BufReader::new(file))?;
    info!(
        "loaded instance with {} bases, {} stations, {} parts, {} periods",
        problem.bases().len(),
        problem.stations().len(),
        problem.parts().len(),
        problem.periods()
    );

    let config = SolverConfig {
        time_limit: args.time_limit,
        verbose: args.verbose,
    };
    let outcome = ReplenishmentSolver::solve(&problem, &config);

    let digest = LogDigest::scan(&outcome.log);
    let report = outcome
        .values
        .as_ref()
        .map(|values| PlanReport::extract(&problem, values));

    let stdout = io::stdout();
    write_summary(&mut stdout.lock(), &outcome, &digest, report.as_ref())?;
    Ok(())
}
