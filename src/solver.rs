use std::fmt;
use std::time::{Duration, Instant};

use good_lp::{default_solver, ResolutionError, SolverModel};
use log::{debug, info};

use crate::models::replenishment::model::{ReplenishmentModel, VariableValues};
use crate::models::replenishment::sets_and_parameters::{Parameters, Sets};

/// Outcome classification of one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The engine certified an optimal solution
    Optimal,
    /// No assignment satisfies the constraints
    Infeasible,
    /// The objective can be improved without bound
    Unbounded,
    /// The time budget elapsed before optimality was certified; the best
    /// plan found is still reported
    TimedOut,
    /// The engine reported a condition outside the above
    Undefined,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::Unbounded => write!(f, "Unbounded"),
            SolveStatus::TimedOut => write!(f, "Timed out"),
            SolveStatus::Undefined => write!(f, "Undefined"),
        }
    }
}

/// Configuration passed through to the engine for a single solve.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Time budget in seconds
    pub time_limit: f64,
    /// Mirror engine diagnostics to the log as they are produced
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            time_limit: 60.0,
            verbose: false,
        }
    }
}

/// Everything one solve call produces. Statuses are values, never faults:
/// reporting proceeds with whatever is here.
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Objective value; absent unless a solution was found
    pub objective: Option<f64>,
    /// Variable values; present on optimal and timed-out outcomes, absent
    /// on infeasible/unbounded/undefined ones
    pub values: Option<VariableValues>,
    /// Raw engine diagnostics, line by line
    pub log: Vec<String>,
    /// Wall-clock time of the solve call
    pub duration: Duration,
    /// The time budget the solve was given
    pub time_limit: f64,
}

/// Submits a built model to the engine and retrieves status, objective,
/// variable values and diagnostic text. Owns no state across invocations.
pub fn solve(
    model: ReplenishmentModel,
    sets: &Sets,
    parameters: &Parameters,
    config: &SolverConfig,
) -> SolveOutcome {
    let ReplenishmentModel {
        variables,
        objective,
        constraints,
        vars,
        stats,
    } = model;

    let mut log = Vec::new();
    let mut push_line = |log: &mut Vec<String>, line: String| {
        if config.verbose {
            info!("{}", line);
        }
        log.push(line);
    };

    push_line(
        &mut log,
        format!(
            "Presolve: {} constraints, {} variables ({} binary)",
            stats.constraints,
            stats.continuous + stats.binary,
            stats.binary
        ),
    );

    debug!(
        "submitting model to engine with a {}s budget",
        config.time_limit
    );
    let start = Instant::now();
    let mut engine = variables.minimise(objective).using(default_solver);
    for constraint in constraints {
        engine = engine.with(constraint);
    }
    let result = engine.solve();
    let duration = start.elapsed();

    let (status, objective, values) = match result {
        Ok(solution) => {
            let values = VariableValues::new(&vars, &solution);
            let objective = values.total_cost(sets, parameters);
            if duration.as_secs_f64() > config.time_limit {
                push_line(
                    &mut log,
                    format!(
                        "Time limit of {}s exceeded after {:.3}s, best objective {:.6}",
                        config.time_limit,
                        duration.as_secs_f64(),
                        objective
                    ),
                );
                (SolveStatus::TimedOut, Some(objective), Some(values))
            } else {
                push_line(&mut log, format!("Optimal objective {:.6}", objective));
                (SolveStatus::Optimal, Some(objective), Some(values))
            }
        }
        Err(ResolutionError::Infeasible) => {
            push_line(&mut log, "Infeasible model".to_string());
            (SolveStatus::Infeasible, None, None)
        }
        Err(ResolutionError::Unbounded) => {
            push_line(&mut log, "Unbounded model".to_string());
            (SolveStatus::Unbounded, None, None)
        }
        Err(other) => {
            push_line(&mut log, format!("Engine error: {:?}", other));
            (SolveStatus::Undefined, None, None)
        }
    };

    info!("solve finished with status {} in {:?}", status, duration);

    SolveOutcome {
        status,
        objective,
        values,
        log,
        duration,
        time_limit: config.time_limit,
    }
}
