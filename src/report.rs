use std::io::{self, Write};

use crate::models::replenishment::model::VariableValues;
use crate::problem::Problem;
use crate::solver::SolveOutcome;

/// Extracted quantities with magnitude at or below this are solver noise
/// and are suppressed from itemized reports.
pub const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub base: String,
    pub period: usize,
    pub part: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentRow {
    pub base: String,
    pub station: String,
    pub part: String,
    pub period: usize,
    pub truck: f64,
    pub air: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub base: String,
    pub part: String,
    pub period: usize,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortageRow {
    pub station: String,
    pub part: String,
    pub period: usize,
    pub quantity: f64,
}

/// The four itemized views of a solved plan. Rows below [`TOLERANCE`] are
/// dropped; each group may legitimately be empty.
#[derive(Debug, Default)]
pub struct PlanReport {
    pub orders: Vec<OrderRow>,
    pub shipments: Vec<ShipmentRow>,
    pub inventory: Vec<InventoryRow>,
    pub shortages: Vec<ShortageRow>,
}

impl PlanReport {
    pub fn extract(problem: &Problem, values: &VariableValues) -> PlanReport {
        let mut report = PlanReport::default();

        for (b, base) in problem.bases().iter().enumerate() {
            for t in 0..problem.periods() {
                for (p, part) in problem.parts().iter().enumerate() {
                    let quantity = values.order[b][p][t];
                    if quantity.abs() > TOLERANCE {
                        report.orders.push(OrderRow {
                            base: base.name().to_string(),
                            period: t + 1,
                            part: part.name().to_string(),
                            quantity,
                        });
                    }
                }
            }
        }

        for (b, base) in problem.bases().iter().enumerate() {
            for (s, station) in problem.stations().iter().enumerate() {
                for (p, part) in problem.parts().iter().enumerate() {
                    for t in 0..problem.periods() {
                        let truck = values.ship_truck[b][s][p][t];
                        let air = values.ship_air[b][s][p][t];
                        if truck.abs() > TOLERANCE || air.abs() > TOLERANCE {
                            report.shipments.push(ShipmentRow {
                                base: base.name().to_string(),
                                station: station.name().to_string(),
                                part: part.name().to_string(),
                                period: t + 1,
                                truck,
                                air,
                            });
                        }
                    }
                }
            }
        }

        for (b, base) in problem.bases().iter().enumerate() {
            for (p, part) in problem.parts().iter().enumerate() {
                for t in 0..problem.periods() {
                    let quantity = values.inventory[b][p][t];
                    if quantity.abs() > TOLERANCE {
                        report.inventory.push(InventoryRow {
                            base: base.name().to_string(),
                            part: part.name().to_string(),
                            period: t + 1,
                            quantity,
                        });
                    }
                }
            }
        }

        for (s, station) in problem.stations().iter().enumerate() {
            for (p, part) in problem.parts().iter().enumerate() {
                for t in 0..problem.periods() {
                    let quantity = values.shortage[s][p][t];
                    if quantity.abs() > TOLERANCE {
                        report.shortages.push(ShortageRow {
                            station: station.name().to_string(),
                            part: part.name().to_string(),
                            period: t + 1,
                            quantity,
                        });
                    }
                }
            }
        }

        report
    }
}

/// One objective trace line recovered from the engine log.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationLine {
    pub iteration: u64,
    pub objective: f64,
}

/// Fragments recovered from the raw engine log by best-effort line
/// scanning. Absence of any marker is a normal outcome, not an error.
#[derive(Debug, Default)]
pub struct LogDigest {
    /// First presolve summary line, if the engine printed one
    pub presolve: Option<String>,
    /// Lines whose leading token is an iteration count followed by an
    /// objective value
    pub iterations: Vec<IterationLine>,
    /// Last line announcing the final objective, if any
    pub final_line: Option<String>,
}

impl LogDigest {
    pub fn scan(lines: &[String]) -> LogDigest {
        let mut digest = LogDigest::default();

        for line in lines {
            if digest.presolve.is_none() && line.contains("Presolve") {
                digest.presolve = Some(line.clone());
            }
            if let Some(iteration) = parse_iteration_line(line) {
                digest.iterations.push(iteration);
            }
            if line.contains("Optimal") && line.contains("objective") {
                digest.final_line = Some(line.clone());
            }
        }

        digest
    }
}

/// Parses lines of the shape `<iteration> ... <objective> ...`, where the
/// first token is an integer and the objective is the first following token
/// that parses as a float. Returns `None` for anything else.
fn parse_iteration_line(line: &str) -> Option<IterationLine> {
    let mut tokens = line.split_whitespace();
    let iteration = tokens.next()?.parse::<u64>().ok()?;
    let objective = tokens.find_map(|token| token.parse::<f64>().ok())?;
    Some(IterationLine {
        iteration,
        objective,
    })
}

/// Renders solver diagnostics and the plan to `out` in a fixed section
/// order. `report` is absent when no variable values can be trusted.
pub fn write_summary<W: Write>(
    out: &mut W,
    outcome: &SolveOutcome,
    digest: &LogDigest,
    report: Option<&PlanReport>,
) -> io::Result<()> {
    writeln!(out, "--- Presolve / model stats ---")?;
    match &digest.presolve {
        Some(line) => writeln!(out, "{}", line)?,
        None => writeln!(out, "Presolve info not found in solver log.")?,
    }

    writeln!(out, "\n--- Iterations (parsed) ---")?;
    if digest.iterations.is_empty() {
        writeln!(out, "No iteration lines parsed from solver log.")?;
    } else {
        writeln!(out, "Iteration      Objective")?;
        for line in &digest.iterations {
            writeln!(out, "{:>9} {:>15.6}", line.iteration, line.objective)?;
        }
    }

    writeln!(out, "\n--- Final solver line ---")?;
    match &digest.final_line {
        Some(line) => writeln!(out, "{}", line)?,
        None => writeln!(out, "No explicit 'Optimal' line parsed.")?,
    }

    writeln!(
        out,
        "\nSolve time: {:.6} seconds (budget {} seconds)",
        outcome.duration.as_secs_f64(),
        outcome.time_limit
    )?;
    writeln!(out, "Status: {}", outcome.status)?;
    match outcome.objective {
        Some(objective) => writeln!(out, "Objective (total cost): {:.3}", objective)?,
        None => writeln!(out, "Objective: n/a")?,
    }

    let report = match report {
        Some(report) => report,
        None => return Ok(()),
    };

    writeln!(out, "\nOrders placed (order quantity arrives next period):")?;
    if report.orders.is_empty() {
        writeln!(out, "No orders placed.")?;
    } else {
        writeln!(
            out,
            "{:<12} {:>6} {:<8} {:>10}",
            "Base", "Period", "Part", "OrderQty"
        )?;
        for row in &report.orders {
            writeln!(
                out,
                "{:<12} {:>6} {:<8} {:>10.1}",
                row.base, row.period, row.part, row.quantity
            )?;
        }
    }

    writeln!(out, "\nShipments (truck / air, nonzero rows):")?;
    if report.shipments.is_empty() {
        writeln!(out, "No shipments.")?;
    } else {
        writeln!(
            out,
            "{:<12} {:<12} {:<8} {:>6} {:>10} {:>10}",
            "Base", "Station", "Part", "Period", "Truck", "Air"
        )?;
        for row in &report.shipments {
            writeln!(
                out,
                "{:<12} {:<12} {:<8} {:>6} {:>10.1} {:>10.1}",
                row.base, row.station, row.part, row.period, row.truck, row.air
            )?;
        }
    }

    writeln!(out, "\nInventory at end of each period (nonzero rows):")?;
    if report.inventory.is_empty() {
        writeln!(out, "All inventories zero at end of periods.")?;
    } else {
        writeln!(
            out,
            "{:<12} {:<8} {:>6} {:>10}",
            "Base", "Part", "Period", "EndInv"
        )?;
        for row in &report.inventory {
            writeln!(
                out,
                "{:<12} {:<8} {:>6} {:>10.1}",
                row.base, row.part, row.period, row.quantity
            )?;
        }
    }

    writeln!(out, "\nShortages (station, part, period):")?;
    if report.shortages.is_empty() {
        writeln!(out, "No shortages recorded.")?;
    } else {
        writeln!(
            out,
            "{:<12} {:<8} {:>6} {:>10}",
            "Station", "Part", "Period", "Shortage"
        )?;
        for row in &report.shortages {
            writeln!(
                out,
                "{:<12} {:<8} {:>6} {:>10.1}",
                row.station, row.part, row.period, row.quantity
            )?;
        }
    }

    Ok(())
}
