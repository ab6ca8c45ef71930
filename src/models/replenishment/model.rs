use good_lp::{Constraint, Expression, ProblemVariables, Solution, Variable};
use itertools::iproduct;
use log::{debug, info};

use crate::models::utils::{AddVars, ExtractValues};
use crate::problem::Problem;
use crate::solver::{self, SolveOutcome, SolverConfig};

use super::sets_and_parameters::{Parameters, Sets};

pub struct ReplenishmentSolver {}

impl ReplenishmentSolver {
    /// Translates the sets and parameters into decision variables, the cost
    /// objective and the full constraint set. Index integrity is guaranteed
    /// by problem construction, so building cannot fail.
    pub fn build(sets: &Sets, parameters: &Parameters) -> ReplenishmentModel {
        info!("Building replenishment model.");

        let bases = sets.B.len();
        let stations = sets.S.len();
        let parts = sets.P.len();
        let periods = sets.T.len();

        let mut variables = ProblemVariables::new();

        // Quantity ordered from the supplier; arrives one period later
        let order: Vec<Vec<Vec<Variable>>> =
            (bases, parts, periods).cont(&mut variables, "order");
        // 1 if the base places any order in the period, 0 otherwise
        let order_placed: Vec<Vec<Variable>> =
            (bases, periods).binary(&mut variables, "order_placed");
        // Quantity shipped from base to station by truck
        let ship_truck: Vec<Vec<Vec<Vec<Variable>>>> =
            (bases, stations, parts, periods).cont(&mut variables, "ship_truck");
        // Quantity shipped from base to station by air (uncapacitated)
        let ship_air: Vec<Vec<Vec<Vec<Variable>>>> =
            (bases, stations, parts, periods).cont(&mut variables, "ship_air");
        // End-of-period inventory at the base
        let inventory: Vec<Vec<Vec<Variable>>> =
            (bases, parts, periods).cont(&mut variables, "inv");
        // Demand actually served at the station
        let consumed: Vec<Vec<Vec<Variable>>> =
            (stations, parts, periods).cont(&mut variables, "consumed");
        // Unmet demand, penalized in the objective
        let shortage: Vec<Vec<Vec<Variable>>> =
            (stations, parts, periods).cont(&mut variables, "shortage");

        //*****************OBJECTIVE*****************//

        let mut transport_cost: Expression = 0.into();
        for (&b, &s, &p, &t) in iproduct!(&sets.B, &sets.S, &sets.P, &sets.T) {
            transport_cost += parameters.truck_cost[b][s] * ship_truck[b][s][p][t];
            transport_cost += parameters.air_cost[b][s] * ship_air[b][s][p][t];
        }

        let mut purchase_cost: Expression = 0.into();
        for (&b, &p, &t) in iproduct!(&sets.B, &sets.P, &sets.T) {
            purchase_cost += parameters.purchase_cost[p] * order[b][p][t];
        }

        let mut fixed_order_cost: Expression = 0.into();
        for (&b, &t) in iproduct!(&sets.B, &sets.T) {
            fixed_order_cost += parameters.fixed_order_cost * order_placed[b][t];
        }

        let mut holding_cost: Expression = 0.into();
        for (&b, &p, &t) in iproduct!(&sets.B, &sets.P, &sets.T) {
            holding_cost += parameters.holding_cost[p] * inventory[b][p][t];
        }

        let mut shortage_cost: Expression = 0.into();
        for (&s, &p, &t) in iproduct!(&sets.S, &sets.P, &sets.T) {
            shortage_cost += parameters.shortage_cost[p] * shortage[s][p][t];
        }

        let objective =
            transport_cost + purchase_cost + fixed_order_cost + holding_cost + shortage_cost;

        //*****************CONSTRAINTS*****************//

        let mut constraints: Vec<Constraint> = Vec::new();

        // Any positive order quantity forces the order indicator to 1
        for (&b, &t) in iproduct!(&sets.B, &sets.T) {
            let mut total: Expression = 0.into();
            for &p in &sets.P {
                total += order[b][p][t];
            }
            constraints.push((total - parameters.big_m * order_placed[b][t]).leq(0.0));
        }

        // Truck shipments share one capacity per base and period
        for (&b, &t) in iproduct!(&sets.B, &sets.T) {
            let mut trucked: Expression = 0.into();
            for (&s, &p) in iproduct!(&sets.S, &sets.P) {
                trucked += ship_truck[b][s][p][t];
            }
            constraints.push(trucked.leq(parameters.truck_capacity[b]));
        }

        // Inventory balance: end inventory = prior inventory (initial at t=1)
        // + arrivals of orders placed in t-1 + repair returns generated in
        // t-1 - shipments leaving in t. Returns are split across bases by
        // each base's share of the part's initial inventory.
        for (&b, &p, &t) in iproduct!(&sets.B, &sets.P, &sets.T) {
            let mut outflows: Expression = 0.into();
            for &s in &sets.S {
                outflows += ship_truck[b][s][p][t] + ship_air[b][s][p][t];
            }

            let mut inflows: Expression = 0.into();
            let mut seed = 0.0;
            if t == 0 {
                seed = parameters.initial_inventory[b][p];
            } else {
                inflows += 1.0 * inventory[b][p][t - 1];
                inflows += 1.0 * order[b][p][t - 1];
                let rate = parameters.repair_return[p] * parameters.base_share[b][p];
                for &s in &sets.S {
                    inflows += rate * consumed[s][p][t - 1];
                }
            }

            let end: Expression = 1.0 * inventory[b][p][t];
            constraints.push((end + outflows - inflows).eq(seed));
        }

        // Consumption plus shortage meets demand exactly
        for (&s, &p, &t) in iproduct!(&sets.S, &sets.P, &sets.T) {
            constraints
                .push((consumed[s][p][t] + shortage[s][p][t]).eq(parameters.demand[t][s][p]));
        }

        // What a station consumes must arrive there in the same period
        for (&s, &p, &t) in iproduct!(&sets.S, &sets.P, &sets.T) {
            let mut delivered: Expression = 0.into();
            for &b in &sets.B {
                delivered += ship_truck[b][s][p][t] + ship_air[b][s][p][t];
            }
            constraints.push((delivered - 1.0 * consumed[s][p][t]).eq(0.0));
        }

        let stats = ModelStats {
            continuous: bases * parts * periods
                + 2 * bases * stations * parts * periods
                + bases * parts * periods
                + 2 * stations * parts * periods,
            binary: bases * periods,
            constraints: constraints.len(),
        };
        debug!(
            "built model with {} continuous and {} binary variables, {} constraints",
            stats.continuous, stats.binary, stats.constraints
        );

        ReplenishmentModel {
            variables,
            objective,
            constraints,
            vars: Variables {
                order,
                order_placed,
                ship_truck,
                ship_air,
                inventory,
                consumed,
                shortage,
            },
            stats,
        }
    }

    /// Builds the model for `problem` and hands it to the solver boundary.
    pub fn solve(problem: &Problem, config: &SolverConfig) -> SolveOutcome {
        let sets = Sets::new(problem);
        let parameters = Parameters::new(problem, &sets);
        let model = ReplenishmentSolver::build(&sets, &parameters);
        solver::solve(model, &sets, &parameters, config)
    }
}

/// A fully built model, ready to be submitted to the engine exactly once.
pub struct ReplenishmentModel {
    pub variables: ProblemVariables,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
    pub vars: Variables,
    pub stats: ModelStats,
}

#[derive(Debug, Clone, Copy)]
pub struct ModelStats {
    pub continuous: usize,
    pub binary: usize,
    pub constraints: usize,
}

pub struct Variables {
    /// Order quantity, indexed `[base][part][period]`
    pub order: Vec<Vec<Vec<Variable>>>,
    /// Binary order indicator, indexed `[base][period]`
    pub order_placed: Vec<Vec<Variable>>,
    /// Truck shipment quantity, indexed `[base][station][part][period]`
    pub ship_truck: Vec<Vec<Vec<Vec<Variable>>>>,
    /// Air shipment quantity, indexed `[base][station][part][period]`
    pub ship_air: Vec<Vec<Vec<Vec<Variable>>>>,
    /// End-of-period inventory, indexed `[base][part][period]`
    pub inventory: Vec<Vec<Vec<Variable>>>,
    /// Served demand, indexed `[station][part][period]`
    pub consumed: Vec<Vec<Vec<Variable>>>,
    /// Unmet demand, indexed `[station][part][period]`
    pub shortage: Vec<Vec<Vec<Variable>>>,
}

/// Optimal (or best-found) values of every decision variable, shaped like
/// [`Variables`].
pub struct VariableValues {
    pub order: Vec<Vec<Vec<f64>>>,
    pub order_placed: Vec<Vec<f64>>,
    pub ship_truck: Vec<Vec<Vec<Vec<f64>>>>,
    pub ship_air: Vec<Vec<Vec<Vec<f64>>>>,
    pub inventory: Vec<Vec<Vec<f64>>>,
    pub consumed: Vec<Vec<Vec<f64>>>,
    pub shortage: Vec<Vec<Vec<f64>>>,
}

impl VariableValues {
    pub fn new<S: Solution>(vars: &Variables, solution: &S) -> VariableValues {
        VariableValues {
            order: vars.order.extract(solution),
            order_placed: vars.order_placed.extract(solution),
            ship_truck: vars.ship_truck.extract(solution),
            ship_air: vars.ship_air.extract(solution),
            inventory: vars.inventory.extract(solution),
            consumed: vars.consumed.extract(solution),
            shortage: vars.shortage.extract(solution),
        }
    }

    /// The objective value of this assignment: transport + purchase + fixed
    /// ordering + holding + shortage cost.
    pub fn total_cost(&self, sets: &Sets, parameters: &Parameters) -> f64 {
        let transport: f64 = iproduct!(&sets.B, &sets.S, &sets.P, &sets.T)
            .map(|(&b, &s, &p, &t)| {
                parameters.truck_cost[b][s] * self.ship_truck[b][s][p][t]
                    + parameters.air_cost[b][s] * self.ship_air[b][s][p][t]
            })
            .sum();
        let purchase: f64 = iproduct!(&sets.B, &sets.P, &sets.T)
            .map(|(&b, &p, &t)| parameters.purchase_cost[p] * self.order[b][p][t])
            .sum();
        let fixed: f64 = iproduct!(&sets.B, &sets.T)
            .map(|(&b, &t)| parameters.fixed_order_cost * self.order_placed[b][t])
            .sum();
        let holding: f64 = iproduct!(&sets.B, &sets.P, &sets.T)
            .map(|(&b, &p, &t)| parameters.holding_cost[p] * self.inventory[b][p][t])
            .sum();
        let shortage: f64 = iproduct!(&sets.S, &sets.P, &sets.T)
            .map(|(&s, &p, &t)| parameters.shortage_cost[p] * self.shortage[s][p][t])
            .sum();

        transport + purchase + fixed + holding + shortage
    }
}
