use itertools::iproduct;

use spareflow::models::replenishment::model::{ReplenishmentSolver, VariableValues};
use spareflow::models::replenishment::sets_and_parameters::{Parameters, Sets};
use spareflow::problem::{Base, Part, Problem, Station};
use spareflow::report::{PlanReport, TOLERANCE};
use spareflow::solver::{SolveOutcome, SolveStatus, SolverConfig};

fn truck_costs() -> Vec<Vec<f64>> {
    vec![
        vec![1.8, 2.0, 2.2],
        vec![2.1, 1.9, 2.0],
        vec![2.6, 1.8, 1.6],
    ]
}

fn air_costs() -> Vec<Vec<f64>> {
    vec![
        vec![3.3, 3.5, 3.7],
        vec![3.6, 3.4, 3.5],
        vec![4.1, 3.3, 3.1],
    ]
}

/// The baseline network: 3 bases, 3 stations, 2 parts, 3 periods.
fn baseline(truck_capacity: [f64; 3], repair_return: [f64; 2]) -> Problem {
    let demand = |rows: [[f64; 2]; 3]| rows.iter().map(|row| row.to_vec()).collect();

    Problem::new(
        vec![
            Base::new("Delhi", vec![10.0, 5.0], truck_capacity[0]),
            Base::new("Mumbai", vec![8.0, 8.0], truck_capacity[1]),
            Base::new("Bengaluru", vec![5.0, 10.0], truck_capacity[2]),
        ],
        vec![
            Station::new("Kolkata", demand([[8.0, 6.0], [10.0, 8.0], [9.0, 10.0]])),
            Station::new(
                "Hyderabad",
                demand([[12.0, 10.0], [11.0, 11.0], [13.0, 12.0]]),
            ),
            Station::new("Chennai", demand([[10.0, 12.0], [12.0, 9.0], [11.0, 13.0]])),
        ],
        vec![
            Part::new("P1", 5.0, 0.2, 20.0, repair_return[0]),
            Part::new("P2", 7.0, 0.25, 25.0, repair_return[1]),
        ],
        3,
        truck_costs(),
        air_costs(),
        50.0,
    )
    .unwrap()
}

/// The baseline network with nothing to do: no demand and no stock on hand.
/// Initial inventory is zeroed along with demand on purpose; leftover stock
/// cannot be discarded, so any on-hand units would accrue holding cost and
/// the objective could never reach zero.
fn idle_network() -> Problem {
    Problem::new(
        vec![
            Base::new("Delhi", vec![0.0, 0.0], 25.0),
            Base::new("Mumbai", vec![0.0, 0.0], 20.0),
            Base::new("Bengaluru", vec![0.0, 0.0], 18.0),
        ],
        vec![
            Station::new("Kolkata", vec![vec![0.0, 0.0]; 3]),
            Station::new("Hyderabad", vec![vec![0.0, 0.0]; 3]),
            Station::new("Chennai", vec![vec![0.0, 0.0]; 3]),
        ],
        vec![
            Part::new("P1", 5.0, 0.2, 20.0, 0.2),
            Part::new("P2", 7.0, 0.25, 25.0, 0.1),
        ],
        3,
        truck_costs(),
        air_costs(),
        50.0,
    )
    .unwrap()
}

fn solve(problem: &Problem) -> (Sets, Parameters, SolveOutcome) {
    let sets = Sets::new(problem);
    let parameters = Parameters::new(problem, &sets);
    let outcome = ReplenishmentSolver::solve(problem, &SolverConfig::default());
    (sets, parameters, outcome)
}

/// The feasibility invariants every reported plan must satisfy.
fn check_plan_invariants(sets: &Sets, parameters: &Parameters, values: &VariableValues) {
    // Demand satisfaction: consumed + shortage == demand, exactly
    for (&s, &p, &t) in iproduct!(&sets.S, &sets.P, &sets.T) {
        let served = values.consumed[s][p][t] + values.shortage[s][p][t];
        assert!(
            (served - parameters.demand[t][s][p]).abs() <= TOLERANCE,
            "demand split mismatch at station {s}, part {p}, period {t}"
        );
    }

    // Flow conservation: deliveries equal consumption
    for (&s, &p, &t) in iproduct!(&sets.S, &sets.P, &sets.T) {
        let delivered: f64 = sets
            .B
            .iter()
            .map(|&b| values.ship_truck[b][s][p][t] + values.ship_air[b][s][p][t])
            .sum();
        assert!(
            (delivered - values.consumed[s][p][t]).abs() <= TOLERANCE,
            "flow mismatch at station {s}, part {p}, period {t}"
        );
    }

    // Truck capacity per base and period
    for (&b, &t) in iproduct!(&sets.B, &sets.T) {
        let trucked: f64 = iproduct!(&sets.S, &sets.P)
            .map(|(&s, &p)| values.ship_truck[b][s][p][t])
            .sum();
        assert!(
            trucked <= parameters.truck_capacity[b] + TOLERANCE,
            "truck capacity exceeded at base {b}, period {t}"
        );
    }

    // Order linking: quantities bounded by big-M times the indicator, and
    // no indicator left on without an order behind it
    for (&b, &t) in iproduct!(&sets.B, &sets.T) {
        let ordered: f64 = sets.P.iter().map(|&p| values.order[b][p][t]).sum();
        let indicator = values.order_placed[b][t];
        assert!(
            ordered <= parameters.big_m * indicator + TOLERANCE,
            "order linking violated at base {b}, period {t}"
        );
        if ordered <= TOLERANCE {
            assert!(
                indicator < 0.5,
                "dangling fixed order cost at base {b}, period {t}"
            );
        }
    }

    // Inventory recursion with one-period lag for arrivals and returns
    for (&b, &p, &t) in iproduct!(&sets.B, &sets.P, &sets.T) {
        let outflows: f64 = sets
            .S
            .iter()
            .map(|&s| values.ship_truck[b][s][p][t] + values.ship_air[b][s][p][t])
            .sum();
        let (prior, arrivals, returns) = if t == 0 {
            (parameters.initial_inventory[b][p], 0.0, 0.0)
        } else {
            let consumed_before: f64 = sets.S.iter().map(|&s| values.consumed[s][p][t - 1]).sum();
            (
                values.inventory[b][p][t - 1],
                values.order[b][p][t - 1],
                parameters.repair_return[p] * parameters.base_share[b][p] * consumed_before,
            )
        };
        let expected = prior + arrivals + returns - outflows;
        assert!(
            (values.inventory[b][p][t] - expected).abs() <= TOLERANCE,
            "inventory balance violated at base {b}, part {p}, period {t}"
        );
    }
}

#[test]
fn zero_demand_costs_nothing() {
    let problem = idle_network();
    let (_, _, outcome) = solve(&problem);

    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert!(outcome.objective.unwrap().abs() <= TOLERANCE);

    let report = PlanReport::extract(&problem, outcome.values.as_ref().unwrap());
    assert!(report.orders.is_empty());
    assert!(report.shipments.is_empty());
    assert!(report.inventory.is_empty());
    assert!(report.shortages.is_empty());
}

#[test]
fn baseline_plan_is_optimal_and_consistent() {
    let problem = baseline([25.0, 20.0, 18.0], [0.2, 0.1]);
    let (sets, parameters, outcome) = solve(&problem);

    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert!(outcome.objective.unwrap() > 0.0);

    let values = outcome.values.as_ref().unwrap();
    check_plan_invariants(&sets, &parameters, values);

    // The reported objective matches the cost of the reported plan
    let recomputed = values.total_cost(&sets, &parameters);
    assert!((outcome.objective.unwrap() - recomputed).abs() <= 1e-9);
}

#[test]
fn without_trucks_all_flow_goes_by_air() {
    let problem = baseline([0.0, 0.0, 0.0], [0.2, 0.1]);
    let (sets, parameters, outcome) = solve(&problem);

    assert_eq!(outcome.status, SolveStatus::Optimal);
    let values = outcome.values.as_ref().unwrap();
    check_plan_invariants(&sets, &parameters, values);

    for (&b, &s, &p, &t) in iproduct!(&sets.B, &sets.S, &sets.P, &sets.T) {
        assert!(
            values.ship_truck[b][s][p][t] <= TOLERANCE,
            "truck shipment despite zero capacity at base {b}"
        );
    }

    // Demand is still served somehow: by air or as shortage
    let moved_by_air: f64 = iproduct!(&sets.B, &sets.S, &sets.P, &sets.T)
        .map(|(&b, &s, &p, &t)| values.ship_air[b][s][p][t])
        .sum();
    assert!(moved_by_air > 0.0);
}

#[test]
fn without_returns_the_recursion_loses_its_returns_term() {
    let problem = baseline([25.0, 20.0, 18.0], [0.0, 0.0]);
    let (sets, parameters, outcome) = solve(&problem);

    assert_eq!(outcome.status, SolveStatus::Optimal);
    let values = outcome.values.as_ref().unwrap();
    check_plan_invariants(&sets, &parameters, values);

    // inventory[t] == inventory[t-1] + arrivals[t-1] - outflows[t]
    for (&b, &p, &t) in iproduct!(&sets.B, &sets.P, &sets.T) {
        if t == 0 {
            continue;
        }
        let outflows: f64 = sets
            .S
            .iter()
            .map(|&s| values.ship_truck[b][s][p][t] + values.ship_air[b][s][p][t])
            .sum();
        let expected = values.inventory[b][p][t - 1] + values.order[b][p][t - 1] - outflows;
        assert!(
            (values.inventory[b][p][t] - expected).abs() <= TOLERANCE,
            "returns leaked into the balance at base {b}, part {p}, period {t}"
        );
    }
}

#[test]
fn exhausted_time_budget_is_reported_as_timed_out() {
    let problem = baseline([25.0, 20.0, 18.0], [0.2, 0.1]);
    let config = SolverConfig {
        time_limit: 0.0,
        verbose: false,
    };
    let outcome = ReplenishmentSolver::solve(&problem, &config);

    assert_eq!(outcome.status, SolveStatus::TimedOut);
    assert!(outcome.duration.as_secs_f64() > outcome.time_limit);

    // The best plan found is still reported, along with its cost
    assert!(outcome.values.is_some());
    assert!(outcome.objective.is_some());
    assert!(outcome
        .log
        .iter()
        .any(|line| line.contains("Time limit") && line.contains("exceeded")));
}

#[test]
fn diagnostics_cover_the_solved_model() {
    let problem = baseline([25.0, 20.0, 18.0], [0.2, 0.1]);
    let (_, _, outcome) = solve(&problem);

    let digest = spareflow::report::LogDigest::scan(&outcome.log);
    assert!(digest.presolve.is_some());
    assert!(digest.final_line.is_some());
}
