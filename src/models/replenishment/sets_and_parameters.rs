use crate::problem::{BaseIndex, Cost, PartIndex, PeriodIndex, Problem, Quantity, StationIndex};
use itertools::iproduct;
use log::debug;

/// Index sets of the replenishment model
#[derive(Debug)]
#[allow(non_snake_case)]
pub struct Sets {
    /// Set of bases
    pub B: Vec<BaseIndex>,
    /// Set of stations
    pub S: Vec<StationIndex>,
    /// Set of parts
    pub P: Vec<PartIndex>,
    /// Set of periods, zero-based
    pub T: Vec<PeriodIndex>,
}

impl Sets {
    pub fn new(problem: &Problem) -> Sets {
        Sets {
            B: (0..problem.bases().len()).collect(),
            S: (0..problem.stations().len()).collect(),
            P: (0..problem.parts().len()).collect(),
            T: (0..problem.periods()).collect(),
        }
    }
}

/// Dense numeric parameters of the replenishment model, derived once from a
/// validated [`Problem`].
pub struct Parameters {
    /// Truck transport cost per unit, indexed `[base][station]`
    pub truck_cost: Vec<Vec<Cost>>,
    /// Air transport cost per unit, indexed `[base][station]`
    pub air_cost: Vec<Vec<Cost>>,
    /// Purchase cost per unit, per part
    pub purchase_cost: Vec<Cost>,
    /// Flat cost per base-period in which any order is placed
    pub fixed_order_cost: Cost,
    /// Holding cost per unit-period, per part
    pub holding_cost: Vec<Cost>,
    /// Shortage penalty per unit, per part
    pub shortage_cost: Vec<Cost>,
    /// Repair-return fraction, per part
    pub repair_return: Vec<f64>,
    /// Truck capacity per period, per base
    pub truck_capacity: Vec<Quantity>,
    /// Initial on-hand inventory, indexed `[base][part]`
    pub initial_inventory: Vec<Vec<Quantity>>,
    /// Demand, indexed `[period][station][part]`
    pub demand: Vec<Vec<Vec<Quantity>>>,
    /// Allocation of repair returns to bases, indexed `[base][part]`. For
    /// each part the shares across bases sum to one. Shares follow each
    /// base's share of the part's total *initial* inventory; when that total
    /// is zero the returns are split uniformly.
    pub base_share: Vec<Vec<f64>>,
    /// Linking constant for the order indicator: the total demand over the
    /// whole horizon, floored at one. No cost-minimizing plan ever orders
    /// more than that in a single base-period, so the bound is safe without
    /// being numerically loose.
    pub big_m: f64,
}

impl Parameters {
    pub fn new(problem: &Problem, sets: &Sets) -> Parameters {
        let truck_cost = sets
            .B
            .iter()
            .map(|&b| sets.S.iter().map(|&s| problem.truck_cost(b, s)).collect())
            .collect();
        let air_cost = sets
            .B
            .iter()
            .map(|&b| sets.S.iter().map(|&s| problem.air_cost(b, s)).collect())
            .collect();

        let purchase_cost = problem.parts().iter().map(|p| p.purchase_cost()).collect();
        let holding_cost = problem.parts().iter().map(|p| p.holding_cost()).collect();
        let shortage_cost = problem.parts().iter().map(|p| p.shortage_cost()).collect();
        let repair_return = problem.parts().iter().map(|p| p.repair_return()).collect();

        let truck_capacity = problem.bases().iter().map(|b| b.truck_capacity()).collect();

        let initial_inventory: Vec<Vec<Quantity>> = problem
            .bases()
            .iter()
            .map(|b| sets.P.iter().map(|&p| b.initial_inventory(p)).collect())
            .collect();

        let demand: Vec<Vec<Vec<Quantity>>> = sets
            .T
            .iter()
            .map(|&t| {
                problem
                    .stations()
                    .iter()
                    .map(|s| sets.P.iter().map(|&p| s.demand(t, p)).collect())
                    .collect()
            })
            .collect();

        let base_share = Self::base_shares(sets, &initial_inventory);

        let horizon_demand: f64 = iproduct!(&sets.T, &sets.S, &sets.P)
            .map(|(&t, &s, &p)| demand[t][s][p])
            .sum();
        let big_m = horizon_demand.max(1.0);
        debug!("derived big-M {} from horizon demand", big_m);

        Parameters {
            truck_cost,
            air_cost,
            purchase_cost,
            fixed_order_cost: problem.fixed_order_cost(),
            holding_cost,
            shortage_cost,
            repair_return,
            truck_capacity,
            initial_inventory,
            demand,
            base_share,
            big_m,
        }
    }

    fn base_shares(sets: &Sets, initial_inventory: &[Vec<Quantity>]) -> Vec<Vec<f64>> {
        sets.B
            .iter()
            .map(|&b| {
                sets.P
                    .iter()
                    .map(|&p| {
                        let total: f64 = sets.B.iter().map(|&bb| initial_inventory[bb][p]).sum();
                        if total <= 0.0 {
                            1.0 / sets.B.len() as f64
                        } else {
                            initial_inventory[b][p] / total
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
