use derive_more::Display;
use serde::Deserialize;

/// The type used for inventory and shipment quantities
pub type Quantity = f64;
/// The type used for cost
pub type Cost = f64;

pub type BaseIndex = usize;
pub type StationIndex = usize;
pub type PartIndex = usize;
/// Periods are stored zero-based and displayed one-based.
pub type PeriodIndex = usize;

/// One immutable problem instance: the entity sets and every numeric
/// parameter needed to build the replenishment model. Constructed once,
/// validated on construction, read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawProblem")]
pub struct Problem {
    /// Supply/repair nodes, ordered by index
    bases: Vec<Base>,
    /// Demand nodes, ordered by index
    stations: Vec<Station>,
    /// The parts (SKUs) moved through the network
    parts: Vec<Part>,
    /// The number of planning periods
    periods: usize,
    /// Truck transport cost per unit, indexed `[base][station]`
    truck_cost: Vec<Vec<Cost>>,
    /// Air transport cost per unit, indexed `[base][station]`
    air_cost: Vec<Vec<Cost>>,
    /// Flat cost incurred per base-period in which any order is placed
    fixed_order_cost: Cost,
}

impl Problem {
    pub fn new(
        bases: Vec<Base>,
        stations: Vec<Station>,
        parts: Vec<Part>,
        periods: usize,
        truck_cost: Vec<Vec<Cost>>,
        air_cost: Vec<Vec<Cost>>,
        fixed_order_cost: Cost,
    ) -> Result<Problem, ProblemConstructionError> {
        use ProblemConstructionError::*;

        if bases.is_empty() {
            return Err(NoBases);
        }
        if stations.is_empty() {
            return Err(NoStations);
        }
        if parts.is_empty() {
            return Err(NoParts);
        }
        if periods == 0 {
            return Err(NoPeriods);
        }
        if fixed_order_cost < 0.0 {
            return Err(NegativeCost {
                what: "fixed order cost".to_string(),
                value: fixed_order_cost,
            });
        }

        for part in &parts {
            for (what, value) in [
                ("purchase cost", part.purchase_cost),
                ("holding cost", part.holding_cost),
                ("shortage cost", part.shortage_cost),
            ] {
                if value < 0.0 {
                    return Err(NegativeCost {
                        what: format!("{} of part {}", what, part.name),
                        value,
                    });
                }
            }
            if !(0.0..=1.0).contains(&part.repair_return) {
                return Err(ReturnFractionOutOfRange {
                    part: part.name.clone(),
                    value: part.repair_return,
                });
            }
        }

        for base in &bases {
            if base.initial_inventory.len() != parts.len() {
                return Err(InitialInventorySizeMismatch {
                    base: base.name.clone(),
                    expected: parts.len(),
                    actual: base.initial_inventory.len(),
                });
            }
            if base.truck_capacity < 0.0 {
                return Err(NegativeTruckCapacity {
                    base: base.name.clone(),
                    value: base.truck_capacity,
                });
            }
            for (p, &inv) in base.initial_inventory.iter().enumerate() {
                if inv < 0.0 {
                    return Err(NegativeInitialInventory {
                        base: base.name.clone(),
                        part: parts[p].name.clone(),
                        value: inv,
                    });
                }
            }
        }

        for station in &stations {
            if station.demand.len() != periods {
                return Err(DemandSizeMismatch {
                    station: station.name.clone(),
                    expected: (periods, parts.len()),
                    actual: (station.demand.len(), 0),
                });
            }
            for (t, row) in station.demand.iter().enumerate() {
                if row.len() != parts.len() {
                    return Err(DemandSizeMismatch {
                        station: station.name.clone(),
                        expected: (periods, parts.len()),
                        actual: (station.demand.len(), row.len()),
                    });
                }
                for (p, &d) in row.iter().enumerate() {
                    if d < 0.0 {
                        return Err(NegativeDemand {
                            station: station.name.clone(),
                            part: parts[p].name.clone(),
                            period: t + 1,
                            value: d,
                        });
                    }
                }
            }
        }

        for (mode, matrix) in [("truck", &truck_cost), ("air", &air_cost)] {
            if matrix.len() != bases.len() {
                return Err(CostMatrixSizeMismatch {
                    mode: mode.to_string(),
                    expected: (bases.len(), stations.len()),
                    actual: (matrix.len(), 0),
                });
            }
            for (b, row) in matrix.iter().enumerate() {
                if row.len() != stations.len() {
                    return Err(CostMatrixSizeMismatch {
                        mode: mode.to_string(),
                        expected: (bases.len(), stations.len()),
                        actual: (matrix.len(), row.len()),
                    });
                }
                for &c in row {
                    if c < 0.0 {
                        return Err(NegativeCost {
                            what: format!("{} transport cost from base {}", mode, bases[b].name),
                            value: c,
                        });
                    }
                }
            }
        }

        Ok(Problem {
            bases,
            stations,
            parts,
            periods,
            truck_cost,
            air_cost,
            fixed_order_cost,
        })
    }

    /// The bases of the problem, ordered by index (continuous, starting at 0)
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// The demand stations of the problem, ordered by index
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// The parts moved through the network, ordered by index
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The number of planning periods
    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Truck transport cost per unit from a base to a station
    pub fn truck_cost(&self, base: BaseIndex, station: StationIndex) -> Cost {
        self.truck_cost[base][station]
    }

    /// Air transport cost per unit from a base to a station
    pub fn air_cost(&self, base: BaseIndex, station: StationIndex) -> Cost {
        self.air_cost[base][station]
    }

    /// Flat cost per base-period in which any order is placed
    pub fn fixed_order_cost(&self) -> Cost {
        self.fixed_order_cost
    }
}

#[derive(Debug, Display, PartialEq)]
pub enum ProblemConstructionError {
    #[display(fmt = "the problem must have at least one base")]
    NoBases,
    #[display(fmt = "the problem must have at least one station")]
    NoStations,
    #[display(fmt = "the problem must have at least one part")]
    NoParts,
    #[display(fmt = "the number of periods must be strictly positive")]
    NoPeriods,
    #[display(fmt = "negative {}: {}", what, value)]
    NegativeCost { what: String, value: Cost },
    #[display(fmt = "negative truck capacity {} at base {}", value, base)]
    NegativeTruckCapacity { base: String, value: Quantity },
    #[display(
        fmt = "negative initial inventory {} at base {} for part {}",
        value,
        base,
        part
    )]
    NegativeInitialInventory {
        base: String,
        part: String,
        value: Quantity,
    },
    #[display(
        fmt = "negative demand {} at station {} for part {} in period {}",
        value,
        station,
        part,
        period
    )]
    NegativeDemand {
        station: String,
        part: String,
        period: usize,
        value: Quantity,
    },
    #[display(
        fmt = "repair return fraction of part {} is {}, must lie in [0, 1]",
        part,
        value
    )]
    ReturnFractionOutOfRange { part: String, value: f64 },
    #[display(
        fmt = "base {} has initial inventory for {} parts, expected {}",
        base,
        actual,
        expected
    )]
    InitialInventorySizeMismatch {
        base: String,
        expected: usize,
        actual: usize,
    },
    #[display(
        fmt = "demand of station {} has shape {:?}, expected (periods, parts) = {:?}",
        station,
        actual,
        expected
    )]
    DemandSizeMismatch {
        station: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[display(
        fmt = "{} cost matrix has shape {:?}, expected (bases, stations) = {:?}",
        mode,
        actual,
        expected
    )]
    CostMatrixSizeMismatch {
        mode: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl std::error::Error for ProblemConstructionError {}

/// Mirror of `Problem` used for deserialization. Every instance read from a
/// file passes through `Problem::new`, so an invalid file can never yield a
/// usable `Problem` value.
#[derive(Deserialize)]
struct RawProblem {
    bases: Vec<Base>,
    stations: Vec<Station>,
    parts: Vec<Part>,
    periods: usize,
    truck_cost: Vec<Vec<Cost>>,
    air_cost: Vec<Vec<Cost>>,
    fixed_order_cost: Cost,
}

impl TryFrom<RawProblem> for Problem {
    type Error = ProblemConstructionError;

    fn try_from(raw: RawProblem) -> Result<Problem, Self::Error> {
        Problem::new(
            raw.bases,
            raw.stations,
            raw.parts,
            raw.periods,
            raw.truck_cost,
            raw.air_cost,
            raw.fixed_order_cost,
        )
    }
}

/// A supply/repair node. Bases hold inventory, place replenishment orders
/// with the external supplier and ship parts to stations.
#[derive(Debug, Clone, Deserialize)]
pub struct Base {
    /// The name of the base
    name: String,
    /// On-hand inventory per part at the start of period 1
    initial_inventory: Vec<Quantity>,
    /// Truck capacity per period, shared across all destinations and parts
    truck_capacity: Quantity,
}

impl Base {
    pub fn new(
        name: impl Into<String>,
        initial_inventory: Vec<Quantity>,
        truck_capacity: Quantity,
    ) -> Base {
        Base {
            name: name.into(),
            initial_inventory,
            truck_capacity,
        }
    }

    /// The name of the base
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// On-hand inventory for a part at the start of period 1
    pub fn initial_inventory(&self, part: PartIndex) -> Quantity {
        self.initial_inventory[part]
    }

    /// Truck capacity per period, shared across all destinations and parts
    pub fn truck_capacity(&self) -> Quantity {
        self.truck_capacity
    }
}

/// A demand node consuming parts.
#[derive(Debug, Clone, Deserialize)]
pub struct Station {
    /// The name of the station
    name: String,
    /// Demand per period and part, indexed `[period][part]`
    demand: Vec<Vec<Quantity>>,
}

impl Station {
    pub fn new(name: impl Into<String>, demand: Vec<Vec<Quantity>>) -> Station {
        Station {
            name: name.into(),
            demand,
        }
    }

    /// The name of the station
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Demand for a part in a period
    pub fn demand(&self, period: PeriodIndex, part: PartIndex) -> Quantity {
        self.demand[period][part]
    }
}

/// A SKU. Consumed units return to bases as usable stock one period later,
/// in proportion `repair_return`.
#[derive(Debug, Clone, Deserialize)]
pub struct Part {
    /// The name of the part
    name: String,
    /// Purchase cost per unit when ordering from the external supplier
    purchase_cost: Cost,
    /// Holding cost per unit per period of end-of-period base inventory
    holding_cost: Cost,
    /// Penalty per unit of unmet demand
    shortage_cost: Cost,
    /// Fraction of consumed units that return to bases as usable stock
    repair_return: f64,
}

impl Part {
    pub fn new(
        name: impl Into<String>,
        purchase_cost: Cost,
        holding_cost: Cost,
        shortage_cost: Cost,
        repair_return: f64,
    ) -> Part {
        Part {
            name: name.into(),
            purchase_cost,
            holding_cost,
            shortage_cost,
            repair_return,
        }
    }

    /// The name of the part
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Purchase cost per unit when ordering from the external supplier
    pub fn purchase_cost(&self) -> Cost {
        self.purchase_cost
    }

    /// Holding cost per unit per period of end-of-period base inventory
    pub fn holding_cost(&self) -> Cost {
        self.holding_cost
    }

    /// Penalty per unit of unmet demand
    pub fn shortage_cost(&self) -> Cost {
        self.shortage_cost
    }

    /// Fraction of consumed units that return to bases as usable stock
    pub fn repair_return(&self) -> f64 {
        self.repair_return
    }
}
