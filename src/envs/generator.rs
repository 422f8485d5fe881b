//! Seeded synthetic instances for the bundled environments.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::inventory::{period_labels, InventoryEnv};
use super::knapsack::KnapsackEnv;
use crate::mdp::DpError;

/// Price level of a period's production or holding cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CostTier {
    Cheap,
    Medium,
    Expensive,
}

/// Demand of a period relative to the median demand of the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

fn create_rng(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn check_range<T: PartialOrd + std::fmt::Debug>(name: &str, (lo, hi): (T, T)) -> Result<(), String> {
    if lo > hi {
        return Err(format!("{name} range is empty: {lo:?} > {hi:?}"));
    }
    Ok(())
}

/// Generator of seasonal production-planning instances.
///
/// Production cost months are drawn as cheap, medium or expensive. Holding
/// cost is cheap right before an expensive month (inviting stock build-up)
/// and expensive during one. Demand is a uniform base plus integer noise.
///
/// # Examples
///
/// ```
/// use u_dynprog::envs::InventoryGenerator;
///
/// let instance = InventoryGenerator::default()
///     .with_periods(6)
///     .with_capacity(10)
///     .with_seed(42)
///     .generate()
///     .unwrap();
/// assert_eq!(instance.demand.len(), 6);
/// let env = instance.into_env().unwrap();
/// assert_eq!(env.horizon(), 6);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InventoryGenerator {
    /// Number of periods in the horizon.
    pub periods: usize,

    /// Production cost ranges per tier.
    pub cheap_production: (f64, f64),
    pub medium_production: (f64, f64),
    pub expensive_production: (f64, f64),

    /// Holding cost ranges per tier.
    pub cheap_holding: (f64, f64),
    pub medium_holding: (f64, f64),
    pub expensive_holding: (f64, f64),

    /// Inclusive range of the base demand.
    pub base_demand: (usize, usize),

    /// Amplitude of the integer noise added to the base demand.
    pub demand_noise: usize,

    /// Probability that a period has expensive production.
    pub expensive_probability: f64,

    /// Probability that a period has cheap production. Medium takes the rest.
    pub cheap_probability: f64,

    /// Start inventory is drawn from `0..=max_start_inventory`.
    pub max_start_inventory: usize,

    /// Force one expensive month and turn its medium neighbours cheap.
    pub ensure_windows: bool,

    /// Storage capacity. Demand is clipped to it.
    pub capacity: usize,

    /// Random seed (None for random).
    pub seed: Option<u64>,
}

impl Default for InventoryGenerator {
    fn default() -> Self {
        Self {
            periods: 12,
            cheap_production: (4.0, 6.0),
            medium_production: (6.0, 8.0),
            expensive_production: (8.0, 12.0),
            cheap_holding: (1.0, 3.0),
            medium_holding: (3.0, 5.0),
            expensive_holding: (5.0, 8.0),
            base_demand: (4, 6),
            demand_noise: 1,
            expensive_probability: 0.25,
            cheap_probability: 0.35,
            max_start_inventory: 3,
            ensure_windows: true,
            capacity: 12,
            seed: None,
        }
    }
}

impl InventoryGenerator {
    pub fn with_periods(mut self, n: usize) -> Self {
        self.periods = n;
        self
    }

    pub fn with_production_ranges(
        mut self,
        cheap: (f64, f64),
        medium: (f64, f64),
        expensive: (f64, f64),
    ) -> Self {
        self.cheap_production = cheap;
        self.medium_production = medium;
        self.expensive_production = expensive;
        self
    }

    pub fn with_holding_ranges(
        mut self,
        cheap: (f64, f64),
        medium: (f64, f64),
        expensive: (f64, f64),
    ) -> Self {
        self.cheap_holding = cheap;
        self.medium_holding = medium;
        self.expensive_holding = expensive;
        self
    }

    pub fn with_demand(mut self, base: (usize, usize), noise: usize) -> Self {
        self.base_demand = base;
        self.demand_noise = noise;
        self
    }

    pub fn with_probabilities(mut self, expensive: f64, cheap: f64) -> Self {
        self.expensive_probability = expensive;
        self.cheap_probability = cheap;
        self
    }

    pub fn with_max_start_inventory(mut self, n: usize) -> Self {
        self.max_start_inventory = n;
        self
    }

    pub fn with_ensure_windows(mut self, on: bool) -> Self {
        self.ensure_windows = on;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.periods == 0 {
            return Err("periods must be positive".into());
        }
        check_range("cheap production", self.cheap_production)?;
        check_range("medium production", self.medium_production)?;
        check_range("expensive production", self.expensive_production)?;
        check_range("cheap holding", self.cheap_holding)?;
        check_range("medium holding", self.medium_holding)?;
        check_range("expensive holding", self.expensive_holding)?;
        check_range("base demand", self.base_demand)?;
        for p in [self.expensive_probability, self.cheap_probability] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("probabilities must be in [0, 1], got {p}"));
            }
        }
        Ok(())
    }

    fn tier_range(&self, tier: CostTier, holding: bool) -> (f64, f64) {
        match (tier, holding) {
            (CostTier::Cheap, false) => self.cheap_production,
            (CostTier::Medium, false) => self.medium_production,
            (CostTier::Expensive, false) => self.expensive_production,
            (CostTier::Cheap, true) => self.cheap_holding,
            (CostTier::Medium, true) => self.medium_holding,
            (CostTier::Expensive, true) => self.expensive_holding,
        }
    }

    /// Tier of a sampled value by range membership, cheap checked first.
    fn classify(&self, value: f64, holding: bool) -> CostTier {
        let within = |(lo, hi): (f64, f64)| lo <= value && value <= hi;
        if within(self.tier_range(CostTier::Cheap, holding)) {
            CostTier::Cheap
        } else if within(self.tier_range(CostTier::Expensive, holding)) {
            CostTier::Expensive
        } else {
            CostTier::Medium
        }
    }

    /// Draws one instance.
    pub fn generate(&self) -> Result<InventoryInstance, DpError> {
        self.validate().map_err(DpError::InvalidInstance)?;
        let mut rng = create_rng(self.seed);
        let n = self.periods;

        let medium_probability =
            (1.0 - self.expensive_probability - self.cheap_probability).max(0.0);
        let total = self.cheap_probability + medium_probability + self.expensive_probability;

        let mut categories: Vec<CostTier> = (0..n)
            .map(|_| {
                let u = rng.random::<f64>() * total;
                if u < self.cheap_probability {
                    CostTier::Cheap
                } else if u < self.cheap_probability + medium_probability {
                    CostTier::Medium
                } else {
                    CostTier::Expensive
                }
            })
            .collect();

        if self.ensure_windows {
            if !categories.contains(&CostTier::Expensive) {
                let idx = rng.random_range(0..n);
                categories[idx] = CostTier::Expensive;
            }
            if let Some(peak) = categories.iter().position(|&c| c == CostTier::Expensive) {
                for neighbour in [peak.checked_sub(1), Some(peak + 1)].into_iter().flatten() {
                    if categories.get(neighbour) == Some(&CostTier::Medium) {
                        categories[neighbour] = CostTier::Cheap;
                    }
                }
            }
        }

        let mut sample = |(lo, hi): (f64, f64)| round2(rng.random_range(lo..=hi));

        let production_costs: Vec<f64> = categories
            .iter()
            .map(|&c| sample(self.tier_range(c, false)))
            .collect();

        let holding_costs: Vec<f64> = (0..n)
            .map(|t| {
                let mut h = sample(self.medium_holding);
                if categories.get(t + 1) == Some(&CostTier::Expensive) {
                    h = sample(self.cheap_holding);
                }
                if categories[t] == CostTier::Expensive {
                    h = sample(self.expensive_holding);
                }
                h
            })
            .collect();

        let (d_lo, d_hi) = self.base_demand;
        let noise = self.demand_noise as i64;
        let demand: Vec<usize> = (0..n)
            .map(|_| {
                let base = rng.random_range(d_lo..=d_hi) as i64;
                let jitter = if noise > 0 {
                    rng.random_range(-noise..=noise)
                } else {
                    0
                };
                (base + jitter).clamp(0, self.capacity as i64) as usize
            })
            .collect();

        let start_inventory = rng.random_range(0..=self.max_start_inventory.min(self.capacity));

        let production_tiers = production_costs
            .iter()
            .map(|&c| self.classify(c, false))
            .collect();
        let holding_tiers = holding_costs
            .iter()
            .map(|&h| self.classify(h, true))
            .collect();
        let demand_levels = demand_levels(&demand);

        Ok(InventoryInstance {
            labels: period_labels(n),
            demand,
            production_costs,
            holding_costs,
            capacity: self.capacity,
            start_inventory,
            production_tiers,
            holding_tiers,
            demand_levels,
        })
    }
}

fn demand_levels(demand: &[usize]) -> Vec<DemandLevel> {
    let mut sorted = demand.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.is_empty() {
        0.0
    } else if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    };
    demand
        .iter()
        .map(|&d| {
            let d = d as f64;
            if d > median {
                DemandLevel::High
            } else if d < median {
                DemandLevel::Low
            } else {
                DemandLevel::Medium
            }
        })
        .collect()
}

/// A generated production-planning instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InventoryInstance {
    pub labels: Vec<String>,
    pub demand: Vec<usize>,
    pub production_costs: Vec<f64>,
    pub holding_costs: Vec<f64>,
    pub capacity: usize,
    pub start_inventory: usize,
    pub production_tiers: Vec<CostTier>,
    pub holding_tiers: Vec<CostTier>,
    pub demand_levels: Vec<DemandLevel>,
}

impl InventoryInstance {
    pub fn into_env(self) -> Result<InventoryEnv, DpError> {
        InventoryEnv::new(
            self.demand,
            self.production_costs,
            self.holding_costs,
            self.capacity,
            self.start_inventory,
        )
    }
}

/// Generator of random 0/1 knapsack instances with integer weights and
/// whole-number values.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KnapsackGenerator {
    pub items: usize,
    /// Inclusive weight range.
    pub weight_range: (usize, usize),
    /// Value range; drawn uniformly and rounded.
    pub value_range: (f64, f64),
    pub capacity: usize,
    /// Random seed (None for random).
    pub seed: Option<u64>,
}

impl Default for KnapsackGenerator {
    fn default() -> Self {
        Self {
            items: 10,
            weight_range: (1, 10),
            value_range: (1.0, 15.0),
            capacity: 25,
            seed: None,
        }
    }
}

impl KnapsackGenerator {
    pub fn with_items(mut self, n: usize) -> Self {
        self.items = n;
        self
    }

    pub fn with_weight_range(mut self, lo: usize, hi: usize) -> Self {
        self.weight_range = (lo, hi);
        self
    }

    pub fn with_value_range(mut self, lo: f64, hi: f64) -> Self {
        self.value_range = (lo, hi);
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        check_range("weight", self.weight_range)?;
        check_range("value", self.value_range)?;
        Ok(())
    }

    pub fn generate(&self) -> Result<KnapsackInstance, DpError> {
        self.validate().map_err(DpError::InvalidInstance)?;
        let mut rng = create_rng(self.seed);
        let (w_lo, w_hi) = self.weight_range;
        let (v_lo, v_hi) = self.value_range;

        let mut weights = Vec::with_capacity(self.items);
        let mut values = Vec::with_capacity(self.items);
        for _ in 0..self.items {
            weights.push(rng.random_range(w_lo..=w_hi));
            values.push(rng.random_range(v_lo..=v_hi).round());
        }

        Ok(KnapsackInstance {
            weights,
            values,
            capacity: self.capacity,
        })
    }
}

/// A generated knapsack instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KnapsackInstance {
    pub weights: Vec<usize>,
    pub values: Vec<f64>,
    pub capacity: usize,
}

impl KnapsackInstance {
    pub fn into_env(self) -> Result<KnapsackEnv, DpError> {
        KnapsackEnv::new(self.weights, self.values, self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::{DpConfig, Environment};
    use crate::value_iteration::ValueIterationRunner;

    #[test]
    fn test_inventory_seed_reproducible() {
        let gen = InventoryGenerator::default().with_seed(7);
        assert_eq!(gen.generate().unwrap(), gen.generate().unwrap());
    }

    #[test]
    fn test_inventory_values_within_ranges() {
        let gen = InventoryGenerator::default().with_seed(42);
        let inst = gen.generate().unwrap();

        assert_eq!(inst.demand.len(), 12);
        assert_eq!(inst.labels.len(), 12);
        assert!(inst.start_inventory <= 3);
        for &d in &inst.demand {
            assert!((3..=7).contains(&d), "demand {d} outside base +- noise");
        }
        for &c in &inst.production_costs {
            assert!((4.0..=12.0).contains(&c));
            assert!(((c * 100.0).round() - c * 100.0).abs() < 1e-6);
        }
        for &h in &inst.holding_costs {
            assert!((1.0..=8.0).contains(&h));
        }
    }

    #[test]
    fn test_inventory_ensure_windows_has_expensive_month() {
        for seed in 0..20 {
            let inst = InventoryGenerator::default()
                .with_probabilities(0.0, 0.5)
                .with_seed(seed)
                .generate()
                .unwrap();
            assert!(
                inst.production_costs.iter().any(|&c| c >= 8.0),
                "seed {seed}: no expensive month"
            );
        }
    }

    #[test]
    fn test_inventory_demand_clipped_to_capacity() {
        let inst = InventoryGenerator::default()
            .with_demand((8, 10), 2)
            .with_capacity(6)
            .with_seed(3)
            .generate()
            .unwrap();
        assert!(inst.demand.iter().all(|&d| d <= 6));
        assert!(inst.start_inventory <= 3);
        assert!(inst.into_env().is_ok());
    }

    #[test]
    fn test_inventory_invalid_config() {
        let gen = InventoryGenerator::default().with_demand((6, 4), 0);
        assert!(matches!(gen.generate(), Err(DpError::InvalidInstance(_))));
        assert!(InventoryGenerator::default()
            .with_periods(0)
            .validate()
            .is_err());
        assert!(InventoryGenerator::default()
            .with_probabilities(1.5, 0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_demand_levels_against_median() {
        assert_eq!(
            demand_levels(&[4, 5, 6, 5]),
            vec![
                DemandLevel::Low,
                DemandLevel::Medium,
                DemandLevel::High,
                DemandLevel::Medium
            ]
        );
    }

    #[test]
    fn test_generated_inventory_is_solvable() {
        let env = InventoryGenerator::default()
            .with_periods(6)
            .with_capacity(10)
            .with_seed(11)
            .generate()
            .unwrap()
            .into_env()
            .unwrap();
        let result = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();
        let plan = env.production_plan(&result.policy, None).unwrap();
        let v0 = result.values.get(&env.initial_state()).unwrap();
        assert!((plan.objective + v0).abs() < 1e-6);
    }

    #[test]
    fn test_knapsack_generator() {
        let inst = KnapsackGenerator::default()
            .with_items(8)
            .with_seed(5)
            .generate()
            .unwrap();
        assert_eq!(inst.weights.len(), 8);
        assert!(inst.weights.iter().all(|w| (1..=10).contains(w)));
        assert!(inst
            .values
            .iter()
            .all(|&v| (1.0..=15.0).contains(&v) && v.fract() == 0.0));
        assert_eq!(
            inst,
            KnapsackGenerator::default()
                .with_items(8)
                .with_seed(5)
                .generate()
                .unwrap()
        );
        assert_eq!(inst.into_env().unwrap().n_items(), 8);
    }
}
