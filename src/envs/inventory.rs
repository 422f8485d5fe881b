//! Finite-horizon production planning with deterministic demand.
//!
//! Sequential form of the classic lot-sizing model
//!
//! ```text
//! min  sum_t (c_t * x_t + h_t * I_t)
//! s.t. I_t = I_{t-1} + x_t - d_t,   0 <= I_t <= capacity,   x_t >= 0
//! ```
//!
//! with the stock carried between periods as the state and costs returned as
//! negative rewards.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mdp::{rollout, DpError, Environment, Policy};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Default period labels: month abbreviations up to a year, `M1..Mn` beyond.
pub fn period_labels(n: usize) -> Vec<String> {
    if n <= MONTHS.len() {
        MONTHS[..n].iter().map(|m| m.to_string()).collect()
    } else {
        (1..=n).map(|t| format!("M{t}")).collect()
    }
}

/// Production planning environment.
///
/// - State `(t, s)`: period `t` in `0..=n` and stock `s` on hand at its start.
/// - Actions: order quantities `max(0, d_t - s) ..= capacity - s`, so demand
///   is always met and stock never exceeds capacity.
/// - Reward: `-(c_t * x + h_t * I)` with end stock `I = s + x - d_t`.
/// - Terminal once `t == n`.
#[derive(Debug, Clone)]
pub struct InventoryEnv {
    demand: Vec<usize>,
    production_costs: Vec<f64>,
    holding_costs: Vec<f64>,
    capacity: usize,
    start_inventory: usize,
    states: Vec<(usize, usize)>,
}

impl InventoryEnv {
    /// Builds the environment, rejecting inconsistent data.
    ///
    /// A period whose demand exceeds `capacity` cannot be served from any
    /// stock level and is rejected up front.
    pub fn new(
        demand: Vec<usize>,
        production_costs: Vec<f64>,
        holding_costs: Vec<f64>,
        capacity: usize,
        start_inventory: usize,
    ) -> Result<Self, DpError> {
        let n = demand.len();
        if production_costs.len() != n {
            return Err(DpError::InvalidInstance(format!(
                "production_costs has {} periods, demand has {n}",
                production_costs.len()
            )));
        }
        if holding_costs.len() != n {
            return Err(DpError::InvalidInstance(format!(
                "holding_costs has {} periods, demand has {n}",
                holding_costs.len()
            )));
        }
        if start_inventory > capacity {
            return Err(DpError::InvalidInstance(format!(
                "start inventory {start_inventory} exceeds capacity {capacity}"
            )));
        }
        if let Some((t, d)) = demand.iter().enumerate().find(|&(_, &d)| d > capacity) {
            return Err(DpError::InvalidInstance(format!(
                "demand {d} in period {t} exceeds capacity {capacity}"
            )));
        }

        let states = (0..=n)
            .flat_map(|t| (0..=capacity).map(move |s| (t, s)))
            .collect();

        Ok(Self {
            demand,
            production_costs,
            holding_costs,
            capacity,
            start_inventory,
            states,
        })
    }

    /// Number of periods.
    pub fn horizon(&self) -> usize {
        self.demand.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn start_inventory(&self) -> usize {
        self.start_inventory
    }

    pub fn demand(&self) -> &[usize] {
        &self.demand
    }

    pub fn production_costs(&self) -> &[f64] {
        &self.production_costs
    }

    pub fn holding_costs(&self) -> &[f64] {
        &self.holding_costs
    }

    fn order_range(&self, t: usize, s: usize) -> Option<std::ops::RangeInclusive<usize>> {
        let d = *self.demand.get(t)?;
        if s > self.capacity {
            return None;
        }
        Some(d.saturating_sub(s)..=self.capacity - s)
    }

    /// Follows `policy` from the start inventory and tabulates the plan.
    ///
    /// `labels` names the periods; `None` uses [`period_labels`].
    pub fn production_plan(
        &self,
        policy: &Policy<(usize, usize), usize>,
        labels: Option<&[String]>,
    ) -> Result<ProductionPlan, DpError> {
        let n = self.horizon();
        let labels = match labels {
            Some(given) if given.len() < n => {
                return Err(DpError::InvalidInstance(format!(
                    "{} labels for a {n}-period horizon",
                    given.len()
                )))
            }
            Some(given) => given[..n].to_vec(),
            None => period_labels(n),
        };

        let trajectory = rollout(self, policy)?;
        let periods: Vec<PlanPeriod> = trajectory
            .steps
            .iter()
            .zip(labels)
            .map(|(step, label)| {
                let (t, start) = step.state;
                let (_, end) = step.next_state;
                PlanPeriod {
                    period: t,
                    label,
                    start_inventory: start,
                    order: step.action,
                    demand: self.demand[t],
                    end_inventory: end,
                    production_cost: self.production_costs[t] * step.action as f64,
                    holding_cost: self.holding_costs[t] * end as f64,
                }
            })
            .collect();

        let total_production_cost = periods.iter().map(|p| p.production_cost).sum::<f64>();
        let total_holding_cost = periods.iter().map(|p| p.holding_cost).sum::<f64>();
        Ok(ProductionPlan {
            total_ordered: periods.iter().map(|p| p.order).sum(),
            total_start_inventory: periods.iter().map(|p| p.start_inventory).sum(),
            total_production_cost,
            total_holding_cost,
            objective: total_production_cost + total_holding_cost,
            periods,
        })
    }
}

impl Environment for InventoryEnv {
    type State = (usize, usize);
    type Action = usize;

    fn state_space(&self) -> &[(usize, usize)] {
        &self.states
    }

    fn initial_state(&self) -> (usize, usize) {
        (0, self.start_inventory)
    }

    fn is_terminal(&self, &(t, _): &(usize, usize)) -> bool {
        t >= self.demand.len()
    }

    fn actions(&self, &(t, s): &(usize, usize)) -> Vec<usize> {
        self.order_range(t, s).map(|r| r.collect()).unwrap_or_default()
    }

    fn sim_step(
        &self,
        state: &(usize, usize),
        &x: &usize,
    ) -> Result<((usize, usize), f64), DpError> {
        let &(t, s) = state;
        match self.order_range(t, s) {
            Some(range) if range.contains(&x) => {
                let end = s + x - self.demand[t];
                let cost =
                    self.production_costs[t] * x as f64 + self.holding_costs[t] * end as f64;
                Ok(((t + 1, end), -cost))
            }
            _ => Err(DpError::illegal_action(state, &x)),
        }
    }
}

/// One period of a [`ProductionPlan`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanPeriod {
    pub period: usize,
    pub label: String,
    /// Stock at the start of the period.
    pub start_inventory: usize,
    pub order: usize,
    pub demand: usize,
    /// Stock left after demand.
    pub end_inventory: usize,
    pub production_cost: f64,
    pub holding_cost: f64,
}

impl PlanPeriod {
    pub fn cost(&self) -> f64 {
        self.production_cost + self.holding_cost
    }
}

/// A policy's production plan with its cost breakdown.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProductionPlan {
    pub periods: Vec<PlanPeriod>,
    pub total_production_cost: f64,
    pub total_holding_cost: f64,
    /// Total cost, the negated return of the policy.
    pub objective: f64,
    pub total_ordered: usize,
    pub total_start_inventory: usize,
}
