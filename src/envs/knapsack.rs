//! 0/1 knapsack as a staged decision process.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mdp::{rollout, DpError, Environment, Policy};

/// Decision for the item under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KnapsackAction {
    Skip,
    Take,
}

/// 0/1 knapsack, one item decided per stage.
///
/// - State `(i, c)`: index of the next item and remaining capacity.
/// - Actions: `Skip` always, then `Take` when `weights[i] <= c`.
/// - Reward: the item's value when taken, 0 otherwise.
/// - Terminal once every item has been decided (`i == n`).
#[derive(Debug, Clone)]
pub struct KnapsackEnv {
    weights: Vec<usize>,
    values: Vec<f64>,
    capacity: usize,
    states: Vec<(usize, usize)>,
}

impl KnapsackEnv {
    pub fn new(weights: Vec<usize>, values: Vec<f64>, capacity: usize) -> Result<Self, DpError> {
        if weights.len() != values.len() {
            return Err(DpError::InvalidInstance(format!(
                "{} weights but {} values",
                weights.len(),
                values.len()
            )));
        }
        let n = weights.len();
        let states = (0..=n)
            .flat_map(|i| (0..=capacity).map(move |c| (i, c)))
            .collect();
        Ok(Self {
            weights,
            values,
            capacity,
            states,
        })
    }

    pub fn n_items(&self) -> usize {
        self.weights.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn weights(&self) -> &[usize] {
        &self.weights
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Items picked by `policy` when followed from the empty knapsack.
    pub fn selection(
        &self,
        policy: &Policy<(usize, usize), KnapsackAction>,
    ) -> Result<KnapsackSelection, DpError> {
        let trajectory = rollout(self, policy)?;
        let items: Vec<usize> = trajectory
            .steps
            .iter()
            .filter(|step| step.action == KnapsackAction::Take)
            .map(|step| step.state.0)
            .collect();
        let total_weight = items.iter().map(|&i| self.weights[i]).sum();
        Ok(KnapsackSelection {
            items,
            total_value: trajectory.total_reward,
            total_weight,
            capacity: self.capacity,
        })
    }
}

impl Environment for KnapsackEnv {
    type State = (usize, usize);
    type Action = KnapsackAction;

    fn state_space(&self) -> &[(usize, usize)] {
        &self.states
    }

    fn initial_state(&self) -> (usize, usize) {
        (0, self.capacity)
    }

    fn is_terminal(&self, &(i, _): &(usize, usize)) -> bool {
        i >= self.weights.len()
    }

    fn actions(&self, &(i, c): &(usize, usize)) -> Vec<KnapsackAction> {
        match self.weights.get(i) {
            None => vec![],
            Some(&w) if w <= c => vec![KnapsackAction::Skip, KnapsackAction::Take],
            Some(_) => vec![KnapsackAction::Skip],
        }
    }

    fn sim_step(
        &self,
        state: &(usize, usize),
        action: &KnapsackAction,
    ) -> Result<((usize, usize), f64), DpError> {
        let &(i, c) = state;
        let w = *self
            .weights
            .get(i)
            .ok_or_else(|| DpError::illegal_action(state, action))?;
        match action {
            KnapsackAction::Skip => Ok(((i + 1, c), 0.0)),
            KnapsackAction::Take if w <= c => Ok(((i + 1, c - w), self.values[i])),
            KnapsackAction::Take => Err(DpError::illegal_action(state, action)),
        }
    }
}

/// Outcome of following a knapsack policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KnapsackSelection {
    /// Indices of the taken items, ascending.
    pub items: Vec<usize>,
    pub total_value: f64,
    pub total_weight: usize,
    pub capacity: usize,
}
