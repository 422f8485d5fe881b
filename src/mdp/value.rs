//! State-value function storage.

use std::collections::HashMap;
use std::hash::Hash;

use super::error::DpError;

/// A value per enumerated state.
///
/// Created fresh by each solve (every state at 0.0), updated in place
/// across sweeps and handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFunction<S: Eq + Hash> {
    values: HashMap<S, f64>,
}

impl<S: Clone + Eq + Hash + std::fmt::Debug> ValueFunction<S> {
    /// Every given state mapped to 0.0.
    pub fn zeros(states: &[S]) -> Self {
        Self {
            values: states.iter().map(|s| (s.clone(), 0.0)).collect(),
        }
    }

    /// Value of `state`, or `None` if the state was never enumerated.
    pub fn get(&self, state: &S) -> Option<f64> {
        self.values.get(state).copied()
    }

    /// Value of `state`, failing with [`DpError::UnknownState`].
    pub fn value(&self, state: &S) -> Result<f64, DpError> {
        self.get(state).ok_or_else(|| DpError::unknown_state(state))
    }

    /// Overwrites the value of an already enumerated state.
    pub fn set(&mut self, state: &S, value: f64) -> Result<(), DpError> {
        match self.values.get_mut(state) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => Err(DpError::unknown_state(state)),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> {
        self.values.iter().map(|(s, v)| (s, *v))
    }

    /// Largest absolute difference over the states both functions share.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.values
            .iter()
            .filter_map(|(s, v)| other.get(s).map(|w| (v - w).abs()))
            .fold(0.0, f64::max)
    }
}

impl<S: Eq + Hash> FromIterator<(S, f64)> for ValueFunction<S> {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
