//! Deterministic policies.

use std::collections::HashMap;
use std::hash::Hash;

use super::error::DpError;
use super::types::Environment;

/// A deterministic mapping from non-terminal states to one action each.
///
/// Solvers expect the mapping to be total over the non-terminal states of
/// the environment; a missing entry surfaces as
/// [`DpError::MissingAction`] at the point of use.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy<S: Eq + Hash, A> {
    actions: HashMap<S, A>,
}

impl<S: Eq + Hash, A> Default for Policy<S, A> {
    fn default() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }
}

impl<S: Clone + Eq + Hash + std::fmt::Debug, A: Clone + PartialEq> Policy<S, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first legal action of every non-terminal state.
    pub fn first_legal<E>(env: &E) -> Result<Self, DpError>
    where
        E: Environment<State = S, Action = A>,
    {
        let mut policy = Self::new();
        for s in env.state_space() {
            if env.is_terminal(s) {
                continue;
            }
            let a = env
                .actions(s)
                .into_iter()
                .next()
                .ok_or_else(|| DpError::no_actions(s))?;
            policy.insert(s.clone(), a);
        }
        Ok(policy)
    }

    /// Sets the action for `state`, returning the previous one.
    pub fn insert(&mut self, state: S, action: A) -> Option<A> {
        self.actions.insert(state, action)
    }

    pub fn get(&self, state: &S) -> Option<&A> {
        self.actions.get(state)
    }

    /// Action for `state`, failing with [`DpError::MissingAction`].
    pub fn action(&self, state: &S) -> Result<&A, DpError> {
        self.actions
            .get(state)
            .ok_or_else(|| DpError::missing_action(state))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &A)> {
        self.actions.iter()
    }

    /// States on which the two policies choose different actions, or which
    /// only one of them defines.
    pub fn disagreements<'a>(&'a self, other: &'a Self) -> Vec<&'a S> {
        let mut out: Vec<&S> = self
            .actions
            .iter()
            .filter(|(s, a)| other.get(s) != Some(*a))
            .map(|(s, _)| s)
            .collect();
        out.extend(other.actions.keys().filter(|s| !self.actions.contains_key(*s)));
        out
    }
}

impl<S: Eq + Hash, A> FromIterator<(S, A)> for Policy<S, A> {
    fn from_iter<I: IntoIterator<Item = (S, A)>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_action_error() {
        let policy: Policy<(usize, usize), usize> = [((0, 0), 1)].into_iter().collect();
        assert_eq!(policy.action(&(0, 0)), Ok(&1));
        assert!(matches!(
            policy.action(&(1, 0)),
            Err(DpError::MissingAction { .. })
        ));
    }

    #[test]
    fn test_disagreements() {
        let a: Policy<u8, char> = [(1, 'x'), (2, 'y'), (3, 'z')].into_iter().collect();
        let b: Policy<u8, char> = [(1, 'x'), (2, 'w'), (4, 'z')].into_iter().collect();
        let mut diff: Vec<u8> = a.disagreements(&b).into_iter().copied().collect();
        diff.sort();
        assert_eq!(diff, vec![2, 3, 4]);
    }
}
