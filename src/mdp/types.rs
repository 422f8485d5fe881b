//! Core trait for deterministic finite environments.

use std::fmt::Debug;
use std::hash::Hash;

use super::error::DpError;

/// Defines a deterministic, finite, fully enumerable decision process.
///
/// The user implements state enumeration, legal actions and a pure
/// transition function. The solvers handle value storage, Bellman backups,
/// convergence and greedy policy extraction.
///
/// # Maximization
///
/// Solvers maximize cumulative discounted reward. For a cost model, return
/// negated costs as rewards.
///
/// # Examples
///
/// ```
/// use u_dynprog::mdp::{DpError, Environment};
///
/// /// Walk right along a line; each step pays 1, the last cell is terminal.
/// struct Line { len: usize, states: Vec<usize> }
///
/// impl Environment for Line {
///     type State = usize;
///     type Action = ();
///
///     fn state_space(&self) -> &[usize] { &self.states }
///     fn initial_state(&self) -> usize { 0 }
///     fn is_terminal(&self, s: &usize) -> bool { *s + 1 >= self.len }
///     fn actions(&self, s: &usize) -> Vec<()> {
///         if self.is_terminal(s) { vec![] } else { vec![()] }
///     }
///     fn sim_step(&self, s: &usize, _a: &()) -> Result<(usize, f64), DpError> {
///         Ok((s + 1, 1.0))
///     }
/// }
/// ```
pub trait Environment: Send + Sync {
    /// State representation. Equality and hashing must be value-based.
    type State: Clone + Eq + Hash + Debug + Send + Sync;

    /// Action representation.
    type Action: Clone + PartialEq + Debug + Send + Sync;

    /// Every state, terminal ones included, in a fixed order.
    ///
    /// Called once per sweep, so implementations should enumerate once and
    /// hand out the cached slice. The order is the in-place sweep order: it
    /// changes how many sweeps a solve takes, not the fixed point reached.
    fn state_space(&self) -> &[Self::State];

    /// The state an episode starts from.
    fn initial_state(&self) -> Self::State;

    /// Whether the state has no outgoing decisions.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Legal actions in enumeration order. Empty iff `state` is terminal.
    ///
    /// The order fixes greedy tie-breaks: the first action reaching the
    /// best lookahead value wins.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Simulates one transition without touching any environment state.
    ///
    /// Returns `(next_state, reward)`. Implementations may reject actions not
    /// in `actions(state)` with [`DpError::IllegalAction`]; the solvers only
    /// ever pass legal actions.
    fn sim_step(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<(Self::State, f64), DpError>;
}
