//! Policy iteration loop.
//!
//! # Algorithm
//!
//! 1. Copy the caller's initial policy
//! 2. Repeat:
//!    a. Evaluate the current policy to convergence
//!    b. In every non-terminal state, switch to the greedy action under the
//!       evaluated values (ties keep the first action in enumeration order)
//!    c. Stop when no state changed its action
//!
//! The caller's policy is never mutated; the converged policy is owned by
//! the result.

use tracing::{debug, info};

use crate::evaluation::EvaluationRunner;
use crate::mdp::{greedy_action, DpConfig, DpError, Environment, Policy, ValueFunction};

/// Result of a policy iteration run.
#[derive(Debug, Clone)]
pub struct PolicyIterationResult<S: Clone + Eq + std::hash::Hash, A> {
    /// The stable (optimal) policy.
    pub policy: Policy<S, A>,

    /// Value of `policy`, from its final evaluation.
    pub values: ValueFunction<S>,

    /// Evaluate/improve rounds run, the final stable one included.
    pub iterations: usize,

    /// Sweeps summed over all evaluations.
    pub evaluation_sweeps: usize,

    /// Number of states whose action changed in each round. The last entry
    /// is always 0.
    pub changes_history: Vec<usize>,
}

/// Executes policy iteration.
pub struct PolicyIterationRunner;

impl PolicyIterationRunner {
    /// Runs policy iteration from `initial`.
    ///
    /// `initial` must define an action for every non-terminal state.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_dynprog::envs::{KnapsackAction, KnapsackEnv};
    /// use u_dynprog::mdp::{DpConfig, Policy};
    /// use u_dynprog::policy_iteration::PolicyIterationRunner;
    ///
    /// let env = KnapsackEnv::new(vec![2, 3, 4], vec![3.0, 4.0, 5.0], 5).unwrap();
    /// let initial = Policy::first_legal(&env).unwrap();
    /// let result = PolicyIterationRunner::run(&env, &initial, &DpConfig::default()).unwrap();
    /// assert_eq!(result.policy.get(&(0, 5)), Some(&KnapsackAction::Take));
    /// ```
    #[tracing::instrument(name = "policy_iteration", skip_all)]
    pub fn run<E: Environment>(
        env: &E,
        initial: &Policy<E::State, E::Action>,
        config: &DpConfig,
    ) -> Result<PolicyIterationResult<E::State, E::Action>, DpError> {
        config.validate().map_err(DpError::InvalidConfig)?;

        let mut policy = initial.clone();
        let mut iterations = 0usize;
        let mut evaluation_sweeps = 0usize;
        let mut changes_history = Vec::new();

        loop {
            let evaluation = EvaluationRunner::run(env, &policy, config)?;
            iterations += 1;
            evaluation_sweeps += evaluation.sweeps;

            let changed = Self::improve(env, &mut policy, &evaluation.values, config)?;
            changes_history.push(changed);

            if config.trace {
                info!(
                    iteration = iterations,
                    sweeps = evaluation.sweeps,
                    changed,
                    "policy improvement complete"
                );
            }

            if changed == 0 {
                debug!(iterations, evaluation_sweeps, "policy stable");
                return Ok(PolicyIterationResult {
                    policy,
                    values: evaluation.values,
                    iterations,
                    evaluation_sweeps,
                    changes_history,
                });
            }

            if config.max_policy_iterations > 0 && iterations >= config.max_policy_iterations {
                return Err(DpError::NotConverged {
                    sweeps: evaluation_sweeps,
                    delta: evaluation.final_delta,
                });
            }
        }
    }

    /// Makes `policy` greedy with respect to `values` and returns how many
    /// states changed action.
    ///
    /// Fails with [`DpError::MissingAction`] if `policy` lacks a
    /// non-terminal state.
    pub fn improve<E: Environment>(
        env: &E,
        policy: &mut Policy<E::State, E::Action>,
        values: &ValueFunction<E::State>,
        config: &DpConfig,
    ) -> Result<usize, DpError> {
        let mut changed = 0usize;
        for s in env.state_space() {
            if env.is_terminal(s) {
                continue;
            }
            let old = policy.action(s)?.clone();
            let (best, q) = greedy_action(env, values, s, config.gamma)?;
            if best != old {
                changed += 1;
                if config.trace {
                    debug!(state = ?s, old = ?old, new = ?best, q, "action improved");
                }
            }
            policy.insert(s.clone(), best);
        }
        Ok(changed)
    }
}
