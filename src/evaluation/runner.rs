//! Policy evaluation loop.

use tracing::debug;

use crate::mdp::{converge, q_value, sweep, DpConfig, DpError, Environment, Policy, ValueFunction};

/// Result of a policy evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationResult<S: Clone + Eq + std::hash::Hash> {
    /// Converged value of the evaluated policy, every enumerated state
    /// included. Terminal states keep 0.0.
    pub values: ValueFunction<S>,

    /// Number of full sweeps run.
    pub sweeps: usize,

    /// Largest value change in the last sweep (below `theta`).
    pub final_delta: f64,

    /// Largest value change of every sweep, in order.
    pub delta_history: Vec<f64>,
}

/// Evaluates fixed deterministic policies.
pub struct EvaluationRunner;

impl EvaluationRunner {
    /// Computes `V` for `policy` from an all-zero start.
    ///
    /// Every non-terminal state must have an entry in `policy`; the first
    /// one missing aborts the solve with [`DpError::MissingAction`].
    ///
    /// # Examples
    ///
    /// ```
    /// use u_dynprog::envs::{KnapsackAction, KnapsackEnv};
    /// use u_dynprog::evaluation::EvaluationRunner;
    /// use u_dynprog::mdp::{DpConfig, Policy};
    ///
    /// let env = KnapsackEnv::new(vec![2, 3], vec![3.0, 4.0], 5).unwrap();
    /// let policy = Policy::first_legal(&env).unwrap(); // always skip
    /// let result = EvaluationRunner::run(&env, &policy, &DpConfig::default()).unwrap();
    /// assert_eq!(result.values.get(&(0, 5)), Some(0.0));
    /// ```
    #[tracing::instrument(name = "policy_evaluation", skip_all)]
    pub fn run<E: Environment>(
        env: &E,
        policy: &Policy<E::State, E::Action>,
        config: &DpConfig,
    ) -> Result<EvaluationResult<E::State>, DpError> {
        Self::run_from(env, policy, ValueFunction::zeros(env.state_space()), config)
    }

    /// Like [`run`](Self::run), starting from `values` instead of zeros.
    pub fn run_from<E: Environment>(
        env: &E,
        policy: &Policy<E::State, E::Action>,
        mut values: ValueFunction<E::State>,
        config: &DpConfig,
    ) -> Result<EvaluationResult<E::State>, DpError> {
        config.validate().map_err(DpError::InvalidConfig)?;

        let stats = converge(config, || Self::sweep(env, policy, &mut values, config))?;

        debug!(
            sweeps = stats.sweeps,
            final_delta = stats.final_delta,
            "policy evaluation converged"
        );

        Ok(EvaluationResult {
            values,
            sweeps: stats.sweeps,
            final_delta: stats.final_delta,
            delta_history: stats.delta_history,
        })
    }

    /// One sweep of `V(s) <- r + gamma * V(s')` under `policy`.
    ///
    /// Returns the largest absolute change.
    pub fn sweep<E: Environment>(
        env: &E,
        policy: &Policy<E::State, E::Action>,
        values: &mut ValueFunction<E::State>,
        config: &DpConfig,
    ) -> Result<f64, DpError> {
        let gamma = config.gamma;
        sweep(env, values, config, |s, v| {
            let a = policy.action(s)?;
            q_value(env, v, s, a, gamma)
        })
    }
}
