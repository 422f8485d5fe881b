//! Value iteration loop and greedy policy extraction.

use tracing::debug;

use crate::mdp::{
    converge, greedy_action, max_q, sweep, DpConfig, DpError, Environment, Policy, ValueFunction,
};

/// Result of a value iteration run.
#[derive(Debug, Clone)]
pub struct ValueIterationResult<S: Clone + Eq + std::hash::Hash, A> {
    /// Greedy policy with respect to `values`.
    pub policy: Policy<S, A>,

    /// Optimal value function, within `theta`.
    pub values: ValueFunction<S>,

    /// Number of full sweeps run.
    pub sweeps: usize,

    /// Largest value change in the last sweep.
    pub final_delta: f64,

    /// Largest value change of every sweep, in order.
    pub delta_history: Vec<f64>,
}

/// Executes value iteration.
pub struct ValueIterationRunner;

impl ValueIterationRunner {
    /// Runs value iteration from an all-zero value function.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_dynprog::envs::{KnapsackAction, KnapsackEnv};
    /// use u_dynprog::mdp::DpConfig;
    /// use u_dynprog::value_iteration::ValueIterationRunner;
    ///
    /// let env = KnapsackEnv::new(vec![2, 3, 4], vec![3.0, 4.0, 5.0], 5).unwrap();
    /// let result = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();
    /// assert!((result.values.get(&(0, 5)).unwrap() - 7.0).abs() < 1e-9);
    /// assert_eq!(result.policy.get(&(1, 3)), Some(&KnapsackAction::Take));
    /// ```
    #[tracing::instrument(name = "value_iteration", skip_all)]
    pub fn run<E: Environment>(
        env: &E,
        config: &DpConfig,
    ) -> Result<ValueIterationResult<E::State, E::Action>, DpError> {
        Self::run_from(env, ValueFunction::zeros(env.state_space()), config)
    }

    /// Runs value iteration seeded with `values`.
    ///
    /// Seeding with an already converged function finishes after a single
    /// sweep. States missing from `values` fail with
    /// [`DpError::UnknownState`] when first read.
    pub fn run_from<E: Environment>(
        env: &E,
        mut values: ValueFunction<E::State>,
        config: &DpConfig,
    ) -> Result<ValueIterationResult<E::State, E::Action>, DpError> {
        config.validate().map_err(DpError::InvalidConfig)?;

        let stats = converge(config, || Self::sweep(env, &mut values, config))?;
        let policy = greedy_policy(env, &values, config.gamma)?;

        debug!(
            sweeps = stats.sweeps,
            final_delta = stats.final_delta,
            "value iteration converged"
        );

        Ok(ValueIterationResult {
            policy,
            values,
            sweeps: stats.sweeps,
            final_delta: stats.final_delta,
            delta_history: stats.delta_history,
        })
    }

    /// One sweep of `V(s) <- max_a [r + gamma * V(s')]`.
    ///
    /// Returns the largest absolute change.
    pub fn sweep<E: Environment>(
        env: &E,
        values: &mut ValueFunction<E::State>,
        config: &DpConfig,
    ) -> Result<f64, DpError> {
        let gamma = config.gamma;
        sweep(env, values, config, |s, v| max_q(env, v, s, gamma))
    }
}

/// The greedy policy with respect to `values`, built from scratch over every
/// non-terminal state.
///
/// Ties keep the first action in `actions(s)` order.
pub fn greedy_policy<E: Environment>(
    env: &E,
    values: &ValueFunction<E::State>,
    gamma: f64,
) -> Result<Policy<E::State, E::Action>, DpError> {
    let mut policy = Policy::new();
    for s in env.state_space() {
        if env.is_terminal(s) {
            continue;
        }
        let (a, _) = greedy_action(env, values, s, gamma)?;
        policy.insert(s.clone(), a);
    }
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::{InventoryEnv, KnapsackAction, KnapsackEnv};
    use crate::mdp::{rollout, SweepMode};
    use crate::policy_iteration::PolicyIterationRunner;
    use proptest::prelude::*;

    fn knapsack() -> KnapsackEnv {
        KnapsackEnv::new(vec![2, 3, 4], vec![3.0, 4.0, 5.0], 5).unwrap()
    }

    // ---- Malformed environment: 0 -> 1, and 1 has no actions ----

    struct Dead {
        states: Vec<u8>,
    }

    impl Environment for Dead {
        type State = u8;
        type Action = u8;

        fn state_space(&self) -> &[u8] {
            &self.states
        }

        fn initial_state(&self) -> u8 {
            0
        }

        fn is_terminal(&self, s: &u8) -> bool {
            *s == 9
        }

        fn actions(&self, s: &u8) -> Vec<u8> {
            // State 1 is malformed: non-terminal but without actions.
            if *s == 0 {
                vec![1]
            } else {
                vec![]
            }
        }

        fn sim_step(&self, _s: &u8, a: &u8) -> Result<(u8, f64), DpError> {
            Ok((*a, 1.0))
        }
    }

    #[test]
    fn test_knapsack_scenario() {
        let env = knapsack();
        let result = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();

        assert!((result.values.get(&(0, 5)).unwrap() - 7.0).abs() < 1e-9);
        assert_eq!(result.policy.get(&(0, 5)), Some(&KnapsackAction::Take));
        assert_eq!(result.policy.get(&(1, 3)), Some(&KnapsackAction::Take));
        for c in 0..4 {
            assert_eq!(result.policy.get(&(2, c)), Some(&KnapsackAction::Skip));
        }

        let traj = rollout(&env, &result.policy).unwrap();
        assert!((traj.total_reward - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_policy_covers_exactly_non_terminal_states() {
        let env = knapsack();
        let result = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();
        let non_terminal = env
            .state_space()
            .iter()
            .filter(|s| !env.is_terminal(s))
            .count();
        assert_eq!(result.policy.len(), non_terminal);
        assert_eq!(result.values.len(), env.state_space().len());
    }

    #[test]
    fn test_terminal_values_stay_zero() {
        let env = knapsack();
        let result = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();
        for s in env.state_space().iter().filter(|s| env.is_terminal(s)) {
            assert_eq!(result.values.get(s), Some(0.0));
        }
    }

    #[test]
    fn test_seeded_with_converged_values_takes_one_sweep() {
        let env = knapsack();
        let config = DpConfig::default();
        let first = ValueIterationRunner::run(&env, &config).unwrap();
        let second = ValueIterationRunner::run_from(&env, first.values.clone(), &config).unwrap();

        assert_eq!(second.sweeps, 1);
        assert!(second.final_delta < config.theta);
        assert_eq!(second.policy, first.policy);
    }

    #[test]
    fn test_matches_policy_iteration() {
        let env = InventoryEnv::new(
            vec![2, 3, 1, 2],
            vec![5.0, 9.0, 4.0, 8.0],
            vec![1.0, 1.5, 1.0, 2.0],
            5,
            1,
        )
        .unwrap();
        let config = DpConfig::default().with_gamma(0.97).with_theta(1e-10);

        let vi = ValueIterationRunner::run(&env, &config).unwrap();
        let initial = Policy::first_legal(&env).unwrap();
        let pi = PolicyIterationRunner::run(&env, &initial, &config).unwrap();

        assert!(
            vi.values.max_abs_diff(&pi.values) < 1e-7,
            "value iteration and policy iteration disagree"
        );
    }

    #[test]
    fn test_synchronous_mode_same_values() {
        let env = knapsack();
        let in_place = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();
        let sync = ValueIterationRunner::run(
            &env,
            &DpConfig::default().with_sweep_mode(SweepMode::Synchronous),
        )
        .unwrap();
        assert!(in_place.values.max_abs_diff(&sync.values) < 1e-9);
        assert_eq!(in_place.policy, sync.policy);
    }

    #[test]
    fn test_inventory_scenario_two_periods() {
        let env = InventoryEnv::new(vec![1, 1], vec![10.0, 10.0], vec![0.0, 0.0], 2, 0).unwrap();
        let result = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();

        let traj = rollout(&env, &result.policy).unwrap();
        let produced: usize = traj.steps.iter().map(|s| s.action).sum();
        assert_eq!(produced, 2);
        // Ordering both units up front ties; the smaller order comes first.
        assert_eq!(result.policy.get(&(0, 0)), Some(&1));
        assert!((result.values.get(&(0, 0)).unwrap() + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_holding_cost_moves_production_to_cheap_period() {
        // Period 1 is expensive; storing a unit for one period costs 1.
        let env = InventoryEnv::new(vec![1, 1], vec![2.0, 10.0], vec![1.0, 1.0], 2, 0).unwrap();
        let result = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();
        assert_eq!(result.policy.get(&(0, 0)), Some(&2));
        assert!((result.values.get(&(0, 0)).unwrap() + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_environment_without_actions_fails() {
        let env = Dead {
            states: vec![0, 1, 9],
        };
        let err = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap_err();
        assert_eq!(err, DpError::NoActions { state: "1".into() });
    }

    #[test]
    fn test_successor_outside_state_space_fails() {
        let env = Dead { states: vec![0, 9] };
        let err = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap_err();
        assert_eq!(err, DpError::UnknownState { state: "1".into() });
    }

    fn brute_force(weights: &[usize], values: &[f64], capacity: usize) -> f64 {
        let n = weights.len();
        (0u32..(1 << n))
            .filter_map(|mask| {
                let chosen = || (0..n).filter(move |&i| mask & (1 << i) != 0);
                let w: usize = chosen().map(|i| weights[i]).sum();
                let v: f64 = chosen().map(|i| values[i]).sum();
                (w <= capacity).then_some(v)
            })
            .fold(0.0, f64::max)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_knapsack_matches_brute_force(
            items in prop::collection::vec((1usize..8, 0u32..20), 1..7),
            capacity in 0usize..20,
        ) {
            let weights: Vec<usize> = items.iter().map(|(w, _)| *w).collect();
            let values: Vec<f64> = items.iter().map(|(_, v)| *v as f64).collect();
            let env = KnapsackEnv::new(weights.clone(), values.clone(), capacity).unwrap();

            let vi = ValueIterationRunner::run(&env, &DpConfig::default()).unwrap();
            let best = brute_force(&weights, &values, capacity);
            prop_assert!((vi.values.get(&(0, capacity)).unwrap() - best).abs() < 1e-9);

            let initial = Policy::first_legal(&env).unwrap();
            let pi = PolicyIterationRunner::run(&env, &initial, &DpConfig::default()).unwrap();
            prop_assert!(vi.values.max_abs_diff(&pi.values) < 1e-7);

            // Greedy policies may differ only where optimal actions tie.
            for s in vi.policy.disagreements(&pi.policy) {
                let qa = crate::mdp::q_value(&env, &vi.values, s, vi.policy.get(s).unwrap(), 1.0).unwrap();
                let qb = crate::mdp::q_value(&env, &vi.values, s, pi.policy.get(s).unwrap(), 1.0).unwrap();
                prop_assert!((qa - qb).abs() < 1e-7);
            }
        }
    }
}
