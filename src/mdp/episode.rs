//! Live episodes and policy rollouts.
//!
//! The solvers work purely through [`Environment::sim_step`]. Episodes are
//! for callers that want to walk an environment step by step (reporting,
//! replaying a solved policy); the mutable cursor lives here, never in the
//! environment.

use super::error::DpError;
use super::policy::Policy;
use super::types::Environment;

/// Result of [`Episode::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome<S> {
    /// State after the step.
    pub state: S,
    /// Reward of the step.
    pub reward: f64,
    /// Whether `state` is terminal.
    pub done: bool,
}

/// A live walk through an environment, starting at its initial state.
pub struct Episode<'e, E: Environment> {
    env: &'e E,
    state: E::State,
    total_reward: f64,
    steps: usize,
}

impl<'e, E: Environment> Episode<'e, E> {
    pub fn new(env: &'e E) -> Self {
        Self {
            env,
            state: env.initial_state(),
            total_reward: 0.0,
            steps: 0,
        }
    }

    /// Returns to the initial state and clears the accumulated reward.
    pub fn reset(&mut self) -> &E::State {
        self.state = self.env.initial_state();
        self.total_reward = 0.0;
        self.steps = 0;
        &self.state
    }

    pub fn state(&self) -> &E::State {
        &self.state
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.env.is_terminal(&self.state)
    }

    /// Applies a legal action to the current state.
    pub fn step(&mut self, action: &E::Action) -> Result<StepOutcome<E::State>, DpError> {
        if self.is_done() {
            return Err(DpError::EpisodeFinished {
                state: format!("{:?}", self.state),
            });
        }
        if !self.env.actions(&self.state).contains(action) {
            return Err(DpError::illegal_action(&self.state, action));
        }
        let (next, reward) = self.env.sim_step(&self.state, action)?;
        self.state = next;
        self.total_reward += reward;
        self.steps += 1;
        Ok(StepOutcome {
            state: self.state.clone(),
            reward,
            done: self.is_done(),
        })
    }
}

/// One recorded transition of a rollout.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryStep<S, A> {
    pub state: S,
    pub action: A,
    pub reward: f64,
    pub next_state: S,
}

/// The path a policy takes from the initial state to a terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<S, A> {
    pub steps: Vec<TrajectoryStep<S, A>>,
    pub total_reward: f64,
}

impl<S, A> Trajectory<S, A> {
    /// The terminal state reached, if any step was taken.
    pub fn final_state(&self) -> Option<&S> {
        self.steps.last().map(|s| &s.next_state)
    }
}

/// Follows `policy` from the initial state until a terminal state.
///
/// Only the visited states need an entry in `policy`. Loops forever on an
/// environment where the policy never reaches a terminal state; see
/// [`rollout_bounded`].
pub fn rollout<E: Environment>(
    env: &E,
    policy: &Policy<E::State, E::Action>,
) -> Result<Trajectory<E::State, E::Action>, DpError> {
    rollout_bounded(env, policy, 0)
}

/// Like [`rollout`], failing with [`DpError::StepLimit`] after
/// `max_steps` steps without reaching a terminal state. 0 = no limit.
pub fn rollout_bounded<E: Environment>(
    env: &E,
    policy: &Policy<E::State, E::Action>,
    max_steps: usize,
) -> Result<Trajectory<E::State, E::Action>, DpError> {
    let mut episode = Episode::new(env);
    let mut steps = Vec::new();

    while !episode.is_done() {
        if max_steps > 0 && episode.steps() >= max_steps {
            return Err(DpError::StepLimit {
                steps: episode.steps(),
            });
        }
        let state = episode.state().clone();
        let action = policy.action(&state)?.clone();
        let outcome = episode.step(&action)?;
        steps.push(TrajectoryStep {
            state,
            action,
            reward: outcome.reward,
            next_state: outcome.state,
        });
    }

    Ok(Trajectory {
        steps,
        total_reward: episode.total_reward(),
    })
}
