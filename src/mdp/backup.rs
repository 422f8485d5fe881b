//! Bellman backups and the sweep/convergence loop shared by the solvers.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

use super::config::{DpConfig, SweepMode};
use super::error::DpError;
use super::types::Environment;
use super::value::ValueFunction;

/// One-step lookahead `r + gamma * V(s')` for taking `action` in `state`.
pub fn q_value<E: Environment>(
    env: &E,
    values: &ValueFunction<E::State>,
    state: &E::State,
    action: &E::Action,
    gamma: f64,
) -> Result<f64, DpError> {
    let (next, reward) = env.sim_step(state, action)?;
    Ok(reward + gamma * values.value(&next)?)
}

/// The action maximizing the one-step lookahead, with its value.
///
/// Ties keep the first action in `actions(state)` order: a later candidate
/// replaces the incumbent only when strictly better.
pub fn greedy_action<E: Environment>(
    env: &E,
    values: &ValueFunction<E::State>,
    state: &E::State,
    gamma: f64,
) -> Result<(E::Action, f64), DpError> {
    let mut best: Option<(E::Action, f64)> = None;
    for a in env.actions(state) {
        let q = q_value(env, values, state, &a, gamma)?;
        match best {
            Some((_, best_q)) if q <= best_q => {}
            _ => best = Some((a, q)),
        }
    }
    best.ok_or_else(|| DpError::no_actions(state))
}

/// Largest one-step lookahead over all legal actions.
pub fn max_q<E: Environment>(
    env: &E,
    values: &ValueFunction<E::State>,
    state: &E::State,
    gamma: f64,
) -> Result<f64, DpError> {
    greedy_action(env, values, state, gamma).map(|(_, q)| q)
}

/// Applies `target` to every non-terminal state once and returns the
/// largest absolute change. Terminal states are never written.
pub(crate) fn sweep<E, F>(
    env: &E,
    values: &mut ValueFunction<E::State>,
    config: &DpConfig,
    target: F,
) -> Result<f64, DpError>
where
    E: Environment,
    F: Fn(&E::State, &ValueFunction<E::State>) -> Result<f64, DpError> + Sync,
{
    let mut delta = 0.0f64;
    match config.sweep_mode {
        SweepMode::InPlace => {
            for s in env.state_space() {
                if env.is_terminal(s) {
                    continue;
                }
                let old = values.value(s)?;
                let new = target(s, values)?;
                values.set(s, new)?;
                delta = delta.max((old - new).abs());
                trace_update(config, s, old, new);
            }
        }
        SweepMode::Synchronous => {
            let updates = synchronous_targets(env, values, &target)?;
            for (s, new) in updates {
                let old = values.value(s)?;
                values.set(s, new)?;
                delta = delta.max((old - new).abs());
                trace_update(config, s, old, new);
            }
        }
    }
    Ok(delta)
}

#[cfg(feature = "parallel")]
fn synchronous_targets<'e, E, F>(
    env: &'e E,
    values: &ValueFunction<E::State>,
    target: &F,
) -> Result<Vec<(&'e E::State, f64)>, DpError>
where
    E: Environment,
    F: Fn(&E::State, &ValueFunction<E::State>) -> Result<f64, DpError> + Sync,
{
    env.state_space()
        .par_iter()
        .filter(|s| !env.is_terminal(s))
        .map(|s| target(s, values).map(|v| (s, v)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn synchronous_targets<'e, E, F>(
    env: &'e E,
    values: &ValueFunction<E::State>,
    target: &F,
) -> Result<Vec<(&'e E::State, f64)>, DpError>
where
    E: Environment,
    F: Fn(&E::State, &ValueFunction<E::State>) -> Result<f64, DpError> + Sync,
{
    env.state_space()
        .iter()
        .filter(|s| !env.is_terminal(s))
        .map(|s| target(s, values).map(|v| (s, v)))
        .collect()
}

fn trace_update<S: std::fmt::Debug>(config: &DpConfig, state: &S, old: f64, new: f64) {
    if config.trace && old != new {
        debug!(state = ?state, old, new, "value updated");
    }
}

/// Sweep statistics of one converged value solve.
#[derive(Debug, Clone, Default)]
pub(crate) struct SweepStats {
    pub sweeps: usize,
    pub final_delta: f64,
    pub delta_history: Vec<f64>,
}

/// Repeats `step` until a sweep changes no value by `theta` or more.
///
/// Fails with [`DpError::NotConverged`] once `max_sweeps` (when non-zero)
/// sweeps have run without meeting the threshold.
pub(crate) fn converge<F>(config: &DpConfig, mut step: F) -> Result<SweepStats, DpError>
where
    F: FnMut() -> Result<f64, DpError>,
{
    let mut stats = SweepStats::default();
    loop {
        let delta = step()?;
        stats.sweeps += 1;
        stats.final_delta = delta;
        stats.delta_history.push(delta);

        if config.trace {
            info!(sweep = stats.sweeps, delta, "sweep complete");
        }

        if delta < config.theta {
            return Ok(stats);
        }
        if config.max_sweeps > 0 && stats.sweeps >= config.max_sweeps {
            return Err(DpError::NotConverged {
                sweeps: stats.sweeps,
                delta,
            });
        }
    }
}
