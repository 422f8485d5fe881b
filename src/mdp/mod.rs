//! Deterministic finite Markov decision processes.
//!
//! The shared contract consumed by every solver in this crate: the
//! [`Environment`] trait, value functions, deterministic policies, the solver
//! configuration and the Bellman backup machinery.
//!
//! Transitions are deterministic: an action taken in a state yields exactly
//! one successor and one reward. This is the deterministic special case of
//! the general MDP model.
//!
//! # References
//!
//! - Bellman, R. (1957), "Dynamic Programming"
//! - Sutton & Barto (2018), "Reinforcement Learning: An Introduction", ch. 4

mod backup;
mod config;
mod episode;
mod error;
mod policy;
mod types;
mod value;

pub use backup::{greedy_action, max_q, q_value};
pub use config::{DpConfig, SweepMode};
pub use episode::{rollout, rollout_bounded, Episode, StepOutcome, Trajectory, TrajectoryStep};
pub use error::DpError;
pub use policy::Policy;
pub use types::Environment;
pub use value::ValueFunction;

pub(crate) use backup::{converge, sweep, SweepStats};
