//! Iterative policy evaluation.
//!
//! Computes the state-value function of a fixed deterministic policy by
//! repeated Bellman expectation backups `V(s) <- r + gamma * V(s')` until the
//! largest change in a sweep drops below `theta`.
//!
//! # References
//!
//! - Sutton & Barto (2018), "Reinforcement Learning: An Introduction", §4.1

mod runner;

pub use runner::{EvaluationResult, EvaluationRunner};
