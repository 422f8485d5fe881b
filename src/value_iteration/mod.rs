//! Value iteration.
//!
//! Computes the optimal value function directly with Bellman optimality
//! backups `V(s) <- max_a [r + gamma * V(s')]`, then extracts the greedy
//! policy in one final pass.
//!
//! # References
//!
//! - Bellman, R. (1957), "Dynamic Programming"
//! - Sutton & Barto (2018), "Reinforcement Learning: An Introduction", §4.4

mod runner;

pub use runner::{greedy_policy, ValueIterationResult, ValueIterationRunner};
