//! Policy iteration.
//!
//! Alternates full policy evaluation with greedy improvement until an
//! improvement pass changes no action. For finite deterministic
//! environments each round is no worse than the last, and the loop ends at
//! an optimal policy.
//!
//! # References
//!
//! - Howard, R. A. (1960), "Dynamic Programming and Markov Processes"
//! - Sutton & Barto (2018), "Reinforcement Learning: An Introduction", §4.3

mod runner;

pub use runner::{PolicyIterationResult, PolicyIterationRunner};
