//! Exact dynamic programming for deterministic finite Markov decision
//! processes.
//!
//! Provides generic solvers over a user-implemented [`mdp::Environment`]:
//!
//! - **Policy Evaluation**: In-place (Gauss-Seidel) iterative evaluation of
//!   a fixed deterministic policy.
//! - **Policy Iteration**: Alternates evaluation and greedy improvement
//!   until the policy is stable.
//! - **Value Iteration**: Bellman optimality sweeps followed by greedy
//!   policy extraction.
//!
//! Two concrete environments ship with the crate in [`envs`]: a 0/1
//! knapsack and a finite-horizon inventory production plan, together with
//! seeded instance generators.
//!
//! # Architecture
//!
//! The solvers contain no domain-specific concepts. States and actions are
//! associated types of the environment; the solvers only hash, compare and
//! clone them.

pub mod envs;
pub mod evaluation;
pub mod mdp;
pub mod policy_iteration;
pub mod value_iteration;
