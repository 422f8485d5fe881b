//! Concrete environments and instance generators.
//!
//! - [`KnapsackEnv`]: 0/1 knapsack, one item decided per stage.
//! - [`InventoryEnv`]: finite-horizon production planning with per-period
//!   production and holding costs.
//!
//! [`InventoryGenerator`] and [`KnapsackGenerator`] draw seeded synthetic
//! instances for both.

mod generator;
mod inventory;
mod knapsack;

pub use generator::{
    CostTier, DemandLevel, InventoryGenerator, InventoryInstance, KnapsackGenerator,
    KnapsackInstance,
};
pub use inventory::{period_labels, InventoryEnv, PlanPeriod, ProductionPlan};
pub use knapsack::{KnapsackAction, KnapsackEnv, KnapsackSelection};
