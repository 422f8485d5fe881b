//! Solver configuration shared by evaluation, policy iteration and value
//! iteration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a Bellman sweep reads the values it is updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SweepMode {
    /// Gauss-Seidel: each backup reads values already updated earlier in
    /// the same sweep, in state-space enumeration order.
    #[default]
    InPlace,

    /// Jacobi: every backup of a sweep reads the values from the end of the
    /// previous sweep. With the `parallel` feature the backups run on rayon.
    Synchronous,
}

/// Configuration for the dynamic-programming solvers.
///
/// # Examples
///
/// ```
/// use u_dynprog::mdp::{DpConfig, SweepMode};
///
/// let config = DpConfig::default()
///     .with_gamma(0.9)
///     .with_theta(1e-6)
///     .with_max_sweeps(10_000)
///     .with_sweep_mode(SweepMode::InPlace);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DpConfig {
    /// Discount factor in [0, 1]. 0 makes every solver myopic.
    pub gamma: f64,

    /// Convergence threshold. A solve stops after the first sweep whose
    /// largest value change is below `theta`.
    pub theta: f64,

    /// Maximum sweeps per value solve. 0 = no limit.
    pub max_sweeps: usize,

    /// Maximum evaluate/improve rounds of policy iteration. 0 = no limit.
    pub max_policy_iterations: usize,

    /// Sweep update order.
    pub sweep_mode: SweepMode,

    /// Emit per-sweep and per-state progress events.
    pub trace: bool,
}

impl Default for DpConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            theta: 1e-8,
            max_sweeps: 0,
            max_policy_iterations: 0,
            sweep_mode: SweepMode::default(),
            trace: false,
        }
    }
}

impl DpConfig {
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_max_sweeps(mut self, n: usize) -> Self {
        self.max_sweeps = n;
        self
    }

    pub fn with_max_policy_iterations(mut self, n: usize) -> Self {
        self.max_policy_iterations = n;
        self
    }

    pub fn with_sweep_mode(mut self, mode: SweepMode) -> Self {
        self.sweep_mode = mode;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Validates the configuration.
    ///
    /// A non-positive `theta` would never be satisfied, so it is rejected
    /// here rather than left to loop.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }
        if !self.theta.is_finite() || self.theta <= 0.0 {
            return Err(format!(
                "theta must be finite and positive, got {}",
                self.theta
            ));
        }
        Ok(())
    }
}
