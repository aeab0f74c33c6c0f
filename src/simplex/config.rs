//! Configuration options for the Nelder-Mead simplex minimizer.
//!
//! These are the values the host's settings dialog may override before a fit:
//! iteration budget, restart cap and the two convergence tolerances, plus the
//! step rule used to build the initial simplex.

use crate::error::{CurveFitError, Result};
use serde::{Deserialize, Serialize};

/// Reflection coefficient.
pub const ALPHA: f64 = 1.0;
/// Expansion coefficient.
pub const GAMMA: f64 = 2.0;
/// Contraction coefficient.
pub const BETA: f64 = 0.5;
/// Shrink coefficient.
pub const SIGMA: f64 = 0.5;

/// Configuration options for the simplex minimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexConfig {
    /// Iteration budget shared by all restarts. Default: None, meaning `500 * (n^2 + 1)`
    pub max_iterations: Option<usize>,

    /// Maximum number of restarts after the first convergence. Default: 2
    pub max_restarts: usize,

    /// Relative spread of objective values across the simplex. Default: 1e-10
    pub ftol: f64,

    /// Relative spread of each coordinate across the simplex. Default: 1e-10
    pub xtol: f64,

    /// Initial step as a fraction of each seed coordinate. Default: 0.2
    pub initial_step_fraction: f64,

    /// Absolute floor of the initial step. Default: 1e-7
    pub min_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: None,
            max_restarts: 2,
            ftol: 1e-10,
            xtol: 1e-10,
            initial_step_fraction: 0.2,
            min_step: 1e-7,
        }
    }
}

impl SimplexConfig {
    /// Set a fixed iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Set the maximum number of restarts.
    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Set the tolerance on the spread of objective values.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    /// Set the tolerance on the spread of vertex coordinates.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.xtol = xtol;
        self
    }

    /// Set the step rule for the initial simplex.
    pub fn with_initial_step(mut self, fraction: f64, min_step: f64) -> Self {
        self.initial_step_fraction = fraction;
        self.min_step = min_step;
        self
    }

    /// Iteration budget for a problem with `n` parameters.
    pub fn effective_max_iterations(&self, n: usize) -> usize {
        self.max_iterations
            .unwrap_or_else(|| 500usize.saturating_mul(n.saturating_mul(n).saturating_add(1)))
    }

    /// Check that every setting is usable.
    ///
    /// # Errors
    ///
    /// `InvalidSettings` for a zero budget, negative or non-finite tolerances,
    /// or a non-positive step rule.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == Some(0) {
            return Err(CurveFitError::InvalidSettings(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        for (name, value) in [("ftol", self.ftol), ("xtol", self.xtol)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CurveFitError::InvalidSettings(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("initial_step_fraction", self.initial_step_fraction),
            ("min_step", self.min_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CurveFitError::InvalidSettings(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Load settings from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimplexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize settings to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
