//! Model trait shared by the built-in families and user formulas.
//!
//! A model is an immutable description of a parametric family: a display name,
//! a human-readable formula, a parameter count, a pure evaluator `f(p, x)` and
//! a deterministic initial-parameter heuristic.

use ndarray::{Array1, ArrayView1};
use std::fmt;

/// Largest number of parameters any model may declare.
pub const MAX_PARAMS: usize = 20;

/// A trait representing a model that can be fit to data.
///
/// Implementations must be pure: `eval` may not keep hidden state, and two
/// calls with the same inputs must return the same value.
pub trait Model: fmt::Debug + Send + Sync {
    /// Display name of the model, e.g. "Straight Line".
    fn name(&self) -> &str;

    /// Human-readable formula using `a, b, c, ...` as parameters.
    fn formula(&self) -> &str;

    /// Number of free parameters, in `1..=MAX_PARAMS` for a usable model.
    fn parameter_count(&self) -> usize;

    /// Evaluates the model at a single `x` with the given parameters.
    ///
    /// Non-finite results are allowed; the objective treats them as worst.
    fn eval(&self, params: ArrayView1<f64>, x: f64) -> f64;

    /// Deterministic initial parameters guessed from the data.
    ///
    /// # Arguments
    ///
    /// * `x` - The independent variable values
    /// * `y` - The observed dependent variable values
    ///
    /// # Returns
    ///
    /// * A vector of length `parameter_count()`
    fn guess_parameters(&self, x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64>;

    /// Evaluates the model at every value in `x`.
    fn eval_array(&self, params: ArrayView1<f64>, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|x_val| self.eval(params, x_val))
    }

    /// Returns the names of the parameters, `a, b, c, ...`.
    fn parameter_names(&self) -> Vec<String> {
        parameter_names(self.parameter_count())
    }
}

/// Letter name of the parameter at `index` (`0 -> 'a'`).
pub fn parameter_letter(index: usize) -> char {
    debug_assert!(index < 26);
    (b'a' + index as u8) as char
}

/// Names `a, b, c, ...` for `count` parameters.
pub fn parameter_names(count: usize) -> Vec<String> {
    (0..count).map(|i| parameter_letter(i).to_string()).collect()
}
