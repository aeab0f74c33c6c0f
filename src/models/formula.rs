//! User-defined models built from a formula string.

use crate::error::{CurveFitError, Result};
use crate::expression::CompiledExpression;
use crate::model::Model;
use ndarray::{Array1, ArrayView1};

/// A model whose function is a user formula such as `y = a*exp(-b*x) + c`.
///
/// The parameter count is the number of letters from `a` through the highest
/// letter the formula uses. Without caller-supplied initial parameters every
/// parameter starts at 1.
#[derive(Debug, Clone)]
pub struct FormulaModel {
    source: String,
    expression: CompiledExpression,
    initial_params: Option<Array1<f64>>,
}

impl FormulaModel {
    /// Display name used in reports for user formulas.
    pub const NAME: &'static str = "User-defined";

    /// Parse and compile `formula`.
    ///
    /// # Errors
    ///
    /// `BadFormula` when the formula does not parse, calls an unknown function,
    /// uses an unknown name or references no parameters.
    pub fn compile(formula: &str) -> Result<Self> {
        let expression = CompiledExpression::parse(formula)?;
        Ok(Self {
            source: formula.trim().to_string(),
            expression,
            initial_params: None,
        })
    }

    /// Number of parameters `formula` would have, or 0 when it is unusable.
    pub fn detect_parameter_count(formula: &str) -> usize {
        CompiledExpression::parse(formula)
            .map(|e| e.parameter_count())
            .unwrap_or(0)
    }

    /// Start the fit from `params` instead of all ones.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the length differs from the parameter count,
    /// `InvalidSettings` when a value is not finite.
    pub fn with_initial_params(mut self, params: Array1<f64>) -> Result<Self> {
        if params.len() != self.parameter_count() {
            return Err(CurveFitError::DimensionMismatch(format!(
                "formula has {} parameters, {} initial values given",
                self.parameter_count(),
                params.len()
            )));
        }
        if params.iter().any(|p| !p.is_finite()) {
            return Err(CurveFitError::InvalidSettings(
                "initial parameters must be finite".to_string(),
            ));
        }
        self.initial_params = Some(params);
        Ok(self)
    }
}

impl Model for FormulaModel {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn formula(&self) -> &str {
        &self.source
    }

    fn parameter_count(&self) -> usize {
        self.expression.parameter_count()
    }

    fn eval(&self, params: ArrayView1<f64>, x: f64) -> f64 {
        self.expression.eval(params, x)
    }

    fn guess_parameters(&self, _x: &Array1<f64>, _y: &Array1<f64>) -> Array1<f64> {
        match &self.initial_params {
            Some(params) => params.clone(),
            None => Array1::ones(self.parameter_count()),
        }
    }
}
