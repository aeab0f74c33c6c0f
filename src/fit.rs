//! Fit façade: model resolution, seeding, minimization and diagnostics.
//!
//! [`CurveFitter`] runs one fit per call and returns an immutable [`FitResult`].
//! The result keeps a handle to the fitted model, so plotting and the pixel
//! transform work from the result alone.

use crate::error::{CurveFitError, Result};
use crate::model::{Model, MAX_PARAMS};
use crate::models::{BuiltinModel, FormulaModel};
use crate::problem::CurveProblem;
use crate::samples::SampleSet;
use crate::simplex::{CancelToken, FitStatus, NelderMead, SimplexConfig};
use log::{info, warn};
use ndarray::{Array1, ArrayView1};
use std::fmt;
use std::sync::Arc;

/// Immutable outcome of a single fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Display name of the fitted model
    pub model_name: String,

    /// Formula of the fitted model
    pub formula: String,

    /// Best parameters, `a, b, c, ...` in order
    pub params: Array1<f64>,

    /// Parameter names matching `params`
    pub param_names: Vec<String>,

    /// Sum of squared residuals at `params`
    pub ssr: f64,

    /// Coefficient of determination, `None` when the variance of y is zero
    pub r_squared: Option<f64>,

    /// Root mean squared residual
    pub std_dev: f64,

    /// Iterations over all restarts
    pub iterations: usize,

    /// Restarts performed
    pub restarts: usize,

    /// Objective evaluations
    pub func_evals: usize,

    /// How the fit ended
    pub status: FitStatus,

    /// Number of samples fitted
    pub n_samples: usize,

    /// A message describing the result
    pub message: String,

    model: Option<Arc<dyn Model>>,
}

/// A fitted function `x -> f(p*, x)` borrowed from a [`FitResult`].
#[derive(Debug, Clone, Copy)]
pub struct FittedFunction<'a> {
    model: &'a dyn Model,
    params: ArrayView1<'a, f64>,
}

impl FittedFunction<'_> {
    /// Evaluate the fitted function at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        self.model.eval(self.params, x)
    }

    /// The underlying model.
    pub fn model(&self) -> &dyn Model {
        self.model
    }
}

impl FitResult {
    /// Result for a fit that could not start.
    fn initialization_failure(name: &str, formula: &str, n_samples: usize, message: String) -> Self {
        warn!("{}: fit not started: {}", name, message);
        Self {
            model_name: name.to_string(),
            formula: formula.to_string(),
            params: Array1::zeros(0),
            param_names: Vec::new(),
            ssr: f64::NAN,
            r_squared: None,
            std_dev: f64::NAN,
            iterations: 0,
            restarts: 0,
            func_evals: 0,
            status: FitStatus::InitializationFailure,
            n_samples,
            message,
            model: None,
        }
    }

    /// Number of fitted parameters.
    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// True for `OK` and `MAX_ITER` results with a finite SSR.
    pub fn is_success(&self) -> bool {
        matches!(self.status, FitStatus::Ok | FitStatus::MaxIter) && self.ssr.is_finite()
    }

    /// The fitted model, if the fit got far enough to have one.
    pub fn model(&self) -> Option<&Arc<dyn Model>> {
        self.model.as_ref()
    }

    /// True when [`function`](Self::function) would succeed.
    pub fn has_function(&self) -> bool {
        self.function().is_ok()
    }

    /// The fitted function.
    ///
    /// # Errors
    ///
    /// `NoFunction` when the fit failed to start, every vertex was non-finite,
    /// or the parameters do not match the model.
    pub fn function(&self) -> Result<FittedFunction<'_>> {
        let model = self.model.as_deref().ok_or_else(|| {
            CurveFitError::NoFunction(format!("{} fit has no model", self.model_name))
        })?;
        if !self.status.has_parameters() {
            return Err(CurveFitError::NoFunction(format!(
                "{} fit ended with status {}",
                self.model_name, self.status
            )));
        }
        if self.params.len() != model.parameter_count() || self.params.iter().any(|p| !p.is_finite())
        {
            return Err(CurveFitError::NoFunction(format!(
                "{} fit has no usable parameters",
                self.model_name
            )));
        }
        Ok(FittedFunction {
            model,
            params: self.params.view(),
        })
    }

    /// Evaluate the fitted function at `x`.
    pub fn eval(&self, x: f64) -> Result<f64> {
        Ok(self.function()?.eval(x))
    }

    /// The plain-text report, one `key: value` line per field.
    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.model_name)?;
        writeln!(f, "Formula: {}", self.formula)?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(f, "Restarts: {}", self.restarts)?;
        writeln!(f, "Samples: {}", self.n_samples)?;
        match self.r_squared {
            Some(r2) => writeln!(f, "R^2: {:.4}", r2)?,
            None => writeln!(f, "R^2: undefined")?,
        }
        writeln!(f, "Sum of residuals squared: {}", format_significant(self.ssr, 5))?;
        writeln!(f, "Standard deviation: {}", format_significant(self.std_dev, 5))?;
        writeln!(f, "Parameters: {}", self.params.len())?;
        for (name, value) in self.param_names.iter().zip(self.params.iter()) {
            writeln!(f, "{} = {}", name, format_significant(*value, 5))?;
        }
        Ok(())
    }
}

/// Format `value` with `digits` significant digits.
///
/// Plain decimal notation for magnitudes in `[1e-4, 1e9)`, scientific
/// notation otherwise.
pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }
    let exponent = value.abs().log10().floor() as i32;
    if (-4..9).contains(&exponent) {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        format!("{:.*}", decimals, value)
    } else {
        format!("{:.*e}", digits - 1, value)
    }
}

/// Runs fits over one sample set.
#[derive(Debug, Clone)]
pub struct CurveFitter<'a> {
    samples: &'a SampleSet,
    config: SimplexConfig,
    initial_params: Option<Array1<f64>>,
    cancel: Option<CancelToken>,
}

impl<'a> CurveFitter<'a> {
    /// Create a fitter with default minimizer settings.
    pub fn new(samples: &'a SampleSet) -> Self {
        Self {
            samples,
            config: SimplexConfig::default(),
            initial_params: None,
            cancel: None,
        }
    }

    /// Override the minimizer settings.
    pub fn with_config(mut self, config: SimplexConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from `params` instead of the model's seed heuristic.
    pub fn with_initial_params(mut self, params: Array1<f64>) -> Self {
        self.initial_params = Some(params);
        self
    }

    /// Allow the host to abort the fit.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fit a built-in family.
    pub fn fit_builtin(&self, model: BuiltinModel) -> FitResult {
        self.fit_model(Arc::new(*model.descriptor()))
    }

    /// Compile `formula` and fit it.
    ///
    /// A formula that does not parse or has no parameters yields an
    /// `INITIALIZATION_FAILURE` result.
    pub fn fit_user_formula(&self, formula: &str) -> FitResult {
        match FormulaModel::compile(formula) {
            Ok(model) => self.fit_model(Arc::new(model)),
            Err(e) => FitResult::initialization_failure(
                FormulaModel::NAME,
                formula.trim(),
                self.samples.len(),
                e.to_string(),
            ),
        }
    }

    /// Fit any model.
    pub fn fit_model(&self, model: Arc<dyn Model>) -> FitResult {
        let n = model.parameter_count();
        let n_samples = self.samples.len();

        if n == 0 || n > MAX_PARAMS {
            return FitResult::initialization_failure(
                model.name(),
                model.formula(),
                n_samples,
                format!("model has {} parameters, expected 1 to {}", n, MAX_PARAMS),
            );
        }

        let seed = match &self.initial_params {
            Some(params) if params.len() != n => {
                return FitResult::initialization_failure(
                    model.name(),
                    model.formula(),
                    n_samples,
                    format!("{} initial values given for {} parameters", params.len(), n),
                );
            }
            Some(params) => params.clone(),
            None => model.guess_parameters(self.samples.x(), self.samples.y()),
        };

        let mut minimizer = NelderMead::with_config(self.config.clone());
        if let Some(token) = &self.cancel {
            minimizer = minimizer.with_cancel_token(token.clone());
        }

        let problem = CurveProblem::new(self.samples, model.as_ref());
        let outcome = minimizer.minimize(&problem, &seed);

        let usable = outcome.status.has_parameters() && outcome.cost.is_finite();
        let (r_squared, std_dev) = if usable {
            (problem.r_squared(outcome.cost), problem.std_dev(outcome.cost))
        } else {
            (None, f64::NAN)
        };

        match outcome.status {
            FitStatus::Ok | FitStatus::MaxIter => info!(
                "{} fit: {} after {} iterations ({} restarts), SSR {:e}",
                model.name(),
                outcome.status,
                outcome.iterations,
                outcome.restarts,
                outcome.cost
            ),
            status => warn!("{} fit: {}: {}", model.name(), status, outcome.message),
        }

        FitResult {
            model_name: model.name().to_string(),
            formula: model.formula().to_string(),
            param_names: model.parameter_names(),
            params: outcome.params,
            ssr: outcome.cost,
            r_squared,
            std_dev,
            iterations: outcome.iterations,
            restarts: outcome.restarts,
            func_evals: outcome.func_evals,
            status: outcome.status,
            n_samples,
            message: outcome.message,
            model: Some(model),
        }
    }
}

/// Fit a built-in family with optional settings overrides.
pub fn fit_builtin(
    samples: &SampleSet,
    model: BuiltinModel,
    settings: Option<&SimplexConfig>,
) -> FitResult {
    let fitter = CurveFitter::new(samples);
    match settings {
        Some(config) => fitter.with_config(config.clone()).fit_builtin(model),
        None => fitter.fit_builtin(model),
    }
}

/// Fit a user formula with optional settings overrides.
pub fn fit_user_formula(
    samples: &SampleSet,
    formula: &str,
    settings: Option<&SimplexConfig>,
) -> FitResult {
    let fitter = CurveFitter::new(samples);
    match settings {
        Some(config) => fitter.with_config(config.clone()).fit_user_formula(formula),
        None => fitter.fit_user_formula(formula),
    }
}
