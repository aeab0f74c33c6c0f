//! Built-in model families and the registry that enumerates them.
//!
//! Every built-in is a [`ModelDescriptor`]: a static record holding the display
//! name, formula, parameter count, evaluator and seed heuristic. The families
//! live in sub-modules grouped by shape; [`BuiltinModel`] gives them a stable
//! display order and name lookup.

use crate::error::{CurveFitError, Result};
use crate::model::Model;
use log::warn;
use ndarray::{Array1, ArrayView1};
use std::fmt;
use std::str::FromStr;

mod exponential;
mod formula;
mod peak;
mod polynomial;
mod sigmoid;

pub use formula::FormulaModel;

/// Label the host shows for the user-formula entry, after all built-ins.
pub const USER_DEFINED: &str = "*User-defined*";

/// Evaluator signature of a built-in family.
pub type EvalFn = fn(ArrayView1<f64>, f64) -> f64;

/// Seed heuristic signature of a built-in family.
pub type SeedFn = fn(&Array1<f64>, &Array1<f64>) -> Array1<f64>;

/// Immutable description of a built-in model family.
#[derive(Debug, Clone, Copy)]
pub struct ModelDescriptor {
    /// Display label
    pub name: &'static str,
    /// Formula with `a, b, ...` as parameters
    pub formula: &'static str,
    /// Number of parameters referenced by `eval`
    pub n_params: usize,
    eval: EvalFn,
    seed: SeedFn,
}

impl ModelDescriptor {
    pub(crate) const fn new(
        name: &'static str,
        formula: &'static str,
        n_params: usize,
        eval: EvalFn,
        seed: SeedFn,
    ) -> Self {
        Self {
            name,
            formula,
            n_params,
            eval,
            seed,
        }
    }
}

impl Model for ModelDescriptor {
    fn name(&self) -> &str {
        self.name
    }

    fn formula(&self) -> &str {
        self.formula
    }

    fn parameter_count(&self) -> usize {
        self.n_params
    }

    fn eval(&self, params: ArrayView1<f64>, x: f64) -> f64 {
        (self.eval)(params, x)
    }

    fn guess_parameters(&self, x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
        let mut seed = (self.seed)(x, y);
        assert_eq!(
            seed.len(),
            self.n_params,
            "seed of '{}' has {} values for {} parameters",
            self.name,
            seed.len(),
            self.n_params
        );

        // Degenerate data (overflowing exponentials, zero spans) must not leak
        // non-finite values into the simplex.
        for (i, value) in seed.iter_mut().enumerate() {
            if !value.is_finite() {
                warn!(
                    "{}: non-finite seed for parameter {} replaced by 1.0",
                    self.name, i
                );
                *value = 1.0;
            }
        }
        seed
    }
}

/// The built-in model families, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinModel {
    StraightLine,
    Poly2,
    Poly3,
    Poly4,
    Exponential,
    Power,
    Log,
    Rodbard,
    GammaVariate,
    Log2,
    InverseRodbard,
    ExponentialWithOffset,
    Gaussian,
    ExponentialRecovery,
    Logistic,
}

impl BuiltinModel {
    /// All built-ins in stable display order.
    pub const ALL: [BuiltinModel; 15] = [
        BuiltinModel::StraightLine,
        BuiltinModel::Poly2,
        BuiltinModel::Poly3,
        BuiltinModel::Poly4,
        BuiltinModel::Exponential,
        BuiltinModel::Power,
        BuiltinModel::Log,
        BuiltinModel::Rodbard,
        BuiltinModel::GammaVariate,
        BuiltinModel::Log2,
        BuiltinModel::InverseRodbard,
        BuiltinModel::ExponentialWithOffset,
        BuiltinModel::Gaussian,
        BuiltinModel::ExponentialRecovery,
        BuiltinModel::Logistic,
    ];

    /// The static descriptor of this family.
    pub fn descriptor(self) -> &'static ModelDescriptor {
        match self {
            BuiltinModel::StraightLine => &polynomial::STRAIGHT_LINE,
            BuiltinModel::Poly2 => &polynomial::POLY2,
            BuiltinModel::Poly3 => &polynomial::POLY3,
            BuiltinModel::Poly4 => &polynomial::POLY4,
            BuiltinModel::Exponential => &exponential::EXPONENTIAL,
            BuiltinModel::Power => &exponential::POWER,
            BuiltinModel::Log => &exponential::LOG,
            BuiltinModel::Rodbard => &sigmoid::RODBARD,
            BuiltinModel::GammaVariate => &peak::GAMMA_VARIATE,
            BuiltinModel::Log2 => &exponential::LOG2,
            BuiltinModel::InverseRodbard => &sigmoid::INVERSE_RODBARD,
            BuiltinModel::ExponentialWithOffset => &exponential::EXP_WITH_OFFSET,
            BuiltinModel::Gaussian => &peak::GAUSSIAN,
            BuiltinModel::ExponentialRecovery => &exponential::EXP_RECOVERY,
            BuiltinModel::Logistic => &sigmoid::LOGISTIC,
        }
    }

    /// Display name, e.g. "Straight Line".
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Formula string, e.g. "y = a+bx".
    pub fn formula(self) -> &'static str {
        self.descriptor().formula
    }

    /// Number of parameters.
    pub fn parameter_count(self) -> usize {
        self.descriptor().n_params
    }

    /// Look up a built-in by its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.iter().copied().find(|m| m.name() == name)
    }
}

impl fmt::Display for BuiltinModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinModel {
    type Err = CurveFitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| CurveFitError::UnknownModel(s.to_string()))
    }
}

/// A selection from the host's model menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    Builtin(BuiltinModel),
    UserDefined,
}

impl ModelChoice {
    /// Resolve a menu label; the user-formula entry is [`USER_DEFINED`].
    pub fn from_name(name: &str) -> Result<Self> {
        if name.trim() == USER_DEFINED {
            Ok(ModelChoice::UserDefined)
        } else {
            name.parse().map(ModelChoice::Builtin)
        }
    }
}

/// Menu labels in display order, user formula last.
pub fn model_choices() -> Vec<&'static str> {
    BuiltinModel::ALL
        .iter()
        .map(|m| m.name())
        .chain(std::iter::once(USER_DEFINED))
        .collect()
}

/// Ordinary least-squares line through `(x, y)` pairs.
///
/// Returns `(intercept, slope)`, or `None` with fewer than two pairs or no
/// spread in x.
pub(crate) fn linear_fit<I>(points: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (mut n, mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (x, y) in points {
        n += 1.0;
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
    }
    if n < 2.0 {
        return None;
    }
    let denom = n * sxx - sx * sx;
    if denom.abs() <= f64::EPSILON * n * sxx.abs() {
        return None;
    }
    let slope = (n * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / n;
    if slope.is_finite() && intercept.is_finite() {
        Some((intercept, slope))
    } else {
        None
    }
}

/// `v`, or `fallback` when `v` is zero or not finite.
pub(crate) fn nonzero_or(v: f64, fallback: f64) -> f64 {
    if v != 0.0 && v.is_finite() {
        v
    } else {
        fallback
    }
}
