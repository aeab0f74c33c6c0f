//! Termination status and convergence tests for the simplex minimizer.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a minimization (and therefore a fit) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitStatus {
    /// Converged within tolerance, with restart agreement or restarts exhausted.
    Ok,

    /// The iteration budget ran out before convergence.
    MaxIter,

    /// No parameters, a non-finite seed, or an unusable sample set or formula.
    InitializationFailure,

    /// Every vertex of the initial simplex has a non-finite objective.
    NonFinite,

    /// The cancel flag was raised.
    Aborted,
}

impl FitStatus {
    /// The upper-case label used in reports, e.g. `MAX_ITER`.
    pub fn label(self) -> &'static str {
        match self {
            FitStatus::Ok => "OK",
            FitStatus::MaxIter => "MAX_ITER",
            FitStatus::InitializationFailure => "INITIALIZATION_FAILURE",
            FitStatus::NonFinite => "NON_FINITE",
            FitStatus::Aborted => "ABORTED",
        }
    }

    /// Returns a description of the status.
    pub fn description(self) -> &'static str {
        match self {
            FitStatus::Ok => "Converged",
            FitStatus::MaxIter => "Terminated: maximum iterations reached",
            FitStatus::InitializationFailure => "Initialization failure; no fit performed",
            FitStatus::NonFinite => "Terminated: objective not finite at any vertex",
            FitStatus::Aborted => "Aborted by user",
        }
    }

    /// True for statuses whose parameters downstream consumers may use.
    pub fn has_parameters(self) -> bool {
        matches!(self, FitStatus::Ok | FitStatus::MaxIter | FitStatus::Aborted)
    }
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `2 |hi - lo| <= ftol (|hi| + |lo|)`; exact ties always pass.
pub fn values_agree(lo: f64, hi: f64, ftol: f64) -> bool {
    if lo == hi {
        return true;
    }
    2.0 * (hi - lo).abs() <= ftol * (hi.abs() + lo.abs())
}

/// Every coordinate of `a` and `b` agrees within `xtol * max(|a_j|, 1)`.
pub fn points_agree(a: ArrayView1<f64>, b: ArrayView1<f64>, xtol: f64) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(&u, &v)| (u - v).abs() <= xtol * u.abs().max(1.0))
}

/// Relative spread of the objective across the simplex is within `ftol`.
pub fn function_converged(best: f64, worst: f64, ftol: f64) -> bool {
    best.is_finite() && worst.is_finite() && values_agree(best, worst, ftol)
}

/// Every vertex lies within `xtol` of the best vertex, coordinate by coordinate.
pub fn parameters_converged(vertices: ArrayView2<f64>, best: usize, xtol: f64) -> bool {
    let anchor = vertices.row(best);
    vertices
        .rows()
        .into_iter()
        .all(|row| points_agree(anchor, row, xtol))
}
