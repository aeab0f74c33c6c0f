//! Problem definition trait and the least-squares curve objective.
//!
//! This module defines the `Problem` trait, the scalar objective the simplex
//! minimizer drives, and [`CurveProblem`], which measures how well a [`Model`]
//! reproduces a [`SampleSet`].

use crate::model::Model;
use crate::samples::SampleSet;
use ndarray::{Array1, ArrayView1};

/// A trait representing a scalar minimization problem.
///
/// Implementations must be pure: the same parameters always give the same cost.
/// A non-finite point is reported as `f64::INFINITY`, never as NaN, so that a
/// minimizer can rank it as worst.
pub trait Problem {
    /// Evaluate the cost at the given parameters.
    fn eval_cost(&self, params: ArrayView1<f64>) -> f64;

    /// Get the number of parameters in the problem.
    fn parameter_count(&self) -> usize;
}

/// Sum of squared residuals of a model over a sample set.
#[derive(Debug, Clone, Copy)]
pub struct CurveProblem<'a, M: Model + ?Sized> {
    samples: &'a SampleSet,
    model: &'a M,
}

impl<'a, M: Model + ?Sized> CurveProblem<'a, M> {
    /// Create a problem for `model` over `samples`.
    pub fn new(samples: &'a SampleSet, model: &'a M) -> Self {
        Self { samples, model }
    }

    /// The samples being fitted.
    pub fn samples(&self) -> &SampleSet {
        self.samples
    }

    /// `y_i - f(p, x_i)` for every sample.
    pub fn residuals(&self, params: ArrayView1<f64>) -> Array1<f64> {
        let predicted = self.model.eval_array(params, self.samples.x());
        self.samples.y() - &predicted
    }

    /// `SSR(p) = sum (y_i - f(p, x_i))^2`, or `+inf` as soon as a residual is not finite.
    pub fn ssr(&self, params: ArrayView1<f64>) -> f64 {
        let mut sum = 0.0;
        for (&x, &y) in self.samples.x().iter().zip(self.samples.y().iter()) {
            let r = y - self.model.eval(params, x);
            if !r.is_finite() {
                return f64::INFINITY;
            }
            sum += r * r;
        }
        if sum.is_finite() {
            sum
        } else {
            f64::INFINITY
        }
    }

    /// Total sum of squares `sum (y_i - mean(y))^2`.
    pub fn total_sum_of_squares(&self) -> f64 {
        total_sum_of_squares(self.samples.y())
    }

    /// Coefficient of determination for a given SSR.
    pub fn r_squared(&self, ssr: f64) -> Option<f64> {
        r_squared(ssr, self.total_sum_of_squares())
    }

    /// Root mean squared residual `sqrt(SSR / n)`.
    pub fn std_dev(&self, ssr: f64) -> f64 {
        (ssr / self.samples.len() as f64).sqrt()
    }
}

impl<M: Model + ?Sized> Problem for CurveProblem<'_, M> {
    fn eval_cost(&self, params: ArrayView1<f64>) -> f64 {
        self.ssr(params)
    }

    fn parameter_count(&self) -> usize {
        self.model.parameter_count()
    }
}

/// `sum (y_i - mean(y))^2`, zero for an empty slice.
pub fn total_sum_of_squares(y: &Array1<f64>) -> f64 {
    match y.mean() {
        Some(mean) => y.iter().map(|&v| (v - mean) * (v - mean)).sum(),
        None => 0.0,
    }
}

/// `1 - ssr / sst`, or `None` when `sst` is not positive or the ratio is not finite.
pub fn r_squared(ssr: f64, sst: f64) -> Option<f64> {
    if sst > 0.0 {
        let r2 = 1.0 - ssr / sst;
        r2.is_finite().then_some(r2)
    } else {
        None
    }
}
