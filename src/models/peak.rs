//! Peak models for fitting data.
//!
//! This module provides the Gaussian peak and the gamma variate, the latter
//! commonly used for bolus-passage curves in perfusion imaging.

use super::{nonzero_or, ModelDescriptor};
use crate::samples::SampleStats;
use ndarray::{array, Array1, ArrayView1};

/// A Gaussian peak over a constant baseline.
///
/// f(x) = a * exp(-((x - b) / c)²) + d
///
/// - `a`: amplitude above the baseline
/// - `b`: center
/// - `c`: width (the sign is irrelevant, only c² enters)
/// - `d`: baseline
pub(crate) static GAUSSIAN: ModelDescriptor = ModelDescriptor::new(
    "Gaussian",
    "y = a*exp(-((x-b)/c)^2) + d",
    4,
    eval_gaussian,
    seed_gaussian,
);

/// Gamma variate, zero before the arrival time `a`.
///
/// f(x) = b * (x - a)^c * exp(-(x - a) / d)
pub(crate) static GAMMA_VARIATE: ModelDescriptor = ModelDescriptor::new(
    "Gamma Variate",
    "y = b*(x-a)^c*exp(-(x-a)/d)",
    4,
    eval_gamma_variate,
    seed_gamma_variate,
);

fn eval_gaussian(p: ArrayView1<f64>, x: f64) -> f64 {
    let arg = (x - p[1]) / p[2];
    p[0] * (-arg * arg).exp() + p[3]
}

fn eval_gamma_variate(p: ArrayView1<f64>, x: f64) -> f64 {
    let t = x - p[0];
    if t <= 0.0 {
        return 0.0;
    }
    p[1] * t.powf(p[2]) * (-t / p[3]).exp()
}

/// amplitude = max(y) - min(y), center = x at the max, width = span / 4,
/// baseline = min(y).
fn seed_gaussian(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    array![
        stats.y_max - stats.y_min,
        stats.x_at_y_max,
        stats.x_span() / 4.0,
        stats.y_min
    ]
}

/// Arrival just left of the data, shape 2, and the mode `a + c*d` on the peak.
fn seed_gamma_variate(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    let a = stats.x_min - 0.1 * stats.x_span();
    let c = 2.0;
    let t_peak = stats.x_at_y_max - a;
    let d = t_peak / c;
    let b = nonzero_or(stats.y_max, 1.0) / (t_peak.powf(c) * (-c).exp());
    array![a, b, c, d]
}
