//! Exponential, power-law and logarithmic models.
//!
//! Seeds linearize the model where the data allow it (log of y, log of x) and
//! fall back to scale-based guesses otherwise.

use super::{linear_fit, nonzero_or, ModelDescriptor};
use crate::samples::SampleStats;
use ndarray::{array, Array1, ArrayView1};

pub(crate) static EXPONENTIAL: ModelDescriptor = ModelDescriptor::new(
    "Exponential",
    "y = a*exp(bx)",
    2,
    eval_exponential,
    seed_exponential,
);

pub(crate) static POWER: ModelDescriptor =
    ModelDescriptor::new("Power", "y = a*x^b", 2, eval_power, seed_power);

pub(crate) static LOG: ModelDescriptor = ModelDescriptor::new(
    "Log",
    "y = a*ln(bx)",
    2,
    eval_log,
    seed_log,
);

pub(crate) static LOG2: ModelDescriptor = ModelDescriptor::new(
    "Log2",
    "y = a+b*ln(x-c)",
    3,
    eval_log2,
    seed_log2,
);

pub(crate) static EXP_WITH_OFFSET: ModelDescriptor = ModelDescriptor::new(
    "Exponential with Offset",
    "y = a*exp(-bx) + c",
    3,
    eval_exp_with_offset,
    seed_exp_with_offset,
);

pub(crate) static EXP_RECOVERY: ModelDescriptor = ModelDescriptor::new(
    "Exponential Recovery",
    "y = a*(1-exp(-b*x)) + c",
    3,
    eval_exp_recovery,
    seed_exp_recovery,
);

fn eval_exponential(p: ArrayView1<f64>, x: f64) -> f64 {
    p[0] * (p[1] * x).exp()
}

fn eval_power(p: ArrayView1<f64>, x: f64) -> f64 {
    p[0] * x.powf(p[1])
}

fn eval_log(p: ArrayView1<f64>, x: f64) -> f64 {
    p[0] * (p[1] * x).ln()
}

fn eval_log2(p: ArrayView1<f64>, x: f64) -> f64 {
    p[0] + p[1] * (x - p[2]).ln()
}

fn eval_exp_with_offset(p: ArrayView1<f64>, x: f64) -> f64 {
    p[0] * (-p[1] * x).exp() + p[2]
}

fn eval_exp_recovery(p: ArrayView1<f64>, x: f64) -> f64 {
    p[0] * (1.0 - (-p[1] * x).exp()) + p[2]
}

/// Fit `ln|y| = ln|a| + b*x` when all y share a sign.
fn seed_exponential(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    let sign = if stats.y_max < 0.0 { -1.0 } else { 1.0 };

    if y.iter().all(|&v| v * sign > 0.0) {
        let points = x.iter().zip(y.iter()).map(|(&xi, &yi)| (xi, (yi * sign).ln()));
        if let Some((ln_a, b)) = linear_fit(points) {
            let a = sign * ln_a.exp();
            if a.is_finite() && a != 0.0 {
                return array![a, b];
            }
        }
    }

    array![nonzero_or(stats.y_mean, 1.0), 0.1 / stats.x_span()]
}

/// Fit `ln|y| = ln|a| + b*ln(x)` over the samples with positive x.
fn seed_power(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    let sign = if stats.y_max < 0.0 { -1.0 } else { 1.0 };

    let usable = x
        .iter()
        .zip(y.iter())
        .filter(|&(&xi, &yi)| xi > 0.0 && yi * sign > 0.0)
        .map(|(&xi, &yi)| (xi.ln(), (yi * sign).ln()))
        .collect::<Vec<_>>();

    if let Some((ln_a, b)) = linear_fit(usable) {
        let a = sign * ln_a.exp();
        if a.is_finite() && a != 0.0 {
            return array![a, b];
        }
    }

    array![nonzero_or(stats.y_mean, 1.0), 1.0]
}

/// `a*ln(b*x) = a*ln(b) + a*ln(x)`, so a line in ln(x) gives both parameters.
fn seed_log(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);

    if x.iter().all(|&v| v > 0.0) {
        let points = x.iter().zip(y.iter()).map(|(&xi, &yi)| (xi.ln(), yi));
        if let Some((intercept, slope)) = linear_fit(points) {
            if slope != 0.0 {
                let b = (intercept / slope).exp();
                if b.is_finite() && b > 0.0 {
                    return array![slope, b];
                }
            }
        }
    }

    array![nonzero_or(stats.y_mean, 1.0), 1.0 / nonzero_or(stats.x_mean, 1.0)]
}

/// Put `c` just left of the data, then fit a line in `ln(x - c)`.
fn seed_log2(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    let c = stats.x_min - 0.1 * stats.x_span();

    let points = x.iter().zip(y.iter()).map(|(&xi, &yi)| ((xi - c).ln(), yi));
    match linear_fit(points) {
        Some((a, b)) => array![a, b, c],
        None => array![stats.y_mean, 1.0, c],
    }
}

fn seed_exp_with_offset(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    let b = 1.0 / stats.x_span();
    let c = stats.last_y;
    let a = nonzero_or((stats.first_y - c) * (b * stats.first_x).exp(), stats.y_span());
    array![a, b, c]
}

fn seed_exp_recovery(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    let a = nonzero_or(stats.last_y - stats.first_y, stats.y_span());
    array![a, 1.0 / stats.x_span(), stats.first_y]
}
