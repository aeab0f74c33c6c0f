//! Sigmoidal models: Rodbard (four-parameter logistic in x), its inverse as
//! used by NIH Image calibration, and the exponential logistic.

use super::{linear_fit, nonzero_or, ModelDescriptor};
use crate::samples::SampleStats;
use ndarray::{array, Array1, ArrayView1};

pub(crate) static RODBARD: ModelDescriptor = ModelDescriptor::new(
    "Rodbard",
    "y = d+(a-d)/(1+(x/c)^b)",
    4,
    eval_rodbard,
    seed_rodbard,
);

/// Rodbard solved for y: `x = d+(a-d)/(1+(y/c)^b)`.
pub(crate) static INVERSE_RODBARD: ModelDescriptor = ModelDescriptor::new(
    "Rodbard (NIH Image)",
    "y = c*((x-a)/(d-x))^(1/b)",
    4,
    eval_inverse_rodbard,
    seed_inverse_rodbard,
);

pub(crate) static LOGISTIC: ModelDescriptor = ModelDescriptor::new(
    "Logistic",
    "y = a/(1+exp(-b*(x-c))) + d",
    4,
    eval_logistic,
    seed_logistic,
);

fn eval_rodbard(p: ArrayView1<f64>, x: f64) -> f64 {
    let ratio = (x / p[2]).powf(p[1]);
    p[3] + (p[0] - p[3]) / (1.0 + ratio)
}

fn eval_inverse_rodbard(p: ArrayView1<f64>, x: f64) -> f64 {
    let ratio = (x - p[0]) / (p[3] - x);
    p[2] * ratio.powf(1.0 / p[1])
}

fn eval_logistic(p: ArrayView1<f64>, x: f64) -> f64 {
    p[0] / (1.0 + (-p[1] * (x - p[2])).exp()) + p[3]
}

fn seed_rodbard(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    array![
        stats.first_y,
        1.0,
        nonzero_or(stats.x_mean, 1.0),
        stats.last_y
    ]
}

/// Asymptotes `a` and `d` just outside the x range, `c` scaled so the curve
/// passes through the mean point.
fn seed_inverse_rodbard(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    let a = stats.x_min - 0.1 * stats.x_span();
    let d = stats.x_max + 0.1 * stats.x_span();
    let ratio = (stats.x_mean - a) / (d - stats.x_mean);
    let c = nonzero_or(stats.y_mean, 1.0) / ratio;
    array![a, 1.0, c, d]
}

/// Height and baseline from the y range, midpoint at the sample closest to
/// half height, steepness 4/span signed by the overall trend.
fn seed_logistic(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let stats = SampleStats::of(x, y);
    let half = 0.5 * (stats.y_max + stats.y_min);

    let mut center = stats.x_mean;
    let mut best = f64::INFINITY;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dist = (yi - half).abs();
        if dist < best {
            best = dist;
            center = xi;
        }
    }

    let trend = linear_fit(x.iter().copied().zip(y.iter().copied()))
        .map(|(_, slope)| slope)
        .unwrap_or(1.0);
    let steepness = if trend < 0.0 { -4.0 } else { 4.0 } / stats.x_span();

    array![stats.y_max - stats.y_min, steepness, center, stats.y_min]
}
