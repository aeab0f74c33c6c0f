//! Polynomial models of degree 1 through 4.
//!
//! Coefficients are ordered by ascending power, `y = a + b*x + c*x^2 + ...`.
//! Seeds come from an SVD least-squares solve of the Vandermonde system, which
//! for a polynomial is already the optimum; the simplex then only polishes it.

use super::{linear_fit, ModelDescriptor};
use crate::samples::SampleStats;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1};

pub(crate) static STRAIGHT_LINE: ModelDescriptor =
    ModelDescriptor::new("Straight Line", "y = a+bx", 2, eval_poly, seed_line);

pub(crate) static POLY2: ModelDescriptor = ModelDescriptor::new(
    "2nd Degree Polynomial",
    "y = a+bx+cx^2",
    3,
    eval_poly,
    seed_poly2,
);

pub(crate) static POLY3: ModelDescriptor = ModelDescriptor::new(
    "3rd Degree Polynomial",
    "y = a+bx+cx^2+dx^3",
    4,
    eval_poly,
    seed_poly3,
);

pub(crate) static POLY4: ModelDescriptor = ModelDescriptor::new(
    "4th Degree Polynomial",
    "y = a+bx+cx^2+dx^3+ex^4",
    5,
    eval_poly,
    seed_poly4,
);

/// Horner evaluation; the degree is implied by the parameter count.
fn eval_poly(p: ArrayView1<f64>, x: f64) -> f64 {
    p.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

fn seed_line(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    seed_polynomial(x, y, 1)
}

fn seed_poly2(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    seed_polynomial(x, y, 2)
}

fn seed_poly3(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    seed_polynomial(x, y, 3)
}

fn seed_poly4(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    seed_polynomial(x, y, 4)
}

fn seed_polynomial(x: &Array1<f64>, y: &Array1<f64>, degree: usize) -> Array1<f64> {
    if let Some(coeffs) = least_squares(x, y, degree) {
        return coeffs;
    }

    // Underdetermined or singular: start from the best line, higher terms zero.
    let mut seed = Array1::zeros(degree + 1);
    let (intercept, slope) = linear_fit(x.iter().copied().zip(y.iter().copied()))
        .unwrap_or_else(|| {
            let stats = SampleStats::of(x, y);
            (stats.y_mean, 0.0)
        });
    seed[0] = intercept;
    seed[1] = slope;
    seed
}

/// Least-squares polynomial coefficients, `None` when the system is underdetermined
/// or the solve is not finite.
fn least_squares(x: &Array1<f64>, y: &Array1<f64>, degree: usize) -> Option<Array1<f64>> {
    let n = x.len();
    let k = degree + 1;
    if n < k || y.len() != n {
        return None;
    }

    let design = DMatrix::from_fn(n, k, |i, j| x[i].powi(j as i32));
    let rhs = DVector::from_iterator(n, y.iter().copied());
    let coeffs = design.svd(true, true).solve(&rhs, 1e-12).ok()?;

    if coeffs.iter().all(|c| c.is_finite()) {
        Some(coeffs.iter().copied().collect())
    } else {
        None
    }
}
