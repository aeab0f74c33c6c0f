//! Fits of synthetic data with seeded Gaussian noise.

use crate::test_helpers::sampled_with_noise;
use approx::assert_relative_eq;
use curvefit_rs::{fit_builtin, fit_user_formula, BuiltinModel, FitStatus};

#[test]
fn exponential_decay_with_noise() {
    let samples = sampled_with_noise(|x| 5.0 * (-1.2 * x).exp() + 0.5, 0.0, 4.0, 41, 0.02, 7);
    let result = fit_builtin(&samples, BuiltinModel::ExponentialWithOffset, None);

    assert_eq!(result.status, FitStatus::Ok);
    assert_relative_eq!(result.params[0], 5.0, max_relative = 0.05);
    assert_relative_eq!(result.params[1], 1.2, max_relative = 0.05);
    assert_relative_eq!(result.params[2], 0.5, epsilon = 0.05);
    assert!(result.r_squared.unwrap() > 0.99);
    assert!(result.std_dev < 0.05);
}

#[test]
fn logistic_with_noise() {
    let samples = sampled_with_noise(
        |x| 4.0 / (1.0 + (-1.5 * (x - 6.0)).exp()) + 1.0,
        0.0,
        10.0,
        41,
        0.05,
        11,
    );
    let result = fit_builtin(&samples, BuiltinModel::Logistic, None);

    assert_eq!(result.status, FitStatus::Ok);
    assert_relative_eq!(result.params[0], 4.0, max_relative = 0.05);
    assert_relative_eq!(result.params[1], 1.5, max_relative = 0.1);
    assert_relative_eq!(result.params[2], 6.0, epsilon = 0.1);
    assert_relative_eq!(result.params[3], 1.0, epsilon = 0.1);
}

#[test]
fn user_formula_matches_builtin_on_noisy_quadratic() {
    let samples = sampled_with_noise(|x| 0.5 - 1.5 * x + 2.0 * x * x, -2.0, 3.0, 30, 0.1, 3);
    let builtin = fit_builtin(&samples, BuiltinModel::Poly2, None);
    let formula = fit_user_formula(&samples, "y = a + b*x + c*x^2", None);

    assert_eq!(builtin.status, FitStatus::Ok);
    assert_eq!(formula.status, FitStatus::Ok);
    for (a, b) in builtin.params.iter().zip(formula.params.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-3);
    }
    assert_relative_eq!(builtin.ssr, formula.ssr, max_relative = 1e-6);
}
