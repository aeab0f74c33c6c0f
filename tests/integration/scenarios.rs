//! End-to-end scenarios: text in, fit result and report out.

use crate::test_helpers::{line_samples, sampled};
use approx::assert_relative_eq;
use curvefit_rs::{
    decode_samples, fit_builtin, fit_user_formula, BuiltinModel, CurveFitError, CurveFitter,
    DecodeOptions, FitStatus, FormulaModel, SimplexConfig,
};
use ndarray::array;
use std::f64::consts::PI;

#[test]
fn straight_line_from_text() {
    let samples = decode_samples("0 1\n1 3\n2 5\n3 7\n", &DecodeOptions::default()).unwrap();
    assert_eq!(samples, line_samples());

    let result = fit_builtin(&samples, BuiltinModel::StraightLine, None);

    assert_eq!(result.status, FitStatus::Ok);
    assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-8);
    assert_relative_eq!(result.params[1], 2.0, epsilon = 1e-8);
    assert!(result.r_squared.unwrap() >= 1.0 - 1e-9);
    assert!(result.report().contains("R^2: 1.0000"));
}

#[test]
fn gaussian_peak() {
    let samples = sampled(
        |x| 3.0 * (-((x - 5.0) / 1.5f64).powi(2)).exp() + 0.1,
        0.0,
        10.0,
        21,
    );
    let result = fit_builtin(&samples, BuiltinModel::Gaussian, None);

    assert_eq!(result.status, FitStatus::Ok);
    assert_relative_eq!(result.params[0], 3.0, epsilon = 1e-4);
    assert_relative_eq!(result.params[1], 5.0, epsilon = 1e-4);
    assert_relative_eq!(result.params[2].abs(), 1.5, epsilon = 1e-4);
    assert_relative_eq!(result.params[3], 0.1, epsilon = 1e-4);
    assert!(result.r_squared.unwrap() > 0.999_999);
}

#[test]
fn user_formula_sine() {
    let samples = sampled(|x| 2.0 * (0.5 * x).sin(), 0.0, 4.0 * PI, 50);
    let result = CurveFitter::new(&samples)
        .with_initial_params(array![1.5, 0.55])
        .fit_user_formula("y = a*sin(b*x)");

    assert_eq!(result.status, FitStatus::Ok);
    assert_eq!(result.model_name, "User-defined");
    assert_eq!(result.formula, "y = a*sin(b*x)");
    // a*sin(b*x) = (-a)*sin(-b*x)
    assert_relative_eq!(result.params[0].abs(), 2.0, epsilon = 1e-4);
    assert_relative_eq!(result.params[1].abs(), 0.5, epsilon = 1e-4);
    assert!(result.params[0] * result.params[1] > 0.0);
}

#[test]
fn user_formula_sine_from_all_ones_stalls() {
    // From a = b = 1 the simplex settles on the flat a ~ 0 valley: a local
    // minimum, reported as converged but explaining almost none of the data.
    let samples = sampled(|x| 2.0 * (0.5 * x).sin(), 0.0, 4.0 * PI, 50);
    let result = fit_user_formula(&samples, "y = a*sin(b*x)", None);

    assert_eq!(result.status, FitStatus::Ok);
    assert!(result.params.iter().all(|p| p.is_finite()));
    assert!(result.r_squared.unwrap() < 0.1, "R^2 = {:?}", result.r_squared);

    let seed_ssr: f64 = samples
        .pairs()
        .map(|(x, y)| (x.sin() - y).powi(2))
        .sum();
    assert!(result.ssr <= seed_ssr);
}

#[test]
fn formula_without_parameters_is_not_fitted() {
    assert_eq!(FormulaModel::detect_parameter_count("y = 1"), 0);

    let result = fit_user_formula(&line_samples(), "y = 1", None);
    assert_eq!(result.status, FitStatus::InitializationFailure);
    assert_eq!(result.iterations, 0);
    assert!(result.model().is_none());
    assert!(result.message.contains("no parameters"));
}

#[test]
fn three_tokens_are_rejected_before_fitting() {
    let err = decode_samples("1 2 3", &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, CurveFitError::InvalidSamples(_)));
}

#[test]
fn budget_exhaustion_returns_best_so_far() {
    // SSR keeps falling as a grows, so the simplex expands until the budget runs out.
    let samples =
        curvefit_rs::SampleSet::from_pairs(&[(0.1, -1.0), (0.2, -1.0), (0.3, -1.0), (0.4, -1.0), (0.5, -1.0)])
            .unwrap();
    let config = SimplexConfig::default().with_max_iterations(50);
    let result = fit_user_formula(&samples, "y = a/(x-a)", Some(&config));

    assert_eq!(result.status, FitStatus::MaxIter);
    assert_eq!(result.iterations, 50);
    assert!(result.ssr.is_finite());
    assert!(result.is_success());

    let seed_ssr: f64 = samples
        .pairs()
        .map(|(x, y)| (y - 1.0 / (x - 1.0)).powi(2))
        .sum();
    assert!(result.ssr < seed_ssr);
    assert!(result.params[0] > 1.0);
}

#[test]
fn settings_loaded_from_json() {
    let config = SimplexConfig::from_json_str(r#"{ "max_iterations": 5, "max_restarts": 0 }"#)
        .unwrap();
    let samples = sampled(|x| 4.0 / (1.0 + (-1.5 * (x - 6.0)).exp()) + 1.0, 0.0, 10.0, 41);
    let result = fit_builtin(&samples, BuiltinModel::Logistic, Some(&config));

    assert_eq!(result.status, FitStatus::MaxIter);
    assert_eq!(result.iterations, 5);
}
