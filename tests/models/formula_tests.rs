//! User formulas: parsing, evaluation against the built-ins, and fitting.

use crate::test_helpers::{line_samples, sampled};
use approx::assert_relative_eq;
use curvefit_rs::expression::{CompiledExpression, ExpressionError};
use curvefit_rs::{
    fit_user_formula, BuiltinModel, CurveFitError, CurveFitter, FitStatus, FormulaModel, Model,
};
use ndarray::array;

#[test]
fn builtin_formulas_evaluate_like_the_builtins() {
    // Built-in formulas written without implicit multiplication parse as user formulas.
    let cases = [
        (BuiltinModel::Rodbard, array![0.2, 2.5, 4.0, 5.0]),
        (BuiltinModel::InverseRodbard, array![0.5, 1.7, 4.0, 12.0]),
        (BuiltinModel::Gaussian, array![3.0, 5.0, 1.5, 0.1]),
        (BuiltinModel::ExponentialRecovery, array![3.0, 0.8, 1.0]),
        (BuiltinModel::Logistic, array![4.0, 1.5, 6.0, 1.0]),
        (BuiltinModel::GammaVariate, array![0.5, 4.0, 1.8, 2.5]),
        (BuiltinModel::Log2, array![1.0, 2.0, 0.5]),
    ];

    for (builtin, params) in cases {
        let formula = FormulaModel::compile(builtin.formula()).unwrap();
        assert_eq!(formula.parameter_count(), builtin.parameter_count(), "{}", builtin);

        for x in [1.0, 2.5, 4.0, 7.5, 10.0] {
            let expected = builtin.descriptor().eval(params.view(), x);
            let actual = formula.eval(params.view(), x);
            assert_relative_eq!(actual, expected, max_relative = 1e-12);
        }
    }
}

#[test]
fn parameter_count_comes_from_the_highest_letter() {
    assert_eq!(FormulaModel::detect_parameter_count("y = a"), 1);
    assert_eq!(FormulaModel::detect_parameter_count("y = c*x + b - a"), 3);
    assert_eq!(FormulaModel::detect_parameter_count("a*x + b*x^2 + c*x^3 + d"), 4);
    assert_eq!(FormulaModel::detect_parameter_count("y = sin(x)"), 0);
    assert_eq!(FormulaModel::detect_parameter_count("y = a*x + c"), 0);
    assert_eq!(FormulaModel::detect_parameter_count("y = a*x +"), 0);
}

#[test]
fn compile_errors_are_bad_formula() {
    for bad in ["y = 1", "y = a*x +", "y = a*cosh(x)", "y = a*z", "y = a + c"] {
        assert!(
            matches!(FormulaModel::compile(bad), Err(CurveFitError::BadFormula(_))),
            "{}",
            bad
        );
    }
    assert_eq!(
        CompiledExpression::parse("y = a + c*x"),
        Err(ExpressionError::NonContiguousParameters { missing: 'b' })
    );
}

#[test]
fn formula_with_constants_and_functions() {
    let samples = sampled(|x| 1.5 * (2.0 * std::f64::consts::PI * x / 4.0).cos() + 0.25, 0.0, 8.0, 33);
    let result = CurveFitter::new(&samples)
        .with_initial_params(array![1.0, 0.0])
        .fit_user_formula("y = a*cos(2*pi*x/4) + b");

    assert_eq!(result.status, FitStatus::Ok);
    assert_relative_eq!(result.params[0], 1.5, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 0.25, epsilon = 1e-6);
}

#[test]
fn formula_fit_of_a_line() {
    let result = fit_user_formula(&line_samples(), "y = a + b*x", None);
    assert_eq!(result.status, FitStatus::Ok);
    assert_eq!(result.param_names, vec!["a", "b"]);
    assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 2.0, epsilon = 1e-6);
}

#[test]
fn non_finite_initial_params_fail_to_initialize() {
    let result = CurveFitter::new(&line_samples())
        .with_initial_params(array![1.0, f64::NAN])
        .fit_user_formula("y = a + b*x");
    assert_eq!(result.status, FitStatus::InitializationFailure);
    assert!(!result.has_function());
}
