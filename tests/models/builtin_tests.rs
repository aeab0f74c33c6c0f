//! Fits of clean data generated by each built-in family.

use crate::test_helpers::sampled;
use curvefit_rs::{fit_builtin, model_choices, BuiltinModel, FitStatus, Model, ModelChoice};
use ndarray::{array, Array1};

/// Generate clean data from `model` with `truth`, fit it, and return the fitted parameters.
fn refit(model: BuiltinModel, truth: Array1<f64>, start: f64, end: f64, n: usize) -> Array1<f64> {
    let descriptor = model.descriptor();
    let samples = sampled(|x| descriptor.eval(truth.view(), x), start, end, n);
    let result = fit_builtin(&samples, model, None);
    assert_eq!(result.status, FitStatus::Ok, "{}: {}", model, result.message);
    assert!(
        result.r_squared.unwrap() > 0.999_999,
        "{}: R^2 = {:?}",
        model,
        result.r_squared
    );
    result.params
}

fn assert_params(model: BuiltinModel, fitted: &Array1<f64>, truth: &Array1<f64>, tol: f64) {
    for (i, (f, t)) in fitted.iter().zip(truth.iter()).enumerate() {
        assert!(
            (f - t).abs() <= tol * t.abs().max(1.0),
            "{}: parameter {} is {}, expected {}",
            model,
            i,
            f,
            t
        );
    }
}

#[test]
fn polynomials_are_recovered() {
    let cases = [
        (BuiltinModel::StraightLine, array![0.5, -1.25]),
        (BuiltinModel::Poly2, array![1.0, -2.0, 0.5]),
        (BuiltinModel::Poly3, array![-1.0, 0.5, 0.25, -0.125]),
        (BuiltinModel::Poly4, array![2.0, 0.0, -1.0, 0.0, 0.1]),
    ];
    for (model, truth) in cases {
        let fitted = refit(model, truth.clone(), -3.0, 3.0, 25);
        assert_params(model, &fitted, &truth, 1e-6);
    }
}

#[test]
fn exponential_and_power_laws_are_recovered() {
    let cases = [
        (BuiltinModel::Exponential, array![3.0, 0.7], 0.0, 2.0),
        (BuiltinModel::Power, array![1.5, 2.5], 1.0, 5.0),
        (BuiltinModel::Log, array![2.0, 0.5], 1.0, 10.0),
    ];
    for (model, truth, start, end) in cases {
        let fitted = refit(model, truth.clone(), start, end, 20);
        assert_params(model, &fitted, &truth, 1e-6);
    }
}

#[test]
fn offset_exponentials_are_recovered() {
    let truth = array![5.0, 1.2, 0.5];
    let fitted = refit(BuiltinModel::ExponentialWithOffset, truth.clone(), 0.0, 4.0, 21);
    assert_params(BuiltinModel::ExponentialWithOffset, &fitted, &truth, 1e-5);

    let truth = array![3.0, 0.8, 1.0];
    let fitted = refit(BuiltinModel::ExponentialRecovery, truth.clone(), 0.0, 6.0, 25);
    assert_params(BuiltinModel::ExponentialRecovery, &fitted, &truth, 1e-5);
}

#[test]
fn logistic_is_recovered() {
    let truth = array![4.0, 1.5, 6.0, 1.0];
    let fitted = refit(BuiltinModel::Logistic, truth.clone(), 0.0, 10.0, 41);
    assert_params(BuiltinModel::Logistic, &fitted, &truth, 1e-5);
}

#[test]
fn rodbard_curves_are_recovered() {
    let truth = array![0.5, 2.0, 4.0, 8.0];
    let fitted = refit(BuiltinModel::Rodbard, truth.clone(), 0.5, 10.0, 40);
    assert_params(BuiltinModel::Rodbard, &fitted, &truth, 1e-3);

    // Asymptotes just outside [1, 9], where the seed puts them.
    let truth = array![0.2, 1.5, 3.0, 9.8];
    let fitted = refit(BuiltinModel::InverseRodbard, truth.clone(), 1.0, 9.0, 33);
    assert_params(BuiltinModel::InverseRodbard, &fitted, &truth, 1e-3);
}

#[test]
fn gamma_variate_is_recovered() {
    // Peak at x = a + c*d = 3.
    let truth = array![0.0, 2.0, 2.5, 1.2];
    let fitted = refit(BuiltinModel::GammaVariate, truth.clone(), 1.0, 11.0, 41);
    assert_params(BuiltinModel::GammaVariate, &fitted, &truth, 1e-3);
}

#[test]
fn shifted_log_is_recovered() {
    let truth = array![1.0, 2.0, 0.3];
    let fitted = refit(BuiltinModel::Log2, truth.clone(), 1.0, 10.0, 25);
    assert_params(BuiltinModel::Log2, &fitted, &truth, 1e-4);
}

#[test]
fn gaussian_width_sign_is_irrelevant() {
    let model = BuiltinModel::Gaussian.descriptor();
    let p = array![2.0, 1.0, 0.5, 0.0];
    let q = array![2.0, 1.0, -0.5, 0.0];
    for x in [0.0, 0.7, 1.0, 2.5] {
        assert_eq!(model.eval(p.view(), x), model.eval(q.view(), x));
    }
}

#[test]
fn registry_display_order() {
    let choices = model_choices();
    assert_eq!(choices.len(), BuiltinModel::ALL.len() + 1);
    assert_eq!(
        &choices[..4],
        &[
            "Straight Line",
            "2nd Degree Polynomial",
            "3rd Degree Polynomial",
            "4th Degree Polynomial"
        ]
    );
    assert_eq!(choices[choices.len() - 1], "*User-defined*");

    for (choice, model) in choices.iter().zip(BuiltinModel::ALL) {
        assert_eq!(
            ModelChoice::from_name(choice).unwrap(),
            ModelChoice::Builtin(model)
        );
        assert_eq!(model.to_string(), *choice);
    }
}

#[test]
fn parameter_names_follow_the_alphabet() {
    for model in BuiltinModel::ALL {
        let names = model.descriptor().parameter_names();
        assert_eq!(names.len(), model.parameter_count());
        assert_eq!(names[0], "a");
    }
    assert_eq!(
        BuiltinModel::Poly4.descriptor().parameter_names(),
        vec!["a", "b", "c", "d", "e"]
    );
}
