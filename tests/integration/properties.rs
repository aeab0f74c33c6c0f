//! Invariants that hold for every fit.

use crate::test_helpers::{line_samples, sampled};
use approx::assert_relative_eq;
use curvefit_rs::{
    fit_builtin, BuiltinModel, CurveFitError, CurveFitter, CurveProblem, FitStatus, Model,
    Problem, SampleSet, SimplexConfig,
};
use ndarray::Array1;

/// Positive x and y, wiggly enough that no family fits exactly.
fn generic_samples() -> SampleSet {
    sampled(|x| 2.0 + 0.5 * x + x.sin(), 1.0, 10.0, 10)
}

#[test]
fn every_builtin_seed_has_finite_ssr() {
    let samples = generic_samples();
    for model in BuiltinModel::ALL {
        let descriptor = model.descriptor();
        let seed = descriptor.guess_parameters(samples.x(), samples.y());
        assert_eq!(seed.len(), model.parameter_count(), "{}", model);

        let problem = CurveProblem::new(&samples, descriptor);
        let ssr = problem.eval_cost(seed.view());
        assert!(ssr.is_finite(), "{}: SSR at seed is {}", model, ssr);
    }
}

#[test]
fn fits_never_end_worse_than_the_seed() {
    let samples = generic_samples();
    let config = SimplexConfig::default().with_max_iterations(3000);

    for model in BuiltinModel::ALL {
        let descriptor = model.descriptor();
        let seed = descriptor.guess_parameters(samples.x(), samples.y());
        let seed_ssr = CurveProblem::new(&samples, descriptor).eval_cost(seed.view());

        let result = fit_builtin(&samples, model, Some(&config));
        assert!(
            matches!(result.status, FitStatus::Ok | FitStatus::MaxIter),
            "{}: {}",
            model,
            result.status
        );
        assert!(result.ssr <= seed_ssr, "{}: {} > {}", model, result.ssr, seed_ssr);

        // Reported parameter count matches the model.
        assert_eq!(result.params.len(), model.parameter_count());
        assert_eq!(result.param_names.len(), model.parameter_count());
        assert_eq!(result.parameter_count(), model.parameter_count());
    }
}

#[test]
fn fits_are_deterministic() {
    let samples = generic_samples();
    let first = fit_builtin(&samples, BuiltinModel::Rodbard, None);
    let second = fit_builtin(&samples, BuiltinModel::Rodbard, None);

    assert_eq!(first.status, second.status);
    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.func_evals, second.func_evals);
    for (a, b) in first.params.iter().zip(second.params.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn perfect_line_is_reproduced() {
    let samples = sampled(|x| -3.25 + 0.75 * x, -5.0, 5.0, 11);
    let result = fit_builtin(&samples, BuiltinModel::StraightLine, None);

    assert_eq!(result.status, FitStatus::Ok);
    assert!(result.r_squared.unwrap() >= 1.0 - 1e-9);
    for (x, y) in samples.pairs() {
        assert_relative_eq!(result.eval(x).unwrap(), y, epsilon = 1e-8);
    }
}

#[test]
fn refit_from_the_optimum_stays_there() {
    let samples = sampled(|x| 5.0 * (-1.2 * x).exp() + 0.5, 0.0, 4.0, 21);
    let first = fit_builtin(&samples, BuiltinModel::ExponentialWithOffset, None);
    assert_eq!(first.status, FitStatus::Ok);

    let second = CurveFitter::new(&samples)
        .with_initial_params(first.params.clone())
        .fit_builtin(BuiltinModel::ExponentialWithOffset);

    assert_eq!(second.status, FitStatus::Ok);
    for (a, b) in first.params.iter().zip(second.params.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }
}

#[test]
fn two_samples_are_enough_one_is_not() {
    let two = SampleSet::from_pairs(&[(1.0, 2.0), (3.0, 8.0)]).unwrap();
    let result = fit_builtin(&two, BuiltinModel::StraightLine, None);
    assert_eq!(result.status, FitStatus::Ok);
    assert_relative_eq!(result.params[0], -1.0, epsilon = 1e-8);
    assert_relative_eq!(result.params[1], 3.0, epsilon = 1e-8);

    assert!(matches!(
        SampleSet::from_pairs(&[(1.0, 2.0)]),
        Err(CurveFitError::InvalidSamples(_))
    ));
    assert!(matches!(
        SampleSet::new(Array1::zeros(3), Array1::zeros(2)),
        Err(CurveFitError::DimensionMismatch(_))
    ));
}

#[test]
fn constant_y_has_undefined_r_squared() {
    let samples = SampleSet::from_pairs(&[(0.0, 2.0), (1.0, 2.0), (2.0, 2.0), (3.0, 2.0)]).unwrap();
    let result = fit_builtin(&samples, BuiltinModel::StraightLine, None);

    assert!(result.ssr >= 0.0);
    assert!(result.ssr.is_finite());
    assert_eq!(result.r_squared, None);
    assert!(result.report().contains("R^2: undefined"));
}

#[test]
fn report_is_whitespace_parseable() {
    let result = fit_builtin(&line_samples(), BuiltinModel::StraightLine, None);
    let report = result.report();

    let value_of = |key: &str| -> String {
        report
            .lines()
            .find_map(|line| line.strip_prefix(key))
            .unwrap_or_else(|| panic!("no '{}' line", key))
            .trim()
            .to_string()
    };

    assert_eq!(value_of("Status:"), "OK");
    assert!(value_of("Iterations:").parse::<usize>().is_ok());
    assert!(value_of("Sum of residuals squared:").parse::<f64>().is_ok());
    let a: f64 = value_of("a =").parse().unwrap();
    let b: f64 = value_of("b =").parse().unwrap();
    assert_relative_eq!(a, 1.0, epsilon = 1e-4);
    assert_relative_eq!(b, 2.0, epsilon = 1e-4);
}
