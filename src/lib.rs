//! # curvefit-rs
//!
//! `curvefit-rs` fits parametric curves to `(x, y)` samples by minimizing the
//! sum of squared residuals with a Nelder-Mead downhill simplex.
//!
//! The library provides:
//! - A registry of built-in model families (polynomials, exponentials, power,
//!   log, Rodbard, gamma variate, Gaussian, logistic, ...)
//! - User-defined models from formulas such as `y = a*exp(-b*x) + c`
//! - A simplex minimizer with restarts, iteration budget and cancellation
//! - Fit diagnostics (R², SSR, status) and a plain-text report
//! - Thin ports for text input, plotting and pixelwise image transforms
//!
//! ## Basic Usage
//!
//! ```
//! use curvefit_rs::{decode_samples, fit_builtin, BuiltinModel, DecodeOptions, FitStatus};
//!
//! let samples = decode_samples("0 1\n1 3\n2 5\n3 7", &DecodeOptions::default()).unwrap();
//! let result = fit_builtin(&samples, BuiltinModel::StraightLine, None);
//!
//! assert_eq!(result.status, FitStatus::Ok);
//! assert!((result.params[1] - 2.0).abs() < 1e-6);
//! println!("{}", result.report());
//! ```

// Public modules
pub mod cache;
pub mod error;
pub mod expression;
pub mod fit;
pub mod io;
pub mod model;
pub mod models;
pub mod plot;
pub mod problem;
pub mod samples;
pub mod simplex;
pub mod transform;

// Re-exports for convenience
pub use cache::LastFit;
pub use error::{CurveFitError, Result};
pub use fit::{fit_builtin, fit_user_formula, CurveFitter, FitResult, FittedFunction};
pub use io::{decode_samples, load_samples, DecodeOptions, LoadOptions};
pub use model::Model;
pub use models::{model_choices, BuiltinModel, FormulaModel, ModelChoice};
pub use plot::{build_plot, render_fit, FitPlot, PlotSink};
pub use problem::{CurveProblem, Problem};
pub use samples::SampleSet;
pub use simplex::{CancelToken, FitStatus, NelderMead, SimplexConfig};
pub use transform::{transform_pixels, FloatSurface, PixelSource};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
