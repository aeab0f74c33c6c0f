//! Plot model of a fit: data points, a dense sampling of the fitted curve,
//! axis limits and text labels.
//!
//! Rendering is left to the host through [`PlotSink`].

use crate::error::{CurveFitError, Result};
use crate::fit::{format_significant, FitResult, FittedFunction};
use crate::samples::SampleSet;
use log::warn;

/// Number of points used to draw the fitted curve.
pub const CURVE_POINTS: usize = 100;

/// The fitted curve sampled on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSamples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Sample `f` at `n` evenly spaced points from `x_min` to `x_max`, both included.
pub fn sample_curve(f: &FittedFunction<'_>, x_min: f64, x_max: f64, n: usize) -> CurveSamples {
    let inc = if n > 1 {
        (x_max - x_min) / (n - 1) as f64
    } else {
        0.0
    };
    let x = (0..n)
        .map(|i| x_min + i as f64 * inc)
        .collect::<Vec<f64>>();
    let y = x.iter().map(|&v| f.eval(v)).collect();
    CurveSamples { x, y }
}

/// Axis limits of a plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLimits {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlotLimits {
    /// Widen the y range to include every finite value of `ys`.
    fn include_y(&mut self, ys: &[f64]) {
        for &y in ys.iter().filter(|y| y.is_finite()) {
            self.y_min = self.y_min.min(y);
            self.y_max = self.y_max.max(y);
        }
    }
}

/// Everything a host needs to draw a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitPlot {
    /// Window title, the model formula
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Observed samples
    pub points_x: Vec<f64>,
    pub points_y: Vec<f64>,
    /// Fitted curve, absent when the fit has no usable function
    pub curve: Option<CurveSamples>,
    pub limits: PlotLimits,
    /// Text labels, top to bottom
    pub labels: Vec<String>,
}

/// Build the plot of `result` over `samples`.
///
/// With a usable function the labels are the model name, the formula, one
/// `a = ...` line per parameter and `R^2 = ...`. Otherwise only the points are
/// plotted, labelled with the model name and the fit status.
pub fn build_plot(samples: &SampleSet, result: &FitResult) -> FitPlot {
    let stats = samples.stats();
    let mut limits = PlotLimits {
        x_min: stats.x_min,
        x_max: stats.x_max,
        y_min: stats.y_min,
        y_max: stats.y_max,
    };

    let mut plot = FitPlot {
        title: result.formula.clone(),
        x_label: "X".to_string(),
        y_label: "Y".to_string(),
        points_x: samples.x().to_vec(),
        points_y: samples.y().to_vec(),
        curve: None,
        limits,
        labels: vec![result.model_name.clone()],
    };

    let function = match result.function() {
        Ok(function) => function,
        Err(_) => {
            plot.labels.push(format!("{}: {}", result.status, result.status.description()));
            return plot;
        }
    };

    let curve = sample_curve(&function, stats.x_min, stats.x_max, CURVE_POINTS);
    limits.include_y(&curve.y);

    plot.labels.push(result.formula.clone());
    for (name, value) in result.param_names.iter().zip(result.params.iter()) {
        plot.labels.push(format!("{} = {}", name, format_significant(*value, 5)));
    }
    plot.labels.push(match result.r_squared {
        Some(r2) => format!("R^2 = {:.4}", r2),
        None => "R^2 = undefined".to_string(),
    });

    plot.curve = Some(curve);
    plot.limits = limits;
    plot
}

/// Error a plot sink may report.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// A surface that draws plots, implemented by the host.
pub trait PlotSink {
    fn render(&mut self, plot: &FitPlot) -> std::result::Result<(), SinkError>;
}

/// Build the plot of `result` and hand it to `sink`.
///
/// # Errors
///
/// `CollaboratorFailure` when the sink fails; the failure is logged and the
/// fit result is left untouched.
pub fn render_fit<S: PlotSink + ?Sized>(
    sink: &mut S,
    samples: &SampleSet,
    result: &FitResult,
) -> Result<FitPlot> {
    let plot = build_plot(samples, result);
    match sink.render(&plot) {
        Ok(()) => Ok(plot),
        Err(e) => {
            warn!("plot of {} failed: {}", result.model_name, e);
            Err(CurveFitError::CollaboratorFailure(format!("plot sink: {}", e)))
        }
    }
}
