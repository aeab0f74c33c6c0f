//! Sample sets of `(x, y)` pairs.
//!
//! A [`SampleSet`] is the validated input of every fit: at least two samples,
//! all values finite, x and y of equal length.

use crate::error::{CurveFitError, Result};
use ndarray::Array1;

/// Minimum number of samples a fit accepts.
pub const MIN_SAMPLES: usize = 2;

/// An ordered, validated sequence of `(x, y)` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    x: Array1<f64>,
    y: Array1<f64>,
}

impl SampleSet {
    /// Create a sample set from separate x and y vectors.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if the vectors differ in length
    /// * `InvalidSamples` if there are fewer than two samples or a value is not finite
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(CurveFitError::DimensionMismatch(format!(
                "{} x values but {} y values",
                x.len(),
                y.len()
            )));
        }
        if x.len() < MIN_SAMPLES {
            return Err(CurveFitError::InvalidSamples(format!(
                "at least {} (x, y) pairs needed, got {}",
                MIN_SAMPLES,
                x.len()
            )));
        }
        if let Some(i) = x
            .iter()
            .zip(y.iter())
            .position(|(xi, yi)| !xi.is_finite() || !yi.is_finite())
        {
            return Err(CurveFitError::InvalidSamples(format!(
                "sample {} is not finite: ({}, {})",
                i, x[i], y[i]
            )));
        }
        Ok(Self { x, y })
    }

    /// Create a sample set from `(x, y)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let x = pairs.iter().map(|&(x, _)| x).collect::<Array1<f64>>();
        let y = pairs.iter().map(|&(_, y)| y).collect::<Array1<f64>>();
        Self::new(x, y)
    }

    /// The independent values.
    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    /// The observed values.
    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false for a validated set; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate over `(x, y)` pairs in input order.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Summary statistics of the samples.
    pub fn stats(&self) -> SampleStats {
        SampleStats::of(&self.x, &self.y)
    }
}

/// Summary statistics used by the seed heuristics and the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub x_mean: f64,
    pub y_mean: f64,
    /// x of the first sample in input order.
    pub first_x: f64,
    /// y of the first sample in input order.
    pub first_y: f64,
    pub last_x: f64,
    pub last_y: f64,
    /// x at the (first) largest y.
    pub x_at_y_max: f64,
    /// x at the (first) smallest y.
    pub x_at_y_min: f64,
}

impl SampleStats {
    /// Compute statistics of equally long, non-empty vectors.
    ///
    /// Empty input yields zeros everywhere so seed heuristics stay finite.
    pub fn of(x: &Array1<f64>, y: &Array1<f64>) -> Self {
        let n = x.len().min(y.len());
        if n == 0 {
            return Self {
                x_min: 0.0,
                x_max: 0.0,
                y_min: 0.0,
                y_max: 0.0,
                x_mean: 0.0,
                y_mean: 0.0,
                first_x: 0.0,
                first_y: 0.0,
                last_x: 0.0,
                last_y: 0.0,
                x_at_y_max: 0.0,
                x_at_y_min: 0.0,
            };
        }

        let mut stats = Self {
            x_min: x[0],
            x_max: x[0],
            y_min: y[0],
            y_max: y[0],
            x_mean: 0.0,
            y_mean: 0.0,
            first_x: x[0],
            first_y: y[0],
            last_x: x[n - 1],
            last_y: y[n - 1],
            x_at_y_max: x[0],
            x_at_y_min: x[0],
        };

        for i in 0..n {
            stats.x_min = stats.x_min.min(x[i]);
            stats.x_max = stats.x_max.max(x[i]);
            if y[i] > stats.y_max {
                stats.y_max = y[i];
                stats.x_at_y_max = x[i];
            }
            if y[i] < stats.y_min {
                stats.y_min = y[i];
                stats.x_at_y_min = x[i];
            }
            stats.x_mean += x[i];
            stats.y_mean += y[i];
        }
        stats.x_mean /= n as f64;
        stats.y_mean /= n as f64;
        stats
    }

    /// Width of the x range, or 1 when all x coincide.
    pub fn x_span(&self) -> f64 {
        let span = self.x_max - self.x_min;
        if span > 0.0 {
            span
        } else {
            1.0
        }
    }

    /// Height of the y range, or 1 when all y coincide.
    pub fn y_span(&self) -> f64 {
        let span = self.y_max - self.y_min;
        if span > 0.0 {
            span
        } else {
            1.0
        }
    }

    /// Slope of the line through the first and last sample, 0 for a vertical pair.
    pub fn end_slope(&self) -> f64 {
        let dx = self.last_x - self.first_x;
        if dx != 0.0 {
            (self.last_y - self.first_y) / dx
        } else {
            0.0
        }
    }
}
