//! Applying a fitted function to every pixel of an image.
//!
//! The host exposes its image through [`PixelSource`]; the transform writes a
//! new [`FloatSurface`] with `f(p*, pixel)` at every position. With the
//! `parallel` feature, rows are computed in parallel with rayon.

use crate::error::{CurveFitError, Result};
use crate::fit::{FitResult, FittedFunction};
use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Read access to a 2D image, implemented by the host.
pub trait PixelSource: Sync {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Value of the pixel at column `x`, row `y`.
    fn pixel_value(&self, x: usize, y: usize) -> f32;

    fn title(&self) -> &str {
        ""
    }
}

/// An owned, row-major surface of 32-bit float pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatSurface {
    width: usize,
    height: usize,
    data: Vec<f32>,
    title: String,
}

impl FloatSurface {
    /// Wrap row-major `data`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(CurveFitError::DimensionMismatch(format!(
                "{}x{} surface needs {} pixels, got {}",
                width,
                height,
                width.saturating_mul(height),
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            title: String::new(),
        })
    }

    /// Set the title shown by the host.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Pixels in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

impl PixelSource for FloatSurface {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixel_value(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Evaluate the fitted function of `result` on every pixel of `source`.
///
/// The new surface is titled `<source title>-transformed`.
///
/// # Errors
///
/// * `NoFunction` when `result` has no usable fitted function
/// * `CollaboratorFailure` when `source` is itself a plot window (its title
///   starts with `y=`, spaces ignored)
pub fn transform_pixels<S: PixelSource + ?Sized>(
    result: &FitResult,
    source: &S,
) -> Result<FloatSurface> {
    let function = result.function()?;
    if is_plot_title(source.title()) {
        return Err(CurveFitError::CollaboratorFailure(format!(
            "'{}' is a plot, not an image to transform",
            source.title()
        )));
    }

    let (width, height) = (source.width(), source.height());
    debug!(
        "applying {} to a {}x{} surface",
        result.model_name, width, height
    );

    let mut data = vec![0.0f32; width.saturating_mul(height)];
    if width > 0 {
        transform_rows(&function, source, width, &mut data);
    }

    let title = format!("{}-transformed", source.title());
    Ok(FloatSurface::from_vec(width, height, data)?.with_title(title))
}

/// Plot windows are titled with their formula, `y = ...`.
fn is_plot_title(title: &str) -> bool {
    let mut chars = title.chars().filter(|c| !c.is_whitespace());
    chars.next() == Some('y') && chars.next() == Some('=')
}

fn transform_row<S: PixelSource + ?Sized>(
    function: &FittedFunction<'_>,
    source: &S,
    y: usize,
    row: &mut [f32],
) {
    for (x, out) in row.iter_mut().enumerate() {
        *out = function.eval(source.pixel_value(x, y) as f64) as f32;
    }
}

#[cfg(feature = "parallel")]
fn transform_rows<S: PixelSource + ?Sized>(
    function: &FittedFunction<'_>,
    source: &S,
    width: usize,
    data: &mut [f32],
) {
    data.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| transform_row(function, source, y, row));
}

#[cfg(not(feature = "parallel"))]
fn transform_rows<S: PixelSource + ?Sized>(
    function: &FittedFunction<'_>,
    source: &S,
    width: usize,
    data: &mut [f32],
) {
    for (y, row) in data.chunks_mut(width).enumerate() {
        transform_row(function, source, y, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{fit_builtin, fit_user_formula};
    use crate::models::BuiltinModel;
    use crate::samples::SampleSet;
    use approx::assert_relative_eq;

    fn line_fit() -> FitResult {
        let samples =
            SampleSet::from_pairs(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0), (3.0, 7.0)]).unwrap();
        fit_builtin(&samples, BuiltinModel::StraightLine, None)
    }

    #[test]
    fn test_transform_applies_fitted_line() {
        let result = line_fit();
        let source = FloatSurface::from_vec(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with_title("blobs");

        let out = transform_pixels(&result, &source).unwrap();
        assert_eq!(out.width(), 3);
        assert_eq!(out.height(), 2);
        assert_eq!(out.title(), "blobs-transformed");
        for (input, output) in source.data().iter().zip(out.data()) {
            assert_relative_eq!(*output, 1.0 + 2.0 * input, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_transform_requires_function() {
        let samples = SampleSet::from_pairs(&[(0.0, 1.0), (1.0, 3.0)]).unwrap();
        let result = fit_user_formula(&samples, "y = 3", None);
        let source = FloatSurface::from_vec(1, 1, vec![1.0]).unwrap();
        assert!(matches!(
            transform_pixels(&result, &source),
            Err(CurveFitError::NoFunction(_))
        ));
    }

    #[test]
    fn test_transform_rejects_plot_window() {
        let result = line_fit();
        let source = FloatSurface::from_vec(1, 1, vec![1.0])
            .unwrap()
            .with_title("y=a+bx");
        assert!(matches!(
            transform_pixels(&result, &source),
            Err(CurveFitError::CollaboratorFailure(_))
        ));
    }

    #[test]
    fn test_transform_rejects_own_plot_title() {
        let result = line_fit();
        let samples = SampleSet::from_pairs(&[(0.0, 1.0), (1.0, 3.0)]).unwrap();
        let plot = crate::plot::build_plot(&samples, &result);
        assert_eq!(plot.title, "y = a+bx");

        for title in [plot.title.as_str(), "  y =a*exp(bx)", "y\t= c"] {
            let source = FloatSurface::from_vec(1, 1, vec![1.0])
                .unwrap()
                .with_title(title);
            assert!(
                matches!(
                    transform_pixels(&result, &source),
                    Err(CurveFitError::CollaboratorFailure(_))
                ),
                "{}",
                title
            );
        }

        let source = FloatSurface::from_vec(1, 1, vec![1.0])
            .unwrap()
            .with_title("yeast = 3");
        assert!(transform_pixels(&result, &source).is_ok());
    }

    #[test]
    fn test_empty_surface() {
        let result = line_fit();
        let source = FloatSurface::from_vec(0, 5, Vec::new()).unwrap();
        let out = transform_pixels(&result, &source).unwrap();
        assert!(out.data().is_empty());
        assert!(FloatSurface::from_vec(2, 2, vec![0.0; 3]).is_err());
    }
}
