//! An optional, host-owned slot holding the most recent successful fit.

use crate::error::{CurveFitError, Result};
use crate::fit::FitResult;
use crate::transform::{transform_pixels, FloatSurface, PixelSource};
use log::debug;

/// The last successful fit, for hosts that apply it to images later.
///
/// Only `OK` and `MAX_ITER` results with a finite SSR are stored; failed or
/// aborted fits leave the previous entry in place.
#[derive(Debug, Clone, Default)]
pub struct LastFit {
    slot: Option<FitResult>,
}

impl LastFit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `result` if it is successful. Returns whether it was stored.
    pub fn record(&mut self, result: &FitResult) -> bool {
        if result.is_success() && result.has_function() {
            debug!("caching {} fit", result.model_name);
            self.slot = Some(result.clone());
            true
        } else {
            false
        }
    }

    pub fn latest(&self) -> Option<&FitResult> {
        self.slot.as_ref()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Apply the cached fit to `source`.
    ///
    /// # Errors
    ///
    /// `NoFunction` when nothing is cached, otherwise as [`transform_pixels`].
    pub fn apply_to<S: PixelSource + ?Sized>(&self, source: &S) -> Result<FloatSurface> {
        let result = self
            .latest()
            .ok_or_else(|| CurveFitError::NoFunction("no fit has been performed".to_string()))?;
        transform_pixels(result, source)
    }
}
