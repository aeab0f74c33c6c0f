use thiserror::Error;

/// Error types for the curvefit-rs library.
///
/// Only conditions that stop a fit from being attempted are errors. Budget
/// exhaustion, cancellation and non-finite objectives are reported through
/// [`FitStatus`](crate::simplex::FitStatus) on the fit result instead.
#[derive(Error, Debug)]
pub enum CurveFitError {
    /// The sample set is too small, has an odd token count or contains non-finite values.
    #[error("Invalid samples: {0}")]
    InvalidSamples(String),

    /// The user formula could not be parsed or references no parameters.
    #[error("Bad formula: {0}")]
    BadFormula(String),

    /// No built-in model has the requested name.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Minimizer settings are out of range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A fitted function was requested but the fit produced none.
    #[error("No function available: {0}")]
    NoFunction(String),

    /// A host collaborator (plot sink, image surface) reported a failure.
    #[error("Collaborator failure: {0}")]
    CollaboratorFailure(String),

    /// Error indicating a mismatch in vector lengths.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<crate::expression::ExpressionError> for CurveFitError {
    fn from(err: crate::expression::ExpressionError) -> Self {
        CurveFitError::BadFormula(format!("{}", err))
    }
}

/// Result type alias for curvefit-rs operations.
pub type Result<T> = std::result::Result<T, CurveFitError>;
