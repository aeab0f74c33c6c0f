//! Nelder-Mead downhill simplex minimizer.
//!
//! Derivative-free minimization of a scalar [`Problem`](crate::problem::Problem)
//! with reflection, expansion, contraction and shrink steps, restarts around the
//! best vertex, and cooperative cancellation.

pub mod algorithm;
pub mod config;
pub mod convergence;

// Re-export key types
pub use algorithm::{CancelToken, NelderMead, SimplexResult};
pub use config::SimplexConfig;
pub use convergence::FitStatus;
