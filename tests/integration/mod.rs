//! Integration tests for the curvefit-rs library
//!
//! This module organizes all integration tests that test the library as a whole,
//! rather than individual components.

// End-to-end fitting scenarios
pub mod scenarios;

// Invariants that hold for every fit
pub mod properties;

// Fits of noisy synthetic data
pub mod noisy_data;
