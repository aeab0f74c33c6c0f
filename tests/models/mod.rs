//! Tests for the built-in model families and user formulas

pub mod builtin_tests;
pub mod formula_tests;
