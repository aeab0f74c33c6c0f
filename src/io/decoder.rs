//! Decoding free-form text into a sample set.
//!
//! Numbers are separated by any of space, tab, comma, carriage return or
//! newline and are read as alternating x and y values. Characters outside
//! printable ASCII (other than tab and newline) are replaced by spaces first.

use crate::error::{CurveFitError, Result};
use crate::samples::SampleSet;
use log::warn;
use ndarray::Array1;

/// Fewest numeric tokens the decoder accepts (two samples).
pub const MIN_TOKENS: usize = 4;

const DELIMITERS: &[char] = &[' ', '\t', '\n', '\r', ','];

/// Options for [`decode_samples`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject unparseable tokens instead of reading them as 0.
    pub strict: bool,
}

impl DecodeOptions {
    /// Lenient decoding: unparseable tokens become 0.
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Strict decoding: unparseable tokens are an error.
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Replace every character other than `\t`, `\n` and `0x20..=0x7E` with a space.
pub fn zap_gremlins(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c == '\n' || c == '\t' || (' '..='~').contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Split text into numeric tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(DELIMITERS).filter(|t| !t.is_empty()).collect()
}

/// Decode `text` into `(x, y)` samples.
///
/// # Errors
///
/// * `InvalidSamples` for fewer than four tokens, an odd token count, or a
///   non-finite value such as `NaN`
/// * `InvalidSamples` for an unparseable token when `options.strict` is set
pub fn decode_samples(text: &str, options: &DecodeOptions) -> Result<SampleSet> {
    let text = zap_gremlins(text);
    let tokens = tokenize(&text);

    if tokens.len() < MIN_TOKENS {
        return Err(CurveFitError::InvalidSamples(format!(
            "at least {} numbers needed, got {}",
            MIN_TOKENS,
            tokens.len()
        )));
    }
    if tokens.len() % 2 != 0 {
        return Err(CurveFitError::InvalidSamples(format!(
            "odd number of values ({}); expected x y pairs",
            tokens.len()
        )));
    }

    let values = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| parse_token(i, token, options))
        .collect::<Result<Vec<f64>>>()?;

    let x = values.iter().step_by(2).copied().collect::<Array1<f64>>();
    let y = values.iter().skip(1).step_by(2).copied().collect::<Array1<f64>>();
    SampleSet::new(x, y)
}

fn parse_token(index: usize, token: &str, options: &DecodeOptions) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(value) => Ok(value),
        Err(_) if options.strict => Err(CurveFitError::InvalidSamples(format!(
            "token {} ('{}') is not a number",
            index + 1,
            token
        ))),
        Err(_) => {
            warn!("token {} ('{}') is not a number; read as 0", index + 1, token);
            Ok(0.0)
        }
    }
}
