//! Loading sample text from files.
//!
//! Reading stops at the first line longer than [`LoadOptions::max_line_len`]
//! (100 characters by default). The cut-off is logged when it triggers and
//! can be disabled with [`LoadOptions::unlimited`].

use super::decoder::{decode_samples, DecodeOptions};
use crate::error::Result;
use crate::samples::SampleSet;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Legacy line-length limit.
pub const DEFAULT_MAX_LINE_LEN: usize = 100;

/// Options for [`load_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Stop reading at the first line longer than this many characters.
    pub max_line_len: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_line_len: Some(DEFAULT_MAX_LINE_LEN),
        }
    }
}

impl LoadOptions {
    /// Read every line regardless of length.
    pub fn unlimited() -> Self {
        Self { max_line_len: None }
    }

    /// Stop at the first line longer than `max_line_len`.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = Some(max_line_len);
        self
    }
}

/// Read lines from `reader` into one newline-terminated string.
///
/// Bytes that are not valid UTF-8 become U+FFFD, which the decoder later
/// replaces with a space.
pub fn read_text<R: BufRead>(reader: R, options: &LoadOptions) -> Result<String> {
    let mut text = String::new();
    for (number, bytes) in reader.split(b'\n').enumerate() {
        let mut bytes = bytes?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        let line = String::from_utf8_lossy(&bytes);
        if let Some(limit) = options.max_line_len {
            if line.chars().count() > limit {
                warn!(
                    "line {} is longer than {} characters; ignoring it and the rest of the input",
                    number + 1,
                    limit
                );
                break;
            }
        }
        text.push_str(&line);
        text.push('\n');
    }
    Ok(text)
}

/// Read the file at `path` into a string. The file is closed before returning.
pub fn load_text<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<String> {
    let path = path.as_ref();
    debug!("loading samples from {}", path.display());
    let file = File::open(path)?;
    read_text(BufReader::new(file), options)
}

/// Load and decode a sample file.
pub fn load_samples<P: AsRef<Path>>(
    path: P,
    load: &LoadOptions,
    decode: &DecodeOptions,
) -> Result<SampleSet> {
    let text = load_text(path, load)?;
    decode_samples(&text, decode)
}
