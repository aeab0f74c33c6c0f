//! Text input: decoding pasted or loaded tables of `(x, y)` pairs.

pub mod decoder;
pub mod loader;

pub use decoder::{decode_samples, tokenize, zap_gremlins, DecodeOptions};
pub use loader::{load_samples, load_text, read_text, LoadOptions};
