//! grepx - inline decoder for automated-attack responses
//!
//! Extracts a value from an HTTP response (between two markers or from a regex
//! capture group), decodes it with one of eight decoders and annotates the
//! response with the result, writing only when the result changes.

pub mod annotation;
pub mod cli;
pub mod config;
pub mod decoders;
pub mod error;
pub mod extractor;
pub mod http;
pub mod live;
pub mod pipeline;

pub use error::{GrepxError, Result};
