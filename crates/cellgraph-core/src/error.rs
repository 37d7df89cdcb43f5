//! Error types for cellgraph-core

use std::fmt;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cellgraph-core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Table access outside the current bounds
    #[error("Index ({row}, {col}) out of range for {rows}x{cols} table")]
    Range {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Value could not be converted
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// A value could not be read in the requested representation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot convert '{source_text}' to {target}")]
pub struct ConversionError {
    /// Textual form of the value that failed to convert
    pub source_text: String,
    /// Name of the requested representation
    pub target: &'static str,
}

impl ConversionError {
    /// Create a new conversion error
    pub fn new(source: impl fmt::Display, target: &'static str) -> Self {
        Self {
            source_text: source.to_string(),
            target,
        }
    }
}
