//! Model error types

use cellgraph_core::CellId;
use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors returned by [`Model`](crate::Model) operations
///
/// Formula problems are never reported here: they become the cell's error
/// state. These errors are about misuse of the model API itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// No cell with this name
    #[error("Cell not found: {0}")]
    NotFound(String),

    /// No cell with this id
    #[error("Cell not found: {0}")]
    UnknownId(CellId),

    /// Name already used by another cell
    #[error("Cell name already in use: {0}")]
    NameInUse(String),

    /// Name that formulas could not refer to
    #[error("Invalid cell name: {0}")]
    InvalidName(String),

    /// Table operation on a formula cell
    #[error("Cell '{0}' is not a table")]
    NotATable(String),

    /// Formula operation on a table cell
    #[error("Cell '{0}' is a table and has no formula")]
    NotAFormula(String),

    /// Table access outside the bounds (RangeError)
    #[error(transparent)]
    Range(#[from] cellgraph_core::Error),
}
