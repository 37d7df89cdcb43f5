//! Formula error types

use cellgraph_core::ConversionError;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while building or evaluating a formula
///
/// The build pipeline (tokenize, parse, tree build) only produces the
/// definition-class variants; see [`FormulaError::is_definition`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Malformed formula text (mismatched parentheses, misplaced separators)
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Operator symbol with no entry in the operator table
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Function name with no entry in the function registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// An operator did not find enough operands
    #[error("Missing operand for '{0}'")]
    MissingOperand(String),

    /// Table access not of the form `name[row;col]`
    #[error("Malformed table access: {0}")]
    MalformedTableAccess(String),

    /// Reference to a name no cell carries
    #[error("Unknown cell: {0}")]
    UnknownCell(String),

    /// String literal without its closing quote
    #[error("Unterminated string literal: {0}")]
    UnterminatedString(String),

    /// Evaluation failure
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Operand could not be converted to the type an operator needs
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Reference to a cell that has since been deleted
    #[error("Reference to deleted cell '{0}'")]
    DanglingReference(String),

    /// Table index outside the table bounds
    #[error("{0}")]
    Range(String),
}

impl FormulaError {
    /// Whether this error means the formula text itself is invalid, as opposed
    /// to failing against the current inputs
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            FormulaError::Syntax(_)
                | FormulaError::UnknownOperator(_)
                | FormulaError::UnknownFunction(_)
                | FormulaError::ArgumentCount { .. }
                | FormulaError::MissingOperand(_)
                | FormulaError::MalformedTableAccess(_)
                | FormulaError::UnknownCell(_)
                | FormulaError::UnterminatedString(_)
        )
    }
}

impl From<cellgraph_core::Error> for FormulaError {
    fn from(err: cellgraph_core::Error) -> Self {
        match err {
            cellgraph_core::Error::Conversion(e) => FormulaError::Conversion(e),
            range @ cellgraph_core::Error::Range { .. } => FormulaError::Range(range.to_string()),
        }
    }
}
