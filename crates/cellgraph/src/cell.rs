//! Cells and their error states

use cellgraph_core::{CellId, TabularCell, Value};
use cellgraph_formula::Expr;
use std::collections::BTreeSet;
use std::fmt;

/// Why a cell has no usable value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The formula text does not build into a valid tree
    Definition,
    /// The tree built, but evaluating it against current inputs failed
    Evaluation,
    /// The formula refers to itself, directly or transitively
    CircularReference,
    /// A cell this one depends on is in an error state
    Carried,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Definition => "definition",
            ErrorKind::Evaluation => "evaluation",
            ErrorKind::CircularReference => "circular reference",
            ErrorKind::Carried => "carried",
        };
        f.write_str(name)
    }
}

/// Error state of a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CellError {
    /// Create a new error state
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether only a new formula can clear this error
    ///
    /// Definition and circular reference errors depend on the formula and
    /// the graph shape, not on input values.
    pub fn is_structural(&self) -> bool {
        matches!(self.kind, ErrorKind::Definition | ErrorKind::CircularReference)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for CellError {}

/// What a cell holds
#[derive(Debug, Clone)]
pub(crate) enum Content {
    /// Formula cell; the tree is `None` until a formula builds
    Formula(Option<Expr>),
    /// Tabular cell
    Table(TabularCell),
}

/// A named cell
///
/// Cells are owned by the [`Model`](crate::Model); callers only get shared
/// references and change cells through model operations.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) id: CellId,
    pub(crate) name: String,
    pub(crate) formula: String,
    pub(crate) content: Content,
    /// Last good value
    pub(crate) value: Value,
    pub(crate) error: Option<CellError>,
    pub(crate) references: BTreeSet<CellId>,
    pub(crate) deep_references: BTreeSet<CellId>,
    pub(crate) referenced_by: BTreeSet<CellId>,
    /// Names the formula uses that currently resolve to no cell
    pub(crate) unresolved: BTreeSet<String>,
}

impl Cell {
    pub(crate) fn new(id: CellId, name: String, content: Content) -> Self {
        Self {
            id,
            name,
            formula: String::new(),
            content,
            value: Value::default(),
            error: None,
            references: BTreeSet::new(),
            deep_references: BTreeSet::new(),
            referenced_by: BTreeSet::new(),
            unresolved: BTreeSet::new(),
        }
    }

    /// Stable identity
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Current display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formula text as last set (empty for tables)
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Current value
    ///
    /// Fails while the cell is in an error state: the cached value is then
    /// stale. Tables have no scalar value.
    pub fn value(&self) -> Result<&Value, CellError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        match &self.content {
            Content::Formula(_) => Ok(&self.value),
            Content::Table(_) => Err(CellError::new(
                ErrorKind::Evaluation,
                format!("'{}' is a table and has no scalar value", self.name),
            )),
        }
    }

    /// Whether the cell is in an error state
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Current error state, if any
    pub fn error(&self) -> Option<&CellError> {
        self.error.as_ref()
    }

    /// Kind of the current error, if any
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Message of the current error, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Cells named directly in this cell's formula
    pub fn references(&self) -> &BTreeSet<CellId> {
        &self.references
    }

    /// Every cell this one depends on, transitively
    pub fn deep_references(&self) -> &BTreeSet<CellId> {
        &self.deep_references
    }

    /// Cells whose formulas name this cell directly
    pub fn referenced_by(&self) -> &BTreeSet<CellId> {
        &self.referenced_by
    }

    /// The grid of a tabular cell
    pub fn table(&self) -> Option<&TabularCell> {
        match &self.content {
            Content::Table(table) => Some(table),
            Content::Formula(_) => None,
        }
    }

    /// Whether this is a tabular cell
    pub fn is_table(&self) -> bool {
        matches!(self.content, Content::Table(_))
    }

    pub(crate) fn expr(&self) -> Option<&Expr> {
        match &self.content {
            Content::Formula(expr) => expr.as_ref(),
            Content::Table(_) => None,
        }
    }
}
