//! # cellgraph
//!
//! A reactive spreadsheet-style cell engine.
//!
//! Cells hold formula text. The [`Model`] builds each formula into an
//! expression tree, tracks which cells reference which, rejects cycles and
//! keeps every dependent value and error state consistent as formulas change.
//!
//! ## Features
//!
//! - Formulas with arithmetic, comparison and logical operators and the
//!   `min`, `max` and `average` functions (`;` separates arguments)
//! - Tabular cells addressed as `name[row;col]`
//! - Rename-safe references: trees bind to cell ids, not names
//! - Per-cell change subscriptions
//! - JSON storage (`json` feature, default) and SQLite storage (`sqlite`)
//!
//! ## Example
//!
//! ```rust
//! use cellgraph::prelude::*;
//!
//! let mut model = Model::new();
//! let a = model.create_cell(Some("a"), Some("1")).unwrap();
//! model.create_cell(Some("b"), Some("(a)+2")).unwrap();
//! model.create_cell(Some("c"), Some("(b)*3")).unwrap();
//! assert_eq!(model.get("c").unwrap().value().unwrap(), &Value::Float(9.0));
//!
//! model.set_formula(a, "2").unwrap();
//! assert_eq!(model.get("c").unwrap().value().unwrap(), &Value::Float(12.0));
//!
//! // Broken upstream formulas carry into dependents
//! model.set_formula(a, "1 +").unwrap();
//! assert_eq!(model.get("c").unwrap().error_kind(), Some(ErrorKind::Carried));
//! ```

pub mod cell;
pub mod error;
pub mod events;
pub mod model;
pub mod options;
pub mod prelude;
pub mod storage;

pub use cell::{Cell, CellError, ErrorKind};
pub use error::{ModelError, ModelResult};
pub use events::{Callback, CellEvent, SubscriptionId};
pub use model::Model;
pub use options::{ModelOptions, TREE_EVALUATOR};
pub use storage::{ModelDocument, StorageError, ViewPositions};

// Re-export core and formula types
pub use cellgraph_core::{CellId, ConversionError, TabularCell, Value};
pub use cellgraph_formula::{FormulaError, FormulaResult};
