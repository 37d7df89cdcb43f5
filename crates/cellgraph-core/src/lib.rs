//! # cellgraph-core
//!
//! Core data structures for the cellgraph reactive cell engine.
//!
//! This crate provides the fundamental types used throughout cellgraph:
//! - [`Value`] - Tagged scalar (float, integer, string, boolean) with explicit conversions
//! - [`CellId`] - Stable cell identity, independent of the cell's display name
//! - [`TabularCell`] - Float grid with bounds checking and lossless resizing
//!
//! ## Example
//!
//! ```rust
//! use cellgraph_core::{TabularCell, Value};
//!
//! let value = Value::from("2.5");
//! assert_eq!(value.as_float().unwrap(), 2.5);
//!
//! let mut table = TabularCell::new(2, 2);
//! table.set(1, 1, 4.0).unwrap();
//! assert!(table.get(2, 2).is_err());
//! ```

pub mod error;
pub mod id;
pub mod table;
pub mod value;

// Re-exports for convenience
pub use error::{ConversionError, Error, Result};
pub use id::CellId;
pub use table::TabularCell;
pub use value::Value;
