//! Model persistence
//!
//! A stored model is a list of `(name, formula)` pairs plus the evaluator
//! tag. Loading replays [`Model::create_cell`] for each pair in stored order;
//! references to cells stored later bind as soon as those cells exist.
//! Tabular cells are not stored.

#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::error::ModelError;
use crate::model::Model;
use crate::options::ModelOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Cell positions kept for a presentation layer, keyed by cell name
///
/// The model never reads these; storage only carries them along.
pub type ViewPositions = BTreeMap<String, (f64, f64)>;

/// Errors from loading or saving a model
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored cell could not be recreated
    #[error("Invalid stored cell: {0}")]
    Model(#[from] ModelError),

    #[error("Unsupported evaluator: {0}")]
    UnsupportedEvaluator(String),
}

/// One stored formula cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub name: String,
    pub formula: String,
}

/// Stored form of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub evaluator: String,
    pub cells: Vec<CellRecord>,
}

impl ModelDocument {
    /// Capture the formula cells of `model` in creation order
    pub fn snapshot(model: &Model) -> Self {
        let cells = model
            .cells()
            .filter(|cell| !cell.is_table())
            .map(|cell| CellRecord {
                name: cell.name().to_string(),
                formula: cell.formula().to_string(),
            })
            .collect();
        Self {
            evaluator: model.options().evaluator.clone(),
            cells,
        }
    }

    /// Rebuild a model by creating every stored cell in order
    pub fn restore(&self) -> Result<Model, StorageError> {
        self.restore_with(ModelOptions::default())
    }

    /// Like [`restore`](Self::restore), with custom options
    pub fn restore_with(&self, options: ModelOptions) -> Result<Model, StorageError> {
        if self.evaluator != options.evaluator {
            return Err(StorageError::UnsupportedEvaluator(self.evaluator.clone()));
        }
        let mut model = Model::with_options(options);
        for record in &self.cells {
            model.create_cell(Some(&record.name), Some(&record.formula))?;
        }
        tracing::info!(cells = model.len(), "restored model");
        Ok(model)
    }
}
