//! JSON model files
//!
//! ```json
//! {"evaluator": "tree", "cells": [{"name": "a", "formula": "1"}]}
//! ```

use super::{ModelDocument, StorageError};
use crate::model::Model;
use std::path::Path;

/// Serialize a model to pretty-printed JSON
pub fn to_string(model: &Model) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(&ModelDocument::snapshot(model))?)
}

/// Build a model from JSON text
pub fn from_str(text: &str) -> Result<Model, StorageError> {
    let document: ModelDocument = serde_json::from_str(text)?;
    document.restore()
}

/// Write a model to a JSON file
pub fn save<P: AsRef<Path>>(model: &Model, path: P) -> Result<(), StorageError> {
    let path = path.as_ref();
    std::fs::write(path, to_string(model)?)?;
    tracing::info!(cells = model.len(), path = %path.display(), "saved model");
    Ok(())
}

/// Read a model from a JSON file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Model, StorageError> {
    let path = path.as_ref();
    let model = from_str(&std::fs::read_to_string(path)?)?;
    tracing::info!(cells = model.len(), path = %path.display(), "loaded model");
    Ok(model)
}
