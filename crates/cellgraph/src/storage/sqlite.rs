//! SQLite model files
//!
//! Three tables: the formula cells in creation order, the view positions a
//! presentation layer keeps per cell, and one row with the evaluator tag.

use super::{CellRecord, ModelDocument, StorageError, ViewPositions};
use crate::model::Model;
use rusqlite::{params, Connection};
use std::path::Path;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cells (
    seq INTEGER PRIMARY KEY,        -- creation order
    name TEXT NOT NULL UNIQUE,
    formula TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS view_positions (
    name TEXT PRIMARY KEY,
    x REAL NOT NULL,
    y REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS model (
    evaluator TEXT NOT NULL
);
"#;

/// Write a model and its view positions to a new database file
///
/// An existing file at `path` is replaced.
pub fn save<P: AsRef<Path>>(model: &Model, positions: &ViewPositions, path: P) -> Result<(), StorageError> {
    let path = path.as_ref();
    if path.exists() {
        std::fs::remove_file(path)?;
    }

    let mut conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let document = ModelDocument::snapshot(model);
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO model (evaluator) VALUES (?1)",
        params![document.evaluator],
    )?;
    {
        let mut stmt = tx.prepare("INSERT INTO cells (seq, name, formula) VALUES (?1, ?2, ?3)")?;
        for (seq, record) in document.cells.iter().enumerate() {
            stmt.execute(params![seq as i64, record.name, record.formula])?;
        }

        let mut stmt = tx.prepare("INSERT INTO view_positions (name, x, y) VALUES (?1, ?2, ?3)")?;
        for (name, (x, y)) in positions {
            stmt.execute(params![name, x, y])?;
        }
    }
    tx.commit()?;

    tracing::info!(cells = document.cells.len(), path = %path.display(), "saved model");
    Ok(())
}

/// Read a model and its view positions from a database file
pub fn load<P: AsRef<Path>>(path: P) -> Result<(Model, ViewPositions), StorageError> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;

    let evaluator: String = conn.query_row("SELECT evaluator FROM model LIMIT 1", [], |row| row.get(0))?;

    let mut stmt = conn.prepare("SELECT name, formula FROM cells ORDER BY seq")?;
    let cells = stmt
        .query_map([], |row| {
            Ok(CellRecord {
                name: row.get(0)?,
                formula: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare("SELECT name, x, y FROM view_positions")?;
    let positions = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, (row.get(1)?, row.get(2)?))))?
        .collect::<Result<ViewPositions, _>>()?;

    let model = ModelDocument { evaluator, cells }.restore()?;
    tracing::info!(cells = model.len(), path = %path.display(), "loaded model");
    Ok((model, positions))
}
