//! Cell model and dependency graph
//!
//! The [`Model`] owns every cell, rebuilds a cell's expression tree when its
//! formula changes, keeps the reference sets consistent and pushes value and
//! error changes to dependent cells.
//!
//! Each formula cell moves through these states:
//! - a formula that fails to build puts the cell in a definition error and
//!   leaves its edges and cached value as they were
//! - a formula that refers to the cell itself, directly or through other
//!   cells, is a circular reference: the cell's edges are dropped and its
//!   dependents are not recomputed
//! - a cell with an erroring cell anywhere upstream carries that error
//! - otherwise the tree is evaluated; failure is an evaluation error
//!
//! Every mutation recomputes the affected dependents, once each, in
//! dependency order, before it returns.
//!
//! # Example
//!
//! ```rust
//! use cellgraph::{Model, Value};
//!
//! let mut model = Model::new();
//! let a = model.create_cell(Some("a"), Some("1")).unwrap();
//! let b = model.create_cell(Some("b"), Some("(a)+2")).unwrap();
//! assert_eq!(model.cell(b).unwrap().value().unwrap(), &Value::Float(3.0));
//!
//! model.set_formula(a, "2").unwrap();
//! assert_eq!(model.cell(b).unwrap().value().unwrap(), &Value::Float(4.0));
//! ```

use crate::cell::{Cell, CellError, Content, ErrorKind};
use crate::error::{ModelError, ModelResult};
use crate::events::{CellEvent, Subscribers, SubscriptionId};
use crate::options::ModelOptions;
use ahash::AHashMap;
use cellgraph_core::{CellId, TabularCell, Value};
use cellgraph_formula::{
    compile, evaluate, is_valid_name, rename_reference, CellRef, EvalContext, FormulaError,
    FormulaResult, NameResolver,
};
use std::collections::{BTreeMap, BTreeSet};

/// A set of named cells and the dependency graph between them
#[derive(Debug, Default)]
pub struct Model {
    options: ModelOptions,
    /// Cells by id; ids grow with creation order
    cells: BTreeMap<CellId, Cell>,
    /// Display name → id
    names: AHashMap<String, CellId>,
    next_id: u64,
    next_name: u64,
    subscribers: Subscribers,
}

impl Model {
    /// Create an empty model with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty model with custom options
    pub fn with_options(options: ModelOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options this model was created with
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    // === Queries ===

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the model has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all cells in creation order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    /// Get a cell by name
    pub fn get(&self, name: &str) -> ModelResult<&Cell> {
        self.names
            .get(name)
            .and_then(|id| self.cells.get(id))
            .ok_or_else(|| ModelError::NotFound(name.to_string()))
    }

    /// Get a cell by id
    pub fn cell(&self, id: CellId) -> ModelResult<&Cell> {
        self.cells.get(&id).ok_or(ModelError::UnknownId(id))
    }

    /// Id of the cell currently named `name`
    pub fn id_of(&self, name: &str) -> Option<CellId> {
        self.names.get(name).copied()
    }

    /// Every cell, ordered so that each cell comes after all cells it
    /// references
    pub fn evaluation_order(&self) -> Vec<CellId> {
        let mut order = Vec::with_capacity(self.cells.len());
        let mut visited = BTreeSet::new();
        for &id in self.cells.keys() {
            self.visit_references(id, &mut visited, &mut order);
        }
        tracing::trace!(cells = order.len(), "built evaluation order");
        order
    }

    fn visit_references(
        &self,
        id: CellId,
        visited: &mut BTreeSet<CellId>,
        order: &mut Vec<CellId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        if let Some(cell) = self.cells.get(&id) {
            for &reference in &cell.references {
                self.visit_references(reference, visited, order);
            }
        }
        order.push(id);
    }

    // === Cell lifecycle ===

    /// Create a formula cell
    ///
    /// Without a name the cell gets a generated one; without a formula it
    /// gets the default formula (`0`). Cells waiting for this name (their
    /// formula used it before it existed) are rebuilt.
    pub fn create_cell(&mut self, name: Option<&str>, formula: Option<&str>) -> ModelResult<CellId> {
        let name = self.claim_name(name)?;
        let formula = formula.unwrap_or(&self.options.default_formula).to_string();
        let id = self.insert_cell(name.clone(), Content::Formula(None));
        tracing::debug!(cell = %name, %id, "created cell");

        if let Some(cell) = self.cells.get_mut(&id) {
            cell.formula = formula;
        }
        self.apply_formula(id);
        self.rebind_waiting(&name);
        Ok(id)
    }

    /// Create a tabular cell of `rows` x `cols` zeros
    pub fn create_table(&mut self, name: Option<&str>, rows: usize, cols: usize) -> ModelResult<CellId> {
        let name = self.claim_name(name)?;
        let id = self.insert_cell(name.clone(), Content::Table(TabularCell::new(rows, cols)));
        tracing::debug!(cell = %name, %id, rows, cols, "created table");
        self.rebind_waiting(&name);
        Ok(id)
    }

    fn claim_name(&mut self, name: Option<&str>) -> ModelResult<String> {
        match name {
            Some(name) => {
                if !is_valid_name(name) {
                    return Err(ModelError::InvalidName(name.to_string()));
                }
                if self.names.contains_key(name) {
                    return Err(ModelError::NameInUse(name.to_string()));
                }
                Ok(name.to_string())
            }
            None => Ok(self.generate_name()),
        }
    }

    fn generate_name(&mut self) -> String {
        loop {
            self.next_name += 1;
            let candidate = format!("{}{}", self.options.name_prefix, self.next_name);
            if !self.names.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn insert_cell(&mut self, name: String, content: Content) -> CellId {
        self.next_id += 1;
        let id = CellId::new(self.next_id);
        self.names.insert(name.clone(), id);
        self.cells.insert(id, Cell::new(id, name, content));
        id
    }

    /// Delete a cell
    ///
    /// The cell disappears from every reference set. Cells that referenced
    /// it are recomputed and end up in an evaluation error until a cell with
    /// that name exists again.
    pub fn delete_cell(&mut self, id: CellId) -> ModelResult<()> {
        if !self.cells.contains_key(&id) {
            return Err(ModelError::UnknownId(id));
        }
        self.subscribers.notify(id, &CellEvent::DeleteRequested);

        let Some(removed) = self.cells.remove(&id) else {
            return Err(ModelError::UnknownId(id));
        };
        self.names.remove(&removed.name);
        self.subscribers.remove_cell(id);
        tracing::debug!(cell = %removed.name, %id, "deleted cell");

        for reference in &removed.references {
            if let Some(cell) = self.cells.get_mut(reference) {
                cell.referenced_by.remove(&id);
            }
        }
        for dependent in &removed.referenced_by {
            if let Some(cell) = self.cells.get_mut(dependent) {
                cell.references.remove(&id);
                cell.unresolved.insert(removed.name.clone());
            }
        }
        for cell in self.cells.values_mut() {
            cell.deep_references.remove(&id);
        }

        let dependents: Vec<CellId> = removed.referenced_by.iter().copied().collect();
        for dependent in self.affected_order(&dependents) {
            self.refresh(dependent);
        }
        Ok(())
    }

    // === Mutations ===

    /// Set a cell's formula text
    ///
    /// Never fails because of the formula: problems become the cell's
    /// error state. Fails only for an unknown id or a table cell.
    pub fn set_formula(&mut self, id: CellId, formula: &str) -> ModelResult<()> {
        let cell = self.cells.get_mut(&id).ok_or(ModelError::UnknownId(id))?;
        if cell.is_table() {
            return Err(ModelError::NotAFormula(cell.name.clone()));
        }
        if cell.formula != formula {
            cell.formula = formula.to_string();
            self.subscribers.notify(
                id,
                &CellEvent::FormulaChanged {
                    formula: formula.to_string(),
                },
            );
        }
        self.apply_formula(id);
        Ok(())
    }

    /// Rename a cell
    ///
    /// Returns `false` without changing anything when the name is taken by
    /// another cell or is not a valid cell name. References held by other
    /// cells stay bound; their formula text is rewritten to the new name.
    pub fn rename(&mut self, id: CellId, new_name: &str) -> bool {
        let Some(cell) = self.cells.get(&id) else {
            return false;
        };
        if cell.name == new_name {
            return true;
        }
        if !is_valid_name(new_name) || self.names.contains_key(new_name) {
            return false;
        }

        let old_name = cell.name.clone();
        // Cells still waiting on some other name have no edges yet, but
        // their text may use the old name too
        let mut rewrite: BTreeSet<CellId> = cell.referenced_by.clone();
        rewrite.extend(
            self.cells
                .values()
                .filter(|other| other.id != id && !other.unresolved.is_empty())
                .map(|other| other.id),
        );
        self.names.remove(&old_name);
        self.names.insert(new_name.to_string(), id);
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.name = new_name.to_string();
        }
        tracing::debug!(old = %old_name, new = %new_name, %id, "renamed cell");
        self.subscribers.notify(
            id,
            &CellEvent::NameChanged {
                old: old_name.clone(),
                new: new_name.to_string(),
            },
        );

        for dependent in rewrite {
            let Some(cell) = self.cells.get_mut(&dependent) else {
                continue;
            };
            if let Some(rewritten) = rename_reference(&cell.formula, &old_name, new_name) {
                cell.formula = rewritten.clone();
                self.subscribers
                    .notify(dependent, &CellEvent::FormulaChanged { formula: rewritten });
            }
        }

        self.rebind_waiting(new_name);
        true
    }

    /// Register a callback for changes to one cell
    pub fn subscribe<F>(&mut self, id: CellId, callback: F) -> ModelResult<SubscriptionId>
    where
        F: FnMut(&CellEvent) + 'static,
    {
        if !self.cells.contains_key(&id) {
            return Err(ModelError::UnknownId(id));
        }
        Ok(self.subscribers.subscribe(id, Box::new(callback)))
    }

    /// Remove a callback; returns `false` if it was not registered
    pub fn unsubscribe(&mut self, id: CellId, subscription: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id, subscription)
    }

    // === Tables ===

    /// The grid of a tabular cell
    pub fn table(&self, id: CellId) -> ModelResult<&TabularCell> {
        let cell = self.cell(id)?;
        cell.table()
            .ok_or_else(|| ModelError::NotATable(cell.name.clone()))
    }

    /// Read one element of a tabular cell
    pub fn table_value(&self, id: CellId, row: usize, col: usize) -> ModelResult<f64> {
        Ok(self.table(id)?.get(row, col)?)
    }

    /// Write one element of a tabular cell and recompute its dependents
    pub fn set_table_value(&mut self, id: CellId, row: usize, col: usize, value: f64) -> ModelResult<()> {
        self.table_mut(id)?.set(row, col, value)?;
        self.table_changed(id);
        Ok(())
    }

    /// Change the bounds of a tabular cell and recompute its dependents
    pub fn resize_table(&mut self, id: CellId, rows: usize, cols: usize) -> ModelResult<()> {
        self.table_mut(id)?.resize(rows, cols);
        self.table_changed(id);
        Ok(())
    }

    fn table_mut(&mut self, id: CellId) -> ModelResult<&mut TabularCell> {
        let cell = self.cells.get_mut(&id).ok_or(ModelError::UnknownId(id))?;
        match &mut cell.content {
            Content::Table(table) => Ok(table),
            Content::Formula(_) => Err(ModelError::NotATable(cell.name.clone())),
        }
    }

    fn table_changed(&mut self, id: CellId) {
        if let Some(table) = self.cells.get(&id).and_then(Cell::table) {
            let event = CellEvent::TableChanged {
                rows: table.rows(),
                cols: table.cols(),
            };
            self.subscribers.notify(id, &event);
        }
        self.propagate(id);
    }

    // === State machine ===

    /// Rebuild a cell's tree from its formula text and settle the cell and
    /// its dependents
    fn apply_formula(&mut self, id: CellId) {
        let Some(cell) = self.cells.get(&id) else {
            return;
        };
        if cell.is_table() {
            return;
        }
        let built = compile(&cell.formula, &NameIndex(&self.names));

        let expr = match built {
            Ok(expr) => expr,
            Err(err) => {
                tracing::debug!(cell = %cell.name, error = %err, "formula failed to build");
                self.definition_failed(id, err);
                return;
            }
        };

        let references = expr.references();
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.unresolved.clear();
            cell.content = Content::Formula(Some(expr));
        }
        self.replace_references(id, references);

        if self.references_itself(id) {
            self.break_cycle(id);
            return;
        }
        let deep = self.collect_deep_references(id);
        if deep.contains(&id) {
            self.break_cycle(id);
            return;
        }
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.deep_references = deep;
        }

        // The cell's own structural error is resolved by a formula that builds
        self.clear_structural_error(id);
        self.recompute(id);
        self.propagate(id);
    }

    fn definition_failed(&mut self, id: CellId, err: FormulaError) {
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.content = Content::Formula(None);
            cell.unresolved.clear();
            if let FormulaError::UnknownCell(name) = &err {
                cell.unresolved.insert(name.clone());
            }
        }
        self.set_error(id, Some(CellError::new(ErrorKind::Definition, err.to_string())));
        self.propagate(id);
    }

    fn references_itself(&self, id: CellId) -> bool {
        self.cells
            .get(&id)
            .map_or(false, |cell| cell.references.contains(&id))
    }

    /// Drop the edges of a cell whose formula forms a cycle
    fn break_cycle(&mut self, id: CellId) {
        self.replace_references(id, BTreeSet::new());
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.deep_references.clear();
            cell.content = Content::Formula(None);
            tracing::debug!(cell = %cell.name, "circular reference");
        }
        let name = self.display_name(id);
        self.set_error(
            id,
            Some(CellError::new(
                ErrorKind::CircularReference,
                format!("Circular reference involving '{}'", name),
            )),
        );

        // Dependents keep their values, but their transitive references
        // shrank with this cell's
        let order = self.affected_order(&[id]);
        for dependent in order.into_iter().skip(1) {
            let deep = self.collect_deep_references(dependent);
            if let Some(cell) = self.cells.get_mut(&dependent) {
                cell.deep_references = deep;
            }
        }
    }

    /// Make `references` the direct references of `id`, updating the back
    /// edges of both the dropped and the added cells
    fn replace_references(&mut self, id: CellId, references: BTreeSet<CellId>) {
        let Some(cell) = self.cells.get_mut(&id) else {
            return;
        };
        let old = std::mem::replace(&mut cell.references, references.clone());

        for stale in old.difference(&references) {
            if let Some(cell) = self.cells.get_mut(stale) {
                cell.referenced_by.remove(&id);
            }
        }
        for added in references.difference(&old) {
            if let Some(cell) = self.cells.get_mut(added) {
                cell.referenced_by.insert(id);
            }
        }
    }

    /// Union of a cell's references and their transitive references
    fn collect_deep_references(&self, id: CellId) -> BTreeSet<CellId> {
        let mut deep = BTreeSet::new();
        if let Some(cell) = self.cells.get(&id) {
            for reference in &cell.references {
                deep.insert(*reference);
                if let Some(referenced) = self.cells.get(reference) {
                    deep.extend(referenced.deep_references.iter().copied());
                }
            }
        }
        deep
    }

    fn clear_structural_error(&mut self, id: CellId) {
        let structural = self
            .cells
            .get(&id)
            .and_then(|cell| cell.error.as_ref())
            .map_or(false, CellError::is_structural);
        if structural {
            self.set_error(id, None);
        }
    }

    /// Recompute a dependent whose inputs (not formula) changed
    fn refresh(&mut self, id: CellId) {
        let deep = self.collect_deep_references(id);
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.deep_references = deep;
        }
        self.recompute(id);
    }

    /// Carry an upstream error or evaluate the cell's tree
    fn recompute(&mut self, id: CellId) {
        let Some(cell) = self.cells.get(&id) else {
            return;
        };
        if cell.error.as_ref().map_or(false, CellError::is_structural) {
            return;
        }
        let Some(expr) = cell.expr() else {
            return;
        };

        let upstream = cell
            .deep_references
            .iter()
            .find(|dep| self.cells.get(dep).map_or(false, Cell::has_error));
        if let Some(upstream) = upstream {
            let message = format!("Upstream error in '{}'", self.display_name(*upstream));
            self.set_error(id, Some(CellError::new(ErrorKind::Carried, message)));
            return;
        }

        let result = evaluate(expr, &ModelContext { cells: &self.cells });
        tracing::debug!(cell = %cell.name, result = ?result, "recomputed cell");
        match result {
            Ok(value) => {
                self.set_error(id, None);
                self.set_value(id, value);
            }
            Err(err) => {
                self.set_error(id, Some(CellError::new(ErrorKind::Evaluation, err.to_string())));
            }
        }
    }

    /// Recompute every cell downstream of `id`
    fn propagate(&mut self, id: CellId) {
        let order = self.affected_order(&[id]);
        for dependent in order.into_iter().skip(1) {
            self.refresh(dependent);
        }
    }

    /// `roots` and every cell downstream of them, each listed after all
    /// the cells it depends on
    ///
    /// Dependents are walked depth-first in ascending id order, so the
    /// order is the same on every run over the same graph.
    fn affected_order(&self, roots: &[CellId]) -> Vec<CellId> {
        let mut visited = BTreeSet::new();
        let mut post_order = Vec::new();
        for &root in roots {
            self.visit_dependents(root, &mut visited, &mut post_order);
        }
        post_order.reverse();
        post_order
    }

    fn visit_dependents(
        &self,
        id: CellId,
        visited: &mut BTreeSet<CellId>,
        post_order: &mut Vec<CellId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        if let Some(cell) = self.cells.get(&id) {
            for &dependent in &cell.referenced_by {
                self.visit_dependents(dependent, visited, post_order);
            }
        }
        post_order.push(id);
    }

    /// Re-apply the formulas of cells waiting for `name` to exist
    fn rebind_waiting(&mut self, name: &str) {
        let waiting: Vec<CellId> = self
            .cells
            .values()
            .filter(|cell| cell.unresolved.contains(name))
            .map(|cell| cell.id)
            .collect();
        for id in waiting {
            tracing::debug!(%id, name, "rebinding formula");
            self.apply_formula(id);
        }
    }

    fn set_value(&mut self, id: CellId, value: Value) {
        let Some(cell) = self.cells.get_mut(&id) else {
            return;
        };
        if cell.value != value {
            cell.value = value.clone();
            self.subscribers.notify(id, &CellEvent::ValueChanged { value });
        }
    }

    fn set_error(&mut self, id: CellId, error: Option<CellError>) {
        let Some(cell) = self.cells.get_mut(&id) else {
            return;
        };
        if cell.error != error {
            cell.error = error.clone();
            self.subscribers.notify(id, &CellEvent::ErrorChanged { error });
        }
    }

    fn display_name(&self, id: CellId) -> String {
        self.cells
            .get(&id)
            .map_or_else(|| id.to_string(), |cell| cell.name.clone())
    }
}

/// Name lookups for the tree builder
struct NameIndex<'a>(&'a AHashMap<String, CellId>);

impl NameResolver for NameIndex<'_> {
    fn resolve(&self, name: &str) -> Option<CellId> {
        self.0.get(name).copied()
    }
}

/// Evaluation lookups backed by the model's cached values
struct ModelContext<'a> {
    cells: &'a BTreeMap<CellId, Cell>,
}

impl ModelContext<'_> {
    fn lookup(&self, reference: &CellRef) -> FormulaResult<&Cell> {
        self.cells
            .get(&reference.id)
            .ok_or_else(|| FormulaError::DanglingReference(reference.name.clone()))
    }
}

impl EvalContext for ModelContext<'_> {
    fn value(&self, reference: &CellRef) -> FormulaResult<Value> {
        let cell = self.lookup(reference)?;
        cell.value()
            .cloned()
            .map_err(|err| FormulaError::Evaluation(format!("'{}': {}", cell.name, err.message)))
    }

    fn table_value(&self, reference: &CellRef, row: usize, col: usize) -> FormulaResult<Value> {
        let cell = self.lookup(reference)?;
        let table = cell
            .table()
            .ok_or_else(|| FormulaError::Evaluation(format!("'{}' is not a table", cell.name)))?;
        Ok(Value::Float(table.get(row, col)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value(model: &Model, id: CellId) -> Value {
        model.cell(id).unwrap().value().unwrap().clone()
    }

    #[test]
    fn test_generated_names_and_default_formula() {
        let mut model = Model::new();
        let first = model.create_cell(None, None).unwrap();
        model.create_cell(Some("cell2"), None).unwrap();
        let third = model.create_cell(None, None).unwrap();

        assert_eq!(model.cell(first).unwrap().name(), "cell1");
        assert_eq!(model.cell(first).unwrap().formula(), "0");
        assert_eq!(value(&model, first), Value::Float(0.0));
        assert_eq!(model.cell(third).unwrap().name(), "cell3");
    }

    #[test]
    fn test_custom_options() {
        let mut model = Model::with_options(ModelOptions {
            name_prefix: "x".into(),
            default_formula: "7".into(),
            ..ModelOptions::default()
        });
        let id = model.create_cell(None, None).unwrap();
        assert_eq!(model.cell(id).unwrap().name(), "x1");
        assert_eq!(value(&model, id), Value::Float(7.0));
    }

    #[test]
    fn test_create_rejects_bad_names() {
        let mut model = Model::new();
        model.create_cell(Some("a"), None).unwrap();
        assert_eq!(
            model.create_cell(Some("a"), None),
            Err(ModelError::NameInUse("a".into()))
        );
        assert_eq!(
            model.create_cell(Some("two words"), None),
            Err(ModelError::InvalidName("two words".into()))
        );
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_get_missing_cell() {
        let model = Model::new();
        assert_eq!(model.get("nope").unwrap_err(), ModelError::NotFound("nope".into()));
    }

    #[test]
    fn test_reference_sets_stay_symmetric() {
        let mut model = Model::new();
        let a = model.create_cell(Some("a"), Some("1")).unwrap();
        let b = model.create_cell(Some("b"), Some("2")).unwrap();
        let c = model.create_cell(Some("c"), Some("a + b")).unwrap();

        assert_eq!(model.cell(c).unwrap().references(), &BTreeSet::from([a, b]));
        assert!(model.cell(a).unwrap().referenced_by().contains(&c));

        model.set_formula(c, "b * 2").unwrap();
        assert_eq!(model.cell(c).unwrap().references(), &BTreeSet::from([b]));
        assert!(model.cell(a).unwrap().referenced_by().is_empty());
        assert!(model.cell(b).unwrap().referenced_by().contains(&c));
    }

    #[test]
    fn test_deep_references() {
        let mut model = Model::new();
        let a = model.create_cell(Some("a"), Some("1")).unwrap();
        let b = model.create_cell(Some("b"), Some("a")).unwrap();
        let c = model.create_cell(Some("c"), Some("b")).unwrap();
        assert_eq!(model.cell(c).unwrap().deep_references(), &BTreeSet::from([a, b]));

        // Cutting a's edge shrinks c's closure too
        model.set_formula(b, "5").unwrap();
        assert_eq!(model.cell(c).unwrap().deep_references(), &BTreeSet::from([b]));
    }

    #[test]
    fn test_transitive_cycle() {
        let mut model = Model::new();
        let a = model.create_cell(Some("a"), Some("1")).unwrap();
        let b = model.create_cell(Some("b"), Some("a")).unwrap();
        let c = model.create_cell(Some("c"), Some("b")).unwrap();

        model.set_formula(a, "c + 1").unwrap();
        let cell = model.cell(a).unwrap();
        assert_eq!(cell.error_kind(), Some(ErrorKind::CircularReference));
        assert!(cell.references().is_empty());
        assert!(model.cell(c).unwrap().referenced_by().is_empty());
        assert!(!model.cell(b).unwrap().has_error());
        assert!(!model.cell(c).unwrap().has_error());

        // Fixing the formula clears the circular reference
        model.set_formula(a, "3").unwrap();
        assert_eq!(value(&model, a), Value::Float(3.0));
        assert_eq!(value(&model, c), Value::Float(3.0));
    }

    #[test]
    fn test_diamond_recomputes_each_cell_once() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut model = Model::new();
        let a = model.create_cell(Some("a"), Some("1")).unwrap();
        model.create_cell(Some("b"), Some("a + 1")).unwrap();
        model.create_cell(Some("c"), Some("a * 2")).unwrap();
        let d = model.create_cell(Some("d"), Some("b + c")).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        model
            .subscribe(d, move |event| {
                if let CellEvent::ValueChanged { value } = event {
                    sink.borrow_mut().push(value.clone());
                }
            })
            .unwrap();

        model.set_formula(a, "2").unwrap();
        assert_eq!(*seen.borrow(), vec![Value::Float(7.0)]);
    }

    #[test]
    fn test_table_access_from_formula() {
        let mut model = Model::new();
        let grid = model.create_table(Some("grid"), 2, 2).unwrap();
        let sum = model.create_cell(Some("sum"), Some("grid[0;0] + grid[1;1]")).unwrap();
        assert_eq!(value(&model, sum), Value::Float(0.0));

        model.set_table_value(grid, 1, 1, 4.0).unwrap();
        assert_eq!(value(&model, sum), Value::Float(4.0));

        model.resize_table(grid, 1, 1).unwrap();
        assert_eq!(model.cell(sum).unwrap().error_kind(), Some(ErrorKind::Evaluation));

        model.resize_table(grid, 2, 2).unwrap();
        assert_eq!(value(&model, sum), Value::Float(4.0));
    }

    #[test]
    fn test_table_errors() {
        let mut model = Model::new();
        let grid = model.create_table(Some("grid"), 1, 1).unwrap();
        let scalar = model.create_cell(Some("s"), Some("1")).unwrap();

        assert!(matches!(
            model.table_value(grid, 2, 2),
            Err(ModelError::Range(cellgraph_core::Error::Range { .. }))
        ));
        assert_eq!(model.table(scalar).unwrap_err(), ModelError::NotATable("s".into()));
        assert_eq!(
            model.set_formula(grid, "1").unwrap_err(),
            ModelError::NotAFormula("grid".into())
        );

        let bad = model.create_cell(Some("bad"), Some("grid + 1")).unwrap();
        assert_eq!(model.cell(bad).unwrap().error_kind(), Some(ErrorKind::Evaluation));
    }

    #[test]
    fn test_late_binding() {
        let mut model = Model::new();
        let total = model.create_cell(Some("total"), Some("price * 2")).unwrap();
        assert_eq!(model.cell(total).unwrap().error_kind(), Some(ErrorKind::Definition));

        model.create_cell(Some("price"), Some("5")).unwrap();
        assert_eq!(value(&model, total), Value::Float(10.0));
    }

    #[test]
    fn test_evaluation_order_lists_every_cell_once() {
        let mut model = Model::new();
        let c = model.create_cell(Some("c"), Some("0")).unwrap();
        let a = model.create_cell(Some("a"), Some("1")).unwrap();
        model.set_formula(c, "a + 1").unwrap();
        let b = model.create_cell(Some("b"), Some("c")).unwrap();

        assert_eq!(model.evaluation_order(), vec![a, c, b]);
    }
}
