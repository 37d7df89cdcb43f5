//! Tests for the cell model: references, cycles, propagation and errors

use cellgraph::prelude::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

fn value_of(model: &Model, name: &str) -> Value {
    model.get(name).unwrap().value().unwrap().clone()
}

fn kind_of(model: &Model, name: &str) -> Option<ErrorKind> {
    model.get(name).unwrap().error_kind()
}

/// Record every event delivered for one cell
fn record(model: &mut Model, id: CellId) -> Rc<RefCell<Vec<CellEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    model
        .subscribe(id, move |event| sink.borrow_mut().push(event.clone()))
        .unwrap();
    events
}

#[test]
fn test_self_reference() {
    let mut model = Model::new();
    let a = model.create_cell(Some("a"), Some("1")).unwrap();
    model.set_formula(a, "a + 1").unwrap();

    let cell = model.cell(a).unwrap();
    assert_eq!(cell.error_kind(), Some(ErrorKind::CircularReference));
    assert!(cell.references().is_empty());
    assert!(cell.deep_references().is_empty());
    assert!(cell.referenced_by().is_empty());
    assert!(cell.value().is_err());
}

#[test]
fn test_mutual_reference() {
    let mut model = Model::new();
    let a = model.create_cell(Some("a"), Some("0")).unwrap();
    let b = model.create_cell(Some("b"), Some("5")).unwrap();
    model.set_formula(a, "b").unwrap();
    assert!(!model.cell(a).unwrap().has_error());

    model.set_formula(b, "a").unwrap();
    assert_eq!(kind_of(&model, "b"), Some(ErrorKind::CircularReference));
    assert!(model.cell(b).unwrap().references().is_empty());

    let a_cell = model.cell(a).unwrap();
    assert!(!a_cell.has_error());
    assert_eq!(a_cell.value().unwrap(), &Value::Float(5.0));
    assert_eq!(a_cell.references(), &BTreeSet::from([b]));
}

#[test]
fn test_chain_propagation() {
    let mut model = Model::new();
    let a = model.create_cell(Some("A"), Some("1")).unwrap();
    model.create_cell(Some("B"), Some("(A)+2")).unwrap();
    assert_eq!(value_of(&model, "B"), Value::Float(3.0));
    model.create_cell(Some("C"), Some("(B)*3")).unwrap();
    assert_eq!(value_of(&model, "C"), Value::Float(9.0));

    model.set_formula(a, "2").unwrap();
    assert_eq!(value_of(&model, "B"), Value::Float(4.0));
    assert_eq!(value_of(&model, "C"), Value::Float(12.0));
}

#[test]
fn test_error_propagation_and_recovery() {
    let mut model = Model::new();
    let a = model.create_cell(Some("A"), Some("1")).unwrap();
    model.create_cell(Some("B"), Some("A * 10")).unwrap();
    model.create_cell(Some("C"), Some("B + 1")).unwrap();

    model.set_formula(a, "1 $").unwrap();
    assert_eq!(kind_of(&model, "A"), Some(ErrorKind::Definition));
    assert_eq!(kind_of(&model, "B"), Some(ErrorKind::Carried));
    assert_eq!(kind_of(&model, "C"), Some(ErrorKind::Carried));
    assert_eq!(
        model.get("B").unwrap().error_message(),
        Some("Upstream error in 'A'")
    );

    // A broken edit keeps the previous edges
    assert!(model.get("A").unwrap().referenced_by().contains(&model.id_of("B").unwrap()));

    model.set_formula(a, "2").unwrap();
    assert_eq!(kind_of(&model, "A"), None);
    assert_eq!(value_of(&model, "B"), Value::Float(20.0));
    assert_eq!(value_of(&model, "C"), Value::Float(21.0));
}

#[test]
fn test_evaluation_error_carries() {
    let mut model = Model::new();
    let a = model.create_cell(Some("a"), Some("\"12\"")).unwrap();
    model.create_cell(Some("b"), Some("a * 2")).unwrap();
    assert_eq!(value_of(&model, "b"), Value::Float(24.0));

    model.set_formula(a, "\"twelve\" * 1").unwrap();
    assert_eq!(kind_of(&model, "a"), Some(ErrorKind::Evaluation));
    assert_eq!(kind_of(&model, "b"), Some(ErrorKind::Carried));
}

#[test]
fn test_deletion() {
    let mut model = Model::new();
    let b = model.create_cell(Some("B"), Some("7")).unwrap();
    let a = model.create_cell(Some("A"), Some("B + 1")).unwrap();
    assert_eq!(value_of(&model, "A"), Value::Float(8.0));

    model.delete_cell(b).unwrap();
    let cell = model.cell(a).unwrap();
    assert!(cell.has_error());
    assert_eq!(cell.error_kind(), Some(ErrorKind::Evaluation));
    assert!(cell.references().is_empty());
    assert!(cell.deep_references().is_empty());
    assert!(model.get("B").is_err());
    assert_eq!(model.len(), 1);

    // A cell with the old name takes the reference over
    model.create_cell(Some("B"), Some("1")).unwrap();
    assert_eq!(value_of(&model, "A"), Value::Float(2.0));
}

#[test]
fn test_delete_unknown_cell() {
    let mut model = Model::new();
    let a = model.create_cell(None, None).unwrap();
    model.delete_cell(a).unwrap();
    assert_eq!(model.delete_cell(a), Err(ModelError::UnknownId(a)));
}

#[test]
fn test_rename_preserves_bindings() {
    let mut model = Model::new();
    let a = model.create_cell(Some("A"), Some("1")).unwrap();
    let b = model.create_cell(Some("B"), Some("(A)+3")).unwrap();
    assert_eq!(value_of(&model, "B"), Value::Float(4.0));

    assert!(model.rename(a, "Total"));
    assert_eq!(value_of(&model, "B"), Value::Float(4.0));
    assert_eq!(model.cell(b).unwrap().references(), &BTreeSet::from([a]));
    assert_eq!(model.cell(b).unwrap().formula(), "(Total)+3");
    assert_eq!(model.id_of("Total"), Some(a));
    assert!(model.get("A").is_err());

    // Bound by id, so later edits still reach B
    model.set_formula(a, "10").unwrap();
    assert_eq!(value_of(&model, "B"), Value::Float(13.0));

    assert!(!model.rename(a, "B"));
    assert_eq!(model.cell(a).unwrap().name(), "Total");
    assert!(!model.rename(a, "not valid"));
    assert!(model.rename(a, "Total"));
}

#[test]
fn test_rename_binds_waiting_cells() {
    let mut model = Model::new();
    let a = model.create_cell(Some("a"), Some("3")).unwrap();
    model.create_cell(Some("b"), Some("price + 1")).unwrap();
    assert_eq!(kind_of(&model, "b"), Some(ErrorKind::Definition));

    assert!(model.rename(a, "price"));
    assert_eq!(value_of(&model, "b"), Value::Float(4.0));
}

#[test]
fn test_rename_rewrites_cells_waiting_on_other_names() {
    let mut model = Model::new();
    let a = model.create_cell(Some("A"), Some("1")).unwrap();
    let b = model.create_cell(Some("B"), Some("A + nope")).unwrap();
    assert_eq!(kind_of(&model, "B"), Some(ErrorKind::Definition));
    let events = record(&mut model, b);

    assert!(model.rename(a, "first"));
    assert_eq!(model.cell(b).unwrap().formula(), "first + nope");
    assert_eq!(
        *events.borrow(),
        vec![CellEvent::FormulaChanged {
            formula: "first + nope".into()
        }]
    );

    model.create_cell(Some("nope"), Some("2")).unwrap();
    assert_eq!(value_of(&model, "B"), Value::Float(3.0));
    assert_eq!(model.cell(b).unwrap().references(), &BTreeSet::from([a, model.id_of("nope").unwrap()]));
}

#[test]
fn test_tabular_bounds() {
    let mut model = Model::new();
    let grid = model.create_table(Some("grid"), 1, 1).unwrap();
    assert!(matches!(
        model.table_value(grid, 2, 2),
        Err(ModelError::Range(cellgraph_core::Error::Range { row: 2, col: 2, .. }))
    ));

    model.resize_table(grid, 2, 2).unwrap();
    model.set_table_value(grid, 1, 1, 9.5).unwrap();
    model.resize_table(grid, 1, 1).unwrap();
    assert!(model.table_value(grid, 1, 1).is_err());
    model.resize_table(grid, 2, 2).unwrap();
    assert_eq!(model.table_value(grid, 1, 1).unwrap(), 9.5);
}

#[test]
fn test_table_write_propagates() {
    let mut model = Model::new();
    let grid = model.create_table(Some("grid"), 3, 3).unwrap();
    model.create_cell(Some("row"), Some("2")).unwrap();
    let pick = model
        .create_cell(Some("pick"), Some("grid[row; 1] * 2"))
        .unwrap();
    let events = record(&mut model, pick);

    model.set_table_value(grid, 2, 1, 21.0).unwrap();
    assert_eq!(value_of(&model, "pick"), Value::Float(42.0));
    assert_eq!(
        *events.borrow(),
        vec![CellEvent::ValueChanged {
            value: Value::Float(42.0)
        }]
    );
}

#[test]
fn test_value_fails_while_erroring() {
    let mut model = Model::new();
    let a = model.create_cell(Some("a"), Some("5")).unwrap();
    model.set_formula(a, "max()").unwrap();

    let err = model.cell(a).unwrap().value().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Definition);
    assert!(err.message.contains("max"));
}

#[test]
fn test_events() {
    let mut model = Model::new();
    let a = model.create_cell(Some("a"), Some("1")).unwrap();
    let b = model.create_cell(Some("b"), Some("a")).unwrap();
    let a_events = record(&mut model, a);
    let b_events = record(&mut model, b);

    model.set_formula(a, "2").unwrap();
    model.set_formula(a, "2 +").unwrap();
    model.set_formula(a, "2").unwrap();
    assert!(model.rename(a, "first"));
    model.delete_cell(a).unwrap();

    let carried = CellError::new(ErrorKind::Carried, "Upstream error in 'a'");
    assert_eq!(
        *a_events.borrow(),
        vec![
            CellEvent::FormulaChanged { formula: "2".into() },
            CellEvent::ValueChanged { value: Value::Float(2.0) },
            CellEvent::FormulaChanged { formula: "2 +".into() },
            CellEvent::ErrorChanged {
                error: Some(CellError::new(
                    ErrorKind::Definition,
                    model_definition_message("2 +"),
                )),
            },
            CellEvent::FormulaChanged { formula: "2".into() },
            CellEvent::ErrorChanged { error: None },
            CellEvent::NameChanged {
                old: "a".into(),
                new: "first".into(),
            },
            CellEvent::DeleteRequested,
        ]
    );

    let b_events = b_events.borrow();
    assert_eq!(b_events[0], CellEvent::ValueChanged { value: Value::Float(2.0) });
    assert_eq!(b_events[1], CellEvent::ErrorChanged { error: Some(carried) });
    assert_eq!(b_events[2], CellEvent::ErrorChanged { error: None });
    assert_eq!(b_events[3], CellEvent::FormulaChanged { formula: "first".into() });
    assert!(matches!(
        &b_events[4],
        CellEvent::ErrorChanged { error: Some(e) } if e.kind == ErrorKind::Evaluation
    ));
    assert_eq!(b_events.len(), 5);
}

fn model_definition_message(formula: &str) -> String {
    cellgraph_formula::compile(formula, &cellgraph_formula::SimpleContext::new())
        .unwrap_err()
        .to_string()
}

#[test]
fn test_unsubscribe() {
    let mut model = Model::new();
    let a = model.create_cell(Some("a"), Some("1")).unwrap();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let subscription = model.subscribe(a, move |_| *sink.borrow_mut() += 1).unwrap();

    model.set_formula(a, "2").unwrap();
    assert!(model.unsubscribe(a, subscription));
    model.set_formula(a, "3").unwrap();

    assert_eq!(*count.borrow(), 2);
    assert!(!model.unsubscribe(a, subscription));
}

#[test]
fn test_circular_reference_is_only_cleared_by_a_new_formula() {
    let mut model = Model::new();
    let a = model.create_cell(Some("a"), Some("1")).unwrap();
    let b = model.create_cell(Some("b"), Some("a")).unwrap();
    let c = model.create_cell(Some("c"), Some("b")).unwrap();

    model.set_formula(a, "c").unwrap();
    assert_eq!(kind_of(&model, "a"), Some(ErrorKind::CircularReference));

    // Breaking the loop elsewhere leaves a as it is
    model.set_formula(c, "5").unwrap();
    assert_eq!(kind_of(&model, "a"), Some(ErrorKind::CircularReference));

    model.set_formula(a, "c").unwrap();
    assert_eq!(value_of(&model, "a"), Value::Float(5.0));
    assert_eq!(value_of(&model, "b"), Value::Float(5.0));
    assert_eq!(model.cell(b).unwrap().deep_references(), &BTreeSet::from([a, c]));
}

#[test]
fn test_values_of_mixed_types() {
    let mut model = Model::new();
    model.create_cell(Some("flag"), Some("1 < 2")).unwrap();
    model.create_cell(Some("text"), Some("\"hello\"")).unwrap();
    model.create_cell(Some("both"), Some("flag && text <> 0")).unwrap();

    assert_eq!(value_of(&model, "flag"), Value::Boolean(true));
    assert_eq!(value_of(&model, "text"), Value::String("hello".into()));
    assert_eq!(kind_of(&model, "both"), Some(ErrorKind::Evaluation));
}
