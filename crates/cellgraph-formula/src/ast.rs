//! Expression tree types

use crate::functions::FunctionDef;
use crate::operators::OperatorDef;
use cellgraph_core::{CellId, Value};
use std::collections::BTreeSet;

/// Reference to another cell
///
/// Bound to the cell's stable id; `name` is the display name the formula
/// used when the tree was built and is only kept for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub id: CellId,
    pub name: String,
}

impl CellRef {
    /// Create a new reference
    pub fn new(id: CellId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Formula expression tree
#[derive(Debug, Clone)]
pub enum Expr {
    /// Literal value
    Literal(Value),
    /// Scalar cell reference
    CellRef(CellRef),
    /// Element of a tabular cell, `name[row;col]`
    TableRef {
        table: CellRef,
        row: Box<Expr>,
        col: Box<Expr>,
    },
    /// Operator application
    Operator {
        op: &'static OperatorDef,
        operands: Vec<Expr>,
    },
    /// Function call
    Function {
        func: &'static FunctionDef,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Ids of every cell this expression reads, directly or through a
    /// table access
    pub fn references(&self) -> BTreeSet<CellId> {
        let mut refs = BTreeSet::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut BTreeSet<CellId>) {
        match self {
            Expr::Literal(_) => {}
            Expr::CellRef(cell) => {
                refs.insert(cell.id);
            }
            Expr::TableRef { table, row, col } => {
                refs.insert(table.id);
                row.collect_references(refs);
                col.collect_references(refs);
            }
            Expr::Operator { operands: children, .. } | Expr::Function { args: children, .. } => {
                for child in children {
                    child.collect_references(refs);
                }
            }
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Literal(a), Expr::Literal(b)) => a == b,
            (Expr::CellRef(a), Expr::CellRef(b)) => a == b,
            (
                Expr::TableRef { table, row, col },
                Expr::TableRef {
                    table: other_table,
                    row: other_row,
                    col: other_col,
                },
            ) => table == other_table && row == other_row && col == other_col,
            (
                Expr::Operator { op, operands },
                Expr::Operator {
                    op: other_op,
                    operands: other_operands,
                },
            ) => op.symbol == other_op.symbol && operands == other_operands,
            (
                Expr::Function { func, args },
                Expr::Function {
                    func: other_func,
                    args: other_args,
                },
            ) => func.name == other_func.name && args == other_args,
            _ => false,
        }
    }
}
