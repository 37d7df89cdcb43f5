//! Formula evaluator
//!
//! Evaluates expression trees against an [`EvalContext`]. Evaluation has no
//! side effects and can be repeated.

use crate::ast::{CellRef, Expr};
use crate::builder::NameResolver;
use crate::error::{FormulaError, FormulaResult};
use ahash::AHashMap;
use cellgraph_core::{CellId, TabularCell, Value};

/// Lookups a tree needs while it is evaluated
pub trait EvalContext {
    /// Current value of a scalar cell
    fn value(&self, cell: &CellRef) -> FormulaResult<Value>;

    /// Current value of element (`row`, `col`) of a tabular cell
    fn table_value(&self, table: &CellRef, row: usize, col: usize) -> FormulaResult<Value>;
}

/// Evaluate an expression tree
pub fn evaluate(expr: &Expr, ctx: &dyn EvalContext) -> FormulaResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),

        Expr::CellRef(cell) => ctx.value(cell),

        Expr::TableRef { table, row, col } => {
            let row = evaluate_index(row, ctx)?;
            let col = evaluate_index(col, ctx)?;
            ctx.table_value(table, row, col)
        }

        Expr::Operator { op, operands } => {
            let values = evaluate_all(operands, ctx)?;
            (op.implementation)(&values)
        }

        Expr::Function { func, args } => {
            let values = evaluate_all(args, ctx)?;
            (func.implementation)(&values)
        }
    }
}

fn evaluate_all(exprs: &[Expr], ctx: &dyn EvalContext) -> FormulaResult<Vec<Value>> {
    exprs.iter().map(|expr| evaluate(expr, ctx)).collect()
}

/// Evaluate a table index: a non-negative integral number
fn evaluate_index(expr: &Expr, ctx: &dyn EvalContext) -> FormulaResult<usize> {
    let index = evaluate(expr, ctx)?.as_integer()?;
    usize::try_from(index)
        .map_err(|_| FormulaError::Range(format!("Negative table index {}", index)))
}

/// Self-contained context backed by in-memory maps
///
/// Handy for evaluating formulas outside a model, e.g. in tests.
///
/// # Example
/// ```rust
/// use cellgraph_core::Value;
/// use cellgraph_formula::{compile, evaluate, SimpleContext};
///
/// let ctx = SimpleContext::new().with_value("x", Value::Float(2.0));
/// let expr = compile("x * 3", &ctx).unwrap();
/// assert_eq!(evaluate(&expr, &ctx).unwrap(), Value::Float(6.0));
/// ```
#[derive(Debug, Default)]
pub struct SimpleContext {
    names: AHashMap<String, CellId>,
    values: AHashMap<CellId, Value>,
    tables: AHashMap<CellId, TabularCell>,
}

impl SimpleContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    fn id_for(&mut self, name: &str) -> CellId {
        let next = CellId::new(self.names.len() as u64 + 1);
        *self.names.entry(name.to_string()).or_insert(next)
    }

    /// Add a named scalar value
    pub fn with_value(mut self, name: &str, value: Value) -> Self {
        let id = self.id_for(name);
        self.values.insert(id, value);
        self
    }

    /// Add a named table
    pub fn with_table(mut self, name: &str, table: TabularCell) -> Self {
        let id = self.id_for(name);
        self.tables.insert(id, table);
        self
    }
}

impl NameResolver for SimpleContext {
    fn resolve(&self, name: &str) -> Option<CellId> {
        self.names.get(name).copied()
    }
}

impl EvalContext for SimpleContext {
    fn value(&self, cell: &CellRef) -> FormulaResult<Value> {
        self.values
            .get(&cell.id)
            .cloned()
            .ok_or_else(|| FormulaError::Evaluation(format!("'{}' has no value", cell.name)))
    }

    fn table_value(&self, table: &CellRef, row: usize, col: usize) -> FormulaResult<Value> {
        let grid = self
            .tables
            .get(&table.id)
            .ok_or_else(|| FormulaError::Evaluation(format!("'{}' is not a table", table.name)))?;
        Ok(Value::Float(grid.get(row, col)?))
    }
}
