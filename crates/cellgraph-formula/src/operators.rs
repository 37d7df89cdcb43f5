//! Operator table
//!
//! Every operator the grammar knows, with its arity, precedence class,
//! associativity and evaluation function. Unary minus and unary plus have
//! their own symbols (`u-`, `u+`) so the parser can rewrite a prefix `-`
//! or `+` into a distinct operator.

use crate::error::FormulaResult;
use cellgraph_core::Value;

/// Operator implementation signature
///
/// Receives the already-evaluated operands in source order.
pub type OperatorImpl = fn(&[Value]) -> FormulaResult<Value>;

/// Precedence classes, lowest to highest
pub mod precedence {
    pub const LOGICAL: u8 = 0;
    pub const COMPARISON: u8 = 1;
    pub const ADDITIVE: u8 = 2;
    pub const MULTIPLICATIVE: u8 = 3;
    pub const UNARY: u8 = 4;
}

/// Symbol of the rewritten unary minus
pub const UNARY_MINUS: &str = "u-";

/// Symbol of the rewritten unary plus
pub const UNARY_PLUS: &str = "u+";

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Operator definition
#[derive(Debug)]
pub struct OperatorDef {
    /// Symbol as it appears in (rewritten) tokens
    pub symbol: &'static str,
    /// Number of operands
    pub arity: usize,
    /// Precedence class, see [`precedence`]
    pub precedence: u8,
    /// Associativity
    pub associativity: Associativity,
    /// Implementation
    pub implementation: OperatorImpl,
}

impl OperatorDef {
    /// Whether this operator takes a single prefix operand
    pub fn is_unary(&self) -> bool {
        self.arity == 1
    }

    /// Whether a stacked operator `self` must be emitted before pushing
    /// `incoming`
    pub fn pops_before(&self, incoming: &OperatorDef) -> bool {
        self.precedence > incoming.precedence
            || (self.precedence == incoming.precedence
                && incoming.associativity == Associativity::Left)
    }
}

macro_rules! binary {
    ($symbol:expr, $precedence:expr, $implementation:expr) => {
        OperatorDef {
            symbol: $symbol,
            arity: 2,
            precedence: $precedence,
            associativity: Associativity::Left,
            implementation: $implementation,
        }
    };
}

macro_rules! unary {
    ($symbol:expr, $implementation:expr) => {
        OperatorDef {
            symbol: $symbol,
            arity: 1,
            precedence: precedence::UNARY,
            associativity: Associativity::Right,
            implementation: $implementation,
        }
    };
}

static OPERATORS: &[OperatorDef] = &[
    binary!("+", precedence::ADDITIVE, op_add),
    binary!("-", precedence::ADDITIVE, op_subtract),
    binary!("*", precedence::MULTIPLICATIVE, op_multiply),
    binary!("/", precedence::MULTIPLICATIVE, op_divide),
    binary!("<", precedence::COMPARISON, op_less),
    binary!("<=", precedence::COMPARISON, op_less_equal),
    binary!(">", precedence::COMPARISON, op_greater),
    binary!(">=", precedence::COMPARISON, op_greater_equal),
    binary!("=", precedence::COMPARISON, op_equal),
    binary!("<>", precedence::COMPARISON, op_not_equal),
    binary!("&&", precedence::LOGICAL, op_and),
    binary!("||", precedence::LOGICAL, op_or),
    unary!(UNARY_MINUS, op_negate),
    unary!(UNARY_PLUS, op_identity),
    unary!("!", op_not),
];

/// Look up an operator by symbol
pub fn lookup(symbol: &str) -> Option<&'static OperatorDef> {
    OPERATORS.iter().find(|def| def.symbol == symbol)
}

/// The prefix form of `symbol`, if it has one
///
/// `-` and `+` become [`UNARY_MINUS`] and [`UNARY_PLUS`]; `!` is already
/// prefix.
pub fn prefix_form(symbol: &str) -> Option<&'static str> {
    match symbol {
        "-" => Some(UNARY_MINUS),
        "+" => Some(UNARY_PLUS),
        "!" => Some("!"),
        _ => None,
    }
}

fn numbers(args: &[Value]) -> FormulaResult<(f64, f64)> {
    Ok((args[0].as_float()?, args[1].as_float()?))
}

fn op_add(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Float(l + r))
}

fn op_subtract(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Float(l - r))
}

fn op_multiply(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Float(l * r))
}

/// Division by zero yields an infinity or NaN, like plain float division
fn op_divide(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Float(l / r))
}

fn op_less(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Boolean(l < r))
}

fn op_less_equal(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Boolean(l <= r))
}

fn op_greater(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Boolean(l > r))
}

fn op_greater_equal(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Boolean(l >= r))
}

fn op_equal(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Boolean(l == r))
}

fn op_not_equal(args: &[Value]) -> FormulaResult<Value> {
    let (l, r) = numbers(args)?;
    Ok(Value::Boolean(l != r))
}

fn op_and(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Boolean(args[0].as_bool() && args[1].as_bool()))
}

fn op_or(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Boolean(args[0].as_bool() || args[1].as_bool()))
}

fn op_negate(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Float(-args[0].as_float()?))
}

fn op_identity(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Float(args[0].as_float()?))
}

fn op_not(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Boolean(!args[0].as_bool()))
}
