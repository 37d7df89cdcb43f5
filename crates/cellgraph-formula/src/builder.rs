//! Expression tree builder
//!
//! Turns the parser's postfix output into an [`Expr`] using an operand
//! stack. Names are resolved to cell ids here, so a finished tree no longer
//! depends on display names.

use crate::ast::{CellRef, Expr};
use crate::error::{FormulaError, FormulaResult};
use crate::functions;
use crate::operators;
use crate::parser::parse_postfix;
use crate::token::Token;
use cellgraph_core::{CellId, Value};

/// Resolves display names to cell ids while building a tree
pub trait NameResolver {
    /// Id of the cell currently named `name`
    fn resolve(&self, name: &str) -> Option<CellId>;
}

/// Tokenize, parse and build `formula` in one step
///
/// Every failure is a definition error ([`FormulaError::is_definition`]).
pub fn compile(formula: &str, resolver: &dyn NameResolver) -> FormulaResult<Expr> {
    let postfix = parse_postfix(formula)?;
    build_tree(&postfix, resolver)
}

/// Build an expression tree from postfix tokens
pub fn build_tree(postfix: &[Token], resolver: &dyn NameResolver) -> FormulaResult<Expr> {
    let mut stack: Vec<Expr> = Vec::new();
    let mut iter = postfix.iter();

    while let Some(token) = iter.next() {
        match token {
            Token::Atom(text) => stack.push(classify_atom(text, resolver)?),
            Token::Text(text) => stack.push(Expr::Literal(Value::String(text.clone()))),
            Token::Operator(symbol) => {
                let op = operators::lookup(symbol)
                    .ok_or_else(|| FormulaError::UnknownOperator(symbol.clone()))?;
                let operands = pop_operands(&mut stack, op.arity, symbol)?;
                stack.push(Expr::Operator { op, operands });
            }
            Token::Function(name) => {
                let count = match iter.next() {
                    Some(Token::ArgCount(count)) => *count,
                    _ => {
                        return Err(FormulaError::Syntax(format!(
                            "Missing argument count after {}",
                            name
                        )))
                    }
                };
                let func = functions::registry()
                    .get(name)
                    .ok_or_else(|| FormulaError::UnknownFunction(name.clone()))?;
                if !func.accepts(count) {
                    return Err(FormulaError::ArgumentCount {
                        function: func.name.to_string(),
                        expected: func.expected_args(),
                        actual: count,
                    });
                }
                let args = pop_operands(&mut stack, count, name)?;
                stack.push(Expr::Function { func, args });
            }
            Token::TableAccess => {
                let mut parts = pop_operands(&mut stack, 3, "[]")
                    .map_err(|_| FormulaError::MalformedTableAccess("missing operand".into()))?;
                let col = parts.pop();
                let row = parts.pop();
                let table = parts.pop();
                match (table, row, col) {
                    (Some(Expr::CellRef(table)), Some(row), Some(col)) => {
                        stack.push(Expr::TableRef {
                            table,
                            row: Box::new(row),
                            col: Box::new(col),
                        });
                    }
                    _ => {
                        return Err(FormulaError::MalformedTableAccess(
                            "'[' must follow a table name".into(),
                        ))
                    }
                }
            }
            Token::ArgCount(_)
            | Token::OpenParen
            | Token::CloseParen
            | Token::Separator
            | Token::OpenBracket
            | Token::CloseBracket => {
                return Err(FormulaError::Syntax(format!("Unexpected token: {}", token)))
            }
        }
    }

    match stack.len() {
        1 => Ok(stack.remove(0)),
        0 => Err(FormulaError::Syntax("Empty formula".into())),
        _ => Err(FormulaError::Syntax("Missing operator between operands".into())),
    }
}

/// Pop the top `count` operands, keeping their source order
fn pop_operands(stack: &mut Vec<Expr>, count: usize, symbol: &str) -> FormulaResult<Vec<Expr>> {
    if stack.len() < count {
        return Err(FormulaError::MissingOperand(symbol.to_string()));
    }
    Ok(stack.split_off(stack.len() - count))
}

fn classify_atom(text: &str, resolver: &dyn NameResolver) -> FormulaResult<Expr> {
    if text.starts_with('"') {
        return Err(FormulaError::UnterminatedString(text.to_string()));
    }
    if text.eq_ignore_ascii_case("true") {
        return Ok(Expr::Literal(Value::Boolean(true)));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(Expr::Literal(Value::Boolean(false)));
    }
    if text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return text
            .parse::<f64>()
            .map(|n| Expr::Literal(Value::Float(n)))
            .map_err(|_| FormulaError::Syntax(format!("Invalid number: {}", text)));
    }
    if !is_valid_name(text) {
        return Err(FormulaError::Syntax(format!("Unrecognized token: {}", text)));
    }
    resolver
        .resolve(text)
        .map(|id| Expr::CellRef(CellRef::new(id, text)))
        .ok_or_else(|| FormulaError::UnknownCell(text.to_string()))
}

/// Whether `name` can be used as a cell name inside formulas
///
/// Names start with a letter or `_`, continue with letters, digits, `_` or
/// `.`, and must not collide with the boolean literals.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        && !name.eq_ignore_ascii_case("true")
        && !name.eq_ignore_ascii_case("false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::SimpleContext;
    use pretty_assertions::assert_eq;

    fn context() -> SimpleContext {
        SimpleContext::new()
            .with_value("a", Value::Float(1.0))
            .with_value("b", Value::Float(2.0))
    }

    #[test]
    fn test_literals() {
        let ctx = context();
        assert_eq!(compile("42", &ctx).unwrap(), Expr::Literal(Value::Float(42.0)));
        assert_eq!(compile("1.5e2", &ctx).unwrap(), Expr::Literal(Value::Float(150.0)));
        assert_eq!(compile("TRUE", &ctx).unwrap(), Expr::Literal(Value::Boolean(true)));
        assert_eq!(compile("false", &ctx).unwrap(), Expr::Literal(Value::Boolean(false)));
        assert_eq!(
            compile("\"hi there\"", &ctx).unwrap(),
            Expr::Literal(Value::String("hi there".into()))
        );
    }

    #[test]
    fn test_operand_order_is_preserved() {
        let ctx = context();
        let expr = compile("a - b", &ctx).unwrap();
        match expr {
            Expr::Operator { op, operands } => {
                assert_eq!(op.symbol, "-");
                assert_eq!(operands.len(), 2);
                assert!(matches!(&operands[0], Expr::CellRef(r) if r.name == "a"));
                assert!(matches!(&operands[1], Expr::CellRef(r) if r.name == "b"));
            }
            other => panic!("Expected operator, got {:?}", other),
        }
    }

    #[test]
    fn test_function_node() {
        let ctx = context();
        let expr = compile("max(a; b; 3)", &ctx).unwrap();
        match expr {
            Expr::Function { func, args } => {
                assert_eq!(func.name, "max");
                assert_eq!(args.len(), 3);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_references() {
        let ctx = context();
        let a = ctx.resolve("a").unwrap();
        let b = ctx.resolve("b").unwrap();
        let expr = compile("(a) + min(b; a) * 2", &ctx).unwrap();
        assert_eq!(expr.references().into_iter().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_table_reference() {
        let ctx = context().with_table("grid", cellgraph_core::TabularCell::new(2, 2));
        let grid = ctx.resolve("grid").unwrap();
        let expr = compile("grid[a; 0]", &ctx).unwrap();
        assert!(matches!(&expr, Expr::TableRef { table, .. } if table.id == grid));
        assert!(expr.references().contains(&grid));
        assert!(expr.references().contains(&ctx.resolve("a").unwrap()));
    }

    #[test]
    fn test_definition_errors() {
        let ctx = context();
        assert!(matches!(compile("sum(1;2)", &ctx), Err(FormulaError::UnknownFunction(_))));
        assert!(matches!(compile("min()", &ctx), Err(FormulaError::ArgumentCount { .. })));
        assert!(matches!(compile("1 +", &ctx), Err(FormulaError::MissingOperand(_))));
        assert!(matches!(compile("* 2", &ctx), Err(FormulaError::MissingOperand(_))));
        assert!(matches!(compile("nope + 1", &ctx), Err(FormulaError::UnknownCell(_))));
        assert!(matches!(compile("\"open", &ctx), Err(FormulaError::UnterminatedString(_))));
        assert!(matches!(compile("1 2", &ctx), Err(FormulaError::Syntax(_))));
        assert!(matches!(compile("", &ctx), Err(FormulaError::Syntax(_))));
        assert!(matches!(compile("12abc", &ctx), Err(FormulaError::Syntax(_))));
        assert!(matches!(compile("a$", &ctx), Err(FormulaError::Syntax(_))));
        assert!(matches!(
            compile("(1)[0;0]", &ctx),
            Err(FormulaError::MalformedTableAccess(_))
        ));
        assert!(compile("1 +", &ctx).unwrap_err().is_definition());
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("cell1"));
        assert!(is_valid_name("_total"));
        assert!(is_valid_name("q1.sales"));
        assert!(!is_valid_name("1cell"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a b"));
        assert!(!is_valid_name("True"));
    }
}
