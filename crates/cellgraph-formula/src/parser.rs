//! Infix to postfix conversion
//!
//! A shunting-yard parser over the tokenizer's output. The postfix sequence
//! it produces is consumed by [`crate::builder`]:
//! - operators appear after their operands, unary `-`/`+` rewritten to
//!   [`UNARY_MINUS`](crate::operators::UNARY_MINUS) /
//!   [`UNARY_PLUS`](crate::operators::UNARY_PLUS)
//! - a function call appears as [`Token::Function`] followed by
//!   [`Token::ArgCount`]
//! - a table access `name[row;col]` appears as `name row col` followed by
//!   [`Token::TableAccess`]

use crate::error::{FormulaError, FormulaResult};
use crate::operators::{self, OperatorDef};
use crate::token::{tokenize, Token};

/// Parse formula text into postfix tokens
///
/// # Example
/// ```rust
/// use cellgraph_formula::parse_postfix;
///
/// let postfix = parse_postfix("1 + 2 * 3").unwrap();
/// let text: Vec<String> = postfix.iter().map(|t| t.to_string()).collect();
/// assert_eq!(text, vec!["1", "2", "3", "*", "+"]);
/// ```
pub fn parse_postfix(formula: &str) -> FormulaResult<Vec<Token>> {
    to_postfix(&tokenize(formula))
}

/// Convert an infix token sequence into postfix order
pub fn to_postfix(tokens: &[Token]) -> FormulaResult<Vec<Token>> {
    let mut parser = ShuntingYard::new();
    let mut iter = tokens.iter().peekable();

    while let Some(token) = iter.next() {
        match token {
            Token::Atom(name) if matches!(iter.peek(), Some(Token::OpenParen)) => {
                iter.next();
                parser.open_call(name);
            }
            Token::Atom(_) | Token::Text(_) => parser.operand(token.clone()),
            Token::Operator(symbol) => parser.operator(symbol)?,
            Token::OpenParen => parser.open_group(),
            Token::CloseParen => parser.close_paren()?,
            Token::Separator => parser.separator()?,
            Token::OpenBracket => parser.open_bracket()?,
            Token::CloseBracket => parser.close_bracket()?,
            Token::Function(_) | Token::ArgCount(_) | Token::TableAccess => {
                return Err(FormulaError::Syntax(format!(
                    "Unexpected token in infix input: {}",
                    token
                )))
            }
        }
    }

    parser.finish()
}

/// Entry on the operator stack
#[derive(Debug)]
enum Stacked {
    Operator(&'static OperatorDef),
    OpenParen,
    OpenBracket,
    Function(String),
}

/// What an open paren/bracket belongs to
#[derive(Debug, PartialEq)]
enum FrameKind {
    Group,
    Call,
    Table,
}

/// Argument bookkeeping for one open paren/bracket
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    separators: usize,
    has_args: bool,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            separators: 0,
            has_args: false,
        }
    }

    fn arg_count(&self) -> usize {
        if self.has_args {
            self.separators + 1
        } else {
            0
        }
    }
}

struct ShuntingYard {
    output: Vec<Token>,
    stack: Vec<Stacked>,
    frames: Vec<Frame>,
    /// Whether the previous token completed an operand; decides whether a
    /// `-`/`+` is unary
    after_operand: bool,
}

impl ShuntingYard {
    fn new() -> Self {
        Self {
            output: Vec::new(),
            stack: Vec::new(),
            frames: Vec::new(),
            after_operand: false,
        }
    }

    fn mark_argument(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.has_args = true;
        }
    }

    fn operand(&mut self, token: Token) {
        self.output.push(token);
        self.mark_argument();
        self.after_operand = true;
    }

    fn operator(&mut self, symbol: &str) -> FormulaResult<()> {
        let symbol = if self.after_operand {
            symbol
        } else {
            operators::prefix_form(symbol).unwrap_or(symbol)
        };
        let def = operators::lookup(symbol)
            .ok_or_else(|| FormulaError::UnknownOperator(symbol.to_string()))?;

        while let Some(Stacked::Operator(top)) = self.stack.last() {
            if !top.pops_before(def) {
                break;
            }
            self.output.push(Token::operator(top.symbol));
            self.stack.pop();
        }

        self.stack.push(Stacked::Operator(def));
        self.mark_argument();
        self.after_operand = false;
        Ok(())
    }

    fn open_group(&mut self) {
        self.mark_argument();
        self.stack.push(Stacked::OpenParen);
        self.frames.push(Frame::new(FrameKind::Group));
        self.after_operand = false;
    }

    fn open_call(&mut self, name: &str) {
        self.mark_argument();
        self.stack.push(Stacked::Function(name.to_string()));
        self.stack.push(Stacked::OpenParen);
        self.frames.push(Frame::new(FrameKind::Call));
        self.after_operand = false;
    }

    fn open_bracket(&mut self) -> FormulaResult<()> {
        if !self.after_operand {
            return Err(FormulaError::MalformedTableAccess(
                "'[' must follow a table name".into(),
            ));
        }
        self.stack.push(Stacked::OpenBracket);
        self.frames.push(Frame::new(FrameKind::Table));
        self.after_operand = false;
        Ok(())
    }

    /// Emit stacked operators down to the nearest open paren or bracket,
    /// leaving the marker on the stack
    fn drain_to_marker(&mut self) -> Option<&Stacked> {
        while let Some(Stacked::Operator(def)) = self.stack.last() {
            self.output.push(Token::operator(def.symbol));
            self.stack.pop();
        }
        self.stack.last()
    }

    fn close_paren(&mut self) -> FormulaResult<()> {
        match self.drain_to_marker() {
            Some(Stacked::OpenParen) => {}
            Some(Stacked::OpenBracket) => {
                return Err(FormulaError::Syntax("')' closes an open '['".into()))
            }
            _ => return Err(FormulaError::Syntax("Unmatched ')'".into())),
        }
        self.stack.pop();

        let frame = self
            .frames
            .pop()
            .ok_or_else(|| FormulaError::Syntax("Unmatched ')'".into()))?;
        if frame.has_args && !self.after_operand {
            return Err(FormulaError::Syntax("Missing expression before ')'".into()));
        }

        match frame.kind {
            FrameKind::Call => {
                if let Some(Stacked::Function(name)) = self.stack.pop() {
                    self.output.push(Token::Function(name));
                    self.output.push(Token::ArgCount(frame.arg_count()));
                }
            }
            FrameKind::Group if !frame.has_args => {
                return Err(FormulaError::Syntax("Empty parentheses".into()))
            }
            _ => {}
        }

        self.after_operand = true;
        Ok(())
    }

    /// `;` ends one argument: operators of that argument are emitted and the
    /// open marker stays so the next argument shares its scope
    fn separator(&mut self) -> FormulaResult<()> {
        if !self.after_operand {
            return Err(FormulaError::Syntax("Missing expression before ';'".into()));
        }
        match self.drain_to_marker() {
            Some(Stacked::OpenParen) | Some(Stacked::OpenBracket) => {}
            _ => return Err(FormulaError::Syntax("';' outside of an argument list".into())),
        }
        match self.frames.last_mut() {
            Some(frame) if frame.kind != FrameKind::Group => frame.separators += 1,
            _ => return Err(FormulaError::Syntax("';' outside of an argument list".into())),
        }
        self.after_operand = false;
        Ok(())
    }

    fn close_bracket(&mut self) -> FormulaResult<()> {
        match self.drain_to_marker() {
            Some(Stacked::OpenBracket) => {}
            _ => return Err(FormulaError::MalformedTableAccess("Unmatched ']'".into())),
        }
        self.stack.pop();

        let frame = self
            .frames
            .pop()
            .ok_or_else(|| FormulaError::MalformedTableAccess("Unmatched ']'".into()))?;
        if frame.arg_count() != 2 || !self.after_operand {
            return Err(FormulaError::MalformedTableAccess(
                "expected [row;column]".into(),
            ));
        }

        self.output.push(Token::TableAccess);
        self.after_operand = true;
        Ok(())
    }

    fn finish(mut self) -> FormulaResult<Vec<Token>> {
        while let Some(stacked) = self.stack.pop() {
            match stacked {
                Stacked::Operator(def) => self.output.push(Token::operator(def.symbol)),
                Stacked::OpenParen | Stacked::Function(_) => {
                    return Err(FormulaError::Syntax("Unclosed '('".into()))
                }
                Stacked::OpenBracket => {
                    return Err(FormulaError::MalformedTableAccess("Unclosed '['".into()))
                }
            }
        }
        Ok(self.output)
    }
}
