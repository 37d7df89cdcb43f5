//! Formula tokenizer
//!
//! Splits formula text into a flat token sequence. Whitespace is discarded;
//! any operator, parenthesis, bracket, separator or whitespace character ends
//! the current atom. Tokenizing never fails: text the grammar does not know
//! comes out as an atom and is rejected later by the tree builder.

use std::fmt;
use std::ops::Range;

/// Argument separator inside function calls and table access
pub const SEPARATOR: char = ';';

/// A formula token
///
/// The tokenizer produces every variant except [`Token::Function`],
/// [`Token::ArgCount`] and [`Token::TableAccess`], which only appear in the
/// parser's postfix output.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Number, identifier or boolean literal, as written
    Atom(String),
    /// Quoted string literal (quotes removed, doubled quotes unescaped)
    Text(String),
    /// Operator symbol
    Operator(String),
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `;`
    Separator,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// Function call (postfix only)
    Function(String),
    /// Argument count of the preceding function (postfix only)
    ArgCount(usize),
    /// Table access marker (postfix only)
    TableAccess,
}

impl Token {
    /// Create an atom token
    pub fn atom(text: impl Into<String>) -> Self {
        Token::Atom(text.into())
    }

    /// Create an operator token
    pub fn operator(symbol: impl Into<String>) -> Self {
        Token::Operator(symbol.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Atom(s) | Token::Operator(s) | Token::Function(s) => f.write_str(s),
            Token::Text(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::Separator => write!(f, "{}", SEPARATOR),
            Token::OpenBracket => f.write_str("["),
            Token::CloseBracket => f.write_str("]"),
            Token::ArgCount(n) => write!(f, "{}", n),
            Token::TableAccess => f.write_str("[]"),
        }
    }
}

/// Tokenize formula text
///
/// # Example
/// ```rust
/// use cellgraph_formula::token::{tokenize, Token};
///
/// let tokens = tokenize("  1    +   2    ");
/// assert_eq!(tokens, vec![Token::atom("1"), Token::operator("+"), Token::atom("2")]);
/// ```
pub fn tokenize(formula: &str) -> Vec<Token> {
    Lexer::new(formula).map(|(token, _)| token).collect()
}

/// Tokenize formula text, keeping the byte range each token came from
pub fn tokenize_spanned(formula: &str) -> Vec<(Token, Range<usize>)> {
    Lexer::new(formula).collect()
}

/// Replace every reference to `old` in `formula` with `new`.
///
/// Only whole atoms are replaced; string literals, function names and the
/// surrounding whitespace are left as written. Returns `None` when the
/// formula does not mention `old`.
pub fn rename_reference(formula: &str, old: &str, new: &str) -> Option<String> {
    let mut result = String::with_capacity(formula.len());
    let mut last = 0;
    let mut changed = false;

    let tokens = tokenize_spanned(formula);
    for (i, (token, span)) in tokens.iter().enumerate() {
        let is_call = matches!(tokens.get(i + 1), Some((Token::OpenParen, _)));
        if let Token::Atom(text) = token {
            if text == old && !is_call {
                result.push_str(&formula[last..span.start]);
                result.push_str(new);
                last = span.end;
                changed = true;
            }
        }
    }

    if !changed {
        return None;
    }
    result.push_str(&formula[last..]);
    Some(result)
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '<' | '>' | '=' | '!' | '&' | '|')
}

/// Number text that stops right after its exponent marker
fn is_exponent_prefix(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && text.ends_with(|c: char| c == 'e' || c == 'E')
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace()
        || is_operator_char(c)
        || matches!(c, '(' | ')' | '[' | ']' | '"')
        || c == SEPARATOR
}

/// Iterator over (token, span) pairs
struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, char::is_whitespace) {
            self.advance();
        }
    }

    fn scan_operator(&mut self, first: char) -> Token {
        self.advance();
        let second = self.peek_char();
        let pair = match (first, second) {
            ('<', Some('=')) => Some("<="),
            ('<', Some('>')) => Some("<>"),
            ('>', Some('=')) => Some(">="),
            ('&', Some('&')) => Some("&&"),
            ('|', Some('|')) => Some("||"),
            _ => None,
        };
        match pair {
            Some(symbol) => {
                self.advance();
                Token::operator(symbol)
            }
            None => Token::Operator(first.to_string()),
        }
    }

    fn scan_string(&mut self, start: usize) -> Token {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    if self.peek_char() == Some('"') {
                        text.push('"');
                        self.advance();
                    } else {
                        return Token::Text(text);
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                // No closing quote: hand the raw text on as an atom
                None => return Token::Atom(self.input[start..].to_string()),
            }
        }
    }

    fn scan_atom(&mut self, start: usize) -> Token {
        loop {
            while self.peek_char().map_or(false, |c| !is_boundary(c)) {
                self.advance();
            }
            // Signed exponent of a number literal, e.g. `1e-3`
            let exponent_sign = matches!(self.peek_char(), Some('+' | '-'));
            if exponent_sign && is_exponent_prefix(&self.input[start..self.pos]) {
                self.advance();
                continue;
            }
            return Token::Atom(self.input[start..self.pos].to_string());
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = (Token, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.pos;
        let c = self.peek_char()?;

        let token = match c {
            '(' => {
                self.advance();
                Token::OpenParen
            }
            ')' => {
                self.advance();
                Token::CloseParen
            }
            '[' => {
                self.advance();
                Token::OpenBracket
            }
            ']' => {
                self.advance();
                Token::CloseBracket
            }
            SEPARATOR => {
                self.advance();
                Token::Separator
            }
            '"' => self.scan_string(start),
            c if is_operator_char(c) => self.scan_operator(c),
            _ => self.scan_atom(start),
        };

        Some((token, start..self.pos))
    }
}
