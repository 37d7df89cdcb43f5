//! # cellgraph-formula
//!
//! Formula pipeline for cellgraph.
//!
//! This crate provides:
//! - Tokenizing (text → tokens)
//! - Infix to postfix conversion (shunting-yard)
//! - Expression tree building (postfix → [`Expr`], names resolved to ids)
//! - Tree evaluation against an [`EvalContext`]
//! - The operator table and the built-in functions (`min`, `max`, `average`)
//!
//! ## Example
//!
//! ```rust
//! use cellgraph_core::Value;
//! use cellgraph_formula::{compile, evaluate, SimpleContext};
//!
//! let ctx = SimpleContext::new();
//! let expr = compile("average(1;2;10;6;3)", &ctx).unwrap();
//! assert_eq!(evaluate(&expr, &ctx).unwrap(), Value::Float(4.4));
//! ```

pub mod ast;
pub mod builder;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod operators;
pub mod parser;
pub mod token;

pub use ast::{CellRef, Expr};
pub use builder::{build_tree, compile, is_valid_name, NameResolver};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, EvalContext, SimpleContext};
pub use parser::{parse_postfix, to_postfix};
pub use token::{rename_reference, tokenize, Token};
