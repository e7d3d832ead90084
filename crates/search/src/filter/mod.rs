//! Filter expression language.
//!
//! A filter such as `age gt 18 and (status eq 'active' or status eq 'pending')`
//! goes through two stages:
//!
//! 1. [`lexer::tokenize`] turns the string into [`Token`]s.
//! 2. [`parser::parse`] builds a [`QueryNode`] tree from them.
//!
//! [`parse_filter`] runs both stages. The resulting tree is compiled into a
//! backend query by the backend modules.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{ComparisonOperator, FunctionKind, Literal, LogicalOperator, Property, QueryNode};
pub use lexer::tokenize;
pub use parser::{parse, parse_filter};
pub use token::{Token, TokenKind};
