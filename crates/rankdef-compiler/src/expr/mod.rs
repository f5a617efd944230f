//! Ranking expressions: lexer, parser and tree.
//!
//! Schema text is parsed elsewhere; what arrives here are the expression
//! strings inside an already-parsed rank profile. They are parsed so that
//! functions can be inlined and rewritten values can be checked before they
//! are emitted.

mod ast;
mod lexer;
mod parser;

#[cfg(test)]
mod parser_tests;

use std::ops::Range;

pub use ast::{
    BinaryOp, Expr, Lambda, Reference, TensorBody, TensorExpr, TensorType, TensorValue, UnaryOp,
};
pub use lexer::{Token, TokenKind, lex};
pub use parser::parse;

/// Syntax error in a ranking expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct ParseError {
    pub message: String,
    pub span: Range<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}
