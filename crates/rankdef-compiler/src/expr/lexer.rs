//! Lexer for ranking expressions.
//!
//! Produces span-based tokens; text is sliced from the source when the
//! parser needs it.

use std::ops::Range;

use logos::Logos;

use super::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum TokenKind {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("^")]
    Caret,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("~=")]
    Approx,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,

    #[token("!")]
    Bang,

    /// `.5` is a number. Right after a feature the parser reads it as the
    /// output `5`.
    #[regex(r"([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    #[regex(r#"'(?:[^'\\]|\\.)*'"#)]
    Str,

    /// Feature names, function names and arguments. `@` appears in bound
    /// function instances, `$` in legacy variable syntax.
    #[regex(r"[A-Za-z_$][A-Za-z0-9_@$]*")]
    Ident,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize `source`. The first character no token matches is an error.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    for (result, span) in TokenKind::lexer(source).spanned() {
        match result {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => {
                return Err(ParseError::new(
                    format!("unexpected character {:?}", &source[span.clone()]),
                    span,
                ));
            }
        }
    }
    Ok(tokens)
}
