//! Recursive-descent parser for ranking expressions.
//!
//! Precedence, loosest first: `||`, `&&`, comparisons, `+ -`, `* / %`,
//! `^` (right associative), unary `- !`. Atoms are literals, references,
//! lambdas (`f(x)(x * 2)`) and tensor expressions (`tensor(x[2]):[1,2]`,
//! `tensor(x[3])(x + 1)`).

use std::ops::Range;

use super::ast::{
    BinaryOp, Expr, Lambda, Reference, TensorBody, TensorExpr, TensorType, TensorValue, UnaryOp,
};
use super::lexer::{Token, TokenKind, lex};
use super::ParseError;

/// Nesting deeper than this is rejected instead of overflowing the stack.
const MAX_DEPTH: usize = 256;

/// Parse one complete expression.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expression()?;
    if let Some(token) = parser.peek_token() {
        return Err(ParseError::new(
            format!("unexpected {:?} after expression", parser.text(token)),
            token.span.clone(),
        ));
    }
    Ok(expr)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<TokenKind> {
        self.peek_token().map(|t| t.kind)
    }

    fn text(&self, token: &Token) -> &'src str {
        let source: &'src str = self.source;
        &source[token.span.clone()]
    }

    fn end_span(&self) -> Range<usize> {
        self.source.len()..self.source.len()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(ParseError::new(
                format!("expected {what}, found {:?}", self.text(&token)),
                token.span,
            )),
            None => Err(ParseError::new(
                format!("expected {what}, found end of expression"),
                self.end_span(),
            )),
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(|p| p.binary(1))
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let span = self
                .peek_token()
                .map_or_else(|| self.end_span(), |t| t.span.clone());
            return Err(ParseError::new("expression nested too deeply", span));
        }
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Precedence climbing over the binary operator levels.
    fn binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        while let Some(op) = self.peek().and_then(binary_op) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let next = if op.is_right_associative() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.binary(next)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Bang) => UnaryOp::Not,
            _ => return self.primary(),
        };
        self.pos += 1;
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new("expression nested too deeply", self.end_span()));
        }
        let operand = self.unary();
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand?)))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.bump() else {
            return Err(ParseError::new(
                "expected expression, found end of expression",
                self.end_span(),
            ));
        };
        match token.kind {
            TokenKind::Number => Ok(Expr::Number(self.text(&token).to_string())),
            TokenKind::Str => Ok(Expr::Str(self.text(&token).to_string())),
            TokenKind::LParen => {
                let inner = self.expression()?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            TokenKind::Ident
                if self.text(&token) == "tensor"
                    && matches!(self.peek(), Some(TokenKind::Lt | TokenKind::LParen)) =>
            {
                self.tensor()
            }
            TokenKind::Ident => self.reference(&token),
            _ => Err(ParseError::new(
                format!("expected expression, found {:?}", self.text(&token)),
                token.span,
            )),
        }
    }

    /// A feature reference, or a lambda when `f(params)` is followed by `(`.
    fn reference(&mut self, name: &Token) -> Result<Expr, ParseError> {
        let mut reference = Reference::new(self.text(name));

        if self.eat(TokenKind::LParen) {
            reference.call = true;
            if !self.eat(TokenKind::RParen) {
                loop {
                    reference.args.push(self.expression()?);
                    if self.eat(TokenKind::Comma) {
                        continue;
                    }
                    self.expect(TokenKind::RParen, "`,` or `)`")?;
                    break;
                }
            }
        }

        if reference.name == "f"
            && self.peek() == Some(TokenKind::LParen)
            && let Some(params) = lambda_params(&reference)
        {
            self.pos += 1;
            let body = self.expression()?;
            self.expect(TokenKind::RParen, "`)`")?;
            return Ok(Expr::Lambda(Lambda {
                params,
                body: Box::new(body),
            }));
        }

        reference.output = self.output()?;
        Ok(Expr::Ref(reference))
    }

    /// Dotted output name after a feature: `.completeness`, `.a.b`, `.0`.
    fn output(&mut self) -> Result<Option<String>, ParseError> {
        let mut segments: Vec<&'src str> = Vec::new();
        while let Some(token) = self.peek_token().cloned() {
            let text = self.text(&token);
            match token.kind {
                // `.0` lexes as a single number
                TokenKind::Number if text.starts_with('.') => {
                    self.pos += 1;
                    segments.push(&text[1..]);
                }
                TokenKind::Dot => {
                    self.pos += 1;
                    segments.push(self.output_segment()?);
                }
                _ => break,
            }
        }
        Ok((!segments.is_empty()).then(|| segments.join(".")))
    }

    fn output_segment(&mut self) -> Result<&'src str, ParseError> {
        match self.bump() {
            Some(t)
                if t.kind == TokenKind::Ident
                    || (t.kind == TokenKind::Number && !self.text(&t).starts_with('.')) =>
            {
                Ok(self.text(&t))
            }
            Some(t) => Err(ParseError::new(
                format!("expected output name, found {:?}", self.text(&t)),
                t.span,
            )),
            None => Err(ParseError::new(
                "expected output name, found end of expression",
                self.end_span(),
            )),
        }
    }

    /// Called after the `tensor` keyword.
    fn tensor(&mut self) -> Result<Expr, ParseError> {
        let tensor_type = self.tensor_type()?;
        let body = if self.eat(TokenKind::Colon) {
            TensorBody::Literal(self.tensor_value()?)
        } else {
            self.expect(TokenKind::LParen, "`:` or `(` after tensor type")?;
            let body = self.expression()?;
            self.expect(TokenKind::RParen, "`)`")?;
            TensorBody::Generate(Box::new(body))
        };
        Ok(Expr::Tensor(TensorExpr { tensor_type, body }))
    }

    /// `<cell>(x[2],y{})`, with the `tensor` keyword already consumed.
    fn tensor_type(&mut self) -> Result<TensorType, ParseError> {
        let mut text = String::from("tensor");
        if self.eat(TokenKind::Lt) {
            let cell = self.expect(TokenKind::Ident, "cell type")?;
            text.push('<');
            text.push_str(self.text(&cell));
            text.push('>');
            self.expect(TokenKind::Gt, "`>`")?;
        }
        self.expect(TokenKind::LParen, "`(`")?;
        text.push('(');

        let mut dimensions = Vec::new();
        if !self.eat(TokenKind::RParen) {
            loop {
                let name = self.expect(TokenKind::Ident, "dimension name")?;
                let name = self.text(&name);
                text.push_str(name);
                if self.eat(TokenKind::LBracket) {
                    text.push('[');
                    if self.peek() == Some(TokenKind::Number)
                        && let Some(size) = self.bump()
                    {
                        text.push_str(self.text(&size));
                    }
                    self.expect(TokenKind::RBracket, "`]`")?;
                    text.push(']');
                } else {
                    self.expect(TokenKind::LBrace, "`[` or `{`")?;
                    self.expect(TokenKind::RBrace, "`}`")?;
                    text.push_str("{}");
                }
                dimensions.push(name.to_string());

                if self.eat(TokenKind::Comma) {
                    text.push(',');
                    continue;
                }
                self.expect(TokenKind::RParen, "`,` or `)`")?;
                break;
            }
        }
        text.push(')');
        Ok(TensorType { text, dimensions })
    }

    fn tensor_value(&mut self) -> Result<TensorValue, ParseError> {
        if self.eat(TokenKind::LBracket) {
            let mut cells = Vec::new();
            if !self.eat(TokenKind::RBracket) {
                loop {
                    cells.push(self.tensor_cell()?);
                    if self.eat(TokenKind::Comma) {
                        continue;
                    }
                    self.expect(TokenKind::RBracket, "`,` or `]`")?;
                    break;
                }
            }
            return Ok(TensorValue::Dense(cells));
        }

        self.expect(TokenKind::LBrace, "`[` or `{`")?;
        let mut cells = Vec::new();
        if !self.eat(TokenKind::RBrace) {
            loop {
                let address = self.tensor_address()?;
                self.expect(TokenKind::Colon, "`:`")?;
                cells.push((address, self.tensor_cell()?));
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                self.expect(TokenKind::RBrace, "`,` or `}`")?;
                break;
            }
        }
        Ok(TensorValue::Mapped(cells))
    }

    /// A nested block or a cell expression.
    fn tensor_cell(&mut self) -> Result<TensorValue, ParseError> {
        match self.peek() {
            Some(TokenKind::LBracket | TokenKind::LBrace) => self.nested(|p| p.tensor_value()),
            _ => Ok(TensorValue::Cell(Box::new(self.expression()?))),
        }
    }

    /// `label`, `"label"` or `{x:a,y:b}`.
    fn tensor_address(&mut self) -> Result<String, ParseError> {
        if !self.eat(TokenKind::LBrace) {
            return Ok(self.label()?.to_string());
        }
        let mut address = String::from("{");
        loop {
            let dimension = self.expect(TokenKind::Ident, "dimension name")?;
            address.push_str(self.text(&dimension));
            self.expect(TokenKind::Colon, "`:`")?;
            address.push(':');
            address.push_str(self.label()?);
            if self.eat(TokenKind::Comma) {
                address.push(',');
                continue;
            }
            self.expect(TokenKind::RBrace, "`,` or `}`")?;
            address.push('}');
            return Ok(address);
        }
    }

    fn label(&mut self) -> Result<&'src str, ParseError> {
        match self.bump() {
            Some(t) if matches!(t.kind, TokenKind::Ident | TokenKind::Number | TokenKind::Str) => {
                Ok(self.text(&t))
            }
            Some(t) => Err(ParseError::new(
                format!("expected label, found {:?}", self.text(&t)),
                t.span,
            )),
            None => Err(ParseError::new(
                "expected label, found end of expression",
                self.end_span(),
            )),
        }
    }
}

/// Parameter names of `f(x,y)` when every argument is a bare identifier.
fn lambda_params(reference: &Reference) -> Option<Vec<String>> {
    reference
        .args
        .iter()
        .map(|arg| match arg {
            Expr::Ref(r) if r.is_identifier() => Some(r.name.clone()),
            _ => None,
        })
        .collect()
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Approx => BinaryOp::Approx,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Caret => BinaryOp::Pow,
        _ => return None,
    })
}
