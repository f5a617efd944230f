//! Ranking expression tree.
//!
//! `Display` renders the canonical text sent to the backend: single spaces
//! around binary operators, no spaces inside argument lists, and parentheses
//! only where the tree needs them or where the source had them.

use std::fmt::{self, Write as _};

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numeric literal, kept in its source spelling.
    Number(String),
    /// String literal including its quotes.
    Str(String),
    Ref(Reference),
    /// Parentheses written in the source (or added by inlining).
    Group(Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `f(x,y)(body)`, the function argument of `map`, `join` and friends.
    Lambda(Lambda),
    /// `tensor(x[2]):[1,2]` or `tensor(x[3])(x + 1)`.
    Tensor(TensorExpr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TensorExpr {
    pub tensor_type: TensorType,
    pub body: TensorBody,
}

/// Type prefix of a tensor expression.
#[derive(Clone, Debug, PartialEq)]
pub struct TensorType {
    /// Canonical spelling: `tensor<float>(x[2],y{})`.
    pub text: String,
    pub dimensions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TensorBody {
    Literal(TensorValue),
    /// Cell expression over the dimension names.
    Generate(Box<Expr>),
}

/// Tensor literal block. Cells are expressions, so they can reference
/// features and functions like any other expression.
#[derive(Clone, Debug, PartialEq)]
pub enum TensorValue {
    /// `[a,b]`, possibly nested.
    Dense(Vec<TensorValue>),
    /// `{label:value}` or `{{x:a,y:b}:value}`. Addresses are kept as text.
    Mapped(Vec<(String, TensorValue)>),
    Cell(Box<Expr>),
}

/// A feature or function reference: `name`, `name(args)`, `name(args).output`.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    pub name: String,
    pub args: Vec<Expr>,
    /// `f()` and `f` are different spellings; both are kept verbatim.
    pub call: bool,
    pub output: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Approx,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

const UNARY_PRECEDENCE: u8 = 7;
const ATOM_PRECEDENCE: u8 = 8;

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Approx => "~=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Approx
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
            BinaryOp::Pow => 6,
        }
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, BinaryOp::Pow)
    }

    /// Comparison and logical operators always produce a scalar.
    pub fn is_boolean(self) -> bool {
        self.precedence() <= 3
    }
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            call: false,
            output: None,
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            call: true,
            output: None,
        }
    }

    /// A bare identifier: no argument list, no output.
    pub fn is_identifier(&self) -> bool {
        !self.call && self.output.is_none()
    }

    /// The single identifier argument of `feature(arg)`, if that is the shape.
    pub fn single_name_arg(&self) -> Option<&str> {
        match self.args.as_slice() {
            [Expr::Ref(r)] if r.is_identifier() => Some(&r.name),
            _ => None,
        }
    }
}

impl Expr {
    pub fn number(text: impl Into<String>) -> Self {
        Expr::Number(text.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ref(Reference::new(name))
    }

    /// `expressionRef(name)`: reference to a function serialized separately.
    pub fn expression_ref(name: impl Into<String>) -> Self {
        Expr::Ref(Reference::call("expressionRef", vec![Expr::ident(name)]))
    }

    /// Wrap in parentheses unless already parenthesized.
    pub fn grouped(self) -> Self {
        match self {
            Expr::Group(_) => self,
            other => Expr::Group(Box::new(other)),
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Expr::Ref(r) => Some(r),
            _ => None,
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, _, _) => op.precedence(),
            Expr::Unary(_, _) => UNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    /// Indented tree form, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Expr::Number(n) => {
                let _ = writeln!(out, "{indent}Number {n}");
            }
            Expr::Str(s) => {
                let _ = writeln!(out, "{indent}Str {s}");
            }
            Expr::Ref(r) => {
                let _ = write!(out, "{indent}Ref {}", r.name);
                if r.call {
                    out.push_str("()");
                }
                if let Some(output) = &r.output {
                    let _ = write!(out, " .{output}");
                }
                out.push('\n');
                for arg in &r.args {
                    arg.dump_into(out, depth + 1);
                }
            }
            Expr::Group(inner) => {
                let _ = writeln!(out, "{indent}Group");
                inner.dump_into(out, depth + 1);
            }
            Expr::Unary(op, operand) => {
                let symbol = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                };
                let _ = writeln!(out, "{indent}Unary {symbol}");
                operand.dump_into(out, depth + 1);
            }
            Expr::Binary(op, left, right) => {
                let _ = writeln!(out, "{indent}Binary {}", op.symbol());
                left.dump_into(out, depth + 1);
                right.dump_into(out, depth + 1);
            }
            Expr::Lambda(lambda) => {
                let _ = writeln!(out, "{indent}Lambda {}", lambda.params.join(","));
                lambda.body.dump_into(out, depth + 1);
            }
            Expr::Tensor(tensor) => match &tensor.body {
                TensorBody::Literal(value) => {
                    let _ = writeln!(out, "{indent}Tensor {}:{value}", tensor.tensor_type.text);
                }
                TensorBody::Generate(body) => {
                    let _ = writeln!(out, "{indent}Tensor {}", tensor.tensor_type.text);
                    body.dump_into(out, depth + 1);
                }
            },
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => f.write_str(n),
            Expr::Str(s) => f.write_str(s),
            Expr::Ref(r) => write!(f, "{r}"),
            Expr::Group(inner) => write!(f, "({inner})"),
            Expr::Unary(op, operand) => {
                f.write_str(match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                })?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
            Expr::Binary(op, left, right) => {
                let prec = op.precedence();
                let right_assoc = op.is_right_associative();
                let left_parens =
                    left.precedence() < prec || (right_assoc && left.precedence() == prec);
                let right_parens =
                    right.precedence() < prec || (!right_assoc && right.precedence() == prec);
                write_operand(f, left, left_parens)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right, right_parens)
            }
            Expr::Lambda(lambda) => {
                write!(f, "f({})({})", lambda.params.join(","), lambda.body)
            }
            Expr::Tensor(tensor) => {
                f.write_str(&tensor.tensor_type.text)?;
                match &tensor.body {
                    TensorBody::Literal(value) => write!(f, ":{value}"),
                    TensorBody::Generate(body) => write!(f, "({body})"),
                }
            }
        }
    }
}

impl fmt::Display for TensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorValue::Cell(expr) => write!(f, "{expr}"),
            TensorValue::Dense(cells) => {
                f.write_char('[')?;
                for (i, cell) in cells.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{cell}")?;
                }
                f.write_char(']')
            }
            TensorValue::Mapped(cells) => {
                f.write_char('{')?;
                for (i, (address, cell)) in cells.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{address}:{cell}")?;
                }
                f.write_char('}')
            }
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.call {
            f.write_char('(')?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write!(f, "{arg}")?;
            }
            f.write_char(')')?;
        }
        if let Some(output) = &self.output {
            write!(f, ".{output}")?;
        }
        Ok(())
    }
}
