//! Abstract syntax tree.
use super::storage::SlotKey;
use crate::tokens::TokenKind;
use smol_str::SmolStr;
use std::fmt;

/// Built program.
#[derive(Debug, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    /// Every resolved identifier use, in source order.
    pub references: Vec<Reference>,
}

impl Program {
    /// Reference report, one `<line> <declaration line> <name>` per line.
    pub fn reference_report(&self) -> String {
        let mut report = String::new();
        for reference in &self.references {
            report.push_str(&reference.to_string());
            report.push('\n');
        }
        report
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub line: u32,
    pub declared: u32,
    pub name: SmolStr,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.line, self.declared, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assign(Assign),
    For(ForLoop),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub name: SmolStr,
    pub line: u32,
    /// Storage the value is written to.
    pub slot: SlotKey,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForLoop {
    pub counter: SmolStr,
    pub line: u32,
    pub slot: SlotKey,
    pub from: Expr,
    /// Inclusive upper bound, evaluated again on every iteration.
    pub to: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(i32),
    Var(VarRef),
    Unary(UnaryOp, Box<Expr>),
    Binary(Box<BinaryExpr>),
}

impl Expr {
    pub fn binary(lhs: Expr, operator: BinOp, rhs: Expr) -> Self {
        Expr::Binary(Box::new(BinaryExpr { operator, lhs, rhs }))
    }

    pub fn unary(operator: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(operator, Box::new(operand))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarRef {
    pub name: SmolStr,
    pub line: u32,
    /// `None` when the name didn't resolve and checking is disabled.
    pub slot: Option<SlotKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub operator: BinOp,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        }
    }
}

impl fmt::Display for BinOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinOp::Add => f.write_str("+"),
            BinOp::Sub => f.write_str("-"),
            BinOp::Mul => f.write_str("*"),
            BinOp::Div => f.write_str("/"),
        }
    }
}

/// Fully parenthesised infix form, used in traces and tests.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Var(var) => write!(f, "{}", var.name),
            Expr::Unary(UnaryOp::Pos, operand) => write!(f, "+{operand}"),
            Expr::Unary(UnaryOp::Neg, operand) => write!(f, "-{operand}"),
            Expr::Binary(bin) => write!(f, "({} {} {})", bin.lhs, bin.operator, bin.rhs),
        }
    }
}
