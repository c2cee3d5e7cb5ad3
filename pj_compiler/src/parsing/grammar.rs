//! Grammar symbols.
use crate::tokens::TokenKind;
use std::fmt;

/// Nonterminal symbols of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[rustfmt::skip]
pub enum NonTerminal {
    Program,    // <program>
    StmtList,   // <lista_naredbi>
    Stmt,       // <naredba>
    Assign,     // <naredba_pridruzivanja>
    ForLoop,    // <za_petlja>
    Expr,       // <E>
    ExprTail,   // <E_lista>
    Term,       // <T>
    TermTail,   // <T_lista>
    Factor,     // <P>
}

impl NonTerminal {
    pub const COUNT: usize = 10;

    /// Name as it appears in the derivation tree text, including angle brackets.
    #[rustfmt::skip]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Program  => "<program>",
            Self::StmtList => "<lista_naredbi>",
            Self::Stmt     => "<naredba>",
            Self::Assign   => "<naredba_pridruzivanja>",
            Self::ForLoop  => "<za_petlja>",
            Self::Expr     => "<E>",
            Self::ExprTail => "<E_lista>",
            Self::Term     => "<T>",
            Self::TermTail => "<T_lista>",
            Self::Factor   => "<P>",
        }
    }

    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "<program>"               => Some(Self::Program),
            "<lista_naredbi>"         => Some(Self::StmtList),
            "<naredba>"               => Some(Self::Stmt),
            "<naredba_pridruzivanja>" => Some(Self::Assign),
            "<za_petlja>"             => Some(Self::ForLoop),
            "<E>"                     => Some(Self::Expr),
            "<E_lista>"               => Some(Self::ExprTail),
            "<T>"                     => Some(Self::Term),
            "<T_lista>"               => Some(Self::TermTail),
            "<P>"                     => Some(Self::Factor),
            _ => None,
        }
    }

    /// Row index in the parser table.
    #[inline(always)]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Grammar symbol, either a terminal token kind or a nonterminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Term(TokenKind),
    NonTerm(NonTerminal),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Term(kind) => fmt::Display::fmt(kind, f),
            Symbol::NonTerm(nonterm) => fmt::Display::fmt(nonterm, f),
        }
    }
}

/// Right-hand side of a production. The empty slice is ε.
pub type Production = &'static [Symbol];

/// Marker written to the derivation tree for an ε production.
pub const EPSILON: &str = "$";

/// Marker used in diagnostics when the token stream is exhausted.
pub const END_OF_INPUT: &str = "kraj";
