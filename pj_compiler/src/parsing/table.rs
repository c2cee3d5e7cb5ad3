//! LL(1) transition table.
//!
//! Rows are the nonterminals followed by the bottom-of-stack sentinel.
//! Columns are the terminals followed by the end-of-input marker.
//!
//! The grammar is LL(1), so every cell holds at most one production.
//! This is not re-validated at runtime.
use super::grammar::{NonTerminal, Production, Symbol};
use crate::tokens::TokenKind;

/// Entry in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Error,
    /// Only valid for the sentinel row on end of input.
    Accept,
    /// Expand the stack top with the production.
    Produce(Production),
}

/// Row selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    NonTerm(NonTerminal),
    Bottom,
}

const ROWS: usize = NonTerminal::COUNT + 1;
const COLUMNS: usize = TokenKind::COUNT + 1;

/// Look up the cell for the stack top and lookahead.
///
/// A lookahead of `None` means the token stream is exhausted.
#[inline]
pub fn lookup(row: Row, lookahead: Option<TokenKind>) -> Cell {
    let r = match row {
        Row::NonTerm(nonterm) => nonterm.index(),
        Row::Bottom => NonTerminal::COUNT,
    };
    let c = match lookahead {
        Some(kind) => kind.index(),
        None => TokenKind::COUNT,
    };
    TABLE[r][c]
}

// ----------------------------------------------------------------------------
// Productions

use NonTerminal as N;
use Symbol::{NonTerm as NT, Term as T};
use TokenKind as K;

const EPSILON: Production = &[];
const PROGRAM: Production = &[NT(N::StmtList)];
const STMT_LIST: Production = &[NT(N::Stmt), NT(N::StmtList)];
const STMT_ASSIGN: Production = &[NT(N::Assign)];
const STMT_FOR: Production = &[NT(N::ForLoop)];
const ASSIGN: Production = &[T(K::Ident), T(K::Assign), NT(N::Expr)];
#[rustfmt::skip]
const FOR_LOOP: Production = &[
    T(K::For), T(K::Ident),
    T(K::From), NT(N::Expr),
    T(K::To), NT(N::Expr),
    NT(N::StmtList),
    T(K::End),
];
const EXPR: Production = &[NT(N::Term), NT(N::ExprTail)];
const EXPR_PLUS: Production = &[T(K::Plus), NT(N::Expr)];
const EXPR_MINUS: Production = &[T(K::Minus), NT(N::Expr)];
const TERM: Production = &[NT(N::Factor), NT(N::TermTail)];
const TERM_STAR: Production = &[T(K::Star), NT(N::Term)];
const TERM_SLASH: Production = &[T(K::Slash), NT(N::Term)];
const FACTOR_IDENT: Production = &[T(K::Ident)];
const FACTOR_NUMBER: Production = &[T(K::Number)];
const FACTOR_PLUS: Production = &[T(K::Plus), NT(N::Factor)];
const FACTOR_MINUS: Production = &[T(K::Minus), NT(N::Factor)];
const FACTOR_PAREN: Production = &[T(K::LeftParen), NT(N::Expr), T(K::RightParen)];

// ----------------------------------------------------------------------------
// Table

use Cell::{Accept as A, Error as X, Produce as P};

#[rustfmt::skip]
static TABLE: [[Cell; COLUMNS]; ROWS] = [
    //                 IDN                 BROJ                OP_PRIDRUZI  OP_PLUS            OP_MINUS            OP_PUTA        OP_DIJELI       L_ZAGRADA           D_ZAGRADA   KR_ZA               KR_OD  KR_DO       KR_AZ       end
    /* <program>  */ [ P(PROGRAM),         X,                  X,           X,                 X,                  X,             X,              X,                  X,          P(PROGRAM),         X,     X,          X,          P(PROGRAM) ],
    /* <lista>    */ [ P(STMT_LIST),       X,                  X,           X,                 X,                  X,             X,              X,                  X,          P(STMT_LIST),       X,     X,          P(EPSILON), P(EPSILON) ],
    /* <naredba>  */ [ P(STMT_ASSIGN),     X,                  X,           X,                 X,                  X,             X,              X,                  X,          P(STMT_FOR),        X,     X,          X,          X          ],
    /* <pridruz.> */ [ P(ASSIGN),          X,                  X,           X,                 X,                  X,             X,              X,                  X,          X,                  X,     X,          X,          X          ],
    /* <za>       */ [ X,                  X,                  X,           X,                 X,                  X,             X,              X,                  X,          P(FOR_LOOP),        X,     X,          X,          X          ],
    /* <E>        */ [ P(EXPR),            P(EXPR),            X,           P(EXPR),           P(EXPR),            X,             X,              P(EXPR),            X,          X,                  X,     X,          X,          X          ],
    /* <E_lista>  */ [ P(EPSILON),         X,                  X,           P(EXPR_PLUS),      P(EXPR_MINUS),      X,             X,              X,                  P(EPSILON), P(EPSILON),         X,     P(EPSILON), P(EPSILON), P(EPSILON) ],
    /* <T>        */ [ P(TERM),            P(TERM),            X,           P(TERM),           P(TERM),            X,             X,              P(TERM),            X,          X,                  X,     X,          X,          X          ],
    /* <T_lista>  */ [ P(EPSILON),         X,                  X,           P(EPSILON),        P(EPSILON),         P(TERM_STAR),  P(TERM_SLASH),  X,                  P(EPSILON), P(EPSILON),         X,     P(EPSILON), P(EPSILON), P(EPSILON) ],
    /* <P>        */ [ P(FACTOR_IDENT),    P(FACTOR_NUMBER),   X,           P(FACTOR_PLUS),    P(FACTOR_MINUS),    X,             X,              P(FACTOR_PAREN),    X,          X,                  X,     X,          X,          X          ],
    /* bottom     */ [ X,                  X,                  X,           X,                 X,                  X,             X,              X,                  X,          X,                  X,     X,          X,          A          ],
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bottom_accepts_only_end_of_input() {
        assert_eq!(lookup(Row::Bottom, None), Cell::Accept);
        for kind in TokenKind::ALL {
            assert_eq!(lookup(Row::Bottom, Some(kind)), Cell::Error);
        }
    }

    #[test]
    fn test_accept_only_in_bottom_row() {
        for row in 0..NonTerminal::COUNT {
            for cell in TABLE[row].iter() {
                assert_ne!(*cell, Cell::Accept);
            }
        }
    }

    #[test]
    fn test_statement_list_lookups() {
        assert_eq!(lookup(Row::NonTerm(N::StmtList), Some(K::Ident)), Cell::Produce(STMT_LIST));
        assert_eq!(lookup(Row::NonTerm(N::StmtList), Some(K::End)), Cell::Produce(EPSILON));
        assert_eq!(lookup(Row::NonTerm(N::StmtList), None), Cell::Produce(EPSILON));
        assert_eq!(lookup(Row::NonTerm(N::StmtList), Some(K::Number)), Cell::Error);
    }

    #[test]
    fn test_productions_start_with_lookahead_terminal() {
        // Wherever a production starts with a terminal, it must be the
        // terminal of the column it was placed in.
        for (r, row) in TABLE.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Cell::Produce([Symbol::Term(first), ..]) = cell {
                    assert_eq!(first.index(), c, "row {r} column {c}");
                }
            }
        }
    }
}
