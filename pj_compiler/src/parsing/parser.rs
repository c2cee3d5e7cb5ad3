//! Table driven LL(1) syntax analyser.
use super::{
    grammar::{NonTerminal, Symbol, END_OF_INPUT},
    table::{self, Cell, Row},
    tree::{DerivationTree, TreeNode},
};
use crate::{token_stream::TokenStream, tokens::Token};
use std::{error, fmt};

/// Entry on the parse stack.
///
/// The depth travels with the symbol, so the tree node can be
/// recorded at the right indentation when the symbol is popped.
#[derive(Debug, Clone, Copy)]
enum Entry {
    Bottom,
    Symbol(Symbol, usize),
}

/// Parse the token stream into a derivation tree.
///
/// Deterministic and single pass. The first mismatch aborts
/// the parse without producing a partial tree.
pub fn parse(mut input: TokenStream) -> Result<DerivationTree, SyntaxError> {
    let mut stack = vec![Entry::Bottom, Entry::Symbol(Symbol::NonTerm(NonTerminal::Program), 0)];
    let mut nodes = vec![];

    while let Some(entry) = stack.pop() {
        match entry {
            Entry::Bottom => {
                return match table::lookup(Row::Bottom, input.peek_kind()) {
                    Cell::Accept => {
                        log::debug!("accepted derivation tree with {} nodes", nodes.len());
                        Ok(DerivationTree::new(nodes))
                    }
                    _ => Err(unexpected(&mut input)),
                };
            }
            Entry::Symbol(Symbol::Term(kind), depth) => {
                // The table only places terminals in their own column, so a
                // mismatch here is caught by the nonterminal lookups in the
                // common case. Productions with trailing terminals, like the
                // loop keywords, still need this check.
                match input.peek() {
                    Some(token) if token.kind == kind => {
                        log::trace!("match {token}");
                        nodes.push(TreeNode::leaf(depth, token.clone()));
                        input.next_token();
                    }
                    _ => return Err(unexpected(&mut input)),
                }
            }
            Entry::Symbol(Symbol::NonTerm(nonterm), depth) => {
                match table::lookup(Row::NonTerm(nonterm), input.peek_kind()) {
                    Cell::Produce(production) => {
                        nodes.push(TreeNode::branch(depth, nonterm));

                        if production.is_empty() {
                            nodes.push(TreeNode::epsilon(depth + 1));
                        } else {
                            // Leftmost symbol must be popped first.
                            for symbol in production.iter().rev() {
                                stack.push(Entry::Symbol(*symbol, depth + 1));
                            }
                        }
                    }
                    Cell::Accept | Cell::Error => return Err(unexpected(&mut input)),
                }
            }
        }
    }

    unreachable!("bottom of parse stack was popped without terminating")
}

#[cold]
fn unexpected(input: &mut TokenStream) -> SyntaxError {
    match input.peek() {
        Some(token) => SyntaxError::Unexpected(token.clone()),
        None => SyntaxError::EndOfInput,
    }
}

/// Error returned when the input does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// The offending token.
    Unexpected(Token),
    /// The token stream ran out before the program was complete.
    EndOfInput,
}

impl SyntaxError {
    /// Single line diagnostic in the pipeline's output format,
    /// `err <token>` or `err kraj`.
    pub fn diagnostic(&self) -> String {
        match self {
            SyntaxError::Unexpected(token) => format!("err {token}"),
            SyntaxError::EndOfInput => format!("err {END_OF_INPUT}"),
        }
    }
}

impl error::Error for SyntaxError {}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyntaxError::Unexpected(token) => write!(
                f,
                "syntax error on line {}: unexpected {} '{}'",
                token.line, token.kind, token.lexeme
            ),
            SyntaxError::EndOfInput => write!(f, "syntax error: unexpected end of input"),
        }
    }
}
