//! Syntax analysis.
mod grammar;
mod parser;
mod table;
mod tree;

pub use grammar::{NonTerminal, Production, Symbol, END_OF_INPUT, EPSILON};
pub use parser::{parse, SyntaxError};
pub use table::{lookup, Cell, Row};
pub use tree::{DecodeError, DerivationTree, NodeKind, TreeNode};
