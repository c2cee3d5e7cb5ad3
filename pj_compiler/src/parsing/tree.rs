//! Derivation tree and its text codec.
//!
//! The tree is stored flattened in pre-order. Each node carries its depth,
//! and a node's subtree is the run of immediately following nodes with a
//! strictly greater depth.
//!
//! ```text
//! <program>
//!  <lista_naredbi>
//!   <naredba>
//!    <naredba_pridruzivanja>
//!     IDN 1 x
//!     OP_PRIDRUZI 1 =
//!     <E>
//!      ...
//! ```
use super::grammar::{NonTerminal, EPSILON};
use crate::tokens::{Token, TokenError};
use std::{error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub depth: usize,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Internal node labelled with a nonterminal.
    Branch(NonTerminal),
    /// Matched token.
    Leaf(Token),
    /// Empty production.
    Epsilon,
}

impl TreeNode {
    #[inline]
    pub fn branch(depth: usize, nonterm: NonTerminal) -> Self {
        Self {
            depth,
            kind: NodeKind::Branch(nonterm),
        }
    }

    #[inline]
    pub fn leaf(depth: usize, token: Token) -> Self {
        Self {
            depth,
            kind: NodeKind::Leaf(token),
        }
    }

    #[inline]
    pub fn epsilon(depth: usize) -> Self {
        Self {
            depth,
            kind: NodeKind::Epsilon,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match &self.kind {
            NodeKind::Leaf(token) => Some(token),
            _ => None,
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:width$}", "", width = self.depth)?;
        match &self.kind {
            NodeKind::Branch(nonterm) => write!(f, "{nonterm}"),
            NodeKind::Leaf(token) => write!(f, "{token}"),
            NodeKind::Epsilon => f.write_str(EPSILON),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivationTree {
    nodes: Vec<TreeNode>,
}

impl DerivationTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    #[inline]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Matched tokens in source order, skipping the nonterminal
    /// and ε scaffolding.
    pub fn leaves(&self) -> impl Iterator<Item = &Token> {
        self.nodes.iter().filter_map(TreeNode::token)
    }

    /// Indices of the direct children of the node at `index`.
    pub fn children(&self, index: usize) -> Vec<usize> {
        let depth = match self.nodes.get(index) {
            Some(node) => node.depth,
            None => return vec![],
        };

        self.nodes
            .iter()
            .enumerate()
            .skip(index + 1)
            .take_while(|(_, node)| node.depth > depth)
            .filter(|(_, node)| node.depth == depth + 1)
            .map(|(i, _)| i)
            .collect()
    }

    /// Encode the tree in its indented text format.
    pub fn encode(&self) -> String {
        let mut text = String::new();
        for node in &self.nodes {
            text.push_str(&node.to_string());
            text.push('\n');
        }
        text
    }

    /// Decode the indented text format.
    ///
    /// Blank lines, and lines with fewer than three fields that aren't
    /// a nonterminal or ε marker, are ignored.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let mut nodes = vec![];

        for (index, line) in text.lines().enumerate() {
            let content = line.trim();
            if content.is_empty() {
                continue;
            }

            let depth = line.len() - line.trim_start().len();

            if content.starts_with('<') && content.ends_with('>') {
                match NonTerminal::parse(content) {
                    Some(nonterm) => nodes.push(TreeNode::branch(depth, nonterm)),
                    None => log::warn!("tree line {}: skipping unknown nonterminal {content}", index + 1),
                }
                continue;
            }

            if content == EPSILON {
                nodes.push(TreeNode::epsilon(depth));
                continue;
            }

            if content.split_whitespace().count() < 3 {
                log::trace!("tree line {}: skipping '{content}'", index + 1);
                continue;
            }

            let token = content.parse::<Token>().map_err(|err| DecodeError {
                line: index + 1,
                cause: err,
            })?;
            nodes.push(TreeNode::leaf(depth, token));
        }

        Ok(Self { nodes })
    }
}

impl fmt::Display for DerivationTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for node in &self.nodes {
            writeln!(f, "{node}")?;
        }
        Ok(())
    }
}

/// Error returned when a leaf line of the tree text can't be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// 1-based line in the tree text.
    pub line: usize,
    pub cause: TokenError,
}

impl error::Error for DecodeError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "derivation tree line {}: {}", self.line, self.cause)
    }
}
