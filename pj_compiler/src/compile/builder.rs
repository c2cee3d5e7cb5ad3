use super::{
    ast::{Assign, BinOp, Expr, ForLoop, Program, Reference, Stmt, UnaryOp, VarRef},
    storage::SlotKey,
    CompileResult, CompilerContext,
};
use crate::{
    parsing::DerivationTree,
    tokens::{Token, TokenKind},
};
use smol_str::SmolStr;
use std::{error, fmt};

/// Builds the syntax tree from the matched tokens of a derivation tree,
/// declaring identifiers in the scope table as it goes.
///
/// The derivation tree's nonterminal structure is only used to recover
/// the token sequence. Statements and expressions are rebuilt from the
/// flat token list, so binary operators come out left associative even
/// though the grammar's tails are right recursive.
pub struct AstBuilder<'a> {
    ctx: &'a mut CompilerContext,
    tokens: Vec<Token>,
    references: Vec<Reference>,
    /// Slot of the loop counter whose range expressions are being built.
    header: Option<SlotKey>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(ctx: &'a mut CompilerContext, tokens: Vec<Token>) -> Self {
        Self {
            ctx,
            tokens,
            references: vec![],
            header: None,
        }
    }

    pub fn from_tree(ctx: &'a mut CompilerContext, tree: &DerivationTree) -> Self {
        Self::new(ctx, tree.leaves().cloned().collect())
    }

    /// Build the whole program.
    pub fn build(mut self) -> CompileResult<Program> {
        let (stmts, next) = self.build_block(0, 0)?;

        // Only a loop terminator stops the outermost block early.
        if let Some(token) = self.tokens.get(next) {
            return Err(StructuralError::Unmatched(token.clone()).into());
        }

        log::debug!(
            "built {} top level statements, {} references",
            stmts.len(),
            self.references.len()
        );

        Ok(Program {
            stmts,
            references: self.references,
        })
    }

    /// Build statements starting at token `start`, until the tokens run out
    /// or a loop terminator is reached.
    ///
    /// Returns the statements and the index of the first unconsumed token.
    /// The terminator is left for the caller.
    pub fn build_block(&mut self, start: usize, depth: u32) -> CompileResult<(Vec<Stmt>, usize)> {
        use TokenKind as T;

        let mut stmts = vec![];
        let mut index = start;

        while let Some(token) = self.tokens.get(index) {
            match token.kind {
                T::End => break,
                T::For => {
                    let (stmt, next) = self.build_for(index, depth)?;
                    stmts.push(Stmt::For(stmt));
                    index = next;
                }
                T::Ident if self.kind_at(index + 1) == Some(T::Assign) => {
                    let (stmt, next) = self.build_assign(index, depth)?;
                    stmts.push(Stmt::Assign(stmt));
                    index = next;
                }
                _ => {
                    log::warn!("skipping stray token {token}");
                    index += 1;
                }
            }
        }

        Ok((stmts, index))
    }

    fn build_assign(&mut self, index: usize, depth: u32) -> CompileResult<(Assign, usize)> {
        let target = self.tokens[index].clone();

        // Writes go to the storage of the visible declaration,
        // so loop bodies can update variables of enclosing scopes.
        let slot = match self.ctx.scopes.resolve(&target.lexeme) {
            Some(entry) => entry.slot.clone(),
            None => SlotKey::new(target.lexeme.clone(), depth),
        };
        // The target is not visible to its own right-hand side.
        let (rhs, next) = self.parse_expr(index + 2)?;
        self.ctx
            .scopes
            .declare(&target.lexeme, depth, target.line, slot.clone());

        let assign = Assign {
            name: target.lexeme,
            line: target.line,
            slot,
            rhs,
        };
        Ok((assign, next))
    }

    fn build_for(&mut self, index: usize, depth: u32) -> CompileResult<(ForLoop, usize)> {
        let keyword_line = self.tokens[index].line;
        let inner = depth + 1;

        let counter = match self.tokens.get(index + 1) {
            Some(token) if token.kind == TokenKind::Ident => token.clone(),
            _ => return Err(StructuralError::MissingCounter { line: keyword_line }.into()),
        };

        // Every loop gets fresh storage for its counter, so a nested
        // loop reusing the name doesn't clobber the outer one.
        let slot = SlotKey::new(counter.lexeme.clone(), inner);
        self.ctx
            .scopes
            .declare(&counter.lexeme, inner, counter.line, slot.clone());

        self.header = Some(slot.clone());
        self.expect(index + 2, TokenKind::From)?;
        let (from, next) = self.parse_expr(index + 3)?;
        self.expect(next, TokenKind::To)?;
        let (to, next) = self.parse_expr(next + 1)?;
        self.header = None;

        let (body, next) = self.build_block(next, inner)?;
        self.expect(next, TokenKind::End)?;
        self.ctx.scopes.close_scope(inner);

        log::trace!("built loop over '{}' with {} statements", counter.lexeme, body.len());

        let for_loop = ForLoop {
            counter: counter.lexeme,
            line: counter.line,
            slot,
            from,
            to,
            body,
        };
        Ok((for_loop, next + 1))
    }
}

/// Expressions
impl<'a> AstBuilder<'a> {
    /// `expression := term (("+" | "-") term)*`
    fn parse_expr(&mut self, index: usize) -> CompileResult<(Expr, usize)> {
        let (mut lhs, mut index) = self.parse_term(index)?;

        while let Some(operator) = self.kind_at(index).and_then(BinOp::from_token) {
            if !matches!(operator, BinOp::Add | BinOp::Sub) {
                break;
            }
            let (rhs, next) = self.parse_term(index + 1)?;
            lhs = Expr::binary(lhs, operator, rhs);
            index = next;
        }

        Ok((lhs, index))
    }

    /// `term := factor (("*" | "/") factor)*`
    fn parse_term(&mut self, index: usize) -> CompileResult<(Expr, usize)> {
        let (mut lhs, mut index) = self.parse_factor(index)?;

        while let Some(operator) = self.kind_at(index).and_then(BinOp::from_token) {
            if !matches!(operator, BinOp::Mul | BinOp::Div) {
                break;
            }
            let (rhs, next) = self.parse_factor(index + 1)?;
            lhs = Expr::binary(lhs, operator, rhs);
            index = next;
        }

        Ok((lhs, index))
    }

    /// `factor := number | identifier | ("+" | "-") factor | "(" expression ")"`
    fn parse_factor(&mut self, index: usize) -> CompileResult<(Expr, usize)> {
        use TokenKind as T;

        let token = match self.tokens.get(index) {
            Some(token) => token.clone(),
            None => return Err(StructuralError::MissingOperand(None).into()),
        };

        match token.kind {
            T::Number => {
                let value = token
                    .lexeme
                    .parse::<i32>()
                    .map_err(|_| StructuralError::InvalidNumber(token.clone()))?;
                Ok((Expr::Number(value), index + 1))
            }
            T::Ident => {
                let var = self.var_ref(&token)?;
                Ok((Expr::Var(var), index + 1))
            }
            T::LeftParen => {
                let (inner, next) = self.parse_expr(index + 1)?;
                self.expect(next, T::RightParen)?;
                Ok((inner, next + 1))
            }
            kind => match UnaryOp::from_token(kind) {
                Some(operator) => {
                    let (operand, next) = self.parse_factor(index + 1)?;
                    Ok((Expr::unary(operator, operand), next))
                }
                None => Err(StructuralError::MissingOperand(Some(token)).into()),
            },
        }
    }

    /// Resolve an identifier use against the visible declarations.
    fn var_ref(&mut self, token: &Token) -> CompileResult<VarRef> {
        let check = self.ctx.conf.check_undefined;

        match self.ctx.scopes.resolve(&token.lexeme).cloned() {
            Some(entry) => {
                if check && self.header.as_ref() == Some(&entry.slot) {
                    return Err(SemanticError {
                        name: token.lexeme.clone(),
                        line: token.line,
                        declared: Some(entry.line),
                    }
                    .into());
                }

                self.references.push(Reference {
                    line: token.line,
                    declared: entry.line,
                    name: token.lexeme.clone(),
                });

                Ok(VarRef {
                    name: token.lexeme.clone(),
                    line: token.line,
                    slot: Some(entry.slot),
                })
            }
            None if check => Err(SemanticError {
                name: token.lexeme.clone(),
                line: token.line,
                declared: None,
            }
            .into()),
            None => {
                log::warn!("line {}: '{}' is not declared", token.line, token.lexeme);
                Ok(VarRef {
                    name: token.lexeme.clone(),
                    line: token.line,
                    slot: None,
                })
            }
        }
    }
}

/// Token cursor helpers
impl<'a> AstBuilder<'a> {
    #[inline]
    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|token| token.kind)
    }

    fn expect(&self, index: usize, expected: TokenKind) -> CompileResult<()> {
        match self.tokens.get(index) {
            Some(token) if token.kind == expected => Ok(()),
            found => Err(StructuralError::Expected {
                expected,
                found: found.cloned(),
            }
            .into()),
        }
    }
}

/// Identifier use that doesn't resolve to a usable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub name: SmolStr,
    /// Line of the offending use.
    pub line: u32,
    /// Line of the declaration the use resolved to, when it
    /// resolved to the loop counter of its own header.
    pub declared: Option<u32>,
}

impl SemanticError {
    /// Single line diagnostic, `err <line> <name>`.
    pub fn diagnostic(&self) -> String {
        format!("err {} {}", self.line, self.name)
    }
}

impl error::Error for SemanticError {}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.declared {
            Some(declared) => write!(
                f,
                "line {}: loop counter '{}' declared on line {} is used in its own range",
                self.line, self.name, declared
            ),
            None => write!(f, "line {}: '{}' is undefined", self.line, self.name),
        }
    }
}

/// Malformed statement found while building the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// Loop keyword not followed by an identifier.
    MissingCounter { line: u32 },
    /// A required keyword or delimiter is absent.
    Expected { expected: TokenKind, found: Option<Token> },
    /// Expression ended where an operand was required.
    MissingOperand(Option<Token>),
    /// Number literal that doesn't fit a machine word.
    InvalidNumber(Token),
    /// Loop terminator with no open loop.
    Unmatched(Token),
}

impl error::Error for StructuralError {}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use StructuralError as E;

        match self {
            E::MissingCounter { line } => write!(f, "line {line}: loop has no counter variable"),
            E::Expected { expected, found: Some(token) } => {
                write!(f, "line {}: expected {expected}, found {}", token.line, token.kind)
            }
            E::Expected { expected, found: None } => write!(f, "expected {expected}, found end of input"),
            E::MissingOperand(Some(token)) => {
                write!(f, "line {}: expected operand, found {}", token.line, token.kind)
            }
            E::MissingOperand(None) => write!(f, "expected operand, found end of input"),
            E::InvalidNumber(token) => write!(f, "line {}: number {} is out of range", token.line, token.lexeme),
            E::Unmatched(token) => write!(f, "line {}: {} without an open loop", token.line, token.kind),
        }
    }
}
