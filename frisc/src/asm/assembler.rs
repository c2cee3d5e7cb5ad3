//! Assembler
use super::{
    lexer::{Lexer, LexerIter},
    tokens::{Keyword, Span, Token, TokenKind},
};
use crate::{
    constants::{Address, DEFAULT_RADIX, WORD_SIZE},
    error::{AsmError, FriscError, FriscResult},
    instr::{Addr, Instr, Operand},
    program::{Cell, Program},
};
use std::{collections::HashMap, iter::Peekable};

/// Line oriented assembler.
///
/// Every instruction and every `DW` value occupies one word. Label
/// references are recorded while parsing and patched once all labels
/// are known, so labels can be used before they are defined.
pub struct Assembler<'a> {
    tokens: Peekable<LexerIter<'a>>,
    /// Keep reference to the source so errors can
    /// show the offending line.
    source: &'a str,
    cells: Vec<Cell>,
    labels: HashMap<String, Address>,
    /// Cell index and label token of every label operand.
    fixups: Vec<(usize, Token)>,
}

impl<'a> Assembler<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            source: lexer.source_code(),
            tokens: lexer.into_iter().peekable(),
            cells: vec![],
            labels: HashMap::new(),
            fixups: vec![],
        }
    }

    pub fn parse(mut self) -> FriscResult<Program> {
        loop {
            let token = self.next_token();

            match token.kind {
                TokenKind::Newline => {
                    /* Empty line */
                    continue;
                }
                // Instruction, if any, follows on the same line.
                TokenKind::Label => self.define_label(&token)?,
                TokenKind::Keyword(keyword) => {
                    self.parse_statement(keyword, &token)?;
                    self.expect_line_end()?;
                }
                TokenKind::EOF => break,
                TokenKind::Unknown => return Err(self.error(token.span, "unknown token")),
                _ => {
                    let fragment = token.span.fragment(self.source);
                    return Err(self.error(token.span, format!("expected instruction, found '{fragment}'")));
                }
            }
        }

        self.resolve_labels()?;

        log::debug!("assembled {} words, {} labels", self.cells.len(), self.labels.len());

        Ok(Program {
            cells: self.cells,
            labels: self.labels,
        })
    }

    #[inline(never)]
    #[cold]
    fn error(&self, span: Span, message: impl ToString) -> FriscError {
        AsmError::new(self.source, span, message).into()
    }

    fn next_offset(&self) -> Address {
        self.cells.len() as Address * WORD_SIZE
    }

    fn next_token(&mut self) -> Token {
        match self.tokens.next() {
            Some(token) => token,
            None => Token {
                span: Span::new(self.source.len() as u32, 0),
                kind: TokenKind::EOF,
            },
        }
    }

    fn peek_kind(&mut self) -> TokenKind {
        self.tokens.peek().map(|t| t.kind).unwrap_or(TokenKind::EOF)
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> FriscResult<Token> {
        let token = self.next_token();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.unexpected(token, expected))
        }
    }

    #[cold]
    fn unexpected(&self, token: Token, expected: &str) -> FriscError {
        let message = match token.kind {
            TokenKind::Newline | TokenKind::EOF => format!("expected {expected}, found end of line"),
            _ => format!("expected {expected}, found '{}'", token.span.fragment(self.source)),
        };
        self.error(token.span, message)
    }

    fn expect_line_end(&mut self) -> FriscResult<()> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.next_token();
                Ok(())
            }
            TokenKind::EOF => Ok(()),
            _ => {
                let token = self.next_token();
                Err(self.unexpected(token, "end of line"))
            }
        }
    }

    fn define_label(&mut self, name: &Token) -> FriscResult<()> {
        let fragment = name.span.fragment(self.source);
        if self.labels.contains_key(fragment) {
            return Err(self.error(name.span, format!("label '{fragment}' is already defined")));
        }

        let offset = self.next_offset();
        self.labels.insert(fragment.to_owned(), offset);
        Ok(())
    }

    fn resolve_labels(&mut self) -> FriscResult<()> {
        for (index, token) in std::mem::take(&mut self.fixups) {
            let fragment = token.span.fragment(self.source);
            let address = match self.labels.get(fragment) {
                Some(address) => *address,
                None => return Err(self.error(token.span, format!("undefined label '{fragment}'"))),
            };

            if let Some(Cell::Instr(instr)) = self.cells.get_mut(index) {
                instr.set_address(address);
            }
        }
        Ok(())
    }
}

/// Statements
impl<'a> Assembler<'a> {
    fn parse_statement(&mut self, keyword: Keyword, name: &Token) -> FriscResult<()> {
        log::trace!("{keyword} at {:#X}", self.next_offset());

        let instr = match keyword {
            Keyword::Move => {
                let src = self.parse_operand()?;
                self.consume(TokenKind::Comma, "','")?;
                let dst = self.parse_register()?;
                Instr::Move { src, dst }
            }
            Keyword::Alu(op) => {
                let lhs = self.parse_register()?;
                self.consume(TokenKind::Comma, "','")?;
                let rhs = self.parse_operand()?;
                self.consume(TokenKind::Comma, "','")?;
                let dst = self.parse_register()?;
                Instr::Alu { op, lhs, rhs, dst }
            }
            Keyword::Load => {
                let dst = self.parse_register()?;
                self.consume(TokenKind::Comma, "','")?;
                let addr = self.parse_memory()?;
                Instr::Load { dst, addr }
            }
            Keyword::Store => {
                let src = self.parse_register()?;
                self.consume(TokenKind::Comma, "','")?;
                let addr = self.parse_memory()?;
                Instr::Store { src, addr }
            }
            Keyword::Push => Instr::Push(self.parse_register()?),
            Keyword::Pop => Instr::Pop(self.parse_register()?),
            Keyword::Jump(cond) => Instr::Jump {
                cond,
                target: self.parse_target()?,
            },
            Keyword::Call(cond) => Instr::Call {
                cond,
                target: self.parse_target()?,
            },
            Keyword::Return(cond) => Instr::Return(cond),
            Keyword::Halt(cond) => Instr::Halt(cond),
            Keyword::DefineWord => return self.parse_dw(name),
        };

        self.cells.push(Cell::Instr(instr));
        Ok(())
    }

    /// `DW value (, value)*`
    fn parse_dw(&mut self, name: &Token) -> FriscResult<()> {
        if matches!(self.peek_kind(), TokenKind::Newline | TokenKind::EOF) {
            return Err(self.error(name.span, "DW requires at least one value"));
        }

        loop {
            let value = self.parse_number()?;
            self.cells.push(Cell::Data(value));

            if self.peek_kind() != TokenKind::Comma {
                return Ok(());
            }
            self.next_token();
        }
    }
}

/// Operands
impl<'a> Assembler<'a> {
    fn parse_register(&mut self) -> FriscResult<u8> {
        let token = self.next_token();
        match token.kind {
            TokenKind::Register(index) => Ok(index),
            _ => Err(self.unexpected(token, "register")),
        }
    }

    /// Register or immediate number.
    fn parse_operand(&mut self) -> FriscResult<Operand> {
        if let TokenKind::Register(index) = self.peek_kind() {
            self.next_token();
            Ok(Operand::Reg(index))
        } else {
            self.parse_number().map(Operand::Imm)
        }
    }

    /// `(label)`, `(number)`, `(Rx)` or `(Rx +/- number)`
    fn parse_memory(&mut self) -> FriscResult<Addr> {
        self.consume(TokenKind::LeftParen, "'('")?;

        let addr = match self.peek_kind() {
            TokenKind::Ident => {
                let token = self.next_token();
                self.fixups.push((self.cells.len(), token));
                Addr::Abs(0)
            }
            TokenKind::Register(index) => {
                self.next_token();
                let offset = match self.peek_kind() {
                    TokenKind::Plus | TokenKind::Minus => self.parse_number()?,
                    _ => 0,
                };
                Addr::Reg(index, offset)
            }
            _ => Addr::Abs(self.parse_number()? as Address),
        };

        self.consume(TokenKind::RightParen, "')'")?;
        Ok(addr)
    }

    /// `label`, `number` or `(Rx)`
    fn parse_target(&mut self) -> FriscResult<Addr> {
        match self.peek_kind() {
            TokenKind::Ident => {
                let token = self.next_token();
                self.fixups.push((self.cells.len(), token));
                Ok(Addr::Abs(0))
            }
            TokenKind::LeftParen => {
                self.next_token();
                let index = self.parse_register()?;
                self.consume(TokenKind::RightParen, "')'")?;
                Ok(Addr::Reg(index, 0))
            }
            _ => Ok(Addr::Abs(self.parse_number()? as Address)),
        }
    }

    /// Number literal with optional base marker and sign.
    ///
    /// Values are 32 bits, so hex literals up to `FFFFFFFF`
    /// wrap to negative numbers.
    fn parse_number(&mut self) -> FriscResult<i32> {
        let radix = match self.peek_kind() {
            TokenKind::Base(radix) => {
                self.next_token();
                radix
            }
            _ => DEFAULT_RADIX,
        };

        let negative = match self.peek_kind() {
            TokenKind::Minus => {
                self.next_token();
                true
            }
            TokenKind::Plus => {
                self.next_token();
                false
            }
            _ => false,
        };

        let token = self.consume(TokenKind::Number, "number")?;
        let fragment = token.span.fragment(self.source);

        let magnitude = match i64::from_str_radix(fragment, radix) {
            Ok(value) if value <= u32::MAX as i64 => value,
            _ => return Err(self.error(token.span, format!("invalid base {radix} number '{fragment}'"))),
        };

        let value = if negative { -magnitude } else { magnitude };
        if value < i32::MIN as i64 {
            return Err(self.error(token.span, format!("number '-{fragment}' is out of range")));
        }

        Ok(value as u32 as i32)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::instr::{AluOp, Cond};

    fn assemble(source: &str) -> FriscResult<Program> {
        Assembler::new(Lexer::new(source)).parse()
    }

    #[test]
    fn test_instructions() {
        let program = assemble(
            "    MOVE 40000, R7\n  MOVE %D -12, R0\n  ADD R0, R1, R2\n  XOR R0, -1, R0\n  STORE R0, (R7)\n",
        )
        .unwrap();

        assert_eq!(
            program.cells(),
            &[
                Cell::Instr(Instr::Move {
                    src: Operand::Imm(0x40000),
                    dst: 7
                }),
                Cell::Instr(Instr::Move {
                    src: Operand::Imm(-12),
                    dst: 0
                }),
                Cell::Instr(Instr::Alu {
                    op: AluOp::Add,
                    lhs: 0,
                    rhs: Operand::Reg(1),
                    dst: 2
                }),
                Cell::Instr(Instr::Alu {
                    op: AluOp::Xor,
                    lhs: 0,
                    rhs: Operand::Imm(-1),
                    dst: 0
                }),
                Cell::Instr(Instr::Store {
                    src: 0,
                    addr: Addr::Reg(7, 0)
                }),
            ]
        );
    }

    #[test]
    fn test_forward_labels() {
        let source = "  JP_Z END
  LOAD R0, (V0)
END
  HALT
V0  DW 0   ; var=x, scope=0
";
        let program = assemble(source).unwrap();

        assert_eq!(program.label("END"), Some(8));
        assert_eq!(program.label("V0"), Some(12));
        assert_eq!(
            program.cells()[0],
            Cell::Instr(Instr::Jump {
                cond: Cond::Z,
                target: Addr::Abs(8)
            })
        );
        assert_eq!(program.cells()[1], Cell::Instr(Instr::Load { dst: 0, addr: Addr::Abs(12) }));
        assert_eq!(program.cells()[3], Cell::Data(0));
    }

    #[test]
    fn test_number_bases() {
        let program = assemble("  DW 10, %D 10, %B 101, %H -1, 0FFFFFFFF\n").unwrap();
        let values = program
            .cells()
            .iter()
            .map(|cell| match cell {
                Cell::Data(value) => *value,
                _ => panic!("expected data"),
            })
            .collect::<Vec<_>>();
        assert_eq!(values, vec![16, 10, 5, -1, -1]);
    }

    #[test]
    fn test_register_offset() {
        let program = assemble("  LOAD R1, (R7+8)\n  STORE R1, (R7 - 4)\n  JP (R3)\n").unwrap();
        assert_eq!(program.cells()[0], Cell::Instr(Instr::Load { dst: 1, addr: Addr::Reg(7, 8) }));
        assert_eq!(program.cells()[1], Cell::Instr(Instr::Store { src: 1, addr: Addr::Reg(7, -4) }));
        assert_eq!(
            program.cells()[2],
            Cell::Instr(Instr::Jump {
                cond: Cond::Always,
                target: Addr::Reg(3, 0)
            })
        );
    }

    #[test]
    fn test_errors() {
        let err = assemble("  JP NOWHERE\n").unwrap_err();
        assert!(err.to_string().contains("undefined label 'NOWHERE'"));

        match assemble("  HALT\n  MOVE R1\n").unwrap_err() {
            FriscError::Asm(err) => {
                assert_eq!(err.line_no, 2);
                assert_eq!(err.line, "  MOVE R1");
            }
            err => panic!("unexpected error {err}"),
        }

        assert!(assemble("X  HALT\nX  HALT\n").is_err());
        assert!(assemble("  DW %D 1A\n").is_err());
        assert!(assemble("  HALT R0\n").is_err());
    }
}
