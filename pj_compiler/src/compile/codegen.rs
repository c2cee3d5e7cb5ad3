use super::{
    ast::{Assign, BinOp, Expr, ForLoop, Program, Stmt, UnaryOp, VarRef},
    ir::{Cond, Instr, Reg},
    runtime::{self, RUNTIME},
    storage::SlotKey,
    CompilerContext,
};
use smol_str::SmolStr;

/// FRISC code generator.
///
/// Every expression leaves exactly one value on the runtime stack, and
/// every statement leaves the stack as it found it.
pub struct CodeGen<'a> {
    ctx: &'a mut CompilerContext,
    /// Resulting generated code.
    code: Vec<Instr>,
}

impl<'a> CodeGen<'a> {
    pub fn new(ctx: &'a mut CompilerContext) -> Self {
        Self { ctx, code: vec![] }
    }

    /// Generate the complete listing for the program.
    pub fn compile(mut self, program: &Program) -> String {
        self.emit(Instr::Banner("PROGRAM START"));
        self.emit(Instr::InitStack(self.ctx.conf.stack_top));
        self.emit(Instr::Banner("MAIN"));

        self.emit_block(&program.stmts);
        self.emit_epilogue();

        self.emit(Instr::Banner("VARIABLES"));
        let data = self
            .ctx
            .storage
            .iter()
            .map(|slot| Instr::Data(slot.label.clone(), slot.key.clone()))
            .collect::<Vec<_>>();
        self.code.extend(data);

        self.emit(Instr::Banner("MUL, DIV SUBROUTINES"));

        log::debug!(
            "generated {} lines, {} storage slots",
            self.code.len(),
            self.ctx.storage.len()
        );

        let mut listing = String::new();
        for instr in &self.code {
            listing.push_str(&instr.to_string());
            listing.push('\n');
        }
        listing.push_str(RUNTIME);
        listing
    }

    #[inline]
    fn emit(&mut self, instr: Instr) {
        self.code.push(instr)
    }

    fn slot_label(&mut self, key: &SlotKey) -> SmolStr {
        self.ctx.storage.alloc(key)
    }
}

/// Recursive visitor
impl<'a> CodeGen<'a> {
    fn emit_block(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.emit_stmt(stmt);
        }
    }

    #[inline]
    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => self.emit_assign(assign),
            Stmt::For(for_loop) => self.emit_for(for_loop),
        }
    }

    fn emit_assign(&mut self, assign: &Assign) {
        self.emit_expr(&assign.rhs);
        self.emit_pop(Reg::R0);
        let label = self.slot_label(&assign.slot);
        self.emit(Instr::Store(Reg::R0, label));
    }

    /// Counting loop with an inclusive bound.
    ///
    /// The bound is tested after the body, so the body always
    /// runs at least once. The bound expression is evaluated
    /// again on every iteration.
    fn emit_for(&mut self, for_loop: &ForLoop) {
        self.emit_expr(&for_loop.from);
        self.emit_pop(Reg::R0);
        let counter = self.slot_label(&for_loop.slot);
        self.emit(Instr::Store(Reg::R0, counter.clone()));

        let number = self.ctx.next_label();
        let start = SmolStr::from(format!("LOOP_{number}"));
        let end = SmolStr::from(format!("END_{number}"));

        self.emit(Instr::Label(start.clone()));
        self.emit_block(&for_loop.body);

        // counter += 1
        self.emit(Instr::Load(Reg::R0, counter.clone()));
        self.emit(Instr::AddImm(Reg::R0, 1, Reg::R0));
        self.emit(Instr::Store(Reg::R0, counter.clone()));

        // exit when bound - counter < 0
        self.emit_expr(&for_loop.to);
        self.emit_pop(Reg::R1);
        self.emit(Instr::Load(Reg::R0, counter));
        self.emit(Instr::Sub(Reg::R1, Reg::R0, Reg::R2));
        self.emit(Instr::Jump(Some(Cond::N), end.clone()));
        self.emit(Instr::Jump(None, start));
        self.emit(Instr::Label(end));
    }

    fn emit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(value) => {
                self.emit(Instr::MoveDec(*value, Reg::R0));
                self.emit_push(Reg::R0);
            }
            Expr::Var(var) => self.emit_var(var),
            Expr::Unary(operator, operand) => {
                self.emit_expr(operand);
                self.emit_pop(Reg::R0);
                if *operator == UnaryOp::Neg {
                    // Two's complement
                    self.emit(Instr::XorImm(Reg::R0, -1, Reg::R0));
                    self.emit(Instr::AddImm(Reg::R0, 1, Reg::R0));
                }
                self.emit_push(Reg::R0);
            }
            Expr::Binary(bin) => {
                self.emit_expr(&bin.lhs);
                self.emit_expr(&bin.rhs);
                self.emit_pop(Reg::R1);
                self.emit_pop(Reg::R0);

                match bin.operator {
                    BinOp::Add => {
                        self.emit(Instr::Add(Reg::R0, Reg::R1, Reg::R2));
                        self.emit_push(Reg::R2);
                    }
                    BinOp::Sub => {
                        self.emit(Instr::Sub(Reg::R0, Reg::R1, Reg::R2));
                        self.emit_push(Reg::R2);
                    }
                    BinOp::Mul => self.emit_call(runtime::MUL),
                    BinOp::Div => self.emit_call(runtime::DIV),
                }
            }
        }
    }

    fn emit_var(&mut self, var: &VarRef) {
        let label = match &var.slot {
            Some(key) => self.slot_label(key),
            None => {
                log::debug!("line {}: '{}' falls back to global storage", var.line, var.name);
                self.slot_label(&SlotKey::global(var.name.clone()))
            }
        };
        self.emit(Instr::Load(Reg::R0, label));
        self.emit_push(Reg::R0);
    }

    /// Operands go back on the stack for the subroutine,
    /// which replaces them with the result.
    fn emit_call(&mut self, subroutine: &'static str) {
        self.emit_push(Reg::R0);
        self.emit_push(Reg::R1);
        self.emit(Instr::Call(subroutine));
    }

    fn emit_push(&mut self, rx: Reg) {
        self.emit(Instr::SubImm(Reg::SP, 4, Reg::SP));
        self.emit(Instr::StoreTop(rx));
    }

    fn emit_pop(&mut self, rx: Reg) {
        self.emit(Instr::LoadTop(rx));
        self.emit(Instr::AddImm(Reg::SP, 4, Reg::SP));
    }

    /// Load the result variable into R6 and halt.
    fn emit_epilogue(&mut self) {
        let key = SlotKey::global(self.ctx.conf.result_var.as_str());
        let label = self.slot_label(&key);
        self.emit(Instr::Load(Reg::RESULT, label));
        self.emit(Instr::Halt);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile::CompilerConf;

    fn number(value: i32) -> Expr {
        Expr::Number(value)
    }

    fn var(name: &str, depth: u32) -> Expr {
        Expr::Var(VarRef {
            name: name.into(),
            line: 1,
            slot: Some(SlotKey::new(name, depth)),
        })
    }

    fn assign(name: &str, depth: u32, rhs: Expr) -> Stmt {
        Stmt::Assign(Assign {
            name: name.into(),
            line: 1,
            slot: SlotKey::new(name, depth),
            rhs,
        })
    }

    fn main_lines(listing: &str) -> Vec<&str> {
        listing
            .lines()
            .skip_while(|line| !line.contains("MAIN"))
            .skip(1)
            .take_while(|line| !line.starts_with(';'))
            .collect()
    }

    #[test]
    fn test_assign_number() {
        let mut ctx = CompilerContext::default();
        let program = Program {
            stmts: vec![assign("rez", 0, number(5))],
            ..Program::default()
        };
        let listing = CodeGen::new(&mut ctx).compile(&program);

        #[rustfmt::skip]
        let expected = vec![
            "  MOVE %D 5, R0",
            "  SUB R7, 4, R7",
            "  STORE R0, (R7)",
            "  LOAD R0, (R7)",
            "  ADD R7, 4, R7",
            "  STORE R0, (V0)",
            "  LOAD R6, (V0)",
            "  HALT",
        ];
        assert_eq!(main_lines(&listing), expected);
        assert!(listing.starts_with("; ========== PROGRAM START ===========\n    MOVE 40000, R7   ; init stack\n"));
        assert!(listing.contains("V0  DW 0   ; var=rez, scope=0\n"));
    }

    #[test]
    fn test_multiply_calls_subroutine() {
        let mut ctx = CompilerContext::default();
        let expr = Expr::binary(number(4), BinOp::Mul, number(2));
        let program = Program {
            stmts: vec![assign("x", 0, expr)],
            ..Program::default()
        };
        let listing = CodeGen::new(&mut ctx).compile(&program);
        let lines = main_lines(&listing);

        #[rustfmt::skip]
        let expected = [
            "  LOAD R1, (R7)",
            "  ADD R7, 4, R7",
            "  LOAD R0, (R7)",
            "  ADD R7, 4, R7",
            "  SUB R7, 4, R7",
            "  STORE R0, (R7)",
            "  SUB R7, 4, R7",
            "  STORE R1, (R7)",
            "  CALL MUL",
        ];
        assert_eq!(&lines[6..15], &expected);
        assert_eq!(listing.matches("\nMUL     CALL MD_INIT").count(), 1);
    }

    #[test]
    fn test_loop_structure() {
        let mut ctx = CompilerContext::default();
        let body = vec![assign("rez", 0, Expr::binary(var("rez", 0), BinOp::Add, var("i", 1)))];
        let program = Program {
            stmts: vec![
                assign("rez", 0, number(0)),
                Stmt::For(ForLoop {
                    counter: "i".into(),
                    line: 2,
                    slot: SlotKey::new("i", 1),
                    from: number(1),
                    to: number(3),
                    body,
                }),
            ],
            ..Program::default()
        };
        let listing = CodeGen::new(&mut ctx).compile(&program);

        assert_eq!(listing.lines().filter(|l| *l == "LOOP_0").count(), 1);
        assert_eq!(listing.lines().filter(|l| *l == "END_0").count(), 1);
        assert!(listing.contains(
            "  LOAD R0, (V1)\n  ADD R0, 1, R0\n  STORE R0, (V1)\n  MOVE %D 3, R0\n"
        ));
        assert!(listing.contains("  LOAD R0, (V1)\n  SUB R1, R0, R2\n  JP_N END_0\n  JP LOOP_0\nEND_0\n"));
        assert!(listing.contains("V1  DW 0   ; var=i, scope=1\n"));
    }

    #[test]
    fn test_unresolved_falls_back_to_global() {
        let mut ctx = CompilerContext::default();
        let rhs = Expr::Var(VarRef {
            name: "y".into(),
            line: 1,
            slot: None,
        });
        let program = Program {
            stmts: vec![assign("x", 0, rhs)],
            ..Program::default()
        };
        let listing = CodeGen::new(&mut ctx).compile(&program);

        assert!(listing.contains("V0  DW 0   ; var=y, scope=0\n"));
        assert!(listing.contains("V1  DW 0   ; var=x, scope=0\n"));
        assert!(listing.contains("V2  DW 0   ; var=rez, scope=0\n"));
    }

    #[test]
    fn test_custom_result_and_stack() {
        let mut ctx = CompilerContext::new(CompilerConf {
            result_var: "out".to_owned(),
            stack_top: 0x1000,
            ..CompilerConf::default()
        });
        let listing = CodeGen::new(&mut ctx).compile(&Program::default());

        assert!(listing.contains("    MOVE 1000, R7   ; init stack\n"));
        assert_eq!(main_lines(&listing), vec!["  LOAD R6, (V0)", "  HALT"]);
        assert!(listing.contains("V0  DW 0   ; var=out, scope=0\n"));
    }

    #[test]
    fn test_negate() {
        let mut ctx = CompilerContext::default();
        let program = Program {
            stmts: vec![assign("x", 0, Expr::unary(UnaryOp::Neg, number(7)))],
            ..Program::default()
        };
        let listing = CodeGen::new(&mut ctx).compile(&program);
        assert!(listing.contains("  ADD R7, 4, R7\n  XOR R0, -1, R0\n  ADD R0, 1, R0\n  SUB R7, 4, R7\n"));
    }
}
