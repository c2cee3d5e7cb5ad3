//! Multiply and divide subroutines.
//!
//! FRISC has no multiply or divide instructions. Both operations strip the
//! operand signs, work on magnitudes by repeated addition or subtraction,
//! and reapply the combined sign to the result.
//!
//! Calling convention: the caller pushes the left operand, then the right
//! operand, then calls `MUL` or `DIV`. On return both operands have been
//! replaced by the result on the stack. R0 to R4 and R6 are clobbered.

/// Emitted once at the end of every program.
pub const RUNTIME: &str = "\
;----------------------------------
;  MUL subroutine
;----------------------------------
MUL     CALL MD_INIT
        XOR R1, 0, R1
        JP_Z MUL_RET
        SUB R1, 1, R1
MUL_1   ADD R2, R0, R2
        SUB R1, 1, R1
        JP_NN MUL_1
MUL_RET CALL MD_RET
        RET

;----------------------------------
;  DIV subroutine
;----------------------------------
DIV     CALL MD_INIT
        XOR R1, 0, R1
        JP_Z DIV_RET
DIV_1   ADD R2, 1, R2
        SUB R0, R1, R0
        JP_NN DIV_1
        SUB R2, 1, R2
DIV_RET CALL MD_RET
        RET

;----------------------------------
;  MUL/DIV helpers
;----------------------------------
MD_SGN  MOVE 0, R6
        XOR R0, 0, R0
        JP_P MD_TST1
        XOR R0, -1, R0
        ADD R0, 1, R0
        MOVE 1, R6
MD_TST1 XOR R1, 0, R1
        JP_P MD_SGNR
        XOR R1, -1, R1
        ADD R1, 1, R1
        XOR R6, 1, R6
MD_SGNR RET

MD_INIT POP R4
        POP R3
        POP R1
        POP R0
        CALL MD_SGN
        MOVE 0, R2
        PUSH R4
        RET

MD_RET  XOR R6, 0, R6
        JP_Z MD_RET1
        XOR R2, -1, R2
        ADD R2, 1, R2
MD_RET1 POP R4
        PUSH R2
        PUSH R3
        PUSH R4
        RET
";

/// Entry point of the multiply subroutine.
pub const MUL: &str = "MUL";
/// Entry point of the divide subroutine.
pub const DIV: &str = "DIV";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_entry_points_defined() {
        let labels = RUNTIME
            .lines()
            .filter(|line| !line.starts_with(';') && !line.starts_with(' '))
            .filter_map(|line| line.split_whitespace().next())
            .collect::<Vec<_>>();

        assert!(labels.contains(&MUL));
        assert!(labels.contains(&DIV));
        assert_eq!(labels.len(), 12);
    }
}
