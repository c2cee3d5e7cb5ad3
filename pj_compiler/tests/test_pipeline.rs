use frisc::prelude::*;
use pj_compiler::{
    compile::{CompileError, CompilerConf, SemanticError},
    compile_str,
};

/// Compile a token stream and execute the listing, returning R6.
fn run(tokens: &str, conf: &CompilerConf) -> i32 {
    let listing = match compile_str(tokens, conf) {
        Ok(listing) => listing,
        Err(err) => panic!("{}", err),
    };
    let program = match frisc::assemble(&listing) {
        Ok(program) => program,
        Err(err) => panic!("{}\n{}", err, listing),
    };

    let mut vm = FriscVm::new(FriscConf::default());
    vm.load_program(&program).unwrap();
    vm.run(1_000_000).unwrap();

    // Every statement leaves the stack as it found it.
    assert_eq!(vm.register(7), conf.stack_top as i32);

    vm.register(6)
}

#[test]
fn test_run_arithmetic() {
    let tokens = include_str!("programs/arithmetic.lex");
    assert_eq!(run(tokens, &CompilerConf::default()), 11);
}

#[test]
fn test_run_loop_sum() {
    let tokens = include_str!("programs/loop_sum.lex");
    assert_eq!(run(tokens, &CompilerConf::default()), 6);
}

#[test]
fn test_run_signed_mul_div() {
    // a = -7 * 3, b = a / 2, rez = b - (10 / -3)
    let tokens = include_str!("programs/signed.lex");
    assert_eq!(run(tokens, &CompilerConf::default()), -7);
}

#[test]
fn test_run_nested_shadowed_counters() {
    let tokens = include_str!("programs/nested.lex");
    assert_eq!(run(tokens, &CompilerConf::default()), (6 + 10) + (6 + 20));
}

#[test]
fn test_run_bound_evaluated_every_iteration() {
    // The body lowers the bound from 3 to 2 on the first pass.
    let tokens = include_str!("programs/bound.lex");
    assert_eq!(run(tokens, &CompilerConf::default()), 2);
}

#[test]
fn test_run_body_executes_once_when_range_empty() {
    let tokens = "\
IDN 1 rez
OP_PRIDRUZI 1 =
BROJ 1 0
KR_ZA 2 za
IDN 2 i
KR_OD 2 od
BROJ 2 5
KR_DO 2 do
BROJ 2 1
IDN 3 rez
OP_PRIDRUZI 3 =
IDN 3 i
KR_AZ 4 az
";
    assert_eq!(run(tokens, &CompilerConf::default()), 5);
}

#[test]
fn test_undefined_reference() {
    let tokens = include_str!("programs/undefined.lex");

    match compile_str(tokens, &CompilerConf::default()) {
        Err(CompileError::Semantic(err)) => {
            assert_eq!(
                err,
                SemanticError {
                    name: "y".into(),
                    line: 1,
                    declared: None
                }
            );
            assert_eq!(err.diagnostic(), "err 1 y");
        }
        other => panic!("unexpected result {other:?}"),
    }

    // Unchecked, the reference reads a zeroed global slot.
    let conf = CompilerConf {
        check_undefined: false,
        ..CompilerConf::default()
    };
    assert_eq!(run(tokens, &conf), 5);
}

#[test]
fn test_missing_result_variable() {
    let tokens = "IDN 1 x\nOP_PRIDRUZI 1 =\nBROJ 1 9\n";
    let listing = compile_str(tokens, &CompilerConf::default()).unwrap();
    assert!(listing.contains("V1  DW 0   ; var=rez, scope=0"));
    assert_eq!(run(tokens, &CompilerConf::default()), 0);
}

#[test]
fn test_custom_result_variable() {
    let conf: CompilerConf = serde_yaml::from_str("result_var: x\nstack_top: 1000\n").unwrap();
    let tokens = include_str!("programs/arithmetic.lex");

    let listing = compile_str(tokens, &conf).unwrap();
    assert!(listing.contains("    MOVE 3E8, R7   ; init stack"));
    assert_eq!(run(tokens, &conf), 11);
}

#[test]
fn test_listing_layout() {
    let listing = compile_str(include_str!("programs/loop_sum.lex"), &CompilerConf::default()).unwrap();
    let lines = listing.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "; ========== PROGRAM START ===========");
    assert_eq!(lines[1], "    MOVE 40000, R7   ; init stack");
    assert_eq!(lines[2], "; ========== MAIN ===========");

    assert_eq!(lines.iter().filter(|l| **l == "LOOP_0").count(), 1);
    assert_eq!(lines.iter().filter(|l| **l == "END_0").count(), 1);
    assert!(lines.contains(&"  JP_N END_0"));
    assert!(lines.contains(&"  JP LOOP_0"));

    let variables = lines
        .iter()
        .position(|l| *l == "; ========== VARIABLES ===========")
        .unwrap();
    assert_eq!(lines[variables - 2], "  LOAD R6, (V0)");
    assert_eq!(lines[variables - 1], "  HALT");
    assert_eq!(lines[variables + 1], "V0  DW 0   ; var=rez, scope=0");
    assert_eq!(lines[variables + 2], "V1  DW 0   ; var=i, scope=1");
    assert_eq!(lines[variables + 3], "; ========== MUL, DIV SUBROUTINES ===========");

    // Runtime block is emitted even without multiplication.
    assert!(listing.contains("MUL     CALL MD_INIT"));
}

/// `var=<name>, scope=<depth>` of every data word in the listing.
fn storage_slots(listing: &str) -> Vec<&str> {
    let mut slots = listing
        .lines()
        .filter(|line| line.contains("  DW 0"))
        .filter_map(|line| line.split("; ").nth(1))
        .collect::<Vec<_>>();
    slots.sort_unstable();
    slots
}

#[test]
fn test_one_slot_per_name_without_loops() {
    // x = 1; x = 2; rez = x
    let tokens = "\
IDN 1 x
OP_PRIDRUZI 1 =
BROJ 1 1
IDN 2 x
OP_PRIDRUZI 2 =
BROJ 2 2
IDN 3 rez
OP_PRIDRUZI 3 =
IDN 3 x
";
    let listing = compile_str(tokens, &CompilerConf::default()).unwrap();
    assert_eq!(listing.matches("DW 0").count(), 2);
    assert_eq!(storage_slots(&listing), vec!["var=rez, scope=0", "var=x, scope=0"]);
    assert_eq!(run(tokens, &CompilerConf::default()), 2);
}

#[test]
fn test_one_slot_per_name_and_depth() {
    let listing = compile_str(include_str!("programs/nested.lex"), &CompilerConf::default()).unwrap();

    // Body assignments to `rez` reuse the top-level slot.
    assert_eq!(
        storage_slots(&listing),
        vec!["var=i, scope=1", "var=i, scope=2", "var=rez, scope=0"]
    );
}

#[test]
fn test_syntax_errors() {
    let err = compile_str("IDN 1 x\nOP_PRIDRUZI 1 =\n", &CompilerConf::default()).unwrap_err();
    assert_eq!(err.diagnostic().as_deref(), Some("err kraj"));

    let err = compile_str("IDN 1 x\nBROJ 1 3\n", &CompilerConf::default()).unwrap_err();
    assert_eq!(err.diagnostic().as_deref(), Some("err BROJ 1 3"));

    let err = compile_str("IDN 1 x\nOP_NEPOZNAT 1 ?\n", &CompilerConf::default()).unwrap_err();
    assert!(matches!(err, CompileError::Token(_)));
    assert_eq!(err.diagnostic(), None);
}
