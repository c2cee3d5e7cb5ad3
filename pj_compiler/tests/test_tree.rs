use pj_compiler::{
    check_tree,
    compile::{CompileError, CompilerConf, ScopePolicy},
    parse_str,
    parsing::{DerivationTree, NodeKind},
};

#[test]
fn test_tree_round_trip() {
    for tokens in [
        include_str!("programs/arithmetic.lex"),
        include_str!("programs/loop_sum.lex"),
        include_str!("programs/signed.lex"),
        include_str!("programs/nested.lex"),
    ] {
        let tree = parse_str(tokens).unwrap();
        let text = tree.encode();
        assert_eq!(DerivationTree::decode(&text).unwrap(), tree);
    }
}

#[test]
fn test_tree_leaves_match_tokens() {
    let tokens = include_str!("programs/nested.lex");
    let tree = parse_str(tokens).unwrap();

    let leaves = tree.leaves().map(|t| t.to_string()).collect::<Vec<_>>();
    let lines = tokens.lines().collect::<Vec<_>>();
    assert_eq!(leaves, lines);
}

#[test]
fn test_tree_text_layout() {
    let tree = parse_str("IDN 1 x\nOP_PRIDRUZI 1 =\nBROJ 1 3\n").unwrap();
    let text = tree.encode();
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "<program>");
    assert_eq!(lines[1], " <lista_naredbi>");
    assert_eq!(lines[4], "    IDN 1 x");
    assert_eq!(*lines.last().unwrap(), "   $");

    let root = &tree.nodes()[0];
    assert_eq!(root.depth, 0);
    assert!(matches!(root.kind, NodeKind::Branch(_)));
}

#[test]
fn test_decode_tolerates_noise() {
    let text = "<program>\n\n <lista_naredbi>\n  <naredba>\n   <naredba_pridruzivanja>\n    IDN 1 x\n    OP_PRIDRUZI 1 =\n    junk\n    <E>\n     <T>\n      <P>\n       BROJ 1 3\n";
    let tree = DerivationTree::decode(text).unwrap();
    assert_eq!(tree.leaves().count(), 3);

    assert!(matches!(
        DerivationTree::decode("<program>\n NEPOZNAT 1 x\n"),
        Err(err) if err.line == 2
    ));
}

#[test]
fn test_reference_report() {
    let tree = parse_str(include_str!("programs/loop_sum.lex")).unwrap();
    let program = check_tree(&tree, &CompilerConf::default()).unwrap();

    // The body reads `rez` through its top-level declaration.
    assert_eq!(program.reference_report(), "3 1 rez\n3 2 i\n");
}

#[test]
fn test_reference_report_always_fresh() {
    let conf = CompilerConf {
        scope_policy: ScopePolicy::AlwaysFresh,
        ..CompilerConf::default()
    };
    // x = 1; x = 2; y = x
    let tokens = "\
IDN 1 x
OP_PRIDRUZI 1 =
BROJ 1 1
IDN 2 x
OP_PRIDRUZI 2 =
BROJ 2 2
IDN 3 y
OP_PRIDRUZI 3 =
IDN 3 x
";
    let tree = parse_str(tokens).unwrap();
    let program = check_tree(&tree, &conf).unwrap();
    assert_eq!(program.reference_report(), "3 2 x\n");

    let program = check_tree(&tree, &CompilerConf::default()).unwrap();
    assert_eq!(program.reference_report(), "3 1 x\n");

    // A fresh name can't read itself under either policy.
    let tree = parse_str("IDN 1 x\nOP_PRIDRUZI 1 =\nIDN 1 x\nOP_PLUS 1 +\nBROJ 1 1\n").unwrap();
    let err = check_tree(&tree, &conf).unwrap_err();
    assert_eq!(err.diagnostic().as_deref(), Some("err 1 x"));
}

#[test]
fn test_check_reports_first_error() {
    // za i od 1 do i
    let tokens = "KR_ZA 1 za\nIDN 1 i\nKR_OD 1 od\nBROJ 1 1\nKR_DO 1 do\nIDN 1 i\nKR_AZ 2 az\n";
    let tree = parse_str(tokens).unwrap();
    let err = check_tree(&tree, &CompilerConf::default()).unwrap_err();
    assert!(matches!(err, CompileError::Semantic(_)));
    assert_eq!(err.diagnostic().as_deref(), Some("err 1 i"));
}
