//! End-to-end checks that well-formed documents in both dialects pass, and
//! that malformed input degrades to bounded syntax diagnostics.

mod common;

use common::*;
use seqlint_core::{Dialect, LintConfig, LintInput, Linter, NodeKind, codes, parse_seqn, parse_vml};

const SEQN_SAMPLE: &str = r#"@ID "seq.name"
@INPUT_PARAMS_BEGIN
  count INT "0...10"
  mode ENUM MODE
@INPUT_PARAMS_END
@LOCALS_BEGIN
  label STRING
@LOCALS_END
A2024-001T00:00:00 TURN_ON count mode # power up
@METADATA "key" "value"
@MODEL "variable" 5 "00:00:00"
R00:00:10 SEND_PAIRS [1 true 2 false]
C IF count
C SET_LABEL label
C ELSE
C SET_GAIN 5.0
C END_IF
R00:00:10 @REQUEST_BEGIN("name")
  C RESET
  R00:00:01 TURN_OFF
@REQUEST_END
"#;

const VML_SAMPLE: &str = r#"MODULE
SEQUENCE demo
DECLARE INT counter := 0
INPUT STRING target
BODY
R00:00:01.00 ISSUE TURN_ON counter, "ON" ; power up
R00:00:00.00 IF counter > 1 THEN
R00:00:00.00 counter := counter + 1
R00:00:00.00 ISSUE SET_LABEL target
R00:00:00.00 END_IF
END_BODY
END_SEQUENCE
END_MODULE
"#;

#[test]
fn seqn_sample_is_clean() {
    let result = lint_source(Dialect::Seqn, SEQN_SAMPLE);
    assert!(result.ok);
    assert!(result.diagnostics.is_empty(), "{:#?}", result.diagnostics);
}

#[test]
fn vml_sample_is_clean() {
    let result = lint_source(Dialect::Vml, VML_SAMPLE);
    assert!(result.ok);
    assert!(result.diagnostics.is_empty(), "{:#?}", result.diagnostics);
}

#[test]
fn sample_trees_have_expected_shape() {
    let tree = parse_seqn(SEQN_SAMPLE);
    let count = |kind: NodeKind| tree.root().descendants().filter(|n| n.kind() == kind).count();
    assert_eq!(count(NodeKind::Command), 9);
    assert_eq!(count(NodeKind::VariableDeclaration), 3);
    assert_eq!(count(NodeKind::Request), 1);
    assert_eq!(count(NodeKind::MetaEntry), 1);
    assert_eq!(count(NodeKind::Model), 1);

    let tree = parse_vml(VML_SAMPLE);
    let count = |kind: NodeKind| tree.root().descendants().filter(|n| n.kind() == kind).count();
    assert_eq!(count(NodeKind::Statement), 5);
    assert_eq!(count(NodeKind::Issue), 2);
    assert_eq!(count(NodeKind::VariableDeclaration), 2);
}

#[test]
fn malformed_input_never_panics() {
    for src in [
        "",
        "\n\n",
        "C",
        "@",
        "C STEM [1 2",
        "C STEM \"unterminated",
        "@REQUEST_BEGIN(",
        "@INPUT_PARAMS_BEGIN\n",
        "R00:00:00",
        "]]] [[[ ,,, :::",
    ] {
        let _ = seqn(src);
        let _ = vml(src);
    }
}

#[test]
fn syntax_errors_are_capped() {
    let src = "C RESET ]\n".repeat(10);
    let config = LintConfig {
        max_syntax_errors: 2,
        ..LintConfig::default()
    };
    let tree = parse_seqn(&src);
    let result = Linter::new(config).lint(&LintInput::new(&tree, Dialect::Seqn));
    let syntax: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.id == codes::SYNTAX_ERROR)
        .collect();
    assert_eq!(syntax.len(), 2);
    assert!(syntax[0].message.starts_with("Syntax error: "));
    assert!(!result.ok);
}
