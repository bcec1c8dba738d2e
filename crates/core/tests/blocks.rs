mod common;

use common::*;
use seqlint_core::{BlockKeyword, Dialect, codes, match_blocks};

fn vml_body(lines: &str) -> String {
    format!("MODULE\nSEQUENCE s\nBODY\n{lines}END_BODY\nEND_SEQUENCE\nEND_MODULE\n")
}

#[test]
fn balanced_seqn_blocks_are_clean() {
    let src = "\
C IF x
C RESET
C ELSE_IF y
C TURN_OFF
C ELSE
C WHILE z
C RESET
C END_WHILE
C END_IF
";
    assert!(seqn(src).is_empty(), "{:#?}", seqn(src));
}

#[test]
fn dangling_seqn_if_gets_closing_fix() {
    let src = "C IF x\nC RESET\n";
    let issues = seqn(src);
    let diag = find_diag(&issues, codes::UNCLOSED_BLOCK);
    assert_eq!(diag.message, "IF block is not closed, expected END_IF");
    assert_eq!(diag.span.start, 2);
    let fixed = apply_fix(src, diag, "Insert END_IF");
    assert_eq!(fixed, "C IF x\nC RESET\nC END_IF\n");
    assert!(seqn(&fixed).is_empty());
}

#[test]
fn dangling_vml_if_gets_closing_fix() {
    let src = vml_body("R00:00:00.00 IF x THEN\nR00:00:01.00 ISSUE RESET\n");
    let issues = vml(&src);
    let diag = find_diag(&issues, codes::UNCLOSED_BLOCK);
    let fixed = apply_fix(&src, diag, "Insert END_IF");
    assert!(fixed.contains("ISSUE RESET\nR00:00:00.00 END_IF\n"), "{fixed}");
    assert!(vml(&fixed).is_empty());
}

#[test]
fn dangling_close_can_be_removed() {
    let src = "C RESET\nC END_WHILE\nC TURN_OFF\n";
    let issues = seqn(src);
    let diag = find_diag(&issues, codes::UNMATCHED_BLOCK_CLOSE);
    assert_eq!(diag.message, "END_WHILE has no matching opening statement");
    let fixed = apply_fix(src, diag, "Remove END_WHILE");
    assert_eq!(fixed, "C RESET\nC TURN_OFF\n");
}

#[test]
fn block_keywords_are_not_dictionary_commands() {
    let issues = seqn("C WAIT_UNTIL t\nC END_WAIT_UNTIL\n");
    assert!(issues.iter().all(|d| d.id != codes::UNKNOWN_COMMAND));
}

#[test]
fn completed_pairs_are_properly_nested() {
    let src = vml_body(
        "\
R00:00:00.00 WHILE a DO
R00:00:00.00 IF b THEN
R00:00:01.00 ISSUE RESET
R00:00:00.00 ELSE
R00:00:00.00 FOR i := 1 TO 3 DO
R00:00:00.00 END_FOR
R00:00:00.00 END_IF
R00:00:00.00 END_WHILE
",
    );
    let tree = Dialect::Vml.parse(&src);
    let map = match_blocks(&tree, Dialect::Vml.mapper());
    assert!(map.values().all(|p| p.is_complete()), "{map:#?}");
    assert_eq!(map.len(), 4);

    let ranges: Vec<(usize, usize)> = map.values().filter_map(|p| p.fold_range()).collect();
    for (i, a) in ranges.iter().enumerate() {
        for b in &ranges[i + 1..] {
            let disjoint = a.1 <= b.0 || b.1 <= a.0;
            let nested = (a.0 <= b.0 && b.1 <= a.1) || (b.0 <= a.0 && a.1 <= b.1);
            assert!(disjoint || nested, "{a:?} and {b:?} overlap");
        }
    }
    assert!(map.values().any(|p| p.keyword == BlockKeyword::Else));
}
