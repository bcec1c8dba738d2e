mod common;

use common::*;
use seqlint_core::{
    Auxiliary, Dialect, LintConfig, Linter, ParameterValueOverride, Severity, codes,
    load_parameter_dictionary_from_str,
};
use std::sync::Arc;

// ─── Commands ────────────────────────────────────────────────────────────────

#[test]
fn known_commands_are_clean() {
    let src = "C TURN_ON 5 ON\nR00:00:01 RESET\nC SET_LABEL \"MAIN\"\nC SET_SPEED FAST\n";
    let result = lint_source(Dialect::Seqn, src);
    assert!(result.ok, "{:#?}", result.diagnostics);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn unknown_stem_suggests_closest_stems() {
    let issues = seqn("C TURN_ON_X 1 ON\n");
    let diag = find_diag(&issues, codes::UNKNOWN_COMMAND);
    assert_eq!(diag.message, "Command 'TURN_ON_X' not found");
    assert_eq!(diag.severity, Severity::Error);
    assert!(!diag.fix_actions.is_empty() && diag.fix_actions.len() <= 3);
    assert_eq!(diag.fix_actions[0].label, "Change to TURN_ON");
}

#[test]
fn stem_suggestion_limit_is_configurable() {
    let config = LintConfig {
        stem_suggestions: 1,
        ..LintConfig::default()
    };
    let linter = Linter::new(config);
    let result = lint_with(&linter, Dialect::Seqn, "C TURN_OFX\n", Auxiliary::default());
    let diag = find_diag(&result.diagnostics, codes::UNKNOWN_COMMAND);
    assert_eq!(diag.fix_actions.len(), 1);
    assert_eq!(diag.fix_actions[0].label, "Change to TURN_OFF");
}

#[test]
fn applying_stem_fix_clears_the_error() {
    let src = "C RESETT\n";
    let issues = seqn(src);
    let fixed = apply_fix(src, find_diag(&issues, codes::UNKNOWN_COMMAND), "Change to RESET");
    assert_eq!(fixed, "C RESET\n");
    assert!(seqn(&fixed).is_empty());
}

#[test]
fn too_many_arguments_fix_removes_extras() {
    let src = "C RESET 1 2\n";
    let issues = seqn(src);
    let diag = find_diag(&issues, codes::ARGUMENT_COUNT);
    assert_eq!(diag.message, "Too many arguments for 'RESET': expected 0, got 2");
    let fixed = apply_fix(src, diag, "Remove extra arguments");
    assert_eq!(fixed, "C RESET\n");
    assert!(seqn(&fixed).is_empty());
}

#[test]
fn too_few_arguments_fix_appends_defaults() {
    let src = "C TURN_ON\n";
    let issues = seqn(src);
    let diag = find_diag(&issues, codes::ARGUMENT_COUNT);
    assert_eq!(diag.message, "Missing arguments for 'TURN_ON': expected 2, got 0");
    let fixed = apply_fix(src, diag, "Add default arguments");
    assert_eq!(fixed, "C TURN_ON 0 ON\n");
    assert!(seqn(&fixed).is_empty());
}

#[test]
fn count_mismatch_skips_per_argument_checks() {
    // 99 is out of range for `level`, but the missing `mode` wins.
    assert_eq!(ids(&seqn("C TURN_ON 99\n")), [codes::ARGUMENT_COUNT]);
    assert_eq!(ids(&seqn("C TURN_ON 99 BOGUS 1\n")), [codes::ARGUMENT_COUNT]);
}

#[test]
fn too_few_arguments_uses_declared_default() {
    let src = "C SET_LABEL\n";
    let issues = seqn(src);
    let fixed = apply_fix(src, find_diag(&issues, codes::ARGUMENT_COUNT), "Add default arguments");
    assert_eq!(fixed, "C SET_LABEL \"NONE\"\n");
}

#[test]
fn vml_too_few_arguments_are_comma_separated() {
    let src = "MODULE\nSEQUENCE s\nBODY\nR00:00:01.00 ISSUE TURN_ON 1\nEND_BODY\nEND_SEQUENCE\nEND_MODULE\n";
    let issues = vml(src);
    let fixed = apply_fix(src, find_diag(&issues, codes::ARGUMENT_COUNT), "Add default arguments");
    assert!(fixed.contains("ISSUE TURN_ON 1, \"ON\"\n"), "{fixed}");
    assert!(vml(&fixed).is_empty());
}

// ─── Argument values ─────────────────────────────────────────────────────────

#[test]
fn singleton_range_offers_the_only_value() {
    let src = "C SET_GAIN 3\n";
    let issues = seqn(src);
    let diag = find_diag(&issues, codes::OUT_OF_RANGE);
    assert_eq!(diag.message, "Number out of range. Range is 5.");
    let fixed = apply_fix(src, diag, "Change to 5");
    assert_eq!(fixed, "C SET_GAIN 5\n");
    assert!(seqn(&fixed).is_empty());
}

#[test]
fn interval_range_message() {
    let issues = seqn("C TURN_ON 11 ON\n");
    let diag = find_diag(&issues, codes::OUT_OF_RANGE);
    assert_eq!(
        diag.message,
        "Number out of range. Range is between 0 and 10 inclusive."
    );
    assert_eq!(diag.context.as_ref().unwrap()["value"], "11");
}

#[test]
fn unsigned_rejects_negative_and_fractional_values() {
    let issues = seqn("C COUNT -1\n");
    assert_eq!(
        find_diag(&issues, codes::OUT_OF_RANGE).message,
        "Number out of range. Value must be at least 0."
    );

    let issues = seqn("C COUNT 1.5\n");
    assert_eq!(
        find_diag(&issues, codes::ARGUMENT_TYPE).message,
        "Incorrect type for 'n': expected unsigned but got non-integral number"
    );

    assert!(seqn("C COUNT 0x1F\n").is_empty());
}

#[test]
fn literal_shape_mismatch() {
    let issues = seqn("C TURN_ON \"five\" ON\n");
    let diag = find_diag(&issues, codes::ARGUMENT_TYPE);
    assert_eq!(
        diag.message,
        "Incorrect type for 'level': expected integer but got string"
    );
    assert_eq!(diag.span.start, 10);
}

#[test]
fn enum_suggests_nearest_symbol() {
    let src = "C TURN_ON 1 OF\n";
    let issues = seqn(src);
    let diag = find_diag(&issues, codes::INVALID_ENUM);
    assert_eq!(diag.message, "Enum should be \"ON | OFF | STANDBY\"");
    assert_eq!(diag.fix_actions.len(), 1);
    let fixed = apply_fix(src, diag, "Change to OFF");
    assert_eq!(fixed, "C TURN_ON 1 OFF\n");
    assert!(seqn(&fixed).is_empty());
}

#[test]
fn enum_display_is_capped() {
    let config = LintConfig {
        max_enum_display: 2,
        ..LintConfig::default()
    };
    let result = lint_with(
        &Linter::new(config),
        Dialect::Seqn,
        "C TURN_ON 1 NOPE\n",
        Auxiliary::default(),
    );
    assert_eq!(
        find_diag(&result.diagnostics, codes::INVALID_ENUM).message,
        "Enum should be \"ON | OFF | ...\""
    );
}

#[test]
fn inline_enum_range_is_used_without_enum_table() {
    let issues = seqn("C SET_SPEED FASTER\n");
    assert_eq!(
        find_diag(&issues, codes::INVALID_ENUM).message,
        "Enum should be \"FAST | SLOW\""
    );
}

#[test]
fn vml_enum_fix_keeps_quotes() {
    let src = "MODULE\nSEQUENCE s\nBODY\nR00:00:01.00 ISSUE TURN_ON 1, \"STANBY\"\nEND_BODY\nEND_SEQUENCE\nEND_MODULE\n";
    let issues = vml(src);
    let fixed = apply_fix(src, find_diag(&issues, codes::INVALID_ENUM), "Change to STANDBY");
    assert!(fixed.contains("ISSUE TURN_ON 1, \"STANDBY\"\n"), "{fixed}");
}

#[test]
fn string_length_limit() {
    let issues = seqn("C SET_LABEL \"TOOLONGLABEL\"\n");
    assert_eq!(
        find_diag(&issues, codes::STRING_TOO_LONG).message,
        "String 'label' is 12 characters, maximum is 8"
    );
}

#[test]
fn repeat_count_lists_allowed_totals() {
    let issues = seqn("C SEND_PAIRS [1 true 2 false 3]\n");
    let diag = find_diag(&issues, codes::REPEAT_COUNT);
    assert_eq!(
        diag.message,
        "Repeat argument 'pairs' should have one of [2, 4, 6] values"
    );
    assert_eq!(diag.context.as_ref().unwrap()["allowed"], "[2, 4, 6]");
}

#[test]
fn repeat_count_bounds() {
    let issues = seqn("C SEND_PAIRS [1 true 2 false 3 true 4 false]\n");
    assert_eq!(
        find_diag(&issues, codes::REPEAT_COUNT).message,
        "Repeat argument 'pairs' should have at most 6 values"
    );
    let issues = seqn("C SEND_PAIRS []\n");
    assert_eq!(
        find_diag(&issues, codes::REPEAT_COUNT).message,
        "Repeat argument 'pairs' should have at least 2 values"
    );
}

#[test]
fn repeat_groups_are_checked_per_value() {
    assert!(seqn("C SEND_PAIRS [1 true 2 false]\n").is_empty());
    let issues = seqn("C SEND_PAIRS [1 true 2 7]\n");
    assert_eq!(
        find_diag(&issues, codes::ARGUMENT_TYPE).message,
        "Incorrect type for 'b': expected boolean but got number"
    );
}

#[test]
fn nested_repeat_groups_are_checked_recursively() {
    assert!(seqn("C SEND_GRID [[1 2] [3]]\n").is_empty());

    let issues = seqn("C SEND_GRID [[1 9]]\n");
    assert_eq!(ids(&issues), [codes::OUT_OF_RANGE]);
    assert_eq!(issues[0].context.as_ref().unwrap()["arg"], "cell");

    let issues = seqn("C SEND_GRID [[1 2 3]]\n");
    assert_eq!(
        find_diag(&issues, codes::REPEAT_COUNT).message,
        "Repeat argument 'cells' should have at most 2 values"
    );
}

// ─── Variables ───────────────────────────────────────────────────────────────

#[test]
fn declared_variables_stand_in_for_arguments() {
    let src = "@LOCALS_BEGIN\ncount INT\nname STRING\n@LOCALS_END\nC TURN_ON count ON\nC SET_LABEL name\n";
    assert!(seqn(src).is_empty());
}

#[test]
fn variable_type_must_fit_argument() {
    let src = "@LOCALS_BEGIN\nname STRING\n@LOCALS_END\nC TURN_ON name ON\n";
    let issues = seqn(src);
    assert_eq!(
        find_diag(&issues, codes::ARGUMENT_TYPE).message,
        "Incorrect type for 'level': expected integer but got STRING variable"
    );
}

#[test]
fn vml_declarations_are_visible_to_commands() {
    let src = "MODULE\nSEQUENCE s\nDECLARE INT counter := 0\nBODY\nR00:00:01.00 ISSUE TURN_ON counter, \"ON\"\nEND_BODY\nEND_SEQUENCE\nEND_MODULE\n";
    assert!(vml(src).is_empty());
}

#[test]
fn global_variables_are_untyped() {
    let src = "C TURN_ON level_global ON\n";
    let issues = seqn(src);
    assert_eq!(
        find_diag(&issues, codes::ARGUMENT_TYPE).message,
        "Incorrect type for 'level': expected integer but got enum"
    );

    let globals = vec!["level_global".to_string()];
    let aux = Auxiliary {
        global_variables: &globals,
        ..Auxiliary::default()
    };
    let result = lint_with(&Linter::default(), Dialect::Seqn, src, aux);
    assert!(result.diagnostics.is_empty(), "{:#?}", result.diagnostics);

    let config = LintConfig {
        global_variables: globals,
        ..LintConfig::default()
    };
    let result = lint_with(&Linter::new(config), Dialect::Seqn, src, Auxiliary::default());
    assert!(result.diagnostics.is_empty());
}

#[test]
fn parameter_override_retypes_value_argument() {
    let params = load_parameter_dictionary_from_str(
        r#"{ "parameters": [ { "name": "GAIN", "arg": { "name": "GAIN", "type": "integer", "range": { "min": 0, "max": 5 } } } ] }"#,
    )
    .unwrap();
    let params = [params];
    let aux = Auxiliary {
        parameter_dictionaries: &params,
        ..Auxiliary::default()
    };
    let src = "C SET_PARAM \"GAIN\" 9\n";

    let plain = lint_with(&Linter::default(), Dialect::Seqn, src, aux);
    assert_eq!(ids(&plain.diagnostics), [codes::ARGUMENT_TYPE]);

    let linter = Linter::default().with_override(Arc::new(ParameterValueOverride::new(
        ["SET_PARAM"],
        Vec::<(String, String)>::new(),
    )));
    let result = lint_with(&linter, Dialect::Seqn, src, aux);
    let diag = find_diag(&result.diagnostics, codes::OUT_OF_RANGE);
    assert_eq!(diag.context.as_ref().unwrap()["arg"], "value");
    assert!(lint_with(&linter, Dialect::Seqn, "C SET_PARAM \"GAIN\" 4\n", aux).ok);
}

#[test]
fn custom_distance_function_drives_suggestions() {
    let by_length = |a: &str, b: &str| a.len().abs_diff(b.len());
    let linter = Linter::default().with_distance(Arc::new(by_length));
    let result = lint_with(&linter, Dialect::Seqn, "C ABCDE\n", Auxiliary::default());
    let diag = find_diag(&result.diagnostics, codes::UNKNOWN_COMMAND);
    assert_eq!(diag.fix_actions[0].label, "Change to COUNT");
}

// ─── Directives and declarations ─────────────────────────────────────────────

#[test]
fn second_declaration_block_is_reported_once() {
    let src = "@INPUT_PARAMS_BEGIN\na INT\n@INPUT_PARAMS_END\n@INPUT_PARAMS_BEGIN\nb INT\n@INPUT_PARAMS_END\n";
    let issues = seqn(src);
    assert_eq!(issues.len(), 1, "{issues:#?}");
    assert_eq!(issues[0].id, codes::DUPLICATE_DIRECTIVE);
    assert_eq!(issues[0].message, "maximum of one INPUT_PARAMS directive per sequence");
    assert_eq!(issues[0].span.start, src.rfind("@INPUT_PARAMS_BEGIN").unwrap());
}

#[test]
fn id_must_be_a_quoted_string() {
    assert!(seqn("@ID \"seq.name\"\n").is_empty());

    let src = "@ID seq\n";
    let issues = seqn(src);
    let fixed = apply_fix(src, find_diag(&issues, codes::INVALID_ID), "Change to \"seq\"");
    assert_eq!(fixed, "@ID \"seq\"\n");

    let src = "@ID\n";
    let issues = seqn(src);
    let fixed = apply_fix(src, find_diag(&issues, codes::MISSING_ID), "Insert sequence name");
    assert!(seqn(&fixed).is_empty());
}

#[test]
fn unknown_directive_suggests_known_one() {
    let issues = seqn("@IMEDIATE\n");
    let diag = find_diag(&issues, codes::UNKNOWN_DIRECTIVE);
    assert_eq!(diag.fix_actions[0].label, "Change to @IMMEDIATE");
}

#[test]
fn declaration_problems() {
    let issues = seqn("@LOCALS_BEGIN\n@LOCALS_END\n");
    assert_eq!(ids(&issues), [codes::EMPTY_DECLARATION]);

    let src = "@LOCALS_BEGIN\nx INTT\nx FLOAT\n@LOCALS_END\n";
    let issues = seqn(src);
    let fixed = apply_fix(src, find_diag(&issues, codes::INVALID_VARIABLE_TYPE), "Change to INT");
    assert!(fixed.contains("x INT\n"));
    assert_eq!(
        find_diag(&issues, codes::DUPLICATE_VARIABLE).message,
        "Variable 'x' is already declared"
    );

    let issues = seqn("@INPUT_PARAMS_BEGIN\nmode ENUM\n@INPUT_PARAMS_END\n");
    assert_eq!(
        find_diag(&issues, codes::ENUM_NAME_MISMATCH).message,
        "ENUM variable 'mode' requires an enum name"
    );

    let src = "@INPUT_PARAMS_BEGIN\nmode ENUM MOOD\n@INPUT_PARAMS_END\n";
    let issues = seqn(src);
    let fixed = apply_fix(src, find_diag(&issues, codes::UNKNOWN_ENUM), "Change to MODE");
    assert!(seqn(&fixed).is_empty());

    let issues = seqn("@LOCALS_BEGIN\nn INT \"10...1\"\n@LOCALS_END\n");
    assert_eq!(
        find_diag(&issues, codes::INVALID_VARIABLE_RANGE).message,
        "Invalid range '\"10...1\"' for 'n', minimum is greater than maximum"
    );
}

#[test]
fn metadata_shape() {
    assert!(seqn("C RESET\n@METADATA \"k\" \"v\"\n").is_empty());
    let issues = seqn("C RESET\n@METADATA \"k\"\n");
    assert_eq!(
        find_diag(&issues, codes::MALFORMED_METADATA).message,
        "@METADATA missing field"
    );
    let issues = seqn("C RESET\n@MODEL \"var\" 5\n");
    assert_eq!(find_diag(&issues, codes::MALFORMED_MODEL).message, "@MODEL missing field");
}

// ─── Command categories ──────────────────────────────────────────────────────

#[test]
fn mixing_command_types_is_reported() {
    let src = "C RESET\n@IMMEDIATE\nRESET\n";
    let issues = seqn(src);
    let diag = find_diag(&issues, codes::MIXED_COMMAND_TYPES);
    assert_eq!(
        diag.message,
        "Sequence cannot mix different command types (standard and immediate)"
    );
    assert_eq!(diag.span.start, src.rfind("RESET").unwrap());
}

#[test]
fn load_and_go_conflicts_with_immediate_commands() {
    let issues = seqn("@LOAD_AND_GO\n@IMMEDIATE\nRESET\n");
    assert_eq!(
        find_diag(&issues, codes::LOAD_AND_GO_CONFLICT).message,
        "@LOAD_AND_GO cannot be used with immediate commands"
    );
}

#[test]
fn immediate_commands_cannot_carry_metadata() {
    let src = "@IMMEDIATE\nRESET\n@METADATA \"k\" \"v\"\n";
    let issues = seqn(src);
    let diag = find_diag(&issues, codes::ATTACHMENT_NOT_ALLOWED);
    assert_eq!(diag.message, "immediate commands cannot have metadata");
    assert_eq!(apply_fix(src, diag, "Remove metadata"), "@IMMEDIATE\nRESET\n");
}

#[test]
fn hardware_commands_belong_in_hardware_section() {
    assert!(seqn("@HARDWARE\nHW_POWER\n").is_empty());

    let issues = seqn("C HW_POWER\n");
    let diag = find_diag(&issues, codes::COMMAND_CATEGORY);
    assert_eq!(
        diag.message,
        "'HW_POWER' is a hardware command and must be in a @HARDWARE section"
    );
    assert_eq!(diag.context.as_ref().unwrap()["category"], "hardware");

    let issues = seqn("@HARDWARE\nRESET\n");
    assert_eq!(
        find_diag(&issues, codes::COMMAND_CATEGORY).message,
        "'RESET' is a flight software command and cannot be in a @HARDWARE section"
    );
}

#[test]
fn vml_hardware_command_is_out_of_section() {
    let src = "MODULE\nSEQUENCE s\nBODY\nR00:00:01.00 ISSUE HW_POWER\nEND_BODY\nEND_SEQUENCE\nEND_MODULE\n";
    let issues = vml(src);
    assert_eq!(ids(&issues), [codes::COMMAND_CATEGORY]);
    assert_eq!(issues[0].context.as_ref().unwrap()["stem"], "HW_POWER");
}

// ─── Result shape ────────────────────────────────────────────────────────────

#[test]
fn diagnostics_are_ordered_by_position() {
    let issues = seqn("C TURN_ON 99 ON\nC BOGUS\nRESET\n");
    assert!(issues.len() >= 3);
    assert!(issues.windows(2).all(|w| w[0].span.start <= w[1].span.start));
}

#[test]
fn without_dictionary_only_structure_is_checked() {
    let tree = Dialect::Seqn.parse("C ANYTHING 1 2 3\nRESET\n");
    let issues = seqlint_core::lint(&tree, Dialect::Seqn, None, Auxiliary::default());
    assert_eq!(ids(&issues), [codes::MISSING_TIME_TAG]);
}

#[test]
fn result_serializes_to_json() {
    let result = lint_source(Dialect::Seqn, "C BOGUS\n");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["diagnostics"][0]["id"], codes::UNKNOWN_COMMAND);
}
