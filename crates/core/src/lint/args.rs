use super::context::{LintContext, VariableType};
use super::ctx;
use super::diagnostics_util::{diagnostic_with_spec_severity, render_diagnostic_message, trim_f64};
use super::overrides::{ArgumentContext, PrecedingArgument};
use super::suggest::nearest;
use crate::grammar::lexer::{is_integer_literal, parse_number, unquote};
use crate::grammar::{NodeKind, SyntaxNode};
use seqlint_diagnostics::{Diagnostic, FixAction, Span, codes};
use seqlint_dictionary::{ArgDef, ArgKind, CommandDef, NumericRange};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Check every command statement against the dictionary.
pub(super) fn check_commands(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    let Some(dictionary) = cx.dictionary else {
        return;
    };
    for stmt in cx.mapper.statements(cx.tree) {
        if cx.mapper.block_keyword(stmt).is_some() {
            continue;
        }
        let Some(stem) = cx.mapper.name_node(stmt) else {
            continue;
        };
        match dictionary.command(stem.text()) {
            Some(def) => check_command(cx, stmt, stem, def, issues),
            None => issues.push(unknown_command(cx, stem)),
        }
    }
}

fn unknown_command(cx: &LintContext<'_>, stem: SyntaxNode<'_>) -> Diagnostic {
    let name = stem.text();
    let stems = cx.dictionary.map(|d| d.stems().collect::<Vec<_>>()).unwrap_or_default();
    let fixes = nearest(name, stems, cx.distance, cx.config.stem_suggestions)
        .into_iter()
        .map(|s| FixAction::new(format!("Change to {s}"), stem.span(), s));
    diagnostic_with_spec_severity(
        codes::UNKNOWN_COMMAND,
        render_diagnostic_message(
            codes::UNKNOWN_COMMAND,
            "default",
            &[("stem", name.to_string())],
            format!("Command '{name}' not found"),
        ),
        stem.span(),
    )
    .with_fixes(fixes)
    .with_context(ctx!("stem" => name))
}

fn check_command(
    cx: &LintContext<'_>,
    stmt: SyntaxNode<'_>,
    stem: SyntaxNode<'_>,
    def: &CommandDef,
    issues: &mut Vec<Diagnostic>,
) {
    let args = cx
        .mapper
        .argument_container(stmt)
        .map(|c| cx.mapper.arguments(c))
        .unwrap_or_default();
    let expected = def.arguments.len();
    if args.len() != expected {
        issues.push(argument_count(cx, stmt, stem, def, &args));
        return;
    }
    check_argument_list(cx, stem.text(), &def.arguments, &args, issues);
}

fn argument_count(
    cx: &LintContext<'_>,
    stmt: SyntaxNode<'_>,
    stem: SyntaxNode<'_>,
    def: &CommandDef,
    args: &[SyntaxNode<'_>],
) -> Diagnostic {
    let expected = def.arguments.len();
    let actual = args.len();
    let (variant, fix) = if actual > expected {
        let from = expected
            .checked_sub(1)
            .map_or(stem.to(), |last| args[last].to());
        let to = args.last().map_or(from, |a| a.to());
        (
            "tooMany",
            FixAction::delete("Remove extra arguments", Span::new(from, to)),
        )
    } else {
        let defaults: Vec<String> = def.arguments[actual..]
            .iter()
            .map(|a| default_argument(cx, a, stem))
            .collect();
        (
            "tooFew",
            FixAction::insert(
                "Add default arguments",
                cx.mapper.append_position(stmt),
                cx.mapper.format_argument_list(&defaults, stmt),
            ),
        )
    };
    let fallback = format!(
        "Incorrect number of arguments for '{}': expected {expected}, got {actual}",
        def.stem
    );
    diagnostic_with_spec_severity(
        codes::ARGUMENT_COUNT,
        render_diagnostic_message(
            codes::ARGUMENT_COUNT,
            variant,
            &[
                ("stem", def.stem.clone()),
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
            fallback,
        ),
        stem.span(),
    )
    .with_fix(fix)
    .with_context(ctx!(
        "stem" => def.stem.as_str(),
        "expected" => expected.to_string(),
        "actual" => actual.to_string(),
    ))
}

/// Source text for an argument the user has not written yet.
fn default_argument(cx: &LintContext<'_>, arg: &ArgDef, anchor: SyntaxNode<'_>) -> String {
    if let Some(value) = &arg.default_value {
        return match value {
            serde_json::Value::String(s) if matches!(arg.kind, ArgKind::Enum { .. }) => {
                cx.mapper.format_enum_value(s, anchor)
            }
            serde_json::Value::String(s) => format!("\"{s}\""),
            serde_json::Value::Array(_) => "[]".to_string(),
            other => other.to_string(),
        };
    }
    match &arg.kind {
        ArgKind::Integer { .. } | ArgKind::Unsigned { .. } => "0".to_string(),
        ArgKind::Float { .. } | ArgKind::Numeric { .. } => "0.0".to_string(),
        ArgKind::Boolean => "false".to_string(),
        ArgKind::Enum { .. } => enum_symbols(cx, &arg.kind)
            .and_then(|symbols| symbols.first().map(|s| cx.mapper.format_enum_value(s, anchor)))
            .unwrap_or_else(|| "\"\"".to_string()),
        ArgKind::FixedString | ArgKind::VarString { .. } => "\"\"".to_string(),
        ArgKind::Repeat { .. } => "[]".to_string(),
        ArgKind::Time => "\"00:00:00\"".to_string(),
    }
}

/// Check argument nodes pairwise against definitions, running overrides first.
fn check_argument_list(
    cx: &LintContext<'_>,
    stem: &str,
    defs: &[ArgDef],
    args: &[SyntaxNode<'_>],
    issues: &mut Vec<Diagnostic>,
) {
    let mut preceding: Vec<PrecedingArgument<'_>> = Vec::with_capacity(args.len());
    for (index, (def, node)) in defs.iter().zip(args).enumerate() {
        let effective = {
            let actx = ArgumentContext {
                stem,
                index,
                definition: def,
                preceding: &preceding,
                parameter_dictionaries: cx.aux.parameter_dictionaries,
                channel_dictionary: cx.aux.channel_dictionary,
            };
            cx.overrides
                .iter()
                .find_map(|o| o.override_argument(&actx))
                .map_or(Cow::Borrowed(def), Cow::Owned)
        };
        check_argument(cx, stem, &effective, *node, issues);
        preceding.push(PrecedingArgument {
            definition: effective,
            value: node.text(),
        });
    }
}

fn check_argument(
    cx: &LintContext<'_>,
    stem: &str,
    def: &ArgDef,
    node: SyntaxNode<'_>,
    issues: &mut Vec<Diagnostic>,
) {
    let text = node.text();
    if cx.mapper.is_variable_reference(node)
        && let Some(declared) = cx.variables.get(text)
    {
        if let Some(ty) = declared
            && !variable_fits(ty, &def.kind)
        {
            issues.push(type_mismatch(def, node, &format!("{ty} variable")));
        }
        return;
    }

    if !shape_fits(cx, &def.kind, node) {
        issues.push(type_mismatch(def, node, literal_name(node.kind())));
        return;
    }

    match &def.kind {
        ArgKind::Integer { range }
        | ArgKind::Unsigned { range }
        | ArgKind::Float { range }
        | ArgKind::Numeric { range } => check_number(def, *range, node, issues),
        ArgKind::Enum { .. } => check_enum(cx, def, node, issues),
        ArgKind::VarString {
            max_length: Some(max),
        } => check_string_length(def, *max, node, issues),
        ArgKind::Repeat {
            arguments,
            min,
            max,
        } => check_repeat(cx, stem, def, arguments, *min, *max, node, issues),
        _ => {}
    }
}

fn variable_fits(ty: VariableType, kind: &ArgKind) -> bool {
    match kind {
        ArgKind::Integer { .. } | ArgKind::Unsigned { .. } => {
            matches!(ty, VariableType::Int | VariableType::Uint)
        }
        ArgKind::Float { .. } | ArgKind::Numeric { .. } => ty.is_numeric(),
        ArgKind::Boolean => matches!(ty, VariableType::Int | VariableType::Uint),
        ArgKind::Enum { .. } => matches!(ty, VariableType::Enum | VariableType::String),
        ArgKind::FixedString | ArgKind::VarString { .. } | ArgKind::Time => {
            ty == VariableType::String
        }
        ArgKind::Repeat { .. } => false,
    }
}

fn shape_fits(cx: &LintContext<'_>, kind: &ArgKind, node: SyntaxNode<'_>) -> bool {
    let m = cx.mapper;
    match kind {
        k if k.is_numeric() => m.is_number_compatible(node),
        ArgKind::Boolean => m.is_boolean_compatible(node),
        ArgKind::Enum { .. } => m.is_enum_compatible(node),
        ArgKind::Repeat { .. } => m.is_repeat(node),
        _ => m.is_string_compatible(node),
    }
}

fn literal_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Number => "number",
        NodeKind::String => "string",
        NodeKind::Boolean => "boolean",
        NodeKind::Enum => "enum",
        NodeKind::Identifier => "identifier",
        NodeKind::RepeatArg => "repeat",
        _ => "unknown",
    }
}

fn type_mismatch(def: &ArgDef, node: SyntaxNode<'_>, actual: &str) -> Diagnostic {
    let expected = def.kind.type_name();
    diagnostic_with_spec_severity(
        codes::ARGUMENT_TYPE,
        render_diagnostic_message(
            codes::ARGUMENT_TYPE,
            "default",
            &[
                ("arg", def.name.clone()),
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
            format!("Incorrect type for '{}': expected {expected}", def.name),
        ),
        node.span(),
    )
    .with_context(ctx!("arg" => def.name.as_str(), "expected" => expected, "actual" => actual))
}

// ─── Numbers ───

fn check_number(
    def: &ArgDef,
    range: Option<NumericRange>,
    node: SyntaxNode<'_>,
    issues: &mut Vec<Diagnostic>,
) {
    let text = node.text();
    let Some(value) = parse_number(text) else {
        return;
    };
    if def.kind.is_integral() && !is_integer_literal(text) {
        issues.push(type_mismatch(def, node, "non-integral number"));
        return;
    }
    let range = match (range, &def.kind) {
        (Some(r), _) => r,
        (None, ArgKind::Unsigned { .. }) => NumericRange {
            min: 0.0,
            max: f64::INFINITY,
        },
        (None, _) => return,
    };
    if range.contains(value) {
        return;
    }
    let (min, max) = (trim_f64(range.min), trim_f64(range.max));
    let subs = [
        ("arg", def.name.clone()),
        ("value", text.to_string()),
        ("min", min.clone()),
        ("max", max.clone()),
    ];
    let mut diag = if range.min == range.max {
        diagnostic_with_spec_severity(
            codes::OUT_OF_RANGE,
            render_diagnostic_message(
                codes::OUT_OF_RANGE,
                "singleton",
                &subs,
                format!("Number out of range. Range is {min}."),
            ),
            node.span(),
        )
        .with_fix(FixAction::new(format!("Change to {min}"), node.span(), min.clone()))
    } else {
        let variant = if range.max.is_infinite() { "atLeast" } else { "interval" };
        diagnostic_with_spec_severity(
            codes::OUT_OF_RANGE,
            render_diagnostic_message(
                codes::OUT_OF_RANGE,
                variant,
                &subs,
                format!("Number out of range. Range is between {min} and {max} inclusive."),
            ),
            node.span(),
        )
    };
    diag = diag.with_context(ctx!(
        "arg" => def.name.as_str(),
        "value" => text,
        "min" => min,
        "max" => max,
    ));
    issues.push(diag);
}

// ─── Enums ───

/// Symbols accepted by an enum argument: the enum table first, then the inline list.
fn enum_symbols(cx: &LintContext<'_>, kind: &ArgKind) -> Option<Vec<String>> {
    let ArgKind::Enum { enum_name, range } = kind else {
        return None;
    };
    cx.dictionary
        .and_then(|d| d.enum_symbols(enum_name))
        .map(|symbols| symbols.iter().map(|s| s.symbol.clone()).collect())
        .or_else(|| range.clone())
}

fn check_enum(cx: &LintContext<'_>, def: &ArgDef, node: SyntaxNode<'_>, issues: &mut Vec<Diagnostic>) {
    let Some(symbols) = enum_symbols(cx, &def.kind) else {
        return;
    };
    let value = unquote(node.text());
    if symbols.iter().any(|s| s == value) {
        return;
    }
    let limit = cx.config.max_enum_display;
    let mut shown: Vec<&str> = symbols.iter().take(limit).map(String::as_str).collect();
    if symbols.len() > limit {
        shown.push("...");
    }
    let display = shown.join(" | ");
    let fixes = nearest(value, symbols.iter().map(String::as_str), cx.distance, 1)
        .into_iter()
        .map(|s| {
            FixAction::new(
                format!("Change to {s}"),
                node.span(),
                cx.mapper.format_enum_value(s, node),
            )
        });
    issues.push(
        diagnostic_with_spec_severity(
            codes::INVALID_ENUM,
            render_diagnostic_message(
                codes::INVALID_ENUM,
                "default",
                &[("symbols", display.clone())],
                format!("Enum should be \"{display}\""),
            ),
            node.span(),
        )
        .with_fixes(fixes)
        .with_context(ctx!("arg" => def.name.as_str(), "value" => value, "symbols" => display)),
    );
}

// ─── Strings ───

fn check_string_length(def: &ArgDef, max: u32, node: SyntaxNode<'_>, issues: &mut Vec<Diagnostic>) {
    let length = unquote(node.text()).chars().count();
    if length <= max as usize {
        return;
    }
    issues.push(
        diagnostic_with_spec_severity(
            codes::STRING_TOO_LONG,
            render_diagnostic_message(
                codes::STRING_TOO_LONG,
                "default",
                &[
                    ("arg", def.name.clone()),
                    ("max_length", max.to_string()),
                    ("actual_length", length.to_string()),
                ],
                format!("String '{}' is too long", def.name),
            ),
            node.span(),
        )
        .with_context(ctx!(
            "arg" => def.name.as_str(),
            "max_length" => max.to_string(),
            "actual_length" => length.to_string(),
        )),
    );
}

// ─── Repeat groups ───

/// Allowed value counts for a repeat group, for display.
///
/// Lists the minimum and the next two multiples, then the maximum when it is
/// finite; `...` marks counts that are allowed but not shown.
fn allowed_counts(sub: usize, min: Option<u32>, max: Option<u32>) -> Vec<String> {
    let low = min.unwrap_or(0) as usize * sub;
    let high = max.map(|m| m as usize * sub);
    let shown: Vec<usize> = (0..3)
        .map(|step| low + step * sub)
        .filter(|n| high.is_none_or(|h| *n <= h))
        .collect();
    let mut out: Vec<String> = shown.iter().map(ToString::to_string).collect();
    let last = shown.last().copied().unwrap_or(low);
    match high {
        Some(h) if h > last => {
            if h > last + sub {
                out.push("...".to_string());
            }
            out.push(h.to_string());
        }
        Some(_) => {}
        None => out.push("...".to_string()),
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn check_repeat(
    cx: &LintContext<'_>,
    stem: &str,
    def: &ArgDef,
    arguments: &[ArgDef],
    min: Option<u32>,
    max: Option<u32>,
    node: SyntaxNode<'_>,
    issues: &mut Vec<Diagnostic>,
) {
    let sub = arguments.len();
    if sub == 0 {
        return;
    }
    let items = cx.mapper.arguments(node);
    let count = items.len();
    let low = min.unwrap_or(0) as usize * sub;
    let high = max.map(|m| m as usize * sub);
    let allowed = format!("[{}]", allowed_counts(sub, min, max).join(", "));
    let subs = [
        ("arg", def.name.clone()),
        ("allowed", allowed.clone()),
        ("min", low.to_string()),
        ("max", high.map_or_else(|| "unbounded".to_string(), |h| h.to_string())),
    ];
    let variant = if count % sub != 0 {
        "multiple"
    } else if count < low {
        "atLeast"
    } else if high.is_some_and(|h| count > h) {
        "atMost"
    } else {
        for chunk in items.chunks(sub) {
            check_argument_list(cx, stem, arguments, chunk, issues);
        }
        return;
    };
    let context: BTreeMap<String, String> = subs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect();
    issues.push(
        diagnostic_with_spec_severity(
            codes::REPEAT_COUNT,
            render_diagnostic_message(
                codes::REPEAT_COUNT,
                variant,
                &subs,
                format!("Repeat argument '{}' has {count} values", def.name),
            ),
            node.span(),
        )
        .with_context(context),
    );
}
