use super::context::{LintContext, Section};
use super::ctx;
use super::diagnostics_util::{diagnostic_with_spec_severity, render_diagnostic_message};
use super::suggest::nearest;
use crate::grammar::{NodeKind, SyntaxNode};
use seqlint_diagnostics::{Diagnostic, FixAction, Span, codes};
use seqlint_dictionary::CommandCategory;
use std::collections::BTreeMap;

/// Every directive the seq-n grammar recognizes.
pub(super) const KNOWN_DIRECTIVES: &[&str] = &[
    "@ID",
    "@INPUT_PARAMS_BEGIN",
    "@INPUT_PARAMS_END",
    "@LOCALS_BEGIN",
    "@LOCALS_END",
    "@LOAD_AND_GO",
    "@IMMEDIATE",
    "@HARDWARE",
    "@METADATA",
    "@MODEL",
    "@REQUEST_BEGIN",
    "@REQUEST_END",
];

/// Directives that may appear at most once, with the name used in messages.
const SINGLETONS: [(NodeKind, &str); 3] = [
    (NodeKind::IdDeclaration, "ID"),
    (NodeKind::LocalDeclaration, "LOCALS"),
    (NodeKind::ParameterDeclaration, "INPUT_PARAMS"),
];

/// Top-level directive checks: cardinality, `@ID` shape, unknown directives,
/// and command-category rules.
pub(super) fn check_directives(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    check_singletons(cx, issues);
    check_ids(cx, issues);
    check_unknown(cx, issues);
    check_categories(cx, issues);
}

fn directive_name(node: SyntaxNode<'_>) -> Span {
    node.child(NodeKind::DirectiveName)
        .map_or(node.span(), |n| n.span())
}

fn check_singletons(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    for (kind, directive) in SINGLETONS {
        for extra in cx.nodes_of(kind).skip(1) {
            issues.push(
                diagnostic_with_spec_severity(
                    codes::DUPLICATE_DIRECTIVE,
                    render_diagnostic_message(
                        codes::DUPLICATE_DIRECTIVE,
                        "default",
                        &[("directive", directive.to_string())],
                        format!("maximum of one {directive} directive per sequence"),
                    ),
                    directive_name(extra),
                )
                .with_context(ctx!("directive" => directive)),
            );
        }
    }
}

fn check_ids(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    for id in cx.nodes_of(NodeKind::IdDeclaration) {
        let values: Vec<_> = id.children().filter(|c| c.kind().is_literal()).collect();
        match values.as_slice() {
            [] => issues.push(
                diagnostic_with_spec_severity(
                    codes::MISSING_ID,
                    render_diagnostic_message(codes::MISSING_ID, "default", &[], "Missing @ID value".into()),
                    directive_name(id),
                )
                .with_fix(FixAction::insert(
                    "Insert sequence name",
                    id.to(),
                    " \"sequence.name\"",
                )),
            ),
            [value] if value.kind() == NodeKind::String => {}
            _ => {
                let span = Span::new(values[0].from(), values[values.len() - 1].to());
                let text = &cx.source()[span.start..span.end];
                let quoted = format!("\"{}\"", text.trim_matches('"'));
                issues.push(
                    diagnostic_with_spec_severity(
                        codes::INVALID_ID,
                        render_diagnostic_message(
                            codes::INVALID_ID,
                            "default",
                            &[("value", text.to_string())],
                            "@ID directives must include a double quoted string".into(),
                        ),
                        span,
                    )
                    .with_fix(FixAction::new(format!("Change to {quoted}"), span, quoted))
                    .with_context(ctx!("value" => text)),
                );
            }
        }
    }
}

fn check_unknown(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    for directive in cx.nodes_of(NodeKind::GenericDirective) {
        let Some(name) = directive.child(NodeKind::DirectiveName) else {
            continue;
        };
        let fixes = nearest(name.text(), KNOWN_DIRECTIVES.iter().copied(), cx.distance, 1)
            .into_iter()
            .map(|s| FixAction::new(format!("Change to {s}"), name.span(), s));
        issues.push(
            diagnostic_with_spec_severity(
                codes::UNKNOWN_DIRECTIVE,
                render_diagnostic_message(
                    codes::UNKNOWN_DIRECTIVE,
                    "default",
                    &[("directive", name.text().to_string())],
                    format!("Unknown directive '{}'", name.text()),
                ),
                name.span(),
            )
            .with_fixes(fixes)
            .with_context(ctx!("directive" => name.text())),
        );
    }
}

// ─── Command categories ───

fn check_categories(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    let commands: Vec<_> = cx
        .mapper
        .statements(cx.tree)
        .into_iter()
        .filter(|&stmt| cx.mapper.block_keyword(stmt).is_none())
        .collect();

    // Mixing: report the first command of each category after the first one seen.
    let mut seen: Vec<Section> = Vec::new();
    for &cmd in &commands {
        let section = Section::of(cmd);
        if seen.contains(&section) {
            continue;
        }
        if let Some(&first) = seen.first() {
            issues.push(mixed_commands(cx, first, section, cmd));
        }
        seen.push(section);
    }

    if let Some(load_and_go) = cx.nodes_of(NodeKind::LoadAndGoDirective).next()
        && let Some(&other) = seen.iter().find(|s| **s != Section::Standard)
    {
        let category = other.as_str();
        issues.push(
            diagnostic_with_spec_severity(
                codes::LOAD_AND_GO_CONFLICT,
                render_diagnostic_message(
                    codes::LOAD_AND_GO_CONFLICT,
                    "default",
                    &[("category", category.to_string())],
                    format!("@LOAD_AND_GO cannot be used with {category} commands"),
                ),
                directive_name(load_and_go),
            )
            .with_context(ctx!("category" => category)),
        );
    }

    for &cmd in &commands {
        let section = Section::of(cmd);
        if section != Section::Standard {
            check_attachments(cx, section, cmd, issues);
        }
        check_dictionary_category(cx, section, cmd, issues);
    }
}

fn mixed_commands(
    cx: &LintContext<'_>,
    first: Section,
    second: Section,
    cmd: SyntaxNode<'_>,
) -> Diagnostic {
    let span = cx.mapper.name_node(cmd).map_or(cmd.span(), |n| n.span());
    let (a, b) = (first.as_str(), second.as_str());
    diagnostic_with_spec_severity(
        codes::MIXED_COMMAND_TYPES,
        render_diagnostic_message(
            codes::MIXED_COMMAND_TYPES,
            "default",
            &[("first", a.to_string()), ("second", b.to_string())],
            format!("Sequence cannot mix different command types ({a} and {b})"),
        ),
        span,
    )
    .with_context(ctx!("first" => a, "second" => b))
}

fn check_attachments(
    cx: &LintContext<'_>,
    section: Section,
    cmd: SyntaxNode<'_>,
    issues: &mut Vec<Diagnostic>,
) {
    let category = section.as_str();
    for (kind, attachment) in [(NodeKind::Metadata, "metadata"), (NodeKind::Models, "models")] {
        for group in cmd.children_of(kind) {
            issues.push(
                diagnostic_with_spec_severity(
                    codes::ATTACHMENT_NOT_ALLOWED,
                    render_diagnostic_message(
                        codes::ATTACHMENT_NOT_ALLOWED,
                        "default",
                        &[
                            ("category", category.to_string()),
                            ("attachment", attachment.to_string()),
                        ],
                        format!("{category} commands cannot have {attachment}"),
                    ),
                    group.span(),
                )
                .with_fix(FixAction::delete(
                    format!("Remove {attachment}"),
                    cx.line_span(group.span()),
                ))
                .with_context(ctx!("category" => category, "attachment" => attachment)),
            );
        }
    }
}

fn check_dictionary_category(
    cx: &LintContext<'_>,
    section: Section,
    cmd: SyntaxNode<'_>,
    issues: &mut Vec<Diagnostic>,
) {
    let (Some(dictionary), Some(stem)) = (cx.dictionary, cx.mapper.name_node(cmd)) else {
        return;
    };
    let Some(def) = dictionary.command(stem.text()) else {
        return;
    };
    let variant = match (def.category, section) {
        (CommandCategory::Hardware, Section::Hardware) => return,
        (CommandCategory::Hardware, _) => "hardwareOutside",
        (CommandCategory::Flight, Section::Hardware) => "flightInside",
        (CommandCategory::Flight, _) => return,
    };
    issues.push(
        diagnostic_with_spec_severity(
            codes::COMMAND_CATEGORY,
            render_diagnostic_message(
                codes::COMMAND_CATEGORY,
                variant,
                &[("stem", def.stem.clone())],
                format!("'{}' is in the wrong command section", def.stem),
            ),
            stem.span(),
        )
        .with_context(ctx!("stem" => def.stem.as_str(), "category" => def.category.to_string())),
    );
}
