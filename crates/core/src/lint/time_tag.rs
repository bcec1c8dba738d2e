use super::context::{LintContext, Section};
use super::ctx;
use super::diagnostics_util::{diagnostic_with_spec_severity, render_diagnostic_message};
use crate::grammar::{NodeKind, SyntaxNode};
use crate::time::{TimeError, parse_time_tag};
use seqlint_diagnostics::{Diagnostic, FixAction, Span, codes};
use std::collections::BTreeMap;

/// Check the time tag of every command statement and request.
pub(super) fn check_time_tags(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    for stmt in cx.mapper.statements(cx.tree) {
        check_statement(cx, stmt, false, issues);
    }
    for request in cx.nodes_of(NodeKind::Request) {
        check_statement(cx, request, true, issues);
    }
}

fn check_statement(
    cx: &LintContext<'_>,
    stmt: SyntaxNode<'_>,
    epoch_allowed: bool,
    issues: &mut Vec<Diagnostic>,
) {
    let section = Section::of(stmt);
    let tag = cx.mapper.time_tag(stmt);
    if section != Section::Standard {
        if let Some(tag) = tag {
            issues.push(tag_not_allowed(cx, section, tag));
        }
        return;
    }
    let Some(tag) = tag else {
        issues.push(missing_tag(stmt));
        return;
    };
    let Some(form) = tag.children().find(|c| c.kind().is_time_form()) else {
        return;
    };
    if form.kind() == NodeKind::TimeEpoch && !epoch_allowed {
        issues.push(diagnostic_with_spec_severity(
            codes::EPOCH_NOT_ALLOWED,
            render_diagnostic_message(
                codes::EPOCH_NOT_ALLOWED,
                "default",
                &[],
                "Epoch time tags are only allowed on requests".into(),
            ),
            form.span(),
        ));
        return;
    }
    match parse_time_tag(form.text()) {
        Ok(parsed) => {
            if cx.config.check_time_balance && !parsed.is_balanced() {
                let balanced = parsed.balanced().to_string();
                let value = form.text();
                issues.push(
                    diagnostic_with_spec_severity(
                        codes::UNBALANCED_TIME,
                        render_diagnostic_message(
                            codes::UNBALANCED_TIME,
                            "default",
                            &[("value", value.to_string()), ("balanced", balanced.clone())],
                            format!("Time tag '{value}' is not balanced, use '{balanced}'"),
                        ),
                        form.span(),
                    )
                    .with_fix(FixAction::new(
                        format!("Change to {balanced}"),
                        form.span(),
                        balanced.clone(),
                    ))
                    .with_context(ctx!("value" => value, "balanced" => balanced)),
                );
            }
        }
        Err(TimeError::Invalid(kind)) => {
            let value = form.text();
            issues.push(
                diagnostic_with_spec_severity(
                    codes::INVALID_TIME_TAG,
                    render_diagnostic_message(
                        codes::INVALID_TIME_TAG,
                        "default",
                        &[("form", kind.to_string()), ("value", value.to_string())],
                        format!("Invalid {kind} time tag '{value}'"),
                    ),
                    form.span(),
                )
                .with_context(ctx!("form" => kind.as_str(), "value" => value)),
            );
        }
        Err(err @ TimeError::Overflow(kind)) => {
            let max = kind.max().unwrap_or_default();
            issues.push(
                diagnostic_with_spec_severity(
                    codes::TIME_TAG_OVERFLOW,
                    render_diagnostic_message(
                        codes::TIME_TAG_OVERFLOW,
                        "default",
                        &[("form", kind.to_string()), ("max", max.to_string())],
                        format!("Time error: {err}"),
                    ),
                    form.span(),
                )
                .with_context(ctx!("form" => kind.as_str(), "max" => max)),
            );
        }
    }
}

fn missing_tag(stmt: SyntaxNode<'_>) -> Diagnostic {
    let at = stmt.from();
    diagnostic_with_spec_severity(
        codes::MISSING_TIME_TAG,
        render_diagnostic_message(codes::MISSING_TIME_TAG, "default", &[], "Missing time tag".into()),
        Span::new(at, first_token_end(stmt)),
    )
    .with_fixes([
        FixAction::insert("Insert command complete time tag", at, "C "),
        FixAction::insert("Insert relative zero time tag", at, "R00:00:00 "),
    ])
}

/// End of the first child of a statement, or the statement end.
fn first_token_end(stmt: SyntaxNode<'_>) -> usize {
    stmt.descendants()
        .skip(1)
        .find(|n| n.children().next().is_none())
        .map_or(stmt.to(), |n| n.to())
}

fn tag_not_allowed(cx: &LintContext<'_>, section: Section, tag: SyntaxNode<'_>) -> Diagnostic {
    let category = section.as_str();
    let rest = &cx.source()[tag.to()..];
    let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    diagnostic_with_spec_severity(
        codes::TIME_TAG_NOT_ALLOWED,
        render_diagnostic_message(
            codes::TIME_TAG_NOT_ALLOWED,
            "default",
            &[("category", category.to_string())],
            format!("{category} commands cannot have a time tag"),
        ),
        tag.span(),
    )
    .with_fix(FixAction::delete(
        "Remove time tag",
        Span::new(tag.from(), tag.to() + trailing),
    ))
    .with_context(ctx!("category" => category))
}
