use super::context::{LintContext, VariableType};
use super::ctx;
use super::diagnostics_util::{diagnostic_with_spec_severity, render_diagnostic_message};
use super::suggest::nearest;
use crate::grammar::lexer::{parse_number, unquote};
use crate::grammar::{NodeKind, SyntaxNode};
use seqlint_diagnostics::{Diagnostic, FixAction, codes};
use std::collections::{BTreeMap, HashSet};

/// Check `@INPUT_PARAMS` / `@LOCALS` blocks and every variable declaration.
pub(super) fn check_declarations(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    for kind in [NodeKind::ParameterDeclaration, NodeKind::LocalDeclaration] {
        for block in cx.nodes_of(kind) {
            if block.child(NodeKind::VariableDeclaration).is_some() {
                continue;
            }
            let Some(name) = block.child(NodeKind::DirectiveName) else {
                continue;
            };
            let directive = name.text().trim_start_matches('@');
            issues.push(
                diagnostic_with_spec_severity(
                    codes::EMPTY_DECLARATION,
                    render_diagnostic_message(
                        codes::EMPTY_DECLARATION,
                        "default",
                        &[("directive", directive.to_string())],
                        format!("@{directive} must declare at least one variable"),
                    ),
                    name.span(),
                )
                .with_context(ctx!("directive" => directive)),
            );
        }
    }

    let mut declared: HashSet<&str> = HashSet::new();
    for decl in cx.nodes_of(NodeKind::VariableDeclaration) {
        let Some(name) = decl.child(NodeKind::VariableName) else {
            continue;
        };
        if !declared.insert(name.text()) {
            issues.push(
                diagnostic_with_spec_severity(
                    codes::DUPLICATE_VARIABLE,
                    render_diagnostic_message(
                        codes::DUPLICATE_VARIABLE,
                        "default",
                        &[("name", name.text().to_string())],
                        format!("Variable '{}' is already declared", name.text()),
                    ),
                    name.span(),
                )
                .with_context(ctx!("name" => name.text())),
            );
        }
        check_variable(cx, decl, name, issues);
    }
}

fn check_variable(
    cx: &LintContext<'_>,
    decl: SyntaxNode<'_>,
    name: SyntaxNode<'_>,
    issues: &mut Vec<Diagnostic>,
) {
    let var = name.text();
    let Some(type_node) = decl.child(NodeKind::VariableType) else {
        issues.push(
            diagnostic_with_spec_severity(
                codes::INVALID_VARIABLE_TYPE,
                render_diagnostic_message(
                    codes::INVALID_VARIABLE_TYPE,
                    "missing",
                    &[("name", var.to_string())],
                    format!("Missing type for '{var}'"),
                ),
                name.span(),
            )
            .with_context(ctx!("name" => var)),
        );
        return;
    };
    let Some(ty) = VariableType::parse(type_node.text()) else {
        let written = type_node.text();
        let fixes = nearest(written, VariableType::NAMES, cx.distance, 1)
            .into_iter()
            .map(|s| FixAction::new(format!("Change to {s}"), type_node.span(), s));
        issues.push(
            diagnostic_with_spec_severity(
                codes::INVALID_VARIABLE_TYPE,
                render_diagnostic_message(
                    codes::INVALID_VARIABLE_TYPE,
                    "default",
                    &[("name", var.to_string()), ("type", written.to_string())],
                    format!("Invalid type '{written}' for '{var}'"),
                ),
                type_node.span(),
            )
            .with_fixes(fixes)
            .with_context(ctx!("name" => var, "type" => written)),
        );
        return;
    };

    check_enum_name(cx, decl, name, ty, issues);
    if let Some(range) = decl.child(NodeKind::VariableRange) {
        check_range(var, ty, range, issues);
    }
}

fn check_enum_name(
    cx: &LintContext<'_>,
    decl: SyntaxNode<'_>,
    name: SyntaxNode<'_>,
    ty: VariableType,
    issues: &mut Vec<Diagnostic>,
) {
    let var = name.text();
    let enum_name = decl.child(NodeKind::EnumName);
    // Only seq-n declaration blocks spell enum names.
    let in_block = decl.parent().is_some_and(|p| {
        matches!(
            p.kind(),
            NodeKind::ParameterDeclaration | NodeKind::LocalDeclaration
        )
    });
    match (ty, enum_name) {
        (VariableType::Enum, None) if in_block => issues.push(
            diagnostic_with_spec_severity(
                codes::ENUM_NAME_MISMATCH,
                render_diagnostic_message(
                    codes::ENUM_NAME_MISMATCH,
                    "required",
                    &[("name", var.to_string())],
                    format!("ENUM variable '{var}' requires an enum name"),
                ),
                name.span(),
            )
            .with_context(ctx!("name" => var, "type" => ty.to_string())),
        ),
        (VariableType::Enum, Some(enum_node)) => {
            let Some(dictionary) = cx.dictionary else {
                return;
            };
            if dictionary.enum_def(enum_node.text()).is_some() {
                return;
            }
            let enum_text = enum_node.text();
            let fixes = nearest(
                enum_text,
                dictionary.enums.iter().map(|e| e.name.as_str()),
                cx.distance,
                1,
            )
            .into_iter()
            .map(|s| FixAction::new(format!("Change to {s}"), enum_node.span(), s));
            issues.push(
                diagnostic_with_spec_severity(
                    codes::UNKNOWN_ENUM,
                    render_diagnostic_message(
                        codes::UNKNOWN_ENUM,
                        "default",
                        &[("name", var.to_string()), ("enum", enum_text.to_string())],
                        format!("Unknown enum '{enum_text}' for variable '{var}'"),
                    ),
                    enum_node.span(),
                )
                .with_fixes(fixes)
                .with_context(ctx!("name" => var, "enum" => enum_text)),
            );
        }
        (_, Some(enum_node)) if ty != VariableType::Enum => issues.push(
            diagnostic_with_spec_severity(
                codes::ENUM_NAME_MISMATCH,
                render_diagnostic_message(
                    codes::ENUM_NAME_MISMATCH,
                    "forbidden",
                    &[("name", var.to_string()), ("type", ty.to_string())],
                    format!("Enum name is only allowed for ENUM variables, '{var}' is {ty}"),
                ),
                enum_node.span(),
            )
            .with_context(ctx!("name" => var, "type" => ty.to_string())),
        ),
        _ => {}
    }
}

/// Numeric ranges read `"min...max"`; STRING variables take no range.
fn check_range(var: &str, ty: VariableType, range: SyntaxNode<'_>, issues: &mut Vec<Diagnostic>) {
    let written = range.text();
    let variant = match ty {
        VariableType::String => "string",
        VariableType::Enum => return,
        _ => match unquote(written).split_once("...") {
            Some((lo, hi)) => match (parse_number(lo.trim()), parse_number(hi.trim())) {
                (Some(lo), Some(hi)) if lo <= hi => return,
                (Some(_), Some(_)) => "order",
                _ => "format",
            },
            None => "format",
        },
    };
    issues.push(
        diagnostic_with_spec_severity(
            codes::INVALID_VARIABLE_RANGE,
            render_diagnostic_message(
                codes::INVALID_VARIABLE_RANGE,
                variant,
                &[("name", var.to_string()), ("range", written.to_string())],
                format!("Invalid range {written} for '{var}'"),
            ),
            range.span(),
        )
        .with_context(ctx!("name" => var, "range" => written)),
    );
}
