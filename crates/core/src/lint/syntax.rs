use super::context::LintContext;
use super::ctx;
use super::diagnostics_util::{diagnostic_with_spec_severity, render_diagnostic_message};
use crate::grammar::NodeKind;
use seqlint_diagnostics::{Diagnostic, codes};
use std::collections::BTreeMap;

/// Report parser error nodes, at most `max_syntax_errors` of them.
pub(super) fn check_syntax(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    for node in cx
        .nodes_of(NodeKind::Error)
        .take(cx.config.max_syntax_errors)
    {
        let detail = node.error_message().unwrap_or("unexpected input");
        issues.push(
            diagnostic_with_spec_severity(
                codes::SYNTAX_ERROR,
                render_diagnostic_message(
                    codes::SYNTAX_ERROR,
                    "default",
                    &[("detail", detail.to_string())],
                    format!("Syntax error: {detail}"),
                ),
                node.span(),
            )
            .with_context(ctx!("detail" => detail)),
        );
    }
}
