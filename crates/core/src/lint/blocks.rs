use super::context::LintContext;
use super::ctx;
use super::diagnostics_util::{diagnostic_with_spec_severity, render_diagnostic_message};
use crate::blocks::BlockMap;
use seqlint_diagnostics::{Diagnostic, FixAction, Span, codes};
use std::collections::{BTreeMap, HashMap};

/// Report dangling block pairings.
pub(super) fn check_blocks(cx: &LintContext<'_>, blocks: &BlockMap, issues: &mut Vec<Diagnostic>) {
    if blocks.values().all(|p| p.is_complete()) {
        return;
    }
    let statements = cx.mapper.statements(cx.tree);
    let keyword_spans: HashMap<usize, Span> = statements
        .iter()
        .filter_map(|s| Some((s.from(), cx.mapper.block_keyword_node(*s)?.span())))
        .collect();
    let append_at = statements.last().map_or(cx.source().len(), |s| s.to());

    for (key, pairing) in blocks {
        let span = keyword_spans.get(key).copied();
        let keyword = pairing.keyword;
        if let Some(start) = pairing.start.filter(|_| pairing.end.is_none()) {
            let closing = keyword.terminator();
            let insert = format!("\n{}", cx.mapper.closing_statement(closing));
            issues.push(
                diagnostic_with_spec_severity(
                    codes::UNCLOSED_BLOCK,
                    render_diagnostic_message(
                        codes::UNCLOSED_BLOCK,
                        "default",
                        &[
                            ("keyword", keyword.to_string()),
                            ("closing", closing.to_string()),
                        ],
                        format!("{keyword} block is not closed"),
                    ),
                    span.unwrap_or(start.statement),
                )
                .with_fix(FixAction::insert(format!("Insert {closing}"), append_at, insert))
                .with_context(ctx!("keyword" => keyword.as_str(), "closing" => closing.as_str())),
            );
        } else if let Some(end) = pairing.end.filter(|_| pairing.start.is_none()) {
            issues.push(
                diagnostic_with_spec_severity(
                    codes::UNMATCHED_BLOCK_CLOSE,
                    render_diagnostic_message(
                        codes::UNMATCHED_BLOCK_CLOSE,
                        "default",
                        &[("keyword", keyword.to_string())],
                        format!("{keyword} has no matching opening statement"),
                    ),
                    span.unwrap_or(end.statement),
                )
                .with_fix(FixAction::delete(
                    format!("Remove {keyword}"),
                    cx.line_span(end.statement),
                ))
                .with_context(ctx!("keyword" => keyword.as_str())),
            );
        }
    }
}
