use super::context::LintContext;
use super::ctx;
use super::diagnostics_util::{diagnostic_with_spec_severity, render_diagnostic_message};
use crate::grammar::{NodeKind, SyntaxNode};
use seqlint_diagnostics::{Diagnostic, FixAction, Span, codes};
use std::collections::BTreeMap;

/// Expected field shape of one attachment entry.
#[derive(Clone, Copy)]
enum Field {
    String,
    Scalar,
}

impl Field {
    fn accepts(self, kind: NodeKind) -> bool {
        match self {
            Field::String => kind == NodeKind::String,
            Field::Scalar => matches!(kind, NodeKind::String | NodeKind::Number | NodeKind::Boolean),
        }
    }
}

/// `@METADATA "key" "value"`
const METADATA_SHAPE: &[Field] = &[Field::String, Field::String];
/// `@MODEL "variable" value "offset"`
const MODEL_SHAPE: &[Field] = &[Field::String, Field::Scalar, Field::String];

/// Check the field shape of every `@METADATA` and `@MODEL` entry.
pub(super) fn check_attachments(cx: &LintContext<'_>, issues: &mut Vec<Diagnostic>) {
    for entry in cx.nodes_of(NodeKind::MetaEntry) {
        check_entry(entry, METADATA_SHAPE, codes::MALFORMED_METADATA, issues);
    }
    for entry in cx.nodes_of(NodeKind::Model) {
        check_entry(entry, MODEL_SHAPE, codes::MALFORMED_MODEL, issues);
    }
}

fn check_entry(
    entry: SyntaxNode<'_>,
    shape: &[Field],
    code: &'static str,
    issues: &mut Vec<Diagnostic>,
) {
    let fields: Vec<_> = entry.children().filter(|c| c.kind().is_literal()).collect();
    let name_end = entry
        .child(NodeKind::DirectiveName)
        .map_or(entry.from(), |n| n.to());

    if fields.len() > shape.len() {
        let from = fields[shape.len() - 1].to();
        let to = fields[fields.len() - 1].to();
        let extra = Span::new(fields[shape.len()].from(), to);
        issues.push(
            malformed(code, "too many fields", extra)
                .with_fix(FixAction::delete("Remove extra fields", Span::new(from, to))),
        );
    } else if fields.len() < shape.len() {
        let at = fields.last().map_or(name_end, |f| f.to());
        issues.push(malformed(code, "missing field", Span::new(entry.from(), at)));
    }

    for (field, expected) in fields.iter().zip(shape) {
        if !expected.accepts(field.kind()) {
            issues.push(malformed(code, "wrong field type", field.span()));
        }
    }
}

fn malformed(code: &'static str, problem: &str, span: Span) -> Diagnostic {
    let directive = if code == codes::MALFORMED_MODEL { "@MODEL" } else { "@METADATA" };
    diagnostic_with_spec_severity(
        code,
        render_diagnostic_message(
            code,
            "default",
            &[("problem", problem.to_string())],
            format!("{directive} {problem}"),
        ),
        span,
    )
    .with_context(ctx!("problem" => problem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_seqn;

    fn problems(src: &str) -> Vec<String> {
        let tree = parse_seqn(src);
        let mut issues = Vec::new();
        for entry in tree.root().descendants() {
            match entry.kind() {
                NodeKind::MetaEntry => check_entry(entry, METADATA_SHAPE, codes::MALFORMED_METADATA, &mut issues),
                NodeKind::Model => check_entry(entry, MODEL_SHAPE, codes::MALFORMED_MODEL, &mut issues),
                _ => {}
            }
        }
        issues.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn well_formed_entries() {
        let src = "C STEM\n@METADATA \"k\" \"v\"\n@MODEL \"var\" 5 \"00:00:00\"\n";
        assert!(problems(src).is_empty());
    }

    #[test]
    fn distinguishes_problems() {
        assert_eq!(problems("C STEM\n@METADATA \"k\" \"v\" \"x\"\n"), ["@METADATA too many fields"]);
        assert_eq!(problems("C STEM\n@METADATA \"k\"\n"), ["@METADATA missing field"]);
        assert_eq!(problems("C STEM\n@MODEL \"var\" 5 7\n"), ["@MODEL wrong field type"]);
    }
}
