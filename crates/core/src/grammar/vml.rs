//! Reference line parser for VML sources.
//!
//! Recognizes the module/sequence skeleton, header declarations and body
//! statements (`ISSUE`, assignments, control flow). Expressions are kept as
//! opaque `Expression` nodes.

use super::lexer::{TokKind, Token, split_lines, time_tag_kind, tokenize};
use super::literals::{VML_LIST, emit_literals, split_comment, tokens_span};
use super::tree::{NodeKind, SyntaxTree, TreeBuilder};
use crate::blocks::BlockKeyword;
use seqlint_diagnostics::Span;

/// Parse VML source text into a [`SyntaxTree`] rooted at `Module`.
pub fn parse_vml(source: &str) -> SyntaxTree {
    let toks = tokenize(source, b';');
    let mut b = TreeBuilder::new(source, NodeKind::Module);
    let mut region = Region::Outside;
    let mut last_end = 0usize;

    for line in split_lines(&toks).into_iter().filter(|l| !l.is_empty()) {
        let (body, comment) = split_comment(&line);
        let Some(first) = body.first().copied() else {
            if let Some(c) = comment {
                b.token(NodeKind::LineComment, span_of(c));
            }
            continue;
        };
        match (region, first.text) {
            (Region::Header, "BODY") | (Region::Outside, "BODY") => {
                if region == Region::Header {
                    b.finish_node(last_end);
                }
                b.start_node(NodeKind::Body, first.start);
                keyword_line(&mut b, body);
                region = Region::Body;
            }
            (Region::Body, "END_BODY") => {
                keyword_line(&mut b, body);
                b.finish_node(first.end.max(body_end(body)));
                region = Region::Outside;
            }
            (Region::Body, _) => statement(&mut b, body),
            (Region::Outside, "SEQUENCE") => {
                b.start_node(NodeKind::Header, first.start);
                b.token(NodeKind::Keyword, span_of(first));
                match &body[1..] {
                    [name] if name.kind == TokKind::Word => {
                        b.token(NodeKind::Identifier, span_of(*name));
                    }
                    rest => {
                        let span = tokens_span(rest).unwrap_or(Span::empty(first.end));
                        b.error(span, "expected sequence name");
                    }
                }
                region = Region::Header;
            }
            (Region::Header, "DECLARE" | "INPUT") => declaration(&mut b, body),
            (_, "MODULE" | "END_MODULE" | "END_SEQUENCE") => {
                if region == Region::Header {
                    b.finish_node(last_end);
                    region = Region::Outside;
                }
                keyword_line(&mut b, body);
            }
            _ => {
                let span = tokens_span(body).unwrap_or(span_of(first));
                b.error(span, format!("unexpected '{}'", first.text));
            }
        }
        if let Some(c) = comment {
            b.token(NodeKind::LineComment, span_of(c));
        }
        last_end = line.last().map_or(last_end, |t| t.end);
    }
    match region {
        Region::Body => {
            b.error(Span::empty(last_end), "missing END_BODY");
            b.finish_node(last_end);
        }
        Region::Header => b.finish_node(last_end),
        Region::Outside => {}
    }
    b.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Outside,
    Header,
    Body,
}

fn span_of(tok: Token<'_>) -> Span {
    Span::new(tok.start, tok.end)
}

fn body_end(body: &[Token<'_>]) -> usize {
    body.last().map_or(0, |t| t.end)
}

/// A line holding a single keyword.
fn keyword_line(b: &mut TreeBuilder, body: &[Token<'_>]) {
    b.token(NodeKind::Keyword, span_of(body[0]));
    if let Some(span) = tokens_span(&body[1..]) {
        b.error(span, format!("unexpected tokens after {}", body[0].text));
    }
}

/// `DECLARE TYPE name [:= value]` / `INPUT TYPE name [:= value]`
fn declaration(b: &mut TreeBuilder, body: &[Token<'_>]) {
    b.start_node(NodeKind::VariableDeclaration, body[0].start);
    b.token(NodeKind::Keyword, span_of(body[0]));
    match &body[1..] {
        [ty, name, rest @ ..] if ty.kind == TokKind::Word && name.kind == TokKind::Word => {
            b.token(NodeKind::VariableType, span_of(*ty));
            b.token(NodeKind::VariableName, span_of(*name));
            match rest {
                [] => {}
                [assign, value @ ..] if assign.text == ":=" && !value.is_empty() => {
                    b.token(NodeKind::Keyword, span_of(*assign));
                    emit_literals(b, value, VML_LIST);
                }
                _ => {
                    let span = tokens_span(rest).unwrap_or(Span::empty(name.end));
                    b.error(span, "expected ':= value'");
                }
            }
        }
        rest => {
            let span = tokens_span(rest).unwrap_or(Span::empty(body[0].end));
            b.error(span, "expected type and variable name");
        }
    }
    b.finish_node(body_end(body));
}

/// One body line: `[timetag] ISSUE STEM args`, `[timetag] name := expr`,
/// or `[timetag] KEYWORD [expr] [THEN|DO]`.
fn statement(b: &mut TreeBuilder, body: &[Token<'_>]) {
    b.start_node(NodeKind::Statement, body[0].start);
    let mut rest = body;
    if let Some(kind) = time_tag_kind(body[0].text).filter(|_| body[0].kind == TokKind::Word) {
        b.start_node(NodeKind::TimeTag, body[0].start);
        b.token(kind, span_of(body[0]));
        b.finish_node(body[0].end);
        rest = &body[1..];
    }
    match rest {
        [] => {
            b.error(Span::empty(body[0].end), "expected statement after time tag");
        }
        [issue, tail @ ..] if issue.text == "ISSUE" => {
            b.start_node(NodeKind::Issue, issue.start);
            b.token(NodeKind::Keyword, span_of(*issue));
            match tail.split_first() {
                Some((stem, args)) if stem.kind == TokKind::Word => {
                    b.token(NodeKind::Stem, span_of(*stem));
                    let from = args.first().map_or(stem.end, |t| t.start);
                    let to = args.last().map_or(stem.end, |t| t.end);
                    b.start_node(NodeKind::Args, from);
                    emit_literals(b, args, VML_LIST);
                    b.finish_node(to);
                }
                _ => {
                    let span = tokens_span(tail).unwrap_or(Span::empty(issue.end));
                    b.error(span, "expected command stem after ISSUE");
                }
            }
            b.finish_node(body_end(body));
        }
        [kw, tail @ ..] if BlockKeyword::from_keyword(kw.text).is_some() => {
            block_statement(b, *kw, tail);
        }
        [name, assign, expr @ ..] if assign.text == ":=" => {
            b.start_node(NodeKind::Assignment, name.start);
            b.token(NodeKind::Identifier, span_of(*name));
            b.token(NodeKind::Keyword, span_of(*assign));
            if let Some(span) = tokens_span(expr) {
                b.token(NodeKind::Expression, span);
            } else {
                b.error(Span::empty(assign.end), "expected expression after ':='");
            }
            b.finish_node(body_end(body));
        }
        _ => {
            let span = tokens_span(rest).unwrap_or(span_of(body[0]));
            b.error(span, "expected ISSUE, assignment or control statement");
        }
    }
    b.finish_node(body_end(body));
}

fn block_statement(b: &mut TreeBuilder, kw: Token<'_>, tail: &[Token<'_>]) {
    let end = tail.last().map_or(kw.end, |t| t.end);
    b.start_node(NodeKind::BlockStatement, kw.start);
    b.token(NodeKind::Keyword, span_of(kw));
    // Conditions end with THEN, loops with DO.
    let terminator = match kw.text {
        "IF" | "ELSE_IF" => Some("THEN"),
        "WHILE" | "FOR" => Some("DO"),
        _ => None,
    };
    match terminator {
        Some(word) => {
            let (expr, last) = match tail.split_last() {
                Some((last, expr)) if last.text == word => (expr, Some(*last)),
                _ => (tail, None),
            };
            match tokens_span(expr) {
                Some(span) => {
                    b.token(NodeKind::Expression, span);
                }
                None => {
                    b.error(Span::empty(kw.end), format!("expected condition after {}", kw.text));
                }
            }
            match last {
                Some(t) => {
                    b.token(NodeKind::Keyword, span_of(t));
                }
                None => {
                    b.error(Span::empty(end), format!("expected {word}"));
                }
            }
        }
        None => {
            if let Some(span) = tokens_span(tail) {
                b.token(NodeKind::Expression, span);
            }
        }
    }
    b.finish_node(end);
}
