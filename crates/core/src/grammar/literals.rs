//! Argument-list parsing shared by both dialects.

use super::lexer::{TokKind, Token, is_boolean_literal, is_number_literal};
use super::tree::{NodeKind, TreeBuilder};
use seqlint_diagnostics::Span;

/// How a dialect separates list items and classifies bare words.
#[derive(Debug, Clone, Copy)]
pub(super) struct ListStyle {
    /// Items are separated by `,` rather than whitespace.
    pub(super) comma_separated: bool,
    /// Node kind for bare words that are neither numbers nor booleans.
    pub(super) bare_word: NodeKind,
}

pub(super) const SEQN_LIST: ListStyle = ListStyle {
    comma_separated: false,
    bare_word: NodeKind::Enum,
};

pub(super) const VML_LIST: ListStyle = ListStyle {
    comma_separated: true,
    bare_word: NodeKind::Identifier,
};

/// Emit literal nodes for `toks` into the currently open node.
pub(super) fn emit_literals(b: &mut TreeBuilder, toks: &[Token<'_>], style: ListStyle) {
    let mut i = 0usize;
    // An item was just emitted, so the next one needs a separator.
    let mut expect_comma = false;
    // A comma not yet followed by an item.
    let mut dangling_comma: Option<Token<'_>> = None;
    while i < toks.len() {
        let tok = toks[i];
        if style.comma_separated {
            if tok.kind == TokKind::Comma {
                if !expect_comma {
                    b.error(Span::new(tok.start, tok.end), "expected argument before ','");
                }
                expect_comma = false;
                dangling_comma = Some(tok);
                i += 1;
                continue;
            }
            if expect_comma {
                b.error(Span::empty(tok.start), "expected ','");
            }
        }
        i = emit_one(b, toks, i, style);
        expect_comma = true;
        dangling_comma = None;
    }
    if let Some(comma) = dangling_comma {
        b.error(Span::new(comma.start, comma.end), "expected argument after ','");
    }
}

/// Emit the item starting at `toks[i]`; returns the index after it.
fn emit_one(b: &mut TreeBuilder, toks: &[Token<'_>], i: usize, style: ListStyle) -> usize {
    let tok = toks[i];
    let span = Span::new(tok.start, tok.end);
    match tok.kind {
        TokKind::Word => {
            let kind = if is_number_literal(tok.text) {
                NodeKind::Number
            } else if is_boolean_literal(tok.text) {
                NodeKind::Boolean
            } else {
                style.bare_word
            };
            b.token(kind, span);
            i + 1
        }
        TokKind::String => {
            b.token(NodeKind::String, span);
            i + 1
        }
        TokKind::UnterminatedString => {
            b.error(span, "unterminated string");
            i + 1
        }
        TokKind::LBracket => {
            let Some(close) = matching_bracket(toks, i) else {
                let end = toks.last().map_or(tok.end, |t| t.end);
                b.error(Span::new(tok.start, end), "unclosed '['");
                return toks.len();
            };
            b.start_node(NodeKind::RepeatArg, tok.start);
            emit_literals(b, &toks[i + 1..close], style);
            b.finish_node(toks[close].end);
            close + 1
        }
        TokKind::RBracket | TokKind::LParen | TokKind::RParen | TokKind::Comma => {
            b.error(span, format!("unexpected '{}'", tok.text));
            i + 1
        }
        TokKind::Comment | TokKind::Newline | TokKind::Whitespace => i + 1,
    }
}

fn matching_bracket(toks: &[Token<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (j, tok) in toks.iter().enumerate().skip(open) {
        match tok.kind {
            TokKind::LBracket => depth += 1,
            TokKind::RBracket => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split off a trailing comment token.
pub(super) fn split_comment<'t, 'a>(line: &'t [Token<'a>]) -> (&'t [Token<'a>], Option<Token<'a>>) {
    match line.split_last() {
        Some((last, rest)) if last.kind == TokKind::Comment => (rest, Some(*last)),
        _ => (line, None),
    }
}

/// Span covering a non-empty token slice.
pub(super) fn tokens_span(toks: &[Token<'_>]) -> Option<Span> {
    Some(Span::new(toks.first()?.start, toks.last()?.end))
}
