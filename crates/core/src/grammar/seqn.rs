//! Reference line parser for seq-n sources.
//!
//! Never fails: malformed lines produce `Error` nodes and parsing resumes on
//! the next line.

use super::lexer::{TokKind, Token, split_lines, time_tag_kind, tokenize};
use super::literals::{SEQN_LIST, emit_literals, split_comment, tokens_span};
use super::tree::{NodeKind, SyntaxTree, TreeBuilder};
use seqlint_diagnostics::Span;

/// Directive that closes an `@INPUT_PARAMS_BEGIN` block.
pub const INPUT_PARAMS_END: &str = "@INPUT_PARAMS_END";
/// Directive that closes an `@LOCALS_BEGIN` block.
pub const LOCALS_END: &str = "@LOCALS_END";

/// Parse seq-n source text into a [`SyntaxTree`] rooted at `Sequence`.
pub fn parse_seqn(source: &str) -> SyntaxTree {
    let toks = tokenize(source, b'#');
    let lines: Vec<Vec<Token<'_>>> = split_lines(&toks)
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect();
    let mut parser = Parser {
        b: TreeBuilder::new(source, NodeKind::Sequence),
        lines,
        pos: 0,
        section: None,
        last_end: 0,
    };
    parser.parse();
    parser.b.finish()
}

// ─── Parser ─────────────────────────────────────────────────────────────────

struct Parser<'a> {
    b: TreeBuilder,
    lines: Vec<Vec<Token<'a>>>,
    pos: usize,
    /// Command section currently open, if any.
    section: Option<NodeKind>,
    /// End offset of the last emitted line.
    last_end: usize,
}

impl<'a> Parser<'a> {
    fn parse(&mut self) {
        while let Some(line) = self.next_line() {
            self.parse_line(&line);
        }
        self.close_section();
    }

    // ── Line navigation ─────────────────────────────────────────────────

    fn next_line(&mut self) -> Option<Vec<Token<'a>>> {
        let line = self.lines.get(self.pos)?.clone();
        self.pos += 1;
        Some(line)
    }

    fn peek_directive(&self) -> Option<&'a str> {
        let first = self.lines.get(self.pos)?.first()?;
        (first.kind == TokKind::Word && first.text.starts_with('@')).then_some(first.text)
    }

    fn mark(&mut self, line: &[Token<'_>]) {
        if let Some(last) = line.last() {
            self.last_end = self.last_end.max(last.end);
        }
    }

    // ── Sections ────────────────────────────────────────────────────────

    fn ensure_section(&mut self, from: usize) {
        if self.section.is_none() {
            self.b.start_node(NodeKind::Commands, from);
            self.section = Some(NodeKind::Commands);
        }
    }

    fn close_section(&mut self) {
        if self.section.take().is_some() {
            self.b.finish_node(self.last_end);
        }
    }

    // ── Top-level dispatch ──────────────────────────────────────────────

    fn parse_line(&mut self, line: &[Token<'a>]) {
        let first = line[0];
        if first.kind == TokKind::Comment {
            self.b.token(NodeKind::LineComment, span_of(first));
            self.mark(line);
            return;
        }
        if first.kind == TokKind::Word && first.text.starts_with('@') {
            self.parse_directive(line);
            return;
        }
        let has_tag = first.kind == TokKind::Word && time_tag_kind(first.text).is_some();
        let rest = if has_tag { &line[1..] } else { line };
        if rest.first().is_some_and(|t| t.text == "@REQUEST_BEGIN") {
            self.ensure_section(first.start);
            self.parse_request(line, has_tag);
            return;
        }
        self.ensure_section(first.start);
        self.parse_command(line);
    }

    fn parse_directive(&mut self, line: &[Token<'a>]) {
        let first = line[0];
        match first.text {
            "@ID" => {
                self.close_section();
                self.simple_directive(NodeKind::IdDeclaration, line);
            }
            "@INPUT_PARAMS_BEGIN" => {
                self.close_section();
                self.parse_declarations(NodeKind::ParameterDeclaration, INPUT_PARAMS_END, line);
            }
            "@LOCALS_BEGIN" => {
                self.close_section();
                self.parse_declarations(NodeKind::LocalDeclaration, LOCALS_END, line);
            }
            "@LOAD_AND_GO" => {
                self.close_section();
                self.simple_directive(NodeKind::LoadAndGoDirective, line);
            }
            "@IMMEDIATE" | "@HARDWARE" => {
                self.close_section();
                let kind = if first.text == "@IMMEDIATE" {
                    NodeKind::ImmediateCommands
                } else {
                    NodeKind::HardwareCommands
                };
                self.b.start_node(kind, first.start);
                self.section = Some(kind);
                self.b.token(NodeKind::DirectiveName, span_of(first));
                let (body, comment) = split_comment(&line[1..]);
                if let Some(span) = tokens_span(body) {
                    self.b.error(span, format!("unexpected tokens after {}", first.text));
                }
                self.comment(comment);
                self.mark(line);
            }
            "@METADATA" | "@MODEL" => {
                self.pos -= 1;
                self.parse_attachments();
            }
            "@REQUEST_BEGIN" => {
                self.ensure_section(first.start);
                self.parse_request(line, false);
            }
            "@REQUEST_END" | INPUT_PARAMS_END | LOCALS_END => {
                self.b.error(
                    span_of(first),
                    format!("{} without a matching opening directive", first.text),
                );
                self.mark(line);
            }
            _ => {
                self.close_section();
                self.simple_directive(NodeKind::GenericDirective, line);
            }
        }
    }

    /// `@NAME literal...` on one line.
    fn simple_directive(&mut self, kind: NodeKind, line: &[Token<'a>]) {
        let (body, comment) = split_comment(line);
        let end = body.last().map_or(line[0].end, |t| t.end);
        self.b.start_node(kind, line[0].start);
        self.b.token(NodeKind::DirectiveName, span_of(line[0]));
        emit_literals(&mut self.b, &body[1..], SEQN_LIST);
        self.b.finish_node(end);
        self.comment(comment);
        self.mark(line);
    }

    fn comment(&mut self, comment: Option<Token<'_>>) {
        if let Some(c) = comment {
            self.b.token(NodeKind::LineComment, span_of(c));
        }
    }

    // ── Declarations ────────────────────────────────────────────────────

    fn parse_declarations(&mut self, kind: NodeKind, end_name: &str, line: &[Token<'a>]) {
        self.b.start_node(kind, line[0].start);
        self.b.token(NodeKind::DirectiveName, span_of(line[0]));
        let (body, comment) = split_comment(&line[1..]);
        if let Some(span) = tokens_span(body) {
            self.b
                .error(span, format!("unexpected tokens after {}", line[0].text));
        }
        self.comment(comment);
        self.mark(line);

        while let Some(next) = self.lines.get(self.pos).map(|l| l[0]) {
            match self.peek_directive() {
                Some(directive) if directive == end_name => {
                    let Some(end_line) = self.next_line() else { break };
                    self.b.token(NodeKind::DirectiveName, span_of(end_line[0]));
                    let (extra, comment) = split_comment(&end_line[1..]);
                    if let Some(span) = tokens_span(extra) {
                        self.b
                            .error(span, format!("unexpected tokens after {end_name}"));
                    }
                    self.comment(comment);
                    self.mark(&end_line);
                    self.b.finish_node(self.last_end);
                    return;
                }
                Some(_) => break,
                None => {}
            }
            // A time-tagged line is a command: the block was left open.
            if next.kind == TokKind::Word && time_tag_kind(next.text).is_some() {
                break;
            }
            let Some(var_line) = self.next_line() else { break };
            if var_line[0].kind == TokKind::Comment {
                self.comment(Some(var_line[0]));
                self.mark(&var_line);
            } else {
                self.parse_variable(&var_line);
            }
        }
        self.b
            .error(Span::empty(self.last_end), format!("missing {end_name}"));
        self.b.finish_node(self.last_end);
    }

    /// `name TYPE [ENUM_NAME] ["range"]`
    fn parse_variable(&mut self, line: &[Token<'a>]) {
        let (body, comment) = split_comment(line);
        let Some(span) = tokens_span(body) else {
            self.comment(comment);
            return;
        };
        self.b.start_node(NodeKind::VariableDeclaration, span.start);
        for (i, tok) in body.iter().enumerate() {
            let kind = match (i, tok.kind) {
                (0, TokKind::Word) => NodeKind::VariableName,
                (1, TokKind::Word) => NodeKind::VariableType,
                (2.., TokKind::Word) => NodeKind::EnumName,
                (2.., TokKind::String) => NodeKind::VariableRange,
                _ => {
                    self.b
                        .error(span_of(*tok), format!("unexpected '{}' in variable declaration", tok.text));
                    continue;
                }
            };
            self.b.token(kind, span_of(*tok));
        }
        self.b.finish_node(span.end);
        self.comment(comment);
        self.mark(line);
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// `[timetag] STEM args... [# comment]` plus following `@METADATA`/`@MODEL` lines.
    fn parse_command(&mut self, line: &[Token<'a>]) {
        let (body, comment) = split_comment(line);
        self.b.start_node(NodeKind::Command, line[0].start);
        let rest = self.time_tag(body);
        match rest.first() {
            Some(stem) if stem.kind == TokKind::Word => {
                self.b.token(NodeKind::Stem, span_of(*stem));
                let args = &rest[1..];
                let from = args.first().map_or(stem.end, |t| t.start);
                let to = args.last().map_or(stem.end, |t| t.end);
                self.b.start_node(NodeKind::Args, from);
                emit_literals(&mut self.b, args, SEQN_LIST);
                self.b.finish_node(to);
            }
            Some(tok) => {
                let span = tokens_span(rest).unwrap_or_else(|| span_of(*tok));
                self.b.error(span, "expected command stem");
            }
            None => {
                let at = body.last().map_or(line[0].start, |t| t.end);
                self.b.error(Span::empty(at), "expected command stem");
            }
        }
        self.comment(comment);
        self.mark(line);
        self.parse_attachments();
        self.b.finish_node(self.last_end);
    }

    /// Emit a `TimeTag` node if the first token is one; returns the remaining tokens.
    fn time_tag<'t>(&mut self, body: &'t [Token<'a>]) -> &'t [Token<'a>] {
        if let Some(first) = body.first()
            && first.kind == TokKind::Word
            && let Some(kind) = time_tag_kind(first.text)
        {
            self.b.start_node(NodeKind::TimeTag, first.start);
            self.b.token(kind, span_of(*first));
            self.b.finish_node(first.end);
            &body[1..]
        } else {
            body
        }
    }

    /// Consume consecutive `@METADATA` / `@MODEL` lines into grouped nodes.
    fn parse_attachments(&mut self) {
        while let Some(directive) = self.peek_directive() {
            let (group, entry) = match directive {
                "@METADATA" => (NodeKind::Metadata, NodeKind::MetaEntry),
                "@MODEL" => (NodeKind::Models, NodeKind::Model),
                _ => return,
            };
            let from = self.lines[self.pos][0].start;
            self.b.start_node(group, from);
            while self.peek_directive() == Some(directive) {
                let Some(line) = self.next_line() else { break };
                self.simple_directive(entry, &line);
            }
            self.b.finish_node(self.last_end);
        }
    }

    // ── Requests ────────────────────────────────────────────────────────

    /// `[timetag] @REQUEST_BEGIN("name")` ... `@REQUEST_END`
    fn parse_request(&mut self, line: &[Token<'a>], has_tag: bool) {
        let (body, comment) = split_comment(line);
        self.b.start_node(NodeKind::Request, line[0].start);
        let rest = if has_tag { self.time_tag(body) } else { body };
        let Some((begin, header)) = rest.split_first() else {
            self.b.finish_node(line[0].end);
            return;
        };
        self.b.token(NodeKind::DirectiveName, span_of(*begin));
        match header {
            [open, name, close, tail @ ..]
                if open.kind == TokKind::LParen
                    && name.kind == TokKind::String
                    && close.kind == TokKind::RParen =>
            {
                self.b.token(NodeKind::RequestName, span_of(*name));
                if let Some(span) = tokens_span(tail) {
                    self.b.error(span, "unexpected tokens after request name");
                }
            }
            _ => {
                let span = tokens_span(header).unwrap_or(Span::empty(begin.end));
                self.b
                    .error(span, "expected request name, e.g. @REQUEST_BEGIN(\"name\")");
            }
        }
        self.comment(comment);
        self.mark(line);

        while let Some(inner) = self.next_line() {
            let first = inner[0];
            if first.text == "@REQUEST_END" {
                self.b.token(NodeKind::DirectiveName, span_of(first));
                let (extra, comment) = split_comment(&inner[1..]);
                if let Some(span) = tokens_span(extra) {
                    self.b.error(span, "unexpected tokens after @REQUEST_END");
                }
                self.comment(comment);
                self.mark(&inner);
                self.parse_attachments();
                self.b.finish_node(self.last_end);
                return;
            }
            if first.kind == TokKind::Comment {
                self.comment(Some(first));
                self.mark(&inner);
            } else if first.kind == TokKind::Word
                && first.text.starts_with('@')
                && !matches!(first.text, "@METADATA" | "@MODEL")
            {
                self.b.error(
                    span_of(first),
                    format!("{} is not allowed inside a request", first.text),
                );
                self.mark(&inner);
            } else if first.text.starts_with('@') {
                self.pos -= 1;
                self.parse_attachments();
            } else {
                self.parse_command(&inner);
            }
        }
        self.b
            .error(Span::empty(self.last_end), "missing @REQUEST_END");
        self.b.finish_node(self.last_end);
    }
}

fn span_of(tok: Token<'_>) -> Span {
    Span::new(tok.start, tok.end)
}
