//! Diagnostics for seqlint.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Span`], [`FixAction`] and
//! [`LineIndex`], the types every validator uses to report problems in a
//! sequence document. Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from `spec/diagnostics.json`.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

// ── LineIndex ────────────────────────────────────────────────────────────

/// Maps byte offsets in a source string to line and column positions.
///
/// Lines and columns are **0-indexed**. The index is built in O(n) time and
/// each lookup is O(log n) via binary search.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    /// `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build a `LineIndex` from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0usize];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 0-indexed `(line, column)` pair.
    ///
    /// If `offset` is past the end of the source, the last line is returned.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let col = offset.saturating_sub(self.line_starts[line]);
        (line, col)
    }

    /// Byte offset of the start of the given 0-indexed line.
    ///
    /// Returns `None` if `line` is out of bounds.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start_of(&self, offset: usize) -> usize {
        let (line, _) = self.line_col(offset);
        self.line_starts[line]
    }

    /// Total number of lines (at least 1, even for empty input).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the sequence is invalid.
    Error,
    /// Advisory warning: the sequence is valid but not canonical.
    Warn,
}

/// Byte span in the source input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is zero-width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A self-contained text edit attached to a diagnostic.
///
/// The host applies it by replacing the bytes in `span` with `insert`.
/// A zero-width span is a pure insertion; an empty `insert` is a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixAction {
    /// Short human-readable label shown in a quick-fix menu.
    pub label: String,
    /// Byte range to replace.
    pub span: Span,
    /// Replacement text.
    pub insert: String,
}

impl FixAction {
    /// Create a fix action replacing `span` with `insert`.
    pub fn new(label: impl Into<String>, span: Span, insert: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            span,
            insert: insert.into(),
        }
    }

    /// Create a fix action inserting `text` at `pos`.
    pub fn insert(label: impl Into<String>, pos: usize, text: impl Into<String>) -> Self {
        Self::new(label, Span::empty(pos), text)
    }

    /// Create a fix action deleting `span`.
    pub fn delete(label: impl Into<String>, span: Span) -> Self {
        Self::new(label, span, "")
    }

    /// Apply this edit to `text`, returning the edited copy.
    ///
    /// Spans past the end of `text` are clamped.
    pub fn apply(&self, text: &str) -> String {
        let start = self.span.start.min(text.len());
        let end = self.span.end.min(text.len()).max(start);
        let mut out = String::with_capacity(text.len() + self.insert.len());
        out.push_str(&text[..start]);
        out.push_str(&self.insert);
        out.push_str(&text[end..]);
        out
    }
}

/// A diagnostic message produced by the linter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"SEQ1001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Byte span in the source input that this diagnostic relates to.
    pub span: Span,
    /// Quick-fix edits the host may offer. Serialized only when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fix_actions: Vec<FixAction>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            fix_actions: Vec::new(),
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(id: impl Into<Cow<'static, str>>, message: impl Into<String>, span: Span) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(id: impl Into<Cow<'static, str>>, message: impl Into<String>, span: Span) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Attach a fix action (builder pattern).
    pub fn with_fix(mut self, fix: FixAction) -> Self {
        self.fix_actions.push(fix);
        self
    }

    /// Attach several fix actions (builder pattern).
    pub fn with_fixes(mut self, fixes: impl IntoIterator<Item = FixAction>) -> Self {
        self.fix_actions.extend(fixes);
        self
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the default severity declared for a diagnostic code, if known.
pub fn severity_for_code(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

/// Returns the message template for a diagnostic code and variant, if known.
///
/// Templates contain `{key}` placeholders naming context keys.
pub fn message_template_for(id: &str, variant: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_templates.rs"))
}
