use super::Auxiliary;
use super::overrides::ArgumentOverride;
use crate::grammar::{NodeKind, SyntaxNode, SyntaxTree};
use crate::mapper::CommandInfoMapper;
use seqlint_config::LintConfig;
use seqlint_diagnostics::{LineIndex, Span};
use seqlint_dictionary::CommandDictionary;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Declared type of a sequence variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// `FLOAT`
    Float,
    /// `INT`
    Int,
    /// `STRING`
    String,
    /// `UINT`
    Uint,
    /// `ENUM`
    Enum,
}

impl VariableType {
    /// Recognized type names, in the order listed in messages.
    pub const NAMES: [&'static str; 5] = ["FLOAT", "INT", "STRING", "UINT", "ENUM"];

    /// Parse a type keyword (case-sensitive).
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "FLOAT" => Some(VariableType::Float),
            "INT" => Some(VariableType::Int),
            "STRING" => Some(VariableType::String),
            "UINT" => Some(VariableType::Uint),
            "ENUM" => Some(VariableType::Enum),
            _ => None,
        }
    }

    /// Whether this is a numeric type.
    pub fn is_numeric(self) -> bool {
        matches!(self, VariableType::Float | VariableType::Int | VariableType::Uint)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VariableType::Float => "FLOAT",
            VariableType::Int => "INT",
            VariableType::String => "STRING",
            VariableType::Uint => "UINT",
            VariableType::Enum => "ENUM",
        })
    }
}

/// Variables visible to argument checks, with their type when known.
#[derive(Debug, Clone, Default)]
pub(super) struct VariableTable {
    vars: HashMap<String, Option<VariableType>>,
}

impl VariableTable {
    /// Collect declared variables plus host-provided globals.
    ///
    /// Globals have no declared type and match any argument kind.
    pub(super) fn collect<'g>(tree: &SyntaxTree, globals: impl IntoIterator<Item = &'g str>) -> Self {
        let mut vars: HashMap<String, Option<VariableType>> = globals
            .into_iter()
            .map(|g| (g.to_string(), None))
            .collect();
        for decl in tree
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::VariableDeclaration)
        {
            let Some(name) = decl.child(NodeKind::VariableName) else {
                continue;
            };
            let ty = decl
                .child(NodeKind::VariableType)
                .and_then(|t| VariableType::parse(t.text()));
            vars.entry(name.text().to_string()).or_insert(ty);
        }
        Self { vars }
    }

    /// `Some(ty)` when `name` is a known variable.
    pub(super) fn get(&self, name: &str) -> Option<Option<VariableType>> {
        self.vars.get(name).copied()
    }
}

/// Shared immutable context threaded through lint passes.
#[derive(Clone, Copy)]
pub(super) struct LintContext<'a> {
    pub(super) tree: &'a SyntaxTree,
    pub(super) mapper: &'a dyn CommandInfoMapper,
    pub(super) dictionary: Option<&'a CommandDictionary>,
    pub(super) aux: &'a Auxiliary<'a>,
    pub(super) config: &'a LintConfig,
    pub(super) distance: &'a (dyn Fn(&str, &str) -> usize + Send + Sync),
    pub(super) overrides: &'a [Arc<dyn ArgumentOverride>],
    pub(super) variables: &'a VariableTable,
    pub(super) line_index: &'a LineIndex,
}

impl<'a> LintContext<'a> {
    pub(super) fn source(&self) -> &'a str {
        self.tree.source()
    }

    /// All nodes of `kind` in document order.
    pub(super) fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        self.tree
            .root()
            .descendants()
            .filter(move |n| n.kind() == kind)
    }

    /// The full source line(s) covering `span`, trailing newline included.
    pub(super) fn line_span(&self, span: Span) -> Span {
        let start = self.line_index.line_start_of(span.start);
        let (line, _) = self.line_index.line_col(span.end);
        let end = self
            .line_index
            .line_start(line + 1)
            .unwrap_or(self.source().len());
        Span::new(start, end.max(start))
    }
}

/// Command category implied by a command's section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Section {
    Standard,
    Immediate,
    Hardware,
}

impl Section {
    pub(super) fn of(node: SyntaxNode<'_>) -> Self {
        for a in node.ancestors() {
            match a.kind() {
                NodeKind::ImmediateCommands => return Section::Immediate,
                NodeKind::HardwareCommands => return Section::Hardware,
                _ => {}
            }
        }
        Section::Standard
    }

    pub(super) fn as_str(self) -> &'static str {
        match self {
            Section::Standard => "standard",
            Section::Immediate => "immediate",
            Section::Hardware => "hardware",
        }
    }
}
