//! Dialect adapters.
//!
//! Validators never look at a dialect directly: every tree-shape question
//! goes through [`CommandInfoMapper`].

mod seqn;
mod vml;

pub use seqn::SeqnMapper;
pub use vml::VmlMapper;

use crate::blocks::BlockKeyword;
use crate::grammar::{NodeKind, SyntaxNode, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source language of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// seq-n
    Seqn,
    /// VML
    Vml,
}

impl Dialect {
    /// The mapper for this dialect.
    pub fn mapper(self) -> &'static dyn CommandInfoMapper {
        match self {
            Dialect::Seqn => &SeqnMapper,
            Dialect::Vml => &VmlMapper,
        }
    }

    /// Parse source text with this dialect's reference parser.
    pub fn parse(self, source: &str) -> SyntaxTree {
        match self {
            Dialect::Seqn => crate::grammar::parse_seqn(source),
            Dialect::Vml => crate::grammar::parse_vml(source),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Seqn => "seq-n",
            Dialect::Vml => "vml",
        })
    }
}

/// Uniform view of command statements across dialects.
pub trait CommandInfoMapper: Send + Sync {
    /// Command-level statements in document order, including control flow.
    fn statements<'t>(&self, tree: &'t SyntaxTree) -> Vec<SyntaxNode<'t>>;

    /// The stem node of a command, `None` for non-command statements.
    fn name_node<'t>(&self, command: SyntaxNode<'t>) -> Option<SyntaxNode<'t>>;

    /// The node holding a command's arguments.
    fn argument_container<'t>(&self, command: SyntaxNode<'t>) -> Option<SyntaxNode<'t>>;

    /// Argument nodes of a container (an argument list or a repeat group).
    fn arguments<'t>(&self, container: SyntaxNode<'t>) -> Vec<SyntaxNode<'t>> {
        container
            .children()
            .filter(|c| c.kind().is_literal())
            .collect()
    }

    /// Nearest enclosing command statement.
    fn containing_command<'t>(&self, node: SyntaxNode<'t>) -> Option<SyntaxNode<'t>>;

    /// Whether the node may stand for an enum value.
    fn is_enum_compatible(&self, node: SyntaxNode<'_>) -> bool;

    /// Whether the node is a number literal.
    fn is_number_compatible(&self, node: SyntaxNode<'_>) -> bool {
        node.kind() == NodeKind::Number
    }

    /// Whether the node is a string literal.
    fn is_string_compatible(&self, node: SyntaxNode<'_>) -> bool {
        node.kind() == NodeKind::String
    }

    /// Whether the node is a boolean literal.
    fn is_boolean_compatible(&self, node: SyntaxNode<'_>) -> bool {
        node.kind() == NodeKind::Boolean
    }

    /// Whether the node is a repeat group.
    fn is_repeat(&self, node: SyntaxNode<'_>) -> bool {
        node.kind() == NodeKind::RepeatArg
    }

    /// Whether the node syntactically refers to a variable.
    fn is_variable_reference(&self, node: SyntaxNode<'_>) -> bool;

    /// Offset where a new trailing argument would be inserted.
    fn append_position(&self, command: SyntaxNode<'_>) -> usize {
        if let Some(last) = self
            .argument_container(command)
            .and_then(|c| self.arguments(c).last().copied())
        {
            return last.to();
        }
        self.name_node(command).map_or(command.to(), |n| n.to())
    }

    /// Render values for insertion at [`append_position`](Self::append_position).
    fn format_argument_list(&self, values: &[String], command: SyntaxNode<'_>) -> String;

    /// Render an enum symbol as a replacement for `original`.
    fn format_enum_value(&self, symbol: &str, original: SyntaxNode<'_>) -> String;

    /// Control-flow keyword of a statement.
    fn block_keyword(&self, statement: SyntaxNode<'_>) -> Option<BlockKeyword> {
        self.block_keyword_node(statement)
            .and_then(|n| BlockKeyword::from_keyword(n.text()))
    }

    /// Node holding a statement's control-flow keyword.
    fn block_keyword_node<'t>(&self, statement: SyntaxNode<'t>) -> Option<SyntaxNode<'t>>;

    /// Full statement text that closes a block opened by `keyword`.
    fn closing_statement(&self, keyword: BlockKeyword) -> String;

    /// Time tag of a statement.
    fn time_tag<'t>(&self, statement: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        statement.child(NodeKind::TimeTag)
    }
}
