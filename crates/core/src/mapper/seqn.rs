use super::CommandInfoMapper;
use crate::blocks::BlockKeyword;
use crate::grammar::{NodeKind, SyntaxNode, SyntaxTree};

/// seq-n: a command is a `Command` node; arguments are whitespace separated.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeqnMapper;

impl CommandInfoMapper for SeqnMapper {
    fn statements<'t>(&self, tree: &'t SyntaxTree) -> Vec<SyntaxNode<'t>> {
        tree.root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::Command)
            .collect()
    }

    fn name_node<'t>(&self, command: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        command.child(NodeKind::Stem)
    }

    fn argument_container<'t>(&self, command: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        command.child(NodeKind::Args)
    }

    fn containing_command<'t>(&self, node: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        std::iter::once(node)
            .chain(node.ancestors())
            .find(|n| n.kind() == NodeKind::Command)
    }

    fn is_enum_compatible(&self, node: SyntaxNode<'_>) -> bool {
        matches!(node.kind(), NodeKind::Enum | NodeKind::String)
    }

    fn is_variable_reference(&self, node: SyntaxNode<'_>) -> bool {
        node.kind() == NodeKind::Enum
    }

    fn format_argument_list(&self, values: &[String], _command: SyntaxNode<'_>) -> String {
        values.iter().map(|v| format!(" {v}")).collect()
    }

    fn format_enum_value(&self, symbol: &str, original: SyntaxNode<'_>) -> String {
        if original.kind() == NodeKind::String {
            format!("\"{symbol}\"")
        } else {
            symbol.to_string()
        }
    }

    fn block_keyword_node<'t>(&self, statement: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        self.name_node(statement)
            .filter(|stem| BlockKeyword::from_keyword(stem.text()).is_some())
    }

    fn closing_statement(&self, keyword: BlockKeyword) -> String {
        format!("C {}", keyword.terminator())
    }
}
