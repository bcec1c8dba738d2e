use super::CommandInfoMapper;
use crate::blocks::BlockKeyword;
use crate::grammar::{NodeKind, SyntaxNode, SyntaxTree};

/// VML: a command is a body `Statement` holding an `ISSUE`; arguments are
/// comma separated and enum values are quoted strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct VmlMapper;

impl CommandInfoMapper for VmlMapper {
    fn statements<'t>(&self, tree: &'t SyntaxTree) -> Vec<SyntaxNode<'t>> {
        tree.root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::Statement)
            .collect()
    }

    fn name_node<'t>(&self, command: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        command.child(NodeKind::Issue)?.child(NodeKind::Stem)
    }

    fn argument_container<'t>(&self, command: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        command.child(NodeKind::Issue)?.child(NodeKind::Args)
    }

    fn containing_command<'t>(&self, node: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        std::iter::once(node)
            .chain(node.ancestors())
            .find(|n| n.kind() == NodeKind::Statement)
    }

    fn is_enum_compatible(&self, node: SyntaxNode<'_>) -> bool {
        node.kind() == NodeKind::String
    }

    fn is_variable_reference(&self, node: SyntaxNode<'_>) -> bool {
        node.kind() == NodeKind::Identifier
    }

    fn format_argument_list(&self, values: &[String], command: SyntaxNode<'_>) -> String {
        let has_args = self
            .argument_container(command)
            .is_some_and(|c| !self.arguments(c).is_empty());
        let joined = values.join(", ");
        if has_args {
            format!(", {joined}")
        } else {
            format!(" {joined}")
        }
    }

    fn format_enum_value(&self, symbol: &str, _original: SyntaxNode<'_>) -> String {
        format!("\"{symbol}\"")
    }

    fn block_keyword_node<'t>(&self, statement: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        statement
            .child(NodeKind::BlockStatement)?
            .child(NodeKind::Keyword)
    }

    fn closing_statement(&self, keyword: BlockKeyword) -> String {
        format!("R00:00:00.00 {}", keyword.terminator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_vml;

    #[test]
    fn extracts_issue_parts() {
        let tree = parse_vml("BODY\nR1 ISSUE STEM 1, \"ON\", v\nEND_BODY\n");
        let m = VmlMapper;
        let stmt = m.statements(&tree)[0];
        assert_eq!(m.name_node(stmt).unwrap().text(), "STEM");
        let args = m.arguments(m.argument_container(stmt).unwrap());
        assert_eq!(args.len(), 3);
        assert!(m.is_enum_compatible(args[1]));
        assert!(m.is_variable_reference(args[2]));
        assert!(!m.is_enum_compatible(args[2]));
        assert_eq!(m.format_argument_list(&["0".into()], stmt), ", 0");
        assert_eq!(m.format_enum_value("OFF", args[1]), "\"OFF\"");
    }

    #[test]
    fn first_argument_has_no_comma() {
        let tree = parse_vml("BODY\nR1 ISSUE STEM\nEND_BODY\n");
        let m = VmlMapper;
        let stmt = m.statements(&tree)[0];
        assert_eq!(
            m.format_argument_list(&["0".into(), "\"A\"".into()], stmt),
            " 0, \"A\""
        );
        assert_eq!(m.append_position(stmt), tree.source().find("STEM").unwrap() + 4);
    }

    #[test]
    fn block_statements() {
        let tree = parse_vml("BODY\nR1 WHILE x DO\nR1 END_WHILE\nEND_BODY\n");
        let m = VmlMapper;
        let stmts = m.statements(&tree);
        assert_eq!(m.block_keyword(stmts[0]), Some(BlockKeyword::While));
        assert_eq!(m.block_keyword(stmts[1]), Some(BlockKeyword::EndWhile));
        assert!(m.name_node(stmts[0]).is_none());
        assert_eq!(m.closing_statement(BlockKeyword::While), "R00:00:00.00 END_WHILE");
    }
}
