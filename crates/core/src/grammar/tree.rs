//! Arena-backed syntax tree with immutable node handles.

use seqlint_diagnostics::Span;
use std::fmt;

/// Classification of a syntax tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NodeKind {
    // ─── Literals (shared) ───
    /// Decimal or hexadecimal number literal.
    Number,
    /// Double-quoted string literal.
    String,
    /// `TRUE` / `FALSE` literal.
    Boolean,
    /// Bare identifier (VML variable reference).
    Identifier,
    /// Bare word (seq-n enum symbol or variable reference).
    Enum,
    /// Bracketed repeat group `[a b c]`.
    RepeatArg,
    /// Comment running to end of line.
    LineComment,
    /// Parser error; carries a message.
    Error,

    // ─── Time tags ───
    /// Wrapper around one of the time-tag forms below.
    TimeTag,
    /// `A2024-001T00:00:00`
    TimeAbsolute,
    /// `R00:00:10` or `R10`
    TimeRelative,
    /// `E+00:00:10`
    TimeEpoch,
    /// `C`
    TimeComplete,

    // ─── seq-n ───
    /// Document root for seq-n.
    Sequence,
    /// `@ID "..."`
    IdDeclaration,
    /// `@INPUT_PARAMS_BEGIN` ... `@INPUT_PARAMS_END`
    ParameterDeclaration,
    /// `@LOCALS_BEGIN` ... `@LOCALS_END`
    LocalDeclaration,
    /// One declared variable.
    VariableDeclaration,
    /// Declared variable name.
    VariableName,
    /// Declared variable type keyword.
    VariableType,
    /// Enum name of an `ENUM` variable.
    EnumName,
    /// Quoted range of a declared variable.
    VariableRange,
    /// `@LOAD_AND_GO`
    LoadAndGoDirective,
    /// Any other `@` directive.
    GenericDirective,
    /// The `@NAME` token of a directive.
    DirectiveName,
    /// Section of standard time-tagged commands.
    Commands,
    /// Section opened by `@IMMEDIATE`.
    ImmediateCommands,
    /// Section opened by `@HARDWARE`.
    HardwareCommands,
    /// `@REQUEST_BEGIN(...)` ... `@REQUEST_END`
    Request,
    /// Quoted request name.
    RequestName,
    /// A single command line plus its attachments.
    Command,
    /// Command stem.
    Stem,
    /// Argument list of a command.
    Args,
    /// `@METADATA` lines attached to a command.
    Metadata,
    /// One `@METADATA` line.
    MetaEntry,
    /// `@MODEL` lines attached to a command.
    Models,
    /// One `@MODEL` line.
    Model,

    // ─── VML ───
    /// Document root for VML.
    Module,
    /// Declarations between `SEQUENCE` and `BODY`.
    Header,
    /// `BODY` ... `END_BODY`
    Body,
    /// One time-tagged body statement.
    Statement,
    /// `ISSUE STEM args`
    Issue,
    /// Control-flow statement (`IF ... THEN`, `END_IF`, ...).
    BlockStatement,
    /// Reserved word.
    Keyword,
    /// Opaque expression text.
    Expression,
    /// `name := expression`
    Assignment,
}

impl NodeKind {
    /// Whether this kind is a literal value usable as a command argument.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            NodeKind::Number
                | NodeKind::String
                | NodeKind::Boolean
                | NodeKind::Identifier
                | NodeKind::Enum
                | NodeKind::RepeatArg
        )
    }

    /// Whether this kind is one of the concrete time-tag forms.
    pub fn is_time_form(self) -> bool {
        matches!(
            self,
            NodeKind::TimeAbsolute
                | NodeKind::TimeRelative
                | NodeKind::TimeEpoch
                | NodeKind::TimeComplete
        )
    }
}

/// Index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    message: Option<String>,
}

/// A parsed document: the source text plus an arena of nodes.
///
/// Node 0 is always the root. Children are stored in source order.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// The root node.
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: NodeId(0),
        }
    }

    /// The full source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a node id to a handle.
    pub fn node(&self, id: NodeId) -> Option<SyntaxNode<'_>> {
        (id.index() < self.nodes.len()).then_some(SyntaxNode { tree: self, id })
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

impl fmt::Display for SyntaxTree {
    /// Indented outline, one node per line: `Kind@start..end`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(node: SyntaxNode<'_>, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:indent$}{:?}@{}..{}", "", node.kind(), node.from(), node.to(), indent = depth * 2)?;
            if node.kind().is_literal() || node.kind().is_time_form() {
                write!(f, " {:?}", node.text())?;
            }
            if let Some(msg) = node.error_message() {
                write!(f, " {msg:?}")?;
            }
            writeln!(f)?;
            for child in node.children() {
                walk(child, depth + 1, f)?;
            }
            Ok(())
        }
        walk(self.root(), 0, f)
    }
}

// ─── Node handle ────────────────────────────────────────────────────────────

/// Cheap, copyable, read-only handle to a node in a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}..{}", self.kind(), self.from(), self.to())
    }
}

impl<'t> SyntaxNode<'t> {
    /// Arena id of this node.
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn tree(self) -> &'t SyntaxTree {
        self.tree
    }

    /// Node kind.
    pub fn kind(self) -> NodeKind {
        self.tree.data(self.id).kind
    }

    /// Byte span of the node.
    pub fn span(self) -> Span {
        self.tree.data(self.id).span
    }

    /// Start offset.
    pub fn from(self) -> usize {
        self.span().start
    }

    /// End offset (exclusive).
    pub fn to(self) -> usize {
        self.span().end
    }

    /// Source text covered by this node.
    pub fn text(self) -> &'t str {
        let span = self.span();
        &self.tree.source[span.start..span.end]
    }

    /// Message attached to an `Error` node.
    pub fn error_message(self) -> Option<&'t str> {
        self.tree.data(self.id).message.as_deref()
    }

    /// Parent node, `None` for the root.
    pub fn parent(self) -> Option<SyntaxNode<'t>> {
        let tree = self.tree;
        tree.data(self.id)
            .parent
            .map(|id| SyntaxNode { tree, id })
    }

    /// Direct children in source order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        tree.data(self.id)
            .children
            .iter()
            .map(move |&id| SyntaxNode { tree, id })
    }

    /// First direct child of the given kind.
    pub fn child(self, kind: NodeKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// All direct children of the given kind.
    pub fn children_of(self, kind: NodeKind) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.children().filter(move |c| c.kind() == kind)
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// All nodes below this one in pre-order (document order).
    pub fn descendants(self) -> Descendants<'t> {
        let mut stack: Vec<NodeId> = self.tree.data(self.id).children.clone();
        stack.reverse();
        Descendants {
            tree: self.tree,
            stack,
        }
    }

    /// Whether any ancestor has the given kind.
    pub fn has_ancestor(self, kind: NodeKind) -> bool {
        self.ancestors().any(|a| a.kind() == kind)
    }
}

/// Pre-order iterator returned by [`SyntaxNode::descendants`].
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = SyntaxNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.data(id).children.iter().rev().copied());
        Some(SyntaxNode {
            tree: self.tree,
            id,
        })
    }
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Incremental tree construction for parsers.
///
/// The root is opened by [`TreeBuilder::new`] and closed by
/// [`TreeBuilder::finish`]; every other `start_node` must be matched by a
/// `finish_node`. Unmatched nodes are closed at end of input.
pub struct TreeBuilder {
    source: String,
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    /// Start a tree over `source` whose root has the given kind.
    pub fn new(source: impl Into<String>, root: NodeKind) -> Self {
        let source = source.into();
        let len = source.len();
        Self {
            source,
            nodes: vec![NodeData {
                kind: root,
                span: Span::new(0, len),
                parent: None,
                children: Vec::new(),
                message: None,
            }],
            open: vec![NodeId(0)],
        }
    }

    /// The source text being parsed.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn push(&mut self, kind: NodeKind, span: Span, message: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.open.last().copied();
        self.nodes.push(NodeData {
            kind,
            span,
            parent,
            children: Vec::new(),
            message,
        });
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    /// Open a node starting at `from`; subsequent nodes become its children.
    pub fn start_node(&mut self, kind: NodeKind, from: usize) -> NodeId {
        let id = self.push(kind, Span::empty(from), None);
        self.open.push(id);
        id
    }

    /// Close the innermost open node at `to`.
    ///
    /// The root is never closed here; extra calls are ignored.
    pub fn finish_node(&mut self, to: usize) {
        if self.open.len() <= 1 {
            return;
        }
        if let Some(id) = self.open.pop() {
            let data = &mut self.nodes[id.index()];
            data.span = Span::new(data.span.start, to.max(data.span.start));
        }
    }

    /// Add a leaf node.
    pub fn token(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.push(kind, span, None)
    }

    /// Add an `Error` leaf carrying `message`.
    pub fn error(&mut self, span: Span, message: impl Into<String>) -> NodeId {
        self.push(NodeKind::Error, span, Some(message.into()))
    }

    /// Number of nodes currently open, including the root.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Close any nodes left open and return the tree.
    pub fn finish(mut self) -> SyntaxTree {
        let end = self.source.len();
        while self.open.len() > 1 {
            self.finish_node(end);
        }
        SyntaxTree {
            source: self.source,
            nodes: self.nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxTree {
        // "C STEM 1"
        let mut b = TreeBuilder::new("C STEM 1", NodeKind::Sequence);
        b.start_node(NodeKind::Command, 0);
        b.start_node(NodeKind::TimeTag, 0);
        b.token(NodeKind::TimeComplete, Span::new(0, 1));
        b.finish_node(1);
        b.token(NodeKind::Stem, Span::new(2, 6));
        b.start_node(NodeKind::Args, 7);
        b.token(NodeKind::Number, Span::new(7, 8));
        b.finish_node(8);
        b.finish_node(8);
        b.finish()
    }

    #[test]
    fn navigation() {
        let tree = sample();
        let cmd = tree.root().child(NodeKind::Command).unwrap();
        assert_eq!(cmd.span(), Span::new(0, 8));
        assert_eq!(cmd.child(NodeKind::Stem).unwrap().text(), "STEM");
        let num = cmd.child(NodeKind::Args).unwrap().children().next().unwrap();
        assert_eq!(num.text(), "1");
        assert_eq!(
            num.ancestors().map(|a| a.kind()).collect::<Vec<_>>(),
            [NodeKind::Args, NodeKind::Command, NodeKind::Sequence]
        );
        assert!(num.has_ancestor(NodeKind::Command));
    }

    #[test]
    fn descendants_are_preorder() {
        let tree = sample();
        let kinds: Vec<_> = tree.root().descendants().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            [
                NodeKind::Command,
                NodeKind::TimeTag,
                NodeKind::TimeComplete,
                NodeKind::Stem,
                NodeKind::Args,
                NodeKind::Number,
            ]
        );
    }

    #[test]
    fn unclosed_nodes_close_at_end() {
        let mut b = TreeBuilder::new("abc", NodeKind::Module);
        b.start_node(NodeKind::Body, 1);
        b.error(Span::new(1, 2), "boom");
        let tree = b.finish();
        let body = tree.root().child(NodeKind::Body).unwrap();
        assert_eq!(body.span(), Span::new(1, 3));
        let err = body.child(NodeKind::Error).unwrap();
        assert_eq!(err.error_message(), Some("boom"));
    }

    #[test]
    fn handles_compare_by_identity() {
        let tree = sample();
        let a = tree.root().child(NodeKind::Command).unwrap();
        let b = tree.root().children().next().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, tree.root());
    }

    #[test]
    fn outline_lists_nodes() {
        let tree = sample();
        let outline = tree.to_string();
        assert!(outline.starts_with("Sequence@0..8\n  Command@0..8\n"));
        assert!(outline.contains("      Number@7..8 \"1\""));
    }
}
