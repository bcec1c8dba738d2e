/// Lexer shared by both dialects; tokenizes raw input into borrowed tokens.
pub mod lexer;
/// Argument-list parsing shared by both dialects.
mod literals;
/// seq-n reference parser.
pub mod seqn;
/// Arena syntax tree, node handles and the tree builder.
pub mod tree;
/// VML reference parser.
pub mod vml;

pub use seqn::parse_seqn;
pub use tree::{NodeId, NodeKind, SyntaxNode, SyntaxTree, TreeBuilder};
pub use vml::parse_vml;
