//! seqlint core library.
//!
//! Validates spacecraft command sequences written in seq-n or VML. The main
//! entry points are [`parse_seqn`] / [`parse_vml`] for building a
//! [`SyntaxTree`], [`match_blocks`] for control-flow structure, and
//! [`Linter::lint`] (or the [`lint`] shorthand) for semantic validation.

#![warn(missing_docs)]

/// Control-flow block matching.
pub mod blocks;
/// Syntax tree and the seq-n / VML reference parsers.
pub mod grammar;
/// Semantic validation passes and the orchestrating [`Linter`].
pub mod lint;
/// Dialect adapters behind [`CommandInfoMapper`].
pub mod mapper;
/// Time-tag parsing and balancing.
pub mod time;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parsers and tree
pub use grammar::{NodeKind, SyntaxNode, SyntaxTree, TreeBuilder, parse_seqn, parse_vml};

// Blocks
pub use blocks::{BlockEdge, BlockKeyword, BlockMap, BlockPairing, match_blocks};

// Dialects
pub use mapper::{CommandInfoMapper, Dialect, SeqnMapper, VmlMapper};

// Linter
pub use lint::{
    ArgumentContext, ArgumentOverride, Auxiliary, BlockCache, DistanceFn, LintInput, LintResult,
    Linter, ParameterValueOverride, PrecedingArgument, Revision, VariableType, levenshtein, lint,
};

// Diagnostics (re-exported from the diagnostics crate)
pub use seqlint_diagnostics::{Diagnostic, FixAction, LineIndex, Severity, Span, codes};

// Configuration and dictionaries
pub use seqlint_config::{ConfigError, LintConfig, load_config_from_str};
pub use seqlint_dictionary::{
    CommandDictionary, DictionaryError, load_channel_dictionary_from_str,
    load_dictionary_from_str, load_parameter_dictionary_from_str,
};
