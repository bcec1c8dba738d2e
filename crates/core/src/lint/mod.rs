//! Semantic validation of sequence documents.
//!
//! [`Linter`] runs every pass over a [`SyntaxTree`] and merges the results
//! in document order. Passes never fail: every problem is a [`Diagnostic`].

use crate::blocks::{BlockMap, match_blocks};
use crate::grammar::SyntaxTree;
use crate::mapper::Dialect;
use parking_lot::Mutex;
use seqlint_config::LintConfig;
use seqlint_diagnostics::{Diagnostic, LineIndex};
use seqlint_dictionary::{ChannelDictionary, CommandDictionary, ParameterDictionary};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
///
/// ```ignore
/// ctx!("stem" => stem, "expected" => n.to_string())
/// ```
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}
pub(crate) use ctx;

mod args;
mod blocks;
mod context;
mod declarations;
mod diagnostics_util;
mod directives;
mod metadata;
mod overrides;
mod suggest;
mod syntax;
mod time_tag;

pub use context::VariableType;
pub use overrides::{ArgumentContext, ArgumentOverride, ParameterValueOverride, PrecedingArgument};
pub use suggest::{DistanceFn, levenshtein};

use context::{LintContext, VariableTable};

/// Opaque document revision supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(pub u64);

/// Declarations supplied by the host alongside the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct Auxiliary<'a> {
    /// Parameter dictionaries consulted by argument overrides.
    pub parameter_dictionaries: &'a [ParameterDictionary],
    /// Channel dictionary consulted by argument overrides.
    pub channel_dictionary: Option<&'a ChannelDictionary>,
    /// Externally declared variable names.
    pub global_variables: &'a [String],
}

/// One lint request.
#[derive(Debug, Clone, Copy)]
pub struct LintInput<'a> {
    /// Parsed document.
    pub tree: &'a SyntaxTree,
    /// Language of the document.
    pub dialect: Dialect,
    /// Command dictionary; dictionary-dependent checks are skipped without one.
    pub dictionary: Option<&'a CommandDictionary>,
    /// Host declarations.
    pub aux: Auxiliary<'a>,
    /// Revision used to memoize block matching.
    pub revision: Option<Revision>,
}

impl<'a> LintInput<'a> {
    /// A request with no dictionary, declarations, or revision.
    pub fn new(tree: &'a SyntaxTree, dialect: Dialect) -> Self {
        Self {
            tree,
            dialect,
            dictionary: None,
            aux: Auxiliary::default(),
            revision: None,
        }
    }

    /// Attach a command dictionary (builder pattern).
    pub fn with_dictionary(mut self, dictionary: &'a CommandDictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Attach host declarations (builder pattern).
    pub fn with_aux(mut self, aux: Auxiliary<'a>) -> Self {
        self.aux = aux;
        self
    }

    /// Attach a revision (builder pattern).
    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = Some(revision);
        self
    }
}

/// Result of linting one document.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    /// `true` if no errors were found (warnings are allowed).
    pub ok: bool,
    /// All diagnostics, ordered by start offset.
    pub diagnostics: Vec<Diagnostic>,
}

// ─── Block cache ───

#[derive(Debug, Default)]
struct CacheEntries {
    maps: HashMap<Revision, Arc<BlockMap>>,
    /// Insertion order, oldest first.
    order: VecDeque<Revision>,
}

/// Revision-keyed memo of block matching results.
///
/// Each revision is matched at most once; the oldest revision is evicted
/// when the cache is full.
#[derive(Debug)]
pub struct BlockCache {
    capacity: usize,
    entries: Mutex<CacheEntries>,
}

impl BlockCache {
    /// An empty cache holding at most `capacity` revisions (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(CacheEntries::default()),
        }
    }

    /// The cached map for `revision`, computing it with `build` on a miss.
    pub fn get_or_insert_with(
        &self,
        revision: Revision,
        build: impl FnOnce() -> BlockMap,
    ) -> Arc<BlockMap> {
        let mut entries = self.entries.lock();
        if let Some(map) = entries.maps.get(&revision) {
            trace!(revision = revision.0, "block cache hit");
            return Arc::clone(map);
        }
        trace!(revision = revision.0, "block cache miss");
        let map = Arc::new(build());
        while entries.order.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.maps.remove(&oldest);
            trace!(revision = oldest.0, "block cache evicted");
        }
        entries.order.push_back(revision);
        entries.maps.insert(revision, Arc::clone(&map));
        map
    }

    /// Drop one revision. Returns whether it was cached.
    pub fn evict(&self, revision: Revision) -> bool {
        let mut entries = self.entries.lock();
        entries.order.retain(|r| *r != revision);
        let removed = entries.maps.remove(&revision).is_some();
        if removed {
            trace!(revision = revision.0, "block cache evicted");
        }
        removed
    }

    /// Drop every revision.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.maps.clear();
        entries.order.clear();
    }

    /// Number of cached revisions.
    pub fn len(&self) -> usize {
        self.entries.lock().maps.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `revision` is cached.
    pub fn contains(&self, revision: Revision) -> bool {
        self.entries.lock().maps.contains_key(&revision)
    }
}

// ─── Linter ───

type Pass = fn(&LintContext<'_>, &mut Vec<Diagnostic>);

const PASSES: [(&str, Pass); 6] = [
    ("syntax", syntax::check_syntax),
    ("directives", directives::check_directives),
    ("declarations", declarations::check_declarations),
    ("metadata", metadata::check_attachments),
    ("time_tags", time_tag::check_time_tags),
    ("arguments", args::check_commands),
];

/// Runs every validation pass over a document.
///
/// A `Linter` is cheap to share: it is `Send + Sync` and keeps only its
/// configuration, hooks, and block cache.
pub struct Linter {
    config: LintConfig,
    distance: DistanceFn,
    overrides: Vec<Arc<dyn ArgumentOverride>>,
    cache: BlockCache,
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}

impl std::fmt::Debug for Linter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linter")
            .field("config", &self.config)
            .field("overrides", &self.overrides.len())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Linter {
    /// A linter with Levenshtein suggestions and no overrides.
    pub fn new(config: LintConfig) -> Self {
        let cache = BlockCache::new(config.block_cache_capacity);
        Self {
            config,
            distance: Arc::new(levenshtein),
            overrides: Vec::new(),
            cache,
        }
    }

    /// Replace the suggestion distance function (builder pattern).
    pub fn with_distance(mut self, distance: DistanceFn) -> Self {
        self.distance = distance;
        self
    }

    /// Append an argument override; overrides run in insertion order (builder pattern).
    pub fn with_override(mut self, hook: Arc<dyn ArgumentOverride>) -> Self {
        self.overrides.push(hook);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// The revision-keyed block cache.
    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    /// Block structure of a document, memoized when a revision is given.
    pub fn block_map(
        &self,
        tree: &SyntaxTree,
        dialect: Dialect,
        revision: Option<Revision>,
    ) -> Arc<BlockMap> {
        let build = || match_blocks(tree, dialect.mapper());
        match revision {
            Some(rev) => self.cache.get_or_insert_with(rev, build),
            None => Arc::new(build()),
        }
    }

    /// Validate one document.
    pub fn lint(&self, input: &LintInput<'_>) -> LintResult {
        let tree = input.tree;
        debug!(
            dialect = %input.dialect,
            revision = ?input.revision.map(|r| r.0),
            dictionary = input.dictionary.is_some(),
            "lint started"
        );
        let globals = input
            .aux
            .global_variables
            .iter()
            .chain(&self.config.global_variables)
            .map(String::as_str);
        let variables = VariableTable::collect(tree, globals);
        let line_index = LineIndex::new(tree.source());
        let cx = LintContext {
            tree,
            mapper: input.dialect.mapper(),
            dictionary: input.dictionary,
            aux: &input.aux,
            config: &self.config,
            distance: &*self.distance,
            overrides: &self.overrides,
            variables: &variables,
            line_index: &line_index,
        };

        let mut issues = Vec::new();
        for (name, pass) in PASSES {
            let before = issues.len();
            pass(&cx, &mut issues);
            debug!(pass = name, found = issues.len() - before, "pass finished");
        }
        let block_map = self.block_map(tree, input.dialect, input.revision);
        let before = issues.len();
        blocks::check_blocks(&cx, &block_map, &mut issues);
        debug!(pass = "blocks", found = issues.len() - before, "pass finished");

        issues.sort_by_key(|d| d.span.start);
        let ok = !issues.iter().any(Diagnostic::is_error);
        debug!(total = issues.len(), ok, "lint finished");
        LintResult {
            ok,
            diagnostics: issues,
        }
    }
}

/// Lint a document with the default configuration.
pub fn lint(
    tree: &SyntaxTree,
    dialect: Dialect,
    dictionary: Option<&CommandDictionary>,
    aux: Auxiliary<'_>,
) -> Vec<Diagnostic> {
    let mut input = LintInput::new(tree, dialect).with_aux(aux);
    input.dictionary = dictionary;
    Linter::default().lint(&input).diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_seqn;

    #[test]
    fn cache_memoizes_and_evicts_oldest() {
        let cache = BlockCache::new(2);
        let mut builds = 0;
        for rev in [1, 2, 1, 3] {
            cache.get_or_insert_with(Revision(rev), || {
                builds += 1;
                BlockMap::new()
            });
        }
        assert_eq!(builds, 3);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(Revision(1)));
        assert!(cache.contains(Revision(3)));
        assert!(cache.evict(Revision(3)));
        assert!(!cache.evict(Revision(3)));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn block_map_shared_per_revision() {
        let linter = Linter::default();
        let tree = parse_seqn("C IF x\nC END_IF\n");
        let a = linter.block_map(&tree, Dialect::Seqn, Some(Revision(7)));
        let b = linter.block_map(&tree, Dialect::Seqn, Some(Revision(7)));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn linter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Linter>();
    }

    #[test]
    fn diagnostics_are_ordered() {
        let tree = parse_seqn("C IF x\nSTEM\n@BOGUS\n");
        let diags = lint(&tree, Dialect::Seqn, None, Auxiliary::default());
        assert!(diags.len() >= 3);
        assert!(diags.windows(2).all(|w| w[0].span.start <= w[1].span.start));
    }
}
