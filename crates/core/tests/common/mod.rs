//! Shared test helpers for `seqlint_core` integration tests.

#![allow(unreachable_pub)]

use seqlint_core::{
    Auxiliary, CommandDictionary, Diagnostic, Dialect, LintInput, LintResult, Linter,
    load_dictionary_from_str,
};
use std::sync::LazyLock;

/// Fixture dictionary loaded once per test binary via LazyLock.
pub static DICTIONARY: LazyLock<CommandDictionary> = LazyLock::new(|| {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dictionary.json");
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    load_dictionary_from_str(&json)
        .unwrap_or_else(|e| panic!("failed to load {}: {}", path.display(), e))
});

// ─── Lint helpers ────────────────────────────────────────────────────────────

/// Lint source text with the fixture dictionary and default configuration.
#[allow(dead_code)]
pub fn lint_source(dialect: Dialect, src: &str) -> LintResult {
    lint_with(&Linter::default(), dialect, src, Auxiliary::default())
}

/// Lint source text with a specific linter and host declarations.
#[allow(dead_code)]
pub fn lint_with(linter: &Linter, dialect: Dialect, src: &str, aux: Auxiliary<'_>) -> LintResult {
    let tree = dialect.parse(src);
    let input = LintInput::new(&tree, dialect)
        .with_dictionary(&DICTIONARY)
        .with_aux(aux);
    linter.lint(&input)
}

/// Diagnostics for seq-n source.
#[allow(dead_code)]
pub fn seqn(src: &str) -> Vec<Diagnostic> {
    lint_source(Dialect::Seqn, src).diagnostics
}

/// Diagnostics for VML source.
#[allow(dead_code)]
pub fn vml(src: &str) -> Vec<Diagnostic> {
    lint_source(Dialect::Vml, src).diagnostics
}

/// Collect diagnostic codes in order.
#[allow(dead_code)]
pub fn ids(issues: &[Diagnostic]) -> Vec<&str> {
    issues.iter().map(|d| d.id.as_ref()).collect()
}

/// Find the first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    issues
        .iter()
        .find(|d| d.id == code)
        .unwrap_or_else(|| panic!("expected {code} in {issues:#?}"))
}

/// Apply the fix action with the given label.
#[allow(dead_code)]
pub fn apply_fix(src: &str, diag: &Diagnostic, label: &str) -> String {
    diag.fix_actions
        .iter()
        .find(|f| f.label == label)
        .unwrap_or_else(|| panic!("no fix '{label}' in {diag:#?}"))
        .apply(src)
}
