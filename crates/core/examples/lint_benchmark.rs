//! Lightweight parse/block/lint benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p seqlint_core --example lint_benchmark --release`

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use seqlint_core::{
    CommandDictionary, Dialect, LintInput, Linter, Revision, load_dictionary_from_str,
};

fn load_dictionary() -> Result<CommandDictionary, String> {
    let mut candidates: Vec<PathBuf> = vec![
        PathBuf::from("crates/core/tests/fixtures/dictionary.json"),
        PathBuf::from("tests/fixtures/dictionary.json"),
    ];
    if let Ok(from_env) = std::env::var("SEQLINT_DICTIONARY_JSON") {
        candidates.insert(0, PathBuf::from(from_env));
    }
    for path in candidates {
        if !path.exists() {
            continue;
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read dictionary at '{}': {e}", path.display()))?;
        return load_dictionary_from_str(&json)
            .map_err(|e| format!("failed to load dictionary at '{}': {e}", path.display()));
    }
    Err("unable to locate a command dictionary; set SEQLINT_DICTIONARY_JSON".to_string())
}

/// A seq-n document with `blocks` nested IF blocks and some deliberate errors.
fn generate_seqn(blocks: usize) -> String {
    let mut out = String::from("@ID \"bench\"\n@LOCALS_BEGIN\n  count INT\n@LOCALS_END\n");
    for i in 0..blocks {
        out.push_str("C IF count\n");
        out.push_str(&format!("R00:00:{:02} TURN_ON {} ON\n", i % 60, i % 12));
        out.push_str("C SEND_PAIRS [1 true 2 false]\n");
        out.push_str("C TURN_OF\n");
        out.push_str("C END_IF\n");
    }
    out
}

fn per_iter_ms(elapsed: std::time::Duration, iterations: usize) -> f64 {
    elapsed.as_secs_f64() * 1000.0 / iterations as f64
}

fn run_benchmark(label: &str, input: &str, dictionary: &CommandDictionary, iterations: usize) {
    let dialect = Dialect::Seqn;
    let linter = Linter::default();

    let parse_start = Instant::now();
    for _ in 0..iterations {
        let _ = dialect.parse(input);
    }
    let parse_elapsed = parse_start.elapsed();

    let tree = dialect.parse(input);

    let blocks_start = Instant::now();
    for _ in 0..iterations {
        let _ = linter.block_map(&tree, dialect, None);
    }
    let blocks_elapsed = blocks_start.elapsed();

    let lint_start = Instant::now();
    let mut found = 0;
    for _ in 0..iterations {
        let input = LintInput::new(&tree, dialect).with_dictionary(dictionary);
        found = linter.lint(&input).diagnostics.len();
    }
    let lint_elapsed = lint_start.elapsed();

    let cached_start = Instant::now();
    for _ in 0..iterations {
        let input = LintInput::new(&tree, dialect)
            .with_dictionary(dictionary)
            .with_revision(Revision(1));
        let _ = linter.lint(&input);
    }
    let cached_elapsed = cached_start.elapsed();

    println!("Benchmark: {label}");
    println!("  input_bytes: {}", input.len());
    println!("  diagnostics: {found}");
    println!(
        "  parse:        total={:?}, per_iter={:.3} ms",
        parse_elapsed,
        per_iter_ms(parse_elapsed, iterations)
    );
    println!(
        "  blocks:       total={:?}, per_iter={:.3} ms",
        blocks_elapsed,
        per_iter_ms(blocks_elapsed, iterations)
    );
    println!(
        "  lint:         total={:?}, per_iter={:.3} ms",
        lint_elapsed,
        per_iter_ms(lint_elapsed, iterations)
    );
    println!(
        "  lint(cached): total={:?}, per_iter={:.3} ms",
        cached_elapsed,
        per_iter_ms(cached_elapsed, iterations)
    );
}

fn main() -> Result<(), String> {
    let dictionary = load_dictionary()?;
    let iterations = std::env::var("SEQLINT_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(200);

    for (label, blocks) in [("small", 20), ("large", 2_000)] {
        run_benchmark(label, &generate_seqn(blocks), &dictionary, iterations);
    }

    Ok(())
}
