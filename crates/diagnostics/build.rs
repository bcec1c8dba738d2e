//! Generates diagnostic tables from `spec/diagnostics.json`.
//!
//! Outputs, all under `OUT_DIR`:
//! - `generated_codes.rs`: one `pub const` per code plus the `ALL` list
//! - `generated_explain.rs`: code → description
//! - `generated_severity.rs`: code → default severity
//! - `generated_templates.rs`: (code, variant) → message template

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::Path;

const SPEC_PATH: &str = "spec/diagnostics.json";
const HEADER: &str = "// Generated from spec/diagnostics.json. DO NOT EDIT.\n\n";

struct Entry {
    id: String,
    const_name: String,
    severity: &'static str,
    summary: String,
    description: String,
    templates: BTreeMap<String, String>,
}

fn main() {
    println!("cargo:rerun-if-changed={SPEC_PATH}");

    let raw = fs::read_to_string(SPEC_PATH)
        .unwrap_or_else(|e| panic!("failed to read {SPEC_PATH}: {e}"));
    let spec: Value = serde_json::from_str(&raw)
        .unwrap_or_else(|e| panic!("{SPEC_PATH} is not valid JSON: {e}"));
    let entries = read_entries(&spec);

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let out = Path::new(&out_dir);
    write(out, "generated_codes.rs", &codes_table(&entries));
    write(out, "generated_explain.rs", &lookup(&entries, |e| {
        format!("Some(\"{}\")", e.description.escape_default())
    }));
    write(out, "generated_severity.rs", &lookup(&entries, |e| format!("Some({})", e.severity)));
    write(out, "generated_templates.rs", &templates_table(&entries));
}

fn read_entries(spec: &Value) -> Vec<Entry> {
    let list = spec["diagnostics"]
        .as_array()
        .unwrap_or_else(|| panic!("{SPEC_PATH}: expected a `diagnostics` array"));

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    let mut entries = Vec::with_capacity(list.len());
    for (i, raw) in list.iter().enumerate() {
        let field = |key: &str| -> String {
            raw[key]
                .as_str()
                .unwrap_or_else(|| panic!("diagnostics[{i}] missing string `{key}`"))
                .to_string()
        };
        let id = field("id");
        assert!(is_code(&id), "diagnostics[{i}]: id '{id}' must look like SEQ0000");
        assert!(ids.insert(id.clone()), "duplicate id '{id}'");

        let const_name = field("constName");
        assert!(
            is_screaming_snake(&const_name),
            "{id}: constName '{const_name}' is not SCREAMING_SNAKE_CASE"
        );
        assert!(names.insert(const_name.clone()), "{id}: duplicate constName '{const_name}'");

        let severity = match field("severity").as_str() {
            "error" => "Severity::Error",
            "warn" => "Severity::Warn",
            other => panic!("{id}: invalid severity '{other}'"),
        };

        let context_keys: HashSet<&str> = raw["contextKeys"]
            .as_array()
            .unwrap_or_else(|| panic!("{id}: missing `contextKeys`"))
            .iter()
            .map(|k| k.as_str().unwrap_or_else(|| panic!("{id}: contextKeys must be strings")))
            .collect();
        let mut templates = BTreeMap::new();
        for (variant, template) in raw["messageTemplates"].as_object().into_iter().flatten() {
            let template = template
                .as_str()
                .unwrap_or_else(|| panic!("{id}: messageTemplates.{variant} must be a string"));
            for key in placeholders(template) {
                assert!(
                    context_keys.contains(key),
                    "{id}: messageTemplates.{variant} uses '{{{key}}}' which is not a context key"
                );
            }
            templates.insert(variant.clone(), template.to_string());
        }

        entries.push(Entry {
            summary: field("summary"),
            description: field("description"),
            id,
            const_name,
            severity,
            templates,
        });
    }
    entries
}

fn codes_table(entries: &[Entry]) -> String {
    let mut out = String::from(HEADER);
    for e in entries {
        out.push_str(&format!("/// {}\n", e.summary));
        out.push_str(&format!("pub const {}: &str = \"{}\";\n\n", e.const_name, e.id));
    }
    out.push_str("/// Every diagnostic code, in declaration order.\n");
    out.push_str("pub const ALL: &[&str] = &[\n");
    for e in entries {
        out.push_str(&format!("    {},\n", e.const_name));
    }
    out.push_str("];\n");
    out
}

fn lookup(entries: &[Entry], value: impl Fn(&Entry) -> String) -> String {
    let mut out = String::from("match id {\n");
    for e in entries {
        out.push_str(&format!("    \"{}\" => {},\n", e.id, value(e)));
    }
    out.push_str("    _ => None,\n}\n");
    out
}

fn templates_table(entries: &[Entry]) -> String {
    let mut out = String::from("match (id, variant) {\n");
    for e in entries {
        for (variant, template) in &e.templates {
            out.push_str(&format!(
                "    (\"{}\", \"{variant}\") => Some(\"{}\"),\n",
                e.id,
                template.escape_default()
            ));
        }
    }
    out.push_str("    _ => None,\n}\n");
    out
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap_or_else(|e| panic!("failed to write {name}: {e}"));
}

fn is_code(id: &str) -> bool {
    id.strip_prefix("SEQ")
        .is_some_and(|n| n.len() == 4 && n.bytes().all(|b| b.is_ascii_digit()))
}

fn is_screaming_snake(name: &str) -> bool {
    name.bytes().next().is_some_and(|b| b.is_ascii_uppercase())
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// `{key}` placeholders in a message template.
fn placeholders(template: &str) -> Vec<&str> {
    let mut keys = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let key = after[..close].trim();
        if !key.is_empty() {
            keys.push(key);
        }
        rest = &after[close + 1..];
    }
    keys
}
