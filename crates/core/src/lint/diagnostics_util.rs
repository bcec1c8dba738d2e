use seqlint_diagnostics::{Diagnostic, Severity, Span, message_template_for, severity_for_code};
use std::collections::HashMap;

/// Build a diagnostic with the severity declared for `id`.
pub(super) fn diagnostic_with_spec_severity(
    id: &'static str,
    message: impl Into<String>,
    span: Span,
) -> Diagnostic {
    Diagnostic::new(
        id,
        severity_for_code(id).unwrap_or(Severity::Error),
        message.into(),
        span,
    )
}

/// Render a message template, falling back to `fallback` when none exists.
pub(super) fn render_diagnostic_message(
    id: &'static str,
    variant: &str,
    substitutions: &[(&str, String)],
    fallback: String,
) -> String {
    let Some(template) = message_template_for(id, variant) else {
        return fallback;
    };
    let substitution_map: HashMap<&str, &str> = substitutions
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .collect();
    let mut rendered = String::with_capacity(template.len() + 16);
    let mut scan_from = 0usize;
    while let Some(open_rel) = template[scan_from..].find('{') {
        let open = scan_from + open_rel;
        rendered.push_str(&template[scan_from..open]);
        let after_open = open + 1;
        if let Some(close_rel) = template[after_open..].find('}') {
            let close = after_open + close_rel;
            let key = &template[after_open..close];
            if let Some(value) = substitution_map.get(key) {
                rendered.push_str(value);
            } else {
                rendered.push_str(&template[open..=close]);
            }
            scan_from = close + 1;
        } else {
            rendered.push_str(&template[open..]);
            return rendered;
        }
    }
    rendered.push_str(&template[scan_from..]);
    rendered
}

/// Format a number without trailing zeros.
pub(super) fn trim_f64(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let s = format!("{:.6}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    if s.is_empty() || s == "-0" { "0".to_string() } else { s }
}
