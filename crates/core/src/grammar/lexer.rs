use super::tree::NodeKind;

/// Classification of a lexer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// A run of characters that are not whitespace, quotes, or punctuation.
    Word,
    /// A double-quoted string, quotes included.
    String,
    /// A string missing its closing quote; runs to end of line.
    UnterminatedString,
    /// `,`
    Comma,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// Comment from the comment character to end of line.
    Comment,
    /// A line feed (CRLF and lone CR are normalized into one token).
    Newline,
    /// One or more whitespace characters (excluding newlines).
    Whitespace,
}

/// A token that borrows its text directly from the source input.
///
/// `text` is always exactly `&input[start..end]`.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Borrowed slice of the source input for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Tokenize sequence source. `comment` starts a comment running to end of line
/// (`#` for seq-n, `;` for VML).
///
/// All structural characters are ASCII, so byte-wise scanning never splits
/// a UTF-8 sequence: continuation bytes are all >= 0x80.
pub fn tokenize(input: &str, comment: u8) -> Vec<Token<'_>> {
    let mut toks = Vec::new();
    let b = input.as_bytes();
    let mut i = 0usize;
    while i < b.len() {
        let start = i;
        let c = b[i];
        let kind = match c {
            b'\n' | b'\r' => {
                i += if c == b'\r' && b.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                TokKind::Newline
            }
            b' ' | b'\t' | b'\x0c' => {
                while i < b.len() && matches!(b[i], b' ' | b'\t' | b'\x0c') {
                    i += 1;
                }
                TokKind::Whitespace
            }
            b'"' => {
                i += 1;
                let mut terminated = false;
                while i < b.len() && !matches!(b[i], b'\n' | b'\r') {
                    match b[i] {
                        b'\\' if i + 1 < b.len() && !matches!(b[i + 1], b'\n' | b'\r') => i += 2,
                        b'"' => {
                            i += 1;
                            terminated = true;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                if terminated {
                    TokKind::String
                } else {
                    TokKind::UnterminatedString
                }
            }
            b',' => {
                i += 1;
                TokKind::Comma
            }
            b'[' => {
                i += 1;
                TokKind::LBracket
            }
            b']' => {
                i += 1;
                TokKind::RBracket
            }
            b'(' => {
                i += 1;
                TokKind::LParen
            }
            b')' => {
                i += 1;
                TokKind::RParen
            }
            _ if c == comment => {
                while i < b.len() && !matches!(b[i], b'\n' | b'\r') {
                    i += 1;
                }
                TokKind::Comment
            }
            _ => {
                i += 1;
                while i < b.len()
                    && !matches!(
                        b[i],
                        b'\n' | b'\r' | b' ' | b'\t' | b'\x0c' | b'"' | b',' | b'[' | b']' | b'(' | b')'
                    )
                    && b[i] != comment
                {
                    i += 1;
                }
                TokKind::Word
            }
        };
        toks.push(Token {
            kind,
            text: &input[start..i],
            start,
            end: i,
        });
    }
    toks
}

/// Split a token stream into lines, dropping whitespace and newline tokens.
///
/// Blank lines are kept as empty vectors so line numbering stays aligned.
pub fn split_lines<'a>(toks: &[Token<'a>]) -> Vec<Vec<Token<'a>>> {
    let mut lines = vec![Vec::new()];
    for tok in toks {
        match tok.kind {
            TokKind::Newline => lines.push(Vec::new()),
            TokKind::Whitespace => {}
            _ => {
                if let Some(line) = lines.last_mut() {
                    line.push(*tok);
                }
            }
        }
    }
    lines
}

// ─── Word classification ───

/// Whether `text` is a decimal or `0x` hexadecimal number literal.
pub fn is_number_literal(text: &str) -> bool {
    parse_number(text).is_some()
}

/// Parse a number literal. Hexadecimal literals (`0x1F`, `-0x1F`) are integral.
pub fn parse_number(text: &str) -> Option<f64> {
    let (neg, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let value = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        i128::from_str_radix(hex, 16).ok()? as f64
    } else {
        // Reject forms Rust accepts but sequence languages do not.
        if body.is_empty()
            || !body.as_bytes()[0].is_ascii_digit() && !body.starts_with('.')
            || body.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
        {
            return None;
        }
        body.parse::<f64>().ok()?
    };
    Some(if neg { -value } else { value })
}

/// Whether `text` is a hexadecimal literal.
pub fn is_hex_literal(text: &str) -> bool {
    let body = text.trim_start_matches(['-', '+']);
    body.starts_with("0x") || body.starts_with("0X")
}

/// Whether `text` is an integral literal (hex, or decimal without fraction or exponent).
pub fn is_integer_literal(text: &str) -> bool {
    is_hex_literal(text) && is_number_literal(text)
        || is_number_literal(text) && !text.contains(['.', 'e', 'E'])
}

/// Whether `text` is a boolean literal.
pub fn is_boolean_literal(text: &str) -> bool {
    matches!(text, "TRUE" | "FALSE" | "true" | "false")
}

/// Classify a word as a time tag, returning the concrete time-tag kind.
///
/// `C` is command-complete; `A`, `R` and `E` prefixes must be followed by a
/// digit (or `T` for relative, a sign for epoch) so stems such as `RESET`
/// are not mistaken for time tags.
pub fn time_tag_kind(text: &str) -> Option<NodeKind> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let second = chars.next();
    match (first, second) {
        ('C', None) => Some(NodeKind::TimeComplete),
        ('A', Some(c)) if c.is_ascii_digit() => Some(NodeKind::TimeAbsolute),
        ('R', Some(c)) if c.is_ascii_digit() || c == 'T' => Some(NodeKind::TimeRelative),
        ('E', Some(c)) if c.is_ascii_digit() || c == '+' || c == '-' => Some(NodeKind::TimeEpoch),
        _ => None,
    }
}

/// Remove surrounding double quotes, if present.
pub fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .map(|t| t.strip_suffix('"').unwrap_or(t))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokKind> {
        tokenize(input, b'#').iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_command_line() {
        let toks = tokenize("C STEM 1 \"a b\" [1 2] # note", b'#');
        let words: Vec<_> = toks
            .iter()
            .filter(|t| t.kind != TokKind::Whitespace)
            .map(|t| t.text)
            .collect();
        assert_eq!(words, ["C", "STEM", "1", "\"a b\"", "[", "1", "2", "]", "# note"]);
    }

    #[test]
    fn crlf_is_one_newline() {
        assert_eq!(
            kinds("A\r\nB"),
            [TokKind::Word, TokKind::Newline, TokKind::Word]
        );
    }

    #[test]
    fn escaped_quote_stays_in_string() {
        let toks = tokenize(r#""a\"b" x"#, b'#');
        assert_eq!(toks[0].kind, TokKind::String);
        assert_eq!(toks[0].text, r#""a\"b""#);
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        let toks = tokenize("\"abc\nX", b'#');
        assert_eq!(toks[0].kind, TokKind::UnterminatedString);
        assert_eq!(toks[0].text, "\"abc");
        assert_eq!(toks[2].text, "X");
    }

    #[test]
    fn vml_comment_character() {
        let toks = tokenize("ISSUE X ; trailing, comment", b';');
        assert_eq!(toks.last().unwrap().kind, TokKind::Comment);
        assert_eq!(toks.last().unwrap().text, "; trailing, comment");
    }

    #[test]
    fn lines_keep_blank_entries() {
        let toks = tokenize("A\n\n  B C\n", b'#');
        let lines = split_lines(&toks);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].is_empty());
        assert_eq!(lines[2].len(), 2);
    }

    #[test]
    fn number_literals() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("-1.5"), Some(-1.5));
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("-0x10"), Some(-16.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("0xZZ"), None);
        assert_eq!(parse_number("ABC"), None);
        assert!(is_integer_literal("0xFF"));
        assert!(is_integer_literal("-7"));
        assert!(!is_integer_literal("7.0"));
    }

    #[test]
    fn time_tag_words() {
        assert_eq!(time_tag_kind("C"), Some(NodeKind::TimeComplete));
        assert_eq!(time_tag_kind("A2024-001T00:00:00"), Some(NodeKind::TimeAbsolute));
        assert_eq!(time_tag_kind("R00:00:01"), Some(NodeKind::TimeRelative));
        assert_eq!(time_tag_kind("R10"), Some(NodeKind::TimeRelative));
        assert_eq!(time_tag_kind("E-00:00:01"), Some(NodeKind::TimeEpoch));
        assert_eq!(time_tag_kind("RESET"), None);
        assert_eq!(time_tag_kind("CMD"), None);
    }

    #[test]
    fn unquote_strips_pairs() {
        assert_eq!(unquote("\"ON\""), "ON");
        assert_eq!(unquote("\"ON"), "ON");
        assert_eq!(unquote("ON"), "ON");
    }
}
