// src/html.rs
//! Pulls the sequence block out of the lookup page.
//!
//! The service answers with a full HTML page; the sequence sits in a single element
//! carrying `id="seq"` (a `<pre>` in practice). Scanning is local to that element and
//! tolerant of attribute order, quoting and case. Its text is a FASTA-like header line
//! followed by sequence lines.

use std::sync::OnceLock;

use regex::Regex;

fn seq_open_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\bid\s*=\s*["']?seq["']?(?:\s[^>]*)?>"#)
            .expect("static regex")
    })
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"))
}

fn line_break_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("static regex"))
}

/// Text content of the `id="seq"` element, or `None` if the page has no such element.
pub fn extract_seq_block(html: &str) -> Option<String> {
    let open = seq_open_tag().captures(html)?;
    let whole = open.get(0)?;
    let tag = open.get(1)?.as_str().to_ascii_lowercase();

    let rest = &html[whole.end()..];
    let close = format!("</{tag}");
    let end = find_ascii_case_insensitive(rest, &close).unwrap_or(rest.len());
    let inner = &rest[..end];

    let inner = line_break_tag().replace_all(inner, "\n");
    let text = any_tag().replace_all(&inner, "");
    Some(decode_entities(&text))
}

/// Drops the header line and joins the rest with no separator.
pub fn sequence_from_block(text: &str) -> Option<String> {
    let joined: String = text.lines().skip(1).map(str::trim).collect();
    let joined = joined.trim();
    if joined.is_empty() {
        None
    } else {
        Some(joined.to_string())
    }
}

/// Decodes the handful of entities the service emits, plus numeric references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').filter(|&semi| semi <= 10) {
            Some(semi) => match decode_one(&tail[1..semi]) {
                Some(c) => {
                    out.push(c);
                    rest = &tail[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_one(entity: &str) -> Option<char> {
    match entity {
        "gt" => Some('>'),
        "lt" => Some('<'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}
