//! Tree-shaking of compiled stylesheets against the generated HTML.
//!
//! Content is reduced to a bag of words by [`extract_tokens`]. A selector
//! survives when at least one of its class, id, tag or attribute names is
//! in that bag or in the safelist; selectors with no names at all (`*`,
//! `:root`) always survive. A rule disappears with its last selector.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Word characters plus `-`, `/` and `:`. A match may not end in `:`.
const EXTRACTOR_PATTERN: &str = r"[A-Za-z0-9_/:-]+";

/// At-rules whose bodies are themselves rule lists.
const GROUPING_RULES: &[&str] = &[
    "media",
    "supports",
    "layer",
    "container",
    "document",
    "-moz-document",
    "scope",
];

fn extractor() -> &'static Regex {
    static EXTRACTOR: OnceLock<Regex> = OnceLock::new();
    EXTRACTOR.get_or_init(|| Regex::new(EXTRACTOR_PATTERN).expect("extractor pattern is valid"))
}

/// Splits `content` into candidate selector names.
pub fn extract_tokens(content: &str) -> impl Iterator<Item = &str> {
    extractor()
        .find_iter(content)
        .map(|m| m.as_str().trim_end_matches(':'))
        .filter(|token| !token.is_empty())
}

pub struct Purger {
    used: HashSet<String>,
    safelist: HashSet<String>,
}

impl Purger {
    pub fn new<I, S>(contents: I, safelist: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut used = HashSet::new();
        for content in contents {
            used.extend(extract_tokens(content.as_ref()).map(str::to_string));
        }
        Self {
            used,
            safelist: safelist.iter().cloned().collect(),
        }
    }

    /// Returns `css` without the rules no selector of which is referenced.
    pub fn purge(&self, css: &str) -> String {
        let mut out = String::with_capacity(css.len());
        self.purge_rules(css, &mut out);
        out
    }

    fn is_known(&self, name: &str) -> bool {
        self.used.contains(name) || self.safelist.contains(name)
    }

    fn selector_used(&self, selector: &str) -> bool {
        let components = selector_components(selector);
        components.is_empty()
            || components
                .iter()
                .any(|alternatives| alternatives.iter().any(|name| self.is_known(name)))
    }

    fn purge_rules(&self, css: &str, out: &mut String) {
        let bytes = css.as_bytes();
        let mut i = 0;

        loop {
            i = skip_trivia(css, i);
            if i >= bytes.len() {
                break;
            }

            let Some(end) = prelude_end(bytes, i) else {
                out.push_str(css[i..].trim());
                break;
            };
            let prelude = css[i..end].trim();

            if bytes[end] == b';' {
                out.push_str(prelude);
                out.push(';');
                i = end + 1;
                continue;
            }

            let Some(close) = block_end(bytes, end) else {
                out.push_str(css[i..].trim());
                break;
            };
            let body = &css[end + 1..close];
            i = close + 1;

            if let Some(at) = prelude.strip_prefix('@') {
                let name = at_rule_name(at).to_ascii_lowercase();
                if GROUPING_RULES.contains(&name.as_str()) {
                    let mut inner = String::new();
                    self.purge_rules(body, &mut inner);
                    if !inner.trim().is_empty() {
                        push_rule(out, prelude, &inner);
                    }
                } else {
                    push_rule(out, prelude, body);
                }
                continue;
            }

            let kept: Vec<&str> = split_selectors(prelude)
                .into_iter()
                .filter(|selector| self.selector_used(selector))
                .collect();
            if !kept.is_empty() {
                push_rule(out, &kept.join(","), body);
            }
        }
    }
}

fn push_rule(out: &mut String, prelude: &str, body: &str) {
    out.push_str(prelude);
    out.push('{');
    out.push_str(body);
    out.push('}');
}

fn at_rule_name(at: &str) -> &str {
    let end = at
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(at.len());
    &at[..end]
}

/// Skips whitespace, comments and stray semicolons.
fn skip_trivia(css: &str, mut i: usize) -> usize {
    let bytes = css.as_bytes();
    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b';') {
            i += 1;
        }
        if bytes[i..].starts_with(b"/*") {
            i = skip_comment(bytes, i);
            continue;
        }
        return i;
    }
}

/// `bytes[i]` opens a comment; returns the index just past it.
fn skip_comment(bytes: &[u8], i: usize) -> usize {
    let mut j = i + 2;
    while j + 1 < bytes.len() {
        if bytes[j] == b'*' && bytes[j + 1] == b'/' {
            return j + 2;
        }
        j += 1;
    }
    bytes.len()
}

/// `bytes[i]` is a quote; returns the index just past the closing quote.
fn skip_string(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

/// Position of the first top-level `{` or `;` at or after `i`.
fn prelude_end(bytes: &[u8], i: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = i;
    while j < bytes.len() {
        match bytes[j] {
            b'"' | b'\'' => j = skip_string(bytes, j),
            b'/' if bytes.get(j + 1) == Some(&b'*') => j = skip_comment(bytes, j),
            b'\\' => j += 2,
            b'(' | b'[' => {
                depth += 1;
                j += 1;
            }
            b')' | b']' => {
                depth = depth.saturating_sub(1);
                j += 1;
            }
            b'{' | b';' if depth == 0 => return Some(j),
            _ => j += 1,
        }
    }
    None
}

/// `bytes[open]` is `{`; returns the index of its matching `}`.
fn block_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = open;
    while j < bytes.len() {
        match bytes[j] {
            b'"' | b'\'' => j = skip_string(bytes, j),
            b'/' if bytes.get(j + 1) == Some(&b'*') => j = skip_comment(bytes, j),
            b'\\' => j += 2,
            b'{' => {
                depth += 1;
                j += 1;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
                j += 1;
            }
            _ => j += 1,
        }
    }
    None
}

/// Splits a selector list on commas outside brackets, parens and strings.
fn split_selectors(prelude: &str) -> Vec<&str> {
    let bytes = prelude.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut j = 0;

    while j < bytes.len() {
        match bytes[j] {
            b'"' | b'\'' => {
                j = skip_string(bytes, j);
                continue;
            }
            b'\\' => {
                j += 2;
                continue;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(prelude[start..j].trim());
                start = j + 1;
            }
            _ => {}
        }
        j += 1;
    }
    parts.push(prelude[start.min(prelude.len())..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

/// The named parts of one selector. Each entry lists the spellings under
/// which that part may be found; attributes match by full text or name.
fn selector_components(selector: &str) -> Vec<Vec<String>> {
    let chars: Vec<char> = selector.chars().collect();
    let mut components = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '.' | '#' => {
                let (name, next) = read_ident(&chars, i + 1);
                if !name.is_empty() {
                    components.push(vec![name]);
                }
                i = next;
            }
            '[' => {
                let close = find_close(&chars, i, '[', ']');
                let raw: String = chars[i..(close + 1).min(chars.len())].iter().collect();
                let inner: String = chars[i + 1..close.min(chars.len())]
                    .iter()
                    .take_while(|c| !matches!(**c, '=' | '~' | '|' | '^' | '$' | '*'))
                    .collect();
                components.push(vec![raw, inner.trim().to_string()]);
                i = close + 1;
            }
            ':' => {
                i += 1;
                if chars.get(i) == Some(&':') {
                    i += 1;
                }
                let (_, next) = read_ident(&chars, i);
                i = next;
                if chars.get(i) == Some(&'(') {
                    i = find_close(&chars, i, '(', ')') + 1;
                }
            }
            c if is_ident_start(c) || c == '\\' => {
                let (name, next) = read_ident(&chars, i);
                if !name.is_empty() {
                    components.push(vec![name]);
                }
                i = next.max(i + 1);
            }
            _ => i += 1,
        }
    }

    components
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Reads an identifier starting at `i`, resolving CSS escapes.
fn read_ident(chars: &[char], mut i: usize) -> (String, usize) {
    let mut name = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            let Some(&next) = chars.get(i + 1) else {
                i += 1;
                break;
            };
            if next.is_ascii_hexdigit() {
                let mut j = i + 1;
                let mut value = 0u32;
                while j < chars.len() && j < i + 7 && chars[j].is_ascii_hexdigit() {
                    value = value * 16 + chars[j].to_digit(16).unwrap_or(0);
                    j += 1;
                }
                if chars.get(j).is_some_and(|c| c.is_whitespace()) {
                    j += 1;
                }
                name.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
                i = j;
            } else {
                name.push(next);
                i += 2;
            }
        } else if is_ident_char(c) {
            name.push(c);
            i += 1;
        } else {
            break;
        }
    }
    (name, i)
}

/// Index of the bracket closing the one at `open`, or `chars.len()`.
fn find_close(chars: &[char], open: usize, opening: char, closing: char) -> usize {
    let mut depth = 0usize;
    let mut j = open;
    while j < chars.len() {
        let c = chars[j];
        if c == '\\' {
            j += 2;
            continue;
        }
        if c == opening {
            depth += 1;
        } else if c == closing {
            depth -= 1;
            if depth == 0 {
                return j;
            }
        }
        j += 1;
    }
    chars.len()
}
