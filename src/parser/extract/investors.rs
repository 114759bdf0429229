//! Cleans a raw investor clause into an ordered, deduplicated list of
//! names. The separators here are fixed English list grammar, not
//! configuration, so the patterns live in compiled statics.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static AND_OTHERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*,?\s*and\s+others?\s*").unwrap());
// "existing investors" introduces another name list rather than naming
// an investor, so it becomes a separator.
static EXISTING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*,?\s*existing\s+investors?\s*").unwrap());
static LIST_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*|\s+and\s+").unwrap());
static GLUED_AND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+and([A-Z])").unwrap());
static BARE_AND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\band\b").unwrap());

/// Normalize a raw investor clause. Idempotent: feeding the rejoined
/// output back in yields the same list. An empty clause yields an
/// empty list, never sentinel text.
///
/// Known limitation: a name literally containing a bare "and"
/// ("X and Y Ventures") is false-split; there is no exception list.
pub fn normalize(clause: &str) -> Vec<String> {
    let cleaned = AND_OTHERS_RE.replace_all(clause, "");
    let cleaned = EXISTING_RE.replace_all(&cleaned, ",");
    let cleaned = cleaned.trim().trim_end_matches(',').trim();

    let mut tokens: Vec<String> = LIST_SPLIT_RE
        .split(cleaned)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    // A sentence-final period belongs to the sentence, not the name.
    if let Some(last) = tokens.last_mut() {
        *last = last.trim_end_matches('.').to_string();
    }

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for token in tokens {
        for name in split_embedded_and(&token) {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
    }
    names
}

/// Break a token still carrying an embedded "and" into its named
/// halves: the glued form "A andB" and a residual whole-word "and"
/// the list split missed (e.g. clause-initial "and X").
fn split_embedded_and(token: &str) -> Vec<String> {
    let unglued = GLUED_AND_RE.replace_all(token, ", $1");
    unglued
        .split(',')
        .flat_map(|part| match BARE_AND_RE.find(part) {
            Some(m) => vec![part[..m.start()].to_string(), part[m.end()..].to_string()],
            None => vec![part.to_string()],
        })
        .map(|s| s.trim().trim_matches(',').trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ── Tests ──
