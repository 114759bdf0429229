use anyhow::Result;
use regex::Regex;

use crate::config::ExtractConfig;

/// Ordered keyword hits plus currency-glyph presence for one text blob.
#[derive(Debug)]
pub struct KeywordHits {
    /// Matched vocabulary terms, in vocabulary order.
    pub keywords: Vec<String>,
    pub has_currency: bool,
}

impl KeywordHits {
    /// Match decision under the call site's policy: with `require_both`
    /// a keyword and a glyph must both be present, otherwise either
    /// suffices.
    pub fn is_match(&self, require_both: bool) -> bool {
        if require_both {
            !self.keywords.is_empty() && self.has_currency
        } else {
            !self.keywords.is_empty() || self.has_currency
        }
    }
}

/// Whole-word, case-insensitive vocabulary scan. One compiled pattern
/// per term, so "rounded" never hits "round".
pub struct KeywordMatcher {
    terms: Vec<(String, Regex)>,
    glyphs: Vec<char>,
}

impl KeywordMatcher {
    pub fn new(cfg: &ExtractConfig) -> Result<Self> {
        let mut terms = Vec::with_capacity(cfg.vocabulary.len());
        for term in &cfg.vocabulary {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))?;
            terms.push((term.clone(), re));
        }
        Ok(Self {
            terms,
            glyphs: cfg.currency_glyphs.clone(),
        })
    }

    pub fn scan(&self, text: &str) -> KeywordHits {
        let keywords = self
            .terms
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(term, _)| term.clone())
            .collect();
        let has_currency = self.glyphs.iter().any(|g| text.contains(*g));
        KeywordHits {
            keywords,
            has_currency,
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::new(&ExtractConfig::default()).unwrap()
    }

    #[test]
    fn whole_word_only() {
        let hits = matcher().scan("prices rounded up across the board");
        assert!(!hits.keywords.contains(&"round".to_string()));
    }

    #[test]
    fn case_insensitive_whole_word() {
        let hits = matcher().scan("A new Funding Round was announced");
        assert!(hits.keywords.contains(&"funding".to_string()));
        assert!(hits.keywords.contains(&"round".to_string()));
    }

    #[test]
    fn keywords_in_vocabulary_order() {
        let hits = matcher().scan("the round of seed funding");
        assert_eq!(hits.keywords, vec!["funding", "seed", "round"]);
    }

    #[test]
    fn currency_glyph_detection() {
        assert!(matcher().scan("they took in €3 million").has_currency);
        assert!(!matcher().scan("no numbers here").has_currency);
    }

    #[test]
    fn policy_require_both() {
        let m = matcher();
        let keyword_only = m.scan("a seed round");
        assert!(!keyword_only.is_match(true));
        assert!(keyword_only.is_match(false));

        let both = m.scan("a $2 million seed round");
        assert!(both.is_match(true));

        let currency_only = m.scan("shares fell to $3");
        assert!(!currency_only.is_match(true));
        assert!(currency_only.is_match(false));
    }
}
