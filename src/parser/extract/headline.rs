use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

// Proper-noun heuristic: runs of capitalized words, each uppercase
// first letter then lowercase.
static CAP_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*").unwrap());

/// Company-name disambiguation for headline-style titles: the
/// capitalized run nearest a funding verb. Intentionally misfires on
/// unusual capitalization; this is a heuristic, not a grammar.
pub struct HeadlineParser {
    verb_re: Option<Regex>,
}

impl HeadlineParser {
    pub fn new(funding_verbs: &[String]) -> Result<Self> {
        if funding_verbs.is_empty() {
            return Ok(Self { verb_re: None });
        }
        let alternation = funding_verbs
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        let verb_re = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))?;
        Ok(Self {
            verb_re: Some(verb_re),
        })
    }

    /// `None` when no funding verb occurs in the title, or no
    /// capitalized run precedes the first one.
    pub fn company_from_title(&self, title: &str) -> Option<String> {
        let verb = self.verb_re.as_ref()?.find(title)?;
        CAP_RUN_RE
            .find_iter(&title[..verb.start()])
            .last()
            .map(|m| m.as_str().to_string())
    }
}

// ── Tests ──
