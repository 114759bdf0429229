use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Extraction vocabulary and policy. Every matcher in the pipeline is
/// compiled from one of these at construction; nothing reads
/// process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Funding-related terms, matched whole-word and case-insensitive.
    pub vocabulary: Vec<String>,
    /// Currency glyphs checked by substring presence and used in the
    /// amount pattern's character class.
    pub currency_glyphs: Vec<char>,
    /// Verbs that anchor company-name disambiguation in headlines.
    pub funding_verbs: Vec<String>,
    /// Line marking the start of the deals section in a digest body.
    pub section_start: String,
    /// Line marking the end of the deals section; it and everything
    /// after it are discarded.
    pub section_stop: String,
    /// Headline-mode match policy: require both a keyword and a
    /// currency glyph (true), or either one (false).
    pub require_both: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            vocabulary: [
                "funding", "raises", "raised", "raising", "series", "seed",
                "investment", "invested", "investing", "valuation", "round",
                "capital", "venture", "equity", "financing",
            ]
            .map(String::from)
            .to_vec(),
            currency_glyphs: vec!['€', '$', '£', '¥'],
            funding_verbs: [
                "raises", "secures", "lands", "gets", "closes", "announces",
                "completes",
            ]
            .map(String::from)
            .to_vec(),
            section_start: "VENTURE DEALS".to_string(),
            section_stop: "PRIVATE EQUITY".to_string(),
            require_both: true,
        }
    }
}

impl ExtractConfig {
    /// Load overrides from a JSON file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let cfg = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(cfg)
    }
}
