use anyhow::Result;
use regex::Regex;

use crate::config::ExtractConfig;
use crate::parser::segments::DealBlock;

/// Raw field values pulled from one deal block. `None` means the rule
/// list for that field was exhausted; the record boundary turns that
/// into a sentinel. Fields degrade independently.
#[derive(Debug)]
pub struct DealFields {
    pub company_name: Option<String>,
    pub company_url: Option<String>,
    pub funding_amount: Option<String>,
    pub investor_clause: Option<String>,
}

/// One investor-clause rule: a pattern plus the capture groups whose
/// trimmed text, joined with ", ", becomes the raw clause. Rules are
/// tried in order; first match wins.
struct ClauseRule {
    pattern: Regex,
    groups: &'static [usize],
}

pub struct FieldRules {
    company: Regex,
    amount: Regex,
    clause_rules: Vec<ClauseRule>,
}

impl FieldRules {
    pub fn new(cfg: &ExtractConfig) -> Result<Self> {
        let glyphs: String = cfg
            .currency_glyphs
            .iter()
            .map(|g| regex::escape(&g.to_string()))
            .collect();
        let company = Regex::new(r"-\s*(.*?)\s*<(https?://[^>]+)>")?;
        let amount = Regex::new(&format!(r"[{glyphs}]?[0-9,.]+\s?(?:million|billion)"))?;
        let clause_rules = vec![
            // "<lead> led the round and was/were joined by <joined>"
            ClauseRule {
                pattern: Regex::new(
                    r"(?i)([^.]+?)\s*led the round and (?:were|was) joined by\s*(.*?)(?:\.|\s*$)",
                )?,
                groups: &[1, 2],
            },
            // "led by <lead> and was/were joined by <joined>"
            ClauseRule {
                pattern: Regex::new(
                    r"(?i)led by\s+(.+?),?\s+and\s+(?:were|was)\s+joined by\s+(.*?)(?:\.|\s*$)",
                )?,
                groups: &[1, 2],
            },
            // Fallback: everything after "funding from" up to a
            // sentence boundary or end of text.
            ClauseRule {
                pattern: Regex::new(r"(?is)funding from\s*(.*?)(?:\.\s*[A-Z]|\s*$)")?,
                groups: &[1],
            },
        ];
        Ok(Self {
            company,
            amount,
            clause_rules,
        })
    }

    /// Extract every field from one block. A miss on one field never
    /// blocks the others.
    pub fn extract(&self, block: &DealBlock) -> DealFields {
        // Company line: "- <name> <<url>> <info...>". Without it the
        // whole block is the info text (degraded mode).
        let (company_name, company_url, info) = match self.company.captures(&block.raw) {
            Some(caps) => (
                Some(caps[1].trim().to_string()),
                Some(caps[2].to_string()),
                block.raw.split('>').nth(1).unwrap_or("").trim().to_string(),
            ),
            None => (None, None, block.raw.clone()),
        };

        let funding_amount = self.amount.find(&info).map(|m| m.as_str().to_string());
        let investor_clause = self.investor_clause(&info);

        DealFields {
            company_name,
            company_url,
            funding_amount,
            investor_clause,
        }
    }

    fn investor_clause(&self, info: &str) -> Option<String> {
        for rule in &self.clause_rules {
            if let Some(caps) = rule.pattern.captures(info) {
                let parts: Vec<&str> = rule
                    .groups
                    .iter()
                    .filter_map(|&g| caps.get(g))
                    .map(|m| m.as_str().trim())
                    .filter(|s| !s.is_empty())
                    .collect();
                if !parts.is_empty() {
                    return Some(parts.join(", "));
                }
            }
        }
        None
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FieldRules {
        FieldRules::new(&ExtractConfig::default()).unwrap()
    }

    fn block(raw: &str) -> DealBlock {
        DealBlock {
            raw: raw.to_string(),
            section: "VENTURE DEALS".to_string(),
        }
    }

    #[test]
    fn company_name_and_url() {
        let f = rules().extract(&block(
            "- Acme Corp <http://acme.co> raised $10 million in seed funding.",
        ));
        assert_eq!(f.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(f.company_url.as_deref(), Some("http://acme.co"));
        assert_eq!(f.funding_amount.as_deref(), Some("$10 million"));
    }

    #[test]
    fn degraded_mode_without_company_line() {
        let f = rules().extract(&block("Acme raised $3.5 million from backers."));
        assert!(f.company_name.is_none());
        assert!(f.company_url.is_none());
        // amount still extracted from the whole block text
        assert_eq!(f.funding_amount.as_deref(), Some("$3.5 million"));
    }

    #[test]
    fn amount_magnitude_words() {
        let r = rules();
        let f = r.extract(&block("- A <http://a.co> raised €2.1 billion in new capital."));
        assert_eq!(f.funding_amount.as_deref(), Some("€2.1 billion"));
        let none = r.extract(&block("- A <http://a.co> raised an undisclosed sum."));
        assert!(none.funding_amount.is_none());
    }

    #[test]
    fn led_the_round_clause() {
        let f = rules().extract(&block(
            "- A <http://a.co> raised $5 million. Sequoia led the round and was joined by Accel.",
        ));
        assert_eq!(f.investor_clause.as_deref(), Some("Sequoia, Accel"));
    }

    #[test]
    fn led_by_clause() {
        let f = rules().extract(&block(
            "- Acme Corp <http://acme.co> raised $10 million in seed funding, led by Sequoia and were joined by Y Combinator and others.",
        ));
        assert_eq!(
            f.investor_clause.as_deref(),
            Some("Sequoia, Y Combinator and others")
        );
    }

    #[test]
    fn funding_from_fallback() {
        let f = rules().extract(&block(
            "- A <http://a.co> raised $1 million in funding from Alpha, Beta and Gamma.",
        ));
        assert_eq!(f.investor_clause.as_deref(), Some("Alpha, Beta and Gamma."));
    }

    #[test]
    fn funding_from_stops_at_sentence_boundary() {
        let f = rules().extract(&block(
            "- A <http://a.co> got funding from Alpha and Beta. The company builds widgets.",
        ));
        assert_eq!(f.investor_clause.as_deref(), Some("Alpha and Beta"));
    }

    #[test]
    fn no_clause_rules_match() {
        let f = rules().extract(&block("- A <http://a.co> raised $1 million."));
        assert!(f.investor_clause.is_none());
    }
}
