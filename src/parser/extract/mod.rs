pub mod fields;
pub mod headline;
pub mod investors;

pub use fields::{DealFields, FieldRules};
pub use headline::HeadlineParser;

use crate::parser::segments::DealBlock;

/// Field extraction plus investor normalization for one deal block.
pub struct DealExtraction {
    pub fields: DealFields,
    pub investors: Vec<String>,
}

pub fn extract_block(rules: &FieldRules, block: &DealBlock) -> DealExtraction {
    let fields = rules.extract(block);
    let investors = fields
        .investor_clause
        .as_deref()
        .map(investors::normalize)
        .unwrap_or_default();
    DealExtraction { fields, investors }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractConfig;

    fn extract(raw: &str) -> DealExtraction {
        let rules = FieldRules::new(&ExtractConfig::default()).unwrap();
        let block = DealBlock {
            raw: raw.to_string(),
            section: "VENTURE DEALS".to_string(),
        };
        extract_block(&rules, &block)
    }

    #[test]
    fn full_deal_block() {
        let ex = extract(
            "- Acme Corp <http://acme.co> raised $10 million in seed funding, led by Sequoia and were joined by Y Combinator and others.",
        );
        assert_eq!(ex.fields.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(ex.fields.company_url.as_deref(), Some("http://acme.co"));
        assert_eq!(ex.fields.funding_amount.as_deref(), Some("$10 million"));
        assert_eq!(ex.investors, vec!["Sequoia", "Y Combinator"]);
    }

    #[test]
    fn funding_from_list() {
        let ex =
            extract("- A <http://a.co> raised $1 million in funding from Alpha, Beta and Gamma.");
        assert_eq!(ex.investors, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn no_investors_is_empty_not_sentinel() {
        let ex = extract("- A <http://a.co> raised $1 million.");
        assert!(ex.fields.investor_clause.is_none());
        assert!(ex.investors.is_empty());
    }
}
