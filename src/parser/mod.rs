pub mod extract;
pub mod keywords;
pub mod segments;

use anyhow::Result;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ExtractConfig;
use crate::ledger::DedupLedger;
use extract::{FieldRules, HeadlineParser};
use keywords::KeywordMatcher;

/// Explicit marker distinguishing "extraction failed" from a field
/// absent by design.
pub const UNKNOWN: &str = "unknown";

/// One unit of input text, handed over by a fetch collaborator.
#[derive(Debug, Clone)]
pub struct InputItem {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: String,
    /// Raw date string as supplied by the source (RFC 2822 or ISO).
    pub published: String,
    /// Unique source identifier; the dedup key.
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Keyword-match title+summary and disambiguate the company from
    /// the headline. Summaries lack the structured deal format, so no
    /// amount or investor extraction happens here.
    Headline,
    /// Segment the body between the section markers and extract every
    /// field per deal block.
    Sectioned,
}

/// The one record that crosses the core boundary.
#[derive(Debug, Clone)]
pub struct FundingEvent {
    pub title: Option<String>,
    pub company_name: String,
    pub company_url: Option<String>,
    pub funding_amount: String,
    /// Ordered, exact-string deduplicated; may be empty.
    pub investors: Vec<String>,
    pub summary: Option<String>,
    /// Matched vocabulary terms in vocabulary order.
    pub matched_keywords: Vec<String>,
    pub deal_date: NaiveDate,
    pub source_link: String,
}

/// Whole-item failures, collected per batch rather than raised.
/// Field-level misses never land here; they degrade to sentinels on
/// the record.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("unparseable date: {0:?}")]
    MalformedDate(String),
    #[error("empty body")]
    EmptyBody,
    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

#[derive(Debug)]
pub enum ItemOutcome {
    Events(Vec<FundingEvent>),
    Duplicate,
    Failed(ItemError),
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub events: Vec<FundingEvent>,
    /// Items that produced at least one event.
    pub matched: usize,
    /// Items skipped as already-seen links.
    pub skipped: usize,
    pub failed: Vec<ItemError>,
}

impl BatchReport {
    pub fn print(&self) {
        println!(
            "Matched {} items ({} events), skipped {} duplicates, {} failed.",
            self.matched,
            self.events.len(),
            self.skipped,
            self.failed.len()
        );
    }
}

/// Composes matcher, segmenter, field rules and normalizer over a
/// sequence of input items. Synchronous and single-threaded; the
/// ledger is the only mutable state it touches.
pub struct Pipeline {
    matcher: KeywordMatcher,
    rules: FieldRules,
    headline: HeadlineParser,
    section_start: String,
    section_stop: String,
    require_both: bool,
}

impl Pipeline {
    pub fn new(cfg: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            matcher: KeywordMatcher::new(cfg)?,
            rules: FieldRules::new(cfg)?,
            headline: HeadlineParser::new(&cfg.funding_verbs)?,
            section_start: cfg.section_start.clone(),
            section_stop: cfg.section_stop.clone(),
            require_both: cfg.require_both,
        })
    }

    /// Process one item. The ledger is checked before any extraction
    /// and updated only when events are emitted, so re-presenting an
    /// already-seen link yields `Duplicate` and leaves it unchanged.
    pub fn process_item(
        &self,
        item: &InputItem,
        mode: Mode,
        ledger: &mut DedupLedger,
    ) -> ItemOutcome {
        if ledger.contains(&item.link) {
            return ItemOutcome::Duplicate;
        }

        let deal_date = match parse_date(&item.published) {
            Some(d) => d,
            None => return ItemOutcome::Failed(ItemError::MalformedDate(item.published.clone())),
        };

        let events = match mode {
            Mode::Sectioned => {
                if item.body.trim().is_empty() {
                    return ItemOutcome::Failed(ItemError::EmptyBody);
                }
                self.deal_events(item, deal_date)
            }
            Mode::Headline => self.headline_event(item, deal_date).into_iter().collect(),
        };

        if !events.is_empty() {
            ledger.add(&item.link);
        }
        ItemOutcome::Events(events)
    }

    /// Drive a batch sequentially (single ledger writer by design),
    /// collecting events and per-item errors. One bad item never halts
    /// the batch.
    pub fn run<I>(&self, items: I, mode: Mode, ledger: &mut DedupLedger) -> BatchReport
    where
        I: IntoIterator<Item = Result<InputItem, ItemError>>,
    {
        let mut report = BatchReport::default();
        for item in items {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    warn!("skipping item: {}", e);
                    report.failed.push(e);
                    continue;
                }
            };
            match self.process_item(&item, mode, ledger) {
                ItemOutcome::Events(events) => {
                    if !events.is_empty() {
                        report.matched += 1;
                    }
                    report.events.extend(events);
                }
                ItemOutcome::Duplicate => report.skipped += 1,
                ItemOutcome::Failed(e) => {
                    warn!(link = %item.link, "item failed: {}", e);
                    report.failed.push(e);
                }
            }
        }
        report
    }

    fn deal_events(&self, item: &InputItem, deal_date: NaiveDate) -> Vec<FundingEvent> {
        let Some(blocks) =
            segments::split_deals(&item.body, &self.section_start, &self.section_stop)
        else {
            debug!(link = %item.link, "no {:?} section found", self.section_start);
            return Vec::new();
        };
        blocks
            .map(|block| {
                debug!(section = %block.section, "extracting deal block");
                let ex = extract::extract_block(&self.rules, &block);
                FundingEvent {
                    title: item.title.clone(),
                    company_name: ex.fields.company_name.unwrap_or_else(|| UNKNOWN.into()),
                    company_url: ex.fields.company_url,
                    funding_amount: ex.fields.funding_amount.unwrap_or_else(|| UNKNOWN.into()),
                    investors: ex.investors,
                    summary: None,
                    matched_keywords: Vec::new(),
                    deal_date,
                    source_link: item.link.clone(),
                }
            })
            .collect()
    }

    fn headline_event(&self, item: &InputItem, deal_date: NaiveDate) -> Option<FundingEvent> {
        let title = item.title.as_deref().unwrap_or("");
        // With a fetched article body present, scan that; otherwise
        // the feed summary.
        let text = if item.body.trim().is_empty() {
            item.summary.as_deref().unwrap_or("")
        } else {
            item.body.as_str()
        };
        let hits = self.matcher.scan(&format!("{} {}", title, text));
        if !hits.is_match(self.require_both) {
            return None;
        }
        let company_name = self
            .headline
            .company_from_title(title)
            .unwrap_or_else(|| UNKNOWN.into());
        Some(FundingEvent {
            title: item.title.clone(),
            company_name,
            company_url: None,
            funding_amount: UNKNOWN.into(),
            investors: Vec::new(),
            summary: item.summary.clone(),
            matched_keywords: hits.keywords,
            deal_date,
            source_link: item.link.clone(),
        })
    }
}

/// RFC 2822 (feed pubDate, email Date headers), then RFC 3339, then
/// bare ISO date.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        Pipeline::new(&ExtractConfig::default()).unwrap()
    }

    fn digest_item(body: &str) -> InputItem {
        InputItem {
            title: None,
            summary: None,
            body: body.to_string(),
            published: "Tue, 05 Aug 2025 12:04:11 +0000".to_string(),
            link: "file:///digests/2025-08-05.txt".to_string(),
        }
    }

    fn feed_item(title: &str, summary: &str) -> InputItem {
        InputItem {
            title: Some(title.to_string()),
            summary: Some(summary.to_string()),
            body: String::new(),
            published: "2025-08-05".to_string(),
            link: format!("https://news.example/{}", title.replace(' ', "-")),
        }
    }

    #[test]
    fn sectioned_mode_extracts_deals() {
        let body = "VENTURE DEALS\n\n\
            - Acme Corp <http://acme.co> raised $10 million in seed funding, led by Sequoia and were joined by Y Combinator and others.\n\n\
            PRIVATE EQUITY\n\n\
            - Buyout Co <http://buyout.example> got $900 million.\n";
        let mut ledger = DedupLedger::default();
        let ItemOutcome::Events(events) =
            pipeline().process_item(&digest_item(body), Mode::Sectioned, &mut ledger)
        else {
            panic!("expected events");
        };
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.company_name, "Acme Corp");
        assert_eq!(e.company_url.as_deref(), Some("http://acme.co"));
        assert_eq!(e.funding_amount, "$10 million");
        assert_eq!(e.investors, vec!["Sequoia", "Y Combinator"]);
        assert_eq!(e.deal_date.to_string(), "2025-08-05");
        assert!(ledger.contains(&digest_item(body).link));
    }

    #[test]
    fn unparseable_block_degrades_to_sentinels() {
        let body = "VENTURE DEALS\n- Somebody raised money somewhere.\n";
        let mut ledger = DedupLedger::default();
        let ItemOutcome::Events(events) =
            pipeline().process_item(&digest_item(body), Mode::Sectioned, &mut ledger)
        else {
            panic!("expected events");
        };
        assert_eq!(events[0].company_name, UNKNOWN);
        assert_eq!(events[0].funding_amount, UNKNOWN);
        assert!(events[0].investors.is_empty());
    }

    #[test]
    fn missing_section_yields_no_events() {
        let mut ledger = DedupLedger::default();
        let item = digest_item("Nothing deal-shaped in here.\n");
        let ItemOutcome::Events(events) =
            pipeline().process_item(&item, Mode::Sectioned, &mut ledger)
        else {
            panic!("expected events");
        };
        assert!(events.is_empty());
        // unmatched items are not registered
        assert!(!ledger.contains(&item.link));
    }

    #[test]
    fn empty_body_is_a_per_item_error() {
        let mut ledger = DedupLedger::default();
        let out = pipeline().process_item(&digest_item("  \n"), Mode::Sectioned, &mut ledger);
        assert!(matches!(out, ItemOutcome::Failed(ItemError::EmptyBody)));
    }

    #[test]
    fn malformed_date_is_a_per_item_error() {
        let mut item = digest_item("VENTURE DEALS\n- A <http://a.co> raised $1 million.\n");
        item.published = "sometime last week".to_string();
        let mut ledger = DedupLedger::default();
        let out = pipeline().process_item(&item, Mode::Sectioned, &mut ledger);
        assert!(matches!(
            out,
            ItemOutcome::Failed(ItemError::MalformedDate(_))
        ));
    }

    #[test]
    fn headline_mode_matches_and_disambiguates() {
        let mut ledger = DedupLedger::default();
        let item = feed_item(
            "Acme Corp raises $5M Series A",
            "Acme Corp said the $5M round closed.",
        );
        let ItemOutcome::Events(events) =
            pipeline().process_item(&item, Mode::Headline, &mut ledger)
        else {
            panic!("expected events");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].company_name, "Acme Corp");
        assert_eq!(events[0].funding_amount, UNKNOWN);
        assert!(events[0].matched_keywords.contains(&"raises".to_string()));
        assert!(ledger.contains(&item.link));
    }

    #[test]
    fn headline_mode_requires_both_by_default() {
        let mut ledger = DedupLedger::default();
        // keywords but no currency glyph
        let item = feed_item("Acme raises a seed round", "the seed round is oversubscribed");
        let ItemOutcome::Events(events) =
            pipeline().process_item(&item, Mode::Headline, &mut ledger)
        else {
            panic!("expected events");
        };
        assert!(events.is_empty());
    }

    #[test]
    fn duplicate_links_are_skipped_and_ledger_unchanged() {
        let mut ledger = DedupLedger::default();
        let item = feed_item("Acme raises $1M", "$1M seed round");
        ledger.add(&item.link);
        let before = ledger.len();
        let out = pipeline().process_item(&item, Mode::Headline, &mut ledger);
        assert!(matches!(out, ItemOutcome::Duplicate));
        assert_eq!(ledger.len(), before);
    }

    #[test]
    fn run_reports_counts_and_never_halts() {
        let p = pipeline();
        let mut ledger = DedupLedger::default();
        let good = feed_item("Acme raises $1M", "$1M seed round");
        let mut bad_date = feed_item("Beta raises $2M", "$2M round");
        bad_date.published = "not a date".to_string();
        let dup = good.clone();

        let report = p.run(
            vec![
                Ok(good),
                Err(ItemError::FetchFailed(
                    "https://news.example/x: timeout".into(),
                )),
                Ok(bad_date),
                Ok(dup),
            ],
            Mode::Headline,
            &mut ledger,
        );
        assert_eq!(report.matched, 1);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed.len(), 2);
    }

    #[test]
    fn digest_fixture_end_to_end() {
        let body = std::fs::read_to_string("tests/fixtures/fortune_digest.txt").unwrap();
        let mut ledger = DedupLedger::default();
        let item = digest_item(&body);
        let ItemOutcome::Events(events) =
            pipeline().process_item(&item, Mode::Sectioned, &mut ledger)
        else {
            panic!("expected events");
        };
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].company_name, "Acme Analytics");
        assert_eq!(events[0].investors, vec!["Sequoia", "Y Combinator"]);
        assert_eq!(events[1].company_name, "Borealis Grid");
        assert_eq!(events[1].funding_amount, "€4.5 million");
        assert_eq!(
            events[1].investors,
            vec!["Alpha Capital", "Beta Partners", "Gamma Ventures"]
        );
        // the private-equity bullet never shows up
        assert!(events.iter().all(|e| e.company_name != "Hidden Deal"));
    }
}
