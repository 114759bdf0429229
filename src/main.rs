mod config;
mod db;
mod export;
mod feed;
mod fetch;
mod ledger;
mod parser;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use config::ExtractConfig;
use ledger::DedupLedger;
use parser::{InputItem, ItemError, Mode, Pipeline};

#[derive(Parser)]
#[command(
    name = "deal_scraper",
    about = "Funding-event extraction from feeds and newsletter digests"
)]
struct Cli {
    /// Extraction config JSON; defaults are baked in
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an RSS feed for funding articles (headline mode)
    Feed {
        /// Feed URL
        #[arg(long, default_value = "https://techcrunch.com/category/startups/feed/")]
        url: String,
        /// Fetch each article body and scan that instead of the summary
        #[arg(long)]
        full: bool,
        /// Max feed items to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Extract deals from plain-text newsletter digests (sectioned mode)
    Digest {
        /// Digest text files (exported emails)
        files: Vec<PathBuf>,
        /// Deal date override (YYYY-MM-DD) for files without a Date: header
        #[arg(long)]
        date: Option<String>,
    },
    /// Export stored events to CSV
    Export {
        /// Output path
        #[arg(short, long, default_value = "events.csv")]
        out: PathBuf,
        /// Which run shape to export: headline or deals
        #[arg(short, long, default_value = "deals")]
        mode: String,
    },
    /// Show corpus statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => ExtractConfig::load(path)?,
        None => ExtractConfig::default(),
    };

    let result = match cli.command {
        Commands::Feed { url, full, limit } => run_feed(&cfg, &url, full, limit).await,
        Commands::Digest { files, date } => run_digest(&cfg, &files, date.as_deref()),
        Commands::Export { out, mode } => run_export(&out, &mode),
        Commands::Stats => run_stats(),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_feed(cfg: &ExtractConfig, url: &str, full: bool, limit: Option<usize>) -> Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;
    let mut ledger = DedupLedger::load(&conn)?;
    let pipeline = Pipeline::new(cfg)?;
    let fetcher = fetch::Fetcher::new()?;

    info!("Fetching feed: {}", url);
    let xml = fetcher.get(url).await?;
    let mut feed_items = feed::parse_feed(&xml)?;
    if let Some(n) = limit {
        feed_items.truncate(n);
    }
    if feed_items.is_empty() {
        println!("Feed has no items.");
        return Ok(());
    }
    println!("Feed items: {}", feed_items.len());

    let mut items: Vec<Result<InputItem, ItemError>> = Vec::new();
    if full {
        let pb = ProgressBar::new(feed_items.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                .progress_chars("=> "),
        );
        let total = feed_items.len();
        for (i, fi) in feed_items.into_iter().enumerate() {
            // Known links are duplicates anyway; skip the page fetch.
            if ledger.contains(&fi.link) {
                items.push(Ok(fi.into_input_item()));
                pb.inc(1);
                continue;
            }
            let link = fi.link.clone();
            match fetcher.get(&link).await {
                Ok(html) => {
                    let mut item = fi.into_input_item();
                    item.body = feed::strip_html(&html);
                    items.push(Ok(item));
                }
                Err(e) => items.push(Err(ItemError::FetchFailed(format!("{}: {}", link, e)))),
            }
            pb.inc(1);
            if i + 1 < total {
                fetcher.polite_delay().await;
            }
        }
        pb.finish_and_clear();
    } else {
        items.extend(feed_items.into_iter().map(|fi| Ok(fi.into_input_item())));
    }

    let report = pipeline.run(items, Mode::Headline, &mut ledger);
    db::save_events(&conn, Mode::Headline, &report.events)?;
    ledger.flush(&conn)?;

    for e in &report.events {
        println!(
            "  {} | {} | {}",
            e.company_name,
            e.title.as_deref().unwrap_or("-"),
            e.matched_keywords.join(", ")
        );
    }
    report.print();
    Ok(())
}

fn run_digest(cfg: &ExtractConfig, files: &[PathBuf], date_override: Option<&str>) -> Result<()> {
    if files.is_empty() {
        bail!("No digest files given.");
    }
    let conn = db::connect()?;
    db::init_schema(&conn)?;
    let mut ledger = DedupLedger::load(&conn)?;
    let pipeline = Pipeline::new(cfg)?;

    let items: Vec<Result<InputItem, ItemError>> = files
        .iter()
        .map(|path| read_digest(path, date_override))
        .collect();

    let report = pipeline.run(items, Mode::Sectioned, &mut ledger);
    db::save_events(&conn, Mode::Sectioned, &report.events)?;
    ledger.flush(&conn)?;

    for e in &report.events {
        println!(
            "  {} | {} | {}",
            e.company_name,
            e.funding_amount,
            e.investors.join(", ")
        );
    }
    report.print();
    Ok(())
}

/// One digest file becomes one sectioned-mode input item. The deal
/// date comes from the override, or from an RFC 2822 `Date:` header
/// in the exported email.
fn read_digest(path: &Path, date_override: Option<&str>) -> Result<InputItem, ItemError> {
    let body = std::fs::read_to_string(path)
        .map_err(|e| ItemError::FetchFailed(format!("{}: {}", path.display(), e)))?;
    let published = match date_override {
        Some(d) => d.to_string(),
        None => header_date(&body).unwrap_or_default(),
    };
    Ok(InputItem {
        title: None,
        summary: None,
        body,
        published,
        link: format!("file://{}", path.display()),
    })
}

fn header_date(body: &str) -> Option<String> {
    body.lines()
        .take(40)
        .find_map(|line| line.strip_prefix("Date:").map(|d| d.trim().to_string()))
}

fn run_export(out: &Path, mode: &str) -> Result<()> {
    let mode = match mode {
        "headline" => Mode::Headline,
        "deals" => Mode::Sectioned,
        other => bail!("Unknown mode {:?} (use headline|deals)", other),
    };
    let conn = db::connect()?;
    db::init_schema(&conn)?;
    let rows = db::fetch_events(&conn, mode)?;
    if rows.is_empty() {
        println!("No events stored for this mode.");
        return Ok(());
    }
    let file = std::fs::File::create(out)?;
    let mut writer = std::io::BufWriter::new(file);
    export::write_csv(&mut writer, mode, &rows)?;
    writer.flush()?;
    println!("Wrote {} rows to {}", rows.len(), out.display());
    Ok(())
}

fn run_stats() -> Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;
    let s = db::get_stats(&conn)?;
    println!("Headline events: {}", s.headline_events);
    println!("Deal events:     {}", s.deal_events);
    println!("Seen links:      {}", s.seen_links);
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──
