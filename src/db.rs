use anyhow::Result;
use rusqlite::Connection;

use crate::parser::{FundingEvent, Mode};

const DB_PATH: &str = "data/deals.sqlite";

pub fn connect() -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(DB_PATH).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS seen_links (
            link       TEXT PRIMARY KEY,
            first_seen TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS events (
            id             INTEGER PRIMARY KEY,
            mode           TEXT NOT NULL CHECK(mode IN ('headline','deals')),
            title          TEXT,
            company_name   TEXT NOT NULL,
            company_url    TEXT,
            funding_amount TEXT NOT NULL,
            investors      TEXT,
            summary        TEXT,
            found_keywords TEXT,
            deal_date      TEXT NOT NULL,
            source_link    TEXT NOT NULL,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_events_date ON events(deal_date);
        CREATE INDEX IF NOT EXISTS idx_events_link ON events(source_link);
        ",
    )?;
    Ok(())
}

fn mode_tag(mode: Mode) -> &'static str {
    match mode {
        Mode::Headline => "headline",
        Mode::Sectioned => "deals",
    }
}

pub fn save_events(conn: &Connection, mode: Mode, events: &[FundingEvent]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO events
             (mode, title, company_name, company_url, funding_amount, investors,
              summary, found_keywords, deal_date, source_link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for e in events {
            count += stmt.execute(rusqlite::params![
                mode_tag(mode),
                e.title,
                e.company_name,
                e.company_url,
                e.funding_amount,
                e.investors.join(", "),
                e.summary,
                e.matched_keywords.join(", "),
                e.deal_date.to_string(),
                e.source_link,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

/// Flattened event row as stored; feeds the CSV export.
pub struct EventRow {
    pub title: String,
    pub company_name: String,
    pub company_url: String,
    pub funding_amount: String,
    pub investors: String,
    pub summary: String,
    pub found_keywords: String,
    pub deal_date: String,
    pub source_link: String,
}

pub fn fetch_events(conn: &Connection, mode: Mode) -> Result<Vec<EventRow>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(title,''), company_name, COALESCE(company_url,''),
                funding_amount, COALESCE(investors,''), COALESCE(summary,''),
                COALESCE(found_keywords,''), deal_date, source_link
         FROM events
         WHERE mode = ?1
         ORDER BY deal_date DESC, id",
    )?;
    let rows = stmt
        .query_map([mode_tag(mode)], |row| {
            Ok(EventRow {
                title: row.get(0)?,
                company_name: row.get(1)?,
                company_url: row.get(2)?,
                funding_amount: row.get(3)?,
                investors: row.get(4)?,
                summary: row.get(5)?,
                found_keywords: row.get(6)?,
                deal_date: row.get(7)?,
                source_link: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub headline_events: usize,
    pub deal_events: usize,
    pub seen_links: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let headline_events: usize = conn.query_row(
        "SELECT COUNT(*) FROM events WHERE mode = 'headline'",
        [],
        |r| r.get(0),
    )?;
    let deal_events: usize = conn.query_row(
        "SELECT COUNT(*) FROM events WHERE mode = 'deals'",
        [],
        |r| r.get(0),
    )?;
    let seen_links: usize =
        conn.query_row("SELECT COUNT(*) FROM seen_links", [], |r| r.get(0))?;
    Ok(Stats {
        headline_events,
        deal_events,
        seen_links,
    })
}

// ── Tests ──
