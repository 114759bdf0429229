use std::collections::HashSet;

use anyhow::Result;
use rusqlite::Connection;

/// Persisted set of already-processed source links. Loaded once at
/// pipeline start, flushed once at pipeline end; the pipeline is the
/// only writer in between.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashSet<String>,
    fresh: Vec<String>,
}

impl DedupLedger {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare("SELECT link FROM seen_links")?;
        let seen = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<HashSet<String>, _>>()?;
        Ok(Self {
            seen,
            fresh: Vec::new(),
        })
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    /// Idempotent: re-adding a present link is a no-op, not an error.
    pub fn add(&mut self, link: &str) {
        if self.seen.insert(link.to_string()) {
            self.fresh.push(link.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Persist links added since load.
    pub fn flush(&mut self, conn: &Connection) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO seen_links (link) VALUES (?1)")?;
            for link in &self.fresh {
                stmt.execute(rusqlite::params![link])?;
            }
        }
        tx.commit()?;
        self.fresh.clear();
        Ok(())
    }
}

// ── Tests ──
