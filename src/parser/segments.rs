//! Splits a digest body into deal-sized text blocks, bounded by the
//! configured section markers.

/// One candidate deal's flattened text, tagged with the section label
/// it was found under. Created here, consumed once by field
/// extraction, never persisted.
#[derive(Debug, Clone)]
pub struct DealBlock {
    pub raw: String,
    pub section: String,
}

/// Locate the deals section and walk its blocks lazily. `None` means
/// the start marker never appears; callers treat that as an empty
/// section, not an error.
pub fn split_deals<'a>(
    body: &'a str,
    start_marker: &'a str,
    stop_marker: &'a str,
) -> Option<DealBlocks<'a>> {
    let mut lines = body.lines();
    lines.by_ref().find(|line| line.contains(start_marker))?;
    Some(DealBlocks {
        lines,
        section: start_marker,
        stop_marker,
        current: String::new(),
        done: false,
    })
}

pub struct DealBlocks<'a> {
    lines: std::str::Lines<'a>,
    section: &'a str,
    stop_marker: &'a str,
    current: String,
    done: bool,
}

impl DealBlocks<'_> {
    fn take_current(&mut self) -> Option<DealBlock> {
        if self.current.is_empty() {
            None
        } else {
            Some(DealBlock {
                raw: std::mem::take(&mut self.current),
                section: self.section.to_string(),
            })
        }
    }
}

impl Iterator for DealBlocks<'_> {
    type Item = DealBlock;

    fn next(&mut self) -> Option<DealBlock> {
        if self.done {
            return None;
        }
        while let Some(line) = self.lines.next() {
            let line = line.trim();

            // Stop marker ends the section: the block in progress is
            // still emitted, the marker and everything after are not.
            if line.contains(self.stop_marker) {
                self.done = true;
                return self.take_current();
            }

            // A bullet starts the next block.
            if line.starts_with('-') {
                let previous = self.take_current();
                self.current.push_str(line);
                if previous.is_some() {
                    return previous;
                }
                continue;
            }

            // Continuation lines join with a single space; blank lines
            // carry no boundary meaning.
            if !line.is_empty() {
                if !self.current.is_empty() {
                    self.current.push(' ');
                }
                self.current.push_str(line);
            }
        }
        self.done = true;
        self.take_current()
    }
}

// ── Tests ──
