//! Tabular export of stored events. Each run mode has its own fixed
//! column shape; a single export never mixes the two.

use std::io::{self, Write};

use crate::db::EventRow;
use crate::parser::Mode;

pub fn headers(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Headline => &[
            "Title",
            "Company Name",
            "Published Date",
            "Link",
            "Summary",
            "Found Keywords",
        ],
        Mode::Sectioned => &[
            "Company Name",
            "Company URL",
            "Funding",
            "Investors",
            "Deal Date",
        ],
    }
}

fn row(mode: Mode, e: &EventRow) -> Vec<String> {
    match mode {
        Mode::Headline => vec![
            e.title.clone(),
            e.company_name.clone(),
            e.deal_date.clone(),
            e.source_link.clone(),
            e.summary.clone(),
            e.found_keywords.clone(),
        ],
        Mode::Sectioned => vec![
            e.company_name.clone(),
            e.company_url.clone(),
            e.funding_amount.clone(),
            e.investors.clone(),
            e.deal_date.clone(),
        ],
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(mut w: W, cells: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in cells {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

pub fn write_csv<W: Write>(mut w: W, mode: Mode, rows: &[EventRow]) -> io::Result<()> {
    let header: Vec<String> = headers(mode).iter().map(|h| h.to_string()).collect();
    write_row(&mut w, &header)?;
    for r in rows {
        write_row(&mut w, &row(mode, r))?;
    }
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EventRow {
        EventRow {
            title: "Acme raises $5M, again".to_string(),
            company_name: "Acme".to_string(),
            company_url: "http://acme.co".to_string(),
            funding_amount: "$5 million".to_string(),
            investors: "Alpha, Beta".to_string(),
            summary: "A \"big\" round".to_string(),
            found_keywords: "raises, round".to_string(),
            deal_date: "2025-08-05".to_string(),
            source_link: "https://news.example/acme".to_string(),
        }
    }

    fn export(mode: Mode) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, mode, &[sample()]).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn sectioned_shape() {
        let out = export(Mode::Sectioned);
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Company Name,Company URL,Funding,Investors,Deal Date"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Acme,http://acme.co,$5 million,\"Alpha, Beta\",2025-08-05"
        );
    }

    #[test]
    fn headline_shape_quotes_embedded_commas_and_quotes() {
        let out = export(Mode::Headline);
        let body = out.lines().nth(1).unwrap();
        assert!(body.starts_with("\"Acme raises $5M, again\","));
        assert!(body.contains("\"A \"\"big\"\" round\""));
    }
}
