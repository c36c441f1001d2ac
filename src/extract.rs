// src/extract.rs
use std::io::{Cursor, Read};

use csv::ReaderBuilder;
use regex::Regex;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{MetricError, Result};

/// Find the CSV entry named `Table_<number>` (word boundary, case
/// insensitive) and return its decoded text. The boundary matters:
/// `Table_1` must not match `Table_10`. The release carries exactly one
/// entry per table number; the first match is returned.
pub fn table_csv_text(zip_bytes: &[u8], table_number: u32) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))?;
    let pattern = Regex::new(&format!(r"(?i)Table_{}\b", table_number))
        .expect("table entry pattern is valid");

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name().to_string();
        if !pattern.is_match(&name) {
            continue;
        }

        debug!(entry = %name, table_number, "matched table entry");
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf).map_err(|e| {
            MetricError::UpstreamUnavailable(format!("reading {} from ZIP: {}", name, e))
        })?;
        return Ok(String::from_utf8_lossy(&buf).into_owned());
    }

    Err(MetricError::TableNotFound(table_number))
}

/// Parse table text into positional rows. There are no header semantics:
/// every record is a plain list of cells. Blank lines produce no record, so
/// row indexes line up with the published layout.
pub fn parse_rows(csv_text: &str) -> Result<Vec<Vec<String>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // header and data rows carry different field counts
        .from_reader(Cursor::new(csv_text.as_bytes()));

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(rows)
}

/// First row whose trimmed first cell matches `pattern`, in file order.
/// A miss is an `Option`, never an error; callers decide what absence means.
pub fn find_row<'a>(rows: &'a [Vec<String>], pattern: &Regex) -> Option<&'a Vec<String>> {
    rows.iter().find(|row| {
        row.first()
            .map(|label| pattern.is_match(label.trim()))
            .unwrap_or(false)
    })
}
