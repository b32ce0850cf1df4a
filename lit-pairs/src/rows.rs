//! Authoring CSV
//!
//!     Headers may use dots (`X.key`) or underscores (`X_key`). Cells are trimmed and empty
//!     cells count as absent. A row without every required field (Book, Ref, PV, X.key,
//!     X.root, Y.key, Y.root) is skipped, not rejected: the sheet carries blank spacer rows.

use crate::error::{PairsError, PairsResult};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One authored pair, with the line it came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairRow {
    pub line: u64,
    pub book: String,
    pub reference: String,
    pub pv: String,
    pub text: Option<String>,
    pub x_key: String,
    pub x_root: String,
    pub x_keys: Option<String>,
    pub y_key: String,
    pub y_root: String,
    pub y_keys: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowsRead {
    pub rows: Vec<PairRow>,
    pub skipped: usize,
}

fn canonical_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().replace('.', "_")
}

pub fn read_rows<R: Read>(reader: R) -> PairsResult<RowsRead> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = csv.headers()?.iter().map(canonical_header).collect();

    let mut out = RowsRead::default();
    for record in csv.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let mut cells: HashMap<&str, String> = HashMap::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            let value = value.trim();
            if !value.is_empty() {
                cells.entry(header.as_str()).or_insert_with(|| value.to_string());
            }
        }
        let mut take = |key: &str| cells.remove(key);
        let required = (
            take("Book"),
            take("Ref"),
            take("PV"),
            take("X_key"),
            take("X_root"),
            take("Y_key"),
            take("Y_root"),
        );
        let (Some(book), Some(reference), Some(pv), Some(x_key), Some(x_root), Some(y_key), Some(y_root)) =
            required
        else {
            debug!(line, "skipping row without every required field");
            out.skipped += 1;
            continue;
        };
        out.rows.push(PairRow {
            line,
            book,
            reference,
            pv,
            text: take("Text"),
            x_key,
            x_root,
            x_keys: take("X_keys"),
            y_key,
            y_root,
            y_keys: take("Y_keys"),
            status: take("Status"),
            notes: take("Notes"),
        });
    }
    Ok(out)
}

pub fn load_csv(path: &Path) -> PairsResult<RowsRead> {
    let file = fs::File::open(path).map_err(|e| PairsError::io(path, e))?;
    read_rows(file)
}
