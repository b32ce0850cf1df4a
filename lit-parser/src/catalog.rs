//! Translation catalog (`translations.json`) for a language directory

use crate::canonical::{is_book_file_name, Manifest};
use crate::error::{ParseError, ParseResult};
use crate::store::BookFile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSummary {
    pub books: usize,
    pub verses: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub path: String,
    pub books: usize,
    pub verses: usize,
    pub base_url: String,
}

/// Count book files and the verses in them; unreadable book files count as empty
pub fn summarize_translation(dir: &Path) -> ParseResult<TranslationSummary> {
    let mut summary = TranslationSummary::default();
    let listing = fs::read_dir(dir).map_err(|e| ParseError::io(dir, e))?;
    for item in listing {
        let item = item.map_err(|e| ParseError::io(dir, e))?;
        if !is_book_file_name(&item.file_name().to_string_lossy()) {
            continue;
        }
        summary.books += 1;
        let path = item.path();
        let parsed = fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<BookFile>(&text).ok());
        match parsed {
            Some(book) => summary.verses += book.chapters.values().map(|v| v.len()).sum::<usize>(),
            None => warn!(path = %path.display(), "unreadable book file counted as empty"),
        }
    }
    Ok(summary)
}

/// One entry per translation directory under `lang_dir`, in name order
pub fn build_catalog(lang_dir: &Path, base_url: &str) -> ParseResult<Vec<CatalogEntry>> {
    let listing = fs::read_dir(lang_dir).map_err(|e| ParseError::io(lang_dir, e))?;
    let mut ids = Vec::new();
    for item in listing {
        let item = item.map_err(|e| ParseError::io(lang_dir, e))?;
        if item.path().is_dir() {
            ids.push(item.file_name().to_string_lossy().into_owned());
        }
    }
    ids.sort();

    let base_url = base_url.trim_end_matches('/');
    let mut entries = Vec::new();
    for id in ids {
        let dir = lang_dir.join(&id);
        let summary = summarize_translation(&dir)?;
        if summary.books == 0 {
            continue;
        }
        let name = Manifest::read(&dir)
            .map(|m| m.corpus)
            .unwrap_or_else(|_| id.clone());
        entries.push(CatalogEntry {
            base_url: format!("{base_url}/{id}"),
            path: id.clone(),
            id,
            name,
            books: summary.books,
            verses: summary.verses,
        });
    }
    Ok(entries)
}

pub fn write_catalog(path: &Path, entries: &[CatalogEntry]) -> ParseResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ParseError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json).map_err(|e| ParseError::io(path, e))
}
