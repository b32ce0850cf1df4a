//! Per-book JSON files
//!
//!     A translation directory holds one `<CODE>.json` per book plus a `manifest.json`:
//!
//!         kjv/
//!         ├── GEN.json        {"book": "GEN", "chapters": {"1": {"1": "In the beginning..."}}}
//!         ├── ...
//!         └── manifest.json   {"version": "v1", "corpus": "KJV", "books": [...], "verses": 31102}
//!
//!     Writes refuse to replace existing book files unless forced.

use crate::error::{ParseError, ParseResult};
use crate::store::{BookFile, ParseCounters, VerseStore};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static BOOK_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{3}\.json$").unwrap());

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_VERSION: &str = "v1";

/// Whether a file name looks like a per-book file (`GEN.json`, `1SA.json`)
pub fn is_book_file_name(name: &str) -> bool {
    BOOK_FILE.is_match(name)
}

/// `manifest.json` of a translation directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub corpus: String,
    pub books: Vec<String>,
    /// Counters and anything else a writer chose to record
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    pub fn new(corpus: impl Into<String>, store: &VerseStore) -> Self {
        Manifest {
            version: MANIFEST_VERSION.to_string(),
            corpus: corpus.into(),
            books: store.book_codes().map(str::to_string).collect(),
            extra: serde_json::Map::new(),
        }
    }

    /// Record parse counters next to the book list
    pub fn with_counters(mut self, counters: &ParseCounters) -> Self {
        let fields = [
            ("files", counters.files),
            ("starts", counters.verse_starts),
            ("verses", counters.verses_written),
            ("skipped_books", counters.skipped_books),
            ("collapsed_ranges", counters.collapsed_ranges),
            ("failed_files", counters.failed_files),
        ];
        for (key, value) in fields {
            self.extra.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn read(dir: &Path) -> ParseResult<Manifest> {
        let path = dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|e| ParseError::io(&path, e))?;
        serde_json::from_str(&text).map_err(|e| ParseError::from(e).in_file(&path))
    }
}

/// Refuse to clobber `path` unless `force`
pub fn guard_overwrite(path: &Path, force: bool) -> ParseResult<()> {
    if !force && path.exists() {
        return Err(ParseError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// Write one `<CODE>.json` per book, in code order; returns the written paths
pub fn write_book_files(store: &VerseStore, dir: &Path, force: bool) -> ParseResult<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = store
        .book_codes()
        .map(|code| dir.join(format!("{code}.json")))
        .collect();
    for path in &targets {
        guard_overwrite(path, force)?;
    }
    fs::create_dir_all(dir).map_err(|e| ParseError::io(dir, e))?;

    for ((code, chapters), path) in store.books().zip(&targets) {
        let file = BookFile {
            book: code.to_string(),
            chapters: chapters.clone(),
        };
        let json = serde_json::to_string(&file)?;
        fs::write(path, json).map_err(|e| ParseError::io(path, e))?;
        debug!(path = %path.display(), "wrote book file");
    }
    info!(dir = %dir.display(), books = targets.len(), "wrote book files");
    Ok(targets)
}

pub fn write_manifest(dir: &Path, manifest: &Manifest) -> ParseResult<PathBuf> {
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json).map_err(|e| ParseError::io(&path, e))?;
    Ok(path)
}

/// Load every per-book file in `dir`.
///
/// Only `[A-Z0-9]{3}.json` names are considered; files of any other shape are skipped with a
/// warning. A directory without a single book file is an error.
pub fn read_book_dir(dir: &Path) -> ParseResult<VerseStore> {
    let listing = fs::read_dir(dir).map_err(|e| ParseError::io(dir, e))?;
    let mut names: Vec<String> = Vec::new();
    for item in listing {
        let item = item.map_err(|e| ParseError::io(dir, e))?;
        let name = item.file_name().to_string_lossy().into_owned();
        if is_book_file_name(&name) && item.path().is_file() {
            names.push(name);
        }
    }
    names.sort();

    let mut store = VerseStore::new();
    for name in names {
        let path = dir.join(&name);
        let text = fs::read_to_string(&path).map_err(|e| ParseError::io(&path, e))?;
        match serde_json::from_str::<BookFile>(&text) {
            Ok(file) => store.insert_book(file.book, file.chapters),
            Err(err) => warn!(path = %path.display(), %err, "skipping file that is not a book file"),
        }
    }
    if store.is_empty() {
        return Err(ParseError::MissingSource(format!(
            "no per-book files found in {}",
            dir.display()
        )));
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VersePayload;

    fn sample() -> VerseStore {
        let mut store = VerseStore::new();
        store.insert("PRO", 21, 11, "When the scorner is punished");
        store.insert("PRO", 21, 12, "The righteous man wisely considereth");
        store.insert("GEN", 1, 1, "In the beginning");
        store
    }

    #[test]
    fn book_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_book_files(&sample(), dir.path(), false).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["GEN.json", "PRO.json"]);

        fs::write(dir.path().join("bible_kjv.min.json"), "{}").unwrap();
        fs::write(dir.path().join("XYZ.json"), "[1, 2]").unwrap();
        let back = read_book_dir(dir.path()).unwrap();
        assert_eq!(back, sample());
        assert_eq!(
            back.get("PRO", 21, 12),
            Some(&VersePayload::Text("The righteous man wisely considereth".into()))
        );
    }

    #[test]
    fn existing_files_need_force() {
        let dir = tempfile::tempdir().unwrap();
        write_book_files(&sample(), dir.path(), false).unwrap();
        let err = write_book_files(&sample(), dir.path(), false).unwrap_err();
        assert!(matches!(err, ParseError::OutputExists(p) if p.ends_with("GEN.json")));
        assert!(write_book_files(&sample(), dir.path(), true).is_ok());
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_book_dir(dir.path()),
            Err(ParseError::MissingSource(_))
        ));
    }

    #[test]
    fn manifest_flattens_counters() {
        let counters = ParseCounters {
            files: 1,
            verse_starts: 3,
            verses_written: 3,
            ..Default::default()
        };
        let manifest = Manifest::new("KJV (USFM)", &sample()).with_counters(&counters);
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), &manifest).unwrap();
        let back = Manifest::read(dir.path()).unwrap();
        assert_eq!(back.books, vec!["GEN", "PRO"]);
        assert_eq!(back.extra.get("verses"), Some(&serde_json::json!(3)));
        assert_eq!(back, manifest);
    }
}
