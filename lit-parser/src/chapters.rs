//! Chapter stream and its companions
//!
//!     Alongside the per-book files an import writes:
//!
//!     - `chapters.jsonl`: one chapter per line,
//!       `{"book_id": "GEN", "chapter": 1, "verses": [{"verse": 1, "text": "...", "tokens": [...]}]}`
//!     - `books.json`: `{"order": [...canonical order...], "names": {"GEN": "Genesis"}}`
//!
//!     The splitter fans `chapters.jsonl` out into `chapters/<book>/<chapter:03>.json`, each a
//!     pretty-printed copy of its line. Existing chapter files are left alone unless forced.

use crate::books;
use crate::error::{ParseError, ParseResult};
use crate::store::{Token, VersePayload, VerseStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CHAPTERS_FILE: &str = "chapters.jsonl";
pub const BOOKS_FILE: &str = "books.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub verse: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<Token>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub book_id: String,
    pub chapter: u32,
    pub verses: Vec<VerseRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCounts {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
}

/// Book codes of a store in canonical order
pub fn canonical_order(store: &VerseStore) -> Vec<String> {
    let mut codes: Vec<String> = store.book_codes().map(str::to_string).collect();
    books::sort_codes_canonically(&mut codes);
    codes
}

/// Chapter records of a store, books in canonical order
pub fn chapter_records(store: &VerseStore) -> Vec<ChapterRecord> {
    let mut records = Vec::new();
    for code in canonical_order(store) {
        let Some(chapters) = store.book(&code) else {
            continue;
        };
        for (chapter, verses) in chapters {
            records.push(ChapterRecord {
                book_id: code.clone(),
                chapter: *chapter,
                verses: verses
                    .iter()
                    .map(|(verse, payload)| VerseRecord {
                        verse: *verse,
                        text: payload.text().into_owned(),
                        tokens: payload.tokens().map(<[Token]>::to_vec),
                    })
                    .collect(),
            });
        }
    }
    records
}

pub fn write_chapter_stream(store: &VerseStore, path: &Path) -> ParseResult<StreamCounts> {
    let file = fs::File::create(path).map_err(|e| ParseError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let mut counts = StreamCounts {
        books: store.book_count(),
        ..Default::default()
    };
    for record in chapter_records(store) {
        counts.chapters += 1;
        counts.verses += record.verses.len();
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n").map_err(|e| ParseError::io(path, e))?;
    }
    out.flush().map_err(|e| ParseError::io(path, e))?;
    Ok(counts)
}

/// Rebuild a store from `chapters.jsonl`; tagged verses come back tagged
pub fn read_chapter_stream(path: &Path) -> ParseResult<VerseStore> {
    let file = fs::File::open(path).map_err(|e| ParseError::io(path, e))?;
    let mut store = VerseStore::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| ParseError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ChapterRecord = serde_json::from_str(&line).map_err(|e| {
            ParseError::InvalidStructure(format!("line {}: {}", index + 1, e)).in_file(path)
        })?;
        for verse in record.verses {
            let payload = match verse.tokens {
                Some(tokens) => VersePayload::Tagged(crate::store::TaggedVerse::new(tokens)),
                None => VersePayload::Text(verse.text),
            };
            store.insert(&record.book_id, record.chapter, verse.verse, payload);
        }
    }
    Ok(store)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooksIndex {
    pub order: Vec<String>,
    pub names: BTreeMap<String, String>,
}

/// `books.json`; names come from the source when it had them, else from the book table
pub fn books_index(store: &VerseStore, names: &BTreeMap<String, String>) -> BooksIndex {
    let order = canonical_order(store);
    let names = order
        .iter()
        .map(|code| {
            let name = names
                .get(code)
                .cloned()
                .or_else(|| books::by_code(code).map(|b| b.name.to_string()))
                .unwrap_or_else(|| code.clone());
            (code.clone(), name)
        })
        .collect();
    BooksIndex { order, names }
}

pub fn write_books_index(path: &Path, index: &BooksIndex) -> ParseResult<()> {
    let json = serde_json::to_string_pretty(index)?;
    fs::write(path, json).map_err(|e| ParseError::io(path, e))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub written: usize,
    pub skipped: usize,
}

fn safe_dir_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Split `chapters.jsonl` into `out_root/<book>/<chapter:03>.json`
pub fn split_chapter_stream(jsonl: &Path, out_root: &Path, force: bool) -> ParseResult<SplitReport> {
    let file = fs::File::open(jsonl).map_err(|e| ParseError::io(jsonl, e))?;
    let mut report = SplitReport::default();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| ParseError::io(jsonl, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let invalid = |message: String| {
            ParseError::InvalidStructure(format!("line {line_no}: {message}")).in_file(jsonl)
        };
        let obj: serde_json::Value =
            serde_json::from_str(&line).map_err(|e| invalid(e.to_string()))?;
        let book_id = obj.get("book_id").and_then(|v| v.as_str()).unwrap_or("");
        let chapter = obj.get("chapter").and_then(|v| v.as_u64());
        let (true, Some(chapter)) = (safe_dir_name(book_id), chapter) else {
            return Err(invalid("missing book_id or integer chapter".into()));
        };

        let dir = out_root.join(book_id);
        fs::create_dir_all(&dir).map_err(|e| ParseError::io(&dir, e))?;
        let path = dir.join(format!("{chapter:03}.json"));
        if path.exists() && !force {
            debug!(path = %path.display(), "chapter file exists, leaving it");
            report.skipped += 1;
            continue;
        }
        let json = serde_json::to_string_pretty(&obj)?;
        fs::write(&path, json).map_err(|e| ParseError::io(&path, e))?;
        report.written += 1;
    }
    info!(
        source = %jsonl.display(),
        written = report.written,
        skipped = report.skipped,
        "split chapter stream"
    );
    Ok(report)
}

/// A translation directory holding a chapter stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    pub lang: String,
    pub code: String,
    pub dir: PathBuf,
}

impl StreamTarget {
    pub fn stream(&self) -> PathBuf {
        self.dir.join(CHAPTERS_FILE)
    }

    /// Where the split chapter files go
    pub fn chapters_dir(&self) -> PathBuf {
        self.dir.join("chapters")
    }
}

fn subdirs(dir: &Path) -> ParseResult<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for item in fs::read_dir(dir).map_err(|e| ParseError::io(dir, e))? {
        let item = item.map_err(|e| ParseError::io(dir, e))?;
        if item.path().is_dir() {
            names.push(item.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// `<base>/<lang>/<code>` directories that hold a `chapters.jsonl`, sorted by language then code
pub fn find_chapter_streams(
    base: &Path,
    lang: Option<&str>,
    code: Option<&str>,
) -> ParseResult<Vec<StreamTarget>> {
    let langs = match lang {
        Some(lang) => vec![lang.to_string()],
        None => subdirs(base)?,
    };
    let mut targets = Vec::new();
    for lang in langs {
        let lang_dir = base.join(&lang);
        let codes = match code {
            Some(code) => vec![code.to_string()],
            None => subdirs(&lang_dir)?,
        };
        for code in codes {
            let dir = lang_dir.join(&code);
            if dir.join(CHAPTERS_FILE).is_file() {
                targets.push(StreamTarget {
                    lang: lang.clone(),
                    code,
                    dir,
                });
            }
        }
    }
    Ok(targets)
}
