//! Canonical verse store
//!
//!     Every dialect parser produces the same shape: book code → chapter → verse → payload. A
//!     payload is either plain text or a token list with Strong's codes. Chapter and verse
//!     numbers are positive and unique within a book, and empty verses are never stored.
//!
//!     Maps are `BTreeMap`s keyed by integers so iteration is numeric; serde_json writes the
//!     keys as strings (`"1"`, `"2"`, ... `"10"`) and reads them back the same way.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type VerseMap = BTreeMap<u32, VersePayload>;
pub type ChapterMap = BTreeMap<u32, VerseMap>;

/// One word of a Strong's-tagged verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "t")]
    pub text: String,
    #[serde(rename = "s", default)]
    pub strongs: Vec<String>,
}

impl Token {
    pub fn plain(text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            strongs: Vec::new(),
        }
    }

    pub fn tagged(text: impl Into<String>, strongs: Vec<String>) -> Self {
        Token {
            text: text.into(),
            strongs,
        }
    }
}

/// Tokens in document order plus the verse-level union of their codes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedVerse {
    pub tokens: Vec<Token>,
    #[serde(rename = "s", default)]
    pub strongs: Vec<String>,
}

impl TaggedVerse {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut strongs = Vec::new();
        for token in &tokens {
            crate::strongs::union_into(&mut strongs, &token.strongs);
        }
        TaggedVerse { tokens, strongs }
    }

    /// Reading text: tokens joined by spaces, with punctuation pulled onto the previous word
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            let text = token.text.trim();
            if text.is_empty() {
                continue;
            }
            let attaches = text.chars().all(|c| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'));
            if !out.is_empty() && !attaches {
                out.push(' ');
            }
            out.push_str(text);
        }
        out
    }
}

/// Stored value of one verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersePayload {
    Text(String),
    Tagged(TaggedVerse),
}

impl VersePayload {
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            VersePayload::Text(s) => std::borrow::Cow::Borrowed(s.as_str()),
            VersePayload::Tagged(tagged) => std::borrow::Cow::Owned(tagged.plain_text()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            VersePayload::Text(s) => s.trim().is_empty(),
            VersePayload::Tagged(tagged) => tagged.tokens.iter().all(|t| t.text.trim().is_empty()),
        }
    }

    pub fn tokens(&self) -> Option<&[Token]> {
        match self {
            VersePayload::Text(_) => None,
            VersePayload::Tagged(tagged) => Some(&tagged.tokens),
        }
    }
}

impl From<&str> for VersePayload {
    fn from(s: &str) -> Self {
        VersePayload::Text(s.to_string())
    }
}

impl From<String> for VersePayload {
    fn from(s: String) -> Self {
        VersePayload::Text(s)
    }
}

/// book → chapter → verse → payload for one translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseStore {
    books: BTreeMap<String, ChapterMap>,
}

impl VerseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a verse; returns false when the payload is empty or the address is not positive.
    ///
    /// A second insert at the same address replaces the first.
    pub fn insert(
        &mut self,
        book: &str,
        chapter: u32,
        verse: u32,
        payload: impl Into<VersePayload>,
    ) -> bool {
        let payload = payload.into();
        if chapter == 0 || verse == 0 || payload.is_empty() {
            return false;
        }
        let payload = match payload {
            VersePayload::Text(s) => VersePayload::Text(s.trim().to_string()),
            tagged => tagged,
        };
        self.books
            .entry(book.to_string())
            .or_default()
            .entry(chapter)
            .or_default()
            .insert(verse, payload);
        true
    }

    pub fn get(&self, book: &str, chapter: u32, verse: u32) -> Option<&VersePayload> {
        self.books.get(book)?.get(&chapter)?.get(&verse)
    }

    pub fn book(&self, book: &str) -> Option<&ChapterMap> {
        self.books.get(book)
    }

    pub fn chapter(&self, book: &str, chapter: u32) -> Option<&VerseMap> {
        self.books.get(book)?.get(&chapter)
    }

    pub fn has_book(&self, book: &str) -> bool {
        self.books.contains_key(book)
    }

    /// Book codes, sorted lexicographically
    pub fn book_codes(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }

    pub fn books(&self) -> impl Iterator<Item = (&str, &ChapterMap)> {
        self.books.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert a whole book as read back from disk
    pub fn insert_book(&mut self, book: impl Into<String>, chapters: ChapterMap) {
        self.books.insert(book.into(), chapters);
    }

    /// Fold `other` into this store; verses already present are kept
    pub fn merge(&mut self, other: VerseStore) {
        for (book, chapters) in other.books {
            let target = self.books.entry(book).or_default();
            for (chapter, verses) in chapters {
                let target = target.entry(chapter).or_default();
                for (verse, payload) in verses {
                    target.entry(verse).or_insert(payload);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn chapter_count(&self) -> usize {
        self.books.values().map(BTreeMap::len).sum()
    }

    pub fn verse_count(&self) -> usize {
        self.books
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn has_tagged(&self) -> bool {
        self.books
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .any(|p| matches!(p, VersePayload::Tagged(_)))
    }
}

/// Per-book JSON document: `{"book": "GEN", "chapters": {"1": {"1": ...}}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookFile {
    pub book: String,
    pub chapters: ChapterMap,
}

/// What a parse run saw, beyond the verses themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseCounters {
    pub files: usize,
    pub verse_starts: usize,
    pub verses_written: usize,
    pub skipped_books: usize,
    pub collapsed_ranges: usize,
    pub failed_files: usize,
}

impl ParseCounters {
    pub fn add(&mut self, other: &ParseCounters) {
        self.files += other.files;
        self.verse_starts += other.verse_starts;
        self.verses_written += other.verses_written;
        self.skipped_books += other.skipped_books;
        self.collapsed_ranges += other.collapsed_ranges;
        self.failed_files += other.failed_files;
    }
}

/// Result of parsing one or more source files
#[derive(Debug, Clone, Default)]
pub struct ParsedCorpus {
    pub store: VerseStore,
    pub counters: ParseCounters,
    /// Display names by book code, when the source carries them (USFM `\h`)
    pub names: BTreeMap<String, String>,
}

impl ParsedCorpus {
    /// Fold `other` in; `verses_written` grows only by the addresses that were new here
    pub fn merge(&mut self, other: ParsedCorpus) {
        let before = self.store.verse_count();
        let written = self.counters.verses_written;
        self.store.merge(other.store);
        self.counters.add(&other.counters);
        self.counters.verses_written = written + (self.store.verse_count() - before);
        for (code, name) in other.names {
            self.names.entry(code).or_insert(name);
        }
    }

    /// Store a verse; `verses_written` counts distinct addresses, so a repeat that
    /// replaces an earlier verse is not counted again
    pub fn record(&mut self, book: &str, chapter: u32, verse: u32, payload: VersePayload) {
        let fresh = self.store.get(book, chapter, verse).is_none();
        if self.store.insert(book, chapter, verse, payload) && fresh {
            self.counters.verses_written += 1;
        }
    }
}
