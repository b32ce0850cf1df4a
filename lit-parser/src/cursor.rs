//! Streaming verse cursor
//!
//!     Marker-based dialects (USFX, USFM, OSIS milestones) never wrap a verse in one element;
//!     a verse is whatever text shows up between one marker and the next. The cursor owns that
//!     state explicitly:
//!
//!         NoBook ──book──▶ InBook ──chapter──▶ InChapter ──verse──▶ InVerse
//!
//!     Every transition flushes the buffered text of the verse being left into the corpus, so
//!     "which text belongs to which verse" is decided in exactly one place. Text pushed while
//!     not `InVerse` is discarded.

use crate::store::{ParsedCorpus, TaggedVerse, Token, VersePayload};
use crate::xml::collapse_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    NoBook,
    InBook,
    InChapter,
    InVerse,
}

/// Accumulates the content of the open verse
pub trait VerseBuffer: Default {
    fn push_text(&mut self, text: &str);
    /// Drain the buffer; `None` when nothing worth storing was collected
    fn take(&mut self) -> Option<VersePayload>;
}

/// Plain text, whitespace-collapsed on flush
#[derive(Debug, Default)]
pub struct TextBuffer {
    parts: String,
}

impl VerseBuffer for TextBuffer {
    fn push_text(&mut self, text: &str) {
        self.parts.push_str(text);
    }

    fn take(&mut self) -> Option<VersePayload> {
        let text = collapse_whitespace(&std::mem::take(&mut self.parts));
        (!text.is_empty()).then_some(VersePayload::Text(text))
    }
}

/// Strong's-tagged tokens; untagged text becomes one token per word
#[derive(Debug, Default)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
}

impl TokenBuffer {
    /// One tagged span; a multi-word phrase stays a single token with collapsed whitespace
    pub fn push_tagged(&mut self, words: &str, strongs: Vec<String>) {
        let text = collapse_whitespace(words);
        if !text.is_empty() {
            self.tokens.push(Token::tagged(text, strongs));
        }
    }
}

impl VerseBuffer for TokenBuffer {
    fn push_text(&mut self, text: &str) {
        self.tokens
            .extend(text.split_whitespace().map(Token::plain));
    }

    fn take(&mut self) -> Option<VersePayload> {
        let tokens = std::mem::take(&mut self.tokens);
        (!tokens.is_empty()).then(|| VersePayload::Tagged(TaggedVerse::new(tokens)))
    }
}

#[derive(Debug, Default)]
pub struct VerseCursor<B: VerseBuffer> {
    book: Option<String>,
    chapter: Option<u32>,
    verse: Option<u32>,
    buffer: B,
}

impl<B: VerseBuffer> VerseCursor<B> {
    pub fn new() -> Self {
        VerseCursor {
            book: None,
            chapter: None,
            verse: None,
            buffer: B::default(),
        }
    }

    pub fn state(&self) -> CursorState {
        match (&self.book, self.chapter, self.verse) {
            (None, _, _) => CursorState::NoBook,
            (Some(_), None, _) => CursorState::InBook,
            (Some(_), Some(_), None) => CursorState::InChapter,
            (Some(_), Some(_), Some(_)) => CursorState::InVerse,
        }
    }

    pub fn book(&self) -> Option<&str> {
        self.book.as_deref()
    }

    pub fn chapter(&self) -> Option<u32> {
        self.chapter
    }

    /// Enter a book; `None` (an unresolvable code) leaves the cursor in `NoBook` so the
    /// subtree's verses are ignored.
    pub fn enter_book(&mut self, code: Option<&str>, out: &mut ParsedCorpus) {
        self.flush(out);
        self.book = code.map(str::to_string);
        self.chapter = None;
        self.verse = None;
    }

    /// Enter a chapter of the current book; ignored in `NoBook`
    pub fn enter_chapter(&mut self, chapter: u32, out: &mut ParsedCorpus) -> bool {
        if self.book.is_none() {
            return false;
        }
        self.flush(out);
        self.chapter = Some(chapter);
        self.verse = None;
        true
    }

    /// Drop back to `InBook`, e.g. after a chapter marker that cannot be read
    pub fn leave_chapter(&mut self, out: &mut ParsedCorpus) {
        self.flush(out);
        self.chapter = None;
        self.verse = None;
    }

    /// Enter `chapter` only when no chapter has been seen yet in this book
    pub fn ensure_chapter(&mut self, chapter: u32, out: &mut ParsedCorpus) {
        if self.book.is_some() && self.chapter.is_none() {
            self.enter_chapter(chapter, out);
        }
    }

    /// Open a verse in the current chapter; needs `InChapter` or `InVerse`
    pub fn start_verse(&mut self, verse: u32, out: &mut ParsedCorpus) -> bool {
        if self.book.is_none() || self.chapter.is_none() {
            return false;
        }
        self.flush(out);
        self.verse = Some(verse);
        out.counters.verse_starts += 1;
        true
    }

    /// Jump straight to an absolute address, as OSIS ids do
    pub fn goto_verse(&mut self, book: &str, chapter: u32, verse: u32, out: &mut ParsedCorpus) {
        self.flush(out);
        self.book = Some(book.to_string());
        self.chapter = Some(chapter);
        self.verse = Some(verse);
        out.counters.verse_starts += 1;
    }

    /// Close the open verse; the cursor falls back to `InChapter`
    pub fn end_verse(&mut self, out: &mut ParsedCorpus) {
        self.flush(out);
        self.verse = None;
    }

    pub fn push_text(&mut self, text: &str) {
        if self.state() == CursorState::InVerse {
            self.buffer.push_text(text);
        }
    }

    /// Direct access to the buffer while a verse is open
    pub fn buffer_mut(&mut self) -> Option<&mut B> {
        (self.state() == CursorState::InVerse).then_some(&mut self.buffer)
    }

    /// Flush whatever is open; call once at end of input
    pub fn finish(&mut self, out: &mut ParsedCorpus) {
        self.flush(out);
        self.verse = None;
    }

    fn flush(&mut self, out: &mut ParsedCorpus) {
        let payload = self.buffer.take();
        if let (Some(book), Some(chapter), Some(verse), Some(payload)) =
            (&self.book, self.chapter, self.verse, payload)
        {
            out.record(book, chapter, verse, payload);
        }
    }
}
