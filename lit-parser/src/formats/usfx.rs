//! USFX streaming markers
//!
//!     USFX marks positions rather than wrapping content: `<book id="GEN">`, `<c id="1"/>`,
//!     `<v id="1"/>` and an optional `<ve/>` verse end. Text belongs to the verse opened by the
//!     last `<v>` until the next marker.
//!
//!     - `note`, `xref`, `title`, `toc` and `rem` subtrees are dropped; the text after them
//!       still counts
//!     - the body of a `<v>` element is its printed label, never verse text
//!     - the Strong's flavour reads `<w s="H7225">beginning</w>` into tagged tokens and may
//!       address verses absolutely with `<v bcv="GEN.1.1"/>`

use crate::books;
use crate::cursor::{TextBuffer, TokenBuffer, VerseBuffer, VerseCursor};
use crate::error::ParseResult;
use crate::format::VerseFormat;
use crate::registry::Dialect;
use crate::store::ParsedCorpus;
use crate::strongs;
use crate::xml::{Element, XmlEvent, XmlStream};
use tracing::{debug, warn};

const SKIP_TAGS: &[&str] = &["note", "xref", "title", "toc", "rem"];
const STRONGS_ATTRS: &[&str] = &["s", "lemma", "lemmas", "strong", "x-strong", "x_strong"];

#[derive(Debug, Clone, Copy)]
pub struct UsfxFormat {
    strongs: bool,
}

impl UsfxFormat {
    pub fn plain() -> Self {
        UsfxFormat { strongs: false }
    }

    pub fn strongs() -> Self {
        UsfxFormat { strongs: true }
    }
}

impl VerseFormat for UsfxFormat {
    fn dialect(&self) -> Dialect {
        if self.strongs {
            Dialect::UsfxStrongs
        } else {
            Dialect::Usfx
        }
    }

    fn description(&self) -> &str {
        if self.strongs {
            "USFX XML with Strong's-tagged words"
        } else {
            "USFX XML, plain verse text"
        }
    }

    fn parse(&self, bytes: &[u8]) -> ParseResult<ParsedCorpus> {
        let mut stream = XmlStream::from_bytes(bytes)?;
        if self.strongs {
            UsfxScan::<TokenBuffer>::new().run(&mut stream, |buf, word, el| {
                buf.push_tagged(word, word_codes(el));
            })
        } else {
            UsfxScan::<TextBuffer>::new().run(&mut stream, |buf, word, _| buf.push_text(word))
        }
    }
}

/// Codes on a `<w>` element, from any of the attribute spellings seen in the wild
fn word_codes(el: &Element) -> Vec<String> {
    let mut codes = Vec::new();
    for key in STRONGS_ATTRS {
        if let Some(value) = el.attr(key) {
            strongs::union_into(&mut codes, &strongs::extract_codes(value));
        }
    }
    codes
}

/// `GEN.1.1` as found in `bcv` attributes
fn parse_bcv(raw: &str) -> Option<(&'static books::Book, u32, u32)> {
    let mut parts = raw.trim().split('.');
    let book = books::resolve_code(parts.next()?)?;
    let chapter = super::parse_number(parts.next()?)?;
    let verse = super::parse_number(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((book, chapter, verse))
}

struct UsfxScan<B: VerseBuffer> {
    out: ParsedCorpus,
    cursor: VerseCursor<B>,
    /// Depth at which a dropped subtree (skip tag or `<v>` label) started
    muted_at: Option<usize>,
    /// Open `<w>`: its start element, depth, and collected text
    word: Option<(Element, usize, String)>,
}

impl<B: VerseBuffer> UsfxScan<B> {
    fn new() -> Self {
        UsfxScan {
            out: ParsedCorpus::default(),
            cursor: VerseCursor::new(),
            muted_at: None,
            word: None,
        }
    }

    fn run(
        mut self,
        stream: &mut XmlStream<'_>,
        on_word: impl Fn(&mut B, &str, &Element),
    ) -> ParseResult<ParsedCorpus> {
        while let Some(event) = stream.next_event()? {
            match event {
                XmlEvent::Start(el) => {
                    if self.muted_at.is_some() {
                        continue;
                    }
                    let depth = stream.depth();
                    self.start(el, depth);
                }
                XmlEvent::End(_) => {
                    let depth = stream.depth();
                    if let Some(at) = self.muted_at {
                        if depth < at {
                            self.muted_at = None;
                        }
                        continue;
                    }
                    if self.word.as_ref().is_some_and(|(_, at, _)| depth < *at) {
                        if let Some((el, _, text)) = self.word.take() {
                            if let Some(buf) = self.cursor.buffer_mut() {
                                on_word(buf, &text, &el);
                            }
                        }
                    }
                }
                XmlEvent::Text(text) => {
                    if self.muted_at.is_some() {
                        continue;
                    }
                    match self.word.as_mut() {
                        Some((_, _, word)) => word.push_str(&text),
                        None => self.cursor.push_text(&text),
                    }
                }
            }
        }
        self.cursor.finish(&mut self.out);
        self.out.counters.files += 1;
        Ok(self.out)
    }

    fn start(&mut self, el: Element, depth: usize) {
        let name = el.name.clone();
        match name.as_str() {
            "book" | "scriptureBook" => {
                let raw = if name == "book" {
                    el.first_attr(&["code", "id"])
                } else {
                    el.first_attr(&["ubsAbbreviation"])
                };
                let Some(raw) = raw else {
                    return;
                };
                let book = books::resolve_code(raw);
                if book.is_none() {
                    warn!(book = raw, "unknown USFX book, skipping its verses");
                    self.out.counters.skipped_books += 1;
                }
                self.cursor.enter_book(book.map(|b| b.code), &mut self.out);
            }
            "c" | "chapter" => {
                match el.first_attr(&["id", "number"]).and_then(super::parse_number) {
                    Some(n) => {
                        self.cursor.enter_chapter(n, &mut self.out);
                    }
                    None => debug!(attrs = ?el.attrs, "chapter marker without a number"),
                }
            }
            "v" => {
                self.open_verse(&el);
                self.muted_at = Some(depth);
            }
            "ve" => self.cursor.end_verse(&mut self.out),
            "w" if self.word.is_none() => {
                self.word = Some((el, depth, String::new()));
            }
            other if SKIP_TAGS.contains(&other) => self.muted_at = Some(depth),
            _ => {}
        }
    }

    fn open_verse(&mut self, el: &Element) {
        if let Some(bcv) = el.attr("bcv") {
            match parse_bcv(bcv) {
                Some((book, chapter, verse)) => {
                    self.cursor.goto_verse(book.code, chapter, verse, &mut self.out)
                }
                None => {
                    debug!(bcv, "unusable bcv address");
                    self.cursor.end_verse(&mut self.out);
                }
            }
            return;
        }
        match el.first_attr(&["id", "number"]).and_then(super::parse_number) {
            Some(n) => {
                if !self.cursor.start_verse(n, &mut self.out) {
                    debug!(verse = n, "verse marker outside a known book/chapter");
                }
            }
            None => self.cursor.end_verse(&mut self.out),
        }
    }
}
