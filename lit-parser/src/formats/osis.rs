//! OSIS verses, milestone and wrapped
//!
//!     Milestone style marks the two ends of a verse with empty elements; everything between
//!     them, notes and titles included, is verse text:
//!
//!         <verse sID="Gen.1.1" osisID="Gen.1.1"/>In the beginning<verse eID="Gen.1.1"/>
//!
//!     Wrapped style puts the verse inside one element and the text is its descendant text:
//!
//!         <verse osisID="Gen.1.1">In the beginning</verse>
//!
//!     Both may appear in one document. Ranged or listed ids (`Gen.1.1-Gen.1.2`,
//!     `Gen.1.1 Gen.1.2`) are filed under their first verse; each such collapse is counted in
//!     `collapsed_ranges` and logged.

use crate::books;
use crate::cursor::{TextBuffer, VerseCursor};
use crate::error::ParseResult;
use crate::format::VerseFormat;
use crate::registry::Dialect;
use crate::store::ParsedCorpus;
use crate::xml::{XmlEvent, XmlStream};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A parsed `Book.chapter.verse` id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsisRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    /// The id named more than one verse
    pub collapsed: bool,
}

/// Parse the first triplet of an osisID.
///
/// Returns `None` when the id does not have three dot-separated parts with numeric chapter and
/// verse. The book part is returned as written.
pub fn parse_osis_id(raw: &str) -> Option<OsisRef> {
    let raw = raw.trim();
    let first = raw.split(|c: char| c.is_whitespace() || c == '-').next()?;
    let collapsed = first.len() < raw.len();
    let mut parts = first.split('.');
    let book = parts.next()?.to_string();
    let chapter = super::parse_number(parts.next()?)?;
    let verse = super::parse_number(parts.next()?)?;
    Some(OsisRef {
        book,
        chapter,
        verse,
        collapsed,
    })
}

/// Resolve the book part of an osisID: OSIS abbreviation first, then any known spelling
pub fn resolve_osis_book(abbr: &str) -> Option<&'static books::Book> {
    books::from_osis(abbr).or_else(|| books::lookup_name(abbr))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsisFormat;

impl VerseFormat for OsisFormat {
    fn dialect(&self) -> Dialect {
        Dialect::Osis
    }

    fn description(&self) -> &str {
        "OSIS XML with milestone or wrapped verse elements"
    }

    fn parse(&self, bytes: &[u8]) -> ParseResult<ParsedCorpus> {
        let mut stream = XmlStream::from_bytes(bytes)?;
        OsisScan::default().run(&mut stream)
    }
}

#[derive(Default)]
struct OsisScan {
    out: ParsedCorpus,
    cursor: VerseCursor<TextBuffer>,
    /// sID of the open milestone verse
    open_milestone: Option<String>,
    /// Depth of the open wrapped verse element
    wrapped_depth: Option<usize>,
    unknown_books: HashSet<String>,
}

impl OsisScan {
    fn run(mut self, stream: &mut XmlStream<'_>) -> ParseResult<ParsedCorpus> {
        while let Some(event) = stream.next_event()? {
            match event {
                XmlEvent::Start(el) if el.name == "verse" => {
                    if let Some(sid) = el.attr("sID") {
                        let id = el.attr("osisID").unwrap_or(sid).to_string();
                        if self.open(&id) {
                            self.open_milestone = Some(sid.to_string());
                        }
                    } else if let Some(eid) = el.attr("eID") {
                        if self.open_milestone.as_deref() == Some(eid) {
                            self.cursor.end_verse(&mut self.out);
                            self.open_milestone = None;
                        } else {
                            debug!(eid, "end milestone without matching start");
                        }
                    } else if let Some(id) = el.attr("osisID") {
                        let id = id.to_string();
                        if self.open(&id) {
                            self.open_milestone = None;
                            self.wrapped_depth = Some(stream.depth());
                        }
                    }
                }
                XmlEvent::End(name) => {
                    if name == "verse" && self.wrapped_depth.is_some_and(|d| stream.depth() < d) {
                        self.cursor.end_verse(&mut self.out);
                        self.wrapped_depth = None;
                    }
                }
                XmlEvent::Text(text) => self.cursor.push_text(&text),
                XmlEvent::Start(_) => {}
            }
        }
        self.cursor.finish(&mut self.out);
        self.out.counters.files += 1;
        Ok(self.out)
    }

    /// Position the cursor on a verse id; false when the id cannot be used
    fn open(&mut self, id: &str) -> bool {
        let Some(osis_ref) = parse_osis_id(id) else {
            debug!(id, "unparseable osisID");
            self.cursor.end_verse(&mut self.out);
            return false;
        };
        let Some(book) = resolve_osis_book(&osis_ref.book) else {
            if self.unknown_books.insert(osis_ref.book.clone()) {
                warn!(book = %osis_ref.book, "unknown OSIS book, skipping its verses");
                self.out.counters.skipped_books += 1;
            }
            self.cursor.enter_book(None, &mut self.out);
            return false;
        };
        if osis_ref.collapsed {
            warn!(id, "ranged osisID filed under its first verse");
            self.out.counters.collapsed_ranges += 1;
        }
        self.cursor
            .goto_verse(book.code, osis_ref.chapter, osis_ref.verse, &mut self.out);
        true
    }
}
