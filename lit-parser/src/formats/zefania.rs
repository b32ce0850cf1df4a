//! Zefania XML
//!
//!     <XMLBIBLE>
//!       <BIBLEBOOK bnumber="1" bname="Genesis">
//!         <CHAPTER cnumber="1">
//!           <VERS vnumber="1">In the beginning <STYLE css="...">God</STYLE> created</VERS>
//!
//!     Books are numbered 1–66 in canonical order; when `bnumber` is missing or out of range the
//!     first three letters of `bname` are tried as a code. Verse text is all descendant text
//!     with whitespace collapsed.

use crate::books;
use crate::cursor::{TextBuffer, VerseCursor};
use crate::error::ParseResult;
use crate::format::VerseFormat;
use crate::registry::Dialect;
use crate::store::ParsedCorpus;
use crate::xml::{Element, XmlEvent, XmlStream};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct ZefaniaFormat;

/// Book of a `BIBLEBOOK` element
fn resolve_book(el: &Element) -> Option<&'static books::Book> {
    let by_number = el
        .attr("bnumber")
        .and_then(super::parse_number)
        .and_then(books::from_ordinal);
    by_number.or_else(|| {
        let name = el.attr("bname")?.trim();
        let prefix: String = name.chars().take(3).collect();
        books::resolve_code(&prefix).or_else(|| books::lookup_name(name))
    })
}

impl VerseFormat for ZefaniaFormat {
    fn dialect(&self) -> Dialect {
        Dialect::Zefania
    }

    fn description(&self) -> &str {
        "Zefania XMLBIBLE"
    }

    fn parse(&self, bytes: &[u8]) -> ParseResult<ParsedCorpus> {
        let mut stream = XmlStream::from_bytes(bytes)?;
        let mut out = ParsedCorpus::default();
        let mut cursor: VerseCursor<TextBuffer> = VerseCursor::new();
        let mut verse_depth: Option<usize> = None;

        while let Some(event) = stream.next_event()? {
            match event {
                XmlEvent::Start(el) => match el.name.as_str() {
                    "BIBLEBOOK" => {
                        let book = resolve_book(&el);
                        if book.is_none() {
                            warn!(attrs = ?el.attrs, "unresolvable BIBLEBOOK, skipping");
                            out.counters.skipped_books += 1;
                        }
                        cursor.enter_book(book.map(|b| b.code), &mut out);
                    }
                    "CHAPTER" => match el.attr("cnumber").and_then(super::parse_number) {
                        Some(n) => {
                            cursor.enter_chapter(n, &mut out);
                        }
                        None => {
                            debug!(attrs = ?el.attrs, "CHAPTER without a number");
                            cursor.leave_chapter(&mut out);
                        }
                    },
                    "VERS" if verse_depth.is_none() => {
                        match el.attr("vnumber").and_then(super::parse_number) {
                            Some(n) => {
                                if cursor.start_verse(n, &mut out) {
                                    verse_depth = Some(stream.depth());
                                }
                            }
                            None => debug!(attrs = ?el.attrs, "VERS without a number"),
                        }
                    }
                    _ => {}
                },
                XmlEvent::End(_) => {
                    if verse_depth.is_some_and(|d| stream.depth() < d) {
                        cursor.end_verse(&mut out);
                        verse_depth = None;
                    }
                }
                XmlEvent::Text(text) => {
                    if verse_depth.is_some() {
                        cursor.push_text(&text);
                    }
                }
            }
        }
        cursor.finish(&mut out);
        out.counters.files += 1;
        Ok(out)
    }
}
