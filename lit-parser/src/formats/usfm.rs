//! USFM books inside a zip archive
//!
//!     Every `*.usfm` member is read in name order. Lines are driven by their leading marker:
//!
//!         \id GEN ...            book (resolved through the book table)
//!         \h Genesis             display name
//!         \c 1                   chapter
//!         \v 1 In the beginning  verse; before any \c the chapter is 1
//!         \q1 more text          continuation of the open verse, marker dropped
//!
//!     Several `\v` markers on one line are split apart. Verse numbers that are not integers
//!     (bridges like `1-2`) are skipped. Footnotes and cross references are removed, and inline
//!     character markers are stripped down to their text: `\w word|strong="H7225"\w*` reads as
//!     `word`, or as a tagged token in the Strong's flavour.

use crate::books;
use crate::cursor::{TextBuffer, TokenBuffer, VerseBuffer, VerseCursor};
use crate::error::{ParseError, ParseResult};
use crate::format::VerseFormat;
use crate::registry::Dialect;
use crate::store::ParsedCorpus;
use crate::strongs;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};
use tracing::{debug, info, warn};

static VERSE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\v\s+").unwrap());
static NOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:f|fe|ef|x|ex)\s.*?\\(?:f|fe|ef|x|ex)\*").unwrap());
static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\+?w\s+([^|\\]*?)(?:\|([^\\]*?))?\\\+?w\*").unwrap());
static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\+?[A-Za-z0-9]+\*?").unwrap());
static STRONG_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"strong\s*=\s*"([^"]*)""#).unwrap());

/// Codes in a `\w` attribute block, preferring its `strong="..."` attribute
fn attr_codes(block: &str) -> Vec<String> {
    match STRONG_ATTR.captures(block).and_then(|c| c.get(1)) {
        Some(value) => strongs::extract_codes(value.as_str()),
        None => strongs::extract_codes(block),
    }
}

/// Remove notes and markers, keeping the words of `\w` spans
pub fn strip_inline(text: &str) -> String {
    let text = NOTES.replace_all(text, " ");
    let text = WORD.replace_all(&text, "$1");
    let text = MARKER.replace_all(&text, " ");
    crate::xml::collapse_whitespace(&text)
}

/// Feed a verse segment into a buffer
trait SegmentSink: VerseBuffer {
    fn push_segment(&mut self, segment: &str);
}

impl SegmentSink for TextBuffer {
    fn push_segment(&mut self, segment: &str) {
        self.push_text(" ");
        self.push_text(&strip_inline(segment));
    }
}

impl SegmentSink for TokenBuffer {
    fn push_segment(&mut self, segment: &str) {
        let segment = NOTES.replace_all(segment, " ");
        let mut pos = 0;
        for caps in WORD.captures_iter(&segment) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            self.push_text(&strip_inline(&segment[pos..whole.start()]));
            let word = caps.get(1).map_or("", |m| m.as_str());
            let codes = caps
                .get(2)
                .map(|m| attr_codes(m.as_str()))
                .unwrap_or_default();
            self.push_tagged(word, codes);
            pos = whole.end();
        }
        self.push_text(&strip_inline(&segment[pos..]));
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UsfmZipFormat {
    strongs: bool,
}

impl UsfmZipFormat {
    pub fn plain() -> Self {
        UsfmZipFormat { strongs: false }
    }

    pub fn strongs() -> Self {
        UsfmZipFormat { strongs: true }
    }
}

impl VerseFormat for UsfmZipFormat {
    fn dialect(&self) -> Dialect {
        if self.strongs {
            Dialect::UsfmStrongsZip
        } else {
            Dialect::UsfmZip
        }
    }

    fn description(&self) -> &str {
        if self.strongs {
            "zip of USFM books with \\w Strong's tags"
        } else {
            "zip of USFM books"
        }
    }

    fn file_extensions(&self) -> &[&str] {
        &["zip"]
    }

    fn parse(&self, bytes: &[u8]) -> ParseResult<ParsedCorpus> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut members: Vec<String> = archive
            .file_names()
            .filter(|n| n.to_ascii_lowercase().ends_with(".usfm"))
            .map(str::to_string)
            .collect();
        members.sort();
        if members.is_empty() {
            return Err(ParseError::InvalidStructure(
                "archive contains no .usfm members".into(),
            ));
        }

        let mut out = ParsedCorpus::default();
        for name in &members {
            let mut raw = Vec::new();
            archive
                .by_name(name)?
                .read_to_end(&mut raw)
                .map_err(|e| ParseError::io(name, e))?;
            let text = String::from_utf8_lossy(&raw);
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
            let before = out.counters.verses_written;
            parse_usfm_text(text, self.strongs, &mut out);
            debug!(member = %name, verses = out.counters.verses_written - before, "usfm member");
        }
        info!(
            members = members.len(),
            verses = out.counters.verses_written,
            "parsed usfm archive"
        );
        Ok(out)
    }
}

/// Parse one USFM book into `out`
pub fn parse_usfm_text(text: &str, strongs: bool, out: &mut ParsedCorpus) {
    if strongs {
        parse_book::<TokenBuffer>(text, out);
    } else {
        parse_book::<TextBuffer>(text, out);
    }
}

fn parse_book<B: SegmentSink>(text: &str, out: &mut ParsedCorpus) {
    let mut cursor: VerseCursor<B> = VerseCursor::new();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let starts: Vec<_> = VERSE_MARKER.find_iter(line).collect();
        let head_end = starts.first().map_or(line.len(), |m| m.start());
        head_line(&line[..head_end], &mut cursor, out);
        for (i, m) in starts.iter().enumerate() {
            let end = starts.get(i + 1).map_or(line.len(), |next| next.start());
            verse_segment(&line[m.end()..end], &mut cursor, out);
        }
    }
    cursor.finish(out);
    out.counters.files += 1;
}

fn head_line<B: SegmentSink>(head: &str, cursor: &mut VerseCursor<B>, out: &mut ParsedCorpus) {
    let head = head.trim();
    if head.is_empty() {
        return;
    }
    let (marker, rest) = match head.split_once(char::is_whitespace) {
        Some((m, r)) => (m, r.trim()),
        None => (head, ""),
    };
    match marker {
        "\\id" => {
            let code = rest.split_whitespace().next().unwrap_or("");
            let book = books::resolve_code(code);
            if book.is_none() {
                warn!(code, "unknown USFM book id, skipping its verses");
                out.counters.skipped_books += 1;
            }
            cursor.enter_book(book.map(|b| b.code), out);
        }
        "\\h" => {
            if let (Some(book), false) = (cursor.book(), rest.is_empty()) {
                out.names.insert(book.to_string(), rest.to_string());
            }
        }
        "\\c" => match super::parse_number(rest) {
            Some(n) => {
                cursor.enter_chapter(n, out);
            }
            None => debug!(line = head, "unreadable chapter marker"),
        },
        m if m.starts_with('\\') => {
            if let Some(buf) = cursor.buffer_mut() {
                buf.push_segment(rest);
            }
        }
        _ => {
            if let Some(buf) = cursor.buffer_mut() {
                buf.push_segment(head);
            }
        }
    }
}

fn verse_segment<B: SegmentSink>(segment: &str, cursor: &mut VerseCursor<B>, out: &mut ParsedCorpus) {
    let segment = segment.trim();
    let (number, text) = match segment.split_once(char::is_whitespace) {
        Some((n, t)) => (n, t),
        None => (segment, ""),
    };
    let Some(verse) = super::parse_number(number) else {
        debug!(number, "skipping non-numeric verse");
        return;
    };
    cursor.ensure_chapter(1, out);
    if cursor.start_verse(verse, out) {
        if let Some(buf) = cursor.buffer_mut() {
            buf.push_segment(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn archive(members: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn verse_without_chapter_defaults_to_one() {
        let mut out = ParsedCorpus::default();
        parse_usfm_text("\\id GEN\n\\v 1 In the beginning God created", false, &mut out);
        assert_eq!(
            out.store.get("GEN", 1, 1).unwrap().text(),
            "In the beginning God created"
        );
    }

    #[test]
    fn chapters_continuations_and_bridges() {
        let text = "\\id PRO Proverbs\n\\h Proverbs\n\\c 21\n\\p\n\\v 11 When the scorner is punished,\n\\q2 the simple is made wise\n\\v 12-13 bridged\n\\c 22\n\\v 1 A good name \\v 2 The rich";
        let mut out = ParsedCorpus::default();
        parse_usfm_text(text, false, &mut out);
        let store = &out.store;
        assert_eq!(
            store.get("PRO", 21, 11).unwrap().text(),
            "When the scorner is punished, the simple is made wise"
        );
        assert!(store.get("PRO", 21, 12).is_none());
        assert_eq!(store.get("PRO", 22, 1).unwrap().text(), "A good name");
        assert_eq!(store.get("PRO", 22, 2).unwrap().text(), "The rich");
        assert_eq!(out.names.get("PRO").map(String::as_str), Some("Proverbs"));
    }

    #[test]
    fn inline_markers_and_notes_are_stripped() {
        assert_eq!(
            strip_inline(r#"In the \w beginning|strong="H7225"\w* God\f + \fr 1:1 \ft Or, at first\f* \add created\add*"#),
            "In the beginning God created"
        );
    }

    #[test]
    fn strongs_tokens_from_w_spans() {
        let text = "\\id GEN\n\\c 1\n\\v 1 \\w In the beginning|strong=\"H7225\"\\w* \\w God|strong=\"H430\"\\w* created.";
        let mut out = ParsedCorpus::default();
        parse_usfm_text(text, true, &mut out);
        let tokens = out.store.get("GEN", 1, 1).unwrap().tokens().unwrap().to_vec();
        let words: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["In the beginning", "God", "created."]);
        assert_eq!(tokens[0].strongs, vec!["H7225"]);
        assert_eq!(tokens[1].strongs, vec!["H0430"]);
        assert!(tokens[2].strongs.is_empty());
    }

    #[test]
    fn archive_members_in_name_order() {
        let bytes = archive(&[
            ("02-EXOeng.usfm", "\\id EXO\n\\c 1\n\\v 1 Now these are the names"),
            ("01-GENeng.usfm", "\\id GEN\n\\c 1\n\\v 1 In the beginning"),
            ("readme.txt", "not scripture"),
            ("00-FRTeng.usfm", "\\id FRT\n\\v 1 front matter"),
        ]);
        let corpus = UsfmZipFormat::plain().parse(&bytes).unwrap();
        assert_eq!(corpus.counters.files, 3);
        assert_eq!(corpus.counters.skipped_books, 1);
        assert_eq!(corpus.store.book_codes().collect::<Vec<_>>(), vec!["EXO", "GEN"]);
    }

    #[test]
    fn archive_without_usfm_is_rejected() {
        let bytes = archive(&[("notes.txt", "nothing")]);
        assert!(matches!(
            UsfmZipFormat::plain().parse(&bytes),
            Err(ParseError::InvalidStructure(_))
        ));
        assert!(matches!(
            UsfmZipFormat::plain().parse(b"not a zip"),
            Err(ParseError::Zip(_))
        ));
    }
}
