//! Parsing of authored cells and text folding
//!
//!     Book    "Prov", "PROVERBS", "pro", "Pr."   ──▶  PRO
//!     Ref     "21:11", " 1:1 - 4 "               ──▶  (ch, start, end)
//!     PV      "11", "1-2", "1;3-5"               ──▶  sorted, de-duplicated verse list
//!
//!     Keys and verse texts are folded (NFKC, Unicode case fold, whitespace collapsed) before
//!     they are compared or indexed.

use crate::error::ValidationError;
use lit_parser::books;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

static REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*:\s*(\d+)\s*(?:-\s*(\d+)\s*)?$").unwrap());
static CODE_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{3}$").unwrap());
static PV_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)(?:\s*-\s*(\d+))?$").unwrap());

/// A verse span within one chapter
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefParts {
    pub book: String,
    pub chapter: u32,
    pub start: u32,
    pub end: u32,
}

impl RefParts {
    pub fn verses(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }
}

/// Resolve an authored book name to its code
pub fn canon_book(raw: &str) -> Result<String, ValidationError> {
    if let Some(book) = books::lookup_name(raw) {
        return Ok(book.code.to_string());
    }
    let trimmed = raw.trim();
    if CODE_LIKE.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }
    let stripped: String = trimmed
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    books::lookup_name(&stripped)
        .map(|b| b.code.to_string())
        .ok_or_else(|| ValidationError::UnknownBook(raw.trim().to_string()))
}

fn positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// `ch:start` or `ch:start-end`
pub fn parse_ref(book: &str, raw: &str) -> Result<RefParts, ValidationError> {
    let bad = || ValidationError::BadRef(raw.trim().to_string());
    let caps = REF.captures(raw).ok_or_else(bad)?;
    let chapter = positive(&caps[1]).ok_or_else(bad)?;
    let start = positive(&caps[2]).ok_or_else(bad)?;
    let end = match caps.get(3) {
        Some(m) => positive(m.as_str()).ok_or_else(bad)?,
        None => start,
    };
    if end < start {
        return Err(ValidationError::RefEndBeforeStart(raw.trim().to_string()));
    }
    Ok(RefParts {
        book: book.to_string(),
        chapter,
        start,
        end,
    })
}

/// `;`-separated verses and ranges; reversed ranges are swapped
pub fn parse_pv(raw: &str) -> Result<Vec<u32>, ValidationError> {
    let bad = || ValidationError::BadPv(raw.trim().to_string());
    let mut verses = BTreeSet::new();
    for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let caps = PV_PART.captures(part).ok_or_else(bad)?;
        let a = positive(&caps[1]).ok_or_else(bad)?;
        let b = match caps.get(2) {
            Some(m) => positive(m.as_str()).ok_or_else(bad)?,
            None => a,
        };
        verses.extend(a.min(b)..=a.max(b));
    }
    if verses.is_empty() {
        return Err(bad());
    }
    Ok(verses.into_iter().collect())
}

fn split_cell(cell: Option<&str>, sep: char) -> Vec<String> {
    cell.map(|c| {
        c.split(sep)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Highlight phrases, `|`-separated
pub fn split_roots(cell: Option<&str>) -> Vec<String> {
    split_cell(cell, '|')
}

/// Synonym keys, `;`-separated
pub fn split_synonyms(cell: Option<&str>) -> Vec<String> {
    split_cell(cell, ';')
}

/// NFKC, full case fold, single spaces
pub fn norm_key(s: &str) -> String {
    let folded = caseless::default_case_fold_str(&s.nfkc().collect::<String>());
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Prov", "PRO")]
    #[case("PROVERBS", "PRO")]
    #[case("PRO", "PRO")]
    #[case("proverbs", "PRO")]
    #[case("1 Sam.", "1SA")]
    #[case("Song of Solomon", "SNG")]
    #[case("XYZ", "XYZ")]
    fn book_aliases(#[case] raw: &str, #[case] code: &str) {
        assert_eq!(canon_book(raw).unwrap(), code);
    }

    #[test]
    fn unknown_book_names_fail() {
        assert_eq!(
            canon_book("Hezekiah"),
            Err(ValidationError::UnknownBook("Hezekiah".into()))
        );
        assert!(canon_book("xyz").is_err());
    }

    #[rstest]
    #[case("21:11", 21, 11, 11)]
    #[case(" 1:1-4 ", 1, 1, 4)]
    #[case("3 : 5 - 7", 3, 5, 7)]
    fn refs(#[case] raw: &str, #[case] ch: u32, #[case] start: u32, #[case] end: u32) {
        let parts = parse_ref("PRO", raw).unwrap();
        assert_eq!((parts.chapter, parts.start, parts.end), (ch, start, end));
    }

    #[rstest]
    #[case("21")]
    #[case("21:")]
    #[case("a:1")]
    #[case("0:1")]
    #[case("1:2-")]
    fn malformed_refs(#[case] raw: &str) {
        assert!(matches!(parse_ref("PRO", raw), Err(ValidationError::BadRef(_))));
    }

    #[test]
    fn reversed_ref_is_rejected() {
        assert_eq!(
            parse_ref("PRO", "1:4-1"),
            Err(ValidationError::RefEndBeforeStart("1:4-1".into()))
        );
    }

    #[test]
    fn pv_lists() {
        assert_eq!(parse_pv("11").unwrap(), vec![11]);
        assert_eq!(parse_pv("1-2").unwrap(), vec![1, 2]);
        assert_eq!(parse_pv("5;1;3-4;4").unwrap(), vec![1, 3, 4, 5]);
        assert_eq!(parse_pv("4-2").unwrap(), vec![2, 3, 4]);
        assert!(parse_pv("").is_err());
        assert!(parse_pv(" ; ").is_err());
        assert!(parse_pv("1,2").is_err());
    }

    #[test]
    fn cells_split_and_trim() {
        assert_eq!(
            split_roots(Some(" the scorner | scorner || ")),
            vec!["the scorner", "scorner"]
        );
        assert_eq!(split_synonyms(Some("mocker; scoffer")), vec!["mocker", "scoffer"]);
        assert!(split_roots(None).is_empty());
    }

    #[test]
    fn keys_fold() {
        assert_eq!(norm_key("  Scoffer   IS\tPunished "), "scoffer is punished");
        assert_eq!(norm_key("ﬁre"), "fire");
    }

    #[rstest]
    #[case("Straße", "strasse")]
    #[case("STRASSE", "strasse")]
    #[case("λόγος", "λόγοσ")]
    #[case("ΛΌΓΟΣ", "λόγοσ")]
    fn keys_fold_beyond_lower_case(#[case] raw: &str, #[case] folded: &str) {
        assert_eq!(norm_key(raw), folded);
    }
}
