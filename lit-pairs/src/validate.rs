//! Checks against the default translation
//!
//! Span and PV problems are hard errors. A root phrase missing from the PV text is only a
//! warning: roots are highlights, and small wording differences should not stop a build.

use crate::error::ValidationError;
use crate::normalize::{norm_key, RefParts};
use lit_parser::VerseStore;

/// The book, chapter and every verse of the span exist
pub fn validate_ref(store: &VerseStore, parts: &RefParts) -> Result<(), ValidationError> {
    if !store.has_book(&parts.book) {
        return Err(ValidationError::MissingBook(parts.book.clone()));
    }
    let verses = store
        .chapter(&parts.book, parts.chapter)
        .ok_or_else(|| ValidationError::MissingChapter {
            book: parts.book.clone(),
            chapter: parts.chapter,
        })?;
    match parts.verses().find(|v| !verses.contains_key(v)) {
        Some(verse) => Err(ValidationError::MissingVerse {
            book: parts.book.clone(),
            chapter: parts.chapter,
            verse,
        }),
        None => Ok(()),
    }
}

pub fn validate_pv_subset(parts: &RefParts, pv: &[u32]) -> Result<(), ValidationError> {
    match pv.iter().find(|v| **v < parts.start || **v > parts.end) {
        Some(verse) => Err(ValidationError::PvOutsideSpan {
            verse: *verse,
            start: parts.start,
            end: parts.end,
        }),
        None => Ok(()),
    }
}

/// Warnings for roots that do not occur in the folded PV text
pub fn validate_roots(
    store: &VerseStore,
    parts: &RefParts,
    pv: &[u32],
    roots: &[String],
) -> Result<Vec<String>, ValidationError> {
    let mut texts = Vec::with_capacity(pv.len());
    for verse in pv {
        let payload = store
            .get(&parts.book, parts.chapter, *verse)
            .ok_or_else(|| ValidationError::MissingVerse {
                book: parts.book.clone(),
                chapter: parts.chapter,
                verse: *verse,
            })?;
        texts.push(payload.text().into_owned());
    }
    let joined = norm_key(&texts.join(" "));
    Ok(roots
        .iter()
        .filter(|root| {
            let folded = norm_key(root);
            !folded.is_empty() && !joined.contains(&folded)
        })
        .map(|root| format!("root not found in PV text: {root:?}"))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VerseStore {
        let mut store = VerseStore::new();
        store.insert("PRO", 21, 11, "When the scorner is punished, the simple is made wise");
        store
    }

    fn span(start: u32, end: u32) -> RefParts {
        RefParts {
            book: "PRO".into(),
            chapter: 21,
            start,
            end,
        }
    }

    #[test]
    fn missing_verse_names_book_chapter_and_verse() {
        let err = validate_ref(&store(), &span(11, 12)).unwrap_err();
        assert_eq!(err.to_string(), "missing verse 21:12 in PRO");
        assert!(validate_ref(&store(), &span(11, 11)).is_ok());
    }

    #[test]
    fn missing_book_and_chapter() {
        let gen = RefParts {
            book: "GEN".into(),
            chapter: 1,
            start: 1,
            end: 1,
        };
        assert_eq!(
            validate_ref(&store(), &gen),
            Err(ValidationError::MissingBook("GEN".into()))
        );
        let chapter = RefParts {
            chapter: 22,
            ..span(1, 1)
        };
        assert!(matches!(
            validate_ref(&store(), &chapter),
            Err(ValidationError::MissingChapter { chapter: 22, .. })
        ));
    }

    #[test]
    fn pv_must_sit_inside_the_span() {
        assert!(validate_pv_subset(&span(11, 12), &[11, 12]).is_ok());
        assert_eq!(
            validate_pv_subset(&span(11, 12), &[13]),
            Err(ValidationError::PvOutsideSpan {
                verse: 13,
                start: 11,
                end: 12
            })
        );
    }

    #[test]
    fn roots_match_case_and_space_insensitively() {
        let roots = vec![
            "The  SCORNER is punished".to_string(),
            "the wise man".to_string(),
            " ".to_string(),
        ];
        let warnings = validate_roots(&store(), &span(11, 11), &[11], &roots).unwrap();
        assert_eq!(warnings, vec!["root not found in PV text: \"the wise man\""]);
    }
}
