//! Entries and pairs
//!
//!     Rows are grouped by (book, chapter, start, end) and groups are built in sorted order.
//!     Each group becomes one [`Entry`]:
//!
//!     1. the span is checked against the default translation (hard)
//!     2. every row's PV list must sit inside the span (hard)
//!     3. roots are looked up in the PV text (soft, collected as warnings)
//!     4. each row becomes a [`Pair`] with a content-derived id, unique across the build
//!     5. the span's text is taken from every loaded translation
//!
//!     Any hard failure is reported against the CSV line of the row that caused it (the
//!     group's first row for span problems).

use crate::bibles::Translations;
use crate::error::{PairsError, PairsResult, ValidationError};
use crate::ids::{self, IdAllocator};
use crate::normalize::{canon_book, parse_pv, parse_ref, split_roots, split_synonyms, RefParts};
use crate::options::{AssemblyOptions, SynonymsMode};
use crate::rows::PairRow;
use crate::validate::{validate_pv_subset, validate_ref, validate_roots};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Deprecated,
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "deprecated" => Ok(Status::Deprecated),
            _ => Err(ValidationError::BadStatus(s.trim().to_string())),
        }
    }
}

/// One side of a pair: the concept key and the phrases that express it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Side {
    pub key: String,
    /// Primary key first, then synonyms (when synonyms are kept)
    pub keys: Vec<String>,
    pub root: String,
    pub roots: Vec<String>,
}

impl Side {
    fn build(key: &str, roots_cell: &str, synonyms_cell: Option<&str>, mode: SynonymsMode) -> Side {
        let mut keys = vec![key.to_string()];
        if mode == SynonymsMode::Index {
            let lower = key.to_lowercase();
            keys.extend(
                split_synonyms(synonyms_cell)
                    .into_iter()
                    .filter(|s| s.to_lowercase() != lower),
            );
        }
        let roots = split_roots(Some(roots_cell));
        Side {
            key: key.to_string(),
            keys,
            root: roots.first().cloned().unwrap_or_default(),
            roots,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub pair_id: String,
    pub pv: Vec<u32>,
    pub x: Side,
    pub y: Side,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub entry_id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub osis: String,
    pub chapter: u32,
    pub verses: Vec<u32>,
    /// Span text per translation, in load order
    pub text: IndexMap<String, String>,
    pub pairs: Vec<Pair>,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub entries: Vec<Entry>,
    /// Soft validation findings, one line each
    pub warnings: Vec<String>,
}

fn row_error(row: &PairRow, source: ValidationError) -> PairsError {
    PairsError::Row {
        line: row.line,
        book: row.book.clone(),
        reference: row.reference.clone(),
        source,
    }
}

fn group_key(row: &PairRow) -> Result<RefParts, ValidationError> {
    let book = canon_book(&row.book)?;
    parse_ref(&book, &row.reference)
}

/// Group rows by span; groups come back in sorted span order, rows in input order
pub fn group_rows(rows: &[PairRow]) -> PairsResult<BTreeMap<RefParts, Vec<&PairRow>>> {
    let mut groups: BTreeMap<RefParts, Vec<&PairRow>> = BTreeMap::new();
    for row in rows {
        let key = group_key(row).map_err(|e| row_error(row, e))?;
        groups.entry(key).or_default().push(row);
    }
    Ok(groups)
}

/// Span text of one translation, `None` when any verse is missing
fn span_text(store: &lit_parser::VerseStore, parts: &RefParts) -> Option<String> {
    let verses = store.chapter(&parts.book, parts.chapter)?;
    let texts: Option<Vec<String>> = parts
        .verses()
        .map(|v| verses.get(&v).map(|p| p.text().into_owned()))
        .collect();
    texts.map(|t| t.join(" "))
}

fn build_entry(
    parts: &RefParts,
    rows: &[&PairRow],
    bibles: &Translations,
    options: &AssemblyOptions,
    allocator: &mut IdAllocator,
    warnings: &mut Vec<String>,
) -> PairsResult<Entry> {
    let default = bibles.default_store();
    if let Some(first) = rows.first() {
        validate_ref(default, parts).map_err(|e| row_error(first, e))?;
    }

    let mut pairs = Vec::with_capacity(rows.len());
    for row in rows {
        let fail = |e| row_error(row, e);
        let pv = parse_pv(&row.pv).map_err(fail)?;
        validate_pv_subset(parts, &pv).map_err(fail)?;
        let status = match row.status.as_deref() {
            Some(raw) => raw.parse::<Status>().map_err(fail)?,
            None => Status::Active,
        };
        let x = Side::build(&row.x_key, &row.x_root, row.x_keys.as_deref(), options.synonyms);
        let y = Side::build(&row.y_key, &row.y_root, row.y_keys.as_deref(), options.synonyms);

        for (label, side) in [("X", &x), ("Y", &y)] {
            for finding in validate_roots(default, parts, &pv, &side.roots).map_err(fail)? {
                let message = format!(
                    "{} {}:{}-{} pv={:?} {label}: {finding}",
                    parts.book, parts.chapter, parts.start, parts.end, pv
                );
                warn!(line = row.line, "{message}");
                warnings.push(message);
            }
        }

        let base = ids::make_pair_id(parts, &pv, &x.key, &y.key, &x.roots, &y.roots);
        pairs.push(Pair {
            pair_id: allocator.allocate(base),
            pv,
            x,
            y,
            status,
        });
    }

    let mut text = IndexMap::new();
    for (id, store) in bibles.iter() {
        match span_text(store, parts) {
            Some(joined) => {
                text.insert(id.to_string(), joined);
            }
            None => warn!(
                translation = id,
                span = %ids::ref_string(parts),
                "translation lacks part of the span, leaving it out of the entry"
            ),
        }
    }

    let notes = rows
        .iter()
        .find_map(|r| r.notes.clone())
        .unwrap_or_default();

    Ok(Entry {
        entry_id: ids::entry_id(parts),
        reference: ids::ref_string(parts),
        osis: ids::osis_string(parts),
        chapter: parts.chapter,
        verses: parts.verses().collect(),
        text,
        pairs,
        notes,
    })
}

/// Build every entry from the authored rows
pub fn build_entries(
    rows: &[PairRow],
    bibles: &Translations,
    options: &AssemblyOptions,
) -> PairsResult<Assembly> {
    let groups = group_rows(rows)?;
    let mut allocator = IdAllocator::new();
    let mut assembly = Assembly::default();
    for (parts, group) in &groups {
        let entry = build_entry(parts, group, bibles, options, &mut allocator, &mut assembly.warnings)?;
        debug!(entry = %entry.entry_id, pairs = entry.pairs.len(), "built entry");
        assembly.entries.push(entry);
    }
    Ok(assembly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_parser::VerseStore;
    use pretty_assertions::assert_eq;

    fn kjv() -> VerseStore {
        let mut store = VerseStore::new();
        store.insert(
            "PRO",
            21,
            11,
            "When the scorner is punished, the simple is made wise: and when the wise is instructed, he receiveth knowledge.",
        );
        store.insert(
            "PRO",
            21,
            12,
            "The righteous man wisely considereth the house of the wicked: but God overthroweth the wicked for their wickedness.",
        );
        store
    }

    fn bibles(extra: Option<VerseStore>) -> Translations {
        let mut stores = IndexMap::new();
        stores.insert("kjv".to_string(), kjv());
        if let Some(store) = extra {
            stores.insert("web".to_string(), store);
        }
        Translations::new("kjv", stores).unwrap()
    }

    fn row(line: u64, reference: &str, pv: &str) -> PairRow {
        PairRow {
            line,
            book: "Prov".into(),
            reference: reference.into(),
            pv: pv.into(),
            x_key: "Scoffer is punished".into(),
            x_root: "the scorner is punished".into(),
            y_key: "Simple becomes wise".into(),
            y_root: "the simple is made wise".into(),
            ..Default::default()
        }
    }

    #[test]
    fn proverbs_21_11_entry() {
        let assembly = build_entries(&[row(2, "21:11", "11")], &bibles(None), &AssemblyOptions::default())
            .unwrap();
        assert!(assembly.warnings.is_empty());
        let entry = &assembly.entries[0];
        assert_eq!(entry.entry_id, "pro-021-011-011");
        assert_eq!(entry.reference, "Prov 21:11");
        assert_eq!(entry.osis, "Prov.21.11");
        assert_eq!(entry.verses, vec![11]);
        assert!(entry.text["kjv"].starts_with("When the scorner"));
        let pair = &entry.pairs[0];
        assert!(pair
            .pair_id
            .starts_with("pro-021-011-011__x-scoffer-is-punished__y-simple-becomes-wise__"));
        assert_eq!(pair.status, Status::Active);
        assert_eq!(pair.x.keys, vec!["Scoffer is punished"]);
        assert_eq!(pair.x.root, "the scorner is punished");
    }

    #[test]
    fn missing_verse_in_default_translation_is_fatal() {
        let mut short = IndexMap::new();
        let mut store = VerseStore::new();
        store.insert("PRO", 21, 11, "When the scorner is punished");
        short.insert("kjv".to_string(), store);
        let bibles = Translations::new("kjv", short).unwrap();
        let err = build_entries(&[row(7, "21:11-12", "11")], &bibles, &AssemblyOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("missing verse 21:12 in PRO"), "{err}");
        assert!(matches!(err, PairsError::Row { line: 7, .. }));
    }

    #[test]
    fn pv_outside_span_and_bad_status_are_row_errors() {
        let options = AssemblyOptions::default();
        let err = build_entries(&[row(3, "21:11", "12")], &bibles(None), &options).unwrap_err();
        assert!(matches!(
            err,
            PairsError::Row {
                source: ValidationError::PvOutsideSpan { verse: 12, .. },
                ..
            }
        ));

        let mut odd = row(4, "21:11", "11");
        odd.status = Some("retired".into());
        assert!(build_entries(&[odd], &bibles(None), &options).is_err());
    }

    #[test]
    fn synonyms_do_not_change_pair_ids() {
        let mut with_synonyms = row(2, "21:11", "11");
        with_synonyms.x_keys = Some("mocker; scoffer is PUNISHED".into());
        let plain = build_entries(&[row(2, "21:11", "11")], &bibles(None), &AssemblyOptions::default())
            .unwrap();
        let indexed = build_entries(
            &[with_synonyms],
            &bibles(None),
            &AssemblyOptions {
                synonyms: SynonymsMode::Index,
            },
        )
        .unwrap();
        let a = &plain.entries[0].pairs[0];
        let b = &indexed.entries[0].pairs[0];
        assert_eq!(a.pair_id, b.pair_id);
        assert_eq!(b.x.keys, vec!["Scoffer is punished", "mocker"]);
    }

    #[test]
    fn groups_sort_and_ids_stay_unique() {
        let rows = vec![
            row(2, "21:12", "12"),
            row(3, "21:11", "11"),
            row(4, " 21:11 ", "11"),
        ];
        let assembly = build_entries(&rows, &bibles(None), &AssemblyOptions::default()).unwrap();
        assert_eq!(assembly.entries.len(), 2);
        let first = &assembly.entries[0];
        assert_eq!(first.entry_id, "pro-021-011-011");
        assert_eq!(first.pairs.len(), 2);
        assert_eq!(first.pairs[1].pair_id, format!("{}~1", first.pairs[0].pair_id));
        // roots are not in 21:12
        assert_eq!(assembly.warnings.len(), 2);
    }

    #[test]
    fn translations_missing_the_span_are_left_out() {
        let mut web = VerseStore::new();
        web.insert("PRO", 21, 11, "Web text");
        let assembly = build_entries(
            &[row(2, "21:11-12", "11")],
            &bibles(Some(web)),
            &AssemblyOptions::default(),
        )
        .unwrap();
        let text = &assembly.entries[0].text;
        assert_eq!(text.keys().collect::<Vec<_>>(), vec!["kjv"]);
        assert!(text["kjv"].contains("knowledge. The righteous"));
    }

    #[test]
    fn notes_come_from_the_first_row_that_has_them() {
        let mut second = row(3, "21:11", "11");
        second.notes = Some("see also 19:25".into());
        let assembly = build_entries(
            &[row(2, "21:11", "11"), second],
            &bibles(None),
            &AssemblyOptions::default(),
        )
        .unwrap();
        assert_eq!(assembly.entries[0].notes, "see also 19:25");
    }
}
