//! Strong's lexicons
//!
//!     Lexicon XML comes in a few shapes. Three are parsed deterministically:
//!
//!     - `strongs-greek`: `<strongsdictionary><entries><entry strongs="...">`
//!     - `strongs-hebrew`: Open Scriptures `<lexicon><entry id="H1">`, namespaced
//!     - `dictionary`: Zefania-style `<entry|lex|item|record id="...">` with field children
//!
//!     and `generic` is the last resort: a permissive scan for anything that looks like an id
//!     with fields nearby (see [`heuristic`]).
//!
//!     `auto` picks per file. A file named like a Strong's source (`strongsgreek.xml`,
//!     `HebrewStrong.xml`) goes to the matching Strong's parser; anything else is read as a
//!     dictionary, and when that finds no entries the generic scan runs instead.
//!
//!     Every parser yields a [`Lexicon`] keyed by normalized code (`H7225`, `G0025`). Merging
//!     lexicons, within one file or across files, keeps the first non-empty value of each
//!     field.

pub mod greek;
pub mod hebrew;
pub mod heuristic;

use crate::error::{ParseError, ParseResult};
use crate::strongs::Language;
use crate::xml::XmlNode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

static HINTS_GREEK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(grk|greek|strongs.?gr(eek)?|g[0-9]{3,5})").unwrap());
static HINTS_HEBREW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(heb|hebr|strongs.?heb|h[0-9]{3,5})").unwrap());

static STRONGS_GREEK_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(strongs?.?gr(ee)?k|gr(ee)?k.?strongs?)").unwrap());
static STRONGS_HEBREW_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(strongs?.?heb(rew)?|heb(rew)?.?strongs?)").unwrap());

/// Strong's dialect suggested by a lexicon file name
pub fn infer_dialect(file_name: &str) -> Option<LexiconDialect> {
    if STRONGS_HEBREW_NAME.is_match(file_name) {
        Some(LexiconDialect::StrongsHebrew)
    } else if STRONGS_GREEK_NAME.is_match(file_name) {
        Some(LexiconDialect::StrongsGreek)
    } else {
        None
    }
}

/// Language suggested by a lexicon file name; a Hebrew hint wins over a Greek one
pub fn infer_language(file_name: &str) -> Option<Language> {
    if HINTS_HEBREW.is_match(file_name) {
        Some(Language::Hebrew)
    } else if HINTS_GREEK.is_match(file_name) {
        Some(Language::Greek)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LexiconDialect {
    StrongsGreek,
    StrongsHebrew,
    Dictionary,
    Generic,
    #[default]
    Auto,
}

impl LexiconDialect {
    pub const ALL: [LexiconDialect; 5] = [
        LexiconDialect::StrongsGreek,
        LexiconDialect::StrongsHebrew,
        LexiconDialect::Dictionary,
        LexiconDialect::Generic,
        LexiconDialect::Auto,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LexiconDialect::StrongsGreek => "strongs-greek",
            LexiconDialect::StrongsHebrew => "strongs-hebrew",
            LexiconDialect::Dictionary => "dictionary",
            LexiconDialect::Generic => "generic",
            LexiconDialect::Auto => "auto",
        }
    }
}

impl fmt::Display for LexiconDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LexiconDialect {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        LexiconDialect::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| ParseError::UnknownDialect(s.to_string()))
    }
}

/// One lexicon entry; empty fields are omitted from JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lemma: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub translit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub beta: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pron: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pos: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub derivation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gloss: String,
    #[serde(default, rename = "def", skip_serializing_if = "String::is_empty")]
    pub definition: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kjv_def: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

fn keep_first(existing: String, new: String) -> String {
    if existing.trim().is_empty() {
        new
    } else {
        existing
    }
}

impl LexiconEntry {
    pub fn new(id: impl Into<String>) -> Self {
        LexiconEntry {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Field-wise merge keeping the first non-empty value
    pub fn merge(existing: LexiconEntry, new: LexiconEntry) -> LexiconEntry {
        LexiconEntry {
            id: existing.id,
            lemma: keep_first(existing.lemma, new.lemma),
            translit: keep_first(existing.translit, new.translit),
            beta: keep_first(existing.beta, new.beta),
            pron: keep_first(existing.pron, new.pron),
            pos: keep_first(existing.pos, new.pos),
            derivation: keep_first(existing.derivation, new.derivation),
            gloss: keep_first(existing.gloss, new.gloss),
            definition: keep_first(existing.definition, new.definition),
            kjv_def: keep_first(existing.kjv_def, new.kjv_def),
            refs: if existing.refs.is_empty() {
                new.refs
            } else {
                existing.refs
            },
            source: keep_first(existing.source, new.source),
        }
    }
}

/// Entries keyed by normalized code, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lexicon {
    entries: BTreeMap<String, LexiconEntry>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, merging into any entry already stored under its id
    pub fn insert(&mut self, entry: LexiconEntry) {
        match self.entries.remove(&entry.id) {
            Some(existing) => {
                let merged = LexiconEntry::merge(existing, entry);
                self.entries.insert(merged.id.clone(), merged);
            }
            None => {
                self.entries.insert(entry.id.clone(), entry);
            }
        }
    }

    /// Fold a later source into this one; values already present win
    pub fn merge_from(&mut self, other: Lexicon) {
        for entry in other.entries.into_values() {
            self.insert(entry);
        }
    }

    pub fn get(&self, id: &str) -> Option<&LexiconEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.values()
    }

    pub fn count(&self, language: Language) -> usize {
        self.entries
            .keys()
            .filter(|id| Language::of_code(id) == Some(language))
            .count()
    }

    /// Stamp every entry with the file it came from
    pub fn set_source(&mut self, source: &str) {
        for entry in self.entries.values_mut() {
            entry.source = source.to_string();
        }
    }
}

/// Parse one lexicon document
pub fn parse_lexicon(
    bytes: &[u8],
    dialect: LexiconDialect,
    hint: Option<Language>,
) -> ParseResult<Lexicon> {
    let root = XmlNode::parse_bytes(bytes)?;
    match dialect {
        LexiconDialect::StrongsGreek => greek::parse(&root),
        LexiconDialect::StrongsHebrew => hebrew::parse(&root),
        LexiconDialect::Dictionary => Ok(heuristic::parse_dictionary(&root, hint)),
        LexiconDialect::Generic => Ok(heuristic::parse_generic(&root, hint)),
        LexiconDialect::Auto => {
            let lexicon = heuristic::parse_dictionary(&root, hint);
            if lexicon.is_empty() {
                debug!("no dictionary entries, scanning generically");
                Ok(heuristic::parse_generic(&root, hint))
            } else {
                Ok(lexicon)
            }
        }
    }
}

/// Parse a lexicon file. The language hint falls back to one inferred from the file name,
/// and `auto` resolves to a Strong's dialect when the name suggests one.
pub fn parse_lexicon_file(
    path: &Path,
    dialect: LexiconDialect,
    hint: Option<Language>,
) -> ParseResult<Lexicon> {
    let bytes = std::fs::read(path).map_err(|e| ParseError::io(path, e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let hint = hint.or_else(|| infer_language(&file_name));
    let dialect = match dialect {
        LexiconDialect::Auto => infer_dialect(&file_name).unwrap_or(LexiconDialect::Auto),
        chosen => chosen,
    };
    let mut lexicon = parse_lexicon(&bytes, dialect, hint).map_err(|e| e.in_file(path))?;
    lexicon.set_source(&file_name);
    info!(file = %file_name, %dialect, entries = lexicon.len(), "parsed lexicon");
    Ok(lexicon)
}

/// `meta.json` written next to `lexicon.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconMeta {
    pub count: usize,
    pub hebrew: usize,
    pub greek: usize,
    pub sources: Vec<String>,
}

/// Write `lexicon.json` and `meta.json` into `dir`
pub fn write_lexicon(
    dir: &Path,
    lexicon: &Lexicon,
    sources: &[String],
    force: bool,
) -> ParseResult<LexiconMeta> {
    let lexicon_path = dir.join("lexicon.json");
    if lexicon_path.exists() && !force {
        return Err(ParseError::OutputExists(lexicon_path));
    }
    std::fs::create_dir_all(dir).map_err(|e| ParseError::io(dir, e))?;
    let json = serde_json::to_string(lexicon)?;
    std::fs::write(&lexicon_path, json).map_err(|e| ParseError::io(&lexicon_path, e))?;

    let meta = LexiconMeta {
        count: lexicon.len(),
        hebrew: lexicon.count(Language::Hebrew),
        greek: lexicon.count(Language::Greek),
        sources: sources.to_vec(),
    };
    let meta_path = dir.join("meta.json");
    let json = serde_json::to_string_pretty(&meta)?;
    std::fs::write(&meta_path, json).map_err(|e| ParseError::io(&meta_path, e))?;
    info!(path = %lexicon_path.display(), entries = meta.count, "wrote lexicon");
    Ok(meta)
}

/// Trimmed text with inner whitespace collapsed
pub(crate) fn collapse(text: &str) -> String {
    crate::xml::collapse_whitespace(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn merge_keeps_first_non_empty_field() {
        let mut first = LexiconEntry::new("H7225");
        first.lemma = "רֵאשִׁית".into();
        let mut second = LexiconEntry::new("H7225");
        second.lemma = "other".into();
        second.gloss = "beginning".into();
        second.refs = vec!["H7218".into()];

        let merged = LexiconEntry::merge(first.clone(), second.clone());
        assert_eq!(merged.lemma, "רֵאשִׁית");
        assert_eq!(merged.gloss, "beginning");
        assert_eq!(merged.refs, vec!["H7218"]);

        let reversed = LexiconEntry::merge(second, first);
        assert_eq!(reversed.lemma, "other");
    }

    #[test]
    fn lexicon_merge_is_order_sensitive() {
        let mut a = Lexicon::new();
        let mut e = LexiconEntry::new("G0025");
        e.definition = "to love".into();
        a.insert(e);
        let mut b = Lexicon::new();
        let mut e = LexiconEntry::new("G0025");
        e.definition = "to cherish".into();
        e.translit = "agapao".into();
        b.insert(e);
        b.insert(LexiconEntry::new("H0001"));

        a.merge_from(b);
        let entry = a.get("G0025").unwrap();
        assert_eq!(entry.definition, "to love");
        assert_eq!(entry.translit, "agapao");
        assert_eq!(a.count(Language::Greek), 1);
        assert_eq!(a.count(Language::Hebrew), 1);
    }

    #[test]
    fn file_name_hints() {
        assert_eq!(infer_language("strongsgreek.xml"), Some(Language::Greek));
        assert_eq!(infer_language("HebrewStrong.xml"), Some(Language::Hebrew));
        assert_eq!(infer_language("grk-dict.xml"), Some(Language::Greek));
        assert_eq!(infer_language("dictionary.xml"), None);
    }

    #[test]
    fn entries_serialize_without_empty_fields() {
        let mut e = LexiconEntry::new("G0025");
        e.lemma = "ἀγαπάω".into();
        e.definition = "to love".into();
        assert_snapshot!(serde_json::to_string(&e).unwrap(), @r#"{"id":"G0025","lemma":"ἀγαπάω","def":"to love"}"#);
    }

    #[test]
    fn write_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut lexicon = Lexicon::new();
        lexicon.insert(LexiconEntry::new("H0001"));
        let meta = write_lexicon(dir.path(), &lexicon, &["a.xml".into()], false).unwrap();
        assert_eq!(meta.hebrew, 1);
        assert!(matches!(
            write_lexicon(dir.path(), &lexicon, &[], false),
            Err(ParseError::OutputExists(_))
        ));
        assert!(write_lexicon(dir.path(), &lexicon, &[], true).is_ok());
    }

    #[test]
    fn dialect_names() {
        assert_eq!(
            "strongs_greek".parse::<LexiconDialect>().unwrap(),
            LexiconDialect::StrongsGreek
        );
        assert!("sword".parse::<LexiconDialect>().is_err());
        assert_eq!(LexiconDialect::default(), LexiconDialect::Auto);
    }

    #[test]
    fn strongs_dialect_from_file_name() {
        assert_eq!(infer_dialect("strongsgreek.xml"), Some(LexiconDialect::StrongsGreek));
        assert_eq!(infer_dialect("HebrewStrong.xml"), Some(LexiconDialect::StrongsHebrew));
        assert_eq!(infer_dialect("strongs_hebrew.xml"), Some(LexiconDialect::StrongsHebrew));
        assert_eq!(infer_dialect("grk-dict.xml"), None);
        assert_eq!(infer_dialect("dictionary.xml"), None);
    }

    #[test]
    fn auto_prefers_dictionary_then_generic() {
        let dictionary = br#"<dictionary><item id="7225"><headword>RESHIT</headword>
            <definition>the first</definition></item></dictionary>"#;
        let generic = parse_lexicon(dictionary, LexiconDialect::Generic, Some(Language::Hebrew)).unwrap();
        assert_eq!(generic.get("H7225").unwrap().lemma, "");
        let auto = parse_lexicon(dictionary, LexiconDialect::Auto, Some(Language::Hebrew)).unwrap();
        let entry = auto.get("H7225").unwrap();
        assert_eq!(entry.lemma, "RESHIT");
        assert_eq!(entry.definition, "the first");

        let loose = br#"<root><word nStrong="G3056"><lemma>logos</lemma></word></root>"#;
        let auto = parse_lexicon(loose, LexiconDialect::Auto, None).unwrap();
        assert_eq!(auto.get("G3056").unwrap().lemma, "logos");
    }
}
