//! Imported translations as the pairs build sees them
//!
//!     <bible_root>/
//!     ├── kjv/  GEN.json PRO.json ...   (per-book files written by lit-parser)
//!     └── web/  ...
//!
//! A translation id is a directory name holding at least one `[A-Z0-9]{3}.json` file.

use crate::error::{PairsError, PairsResult};
use indexmap::IndexMap;
use lit_parser::canonical::{is_book_file_name, read_book_dir};
use lit_parser::VerseStore;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::info;

/// Minimal per-translation metadata embedded in the bundle
pub type TransMeta = IndexMap<String, Value>;

/// Loaded translations in selection order, one of them the default
#[derive(Debug, Clone)]
pub struct Translations {
    default_id: String,
    stores: IndexMap<String, VerseStore>,
}

impl Translations {
    /// Fails when `default_id` is not among `stores`
    pub fn new(default_id: impl Into<String>, stores: IndexMap<String, VerseStore>) -> PairsResult<Self> {
        let default_id = default_id.into();
        if !stores.contains_key(&default_id) {
            return Err(PairsError::DefaultNotSelected {
                selected: stores.keys().cloned().collect::<Vec<_>>().join(", "),
                default: default_id,
            });
        }
        Ok(Translations { default_id, stores })
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    pub fn default_store(&self) -> &VerseStore {
        // checked in new()
        &self.stores[self.default_id.as_str()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VerseStore)> {
        self.stores.iter().map(|(id, store)| (id.as_str(), store))
    }

    pub fn ids(&self) -> Vec<String> {
        self.stores.keys().cloned().collect()
    }
}

/// Translation directories under `root`, sorted, minus `exclude`
pub fn discover_trans_ids(root: &Path, exclude: &[String]) -> PairsResult<Vec<String>> {
    let listing = fs::read_dir(root).map_err(|e| PairsError::io(root, e))?;
    let mut ids = Vec::new();
    for item in listing {
        let item = item.map_err(|e| PairsError::io(root, e))?;
        let name = item.file_name().to_string_lossy().into_owned();
        let path = item.path();
        if !path.is_dir() || exclude.contains(&name) {
            continue;
        }
        let files = fs::read_dir(&path).map_err(|e| PairsError::io(&path, e))?;
        let has_book = files
            .filter_map(Result::ok)
            .any(|f| is_book_file_name(&f.file_name().to_string_lossy()));
        if has_book {
            ids.push(name);
        }
    }
    ids.sort();
    Ok(ids)
}

pub fn load_bible(root: &Path, id: &str) -> PairsResult<VerseStore> {
    let dir = root.join(id);
    let load_error = |source| PairsError::TranslationLoad {
        id: id.to_string(),
        source,
    };
    if !dir.is_dir() {
        return Err(load_error(lit_parser::ParseError::MissingSource(format!(
            "translation dir not found: {}",
            dir.display()
        ))));
    }
    let store = read_book_dir(&dir).map_err(load_error)?;
    info!(id, books = store.book_count(), verses = store.verse_count(), "loaded translation");
    Ok(store)
}

pub fn load_bibles(root: &Path, ids: &[String]) -> PairsResult<IndexMap<String, VerseStore>> {
    ids.iter()
        .map(|id| Ok((id.clone(), load_bible(root, id)?)))
        .collect()
}

fn record_for(value: &Value, id: &str) -> Option<Map<String, Value>> {
    let found = match value {
        Value::Array(items) => items
            .iter()
            .find(|item| item.get("id").and_then(Value::as_str) == Some(id)),
        Value::Object(map) => map.get(id),
        _ => None,
    };
    found.and_then(Value::as_object).cloned()
}

/// `{id: {"id": id}}` for every translation; a metadata file (a list of records or a map keyed
/// by id) supplies the full record of the default translation
pub fn load_trans_meta(path: Option<&Path>, ids: &[String], default_id: &str) -> PairsResult<TransMeta> {
    let mut meta: TransMeta = ids
        .iter()
        .map(|id| {
            let mut record = Map::new();
            record.insert("id".into(), Value::String(id.clone()));
            (id.clone(), Value::Object(record))
        })
        .collect();
    let Some(path) = path else {
        return Ok(meta);
    };

    let text = fs::read_to_string(path).map_err(|e| PairsError::io(path, e))?;
    let value: Value = serde_json::from_str(&text)?;
    if !matches!(value, Value::Array(_) | Value::Object(_)) {
        return Err(PairsError::TransMeta {
            path: path.to_path_buf(),
            message: "expected a list of records or a map keyed by id".into(),
        });
    }
    if let Some(mut record) = record_for(&value, default_id) {
        record
            .entry("id")
            .or_insert_with(|| Value::String(default_id.to_string()));
        meta.insert(default_id.to_string(), Value::Object(record));
    }
    Ok(meta)
}
