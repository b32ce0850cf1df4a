//! Reverse index: folded concept key → pair ids, one map per side

use crate::assemble::{Entry, Side, Status};
use crate::normalize::norm_key;
use crate::options::{IndexOptions, SynonymsMode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type KeyIndex = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairIndex {
    pub x: KeyIndex,
    pub y: KeyIndex,
}

fn side_keys(side: &Side, synonyms: SynonymsMode) -> &[String] {
    match synonyms {
        SynonymsMode::Index => &side.keys,
        SynonymsMode::Ignore => std::slice::from_ref(&side.key),
    }
}

fn add(index: &mut KeyIndex, key: &str, pair_id: &str) {
    let folded = norm_key(key);
    if folded.is_empty() {
        return;
    }
    let ids = index.entry(folded).or_default();
    if !ids.iter().any(|id| id == pair_id) {
        ids.push(pair_id.to_string());
    }
}

/// Keys and ids keep the order they are first met in
pub fn build_index(entries: &[Entry], options: &IndexOptions) -> PairIndex {
    let mut index = PairIndex::default();
    let pairs = entries
        .iter()
        .flat_map(|e| &e.pairs)
        .filter(|p| options.include_deprecated || p.status != Status::Deprecated);
    for pair in pairs {
        for key in side_keys(&pair.x, options.synonyms) {
            add(&mut index.x, key, &pair.pair_id);
        }
        for key in side_keys(&pair.y, options.synonyms) {
            add(&mut index.y, key, &pair.pair_id);
        }
    }
    index
}
