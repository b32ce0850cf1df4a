//! The bundle document the site loads, and its writers
//!
//!     {
//!       "schemaVersion": 1,
//!       "bundleVersion": "2025.01.31.120000",
//!       "builtAt": "2025-01-31T12:00:00Z",
//!       "defaultTrans": "kjv",
//!       "transMeta": {"kjv": {"id": "kjv"}},
//!       "stats": {"entryCount": 1, "pairCount": 1, "pairCountActive": 1},
//!       "entries": [...],
//!       "index": {"x": {...}, "y": {...}}
//!     }

use crate::assemble::{Entry, Status};
use crate::bibles::TransMeta;
use crate::error::{PairsError, PairsResult};
use crate::index::PairIndex;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub entry_count: usize,
    pub pair_count: usize,
    pub pair_count_active: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub schema_version: u32,
    pub bundle_version: String,
    pub built_at: String,
    pub default_trans: String,
    pub trans_meta: TransMeta,
    pub stats: Stats,
    pub entries: Vec<Entry>,
    pub index: PairIndex,
}

pub fn compute_stats(entries: &[Entry]) -> Stats {
    let pairs = entries.iter().flat_map(|e| &e.pairs);
    Stats {
        entry_count: entries.len(),
        pair_count: pairs.clone().count(),
        pair_count_active: pairs.filter(|p| p.status == Status::Active).count(),
    }
}

/// UTC `%Y.%m.%d.%H%M%S`
pub fn auto_bundle_version() -> String {
    Utc::now().format("%Y.%m.%d.%H%M%S").to_string()
}

/// UTC `%Y-%m-%dT%H:%M:%SZ`
pub fn iso_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub struct BundleParts {
    pub schema_version: u32,
    pub bundle_version: String,
    pub built_at: Option<String>,
    pub default_trans: String,
    pub trans_meta: TransMeta,
    pub entries: Vec<Entry>,
    pub index: PairIndex,
}

pub fn make_bundle(parts: BundleParts) -> Bundle {
    Bundle {
        schema_version: parts.schema_version,
        bundle_version: parts.bundle_version,
        built_at: parts.built_at.unwrap_or_else(iso_now),
        default_trans: parts.default_trans,
        trans_meta: parts.trans_meta,
        stats: compute_stats(&parts.entries),
        entries: parts.entries,
        index: parts.index,
    }
}

fn ensure_parent(path: &Path) -> PairsResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| PairsError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Compact by default, two-space indented when `pretty`
pub fn write_json(bundle: &Bundle, path: &Path, pretty: bool) -> PairsResult<()> {
    ensure_parent(path)?;
    let json = if pretty {
        serde_json::to_string_pretty(bundle)?
    } else {
        serde_json::to_string(bundle)?
    };
    fs::write(path, json).map_err(|e| PairsError::io(path, e))?;
    info!(path = %path.display(), entries = bundle.stats.entry_count, "wrote bundle");
    Ok(())
}

/// Gzip `json_path` (level 6) into a `.gz` sibling
pub fn write_gzip(json_path: &Path) -> PairsResult<PathBuf> {
    let mut name = json_path.as_os_str().to_owned();
    name.push(".gz");
    let gz_path = PathBuf::from(name);

    let data = fs::read(json_path).map_err(|e| PairsError::io(json_path, e))?;
    let file = fs::File::create(&gz_path).map_err(|e| PairsError::io(&gz_path, e))?;
    let mut encoder = GzEncoder::new(file, Compression::new(6));
    encoder
        .write_all(&data)
        .map_err(|e| PairsError::io(&gz_path, e))?;
    encoder.finish().map_err(|e| PairsError::io(&gz_path, e))?;
    Ok(gz_path)
}

/// Copy `path` into `dir` under the same file name
pub fn publish_copy(path: &Path, dir: &Path) -> PairsResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| PairsError::io(dir, e))?;
    let name = path.file_name().ok_or_else(|| {
        PairsError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let target = dir.join(name);
    fs::copy(path, &target).map_err(|e| PairsError::io(&target, e))?;
    info!(from = %path.display(), to = %target.display(), "published");
    Ok(target)
}

pub fn read_bundle(path: &Path) -> PairsResult<Bundle> {
    let text = fs::read_to_string(path).map_err(|e| PairsError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

/// First pair of the first entry, for eyeballing a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePair {
    pub reference: String,
    pub x_key: String,
    pub y_key: String,
    pub x_roots: Vec<String>,
    pub y_roots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSummary {
    pub stats: Stats,
    pub default_trans: String,
    /// First few X keys with the number of pairs each points to
    pub x_keys: Vec<(String, usize)>,
    pub sample: Option<SamplePair>,
}

impl BundleSummary {
    pub fn of(bundle: &Bundle, keys: usize) -> Self {
        let sample = bundle.entries.first().and_then(|entry| {
            entry.pairs.first().map(|pair| SamplePair {
                reference: entry.reference.clone(),
                x_key: pair.x.key.clone(),
                y_key: pair.y.key.clone(),
                x_roots: pair.x.roots.clone(),
                y_roots: pair.y.roots.clone(),
            })
        });
        BundleSummary {
            stats: bundle.stats,
            default_trans: bundle.default_trans.clone(),
            x_keys: bundle
                .index
                .x
                .iter()
                .take(keys)
                .map(|(k, ids)| (k.clone(), ids.len()))
                .collect(),
            sample,
        }
    }
}

impl fmt::Display for BundleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Stats: entries={} pairs={} active={}",
            self.stats.entry_count, self.stats.pair_count, self.stats.pair_count_active
        )?;
        writeln!(f, "Default trans: {}", self.default_trans)?;
        for (i, (key, count)) in self.x_keys.iter().enumerate() {
            writeln!(f, "X[{}]: {key} -> {count} pairs", i + 1)?;
        }
        if let Some(s) = &self.sample {
            writeln!(f)?;
            writeln!(f, "Sample: {} | {} -> {}", s.reference, s.x_key, s.y_key)?;
            writeln!(f, "X roots: {:?}", s.x_roots)?;
            writeln!(f, "Y roots: {:?}", s.y_roots)?;
        }
        Ok(())
    }
}
