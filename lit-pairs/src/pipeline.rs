//! End-to-end bundle build

use crate::assemble::build_entries;
use crate::bibles::{discover_trans_ids, load_bibles, load_trans_meta, Translations};
use crate::bundle::{self, auto_bundle_version, make_bundle, BundleParts, Stats};
use crate::error::{PairsError, PairsResult};
use crate::index::build_index;
use crate::options::{AssemblyOptions, IndexOptions, SynonymsMode};
use crate::rows::load_csv;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a build needs; start from [`BuildSpec::new`] and adjust with the setters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub pairs_csv: PathBuf,
    pub bible_root: PathBuf,
    pub out: PathBuf,
    pub default_trans: String,
    /// Explicit selection; `None` discovers every translation under `bible_root`
    pub trans_ids: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub bundle_version: Option<String>,
    pub built_at: Option<String>,
    pub schema_version: u32,
    pub gzip: bool,
    pub publish_dir: Option<PathBuf>,
    pub pretty: bool,
    pub trans_meta: Option<PathBuf>,
    pub synonyms: SynonymsMode,
    pub include_deprecated: bool,
}

impl BuildSpec {
    pub fn new(
        pairs_csv: impl Into<PathBuf>,
        bible_root: impl Into<PathBuf>,
        out: impl Into<PathBuf>,
    ) -> Self {
        BuildSpec {
            pairs_csv: pairs_csv.into(),
            bible_root: bible_root.into(),
            out: out.into(),
            default_trans: "kjv".to_string(),
            trans_ids: None,
            exclude: Vec::new(),
            bundle_version: None,
            built_at: None,
            schema_version: 1,
            gzip: false,
            publish_dir: None,
            pretty: false,
            trans_meta: None,
            synonyms: SynonymsMode::Ignore,
            include_deprecated: false,
        }
    }

    pub fn default_trans(mut self, id: impl Into<String>) -> Self {
        self.default_trans = id.into();
        self
    }

    pub fn trans_ids(mut self, ids: Vec<String>) -> Self {
        self.trans_ids = (!ids.is_empty()).then_some(ids);
        self
    }

    pub fn exclude(mut self, ids: Vec<String>) -> Self {
        self.exclude = ids;
        self
    }

    pub fn bundle_version(mut self, version: Option<String>) -> Self {
        self.bundle_version = version;
        self
    }

    pub fn built_at(mut self, built_at: Option<String>) -> Self {
        self.built_at = built_at;
        self
    }

    pub fn schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    pub fn gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    pub fn publish_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.publish_dir = dir;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn trans_meta(mut self, path: Option<PathBuf>) -> Self {
        self.trans_meta = path;
        self
    }

    pub fn synonyms(mut self, mode: SynonymsMode) -> Self {
        self.synonyms = mode;
        self
    }

    pub fn include_deprecated(mut self, include: bool) -> Self {
        self.include_deprecated = include;
        self
    }

    fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            synonyms: self.synonyms,
        }
    }

    fn index_options(&self) -> IndexOptions {
        IndexOptions {
            synonyms: self.synonyms,
            include_deprecated: self.include_deprecated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub out: PathBuf,
    pub gzip: Option<PathBuf>,
    pub published: Vec<PathBuf>,
    pub bundle_version: String,
    pub trans_ids: Vec<String>,
    pub rows: usize,
    pub skipped_rows: usize,
    pub stats: Stats,
    pub warnings: Vec<String>,
}

/// Explicit ids minus excludes, or every discovered translation minus excludes
fn select_translations(spec: &BuildSpec) -> PairsResult<Vec<String>> {
    let selected = match &spec.trans_ids {
        Some(ids) => ids
            .iter()
            .filter(|id| !spec.exclude.contains(id))
            .cloned()
            .collect(),
        None => discover_trans_ids(&spec.bible_root, &spec.exclude)?,
    };
    if selected.is_empty() {
        return Err(PairsError::NoTranslations(spec.bible_root.clone()));
    }
    if !selected.contains(&spec.default_trans) {
        return Err(PairsError::DefaultNotSelected {
            default: spec.default_trans.clone(),
            selected: selected.join(", "),
        });
    }
    Ok(selected)
}

fn publish(path: &Path, dir: &Path, published: &mut Vec<PathBuf>) -> PairsResult<()> {
    published.push(bundle::publish_copy(path, dir)?);
    Ok(())
}

pub fn build_bundle(spec: &BuildSpec) -> PairsResult<BuildReport> {
    let read = load_csv(&spec.pairs_csv)?;
    if read.rows.is_empty() {
        return Err(PairsError::NoRows(spec.pairs_csv.clone()));
    }
    info!(rows = read.rows.len(), skipped = read.skipped, "read authoring rows");

    let trans_ids = select_translations(spec)?;
    let stores = load_bibles(&spec.bible_root, &trans_ids)?;
    let bibles = Translations::new(spec.default_trans.clone(), stores)?;

    let assembly = build_entries(&read.rows, &bibles, &spec.assembly_options())?;
    let index = build_index(&assembly.entries, &spec.index_options());
    let trans_meta = load_trans_meta(spec.trans_meta.as_deref(), &trans_ids, &spec.default_trans)?;

    let bundle_version = spec.bundle_version.clone().unwrap_or_else(auto_bundle_version);
    let bundle = make_bundle(BundleParts {
        schema_version: spec.schema_version,
        bundle_version: bundle_version.clone(),
        built_at: spec.built_at.clone(),
        default_trans: spec.default_trans.clone(),
        trans_meta,
        entries: assembly.entries,
        index,
    });
    bundle::write_json(&bundle, &spec.out, spec.pretty)?;
    let gzip = if spec.gzip {
        Some(bundle::write_gzip(&spec.out)?)
    } else {
        None
    };

    let mut published = Vec::new();
    if let Some(dir) = &spec.publish_dir {
        publish(&spec.out, dir, &mut published)?;
        if let Some(gz) = &gzip {
            publish(gz, dir, &mut published)?;
        }
    }

    info!(
        version = %bundle_version,
        entries = bundle.stats.entry_count,
        pairs = bundle.stats.pair_count,
        warnings = assembly.warnings.len(),
        "bundle built"
    );
    Ok(BuildReport {
        out: spec.out.clone(),
        gzip,
        published,
        bundle_version,
        trans_ids,
        rows: read.rows.len(),
        skipped_rows: read.skipped,
        stats: bundle.stats,
        warnings: assembly.warnings,
    })
}
