//! Configuration for the `lit` commands.
//!
//! Three layers, lowest first: `defaults/lit.default.toml` compiled into the binary, an
//! optional `lit.toml` (or the `--config` file), then command-line [`Overrides`]. The merged
//! result deserializes into [`LitConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use lit_pairs::{AssemblyOptions, IndexOptions, SynonymsMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/lit.default.toml");

/// File picked up from the working directory when no `--config` is given.
pub const USER_CONFIG_FILE: &str = "lit.toml";

/// Top-level configuration consumed by the `lit` commands.
#[derive(Debug, Clone, Deserialize)]
pub struct LitConfig {
    pub pairs: PairsConfig,
    pub import: ImportConfig,
    pub lexicon: LexiconConfig,
    pub catalog: CatalogConfig,
}

/// Bundle build settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PairsConfig {
    pub csv: PathBuf,
    pub bible_root: PathBuf,
    pub out: PathBuf,
    pub default_trans: String,
    pub trans_ids: Vec<String>,
    pub exclude_trans: Vec<String>,
    pub synonyms_mode: SynonymsMode,
    pub include_deprecated: bool,
    pub schema_version: u32,
    pub gzip: bool,
    pub pretty: bool,
    #[serde(default)]
    pub publish_dir: Option<PathBuf>,
    #[serde(default)]
    pub trans_meta: Option<PathBuf>,
}

impl PairsConfig {
    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            synonyms: self.synonyms_mode,
        }
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            synonyms: self.synonyms_mode,
            include_deprecated: self.include_deprecated,
        }
    }
}

/// Where plan-driven imports read raw sources and write canonical trees.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub raw_root: PathBuf,
    pub out_root: PathBuf,
    pub plan: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LexiconConfig {
    pub raw_root: PathBuf,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
}

/// Command-line settings keyed by their dotted config path (`pairs.gzip`).
///
/// They are applied after every file layer, so a flag always beats `lit.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: Vec<(String, ValueKind)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<ValueKind>) {
        self.entries.push((key.to_string(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stacks config sources: embedded defaults first, then files, then overrides.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Only the embedded `lit.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Stack a TOML file that has to exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), true)
    }

    /// Stack a TOML file if it is there.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), false)
    }

    fn with_toml(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Pin one dotted key, above all file layers.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Pin every key of `overrides`, in insertion order.
    pub fn with_overrides(self, overrides: &Overrides) -> Result<Self, ConfigError> {
        overrides
            .entries
            .iter()
            .try_fold(self, |loader, (key, value)| loader.set_override(key, value.clone()))
    }

    /// Merge the layers and deserialize them into a [`LitConfig`].
    pub fn build(self) -> Result<LitConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<LitConfig, ConfigError> {
    Loader::new().build()
}

/// Defaults, then `path` when given (required), else `lit.toml` in the working directory if present.
pub fn load(path: Option<&Path>) -> Result<LitConfig, ConfigError> {
    load_with(path, &Overrides::new())
}

/// Like [`load`], with command-line `overrides` on top.
pub fn load_with(path: Option<&Path>, overrides: &Overrides) -> Result<LitConfig, ConfigError> {
    let loader = Loader::new();
    match path {
        Some(path) => loader.with_file(path),
        None => loader.with_optional_file(USER_CONFIG_FILE),
    }
    .with_overrides(overrides)?
    .build()
}
