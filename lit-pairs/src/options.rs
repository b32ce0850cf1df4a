//! Knobs threaded through assembly and indexing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether `X.keys`/`Y.keys` synonyms take part in the bundle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynonymsMode {
    /// `keys` is always `[key]` and only primary keys are indexed
    #[default]
    Ignore,
    /// Synonyms are kept in `keys` and indexed alongside the primary key
    Index,
}

impl SynonymsMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SynonymsMode::Ignore => "ignore",
            SynonymsMode::Index => "index",
        }
    }
}

impl fmt::Display for SynonymsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynonymsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(SynonymsMode::Ignore),
            "index" => Ok(SynonymsMode::Index),
            other => Err(format!(
                "unknown synonyms mode '{other}' (expected ignore or index)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyOptions {
    pub synonyms: SynonymsMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOptions {
    pub synonyms: SynonymsMode,
    pub include_deprecated: bool,
}
