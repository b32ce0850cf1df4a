//! Error types for pairs assembly

use lit_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with a single row or entry span; always fatal for the build
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown book '{0}'")]
    UnknownBook(String),

    #[error("malformed reference '{0}' (expected ch:v or ch:v-w)")]
    BadRef(String),

    #[error("reference '{0}' ends before it starts")]
    RefEndBeforeStart(String),

    #[error("malformed PV '{0}'")]
    BadPv(String),

    #[error("PV {verse} outside entry span {start}-{end}")]
    PvOutsideSpan { verse: u32, start: u32, end: u32 },

    #[error("unknown book code: {0}")]
    MissingBook(String),

    #[error("missing chapter {chapter} in {book}")]
    MissingChapter { book: String, chapter: u32 },

    #[error("missing verse {chapter}:{verse} in {book}")]
    MissingVerse {
        book: String,
        chapter: u32,
        verse: u32,
    },

    #[error("unknown status '{0}' (expected active or deprecated)")]
    BadStatus(String),
}

#[derive(Debug, Error)]
pub enum PairsError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV row (or the entry it belongs to) failed validation
    #[error("row {line} ({book} {reference}): {source}")]
    Row {
        line: u64,
        book: String,
        reference: String,
        #[source]
        source: ValidationError,
    },

    #[error("no usable rows in {0}")]
    NoRows(PathBuf),

    #[error("no translations found under {0}")]
    NoTranslations(PathBuf),

    #[error("default translation '{default}' is not among the selected translations ({selected})")]
    DefaultNotSelected { default: String, selected: String },

    #[error("could not load translation '{id}': {source}")]
    TranslationLoad {
        id: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid translation metadata in {path}: {message}")]
    TransMeta { path: PathBuf, message: String },
}

pub type PairsResult<T> = Result<T, PairsError>;

impl PairsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PairsError::Io {
            path: path.into(),
            source,
        }
    }

    /// Selecting or loading translations went wrong
    pub fn is_translation_problem(&self) -> bool {
        matches!(
            self,
            PairsError::NoTranslations(_)
                | PairsError::DefaultNotSelected { .. }
                | PairsError::TranslationLoad { .. }
        )
    }
}
