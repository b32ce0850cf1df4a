//! Error types for parsing and writing canonical data

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading sources or writing canonical artifacts
#[derive(Debug, Error)]
pub enum ParseError {
    /// The XML reader rejected the document
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Structurally broken XML the reader lets through (unclosed elements, no root)
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// Source bytes are not UTF-8
    #[error("source is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("unreadable zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A failure while processing one particular file
    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<ParseError>,
    },

    /// Input is well-formed but does not have the expected shape
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    /// A manifest or plan is missing required fields
    #[error("invalid manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// No source file to import was found
    #[error("missing source: {0}")]
    MissingSource(String),

    /// A destructive write was attempted without the overwrite flag
    #[error("output already exists at {0} (use --force to overwrite)")]
    OutputExists(PathBuf),

    #[error("unknown dialect '{0}'")]
    UnknownDialect(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParseError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the file being processed to an error
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ ParseError::File { .. } => already,
            other => ParseError::File {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::Xml(err.into())
    }
}
