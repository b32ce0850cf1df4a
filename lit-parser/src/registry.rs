//! Dialect selection and the format registry
//!
//! Dialects are a closed set. Sources never get sniffed: the dialect comes from the
//! translation's manifest or plan, or from the command line, and is looked up here.

use crate::error::{ParseError, ParseResult};
use crate::format::VerseFormat;
use crate::formats::{OsisFormat, UsfmZipFormat, UsfxFormat, ZefaniaFormat};
use crate::store::ParsedCorpus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Verse-source dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// OSIS with milestone or wrapped `<verse>` elements
    Osis,
    /// USFX streaming markers, plain text
    Usfx,
    /// USFX with `<w s="...">` Strong's tags
    UsfxStrongs,
    /// Zefania `BIBLEBOOK/CHAPTER/VERS`
    Zefania,
    /// A zip of USFM books, plain text
    UsfmZip,
    /// A zip of USFM books with `\w word|strong="..."\w*` tags
    UsfmStrongsZip,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::Osis,
        Dialect::Usfx,
        Dialect::UsfxStrongs,
        Dialect::Zefania,
        Dialect::UsfmZip,
        Dialect::UsfmStrongsZip,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Osis => "osis",
            Dialect::Usfx => "usfx",
            Dialect::UsfxStrongs => "usfx-strongs",
            Dialect::Zefania => "zefania",
            Dialect::UsfmZip => "usfm-zip",
            Dialect::UsfmStrongsZip => "usfm-strongs-zip",
        }
    }

    /// Whether verses come out as Strong's-tagged token lists
    pub fn is_tagged(self) -> bool {
        matches!(self, Dialect::UsfxStrongs | Dialect::UsfmStrongsZip)
    }

    pub fn is_archive(self) -> bool {
        matches!(self, Dialect::UsfmZip | Dialect::UsfmStrongsZip)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Dialect::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| ParseError::UnknownDialect(s.to_string()))
    }
}

/// Registry of verse-source formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::with_defaults();
/// let corpus = registry.parse(Dialect::Zefania, &bytes)?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<Dialect, Box<dyn VerseFormat>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any previous parser for the same dialect
    pub fn register<F: VerseFormat + 'static>(&mut self, format: F) {
        self.formats.insert(format.dialect(), Box::new(format));
    }

    pub fn get(&self, dialect: Dialect) -> ParseResult<&dyn VerseFormat> {
        self.formats
            .get(&dialect)
            .map(|f| f.as_ref())
            .ok_or_else(|| ParseError::UnknownDialect(dialect.to_string()))
    }

    /// Look up by registry name (`"usfx-strongs"`)
    pub fn get_by_name(&self, name: &str) -> ParseResult<&dyn VerseFormat> {
        self.get(name.parse()?)
    }

    pub fn has(&self, dialect: Dialect) -> bool {
        self.formats.contains_key(&dialect)
    }

    /// List all registered format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.values().map(|f| f.name().to_string()).collect();
        names.sort();
        names
    }

    /// Parse source bytes with the given dialect
    pub fn parse(&self, dialect: Dialect, bytes: &[u8]) -> ParseResult<ParsedCorpus> {
        self.get(dialect)?.parse(bytes)
    }

    /// Create a registry with every built-in dialect
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(OsisFormat);
        registry.register(UsfxFormat::plain());
        registry.register(UsfxFormat::strongs());
        registry.register(ZefaniaFormat);
        registry.register(UsfmZipFormat::plain());
        registry.register(UsfmZipFormat::strongs());

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
