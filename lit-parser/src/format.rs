//! Verse-source format trait
//!
//! Every dialect parser implements [`VerseFormat`]: raw bytes of one source file in, a
//! [`ParsedCorpus`] out. Parsers are stateless values, so one registry can serve any number of
//! files.

use crate::error::ParseResult;
use crate::registry::Dialect;
use crate::store::ParsedCorpus;

/// Trait for verse-source dialects
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl VerseFormat for MyFormat {
///     fn dialect(&self) -> Dialect {
///         Dialect::Osis
///     }
///
///     fn parse(&self, bytes: &[u8]) -> ParseResult<ParsedCorpus> {
///         // Fill a VerseStore from bytes
///         todo!()
///     }
/// }
/// ```
pub trait VerseFormat: Send + Sync {
    /// The dialect this parser handles
    fn dialect(&self) -> Dialect;

    /// Registry name, the dialect's kebab-case id by default
    fn name(&self) -> &str {
        self.dialect().as_str()
    }

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// Extensions of source files this parser expects (`xml`, `zip`)
    fn file_extensions(&self) -> &[&str] {
        &["xml"]
    }

    /// Parse one source file
    ///
    /// A malformed file is an error; the caller decides whether that aborts the import or is
    /// logged and skipped.
    fn parse(&self, bytes: &[u8]) -> ParseResult<ParsedCorpus>;
}
