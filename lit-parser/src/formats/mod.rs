//! Verse-source dialect implementations
//!
//! Each parser resolves book ids through [`crate::books`] and produces a
//! [`crate::store::ParsedCorpus`]. The marker-driven ones share [`crate::cursor::VerseCursor`].

pub mod osis;
pub mod usfm;
pub mod usfx;
pub mod zefania;

pub use osis::OsisFormat;
pub use usfm::UsfmZipFormat;
pub use usfx::UsfxFormat;
pub use zefania::ZefaniaFormat;

/// Parse a positive integer attribute or marker argument
pub(crate) fn parse_number(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}
