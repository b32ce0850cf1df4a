//! Canonical verse data for the lit toolchain
//!
//!     This crate turns scripture sources shipped in a handful of legacy dialects (OSIS, USFX,
//!     Zefania, USFM in zip archives, Strong's lexicon XML) into one canonical, verse-addressed
//!     model, and writes that model out as per-book JSON for the site.
//!
//! Architecture
//!
//!     - VerseFormat trait: uniform interface for every verse-source dialect
//!     - FormatRegistry / Dialect: explicit, closed selection of a dialect parser
//!     - VerseStore: book → chapter → verse → payload, the shape every parser produces
//!     - VerseCursor: the book/chapter/verse state machine shared by the streaming parsers
//!
//!     Like the rest of the toolchain this is a pure lib: nothing here prints or reads the
//!     environment. Diagnostics go through `tracing`, failures through [`ParseError`].
//!
//!     The file structure :
//!     .
//!     ├── books.rs                # Book reference table (codes, OSIS names, ranks)
//!     ├── strongs.rs              # Strong's code normalization
//!     ├── store.rs                # Canonical verse store and parse counters
//!     ├── cursor.rs               # Streaming book/chapter/verse state machine
//!     ├── xml.rs                  # quick-xml event stream and small element tree
//!     ├── format.rs               # VerseFormat trait
//!     ├── registry.rs             # Dialect enum and FormatRegistry
//!     ├── formats
//!     │   ├── osis.rs             # milestone + wrapped OSIS verses
//!     │   ├── usfx.rs             # USFX markers, plain and Strong's-tagged
//!     │   ├── zefania.rs          # BIBLEBOOK/CHAPTER/VERS
//!     │   └── usfm.rs             # USFM books inside a zip archive
//!     ├── lexicon                 # Strong's dictionaries (Greek, Hebrew, heuristic)
//!     ├── canonical.rs            # per-book JSON writer/reader + manifest
//!     ├── chapters.rs             # chapters.jsonl stream, books.json, splitter
//!     ├── import.rs               # plan/manifest driven translation import
//!     └── catalog.rs              # translation catalog with verse counts
//!
//! Lossy behavior
//!
//!     Two simplifications match the data the site already serves: verses with empty text are
//!     never stored, and ranged OSIS ids (`Gen.1.1-Gen.1.2`) are filed under their first verse
//!     only. The latter is counted in [`ParseCounters::collapsed_ranges`] and logged.
//!
//! Testing
//!
//!     tests
//!     ├── <area>.rs
//!     └── fixtures
//!         └── <sample>.<dialect>.xml
//!
//!     Unit tests live next to each parser; the integration tests run whole files from the
//!     fixtures directory through the public API.

pub mod books;
pub mod canonical;
pub mod catalog;
pub mod chapters;
pub mod cursor;
pub mod error;
pub mod format;
pub mod formats;
pub mod import;
pub mod lexicon;
pub mod registry;
pub mod store;
pub mod strongs;
pub mod xml;

pub use error::{ParseError, ParseResult};
pub use format::VerseFormat;
pub use registry::{Dialect, FormatRegistry};
pub use store::{ParseCounters, ParsedCorpus, TaggedVerse, Token, VersePayload, VerseStore};
