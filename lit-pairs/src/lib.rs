//! Verse pairs bundle
//!
//!     Authors describe verse-to-concept cross references in a CSV, one row per pair:
//!
//!         Book,Ref,PV,X.key,X.root,Y.key,Y.root,Status
//!         Prov,21:11,11,Scoffer is punished,the scorner is punished,Simple becomes wise,...
//!
//!     This crate validates those rows against imported translations, groups them into entries
//!     (one per verse span), derives stable content-based ids, builds a reverse index from
//!     normalized concept keys to pair ids, and writes the bundle the site loads.
//!
//! Architecture
//!
//!     rows ──▶ normalize/validate ──▶ assemble (entries + pairs) ──▶ index ──▶ bundle
//!                    ▲                        ▲
//!                    └──── bibles (one VerseStore per translation, one default)
//!
//!     Options are explicit ([`AssemblyOptions`], [`IndexOptions`]); nothing reads globals.
//!     [`pipeline::build_bundle`] runs the whole chain from a [`BuildSpec`].
//!
//!     The file structure :
//!     .
//!     ├── error.rs            # PairsError, ValidationError
//!     ├── options.rs          # synonym mode, assembly and index options
//!     ├── normalize.rs        # book names, refs, PV lists, key folding
//!     ├── ids.rs              # entry ids, ref strings, pair ids, collision suffixes
//!     ├── rows.rs             # authoring CSV reader
//!     ├── bibles.rs           # translation discovery and loading
//!     ├── validate.rs         # hard span checks, soft root checks
//!     ├── assemble.rs         # entries and pairs
//!     ├── index.rs            # reverse index
//!     ├── bundle.rs           # bundle document, JSON/gzip writers, summary
//!     └── pipeline.rs         # end-to-end build
//!
//! Testing
//!
//!     tests
//!     ├── pipeline.rs         # CSV + translation fixtures through build_bundle
//!     ├── properties.rs       # proptest properties of refs, PV lists and ids
//!     └── fixtures
//!         ├── pairs.csv
//!         └── bible/<trans>/<CODE>.json

pub mod assemble;
pub mod bibles;
pub mod bundle;
pub mod error;
pub mod ids;
pub mod index;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod rows;
pub mod validate;

pub use assemble::{build_entries, Assembly, Entry, Pair, Side, Status};
pub use bibles::Translations;
pub use bundle::{Bundle, BundleSummary, Stats};
pub use error::{PairsError, PairsResult, ValidationError};
pub use index::{build_index, PairIndex};
pub use options::{AssemblyOptions, IndexOptions, SynonymsMode};
pub use pipeline::{build_bundle, BuildReport, BuildSpec};
pub use rows::PairRow;
