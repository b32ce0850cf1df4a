//! Translation import
//!
//!     A raw translation directory carries a `manifest.json` (at least `code` and `language`)
//!     and its sources: a `*usfm.zip` archive for the USFM dialects, `*.xml` files otherwise.
//!     Importing parses every source with the translation's dialect and writes:
//!
//!         <out>/
//!         ├── GEN.json ...        per-book files
//!         ├── manifest.json       book list and parse counters
//!         ├── books.json          canonical order and display names
//!         ├── chapters.jsonl      one chapter per line
//!         └── meta.json           code, language, source and counts
//!
//!     Which translations to import comes from `bible_plan.json`, narrowed with a [`PlanFilter`].

use crate::canonical::{self, Manifest};
use crate::chapters::{self, StreamCounts, BOOKS_FILE, CHAPTERS_FILE};
use crate::error::{ParseError, ParseResult};
use crate::registry::{Dialect, FormatRegistry};
use crate::store::ParsedCorpus;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const PLAN_FILE: &str = "bible_plan.json";
pub const RAW_MANIFEST_FILE: &str = "manifest.json";
pub const META_FILE: &str = "meta.json";

/// One translation listed in `bible_plan.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTranslation {
    pub code: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Dialect>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiblePlan {
    #[serde(default)]
    pub translations: Vec<PlanTranslation>,
}

impl BiblePlan {
    pub fn read(path: &Path) -> ParseResult<BiblePlan> {
        if !path.is_file() {
            return Err(ParseError::MissingSource(format!(
                "{PLAN_FILE} not found at {}",
                path.display()
            )));
        }
        let text = fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| ParseError::from(e).in_file(path))
    }

    pub fn select(&self, filter: &PlanFilter) -> Vec<&PlanTranslation> {
        self.translations.iter().filter(|t| filter.matches(t)).collect()
    }
}

/// Narrows a plan; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanFilter {
    pub language: Option<String>,
    pub codes: Vec<String>,
    pub group: Option<String>,
    pub tier: Option<String>,
}

impl PlanFilter {
    pub fn matches(&self, t: &PlanTranslation) -> bool {
        fn same(want: &Option<String>, have: &Option<String>) -> bool {
            want.is_none() || want == have
        }
        self.language.as_ref().map_or(true, |l| *l == t.language)
            && (self.codes.is_empty() || self.codes.iter().any(|c| *c == t.code))
            && same(&self.group, &t.group)
            && same(&self.tier, &t.tier)
    }
}

/// `manifest.json` of a raw translation directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawManifest {
    pub code: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Dialect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RawManifest {
    pub fn read(raw_dir: &Path) -> ParseResult<RawManifest> {
        let path = raw_dir.join(RAW_MANIFEST_FILE);
        if !path.is_file() {
            return Err(ParseError::MissingSource(format!(
                "{RAW_MANIFEST_FILE} not found in {}",
                raw_dir.display()
            )));
        }
        let text = fs::read_to_string(&path).map_err(|e| ParseError::io(&path, e))?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ParseError::from(e).in_file(&path))?;
        let present = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .is_some_and(|s| !s.trim().is_empty())
        };
        if !present("code") || !present("language") {
            return Err(ParseError::Manifest {
                path,
                message: "must define 'code' and 'language'".into(),
            });
        }
        serde_json::from_value(value).map_err(|e| ParseError::Manifest {
            path,
            message: e.to_string(),
        })
    }

    /// Declared dialect, else USFM-in-zip (Strong's-tagged for `*_strongs` codes)
    pub fn dialect(&self) -> Dialect {
        match self.format {
            Some(dialect) => dialect,
            None if self.code.to_ascii_lowercase().ends_with("strongs") => {
                Dialect::UsfmStrongsZip
            }
            None => Dialect::UsfmZip,
        }
    }
}

/// Source files of a raw directory for `dialect`, in name order
pub fn locate_sources(raw_dir: &Path, dialect: Dialect) -> ParseResult<Vec<PathBuf>> {
    let listing = fs::read_dir(raw_dir).map_err(|e| ParseError::io(raw_dir, e))?;
    let wanted = |name: &str| {
        let lower = name.to_ascii_lowercase();
        if dialect.is_archive() {
            lower.ends_with("usfm.zip")
        } else {
            lower.ends_with(".xml")
        }
    };
    let mut found = Vec::new();
    for item in listing {
        let item = item.map_err(|e| ParseError::io(raw_dir, e))?;
        let path = item.path();
        if path.is_file() && wanted(&item.file_name().to_string_lossy()) {
            found.push(path);
        }
    }
    if found.is_empty() {
        let pattern = if dialect.is_archive() { "*usfm.zip" } else { "*.xml" };
        return Err(ParseError::MissingSource(format!(
            "no {pattern} found in {}",
            raw_dir.display()
        )));
    }
    found.sort();
    Ok(found)
}

/// Parse every path with one dialect.
///
/// A lone file that fails is an error. When several files are given, a failing file is logged,
/// counted in `failed_files`, and the rest are still parsed.
pub fn parse_sources(
    registry: &FormatRegistry,
    dialect: Dialect,
    paths: &[PathBuf],
) -> ParseResult<ParsedCorpus> {
    let format = registry.get(dialect)?;
    let parse_one = |path: &Path| -> ParseResult<ParsedCorpus> {
        let bytes = fs::read(path).map_err(|e| ParseError::io(path, e))?;
        format.parse(&bytes).map_err(|e| e.in_file(path))
    };

    if let [only] = paths {
        return parse_one(only);
    }
    let mut corpus = ParsedCorpus::default();
    for path in paths {
        match parse_one(path) {
            Ok(parsed) => corpus.merge(parsed),
            Err(err) => {
                warn!(%err, "skipping source that failed to parse");
                corpus.counters.failed_files += 1;
            }
        }
    }
    info!(
        dialect = %dialect,
        files = corpus.counters.files,
        failed = corpus.counters.failed_files,
        verses = corpus.counters.verses_written,
        "parsed sources"
    );
    Ok(corpus)
}

/// Per-book files plus `manifest.json`
pub fn write_canonical(
    out_dir: &Path,
    corpus_name: &str,
    corpus: &ParsedCorpus,
    force: bool,
) -> ParseResult<Vec<PathBuf>> {
    let written = canonical::write_book_files(&corpus.store, out_dir, force)?;
    let manifest = Manifest::new(corpus_name, &corpus.store).with_counters(&corpus.counters);
    canonical::write_manifest(out_dir, &manifest)?;
    Ok(written)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    pub force: bool,
    /// Overrides the dialect the manifest declares
    pub dialect: Option<Dialect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMeta {
    pub raw_dir: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub strongs_tokens: bool,
}

/// `meta.json` of an imported translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMeta {
    pub code: String,
    pub language: String,
    pub source: SourceMeta,
    pub counts: StreamCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

#[derive(Debug, Clone)]
pub struct ImportReport {
    pub code: String,
    pub language: String,
    pub dialect: Dialect,
    pub out_dir: PathBuf,
    pub counts: StreamCounts,
    pub counters: crate::store::ParseCounters,
}

/// Import one raw translation directory into `out_dir`
pub fn import_translation(
    registry: &FormatRegistry,
    request: &ImportRequest,
) -> ParseResult<ImportReport> {
    let manifest = RawManifest::read(&request.raw_dir)?;
    let dialect = request.dialect.unwrap_or_else(|| manifest.dialect());
    let sources = locate_sources(&request.raw_dir, dialect)?;

    let books_json = request.out_dir.join(BOOKS_FILE);
    let chapters_jsonl = request.out_dir.join(CHAPTERS_FILE);
    if !request.force && books_json.exists() && chapters_jsonl.exists() {
        return Err(ParseError::OutputExists(request.out_dir.clone()));
    }

    let corpus = parse_sources(registry, dialect, &sources)?;
    if corpus.store.is_empty() {
        return Err(ParseError::InvalidStructure(format!(
            "no verses found in {}",
            request.raw_dir.display()
        )));
    }

    fs::create_dir_all(&request.out_dir).map_err(|e| ParseError::io(&request.out_dir, e))?;
    let title = manifest
        .title
        .clone()
        .unwrap_or_else(|| manifest.code.to_ascii_uppercase());
    // companions are rewritten below, so book files follow the same overwrite decision
    write_canonical(&request.out_dir, &title, &corpus, true)?;

    let index = chapters::books_index(&corpus.store, &corpus.names);
    chapters::write_books_index(&books_json, &index)?;
    let counts = chapters::write_chapter_stream(&corpus.store, &chapters_jsonl)?;

    let meta = ImportMeta {
        code: manifest.code.clone(),
        language: manifest.language.clone(),
        source: SourceMeta {
            raw_dir: request.raw_dir.display().to_string(),
            files: sources
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
        },
        counts,
        annotations: corpus.store.has_tagged().then_some(Annotations {
            strongs_tokens: true,
        }),
    };
    let meta_path = request.out_dir.join(META_FILE);
    let json = serde_json::to_string_pretty(&meta)?;
    fs::write(&meta_path, json).map_err(|e| ParseError::io(&meta_path, e))?;

    info!(
        code = %manifest.code,
        language = %manifest.language,
        books = counts.books,
        chapters = counts.chapters,
        verses = counts.verses,
        "imported translation"
    );
    Ok(ImportReport {
        code: manifest.code,
        language: manifest.language,
        dialect,
        out_dir: request.out_dir.clone(),
        counts,
        counters: corpus.counters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn raw_translation(dir: &Path, manifest: &str) {
        fs::write(dir.join(RAW_MANIFEST_FILE), manifest).unwrap();
        write_zip(
            &dir.join("eng-kjv_usfm.zip"),
            &[
                ("02-GENeng-kjv.usfm", "\\id GEN\n\\h Genesis\n\\c 1\n\\v 1 In the beginning\n\\v 2 And the earth\n"),
                ("21-PROeng-kjv.usfm", "\\id PRO\n\\c 21\n\\v 11 When the scorner is punished\n"),
            ],
        );
    }

    #[test]
    fn plan_filter_narrows_translations() {
        let plan: BiblePlan = serde_json::from_str(
            r#"{"translations": [
                {"code": "kjv", "language": "en", "group": "v1_core_en", "tier": "must"},
                {"code": "asv", "language": "en", "tier": "extra-B1"},
                {"code": "grctr", "language": "grc", "format": "usfx"}
            ]}"#,
        )
        .unwrap();
        let english = PlanFilter {
            language: Some("en".into()),
            ..Default::default()
        };
        assert_eq!(plan.select(&english).len(), 2);

        let must = PlanFilter {
            tier: Some("must".into()),
            ..Default::default()
        };
        assert_eq!(plan.select(&must)[0].code, "kjv");

        let codes = PlanFilter {
            codes: vec!["grctr".into(), "asv".into()],
            ..Default::default()
        };
        let picked: Vec<_> = plan.select(&codes).iter().map(|t| t.code.as_str()).collect();
        assert_eq!(picked, vec!["asv", "grctr"]);
        assert_eq!(plan.translations[2].format, Some(Dialect::Usfx));
    }

    #[test]
    fn manifest_requires_code_and_language() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(RAW_MANIFEST_FILE), r#"{"code": "kjv"}"#).unwrap();
        assert!(matches!(
            RawManifest::read(dir.path()),
            Err(ParseError::Manifest { .. })
        ));

        fs::write(
            dir.path().join(RAW_MANIFEST_FILE),
            r#"{"code": "kjv_strongs", "language": "en", "license": "PD"}"#,
        )
        .unwrap();
        let manifest = RawManifest::read(dir.path()).unwrap();
        assert_eq!(manifest.dialect(), Dialect::UsfmStrongsZip);
    }

    #[test]
    fn missing_sources_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            locate_sources(dir.path(), Dialect::UsfmZip),
            Err(ParseError::MissingSource(_))
        ));
    }

    #[test]
    fn imports_translation_with_companions() {
        let raw = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        raw_translation(raw.path(), r#"{"code": "kjv", "language": "en", "title": "King James"}"#);
        let request = ImportRequest {
            raw_dir: raw.path().to_path_buf(),
            out_dir: out.path().join("kjv"),
            force: false,
            dialect: None,
        };
        let registry = FormatRegistry::with_defaults();
        let report = import_translation(&registry, &request).unwrap();
        assert_eq!(report.dialect, Dialect::UsfmZip);
        assert_eq!(
            report.counts,
            StreamCounts {
                books: 2,
                chapters: 2,
                verses: 3
            }
        );

        let kjv = out.path().join("kjv");
        for name in ["GEN.json", "PRO.json", "manifest.json", BOOKS_FILE, CHAPTERS_FILE, META_FILE] {
            assert!(kjv.join(name).is_file(), "{name} missing");
        }
        let books: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(kjv.join(BOOKS_FILE)).unwrap()).unwrap();
        assert_eq!(books["order"], serde_json::json!(["GEN", "PRO"]));
        assert_eq!(books["names"]["PRO"], "Proverbs");
        let meta: ImportMeta =
            serde_json::from_str(&fs::read_to_string(kjv.join(META_FILE)).unwrap()).unwrap();
        assert_eq!(meta.source.files, vec!["eng-kjv_usfm.zip"]);
        assert_eq!(meta.annotations, None);
        assert_eq!(Manifest::read(&kjv).unwrap().corpus, "King James");

        assert!(matches!(
            import_translation(&registry, &request),
            Err(ParseError::OutputExists(_))
        ));
        let forced = ImportRequest {
            force: true,
            ..request
        };
        assert!(import_translation(&registry, &forced).is_ok());
    }

    #[test]
    fn multi_file_parse_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.xml");
        let bad = dir.path().join("b.xml");
        fs::write(&good, r#"<osis><verse osisID="Gen.1.1">In the beginning</verse></osis>"#).unwrap();
        fs::write(&bad, "<osis><verse osisID=\"Gen.1.2\">").unwrap();
        let registry = FormatRegistry::with_defaults();

        let corpus = parse_sources(&registry, Dialect::Osis, &[good, bad.clone()]).unwrap();
        assert_eq!(corpus.counters.failed_files, 1);
        assert_eq!(corpus.store.verse_count(), 1);

        let err = parse_sources(&registry, Dialect::Osis, &[bad]).unwrap_err();
        assert!(matches!(err, ParseError::File { .. }));
    }
}
