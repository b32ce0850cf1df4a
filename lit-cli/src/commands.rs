//! Subcommand handlers

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use lit_config::{LitConfig, Overrides};
use lit_pairs::bundle::read_bundle;
use lit_pairs::{build_bundle, BuildSpec, BundleSummary};
use lit_parser::catalog::{build_catalog, write_catalog};
use lit_parser::chapters::{find_chapter_streams, split_chapter_stream};
use lit_parser::import::{import_translation, parse_sources, write_canonical, BiblePlan, ImportRequest, PlanFilter};
use lit_parser::lexicon::{parse_lexicon_file, write_lexicon, Lexicon, LexiconDialect};
use lit_parser::strongs::Language;
use lit_parser::{Dialect, FormatRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn parse_dialect(s: &str) -> Result<Dialect, String> {
    s.parse().map_err(|e: lit_parser::ParseError| e.to_string())
}

pub fn parse_lexicon_dialect(s: &str) -> Result<LexiconDialect, String> {
    s.parse().map_err(|e: lit_parser::ParseError| e.to_string())
}

pub fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

pub fn load_config(path: Option<&PathBuf>, overrides: &Overrides) -> Result<LitConfig> {
    lit_config::load_with(path.map(PathBuf::as_path), overrides).context("loading configuration")
}

/// `pairs` flags as config keys; path flags are resolved in `pairs_spec`
pub fn config_overrides(subcommand: Option<(&str, &ArgMatches)>) -> Overrides {
    let mut overrides = Overrides::new();
    let Some(("pairs", matches)) = subcommand else {
        return overrides;
    };
    if let Some(trans) = string(matches, "trans") {
        overrides.set("pairs.default_trans", trans);
    }
    match string(matches, "trans-ids") {
        Some(raw) if raw.trim().eq_ignore_ascii_case("auto") => {
            overrides.set("pairs.trans_ids", Vec::<String>::new())
        }
        Some(raw) => overrides.set("pairs.trans_ids", id_list(&raw)),
        None => {}
    }
    if let Some(raw) = string(matches, "exclude") {
        overrides.set("pairs.exclude_trans", id_list(&raw));
    }
    if let Some(mode) = string(matches, "synonyms") {
        overrides.set("pairs.synonyms_mode", mode);
    }
    for (flag, key) in [
        ("gzip", "pairs.gzip"),
        ("pretty", "pairs.pretty"),
        ("include-deprecated", "pairs.include_deprecated"),
    ] {
        if matches.get_flag(flag) {
            overrides.set(key, true);
        }
    }
    overrides
}

fn path_or(matches: &ArgMatches, name: &str, fallback: &Path) -> PathBuf {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .unwrap_or_else(|| fallback.to_path_buf())
}

fn string(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

/// `a, b,,c` → `["a", "b", "c"]`
fn id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn bible(matches: &ArgMatches, config: &LitConfig) -> Result<()> {
    let plan_path = path_or(matches, "plan", &config.import.plan);
    let raw_root = path_or(matches, "raw-root", &config.import.raw_root);
    let out_root = path_or(matches, "out-root", &config.import.out_root);
    let force = matches.get_flag("force");

    let plan = BiblePlan::read(&plan_path)?;
    let filter = PlanFilter {
        language: string(matches, "lang"),
        codes: matches
            .get_many::<String>("code")
            .map(|codes| codes.cloned().collect())
            .unwrap_or_default(),
        group: string(matches, "group"),
        tier: string(matches, "tier"),
    };
    let selected = plan.select(&filter);
    if selected.is_empty() {
        bail!("no translations matched the given filters");
    }

    let registry = FormatRegistry::with_defaults();
    println!("Importing {} translation(s)...", selected.len());
    for t in selected {
        println!("==> {}/{} ({})", t.language, t.code, t.title.as_deref().unwrap_or(""));
        let request = ImportRequest {
            raw_dir: raw_root.join(&t.language).join(&t.code),
            out_dir: out_root.join(&t.language).join(&t.code),
            force,
            dialect: t.format,
        };
        let report = import_translation(&registry, &request)
            .with_context(|| format!("importing {}/{}", t.language, t.code))?;
        println!(
            "    {}: {} books, {} chapters, {} verses -> {}",
            report.dialect,
            report.counts.books,
            report.counts.chapters,
            report.counts.verses,
            report.out_dir.display()
        );
    }
    println!("Done.");
    Ok(())
}

pub fn import(matches: &ArgMatches) -> Result<()> {
    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("inputs")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();
    let dialect = *matches
        .get_one::<Dialect>("format")
        .context("--format is required")?;
    let out = matches
        .get_one::<PathBuf>("out")
        .context("--out is required")?;
    let corpus_name = string(matches, "corpus").unwrap_or_else(|| {
        out.file_name()
            .map(|n| n.to_string_lossy().to_ascii_uppercase())
            .unwrap_or_default()
    });

    let registry = FormatRegistry::with_defaults();
    let corpus = parse_sources(&registry, dialect, &inputs)?;
    if corpus.store.is_empty() {
        bail!("no verses found in {} input file(s)", inputs.len());
    }
    let written = write_canonical(out, &corpus_name, &corpus, matches.get_flag("force"))?;
    let c = &corpus.counters;
    println!(
        "Wrote {} book file(s) to {} ({} verses, {} skipped books, {} collapsed ranges)",
        written.len(),
        out.display(),
        corpus.store.verse_count(),
        c.skipped_books,
        c.collapsed_ranges
    );
    Ok(())
}

pub fn split(matches: &ArgMatches, config: &LitConfig) -> Result<()> {
    let base = path_or(matches, "out-root", &config.import.out_root);
    let lang = matches.get_one::<String>("lang").map(String::as_str);
    let code = matches.get_one::<String>("code").map(String::as_str);
    let force = matches.get_flag("force");

    let targets = find_chapter_streams(&base, lang, code)?;
    if targets.is_empty() {
        println!("No matching translations found (check --lang/--code and chapters.jsonl presence).");
        return Ok(());
    }
    for target in targets {
        let out = target.chapters_dir();
        let report = split_chapter_stream(&target.stream(), &out, force)?;
        println!(
            "[{}/{}] wrote {} chapter file(s), kept {} under {}",
            target.lang,
            target.code,
            report.written,
            report.skipped,
            out.display()
        );
    }
    Ok(())
}

/// Every `.xml` file below `dir`, sorted
fn xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let listing = fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    for item in listing {
        let path = item?.path();
        if path.is_dir() {
            found.extend(xml_files(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

pub fn lexicon(matches: &ArgMatches, config: &LitConfig) -> Result<()> {
    let mut inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("inputs")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();
    if inputs.is_empty() {
        inputs = xml_files(&config.lexicon.raw_root)?;
    }
    if inputs.is_empty() {
        bail!("no lexicon sources found under {}", config.lexicon.raw_root.display());
    }
    let dialect = matches
        .get_one::<LexiconDialect>("dialect")
        .copied()
        .unwrap_or_default();
    let hint = matches.get_one::<Language>("lang").copied();
    let out = path_or(matches, "out", &config.lexicon.out_dir);

    let mut lexicon = Lexicon::new();
    let mut sources = Vec::with_capacity(inputs.len());
    for path in &inputs {
        debug!(path = %path.display(), "reading lexicon source");
        lexicon.merge_from(parse_lexicon_file(path, dialect, hint)?);
        if let Some(name) = path.file_name() {
            sources.push(name.to_string_lossy().into_owned());
        }
    }
    let meta = write_lexicon(&out, &lexicon, &sources, matches.get_flag("force"))?;
    println!(
        "Wrote {} entries ({} hebrew, {} greek) to {}",
        meta.count,
        meta.hebrew,
        meta.greek,
        out.display()
    );
    Ok(())
}

pub fn catalog(matches: &ArgMatches, config: &LitConfig) -> Result<()> {
    let lang_dir = matches
        .get_one::<PathBuf>("lang-dir")
        .context("--lang-dir is required")?;
    let out = path_or(matches, "out", &lang_dir.join("translations.json"));
    let base_url = string(matches, "base-url").unwrap_or_else(|| {
        let lang = lang_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}/{}", config.catalog.base_url.trim_end_matches('/'), lang)
    });

    let entries = build_catalog(lang_dir, &base_url)?;
    write_catalog(&out, &entries)?;
    for entry in &entries {
        println!("{}: {} books, {} verses", entry.id, entry.books, entry.verses);
    }
    println!("Wrote {} translation(s) to {}", entries.len(), out.display());
    Ok(())
}

fn pairs_spec(matches: &ArgMatches, config: &LitConfig) -> BuildSpec {
    let defaults = &config.pairs;
    let bundle_version = string(matches, "bundle-version").filter(|v| !v.eq_ignore_ascii_case("auto"));
    let publish_dir = matches
        .get_one::<PathBuf>("publish-dir")
        .cloned()
        .or_else(|| defaults.publish_dir.clone());
    let trans_meta = matches
        .get_one::<PathBuf>("trans-meta")
        .cloned()
        .or_else(|| defaults.trans_meta.clone());

    BuildSpec::new(
        path_or(matches, "pairs", &defaults.csv),
        path_or(matches, "bible-root", &defaults.bible_root),
        path_or(matches, "out", &defaults.out),
    )
    .default_trans(defaults.default_trans.clone())
    .trans_ids(defaults.trans_ids.clone())
    .exclude(defaults.exclude_trans.clone())
    .bundle_version(bundle_version)
    .built_at(string(matches, "built-at"))
    .schema_version(defaults.schema_version)
    .gzip(defaults.gzip)
    .pretty(defaults.pretty)
    .publish_dir(publish_dir)
    .trans_meta(trans_meta)
    .synonyms(defaults.synonyms_mode)
    .include_deprecated(defaults.include_deprecated)
}

pub fn pairs(matches: &ArgMatches, config: &LitConfig) -> Result<()> {
    let spec = pairs_spec(matches, config);
    let report = build_bundle(&spec).context("building pairs bundle")?;

    println!(
        "Wrote {} (version {}): entries={} pairs={} active={}",
        report.out.display(),
        report.bundle_version,
        report.stats.entry_count,
        report.stats.pair_count,
        report.stats.pair_count_active
    );
    println!("Translations: {}", report.trans_ids.join(", "));
    if report.skipped_rows > 0 {
        println!("Skipped {} incomplete row(s)", report.skipped_rows);
    }
    if let Some(gz) = &report.gzip {
        println!("Wrote {}", gz.display());
    }
    for path in &report.published {
        println!("Published {}", path.display());
    }
    if !report.warnings.is_empty() {
        println!("Warnings: {}", report.warnings.len());
    }
    Ok(())
}

pub fn inspect(matches: &ArgMatches, config: &LitConfig) -> Result<()> {
    let path = path_or(matches, "bundle", &config.pairs.out);
    let keys = matches.get_one::<usize>("keys").copied().unwrap_or(5);
    let bundle = read_bundle(&path).with_context(|| format!("reading {}", path.display()))?;
    print!("{}", BundleSummary::of(&bundle, keys));
    Ok(())
}
