//! Command-line interface for lit
//! Imports scripture sources into canonical per-book JSON and builds the pairs bundle the site loads.
//!
//! Usage:
//!   lit bible [--lang <lang>] [--code <code>...] [--group <id>] [--tier <tier>] [--force]
//!   lit import --format <dialect> --out <dir> <input>...
//!   lit split [--lang <lang>] [--code <code>] [--force]
//!   lit lexicon [<input>...] [--dialect <dialect>] [--out <dir>]
//!   lit catalog --lang-dir <dir> [--out <file>]
//!   lit pairs [--pairs <csv>] [--bible-root <dir>] [--out <file>] ...
//!   lit inspect [<bundle>]
//!
//! Exit codes: 0 success, 2 no usable CSV rows, 3 translation selection or loading failed,
//! 1 anything else.

mod commands;

use clap::{Arg, ArgAction, ArgMatches, Command};
use lit_pairs::PairsError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn build_cli() -> Command {
    Command::new("lit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Import scripture sources and build the pairs bundle")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Configuration file layered over the defaults (default: ./lit.toml if present)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log per-item detail to stderr"),
        )
        .subcommand(
            Command::new("bible")
                .about("Import the translations listed in the bible plan")
                .arg(Arg::new("lang").long("lang").help("Limit to one language (e.g. en, grc, he)"))
                .arg(
                    Arg::new("code")
                        .long("code")
                        .num_args(1..)
                        .help("Limit to one or more translation codes (e.g. kjv asv)"),
                )
                .arg(Arg::new("group").long("group").help("Limit to one plan group"))
                .arg(Arg::new("tier").long("tier").help("Limit to one tier"))
                .arg(path_arg("plan", "Plan file (default: import.plan)"))
                .arg(path_arg("raw-root", "Raw source root (default: import.raw_root)"))
                .arg(path_arg("out-root", "Output root (default: import.out_root)"))
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("import")
                .about("Parse source files of one dialect into per-book JSON")
                .arg(
                    Arg::new("inputs")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Source files"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .required(true)
                        .value_parser(commands::parse_dialect)
                        .help("Source dialect: osis, usfx, usfx-strongs, zefania, usfm-zip, usfm-strongs-zip"),
                )
                .arg(path_arg("out", "Output directory").required(true))
                .arg(Arg::new("corpus").long("corpus").help("Corpus name for manifest.json"))
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("split")
                .about("Split chapters.jsonl into per-chapter files")
                .arg(Arg::new("lang").long("lang").help("Limit to one language"))
                .arg(Arg::new("code").long("code").help("Limit to one translation code"))
                .arg(path_arg("out-root", "Translation root (default: import.out_root)"))
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("lexicon")
                .about("Build lexicon.json from Strong's and dictionary sources")
                .arg(
                    Arg::new("inputs")
                        .num_args(0..)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Lexicon files (default: every .xml under lexicon.raw_root)"),
                )
                .arg(
                    Arg::new("dialect")
                        .long("dialect")
                        .value_parser(commands::parse_lexicon_dialect)
                        .default_value("auto")
                        .help("auto (per file, from its name and shape), strongs-greek, strongs-hebrew, dictionary or generic"),
                )
                .arg(
                    Arg::new("lang")
                        .long("lang")
                        .value_parser(commands::parse_language)
                        .help("Language of bare numeric ids (greek or hebrew); inferred from file names otherwise"),
                )
                .arg(path_arg("out", "Output directory (default: lexicon.out_dir)"))
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("catalog")
                .about("Summarize the translations of one language directory")
                .arg(path_arg("lang-dir", "Language directory, e.g. docs/data/v1/lit/bible/en").required(true))
                .arg(path_arg("out", "Catalog file (default: <lang-dir>/translations.json)"))
                .arg(
                    Arg::new("base-url")
                        .long("base-url")
                        .help("URL prefix of the language directory (default: catalog.base_url/<lang>)"),
                ),
        )
        .subcommand(
            Command::new("pairs")
                .about("Build the pairs bundle from the authoring CSV")
                .arg(path_arg("pairs", "Authoring CSV (default: pairs.csv)"))
                .arg(path_arg("bible-root", "Directory of translation directories"))
                .arg(Arg::new("trans").long("trans").help("Default translation id (e.g. kjv)"))
                .arg(
                    Arg::new("trans-ids")
                        .long("trans-ids")
                        .help("Comma-separated translation ids, or 'auto' to discover them"),
                )
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .help("Comma-separated translation ids to leave out"),
                )
                .arg(path_arg("out", "Bundle JSON path"))
                .arg(
                    Arg::new("bundle-version")
                        .long("bundle-version")
                        .help("Bundle version string or 'auto'"),
                )
                .arg(Arg::new("built-at").long("built-at").help("ISO timestamp (default: now)"))
                .arg(flag("gzip", "Also write a .gz sibling"))
                .arg(path_arg("publish-dir", "Copy the bundle (and .gz) into this directory"))
                .arg(flag("pretty", "Indent the bundle JSON"))
                .arg(path_arg("trans-meta", "translations.json with metadata for the default translation"))
                .arg(
                    Arg::new("synonyms")
                        .long("synonyms")
                        .value_parser(["ignore", "index"])
                        .help("Whether X.keys/Y.keys synonyms are kept and indexed"),
                )
                .arg(flag("include-deprecated", "Index deprecated pairs too")),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print a short summary of a built bundle")
                .arg(
                    Arg::new("bundle")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Bundle JSON (default: pairs.out)"),
                )
                .arg(
                    Arg::new("keys")
                        .long("keys")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5")
                        .help("How many X keys to list"),
                ),
        )
}

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(clap::value_parser!(PathBuf))
        .help(help)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn force_arg() -> Arg {
    flag("force", "Overwrite existing output")
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Exit status for a failed command
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PairsError>() {
        Some(PairsError::NoRows(_)) => 2,
        Some(e) if e.is_translation_problem() => 3,
        _ => 1,
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let overrides = commands::config_overrides(matches.subcommand());
    let config = commands::load_config(matches.get_one::<PathBuf>("config"), &overrides)?;
    match matches.subcommand() {
        Some(("bible", sub)) => commands::bible(sub, &config),
        Some(("import", sub)) => commands::import(sub),
        Some(("split", sub)) => commands::split(sub, &config),
        Some(("lexicon", sub)) => commands::lexicon(sub, &config),
        Some(("catalog", sub)) => commands::catalog(sub, &config),
        Some(("pairs", sub)) => commands::pairs(sub, &config),
        Some(("inspect", sub)) => commands::inspect(sub, &config),
        _ => unreachable!("subcommand is required"),
    }
}

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    if let Err(err) = run(&matches) {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let no_rows = anyhow::Error::new(PairsError::NoRows("pairs.csv".into()));
        assert_eq!(exit_code(&no_rows), 2);

        let default = Err::<(), _>(PairsError::DefaultNotSelected {
            default: "kjv".into(),
            selected: "web".into(),
        })
        .context("building bundle")
        .unwrap_err();
        assert_eq!(exit_code(&default), 3);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }

    #[test]
    fn pairs_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[pairs]\ndefault_trans = \"web\"\nexclude_trans = [\"asv\"]\nsynonyms_mode = \"ignore\"\n",
        )
        .unwrap();
        let matches = build_cli()
            .try_get_matches_from([
                "lit",
                "pairs",
                "--trans",
                "kjv",
                "--trans-ids",
                "auto",
                "--synonyms",
                "index",
                "--gzip",
            ])
            .unwrap();
        let overrides = commands::config_overrides(matches.subcommand());
        let config = commands::load_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.pairs.default_trans, "kjv");
        assert!(config.pairs.trans_ids.is_empty());
        assert_eq!(config.pairs.exclude_trans, vec!["asv"]);
        assert_eq!(config.pairs.synonyms_mode, lit_pairs::SynonymsMode::Index);
        assert!(config.pairs.gzip);
        assert!(!config.pairs.pretty);

        let inspect = build_cli().try_get_matches_from(["lit", "inspect"]).unwrap();
        assert!(commands::config_overrides(inspect.subcommand()).is_empty());
    }
}
