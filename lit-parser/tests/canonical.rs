//! Parse, write and split a translation end to end

use lit_parser::canonical::{read_book_dir, write_book_files};
use lit_parser::chapters::{read_chapter_stream, split_chapter_stream, write_chapter_stream};
use lit_parser::import::parse_sources;
use lit_parser::{Dialect, FormatRegistry};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn parsed_store_survives_every_artifact() {
    let registry = FormatRegistry::with_defaults();
    let corpus = parse_sources(&registry, Dialect::Osis, &[fixture("genesis.osis.xml")]).unwrap();
    let out = tempfile::tempdir().unwrap();

    write_book_files(&corpus.store, out.path(), false).unwrap();
    assert_eq!(read_book_dir(out.path()).unwrap(), corpus.store);

    let jsonl = out.path().join("chapters.jsonl");
    write_chapter_stream(&corpus.store, &jsonl).unwrap();
    assert_eq!(read_chapter_stream(&jsonl).unwrap(), corpus.store);

    let report = split_chapter_stream(&jsonl, &out.path().join("chapters"), false).unwrap();
    assert_eq!(report.written, 2);
    let chapter: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.path().join("chapters/PRO/021.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(chapter["book_id"], "PRO");
    assert_eq!(chapter["verses"][1]["verse"], 12);
}

#[test]
fn book_files_use_string_keys() {
    let registry = FormatRegistry::with_defaults();
    let corpus =
        parse_sources(&registry, Dialect::Zefania, &[fixture("proverbs.zefania.xml")]).unwrap();
    let out = tempfile::tempdir().unwrap();
    write_book_files(&corpus.store, out.path(), false).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.path().join("PRO.json")).unwrap())
            .unwrap();
    assert_eq!(raw["book"], "PRO");
    assert_eq!(
        raw["chapters"]["21"]["12"],
        "The righteous man wisely considereth the house of the wicked"
    );
}
