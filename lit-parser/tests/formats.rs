//! Whole fixture files through the registry

use lit_parser::{Dialect, FormatRegistry, VersePayload};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[rstest]
#[case::osis("genesis.osis.xml", Dialect::Osis)]
#[case::usfx("proverbs.usfx.xml", Dialect::Usfx)]
#[case::zefania("proverbs.zefania.xml", Dialect::Zefania)]
fn every_dialect_finds_proverbs_21_11(#[case] file: &str, #[case] dialect: Dialect) {
    let registry = FormatRegistry::with_defaults();
    let corpus = registry.parse(dialect, &fixture(file)).unwrap();
    let text = corpus.store.get("PRO", 21, 11).unwrap().text();
    assert!(
        text.starts_with("When the scorner is punished, the simple is made wise"),
        "{text}"
    );
    assert_eq!(corpus.counters.files, 1);
    assert_eq!(corpus.counters.skipped_books, 0);
}

#[test]
fn osis_fixture_mixes_milestones_and_wrapped_verses() {
    let registry = FormatRegistry::with_defaults();
    let corpus = registry.parse(Dialect::Osis, &fixture("genesis.osis.xml")).unwrap();
    assert_eq!(
        corpus.store.book_codes().collect::<Vec<_>>(),
        vec!["GEN", "PRO"]
    );
    assert_eq!(
        corpus.store.get("GEN", 1, 1).unwrap().text(),
        "In the beginning God created the heaven and the earth."
    );
    assert_eq!(corpus.counters.verse_starts, 5);
    assert_eq!(corpus.counters.verses_written, 5);
}

#[test]
fn usfx_fixture_drops_notes() {
    let registry = FormatRegistry::with_defaults();
    let corpus = registry.parse(Dialect::Usfx, &fixture("proverbs.usfx.xml")).unwrap();
    assert_eq!(
        corpus.store.get("PRO", 21, 12).unwrap().text(),
        "The righteous man wisely considereth the house of the wicked."
    );
}

#[test]
fn strongs_usfx_fixture_keeps_tokens() {
    let registry = FormatRegistry::with_defaults();
    let corpus = registry
        .parse(Dialect::UsfxStrongs, &fixture("proverbs.strongs.usfx.xml"))
        .unwrap();
    let payload = corpus.store.get("PRO", 21, 11).unwrap();
    assert_eq!(
        payload.text(),
        "When the scorner is punished, the simple is made wise."
    );
    let VersePayload::Tagged(tagged) = payload else {
        panic!("expected tagged payload");
    };
    assert_eq!(tagged.strongs, vec!["H3887", "H6064", "H6612", "H2449"]);
    let scorner = tagged.tokens.iter().find(|t| t.text == "scorner").unwrap();
    assert_eq!(scorner.strongs, vec!["H3887"]);
}

#[rstest]
#[case("osis", Dialect::Osis)]
#[case("USFX_STRONGS", Dialect::UsfxStrongs)]
#[case(" usfm-zip ", Dialect::UsfmZip)]
fn dialect_names_parse(#[case] raw: &str, #[case] expected: Dialect) {
    assert_eq!(raw.parse::<Dialect>().unwrap(), expected);
}

#[test]
fn unknown_dialect_is_rejected() {
    assert!("sword".parse::<Dialect>().is_err());
}
