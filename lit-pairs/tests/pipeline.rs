//! End-to-end bundle builds over the fixture sheet and bibles

use lit_pairs::bundle::read_bundle;
use lit_pairs::{build_bundle, BuildSpec, PairsError, SynonymsMode};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn spec(out: &TempDir) -> BuildSpec {
    BuildSpec::new(
        fixture("pairs.csv"),
        fixture("bible"),
        out.path().join("data").join("shk_pairs.json"),
    )
    .bundle_version(Some("2025.01.31.120000".into()))
    .built_at(Some("2025-01-31T12:00:00Z".into()))
}

#[test]
fn builds_bundle_from_discovered_translations() {
    let out = tempfile::tempdir().unwrap();
    let report = build_bundle(&spec(&out)).unwrap();

    assert_eq!(report.trans_ids, vec!["kjv", "web"]);
    assert_eq!(report.rows, 3);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.stats.entry_count, 3);
    assert_eq!(report.stats.pair_count, 3);
    assert_eq!(report.stats.pair_count_active, 2);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.gzip, None);

    let bundle = read_bundle(&report.out).unwrap();
    assert_eq!(bundle.bundle_version, "2025.01.31.120000");
    assert_eq!(bundle.built_at, "2025-01-31T12:00:00Z");
    assert_eq!(bundle.default_trans, "kjv");
    let refs: Vec<&str> = bundle.entries.iter().map(|e| e.reference.as_str()).collect();
    assert_eq!(refs, vec!["Prov 1:1-2", "Prov 21:11", "Prov 21:11-12"]);

    // web has no chapter 1
    assert_eq!(bundle.entries[0].text.keys().collect::<Vec<_>>(), vec!["kjv"]);
    assert_eq!(bundle.entries[1].text.keys().collect::<Vec<_>>(), vec!["kjv", "web"]);
    assert_eq!(bundle.entries[2].notes, "overthrow theme");

    assert_eq!(
        bundle.index.x.keys().collect::<Vec<_>>(),
        vec!["scoffer is punished", "righteous considers"]
    );
    assert_eq!(bundle.trans_meta["kjv"]["id"], "kjv");
}

#[test]
fn explicit_selection_gzip_and_publish() {
    let out = tempfile::tempdir().unwrap();
    let site = out.path().join("site");
    let spec = spec(&out)
        .trans_ids(vec!["kjv".into()])
        .gzip(true)
        .pretty(true)
        .publish_dir(Some(site.clone()))
        .synonyms(SynonymsMode::Index)
        .include_deprecated(true);
    let report = build_bundle(&spec).unwrap();

    assert_eq!(report.trans_ids, vec!["kjv"]);
    let gz = report.gzip.clone().unwrap();
    assert!(gz.ends_with("data/shk_pairs.json.gz"));
    assert_eq!(
        report.published,
        vec![site.join("shk_pairs.json"), site.join("shk_pairs.json.gz")]
    );
    assert!(fs::read_to_string(&report.out).unwrap().contains("\n  \"schemaVersion\": 1"));

    let bundle = read_bundle(&site.join("shk_pairs.json")).unwrap();
    assert_eq!(
        bundle.index.x.keys().collect::<Vec<_>>(),
        vec!["wisdom", "scoffer is punished", "mocker punished", "righteous considers"]
    );
}

#[test]
fn pair_ids_are_stable_across_builds() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let ids = |dir: &TempDir, mode: SynonymsMode| {
        let report = build_bundle(&spec(dir).synonyms(mode)).unwrap();
        read_bundle(&report.out)
            .unwrap()
            .entries
            .into_iter()
            .flat_map(|e| e.pairs)
            .map(|p| p.pair_id)
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first, SynonymsMode::Ignore), ids(&second, SynonymsMode::Index));
}

#[test]
fn default_translation_must_be_selected() {
    let out = tempfile::tempdir().unwrap();
    let err = build_bundle(&spec(&out).exclude(vec!["kjv".into()])).unwrap_err();
    assert!(matches!(err, PairsError::DefaultNotSelected { .. }), "{err}");
    assert!(err.is_translation_problem());
}

#[test]
fn empty_sheet_is_no_rows() {
    let out = tempfile::tempdir().unwrap();
    let csv = out.path().join("empty.csv");
    fs::write(&csv, "Book,Ref,PV,X.key,X.root,Y.key,Y.root\n,,,,,,\n").unwrap();
    let spec = BuildSpec::new(&csv, fixture("bible"), out.path().join("b.json"));
    let err = build_bundle(&spec).unwrap_err();
    assert!(matches!(err, PairsError::NoRows(_)), "{err}");
}

#[test]
fn missing_span_verse_fails_with_row_context() {
    let out = tempfile::tempdir().unwrap();
    let csv = out.path().join("bad.csv");
    fs::write(
        &csv,
        "Book,Ref,PV,X.key,X.root,Y.key,Y.root\n\
         Prov,21:11-13,11,A,the scorner,B,the simple\n",
    )
    .unwrap();
    let spec = BuildSpec::new(&csv, fixture("bible"), out.path().join("b.json"));
    let err = build_bundle(&spec).unwrap_err();
    assert_eq!(
        err.to_string(),
        "row 2 (Prov 21:11-13): missing verse 21:13 in PRO"
    );
    assert!(!out.path().join("b.json").exists());
}
