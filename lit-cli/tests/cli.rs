use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

fn fixture_path(krate: &str, name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(krate)
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn pairs_cmd(dir: &Path, csv: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("lit");
    cmd.current_dir(dir)
        .arg("pairs")
        .arg("--pairs")
        .arg(csv)
        .arg("--bible-root")
        .arg(fixture_path("lit-pairs", "bible"))
        .arg("--out")
        .arg(dir.join("shk_pairs.json"));
    cmd
}

#[test]
fn pairs_builds_bundle_and_inspect_summarizes_it() {
    let dir = tempfile::tempdir().unwrap();
    pairs_cmd(dir.path(), &fixture_path("lit-pairs", "pairs.csv"))
        .arg("--bundle-version")
        .arg("2025.01.31.120000")
        .arg("--gzip")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("entries=3 pairs=3 active=2")
                .and(predicate::str::contains("Translations: kjv, web"))
                .and(predicate::str::contains("Skipped 1 incomplete row(s)")),
        );
    assert!(dir.path().join("shk_pairs.json.gz").is_file());

    let mut cmd = cargo_bin_cmd!("lit");
    cmd.current_dir(dir.path())
        .arg("inspect")
        .arg(dir.path().join("shk_pairs.json"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Default trans: kjv")
                .and(predicate::str::contains("X[1]: scoffer is punished -> 1 pairs")),
        );
}

#[test]
fn pairs_without_rows_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("empty.csv");
    fs::write(&csv, "Book,Ref,PV,X.key,X.root,Y.key,Y.root\n").unwrap();
    pairs_cmd(dir.path(), &csv)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no usable rows"));
}

#[test]
fn pairs_with_unselected_default_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    pairs_cmd(dir.path(), &fixture_path("lit-pairs", "pairs.csv"))
        .arg("--trans")
        .arg("asv")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("'asv'"));
}

#[test]
fn pairs_reads_defaults_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(
        &config,
        format!(
            "[pairs]\ncsv = {:?}\nbible_root = {:?}\nout = {:?}\ntrans_ids = [\"kjv\"]\n",
            fixture_path("lit-pairs", "pairs.csv"),
            fixture_path("lit-pairs", "bible"),
            dir.path().join("out").join("bundle.json"),
        ),
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("lit");
    cmd.current_dir(dir.path())
        .arg("pairs")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Translations: kjv\n"));
    assert!(dir.path().join("out").join("bundle.json").is_file());
}

#[test]
fn import_writes_book_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("kjv");
    let mut cmd = cargo_bin_cmd!("lit");
    cmd.current_dir(dir.path())
        .arg("import")
        .arg("--format")
        .arg("osis")
        .arg("--out")
        .arg(&out)
        .arg(fixture_path("lit-parser", "genesis.osis.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 book file(s)"));
    assert!(out.join("GEN.json").is_file());
    assert!(out.join("PRO.json").is_file());
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["corpus"], "KJV");

    // second run refuses to overwrite
    let mut again = cargo_bin_cmd!("lit");
    again
        .current_dir(dir.path())
        .args(["import", "--format", "osis", "--out"])
        .arg(&out)
        .arg(fixture_path("lit-parser", "genesis.osis.xml"))
        .assert()
        .code(1);
}

#[test]
fn import_rejects_unknown_format() {
    let mut cmd = cargo_bin_cmd!("lit");
    cmd.args(["import", "--format", "markdown", "--out", "x", "in.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("markdown"));
}

fn write_raw_translation(raw: &Path) {
    let dir = raw.join("en").join("kjv");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("manifest.json"), r#"{"code": "kjv", "language": "en"}"#).unwrap();
    let file = fs::File::create(dir.join("eng-kjv_usfm.zip")).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("02-GENeng-kjv.usfm", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"\\id GEN\n\\h Genesis\n\\c 1\n\\v 1 In the beginning\n\\v 2 And the earth\n\\c 2\n\\v 1 Thus the heavens\n")
        .unwrap();
    zip.finish().unwrap();
}

#[test]
fn bible_split_and_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw");
    let out = dir.path().join("bible");
    write_raw_translation(&raw);
    let plan = dir.path().join("bible_plan.json");
    fs::write(
        &plan,
        r#"{"translations": [
            {"code": "kjv", "language": "en", "title": "King James Version"},
            {"code": "tr", "language": "grc"}
        ]}"#,
    )
    .unwrap();

    let mut bible = cargo_bin_cmd!("lit");
    bible
        .current_dir(dir.path())
        .args(["bible", "--lang", "en", "--plan"])
        .arg(&plan)
        .arg("--raw-root")
        .arg(&raw)
        .arg("--out-root")
        .arg(&out)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("==> en/kjv (King James Version)")
                .and(predicate::str::contains("1 books, 2 chapters, 3 verses")),
        );
    let kjv = out.join("en").join("kjv");
    for name in ["GEN.json", "manifest.json", "books.json", "chapters.jsonl", "meta.json"] {
        assert!(kjv.join(name).is_file(), "{name}");
    }

    let mut split = cargo_bin_cmd!("lit");
    split
        .current_dir(dir.path())
        .args(["split", "--out-root"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("[en/kjv] wrote 2 chapter file(s), kept 0"));
    assert!(kjv.join("chapters").join("GEN").join("002.json").is_file());

    let mut catalog = cargo_bin_cmd!("lit");
    catalog
        .current_dir(dir.path())
        .arg("catalog")
        .arg("--lang-dir")
        .arg(out.join("en"))
        .assert()
        .success()
        .stdout(predicate::str::contains("kjv: 1 books, 3 verses"));
    let entries: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.join("en").join("translations.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(entries[0]["name"], "King James Version");
    assert_eq!(entries[0]["base_url"], "/data/v1/lit/bible/en/kjv");
}

#[test]
fn bible_with_no_matches_fails() {
    let dir = tempfile::tempdir().unwrap();
    let plan = dir.path().join("bible_plan.json");
    fs::write(&plan, r#"{"translations": [{"code": "kjv", "language": "en"}]}"#).unwrap();
    let mut cmd = cargo_bin_cmd!("lit");
    cmd.current_dir(dir.path())
        .args(["bible", "--lang", "he", "--plan"])
        .arg(&plan)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no translations matched"));
}

#[test]
fn lexicon_merges_sources() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("strongs");
    let mut cmd = cargo_bin_cmd!("lit");
    cmd.current_dir(dir.path())
        .arg("lexicon")
        .arg(fixture_path("lit-parser", "strongsgreek.xml"))
        .args(["--dialect", "strongs-greek", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 entries (0 hebrew, 1 greek)"));
    let lexicon: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("lexicon.json")).unwrap()).unwrap();
    assert_eq!(lexicon["G3056"]["lemma"], "λόγος");
}

#[test]
fn lexicon_picks_dialect_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("strongs");
    let mut cmd = cargo_bin_cmd!("lit");
    cmd.current_dir(dir.path())
        .arg("lexicon")
        .arg(fixture_path("lit-parser", "strongsgreek.xml"))
        .arg(fixture_path("lit-parser", "HebrewStrong.xml"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 entries (2 hebrew, 1 greek)"));
    let lexicon: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("lexicon.json")).unwrap()).unwrap();
    assert_eq!(lexicon["G3056"]["lemma"], "λόγος");
    assert_eq!(lexicon["H3887"]["lemma"], "לוּץ");
    assert_eq!(lexicon["H6612"]["source"], "HebrewStrong.xml");
}
