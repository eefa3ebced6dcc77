// Whole-pipeline tests: reconcile, parse, and all four emitters against a
// real directory, plus stage attribution on failure.

use std::fs;
use std::path::Path;

use modelgen::compare::{CompareEmitter, CompareMode};
use modelgen::emit::emit_all;
use modelgen::parse::{ParseOptions, parse};
use modelgen::pipeline::{RunConfig, Stage, run};
use modelgen::pojo::PojoEmitter;
use regex::Regex;

const SCHEMA: &str = r#"
namespace com.example.crm

entity Person @1.2.0 {
    id: long [identity],
    name: string,
    home: Address
}

entity Address {
    street: string [identity],
    city: string [identity]
}
"#;

fn config(schema_path: &Path, out_root: &Path) -> RunConfig {
    RunConfig {
        schema_path: schema_path.to_path_buf(),
        out_root: out_root.to_path_buf(),
        options: ParseOptions::default(),
        target_extension: "java".to_string(),
        retention: Regex::new(r"^\s*//\s+KEEP").expect("valid pattern"),
    }
}

#[test]
fn full_run_produces_four_artifacts_per_entity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema_path = dir.path().join("crm.schema");
    fs::write(&schema_path, SCHEMA).expect("schema fixture");
    let out_root = dir.path().join("generated");

    let summary = run(&config(&schema_path, &out_root)).expect("pipeline run");
    assert_eq!(summary.entities, 2);
    assert_eq!(summary.written.len(), 8);

    let package = out_root.join("com/example/crm");
    for file in [
        "Person.java",
        "PersonFullCompare.java",
        "PersonIdCompare.java",
        "PersonJson.java",
        "Address.java",
        "AddressFullCompare.java",
        "AddressIdCompare.java",
        "AddressJson.java",
    ] {
        assert!(package.join(file).is_file(), "missing {file}");
    }
}

#[test]
fn rerun_replaces_stale_output_and_keeps_marked_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema_path = dir.path().join("crm.schema");
    fs::write(&schema_path, SCHEMA).expect("schema fixture");
    let out_root = dir.path().join("generated");

    run(&config(&schema_path, &out_root)).expect("first run");

    // an entity removed from the schema leaves a stale file behind
    let package = out_root.join("com/example/crm");
    let stale = package.join("Removed.java");
    fs::write(&stale, "// Generated by modelgen. Do not edit: regenerated on every run.\n")
        .expect("stale fixture");
    let kept = package.join("PersonExtras.java");
    fs::write(&kept, "// KEEP hand-written companion\nclass PersonExtras {}\n")
        .expect("kept fixture");

    let summary = run(&config(&schema_path, &out_root)).expect("second run");
    assert!(!stale.exists());
    assert!(kept.exists());
    // the 8 generated files plus the marked one were reconciled
    assert_eq!(summary.reconciled.deleted_files, 9);
    assert_eq!(summary.reconciled.kept, 1);
    assert!(package.join("Person.java").is_file());
}

#[test]
fn generated_output_is_byte_stable_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema_path = dir.path().join("crm.schema");
    fs::write(&schema_path, SCHEMA).expect("schema fixture");
    let out_root = dir.path().join("generated");

    run(&config(&schema_path, &out_root)).expect("first run");
    let person = out_root.join("com/example/crm/PersonJson.java");
    let first = fs::read_to_string(&person).expect("first body");

    run(&config(&schema_path, &out_root)).expect("second run");
    let second = fs::read_to_string(&person).expect("second body");
    assert_eq!(first, second);
}

#[test]
fn emit_all_runs_emitters_in_order() {
    let model = parse(SCHEMA, ParseOptions::default()).expect("schema parses");
    let out = tempfile::tempdir().expect("tempdir");
    let pojo = PojoEmitter::default();
    let full = CompareEmitter::new(CompareMode::Full);
    let written = emit_all(&model, out.path(), &[&pojo, &full]).expect("emit all");
    assert_eq!(written.len(), 4);
    assert!(written[0].ends_with("Person.java"));
    assert!(written[1].ends_with("Address.java"));
    assert!(written[2].ends_with("PersonFullCompare.java"));
    assert!(written[3].ends_with("AddressFullCompare.java"));
}

#[test]
fn missing_schema_is_attributed_to_the_parse_stage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = run(&config(
        &dir.path().join("absent.schema"),
        &dir.path().join("generated"),
    ))
    .expect_err("schema file missing");
    assert_eq!(err.stage, Stage::Parse);
    assert!(err.to_string().contains("parse stage failed"), "{err}");
}

#[test]
fn bad_schema_is_attributed_to_the_parse_stage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema_path = dir.path().join("bad.schema");
    fs::write(&schema_path, "entity {").expect("bad fixture");
    let err = run(&config(&schema_path, &dir.path().join("generated")))
        .expect_err("invalid schema");
    assert_eq!(err.stage, Stage::Parse);
}

#[test]
fn entity_without_identity_fails_in_the_id_compare_stage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema_path = dir.path().join("note.schema");
    fs::write(&schema_path, "entity Note { text: string }").expect("fixture");
    let err = run(&config(&schema_path, &dir.path().join("generated")))
        .expect_err("no identity fields");
    assert_eq!(err.stage, Stage::CompareId);
    assert!(err.to_string().contains("Note"), "{err}");
}
