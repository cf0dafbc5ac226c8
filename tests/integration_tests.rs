//! Integration tests for the complete relabeling pipeline
//!
//! These tests run the library crates together against files on disk:
//! - mapping JSON → `LabelMapping`
//! - `LabelMapping` + triple file → relabeled triple file
//!
//! Run with: cargo test --test integration_tests

use std::fs;
use tempfile::tempdir;
use triplabel_mapping::{load_label_mapping, MappingError, MappingKind};
use triplabel_transcode::{transcode_file, TranscodeError};

// ============================================================================
// Mapping JSON → triple files
// ============================================================================

#[test]
fn test_new_york_located_in() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("entities.json"),
        r#"{"E1": {"label": "New York"}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("relations.json"),
        r#"{"R1": {"label": "located in"}}"#,
    )
    .unwrap();
    fs::write(dir.path().join("train.txt"), "E1\tR1\tE2\n").unwrap();

    let entities = load_label_mapping(&dir.path().join("entities.json"), MappingKind::Entity).unwrap();
    let relations =
        load_label_mapping(&dir.path().join("relations.json"), MappingKind::Relation).unwrap();

    let report = transcode_file(
        &dir.path().join("train.txt"),
        &dir.path().join("train_mapped.txt"),
        &entities,
        &relations,
        |_| {},
    )
    .unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("train_mapped.txt")).unwrap(),
        "New/York\tlocated/in\tE2\n"
    );
    assert_eq!(report.stats.processed, 1);
    assert_eq!(report.stats.missing_entities.len(), 1);
    assert!(report.stats.missing_entities.contains("E2"));
    assert!(report.stats.missing_relations.is_empty());
}

#[test]
fn test_output_rows_follow_input_order() {
    let dir = tempdir().unwrap();
    let entities_path = dir.path().join("entities.json");
    let relations_path = dir.path().join("relations.json");
    fs::write(
        &entities_path,
        r#"{"/m/01": {"label": "Barack Obama"}, "/m/02": {"label": "Honolulu"}, "/m/03": {}}"#,
    )
    .unwrap();
    fs::write(
        &relations_path,
        r#"{"/people/person/place_of_birth": {"label": "place of birth"}}"#,
    )
    .unwrap();

    let input = "/m/01\t/people/person/place_of_birth\t/m/02\n\
                 \n\
                 /m/03\t/people/person/place_of_birth\t/m/02\n\
                 broken line\n\
                 /m/02\t/location/contains\t/m/01\n";
    fs::write(dir.path().join("valid.txt"), input).unwrap();

    let entities = load_label_mapping(&entities_path, MappingKind::Entity).unwrap();
    let relations = load_label_mapping(&relations_path, MappingKind::Relation).unwrap();
    let report = transcode_file(
        &dir.path().join("valid.txt"),
        &dir.path().join("valid_mapped.txt"),
        &entities,
        &relations,
        |_| {},
    )
    .unwrap();

    let output = fs::read_to_string(dir.path().join("valid_mapped.txt")).unwrap();
    let rows: Vec<&str> = output.lines().collect();
    assert_eq!(
        rows,
        vec![
            "Barack/Obama\tplace/of/birth\tHonolulu",
            "/m/03\tplace/of/birth\tHonolulu",
            "Honolulu\t/location/contains\tBarack/Obama",
        ]
    );

    let non_empty = input.lines().filter(|l| !l.trim().is_empty()).count();
    assert_eq!(rows.len(), non_empty - report.stats.malformed);
    assert_eq!(report.stats.malformed_examples[0].line_number, 4);
    // Present without a label: resolves to itself and is not "missing".
    assert!(!report.stats.missing_entities.contains("/m/03"));
    assert!(report.stats.missing_relations.contains("/location/contains"));
}

#[test]
fn test_fatal_errors_name_their_file() {
    let dir = tempdir().unwrap();
    let entities_path = dir.path().join("entities.json");

    let err = load_label_mapping(&entities_path, MappingKind::Entity).unwrap_err();
    assert!(matches!(err, MappingError::NotFound { .. }));
    assert!(err.to_string().contains(&entities_path.display().to_string()));

    fs::write(&entities_path, "{}").unwrap();
    let entities = load_label_mapping(&entities_path, MappingKind::Entity).unwrap();
    let relations = triplabel_mapping::LabelMapping::new(MappingKind::Relation);
    let input = dir.path().join("test.txt");
    let err = transcode_file(
        &input,
        &dir.path().join("test_mapped.txt"),
        &entities,
        &relations,
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, TranscodeError::InputNotFound { .. }));
    assert!(err.to_string().contains(&input.display().to_string()));
}

#[test]
fn test_report_serializes_flat() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("t.txt"), "a\tb\tc\nx\ty\n").unwrap();
    let entities = triplabel_mapping::LabelMapping::from_pairs(MappingKind::Entity, [("a", "A a")]);
    let relations = triplabel_mapping::LabelMapping::new(MappingKind::Relation);

    let report = transcode_file(
        &dir.path().join("t.txt"),
        &dir.path().join("t_mapped.txt"),
        &entities,
        &relations,
        |_| {},
    )
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["processed"], 1);
    assert_eq!(json["malformed"], 1);
    assert_eq!(json["malformed_examples"][0]["line_number"], 2);
    assert_eq!(json["missing_entities"], serde_json::json!(["c"]));
    assert_eq!(json["missing_relations"], serde_json::json!(["b"]));
}
