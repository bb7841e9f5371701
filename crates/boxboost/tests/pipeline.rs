//! End-to-end pipeline tests on CSV files written to a temporary directory.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use boxboost::data::{FeatureTable, OCCLUSION};
use boxboost::data::io::{load_csv, DatasetLoadError};
use boxboost::model::ClassifierConfig;
use boxboost::pipeline::{train_from_csv, train_on_table, PipelineError, PipelineOptions};
use boxboost::testing::synthetic_detections;
use boxboost::{augment_with_occlusion, Parallelism};

// =============================================================================
// Helpers
// =============================================================================

/// Write `table` as CSV with a leading unnamed index column.
fn write_indexed_csv(table: &FeatureTable, path: &Path) {
    let mut out = String::new();
    for name in table.column_names() {
        write!(out, ",{name}").unwrap();
    }
    out.push('\n');
    for row in 0..table.n_rows() {
        write!(out, "{row}").unwrap();
        for column in table.columns() {
            write!(out, ",{}", column.values()[row]).unwrap();
        }
        out.push('\n');
    }
    fs::write(path, out).unwrap();
}

fn fixture_csv(dir: &tempfile::TempDir) -> (PathBuf, FeatureTable) {
    let table = synthetic_detections(80, 5, 21);
    let path = dir.path().join("detections.csv");
    write_indexed_csv(&table, &path);
    (path, table)
}

fn quick_options() -> PipelineOptions {
    PipelineOptions {
        config: ClassifierConfig::builder().n_trees(15).scale_pos_weight(1.0).build().unwrap(),
        ..Default::default()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn csv_round_trips_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let (path, table) = fixture_csv(&dir);

    let loaded = load_csv(&path, &PipelineOptions::default().csv).unwrap();
    assert_eq!(loaded, table);
}

#[test]
fn train_from_csv_evaluates_on_held_out_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (path, table) = fixture_csv(&dir);

    let outcome = train_from_csv(&path, &quick_options()).unwrap();

    assert_eq!(outcome.split.test.len(), (table.n_rows() as f64 * 0.2).ceil() as usize);
    assert_eq!(outcome.report.confusion.total(), outcome.split.test.len() as u64);
    assert!(outcome.report.accuracy > 0.6, "accuracy {}", outcome.report.accuracy);
    assert!(outcome.report.auc > 0.6, "auc {}", outcome.report.auc);

    let features = &outcome.artifacts.training_features;
    assert_eq!(features.n_rows(), table.n_rows());
    assert!(features.feature_names().iter().any(|n| n == OCCLUSION));
}

#[test]
fn same_seed_same_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = fixture_csv(&dir);

    let a = train_from_csv(&path, &quick_options()).unwrap();
    let b = train_from_csv(&path, &quick_options()).unwrap();
    assert_eq!(a.split, b.split);
    assert_eq!(a.artifacts, b.artifacts);
    assert_eq!(a.report, b.report);
}

#[test]
fn custom_training_uses_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let (path, table) = fixture_csv(&dir);

    let loaded = load_csv(&path, &PipelineOptions::default().csv).unwrap();
    let augmented = augment_with_occlusion(&loaded, Parallelism::Parallel).unwrap();
    let config = ClassifierConfig::builder().n_trees(5).build().unwrap();
    let artifacts = train_on_table(&augmented, &config).unwrap();

    assert_eq!(artifacts.training_features.n_rows(), table.n_rows());
    assert_eq!(artifacts.model.n_trees(), 5);
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = train_from_csv(dir.path().join("absent.csv"), &quick_options()).unwrap_err();
    assert!(matches!(err, PipelineError::Load(DatasetLoadError::Io(_))));
}
