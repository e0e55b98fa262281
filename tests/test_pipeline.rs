//! Integration tests for the incremental top-k evaluation pipeline

use rankbench::pipeline::*;
use rankbench::utils::{Level, RecordingDiagnostics};

#[path = "common/mod.rs"]
mod common;

use common::*;

fn pipeline<'a>(
    kmin: usize,
    kmax: usize,
    classifiers: &[&str],
    metrics: &[&str],
    diagnostics: &'a RecordingDiagnostics,
) -> EvaluationPipeline<'a> {
    let classifiers = ClassifierRegistry::default().resolve(classifiers, diagnostics);
    let metrics = Metric::resolve_all(metrics, diagnostics);
    EvaluationPipeline::new(EvaluationConfig::new(kmin, kmax, 5), classifiers, metrics, diagnostics)
}

#[test]
fn test_scenario_two_classifiers_two_metrics() {
    let df = create_labelled_dataframe(100, 10, 7);
    let reduced = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_subset_files(&df, reduced.path(), "InfoGain", 1..=10);

    let diag = RecordingDiagnostics::new();
    let outcomes = pipeline(1, 3, &["NB", "C4.5"], &["accuracy", "F1"], &diag)
        .run_all(reduced.path(), out.path())
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].evaluated, vec![1, 2, 3]);
    assert!(outcomes[0].succeeded());
    for metric in ["accuracy", "F1"] {
        let path = out.path().join(format!("InfoGain_{}.csv", metric));
        let (header, rows) = read_result_table(&path);
        assert_eq!(header, vec!["#ofAttributes", "NB", "C4.5", "average"]);
        assert_eq!(rows.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
    assert!(!diag.has_errors());
}

#[test]
fn test_average_column_is_mean_of_classifiers() {
    let df = create_labelled_dataframe(60, 4, 11);
    let reduced = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_subset_files(&df, reduced.path(), "ReliefF", 1..=4);

    let diag = RecordingDiagnostics::new();
    pipeline(1, 4, &["NB", "KNN3", "LR"], &["accuracy", "kappa", "AUROC"], &diag)
        .run_all(reduced.path(), out.path())
        .unwrap();

    for metric in ["accuracy", "kappa", "AUROC"] {
        let (_, rows) = read_result_table(&out.path().join(format!("ReliefF_{}.csv", metric)));
        assert_eq!(rows.len(), 4);
        for (_, values) in rows {
            let (average, per_classifier) = values.split_last().unwrap();
            let mean = per_classifier.iter().sum::<f64>() / per_classifier.len() as f64;
            assert!((average - mean).abs() < 1e-9, "{} vs {}", average, mean);
        }
    }
}

#[test]
fn test_missing_subset_stops_the_loop_quietly() {
    let df = create_labelled_dataframe(50, 5, 3);
    let reduced = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_subset_files(&df, reduced.path(), "GainRatio", 1..=3);

    let diag = RecordingDiagnostics::new();
    let outcomes = pipeline(1, 5, &["NB"], &["accuracy"], &diag)
        .run_all(reduced.path(), out.path())
        .unwrap();

    assert_eq!(outcomes[0].evaluated, vec![1, 2, 3]);
    assert_eq!(outcomes[0].stopped_at, Some(4));
    assert!(outcomes[0].aborted.is_none());
    assert!(!diag.has_errors());

    let (header, rows) = read_result_table(&out.path().join("GainRatio_accuracy.csv"));
    assert_eq!(header.len(), 3);
    assert_eq!(rows.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_no_rows_when_first_subset_is_missing() {
    let df = create_labelled_dataframe(50, 5, 3);
    let reduced = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_subset_files(&df, reduced.path(), "InfoGain", 1..=2);

    let diag = RecordingDiagnostics::new();
    let outcomes = pipeline(3, 5, &["NB"], &["accuracy"], &diag)
        .run_all(reduced.path(), out.path())
        .unwrap();

    assert!(outcomes[0].evaluated.is_empty());
    let (header, rows) = read_result_table(&out.path().join("InfoGain_accuracy.csv"));
    assert_eq!(header, vec!["#ofAttributes", "NB", "average"]);
    assert!(rows.is_empty());
}

#[test]
fn test_unknown_metric_gets_no_table() {
    let df = create_labelled_dataframe(40, 3, 5);
    let reduced = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_subset_files(&df, reduced.path(), "InfoGain", 1..=2);

    let diag = RecordingDiagnostics::new();
    let outcomes = pipeline(1, 2, &["NB"], &["accuracy", "bogus"], &diag)
        .run_all(reduced.path(), out.path())
        .unwrap();

    assert!(out.path().join("InfoGain_accuracy.csv").is_file());
    assert!(!out.path().join("InfoGain_bogus.csv").exists());
    assert_eq!(outcomes[0].tables.len(), 1);
    let warnings = diag.messages_at(Level::Warn);
    assert!(warnings.iter().any(|w| w.contains("bogus")));
}

#[test]
fn test_repeated_runs_write_identical_tables() {
    let df = create_labelled_dataframe(80, 4, 21);
    let reduced = tempfile::tempdir().unwrap();
    write_subset_files(&df, reduced.path(), "InfoGain", 1..=4);

    let mut contents = Vec::new();
    for _ in 0..2 {
        let out = tempfile::tempdir().unwrap();
        let diag = RecordingDiagnostics::new();
        pipeline(1, 4, &["NB", "C4.5", "RF", "SMO"], &["accuracy", "matthewcoef"], &diag)
            .run_all(reduced.path(), out.path())
            .unwrap();
        contents.push((
            std::fs::read_to_string(out.path().join("InfoGain_accuracy.csv")).unwrap(),
            std::fs::read_to_string(out.path().join("InfoGain_matthewcoef.csv")).unwrap(),
        ));
    }
    assert_eq!(contents[0], contents[1]);
}

#[test]
fn test_table_write_failure_is_isolated() {
    let df = create_labelled_dataframe(40, 3, 9);
    let reduced = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_subset_files(&df, reduced.path(), "AAA", 1..=2);
    write_subset_files(&df, reduced.path(), "BBB", 1..=2);
    // a directory where AAA's accuracy table should go
    std::fs::create_dir(out.path().join("AAA_accuracy.csv")).unwrap();

    let diag = RecordingDiagnostics::new();
    let outcomes = pipeline(1, 2, &["NB"], &["accuracy", "F1"], &diag)
        .run_all(reduced.path(), out.path())
        .unwrap();

    assert_eq!(outcomes[0].method, "AAA");
    assert_eq!(outcomes[0].failed_tables, vec!["accuracy"]);
    assert_eq!(outcomes[0].evaluated, vec![1, 2]);
    assert_eq!(read_result_table(&out.path().join("AAA_F1.csv")).1.len(), 2);

    assert!(outcomes[1].succeeded());
    assert_eq!(read_result_table(&out.path().join("BBB_accuracy.csv")).1.len(), 2);
    assert!(diag.has_errors());
}

#[test]
fn test_too_many_folds_aborts_only_that_method() {
    let df = create_labelled_dataframe(4, 2, 1);
    let reduced = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_subset_files(&df, reduced.path(), "InfoGain", 1..=2);

    let diag = RecordingDiagnostics::new();
    let outcomes = pipeline(1, 2, &["NB"], &["accuracy"], &diag)
        .run_all(reduced.path(), out.path())
        .unwrap();

    assert!(outcomes[0].aborted.is_some());
    assert!(outcomes[0].evaluated.is_empty());
    assert!(diag.has_errors());
}
