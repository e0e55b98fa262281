//! Incremental top-k evaluation
//!
//! For one selection method, subsets of growing size k are loaded and
//! cross-validated, and one row per metric is appended to that metric's
//! table file. The loop stops at the first k without a subset file. Methods
//! are independent: a failure in one never touches another's tables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::aggregate::{rows_for, ResultTable};
use super::classifiers::ClassifierSpec;
use super::error::{BenchError, BenchResult};
use super::evaluator::CrossValidationEvaluator;
use super::folds::DEFAULT_FOLD_SEED;
use super::metrics::Metric;
use super::subset::SubsetBuilder;
use crate::report::table_file::{table_path, TableFile};
use crate::utils::{create_progress_bar, finish_with_success, finish_with_warning, Diagnostics};

/// Numeric settings of an evaluation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvaluationConfig {
    pub kmin: usize,
    pub kmax: usize,
    pub num_folds: usize,
    pub seed: u64,
}

impl EvaluationConfig {
    pub fn new(kmin: usize, kmax: usize, num_folds: usize) -> Self {
        Self {
            kmin,
            kmax,
            num_folds,
            seed: DEFAULT_FOLD_SEED,
        }
    }
}

/// What happened to one selection method
#[derive(Debug, Clone, Serialize)]
pub struct MethodOutcome {
    pub method: String,
    /// Feature counts with a written row, increasing
    pub evaluated: Vec<usize>,
    /// First k without a subset file, if the loop ended that way
    pub stopped_at: Option<usize>,
    /// Metrics whose table could not be written
    pub failed_tables: Vec<String>,
    /// Error that ended the loop early, if any
    pub aborted: Option<String>,
    pub tables: Vec<ResultTable>,
}

impl MethodOutcome {
    fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            evaluated: Vec::new(),
            stopped_at: None,
            failed_tables: Vec::new(),
            aborted: None,
            tables: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.aborted.is_none() && self.failed_tables.is_empty()
    }
}

/// An in-memory table together with its open file; the file is dropped on
/// the first write failure.
struct MetricSink {
    table: ResultTable,
    file: Option<TableFile>,
}

/// Runs the top-k loop for each selection method
pub struct EvaluationPipeline<'a> {
    config: EvaluationConfig,
    classifiers: Vec<ClassifierSpec>,
    metrics: Vec<Metric>,
    subsets: SubsetBuilder,
    diagnostics: &'a dyn Diagnostics,
    show_progress: bool,
}

impl<'a> EvaluationPipeline<'a> {
    pub fn new(
        config: EvaluationConfig,
        classifiers: Vec<ClassifierSpec>,
        metrics: Vec<Metric>,
        diagnostics: &'a dyn Diagnostics,
    ) -> Self {
        Self {
            config,
            classifiers,
            metrics,
            subsets: SubsetBuilder::default(),
            diagnostics,
            show_progress: false,
        }
    }

    pub fn with_subsets(mut self, subsets: SubsetBuilder) -> Self {
        self.subsets = subsets;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn classifier_names(&self) -> Vec<String> {
        self.classifiers.iter().map(|c| c.name.clone()).collect()
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Evaluate every method subdirectory of `reduced_dir`, in name order.
    pub fn run_all(&self, reduced_dir: &Path, output_dir: &Path) -> BenchResult<Vec<MethodOutcome>> {
        let methods = method_directories(reduced_dir)?;
        fs::create_dir_all(output_dir).map_err(|e| BenchError::write(output_dir, e))?;
        if methods.is_empty() {
            self.diagnostics.warn(&format!(
                "No selection method directories found in {}",
                reduced_dir.display()
            ));
        }
        Ok(methods
            .iter()
            .map(|(method, dir)| self.run_method(dir, method, output_dir))
            .collect())
    }

    /// Evaluate one method whose subset files live in `method_dir`.
    pub fn run_method(&self, method_dir: &Path, method: &str, output_dir: &Path) -> MethodOutcome {
        let mut outcome = MethodOutcome::new(method);
        let classifier_names = self.classifier_names();
        let mut sinks: Vec<MetricSink> = self
            .metrics
            .iter()
            .map(|&metric| {
                let table = ResultTable::new(metric, classifier_names.clone());
                let file = match TableFile::create(table_path(output_dir, method, metric), &table.header()) {
                    Ok(file) => Some(file),
                    Err(e) => {
                        self.diagnostics.error(&format!("{} / {}: {}", method, metric, e));
                        outcome.failed_tables.push(metric.to_string());
                        None
                    }
                };
                MetricSink { table, file }
            })
            .collect();

        let EvaluationConfig { kmin, kmax, .. } = self.config;
        let span = (kmax + 1).saturating_sub(kmin) as u64;
        let pb = create_progress_bar(span, method, self.show_progress);
        let evaluator = CrossValidationEvaluator::new(self.diagnostics).with_seed(self.config.seed);

        for k in kmin..=kmax {
            let subset = match self.subsets.subset_for(method_dir, method, k) {
                Ok(Some(subset)) => subset,
                Ok(None) => {
                    self.diagnostics.info(&format!(
                        "{}: no subset with {} features, stopping",
                        method, k
                    ));
                    outcome.stopped_at = Some(k);
                    break;
                }
                Err(e) => {
                    self.abort(&mut outcome, k, e);
                    break;
                }
            };

            let results = match evaluator.evaluate(&subset, self.config.num_folds, &self.classifiers, &self.metrics) {
                Ok(results) => results,
                Err(e) => {
                    self.abort(&mut outcome, k, e);
                    break;
                }
            };

            for ((metric, row), sink) in rows_for(k, &results).into_iter().zip(sinks.iter_mut()) {
                let line = match sink.table.append(row) {
                    Ok(row) => row.format(),
                    Err(e) => {
                        self.diagnostics.error(&format!("{} / {} at k = {}: {}", method, metric, k, e));
                        continue;
                    }
                };
                if let Some(file) = sink.file.as_mut() {
                    if let Err(e) = file.append_line(&line) {
                        self.diagnostics.error(&format!("{} / {} at k = {}: {}", method, metric, k, e));
                        outcome.failed_tables.push(metric.to_string());
                        sink.file = None;
                    }
                }
            }
            outcome.evaluated.push(k);
            pb.inc(1);
        }

        let summary = format!("{}: {} subset size(s) evaluated", method, outcome.evaluated.len());
        if outcome.succeeded() {
            finish_with_success(&pb, &summary);
        } else {
            finish_with_warning(&pb, &summary);
        }
        outcome.tables = sinks.into_iter().map(|s| s.table).collect();
        outcome
    }

    fn abort(&self, outcome: &mut MethodOutcome, k: usize, error: BenchError) {
        self.diagnostics
            .error(&format!("{} at k = {}: {}", outcome.method, k, error));
        outcome.aborted = Some(error.to_string());
    }
}

/// Subdirectories of `reduced_dir` as (method name, path), sorted by name.
pub fn method_directories(reduced_dir: &Path) -> BenchResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(reduced_dir).map_err(|e| BenchError::load(reduced_dir, e))?;
    let mut methods = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BenchError::load(reduced_dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            methods.push((entry.file_name().to_string_lossy().into_owned(), path));
        }
    }
    methods.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(methods)
}
