//! JSON export of an evaluation run

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::evaluation::{EvaluationConfig, MethodOutcome};

pub const SUMMARY_FILE: &str = "evaluation_summary.json";

/// Metadata about the evaluation run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub rankbench_version: String,
    pub reduced_dir: String,
    pub output_dir: String,
    pub config: EvaluationConfig,
    pub classifiers: Vec<String>,
    pub metrics: Vec<String>,
}

/// Per-method outcome without the in-memory tables
#[derive(Serialize)]
pub struct MethodSummary<'a> {
    pub method: &'a str,
    pub evaluated_k: &'a [usize],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<usize>,
    pub failed_tables: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<&'a str>,
}

#[derive(Serialize)]
pub struct EvaluationExport<'a> {
    pub metadata: RunMetadata,
    pub methods: Vec<MethodSummary<'a>>,
}

/// Parameters describing the run being exported
pub struct RunParams<'a> {
    pub reduced_dir: &'a Path,
    pub output_dir: &'a Path,
    pub config: EvaluationConfig,
    pub classifiers: Vec<String>,
    pub metrics: Vec<String>,
}

/// Write `<output dir>/evaluation_summary.json`.
pub fn export_run_summary(outcomes: &[MethodOutcome], params: RunParams) -> Result<PathBuf> {
    let export = EvaluationExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            rankbench_version: env!("CARGO_PKG_VERSION").to_string(),
            reduced_dir: params.reduced_dir.display().to_string(),
            output_dir: params.output_dir.display().to_string(),
            config: params.config,
            classifiers: params.classifiers,
            metrics: params.metrics,
        },
        methods: outcomes
            .iter()
            .map(|o| MethodSummary {
                method: &o.method,
                evaluated_k: &o.evaluated,
                stopped_at: o.stopped_at,
                failed_tables: &o.failed_tables,
                aborted: o.aborted.as_deref(),
            })
            .collect(),
    };

    let path = params.output_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&export).context("Failed to serialize run summary")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write run summary: {}", path.display()))?;
    Ok(path)
}
