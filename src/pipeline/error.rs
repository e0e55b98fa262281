//! Error types for ranking and evaluation.
//!
//! Each variant corresponds to one failure class of the benchmark. A missing
//! top-k subset file is deliberately absent: it ends a method's k-loop and is
//! signalled with `Ok(None)` instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the ranking and evaluation pipeline.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The source file could not be read or parsed into a dataset.
    #[error("failed to load dataset from {path}: {message}")]
    Load {
        /// File that failed to load
        path: PathBuf,
        /// Underlying reason
        message: String,
    },

    /// A scoring method could not produce a ranking.
    #[error("feature selection '{method}' failed: {message}")]
    Selection { method: String, message: String },

    /// An output file could not be opened, appended to or flushed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested fold count cannot partition the dataset.
    #[error("cannot build {folds} folds over {rows} rows")]
    InvalidFolds { folds: usize, rows: usize },

    /// A classifier failed to train or predict.
    #[error("classifier '{classifier}' failed: {message}")]
    Classifier { classifier: String, message: String },

    /// A result row would break the strictly increasing k order of a table.
    #[error("row for k = {k} cannot follow k = {last} in the '{metric}' table")]
    RowOrder { metric: String, last: usize, k: usize },

    /// A ranking file did not follow the `attributeName,score` layout.
    #[error("malformed ranking file {path}: {message}")]
    RankingFormat { path: PathBuf, message: String },
}

impl BenchError {
    pub fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        BenchError::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn selection(method: &str, message: impl ToString) -> Self {
        BenchError::Selection {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Write {
            path: path.into(),
            source,
        }
    }

    pub fn classifier(classifier: &str, message: impl ToString) -> Self {
        BenchError::Classifier {
            classifier: classifier.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result alias for pipeline operations.
pub type BenchResult<T> = std::result::Result<T, BenchError>;
