//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::DEFAULT_FOLD_SEED;

/// rankbench - Rank features and evaluate classifiers on growing top-k subsets
#[derive(Parser, Debug)]
#[command(name = "rankbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Only print warnings and errors
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Hide progress bars
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank the features of a dataset with one or more selection methods
    Rank {
        /// Input file: identifier column, label column, then features
        input: PathBuf,

        /// Directory receiving one `<method>.csv` ranking file per method
        output_dir: PathBuf,

        /// Comma-separated selection methods (InfoGain, GainRatio, ReliefF, SVMpRFE).
        /// Unknown names are ranked with InfoGain.
        #[arg(num_args = 1, value_delimiter = ',')]
        methods: Vec<String>,

        /// Field separator of the input file ("tab" or a single character)
        #[arg(long, default_value = ",", value_parser = parse_separator)]
        separator: u8,

        /// Seed of the permutation test for ranking agreement
        #[arg(long, default_value = "1")]
        agreement_seed: u64,
    },

    /// Cross-validate classifiers on top-k subsets and write one table per metric
    Evaluate {
        /// Directory with one subdirectory of `top<k>features_<method>.csv` files per method
        reduced_dir: PathBuf,

        /// Directory receiving `<method>_<metric>.csv` tables
        output_dir: PathBuf,

        /// Smallest feature count to evaluate
        #[arg(value_parser = parse_feature_count)]
        kmin: usize,

        /// Largest feature count to evaluate
        #[arg(value_parser = parse_feature_count)]
        kmax: usize,

        /// Number of cross-validation folds
        #[arg(value_parser = parse_num_folds)]
        num_folds: usize,

        /// Comma-separated classifiers (SMO, SVM, LR, KNN3, KNN5, NB, C4.5, RF)
        #[arg(required = true, num_args = 1, value_delimiter = ',')]
        classifiers: Vec<String>,

        /// Comma-separated metrics (accuracy, kappa, AUROC, sensitivity,
        /// specificity, F1, matthewcoef, precision)
        #[arg(required = true, num_args = 1, value_delimiter = ',')]
        metrics: Vec<String>,

        /// Field separator of the subset files
        #[arg(long, default_value = "tab", value_parser = parse_separator)]
        separator: u8,

        /// Seed of the fold partition
        #[arg(long, default_value_t = DEFAULT_FOLD_SEED)]
        seed: u64,
    },

    /// Write top-k subset files from a dataset and its ranking files
    Reduce {
        /// Input file: identifier column, label column, then features
        input: PathBuf,

        /// Directory containing `<method>.csv` ranking files
        rankings_dir: PathBuf,

        /// Directory receiving one subdirectory of subset files per method
        output_dir: PathBuf,

        /// Smallest feature count to write
        #[arg(value_parser = parse_feature_count)]
        kmin: usize,

        /// Largest feature count to write
        #[arg(value_parser = parse_feature_count)]
        kmax: usize,

        /// Field separator of the input file ("tab" or a single character)
        #[arg(long, default_value = ",", value_parser = parse_separator)]
        separator: u8,
    },
}

/// Validator for field separators: "tab", "\t" or a single ASCII character
fn parse_separator(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("separator must be a single ASCII character or 'tab', got '{}'", s)),
    }
}

/// Validator for kmin/kmax
fn parse_feature_count(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid feature count", s))?;
    if value == 0 {
        Err("feature counts start at 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for the fold count
fn parse_num_folds(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid fold count", s))?;
    if value < 2 {
        Err(format!("cross-validation needs at least 2 folds, got {}", value))
    } else {
        Ok(value)
    }
}
