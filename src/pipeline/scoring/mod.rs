//! Feature scoring methods
//!
//! Every scorer returns one relevance score per dataset feature, in feature
//! order; higher means more relevant. Ordering and tie handling are left to
//! the ranker.

mod discretize;
mod info_gain;
mod relieff;
mod svm_rfe;

pub use discretize::{discretize, mdl_cut_points};
pub use info_gain::{GainRatioScorer, InfoGainScorer};
pub use relieff::ReliefFScorer;
pub use svm_rfe::SvmRfeScorer;

use super::dataset::Dataset;
use super::error::BenchResult;

/// Scoring capability: a total, deterministic score over all features.
pub trait FeatureScorer: Send + Sync {
    fn score(&self, data: &Dataset) -> BenchResult<Vec<f64>>;
}

/// Shannon entropy in bits of a vector of (weighted) counts.
pub fn entropy(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    counts
        .iter()
        .filter(|&&c| c > 0.0)
        .map(|&c| {
            let p = c / total;
            -p * p.log2()
        })
        .sum()
}
