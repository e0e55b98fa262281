//! Recursive feature elimination with a linear SVM
//!
//! A linear SVM is refitted on the surviving features each round and the
//! features with the smallest squared weights are eliminated. While more than
//! `threshold_percent` of the original features survive, `eliminate_percent`
//! of the survivors go per round; after that one feature goes per round. A
//! feature's score is its elimination position: the first feature removed
//! scores 0, the last survivor scores `n - 1`.

use super::FeatureScorer;
use crate::pipeline::classifiers::{InputEncoder, LinearSvm};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::error::BenchResult;

#[derive(Debug, Clone, Copy)]
pub struct SvmRfeScorer {
    pub solver: LinearSvm,
    pub eliminate_percent: usize,
    pub threshold_percent: usize,
}

impl Default for SvmRfeScorer {
    fn default() -> Self {
        Self {
            solver: LinearSvm::default(),
            eliminate_percent: 10,
            threshold_percent: 10,
        }
    }
}

impl SvmRfeScorer {
    /// Number of features to drop in the next round.
    fn step(&self, remaining: usize, original: usize) -> usize {
        let threshold = original * self.threshold_percent / 100;
        if remaining > threshold {
            (remaining * self.eliminate_percent / 100).max(1)
        } else {
            1
        }
    }

    /// Sum of squared hyperplane weights per active feature.
    fn feature_weights(
        &self,
        encoded: &[Vec<f64>],
        sources: &[usize],
        active: &[usize],
        data: &Dataset,
    ) -> Vec<f64> {
        let columns: Vec<usize> = (0..sources.len())
            .filter(|&j| active.contains(&sources[j]))
            .collect();
        let x: Vec<Vec<f64>> = encoded
            .iter()
            .map(|row| columns.iter().map(|&j| row[j]).collect())
            .collect();
        let planes = self
            .solver
            .fit_classes(&x, data.labels(), data.num_classes());

        let mut weights = vec![0.0; active.len()];
        for plane in &planes {
            for (w, &j) in plane.weights.iter().zip(&columns) {
                if let Some(pos) = active.iter().position(|&f| f == sources[j]) {
                    weights[pos] += w * w;
                }
            }
        }
        weights
    }
}

impl FeatureScorer for SvmRfeScorer {
    fn score(&self, data: &Dataset) -> BenchResult<Vec<f64>> {
        let n = data.num_features();
        let rows = data.all_rows();
        let encoder = InputEncoder::fit(data, &rows);
        let encoded = encoder.encode_rows(data, &rows);
        let sources = encoder.source_features();

        let mut active: Vec<usize> = (0..n).collect();
        let mut scores = vec![0.0; n];
        let mut position = 0usize;

        while active.len() > 1 {
            let weights = self.feature_weights(&encoded, &sources, &active, data);
            let mut order: Vec<usize> = (0..active.len()).collect();
            order.sort_by(|&a, &b| {
                weights[a]
                    .partial_cmp(&weights[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });

            let count = self.step(active.len(), n).min(active.len() - 1);
            let mut dropped: Vec<usize> = order[..count].to_vec();
            for &slot in &dropped {
                scores[active[slot]] = position as f64;
                position += 1;
            }
            dropped.sort_unstable();
            for slot in dropped.into_iter().rev() {
                active.remove(slot);
            }
        }
        if let Some(&last) = active.first() {
            scores[last] = position as f64;
        }
        Ok(scores)
    }
}
