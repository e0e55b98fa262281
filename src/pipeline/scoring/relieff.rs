//! ReliefF instance-based feature weighting
//!
//! Every instance is used as a sample. For each sample the nearest hits
//! (same class) and nearest misses (each other class, weighted by class
//! prior) are found under the summed per-feature difference, and each
//! feature's weight moves by how well it separates the sample from them.
//! Per-sample contributions are computed in parallel and summed in sample
//! order, so the result does not depend on thread scheduling.

use rayon::prelude::*;

use super::FeatureScorer;
use crate::pipeline::dataset::Dataset;
use crate::pipeline::error::BenchResult;

#[derive(Debug, Clone, Copy)]
pub struct ReliefFScorer {
    pub neighbours: usize,
}

impl Default for ReliefFScorer {
    fn default() -> Self {
        Self { neighbours: 10 }
    }
}

/// Per-feature normalisation used by the difference function.
struct DiffContext<'a> {
    data: &'a Dataset,
    /// `max - min` of each numeric feature, `None` for categorical
    ranges: Vec<Option<f64>>,
}

impl<'a> DiffContext<'a> {
    fn new(data: &'a Dataset) -> Self {
        let ranges = data
            .features()
            .iter()
            .map(|f| {
                if f.is_categorical() {
                    return None;
                }
                let (lo, hi) = f
                    .values
                    .iter()
                    .filter(|v| !v.is_nan())
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                Some(if hi > lo { hi - lo } else { 0.0 })
            })
            .collect();
        Self { data, ranges }
    }

    fn diff(&self, feature: usize, a: usize, b: usize) -> f64 {
        let f = self.data.feature(feature);
        match (f.value(a), f.value(b)) {
            (Some(x), Some(y)) => match self.ranges[feature] {
                None => {
                    if x == y {
                        0.0
                    } else {
                        1.0
                    }
                }
                Some(range) if range > 0.0 => ((x - y).abs() / range).min(1.0),
                Some(_) => 0.0,
            },
            // unknown cells count as the expected difference of a random pair
            _ => match self.ranges[feature] {
                None if !f.levels.is_empty() => 1.0 - 1.0 / f.levels.len() as f64,
                _ => 0.5,
            },
        }
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        (0..self.data.num_features()).map(|f| self.diff(f, a, b)).sum()
    }
}

impl ReliefFScorer {
    fn contribution(&self, ctx: &DiffContext, priors: &[f64], sample: usize) -> Vec<f64> {
        let data = ctx.data;
        let m = data.num_features();
        let k = data.num_classes();
        let own = data.label(sample);

        let mut by_class: Vec<Vec<(f64, usize)>> = vec![Vec::new(); k];
        for other in 0..data.num_rows() {
            if other != sample {
                by_class[data.label(other)].push((ctx.distance(sample, other), other));
            }
        }

        let mut weights = vec![0.0; m];
        // a sample without any hit would only add miss terms
        if by_class[own].is_empty() {
            return weights;
        }
        let miss_norm = 1.0 - priors[own];
        for (class, candidates) in by_class.iter_mut().enumerate() {
            if candidates.is_empty() {
                continue;
            }
            candidates.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            });
            let nearest = &candidates[..self.neighbours.min(candidates.len())];
            let factor = if class == own {
                -1.0
            } else if miss_norm > 0.0 {
                priors[class] / miss_norm
            } else {
                0.0
            };
            let scale = factor / nearest.len() as f64;
            for (f, w) in weights.iter_mut().enumerate() {
                let total: f64 = nearest.iter().map(|&(_, r)| ctx.diff(f, sample, r)).sum();
                *w += scale * total;
            }
        }
        weights
    }
}

impl FeatureScorer for ReliefFScorer {
    fn score(&self, data: &Dataset) -> BenchResult<Vec<f64>> {
        let n = data.num_rows();
        let m = data.num_features();
        if n == 0 {
            return Ok(vec![0.0; m]);
        }

        let ctx = DiffContext::new(data);
        let priors: Vec<f64> = data
            .class_counts(&data.all_rows())
            .iter()
            .map(|&c| c as f64 / n as f64)
            .collect();

        let contributions: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|sample| self.contribution(&ctx, &priors, sample))
            .collect();

        let mut weights = vec![0.0; m];
        for c in &contributions {
            for (w, v) in weights.iter_mut().zip(c) {
                *w += v;
            }
        }
        Ok(weights.into_iter().map(|w| w / n as f64).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::dataset::Feature;

    #[test]
    fn test_relevant_feature_outweighs_noise() {
        let labels: Vec<usize> = (0..30).map(|i| usize::from(i >= 15)).collect();
        let signal: Vec<f64> = labels.iter().map(|&l| l as f64 * 10.0).collect();
        let noise: Vec<f64> = (0..30).map(|i| ((i * 7) % 11) as f64).collect();
        let data = Dataset::new(
            vec![Feature::numeric("noise", noise), Feature::numeric("signal", signal)],
            "class",
            vec!["a".into(), "b".into()],
            labels,
        )
        .unwrap();

        let scores = ReliefFScorer::default().score(&data).unwrap();
        assert!(scores[1] > scores[0]);
        assert!((scores[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_column_scores_zero_with_singleton_class() {
        let labels = vec![0, 0, 0, 1, 1, 1, 2];
        let signal: Vec<f64> = labels.iter().map(|&l| l as f64).collect();
        let empty = vec![f64::NAN; labels.len()];
        let data = Dataset::new(
            vec![Feature::numeric("signal", signal), Feature::numeric("empty", empty)],
            "class",
            vec!["a".into(), "b".into(), "c".into()],
            labels,
        )
        .unwrap();

        let scores = ReliefFScorer::default().score(&data).unwrap();
        assert!(scores[1].abs() < 1e-12, "empty column scored {}", scores[1]);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_scores_are_deterministic() {
        let labels: Vec<usize> = (0..20).map(|i| i % 3).collect();
        let a: Vec<f64> = (0..20).map(|i| (i * 3 % 7) as f64).collect();
        let b: Vec<f64> = (0..20).map(|i| (i % 3) as f64 + 0.1 * i as f64).collect();
        let data = Dataset::new(
            vec![Feature::numeric("a", a), Feature::numeric("b", b)],
            "class",
            vec!["x".into(), "y".into(), "z".into()],
            labels,
        )
        .unwrap();
        let scorer = ReliefFScorer::default();
        assert_eq!(scorer.score(&data).unwrap(), scorer.score(&data).unwrap());
    }
}
