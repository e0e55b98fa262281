//! Entropy-based scorers: information gain and gain ratio with respect to
//! the class, over MDL-discretised features

use rayon::prelude::*;

use super::{discretize, entropy, FeatureScorer};
use crate::pipeline::dataset::{Dataset, Feature};
use crate::pipeline::error::BenchResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct InfoGainScorer;

#[derive(Debug, Clone, Copy, Default)]
pub struct GainRatioScorer;

/// Class entropy, conditional entropy and split entropy of one feature.
struct EntropyTerms {
    class: f64,
    conditional: f64,
    split: f64,
}

fn entropy_terms(feature: &Feature, data: &Dataset) -> EntropyTerms {
    let k = data.num_classes();
    let bins = discretize(feature, data.labels(), k);
    let num_bins = bins.iter().copied().max().map_or(0, |m| m + 1);

    let mut table = vec![vec![0.0; k]; num_bins];
    let mut class_totals = vec![0.0; k];
    for (&bin, &label) in bins.iter().zip(data.labels()) {
        table[bin][label] += 1.0;
        class_totals[label] += 1.0;
    }

    let n = data.num_rows() as f64;
    let bin_totals: Vec<f64> = table.iter().map(|row| row.iter().sum()).collect();
    let conditional = table
        .iter()
        .zip(&bin_totals)
        .filter(|(_, &t)| t > 0.0)
        .map(|(row, &t)| t / n * entropy(row))
        .sum();

    EntropyTerms {
        class: entropy(&class_totals),
        conditional,
        split: entropy(&bin_totals),
    }
}

impl FeatureScorer for InfoGainScorer {
    fn score(&self, data: &Dataset) -> BenchResult<Vec<f64>> {
        Ok(data
            .features()
            .par_iter()
            .map(|f| {
                let t = entropy_terms(f, data);
                (t.class - t.conditional).max(0.0)
            })
            .collect())
    }
}

impl FeatureScorer for GainRatioScorer {
    fn score(&self, data: &Dataset) -> BenchResult<Vec<f64>> {
        Ok(data
            .features()
            .par_iter()
            .map(|f| {
                let t = entropy_terms(f, data);
                if t.split > 0.0 {
                    (t.class - t.conditional).max(0.0) / t.split
                } else {
                    0.0
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Dataset {
        let labels: Vec<usize> = (0..40).map(|i| usize::from(i >= 20)).collect();
        let signal: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let constant = vec![1.0; 40];
        let colour: Vec<Option<&str>> = (0..40)
            .map(|i| Some(if i >= 20 { "red" } else { "blue" }))
            .collect();
        Dataset::new(
            vec![
                Feature::numeric("signal", signal),
                Feature::numeric("constant", constant),
                Feature::categorical("colour", &colour),
            ],
            "class",
            vec!["a".into(), "b".into()],
            labels,
        )
        .unwrap()
    }

    #[test]
    fn test_info_gain_separates_signal_from_constant() {
        let scores = InfoGainScorer.score(&data()).unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-9);
        assert_eq!(scores[1], 0.0);
        assert!((scores[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_gain_ratio_is_zero_without_split_information() {
        let scores = GainRatioScorer.score(&data()).unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-9);
        assert_eq!(scores[1], 0.0);
    }
}
