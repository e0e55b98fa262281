//! Naive Bayes: Gaussian likelihoods for numeric features, Laplace-smoothed
//! frequencies for categorical ones. Missing cells are ignored.

use std::f64::consts::PI;

use super::{softmax, Classifier, TrainedModel};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::error::{BenchError, BenchResult};

/// Floor on per-class standard deviations
const MIN_STD: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveBayes;

#[derive(Debug, Clone)]
enum Likelihood {
    Gaussian { mean: Vec<f64>, std: Vec<f64> },
    /// `log_probs[class][level]`
    Frequencies { log_probs: Vec<Vec<f64>> },
}

#[derive(Debug, Clone)]
struct NaiveBayesModel {
    log_priors: Vec<f64>,
    likelihoods: Vec<Likelihood>,
}

impl Classifier for NaiveBayes {
    fn train(&self, data: &Dataset, rows: &[usize]) -> BenchResult<Box<dyn TrainedModel>> {
        if rows.is_empty() {
            return Err(BenchError::classifier("NB", "no training rows"));
        }
        let k = data.num_classes();
        let counts = data.class_counts(rows);
        let n = rows.len() as f64;
        let log_priors = counts
            .iter()
            .map(|&c| ((c as f64 + 1.0) / (n + k as f64)).ln())
            .collect();

        let likelihoods = data
            .features()
            .iter()
            .map(|feature| {
                if feature.is_categorical() {
                    let levels = feature.levels.len().max(1);
                    let mut freq = vec![vec![0.0; levels]; k];
                    let mut totals = vec![0.0; k];
                    for &r in rows {
                        if let Some(v) = feature.value(r) {
                            freq[data.label(r)][v as usize] += 1.0;
                            totals[data.label(r)] += 1.0;
                        }
                    }
                    let log_probs = freq
                        .into_iter()
                        .zip(totals)
                        .map(|(row, total)| {
                            row.into_iter()
                                .map(|f| ((f + 1.0) / (total + levels as f64)).ln())
                                .collect()
                        })
                        .collect();
                    Likelihood::Frequencies { log_probs }
                } else {
                    let mut sums = vec![0.0; k];
                    let mut squares = vec![0.0; k];
                    let mut seen = vec![0.0; k];
                    for &r in rows {
                        if let Some(v) = feature.value(r) {
                            let c = data.label(r);
                            sums[c] += v;
                            squares[c] += v * v;
                            seen[c] += 1.0;
                        }
                    }
                    let mean: Vec<f64> = (0..k)
                        .map(|c| if seen[c] > 0.0 { sums[c] / seen[c] } else { 0.0 })
                        .collect();
                    let std = (0..k)
                        .map(|c| {
                            if seen[c] > 0.0 {
                                let var = squares[c] / seen[c] - mean[c] * mean[c];
                                var.max(0.0).sqrt().max(MIN_STD)
                            } else {
                                1.0
                            }
                        })
                        .collect();
                    Likelihood::Gaussian { mean, std }
                }
            })
            .collect();

        Ok(Box::new(NaiveBayesModel {
            log_priors,
            likelihoods,
        }))
    }
}

impl TrainedModel for NaiveBayesModel {
    fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64> {
        let mut logits = self.log_priors.clone();
        for (feature, likelihood) in data.features().iter().zip(&self.likelihoods) {
            let Some(v) = feature.value(row) else {
                continue;
            };
            for (c, logit) in logits.iter_mut().enumerate() {
                *logit += match likelihood {
                    Likelihood::Gaussian { mean, std } => {
                        let z = (v - mean[c]) / std[c];
                        -0.5 * z * z - std[c].ln() - 0.5 * (2.0 * PI).ln()
                    }
                    Likelihood::Frequencies { log_probs } => {
                        log_probs[c].get(v as usize).copied().unwrap_or(0.0)
                    }
                };
            }
        }
        softmax(&logits)
    }
}
