//! Linear support vector machine
//!
//! Binary problems are solved with dual coordinate descent for the L1-loss
//! soft-margin SVM (bias folded in as a constant input). Rows are visited in
//! a fixed order, so training is deterministic. More than two classes are
//! handled one-vs-rest; decision values are turned into a distribution with
//! a logistic (binary) or softmax (multi-class) link.

use super::{softmax, Classifier, InputEncoder, TrainedModel};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::error::{BenchError, BenchResult};

/// Binary linear SVM solver
#[derive(Debug, Clone, Copy)]
pub struct LinearSvm {
    pub c: f64,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-3,
        }
    }
}

/// Weights of a trained binary separator
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperplane {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl Hyperplane {
    pub fn decision(&self, x: &[f64]) -> f64 {
        self.weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + self.bias
    }
}

impl LinearSvm {
    /// Fit a separator for targets `y` in {-1, +1}.
    pub fn fit(&self, x: &[Vec<f64>], y: &[f64]) -> Hyperplane {
        let dim = x.first().map_or(0, Vec::len);
        let mut w = vec![0.0; dim];
        let mut b = 0.0;
        let mut alpha = vec![0.0; x.len()];
        let diag: Vec<f64> = x
            .iter()
            .map(|xi| xi.iter().map(|v| v * v).sum::<f64>() + 1.0)
            .collect();

        for _ in 0..self.max_iter {
            let mut max_pg = f64::NEG_INFINITY;
            let mut min_pg = f64::INFINITY;
            for i in 0..x.len() {
                let margin = w.iter().zip(&x[i]).map(|(a, v)| a * v).sum::<f64>() + b;
                let g = y[i] * margin - 1.0;
                let pg = if alpha[i] == 0.0 {
                    g.min(0.0)
                } else if alpha[i] == self.c {
                    g.max(0.0)
                } else {
                    g
                };
                max_pg = max_pg.max(pg);
                min_pg = min_pg.min(pg);
                if pg.abs() > 1e-12 {
                    let old = alpha[i];
                    alpha[i] = (alpha[i] - g / diag[i]).clamp(0.0, self.c);
                    let step = (alpha[i] - old) * y[i];
                    for (wj, v) in w.iter_mut().zip(&x[i]) {
                        *wj += step * v;
                    }
                    b += step;
                }
            }
            if max_pg - min_pg < self.tolerance {
                break;
            }
        }

        Hyperplane { weights: w, bias: b }
    }

    /// One separator per class (one-vs-rest), or a single separator with
    /// class 1 as the positive side when there are exactly two classes.
    pub fn fit_classes(&self, x: &[Vec<f64>], labels: &[usize], num_classes: usize) -> Vec<Hyperplane> {
        if num_classes == 2 {
            let y: Vec<f64> = labels.iter().map(|&l| if l == 1 { 1.0 } else { -1.0 }).collect();
            return vec![self.fit(x, &y)];
        }
        (0..num_classes)
            .map(|c| {
                let y: Vec<f64> = labels.iter().map(|&l| if l == c { 1.0 } else { -1.0 }).collect();
                self.fit(x, &y)
            })
            .collect()
    }
}

/// SVM classifier on normalised, one-hot encoded inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportVectorMachine {
    pub solver: LinearSvm,
}

struct SvmModel {
    encoder: InputEncoder,
    planes: Vec<Hyperplane>,
    num_classes: usize,
}

impl Classifier for SupportVectorMachine {
    fn train(&self, data: &Dataset, rows: &[usize]) -> BenchResult<Box<dyn TrainedModel>> {
        if rows.is_empty() {
            return Err(BenchError::classifier("SMO", "no training rows"));
        }
        let encoder = InputEncoder::fit(data, rows);
        let x = encoder.encode_rows(data, rows);
        let labels: Vec<usize> = rows.iter().map(|&r| data.label(r)).collect();
        let planes = self.solver.fit_classes(&x, &labels, data.num_classes());
        Ok(Box::new(SvmModel {
            encoder,
            planes,
            num_classes: data.num_classes(),
        }))
    }
}

impl TrainedModel for SvmModel {
    fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64> {
        let x = self.encoder.encode(data, row);
        if self.num_classes == 2 {
            let p = 1.0 / (1.0 + (-self.planes[0].decision(&x)).exp());
            return vec![1.0 - p, p];
        }
        let scores: Vec<f64> = self.planes.iter().map(|h| h.decision(&x)).collect();
        softmax(&scores)
    }
}
