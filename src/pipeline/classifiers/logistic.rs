//! Ridge-regularised multinomial logistic regression fitted by full-batch
//! gradient descent on normalised inputs

use super::{softmax, Classifier, InputEncoder, TrainedModel};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::error::{BenchError, BenchResult};

#[derive(Debug, Clone, Copy)]
pub struct LogisticRegression {
    pub ridge: f64,
    pub learning_rate: f64,
    pub iterations: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            ridge: 1e-4,
            learning_rate: 0.5,
            iterations: 500,
        }
    }
}

struct LogisticModel {
    encoder: InputEncoder,
    /// `weights[class]`, last entry is the intercept
    weights: Vec<Vec<f64>>,
}

impl LogisticModel {
    fn logits(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .map(|w| {
                let (bias, coef) = w.split_last().map_or((0.0, &w[..]), |(b, c)| (*b, c));
                coef.iter().zip(x).map(|(a, v)| a * v).sum::<f64>() + bias
            })
            .collect()
    }
}

impl Classifier for LogisticRegression {
    fn train(&self, data: &Dataset, rows: &[usize]) -> BenchResult<Box<dyn TrainedModel>> {
        if rows.is_empty() {
            return Err(BenchError::classifier("LR", "no training rows"));
        }
        let encoder = InputEncoder::fit(data, rows);
        let x = encoder.encode_rows(data, rows);
        let k = data.num_classes();
        let dim = encoder.width();
        let n = rows.len() as f64;

        let mut model = LogisticModel {
            encoder,
            weights: vec![vec![0.0; dim + 1]; k],
        };

        for _ in 0..self.iterations {
            let mut grad = vec![vec![0.0; dim + 1]; k];
            for (xi, &r) in x.iter().zip(rows) {
                let p = softmax(&model.logits(xi));
                let actual = data.label(r);
                for c in 0..k {
                    let err = p[c] - if c == actual { 1.0 } else { 0.0 };
                    for (g, v) in grad[c].iter_mut().zip(xi) {
                        *g += err * v;
                    }
                    grad[c][dim] += err;
                }
            }
            for (w, g) in model.weights.iter_mut().zip(&grad) {
                for j in 0..=dim {
                    let penalty = if j < dim { self.ridge * w[j] } else { 0.0 };
                    w[j] -= self.learning_rate * (g[j] / n + penalty);
                }
            }
        }

        if model.weights.iter().flatten().any(|w| !w.is_finite()) {
            return Err(BenchError::classifier("LR", "optimisation diverged"));
        }
        Ok(Box::new(model))
    }
}

impl TrainedModel for LogisticModel {
    fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64> {
        softmax(&self.logits(&self.encoder.encode(data, row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::dataset::Feature;

    #[test]
    fn test_learns_threshold() {
        let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let labels: Vec<usize> = (0..20).map(|i| usize::from(i >= 10)).collect();
        let data = Dataset::new(
            vec![Feature::numeric("x", values)],
            "class",
            vec!["lo".into(), "hi".into()],
            labels,
        )
        .unwrap();
        let model = LogisticRegression::default()
            .train(&data, &data.all_rows())
            .unwrap();
        assert_eq!(model.predict(&data, &[0, 2, 17, 19]), vec![0, 0, 1, 1]);
        let p = model.distribution(&data, 19);
        assert!(p[1] > 0.5);
    }
}
