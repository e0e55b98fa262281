//! Brute-force k-nearest-neighbour classifier on normalised inputs

use std::cmp::Ordering;

use super::{normalise, Classifier, InputEncoder, TrainedModel};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::error::{BenchError, BenchResult};

#[derive(Debug, Clone, Copy)]
pub struct NearestNeighbours {
    k: usize,
}

impl NearestNeighbours {
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }
}

struct NearestNeighboursModel {
    k: usize,
    num_classes: usize,
    encoder: InputEncoder,
    points: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Classifier for NearestNeighbours {
    fn train(&self, data: &Dataset, rows: &[usize]) -> BenchResult<Box<dyn TrainedModel>> {
        if rows.is_empty() {
            return Err(BenchError::classifier(
                &format!("KNN{}", self.k),
                "no training rows",
            ));
        }
        let encoder = InputEncoder::fit(data, rows);
        let points = encoder.encode_rows(data, rows);
        let labels = rows.iter().map(|&r| data.label(r)).collect();
        Ok(Box::new(NearestNeighboursModel {
            k: self.k,
            num_classes: data.num_classes(),
            encoder,
            points,
            labels,
        }))
    }
}

impl TrainedModel for NearestNeighboursModel {
    fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64> {
        let query = self.encoder.encode(data, row);
        let mut distances: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (squared_distance(p, &query), i))
            .collect();
        // stable: equal distances keep training order
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut votes = vec![0.0; self.num_classes];
        for &(_, i) in distances.iter().take(self.k) {
            votes[self.labels[i]] += 1.0;
        }
        normalise(votes)
    }
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
