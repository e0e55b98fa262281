//! Random forest: bagged random trees with averaged leaf distributions

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tree::{RandomTree, SplitCriterion, TreeParams};
use super::{normalise, Classifier, TrainedModel};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::error::{BenchError, BenchResult};

#[derive(Debug, Clone, Copy)]
pub struct RandomForest {
    pub num_trees: usize,
    pub seed: u64,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self {
            num_trees: 100,
            seed: 1,
        }
    }
}

struct ForestModel {
    trees: Vec<RandomTree>,
    num_classes: usize,
}

impl Classifier for RandomForest {
    fn train(&self, data: &Dataset, rows: &[usize]) -> BenchResult<Box<dyn TrainedModel>> {
        if rows.is_empty() {
            return Err(BenchError::classifier("RF", "no training rows"));
        }
        let m = data.num_features();
        let params = TreeParams {
            criterion: SplitCriterion::InfoGain,
            min_leaf: 1,
            candidate_features: Some(log2_floor(m) + 1),
            prune: false,
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let trees = (0..self.num_trees)
            .map(|_| {
                let bag: Vec<usize> = (0..rows.len())
                    .map(|_| rows[rng.gen_range(0..rows.len())])
                    .collect();
                RandomTree::grow(data, bag, &params, &mut rng)
            })
            .collect();

        Ok(Box::new(ForestModel {
            trees,
            num_classes: data.num_classes(),
        }))
    }
}

impl TrainedModel for ForestModel {
    fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64> {
        let mut sum = vec![0.0; self.num_classes];
        for tree in &self.trees {
            for (s, p) in sum.iter_mut().zip(tree.distribution(data, row)) {
                *s += p;
            }
        }
        normalise(sum)
    }
}

fn log2_floor(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - 1 - n.leading_zeros()) as usize
    }
}
