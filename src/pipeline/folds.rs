//! Reproducible stratified k-fold partitioning

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::dataset::Dataset;
use super::error::{BenchError, BenchResult};

/// Seed used for fold partitions unless configured otherwise
pub const DEFAULT_FOLD_SEED: u64 = 1;

/// One train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    pub fold: usize,
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified fold assignment over all rows of a dataset.
///
/// Rows are shuffled with a seeded generator, grouped by class (classes in
/// index order, rows in shuffled order within each class) and dealt to the
/// folds round-robin, so every fold receives a near-equal share of each class.
/// The same dataset, fold count and seed always yield the same folds.
#[derive(Debug, Clone)]
pub struct StratifiedFolds {
    folds: Vec<Vec<usize>>,
}

impl StratifiedFolds {
    pub fn new(data: &Dataset, num_folds: usize, seed: u64) -> BenchResult<Self> {
        let rows = data.num_rows();
        if num_folds < 2 || num_folds > rows {
            return Err(BenchError::InvalidFolds {
                folds: num_folds,
                rows,
            });
        }

        let mut order = data.all_rows();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); data.num_classes()];
        for row in order {
            by_class[data.label(row)].push(row);
        }

        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); num_folds];
        for (i, row) in by_class.into_iter().flatten().enumerate() {
            folds[i % num_folds].push(row);
        }

        Ok(Self { folds })
    }

    /// Train/test splits, one per fold, in fold order.
    pub fn splits(&self) -> Vec<FoldSplit> {
        (0..self.folds.len())
            .map(|fold| FoldSplit {
                fold,
                test: self.folds[fold].clone(),
                train: self
                    .folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::dataset::Feature;

    fn labelled(labels: Vec<usize>) -> Dataset {
        let n = labels.len();
        let values = (0..n).map(|i| i as f64).collect();
        Dataset::new(
            vec![Feature::numeric("x", values)],
            "class",
            vec!["a".into(), "b".into()],
            labels,
        )
        .unwrap()
    }

    #[test]
    fn test_folds_partition_every_row_once() {
        let data = labelled((0..23).map(|i| i % 2).collect());
        let folds = StratifiedFolds::new(&data, 5, 1).unwrap();
        let mut seen: Vec<usize> = folds.splits().into_iter().flat_map(|s| s.test).collect();
        seen.sort();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn test_folds_are_stratified() {
        // 30 of class 0, 10 of class 1 -> each of 5 folds gets 6 and 2
        let labels: Vec<usize> = (0..40).map(|i| usize::from(i >= 30)).collect();
        let data = labelled(labels);
        for split in StratifiedFolds::new(&data, 5, 1).unwrap().splits() {
            let counts = data.class_counts(&split.test);
            assert_eq!(counts, vec![6, 2], "fold {} unbalanced", split.fold);
            assert_eq!(split.train.len() + split.test.len(), 40);
        }
    }

    #[test]
    fn test_same_seed_same_folds() {
        let data = labelled((0..50).map(|i| i % 2).collect());
        let a = StratifiedFolds::new(&data, 10, 1).unwrap().splits();
        let b = StratifiedFolds::new(&data, 10, 1).unwrap().splits();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_many_folds_is_rejected() {
        let data = labelled(vec![0, 1, 0]);
        assert!(matches!(
            StratifiedFolds::new(&data, 4, 1),
            Err(BenchError::InvalidFolds { folds: 4, rows: 3 })
        ));
        assert!(StratifiedFolds::new(&data, 1, 1).is_err());
    }
}
