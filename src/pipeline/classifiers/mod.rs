//! Classifier capability and the name-keyed classifier registry
//!
//! The evaluator only needs two operations from a classifier: train on a set
//! of rows and produce a class distribution for a row. Concrete algorithms
//! live in the submodules and are reached through [`ClassifierRegistry`],
//! which resolves the names given on the command line once, up front.

mod encoding;
mod forest;
mod knn;
mod logistic;
mod naive_bayes;
mod svm;
mod tree;

pub use encoding::InputEncoder;
pub use forest::RandomForest;
pub use knn::NearestNeighbours;
pub use logistic::LogisticRegression;
pub use naive_bayes::NaiveBayes;
pub use svm::{LinearSvm, SupportVectorMachine};
pub use tree::{DecisionTree, SplitCriterion, TreeParams};

use super::dataset::Dataset;
use super::error::BenchResult;
use super::metrics::argmax;
use crate::utils::Diagnostics;

/// A configured, untrained classification algorithm.
pub trait Classifier: Send + Sync {
    /// Train on the given rows of `data`.
    fn train(&self, data: &Dataset, rows: &[usize]) -> BenchResult<Box<dyn TrainedModel>>;
}

/// A model produced by [`Classifier::train`].
pub trait TrainedModel {
    /// Class membership distribution for one row (one entry per class of the
    /// dataset, summing to 1).
    fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64>;

    /// Predicted class indices for the given rows.
    fn predict(&self, data: &Dataset, rows: &[usize]) -> Vec<usize> {
        rows.iter()
            .map(|&r| argmax(&self.distribution(data, r)))
            .collect()
    }
}

/// A classifier together with the name it was requested under.
pub struct ClassifierSpec {
    pub name: String,
    pub classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for ClassifierSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Classifier> + Send + Sync>;

/// Registry mapping classifier names to constructors
pub struct ClassifierRegistry {
    entries: Vec<(String, Factory)>,
}

impl Default for ClassifierRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("SMO", || Box::new(SupportVectorMachine::default()));
        registry.register("SVM", || Box::new(SupportVectorMachine::default()));
        registry.register("LR", || Box::new(LogisticRegression::default()));
        registry.register("KNN3", || Box::new(NearestNeighbours::new(3)));
        registry.register("KNN5", || Box::new(NearestNeighbours::new(5)));
        registry.register("NB", || Box::new(NaiveBayes));
        registry.register("C4.5", || Box::new(DecisionTree::c45()));
        registry.register("RF", || Box::new(RandomForest::default()));
        registry
    }
}

impl ClassifierRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace the constructor for `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Classifier> + Send + Sync + 'static,
    {
        self.entries.retain(|(n, _)| n != name);
        self.entries.push((name.to_string(), Box::new(factory)));
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn build(&self, name: &str) -> Option<ClassifierSpec> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, factory)| ClassifierSpec {
                name: n.clone(),
                classifier: factory(),
            })
    }

    /// Instantiate the named classifiers in the given order. Unknown names
    /// are reported and skipped.
    pub fn resolve<S: AsRef<str>>(
        &self,
        names: &[S],
        diagnostics: &dyn Diagnostics,
    ) -> Vec<ClassifierSpec> {
        names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter_map(|name| {
                let spec = self.build(name);
                if spec.is_none() {
                    diagnostics.warn(&format!(
                        "{} is no valid classifier/analysis module. Do nothing.",
                        name
                    ));
                }
                spec
            })
            .collect()
    }
}

/// Normalise non-negative scores into a distribution; uniform when all zero.
pub(crate) fn normalise(mut scores: Vec<f64>) -> Vec<f64> {
    let sum: f64 = scores.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        scores.iter_mut().for_each(|s| *s /= sum);
    } else {
        let n = scores.len().max(1) as f64;
        scores.iter_mut().for_each(|s| *s = 1.0 / n);
    }
    scores
}

/// Softmax over log-scores.
pub(crate) fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    normalise(logits.iter().map(|l| (l - max).exp()).collect())
}
