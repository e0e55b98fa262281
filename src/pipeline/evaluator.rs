//! Stratified k-fold cross-validation of a classifier batch
//!
//! Each classifier is cross-validated on its own, fold by fold, over one
//! shared fold partition. Test predictions from all folds are pooled into a
//! single [`EvaluationStats`] per classifier, from which every requested
//! metric is read.

use super::classifiers::ClassifierSpec;
use super::dataset::Dataset;
use super::error::BenchResult;
use super::folds::{FoldSplit, StratifiedFolds, DEFAULT_FOLD_SEED};
use super::metrics::{EvaluationStats, Metric};
use crate::utils::Diagnostics;

/// Values of one metric, one per classifier in invocation order
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValues {
    pub metric: Metric,
    pub values: Vec<f64>,
}

/// Metric values for every (requested metric, classifier) pair
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResults {
    pub classifiers: Vec<String>,
    pub metrics: Vec<MetricValues>,
}

impl EvaluationResults {
    pub fn values(&self, metric: Metric) -> Option<&[f64]> {
        self.metrics
            .iter()
            .find(|m| m.metric == metric)
            .map(|m| m.values.as_slice())
    }

    pub fn value(&self, metric: Metric, classifier: &str) -> Option<f64> {
        let idx = self.classifiers.iter().position(|c| c == classifier)?;
        self.values(metric).map(|v| v[idx])
    }
}

/// Cross-validates classifiers over a fixed, seeded fold partition
pub struct CrossValidationEvaluator<'a> {
    seed: u64,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> CrossValidationEvaluator<'a> {
    pub fn new(diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            seed: DEFAULT_FOLD_SEED,
            diagnostics,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Evaluate every classifier and read off every metric.
    ///
    /// A classifier that fails to train leaves `NaN` in all of its cells and
    /// is reported as an error diagnostic; the other classifiers still run.
    /// An unusable fold count fails the whole call.
    pub fn evaluate(
        &self,
        data: &Dataset,
        num_folds: usize,
        classifiers: &[ClassifierSpec],
        metrics: &[Metric],
    ) -> BenchResult<EvaluationResults> {
        let folds = StratifiedFolds::new(data, num_folds, self.seed)?;
        let splits = folds.splits();

        let mut per_classifier: Vec<Option<EvaluationStats>> = Vec::with_capacity(classifiers.len());
        for spec in classifiers {
            let stats = self.cross_validate(data, &splits, spec);
            match stats {
                Ok(stats) => per_classifier.push(Some(stats)),
                Err(e) => {
                    self.diagnostics.error(&format!(
                        "{} on {} features: {}",
                        spec.name,
                        data.num_features(),
                        e
                    ));
                    per_classifier.push(None);
                }
            }
        }

        Ok(EvaluationResults {
            classifiers: classifiers.iter().map(|c| c.name.clone()).collect(),
            metrics: metrics
                .iter()
                .map(|&metric| MetricValues {
                    metric,
                    values: per_classifier
                        .iter()
                        .map(|s| s.as_ref().map_or(f64::NAN, |s| s.metric(metric)))
                        .collect(),
                })
                .collect(),
        })
    }

    fn cross_validate(
        &self,
        data: &Dataset,
        splits: &[FoldSplit],
        spec: &ClassifierSpec,
    ) -> BenchResult<EvaluationStats> {
        let mut stats = EvaluationStats::new(data.num_classes());
        for split in splits {
            let model = spec.classifier.train(data, &split.train)?;
            for &row in &split.test {
                stats.record(data.label(row), model.distribution(data, row));
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classifiers::{Classifier, ClassifierRegistry, TrainedModel};
    use crate::pipeline::dataset::Feature;
    use crate::pipeline::error::BenchError;
    use crate::utils::RecordingDiagnostics;

    struct Broken;

    impl Classifier for Broken {
        fn train(&self, _data: &Dataset, _rows: &[usize]) -> BenchResult<Box<dyn TrainedModel>> {
            Err(BenchError::classifier("broken", "always fails"))
        }
    }

    fn data() -> Dataset {
        let labels: Vec<usize> = (0..40).map(|i| usize::from(i % 4 >= 2)).collect();
        let x: Vec<f64> = labels.iter().enumerate().map(|(i, &l)| l as f64 * 5.0 + (i % 3) as f64).collect();
        Dataset::new(
            vec![Feature::numeric("x", x)],
            "class",
            vec!["a".into(), "b".into()],
            labels,
        )
        .unwrap()
    }

    #[test]
    fn test_failed_classifier_leaves_nan_and_others_run() {
        let diag = RecordingDiagnostics::new();
        let mut registry = ClassifierRegistry::default();
        registry.register("broken", || Box::new(Broken));
        let classifiers = registry.resolve(&["NB", "broken"], &diag);

        let results = CrossValidationEvaluator::new(&diag)
            .evaluate(&data(), 5, &classifiers, &[Metric::Accuracy])
            .unwrap();
        assert_eq!(results.value(Metric::Accuracy, "NB"), Some(100.0));
        assert!(results.value(Metric::Accuracy, "broken").unwrap().is_nan());
        assert!(diag.has_errors());
    }

    #[test]
    fn test_too_many_folds_is_invalid() {
        let diag = RecordingDiagnostics::new();
        let classifiers = ClassifierRegistry::default().resolve(&["NB"], &diag);
        let err = CrossValidationEvaluator::new(&diag)
            .evaluate(&data(), 41, &classifiers, &[Metric::Accuracy])
            .unwrap_err();
        assert!(matches!(err, BenchError::InvalidFolds { folds: 41, rows: 40 }));
    }

    #[test]
    fn test_repeated_evaluation_is_identical() {
        let diag = RecordingDiagnostics::new();
        let classifiers = ClassifierRegistry::default().resolve(&["NB", "C4.5", "KNN3"], &diag);
        let evaluator = CrossValidationEvaluator::new(&diag);
        let a = evaluator
            .evaluate(&data(), 5, &classifiers, &Metric::ALL)
            .unwrap();
        let b = evaluator
            .evaluate(&data(), 5, &classifiers, &Metric::ALL)
            .unwrap();
        for (ma, mb) in a.metrics.iter().zip(&b.metrics) {
            for (x, y) in ma.values.iter().zip(&mb.values) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }
}
