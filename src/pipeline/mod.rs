//! Pipeline module - ranking, subset loading, cross-validation and result tables

pub mod aggregate;
pub mod classifiers;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod evaluator;
pub mod folds;
pub mod metrics;
pub mod ranking;
pub mod scoring;
pub mod subset;

pub use aggregate::{MetricRow, ResultTable};
pub use classifiers::{Classifier, ClassifierRegistry, ClassifierSpec, TrainedModel};
pub use dataset::{load_dataset, read_frame, Dataset, Feature, FeatureType};
pub use error::{BenchError, BenchResult};
pub use evaluation::{method_directories, EvaluationConfig, EvaluationPipeline, MethodOutcome};
pub use evaluator::{CrossValidationEvaluator, EvaluationResults, MetricValues};
pub use folds::{FoldSplit, StratifiedFolds, DEFAULT_FOLD_SEED};
pub use metrics::{EvaluationStats, Metric};
pub use ranking::{FeatureRanker, RankedFeature, Ranking, RankingOutcome, SelectionMethod};
pub use scoring::FeatureScorer;
pub use subset::{materialize_subsets, subset_path, SubsetBuilder, SUBSET_SEPARATOR};
