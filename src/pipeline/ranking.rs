//! Feature ranking: resolve a selection method, score every feature and order
//! the features by descending relevance

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::dataset::Dataset;
use super::error::{BenchError, BenchResult};
use super::scoring::{
    FeatureScorer, GainRatioScorer, InfoGainScorer, ReliefFScorer, SvmRfeScorer,
};
use crate::utils::Diagnostics;

/// Supported feature selection methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionMethod {
    InfoGain,
    GainRatio,
    ReliefF,
    SvmRfe,
}

impl SelectionMethod {
    pub const ALL: [SelectionMethod; 4] = [
        SelectionMethod::InfoGain,
        SelectionMethod::GainRatio,
        SelectionMethod::ReliefF,
        SelectionMethod::SvmRfe,
    ];

    /// Canonical name, also used for the ranking file stem.
    pub fn name(&self) -> &'static str {
        match self {
            SelectionMethod::InfoGain => "InfoGain",
            SelectionMethod::GainRatio => "GainRatio",
            SelectionMethod::ReliefF => "ReliefF",
            SelectionMethod::SvmRfe => "SVMpRFE",
        }
    }

    /// Exact lookup, including aliases.
    pub fn from_name(name: &str) -> Option<SelectionMethod> {
        match name {
            "InfoGain" | "InformationGain" => Some(SelectionMethod::InfoGain),
            "GainRatio" => Some(SelectionMethod::GainRatio),
            "ReliefF" => Some(SelectionMethod::ReliefF),
            "SVMpRFE" | "SVM-RFE" => Some(SelectionMethod::SvmRfe),
            _ => None,
        }
    }

    /// Lookup that falls back to information gain for unknown names.
    pub fn resolve(name: &str) -> SelectionMethod {
        Self::from_name(name).unwrap_or(SelectionMethod::InfoGain)
    }

    pub fn scorer(&self) -> Box<dyn FeatureScorer> {
        match self {
            SelectionMethod::InfoGain => Box::new(InfoGainScorer),
            SelectionMethod::GainRatio => Box::new(GainRatioScorer),
            SelectionMethod::ReliefF => Box::new(ReliefFScorer::default()),
            SelectionMethod::SvmRfe => Box::new(SvmRfeScorer::default()),
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One ranked feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFeature {
    pub name: String,
    pub score: f64,
}

/// Features ordered by descending relevance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub entries: Vec<RankedFeature>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Names of the first `k` features (fewer if the ranking is shorter).
    pub fn top(&self, k: usize) -> Vec<&str> {
        self.entries.iter().take(k).map(|e| e.name.as_str()).collect()
    }
}

/// Result of ranking one method, with its wall-clock cost
#[derive(Debug, Clone)]
pub struct RankingOutcome {
    pub requested: String,
    pub method: SelectionMethod,
    pub ranking: Ranking,
    pub elapsed: Duration,
}

/// Scores and orders dataset features
pub struct FeatureRanker<'a> {
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> FeatureRanker<'a> {
    pub fn new(diagnostics: &'a dyn Diagnostics) -> Self {
        Self { diagnostics }
    }

    /// Rank all features of `data` with the named method.
    ///
    /// Unknown names are ranked with information gain. Equal scores keep the
    /// dataset's column order.
    pub fn rank(&self, data: &Dataset, method: &str) -> BenchResult<Ranking> {
        let resolved = SelectionMethod::resolve(method);
        if SelectionMethod::from_name(method).is_none() {
            self.diagnostics.warn(&format!(
                "Unknown selection method '{}', using {}",
                method, resolved
            ));
        }
        rank_with(data, resolved, resolved.scorer().as_ref(), method)
    }

    /// Like [`FeatureRanker::rank`], timing the scoring run.
    pub fn rank_timed(&self, data: &Dataset, method: &str) -> BenchResult<RankingOutcome> {
        let start = Instant::now();
        let ranking = self.rank(data, method)?;
        let elapsed = start.elapsed();
        self.diagnostics.info(&format!(
            "Ranked {} features with {} in {} ms",
            ranking.len(),
            method,
            elapsed.as_millis()
        ));
        Ok(RankingOutcome {
            requested: method.to_string(),
            method: SelectionMethod::resolve(method),
            ranking,
            elapsed,
        })
    }
}

/// Rank with an explicit scorer.
pub fn rank_with(
    data: &Dataset,
    method: SelectionMethod,
    scorer: &dyn FeatureScorer,
    label: &str,
) -> BenchResult<Ranking> {
    if data.num_features() == 0 {
        return Err(BenchError::selection(label, "dataset has no features to rank"));
    }
    if data.observed_classes() < 2 {
        return Err(BenchError::selection(
            label,
            format!(
                "label '{}' has fewer than two distinct classes",
                data.label_name()
            ),
        ));
    }

    let scores = scorer.score(data)?;
    if scores.len() != data.num_features() {
        return Err(BenchError::selection(
            label,
            format!(
                "{} produced {} scores for {} features",
                method,
                scores.len(),
                data.num_features()
            ),
        ));
    }
    if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
        return Err(BenchError::selection(
            label,
            format!("non-finite score for feature '{}'", data.feature(i).name),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Ranking {
        entries: order
            .into_iter()
            .map(|i| RankedFeature {
                name: data.feature(i).name.clone(),
                score: scores[i],
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::dataset::Feature;
    use crate::utils::{Level, RecordingDiagnostics};

    struct Fixed(Vec<f64>);

    impl FeatureScorer for Fixed {
        fn score(&self, _data: &Dataset) -> BenchResult<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    fn data(labels: Vec<usize>) -> Dataset {
        let n = labels.len();
        Dataset::new(
            vec![
                Feature::numeric("a", (0..n).map(|i| i as f64).collect()),
                Feature::numeric("b", vec![0.0; n]),
                Feature::numeric("c", (0..n).map(|i| (i % 2) as f64).collect()),
            ],
            "class",
            vec!["x".into(), "y".into()],
            labels,
        )
        .unwrap()
    }

    #[test]
    fn test_names_and_aliases() {
        assert_eq!(SelectionMethod::from_name("InformationGain"), Some(SelectionMethod::InfoGain));
        assert_eq!(SelectionMethod::from_name("SVM-RFE"), Some(SelectionMethod::SvmRfe));
        assert_eq!(SelectionMethod::resolve("nope"), SelectionMethod::InfoGain);
        for m in SelectionMethod::ALL {
            assert_eq!(SelectionMethod::from_name(m.name()), Some(m));
        }
    }

    #[test]
    fn test_ties_keep_column_order() {
        let ds = data(vec![0, 1, 0, 1]);
        let ranking = rank_with(&ds, SelectionMethod::InfoGain, &Fixed(vec![0.5, 0.9, 0.5]), "x")
            .unwrap();
        assert_eq!(ranking.names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_single_class_is_selection_error() {
        let ds = data(vec![0, 0, 0, 0]);
        let diag = RecordingDiagnostics::new();
        let err = FeatureRanker::new(&diag).rank(&ds, "InfoGain").unwrap_err();
        assert!(matches!(err, BenchError::Selection { .. }));
    }

    #[test]
    fn test_score_count_mismatch_is_rejected() {
        let ds = data(vec![0, 1, 0, 1]);
        let result = rank_with(&ds, SelectionMethod::InfoGain, &Fixed(vec![1.0]), "x");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_method_warns_and_falls_back() {
        let ds = data((0..20).map(|i| usize::from(i >= 10)).collect());
        let diag = RecordingDiagnostics::new();
        let ranker = FeatureRanker::new(&diag);
        let fallback = ranker.rank(&ds, "unknown-method").unwrap();
        let info_gain = ranker.rank(&ds, "InformationGain").unwrap();
        assert_eq!(fallback, info_gain);
        assert_eq!(diag.messages_at(Level::Warn).len(), 1);
    }
}
