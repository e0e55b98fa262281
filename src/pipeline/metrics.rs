//! Classification metrics computed from pooled cross-validation predictions
//!
//! All per-class metrics are combined by weighting each class with its
//! support (the number of rows whose actual label is that class), so values
//! are comparable across classifiers and datasets with different class
//! balance. `accuracy` is reported as a percentage, every other metric as a
//! fraction.

use std::fmt;

use serde::Serialize;

use crate::utils::Diagnostics;

/// A recognised evaluation metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    Accuracy,
    Kappa,
    Auroc,
    Sensitivity,
    Specificity,
    F1,
    MatthewsCoef,
    Precision,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Accuracy,
        Metric::Kappa,
        Metric::Auroc,
        Metric::Sensitivity,
        Metric::Specificity,
        Metric::F1,
        Metric::MatthewsCoef,
        Metric::Precision,
    ];

    /// Name used on the command line and in output file names.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Kappa => "kappa",
            Metric::Auroc => "AUROC",
            Metric::Sensitivity => "sensitivity",
            Metric::Specificity => "specificity",
            Metric::F1 => "F1",
            Metric::MatthewsCoef => "matthewcoef",
            Metric::Precision => "precision",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Resolve metric names in order, dropping duplicates and reporting
    /// unrecognised names instead of failing.
    pub fn resolve_all<S: AsRef<str>>(names: &[S], diagnostics: &dyn Diagnostics) -> Vec<Metric> {
        let mut metrics = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim();
            match Metric::from_name(name) {
                Some(m) if !metrics.contains(&m) => metrics.push(m),
                Some(_) => {}
                None => diagnostics.warn(&format!(
                    "{} is no valid evaluation metric. Skipping it.",
                    name
                )),
            }
        }
        metrics
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Confusion counts and class distributions pooled over all test folds
#[derive(Debug, Clone)]
pub struct EvaluationStats {
    num_classes: usize,
    /// `confusion[actual][predicted]`
    confusion: Vec<Vec<f64>>,
    /// (actual class, predicted distribution) per test row
    scored: Vec<(usize, Vec<f64>)>,
}

impl EvaluationStats {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            confusion: vec![vec![0.0; num_classes]; num_classes],
            scored: Vec::new(),
        }
    }

    /// Record one test prediction. The predicted class is the arg-max of the
    /// distribution, lowest class index on ties.
    pub fn record(&mut self, actual: usize, distribution: Vec<f64>) {
        let predicted = argmax(&distribution);
        self.confusion[actual][predicted] += 1.0;
        self.scored.push((actual, distribution));
    }

    pub fn total(&self) -> f64 {
        self.confusion.iter().flatten().sum()
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.pct_correct(),
            Metric::Kappa => self.kappa(),
            Metric::Auroc => self.weighted_auroc(),
            Metric::Sensitivity => self.weighted(|s, c| s.true_positive_rate(c)),
            Metric::Specificity => self.weighted(|s, c| s.true_negative_rate(c)),
            Metric::F1 => self.weighted(|s, c| s.f_measure(c)),
            Metric::MatthewsCoef => self.weighted(|s, c| s.matthews(c)),
            Metric::Precision => self.weighted(|s, c| s.precision(c)),
        }
    }

    pub fn pct_correct(&self) -> f64 {
        let total = self.total();
        if total == 0.0 {
            return f64::NAN;
        }
        100.0 * self.correct() / total
    }

    pub fn kappa(&self) -> f64 {
        let total = self.total();
        if total == 0.0 {
            return f64::NAN;
        }
        let chance: f64 = (0..self.num_classes)
            .map(|c| self.actual_count(c) * self.predicted_count(c))
            .sum::<f64>()
            / (total * total);
        let observed = self.correct() / total;
        if chance < 1.0 {
            (observed - chance) / (1.0 - chance)
        } else {
            1.0
        }
    }

    /// One-vs-rest area under the ROC curve per class, weighted by support.
    /// Classes whose curve is undefined (no positives or no negatives) are
    /// left out of the weighting.
    pub fn weighted_auroc(&self) -> f64 {
        let mut sum = 0.0;
        let mut weight = 0.0;
        for c in 0..self.num_classes {
            let support = self.actual_count(c);
            if support == 0.0 {
                continue;
            }
            let auc = self.auroc(c);
            if auc.is_nan() {
                continue;
            }
            sum += support * auc;
            weight += support;
        }
        if weight == 0.0 {
            f64::NAN
        } else {
            sum / weight
        }
    }

    /// Mann-Whitney estimate of the AUC for `class`, using mid-ranks for ties.
    pub fn auroc(&self, class: usize) -> f64 {
        let mut scores: Vec<(f64, bool)> = self
            .scored
            .iter()
            .map(|(actual, dist)| (dist.get(class).copied().unwrap_or(0.0), *actual == class))
            .collect();
        let positives = scores.iter().filter(|(_, p)| *p).count() as f64;
        let negatives = scores.len() as f64 - positives;
        if positives == 0.0 || negatives == 0.0 {
            return f64::NAN;
        }

        scores.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let mut rank_sum = 0.0;
        let mut i = 0;
        while i < scores.len() {
            let mut j = i;
            while j + 1 < scores.len() && scores[j + 1].0 == scores[i].0 {
                j += 1;
            }
            // ranks are 1-based; tied block i..=j shares the mid-rank
            let mid_rank = (i + j) as f64 / 2.0 + 1.0;
            let tied_positives = scores[i..=j].iter().filter(|(_, p)| *p).count() as f64;
            rank_sum += mid_rank * tied_positives;
            i = j + 1;
        }
        (rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives)
    }

    pub fn true_positive_rate(&self, class: usize) -> f64 {
        let (tp, _, fn_, _) = self.counts(class);
        ratio(tp, tp + fn_)
    }

    pub fn true_negative_rate(&self, class: usize) -> f64 {
        let (_, fp, _, tn) = self.counts(class);
        ratio(tn, tn + fp)
    }

    pub fn precision(&self, class: usize) -> f64 {
        let (tp, fp, _, _) = self.counts(class);
        ratio(tp, tp + fp)
    }

    pub fn f_measure(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.true_positive_rate(class);
        ratio(2.0 * p * r, p + r)
    }

    pub fn matthews(&self, class: usize) -> f64 {
        let (tp, fp, fn_, tn) = self.counts(class);
        let denom = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
        ratio(tp * tn - fp * fn_, denom)
    }

    fn weighted(&self, per_class: impl Fn(&Self, usize) -> f64) -> f64 {
        let total = self.total();
        if total == 0.0 {
            return f64::NAN;
        }
        (0..self.num_classes)
            .map(|c| self.actual_count(c) * per_class(self, c))
            .sum::<f64>()
            / total
    }

    /// (true positives, false positives, false negatives, true negatives)
    fn counts(&self, class: usize) -> (f64, f64, f64, f64) {
        let tp = self.confusion[class][class];
        let fn_ = self.actual_count(class) - tp;
        let fp = self.predicted_count(class) - tp;
        let tn = self.total() - tp - fn_ - fp;
        (tp, fp, fn_, tn)
    }

    fn correct(&self) -> f64 {
        (0..self.num_classes).map(|c| self.confusion[c][c]).sum()
    }

    fn actual_count(&self, class: usize) -> f64 {
        self.confusion[class].iter().sum()
    }

    fn predicted_count(&self, class: usize) -> f64 {
        self.confusion.iter().map(|row| row[class]).sum()
    }
}

/// Index of the largest value, lowest index on ties.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn ratio(num: f64, denom: f64) -> f64 {
    if denom == 0.0 {
        0.0
    } else {
        num / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::RecordingDiagnostics;

    const EPS: f64 = 1e-9;

    /// 10 rows: class 0 has 6 rows (5 correct), class 1 has 4 rows (3 correct)
    fn binary_stats() -> EvaluationStats {
        let mut stats = EvaluationStats::new(2);
        for _ in 0..5 {
            stats.record(0, vec![0.9, 0.1]);
        }
        stats.record(0, vec![0.4, 0.6]);
        for _ in 0..3 {
            stats.record(1, vec![0.2, 0.8]);
        }
        stats.record(1, vec![0.7, 0.3]);
        stats
    }

    #[test]
    fn test_accuracy_is_percentage() {
        assert!((binary_stats().metric(Metric::Accuracy) - 80.0).abs() < EPS);
    }

    #[test]
    fn test_per_class_rates() {
        let s = binary_stats();
        assert!((s.true_positive_rate(0) - 5.0 / 6.0).abs() < EPS);
        assert!((s.true_negative_rate(0) - 3.0 / 4.0).abs() < EPS);
        assert!((s.precision(1) - 3.0 / 4.0).abs() < EPS);
    }

    #[test]
    fn test_weighted_sensitivity_equals_accuracy_fraction() {
        let s = binary_stats();
        assert!((s.metric(Metric::Sensitivity) - 0.8).abs() < EPS);
    }

    #[test]
    fn test_kappa_known_value() {
        // observed 0.8, chance = (6*6 + 4*4) / 100 = 0.52
        let expected = (0.8 - 0.52) / (1.0 - 0.52);
        assert!((binary_stats().kappa() - expected).abs() < EPS);
    }

    #[test]
    fn test_perfect_separation_auc_is_one() {
        let mut s = EvaluationStats::new(2);
        s.record(0, vec![0.9, 0.1]);
        s.record(0, vec![0.8, 0.2]);
        s.record(1, vec![0.3, 0.7]);
        s.record(1, vec![0.1, 0.9]);
        assert!((s.weighted_auroc() - 1.0).abs() < EPS);
        assert!((s.metric(Metric::MatthewsCoef) - 1.0).abs() < EPS);
        assert!((s.metric(Metric::F1) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_tied_scores_give_half_auc() {
        let mut s = EvaluationStats::new(2);
        s.record(0, vec![0.5, 0.5]);
        s.record(1, vec![0.5, 0.5]);
        assert!((s.auroc(1) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_single_class_auc_is_undefined() {
        let mut s = EvaluationStats::new(2);
        s.record(0, vec![0.9, 0.1]);
        assert!(s.auroc(0).is_nan());
        assert!(s.weighted_auroc().is_nan());
    }

    #[test]
    fn test_resolve_skips_unknown_and_duplicates() {
        let diag = RecordingDiagnostics::new();
        let names = ["accuracy", "bogus", "F1", "accuracy"];
        let metrics = Metric::resolve_all(&names, &diag);
        assert_eq!(metrics, vec![Metric::Accuracy, Metric::F1]);
        assert_eq!(diag.messages_at(crate::utils::Level::Warn).len(), 1);
    }

    #[test]
    fn test_argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
    }
}
