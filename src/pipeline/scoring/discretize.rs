//! Supervised MDL discretisation (Fayyad & Irani) of numeric features

use super::entropy;
use crate::pipeline::dataset::Feature;

/// Bin index for every row of `feature`.
///
/// Categorical features use their category codes. Numeric features are cut
/// at the MDL-accepted boundaries computed against `labels`. Missing cells go
/// to an extra bin after the last regular one.
pub fn discretize(feature: &Feature, labels: &[usize], num_classes: usize) -> Vec<usize> {
    if feature.is_categorical() {
        let missing_bin = feature.levels.len();
        return feature
            .values
            .iter()
            .map(|v| if v.is_nan() { missing_bin } else { *v as usize })
            .collect();
    }

    let cuts = mdl_cut_points(&feature.values, labels, num_classes);
    let missing_bin = cuts.len() + 1;
    feature
        .values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                missing_bin
            } else {
                cuts.partition_point(|&c| c < v)
            }
        })
        .collect()
}

/// Sorted cut points for the non-missing `values`.
pub fn mdl_cut_points(values: &[f64], labels: &[usize], num_classes: usize) -> Vec<f64> {
    let mut known: Vec<(f64, usize)> = values
        .iter()
        .zip(labels)
        .filter(|(v, _)| !v.is_nan())
        .map(|(&v, &l)| (v, l))
        .collect();
    known.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut cuts = Vec::new();
    split_recursive(&known, num_classes, &mut cuts);
    cuts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    cuts
}

fn split_recursive(sorted: &[(f64, usize)], num_classes: usize, cuts: &mut Vec<f64>) {
    let n = sorted.len();
    if n < 2 {
        return;
    }

    let mut total = vec![0.0; num_classes];
    for &(_, c) in sorted {
        total[c] += 1.0;
    }
    let base = entropy(&total);
    if base == 0.0 {
        return;
    }

    let mut left = vec![0.0; num_classes];
    let mut right = total.clone();
    let mut best: Option<(f64, usize, Vec<f64>, Vec<f64>)> = None;
    for i in 0..n - 1 {
        let c = sorted[i].1;
        left[c] += 1.0;
        right[c] -= 1.0;
        if sorted[i].0 == sorted[i + 1].0 {
            continue;
        }
        let nl = (i + 1) as f64;
        let nr = n as f64 - nl;
        let cond = (nl * entropy(&left) + nr * entropy(&right)) / n as f64;
        if best.as_ref().map_or(true, |(b, ..)| cond < *b) {
            best = Some((cond, i, left.clone(), right.clone()));
        }
    }
    let Some((cond, i, left, right)) = best else {
        return;
    };

    let present = |counts: &[f64]| counts.iter().filter(|&&c| c > 0.0).count() as f64;
    let k = present(&total);
    let k1 = present(&left);
    let k2 = present(&right);
    let gain = base - cond;
    let delta = (3f64.powf(k) - 2.0).log2() - (k * base - k1 * entropy(&left) - k2 * entropy(&right));
    let threshold = ((n as f64 - 1.0).log2() + delta) / n as f64;

    if gain > threshold {
        cuts.push((sorted[i].0 + sorted[i + 1].0) / 2.0);
        split_recursive(&sorted[..=i], num_classes, cuts);
        split_recursive(&sorted[i + 1..], num_classes, cuts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_boundary_is_found() {
        let values: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let labels: Vec<usize> = (0..40).map(|i| usize::from(i >= 20)).collect();
        let cuts = mdl_cut_points(&values, &labels, 2);
        assert_eq!(cuts, vec![19.5]);
    }

    #[test]
    fn test_noise_yields_no_cut() {
        let values: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let labels: Vec<usize> = (0..12).map(|i| i % 2).collect();
        assert!(mdl_cut_points(&values, &labels, 2).is_empty());
    }

    #[test]
    fn test_missing_values_get_own_bin() {
        let feature = Feature::numeric("x", vec![1.0, f64::NAN, 30.0]);
        let bins = discretize(&feature, &[0, 1, 0], 2);
        // known values are pure -> one regular bin plus missing bin
        assert_eq!(bins, vec![0, 1, 0]);
    }

    #[test]
    fn test_categorical_uses_codes() {
        let feature = Feature::categorical("c", &[Some("a"), Some("b"), None]);
        assert_eq!(discretize(&feature, &[0, 1, 0], 2), vec![0, 1, 2]);
    }
}
