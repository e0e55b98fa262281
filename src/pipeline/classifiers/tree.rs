//! Classification trees
//!
//! One builder serves both the C4.5-style tree (gain-ratio splits, pessimistic
//! error pruning) and the unpruned random trees of the forest (information
//! gain over a random subset of candidate features at each node).
//!
//! Numeric features split on a binary threshold halfway between adjacent
//! distinct values; categorical features split multi-way, one branch per
//! level. Rows with a missing split value follow the most populated branch.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{normalise, Classifier, TrainedModel};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::error::{BenchError, BenchResult};
use crate::pipeline::scoring::entropy;

/// z-value for the upper confidence limit at the C4.5 default confidence 0.25
const Z_CONFIDENCE_25: f64 = 0.674_489_750_196_081_7;

/// Hard cap on tree depth
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    InfoGain,
    GainRatio,
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub criterion: SplitCriterion,
    /// Minimum rows on at least two branches of a split
    pub min_leaf: usize,
    /// Number of features drawn per node; `None` considers all
    pub candidate_features: Option<usize>,
    /// Apply pessimistic subtree-replacement pruning
    pub prune: bool,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        counts: Vec<f64>,
    },
    Threshold {
        feature: usize,
        threshold: f64,
        /// Branch taken by missing values: 0 = left, 1 = right
        default_branch: usize,
        children: Box<[Node; 2]>,
    },
    Levels {
        feature: usize,
        default_branch: usize,
        children: Vec<Node>,
    },
}

impl Node {
    fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64> {
        match self {
            Node::Leaf { counts } => normalise(counts.clone()),
            Node::Threshold {
                feature,
                threshold,
                default_branch,
                children,
                ..
            } => {
                let branch = match data.feature(*feature).value(row) {
                    Some(v) if v <= *threshold => 0,
                    Some(_) => 1,
                    None => *default_branch,
                };
                children[branch].distribution(data, row)
            }
            Node::Levels {
                feature,
                default_branch,
                children,
                ..
            } => {
                let branch = data
                    .feature(*feature)
                    .value(row)
                    .map(|v| v as usize)
                    .filter(|&b| b < children.len())
                    .unwrap_or(*default_branch);
                children[branch].distribution(data, row)
            }
        }
    }

    /// Training errors of the subtree when pruned estimates are used at leaves.
    fn estimated_errors(&self) -> f64 {
        match self {
            Node::Leaf { counts } => leaf_estimated_errors(counts),
            Node::Threshold { children, .. } => children.iter().map(Node::estimated_errors).sum(),
            Node::Levels { children, .. } => children.iter().map(Node::estimated_errors).sum(),
        }
    }
}

/// A candidate split: branch row lists plus how to route rows at prediction
struct Split {
    feature: usize,
    threshold: Option<f64>,
    branches: Vec<Vec<usize>>,
    gain: f64,
    ratio: f64,
}

/// Tree classifier; `DecisionTree::c45()` is the C4.5 configuration.
#[derive(Debug, Clone, Copy)]
pub struct DecisionTree {
    pub params: TreeParams,
}

impl DecisionTree {
    pub fn c45() -> Self {
        Self {
            params: TreeParams {
                criterion: SplitCriterion::GainRatio,
                min_leaf: 2,
                candidate_features: None,
                prune: true,
            },
        }
    }
}

struct TreeModel {
    root: Node,
}

impl TrainedModel for TreeModel {
    fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64> {
        self.root.distribution(data, row)
    }
}

impl Classifier for DecisionTree {
    fn train(&self, data: &Dataset, rows: &[usize]) -> BenchResult<Box<dyn TrainedModel>> {
        if rows.is_empty() {
            return Err(BenchError::classifier("C4.5", "no training rows"));
        }
        let root = grow(data, rows.to_vec(), &self.params, 0, None);
        Ok(Box::new(TreeModel { root }))
    }
}

/// A tree grown with randomised candidate features, used by the forest
pub(crate) struct RandomTree {
    root: Node,
}

impl RandomTree {
    pub(crate) fn grow(data: &Dataset, rows: Vec<usize>, params: &TreeParams, rng: &mut StdRng) -> Self {
        Self {
            root: grow(data, rows, params, 0, Some(rng)),
        }
    }

    pub(crate) fn distribution(&self, data: &Dataset, row: usize) -> Vec<f64> {
        self.root.distribution(data, row)
    }
}

fn grow(
    data: &Dataset,
    rows: Vec<usize>,
    params: &TreeParams,
    depth: usize,
    mut rng: Option<&mut StdRng>,
) -> Node {
    let counts: Vec<f64> = data.class_counts(&rows).into_iter().map(|c| c as f64).collect();
    let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
    if pure || rows.len() < 2 * params.min_leaf || depth >= MAX_DEPTH {
        return Node::Leaf { counts };
    }

    let mut candidates: Vec<usize> = (0..data.num_features()).collect();
    if let (Some(m), Some(rng)) = (params.candidate_features, rng.as_deref_mut()) {
        candidates.shuffle(rng);
        candidates.truncate(m.max(1));
    }

    let Some(split) = best_split(data, &rows, &candidates, params) else {
        return Node::Leaf { counts };
    };

    let default_branch = split
        .branches
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(&a.0)))
        .map_or(0, |(i, _)| i);

    let mut branches = split.branches;
    // rows missing the split value follow the most populated branch
    let missing: Vec<usize> = rows
        .iter()
        .copied()
        .filter(|&r| data.feature(split.feature).value(r).is_none())
        .collect();
    branches[default_branch].extend(missing);

    let children: Vec<Node> = branches
        .into_iter()
        .map(|branch_rows| {
            if branch_rows.is_empty() {
                Node::Leaf {
                    counts: counts.clone(),
                }
            } else {
                grow(data, branch_rows, params, depth + 1, rng.as_deref_mut())
            }
        })
        .collect();

    let node = match split.threshold {
        Some(threshold) => {
            let mut it = children.into_iter();
            let left = it.next().unwrap_or(Node::Leaf { counts: counts.clone() });
            let right = it.next().unwrap_or(Node::Leaf { counts: counts.clone() });
            Node::Threshold {
                feature: split.feature,
                threshold,
                default_branch,
                children: Box::new([left, right]),
            }
        }
        None => Node::Levels {
            feature: split.feature,
            default_branch,
            children,
        },
    };

    if params.prune && leaf_estimated_errors(&counts) <= node.estimated_errors() + 0.1 {
        return Node::Leaf { counts };
    }
    node
}

fn best_split(
    data: &Dataset,
    rows: &[usize],
    candidates: &[usize],
    params: &TreeParams,
) -> Option<Split> {
    let total = rows.len() as f64;
    let splits: Vec<Split> = candidates
        .iter()
        .filter_map(|&f| {
            if data.feature(f).is_categorical() {
                level_split(data, rows, f, params.min_leaf, total)
            } else {
                threshold_split(data, rows, f, params.min_leaf, total)
            }
        })
        .filter(|s| s.gain > 1e-10)
        .collect();
    if splits.is_empty() {
        return None;
    }

    match params.criterion {
        SplitCriterion::InfoGain => splits
            .into_iter()
            .reduce(|best, s| if s.gain > best.gain { s } else { best }),
        SplitCriterion::GainRatio => {
            // only splits with at least average gain compete on gain ratio
            let mean_gain = splits.iter().map(|s| s.gain).sum::<f64>() / splits.len() as f64;
            splits
                .into_iter()
                .filter(|s| s.gain >= mean_gain - 1e-10)
                .reduce(|best, s| if s.ratio > best.ratio { s } else { best })
        }
    }
}

fn threshold_split(
    data: &Dataset,
    rows: &[usize],
    feature: usize,
    min_leaf: usize,
    total: f64,
) -> Option<Split> {
    let column = data.feature(feature);
    let mut known: Vec<(f64, usize)> = rows
        .iter()
        .filter_map(|&r| column.value(r).map(|v| (v, data.label(r))))
        .collect();
    if known.len() < 2 * min_leaf {
        return None;
    }
    known.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let k = data.num_classes();
    let mut right = vec![0.0; k];
    for &(_, c) in &known {
        right[c] += 1.0;
    }
    let known_total = known.len() as f64;
    let base = entropy(&right);
    let mut left = vec![0.0; k];

    let mut best: Option<(f64, f64, usize)> = None; // (gain, threshold, left size)
    for i in 0..known.len() - 1 {
        let c = known[i].1;
        left[c] += 1.0;
        right[c] -= 1.0;
        let n_left = i + 1;
        if known[i].0 == known[i + 1].0 || n_left < min_leaf || known.len() - n_left < min_leaf {
            continue;
        }
        let nl = n_left as f64;
        let nr = known_total - nl;
        let cond = (nl * entropy(&left) + nr * entropy(&right)) / known_total;
        let gain = (base - cond) * known_total / total;
        if best.map_or(true, |(g, _, _)| gain > g) {
            best = Some((gain, (known[i].0 + known[i + 1].0) / 2.0, n_left));
        }
    }

    let (gain, threshold, _) = best?;
    let mut branches = vec![Vec::new(), Vec::new()];
    for &r in rows {
        if let Some(v) = column.value(r) {
            branches[usize::from(v > threshold)].push(r);
        }
    }
    let sizes: Vec<f64> = branches.iter().map(|b| b.len() as f64).collect();
    let split_info = split_information(&sizes, total);
    Some(Split {
        feature,
        threshold: Some(threshold),
        ratio: if split_info > 0.0 { gain / split_info } else { 0.0 },
        branches,
        gain,
    })
}

fn level_split(
    data: &Dataset,
    rows: &[usize],
    feature: usize,
    min_leaf: usize,
    total: f64,
) -> Option<Split> {
    let column = data.feature(feature);
    let levels = column.levels.len();
    if levels < 2 {
        return None;
    }
    let k = data.num_classes();
    let mut branches: Vec<Vec<usize>> = vec![Vec::new(); levels];
    let mut branch_counts = vec![vec![0.0; k]; levels];
    let mut known_counts = vec![0.0; k];
    for &r in rows {
        if let Some(v) = column.value(r) {
            let b = v as usize;
            branches[b].push(r);
            branch_counts[b][data.label(r)] += 1.0;
            known_counts[data.label(r)] += 1.0;
        }
    }
    let big_enough = branches.iter().filter(|b| b.len() >= min_leaf).count();
    if big_enough < 2 {
        return None;
    }

    let known_total: f64 = known_counts.iter().sum();
    let cond: f64 = branch_counts
        .iter()
        .map(|c| c.iter().sum::<f64>() * entropy(c))
        .sum::<f64>()
        / known_total;
    let gain = (entropy(&known_counts) - cond) * known_total / total;
    let sizes: Vec<f64> = branches.iter().map(|b| b.len() as f64).collect();
    let split_info = split_information(&sizes, total);
    Some(Split {
        feature,
        threshold: None,
        ratio: if split_info > 0.0 { gain / split_info } else { 0.0 },
        branches,
        gain,
    })
}

/// Split information over the branches plus the rows with a missing value.
fn split_information(sizes: &[f64], total: f64) -> f64 {
    let missing = total - sizes.iter().sum::<f64>();
    let mut all = sizes.to_vec();
    if missing > 0.0 {
        all.push(missing);
    }
    entropy(&all)
}

fn leaf_estimated_errors(counts: &[f64]) -> f64 {
    let n: f64 = counts.iter().sum();
    let majority = counts.iter().copied().fold(0.0, f64::max);
    let errors = n - majority;
    errors + added_errors(n, errors)
}

/// Extra errors implied by the upper confidence limit of the binomial error
/// rate at confidence 0.25.
fn added_errors(n: f64, e: f64) -> f64 {
    const CF: f64 = 0.25;
    if n <= 0.0 {
        return 0.0;
    }
    if e < 1.0 {
        let base = n * (1.0 - CF.powf(1.0 / n));
        if e == 0.0 {
            return base;
        }
        return base + e * (added_errors(n, 1.0) - base);
    }
    if e + 0.5 >= n {
        return (n - e).max(0.0);
    }
    let z = Z_CONFIDENCE_25;
    let f = (e + 0.5) / n;
    let r = (f + z * z / (2.0 * n) + z * (f / n - f * f / n + z * z / (4.0 * n * n)).sqrt())
        / (1.0 + z * z / n);
    r * n - e
}
