//! Agreement between selection methods: Kendall's coefficient of concordance
//!
//! For each prefix length n the rank matrix has one row per method and one
//! column per feature in the union of the methods' top-n lists. A feature a
//! method did not place in its top n gets the size of the union as its rank.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::pipeline::error::{BenchError, BenchResult};
use crate::pipeline::ranking::Ranking;

/// Prefix lengths compared; `None` means the full rankings
pub const AGREEMENT_PREFIXES: [Option<usize>; 4] = [Some(50), Some(500), Some(5000), None];

pub const AGREEMENT_FILE: &str = "kendallsW.csv";
pub const AGREEMENT_HEADER: &str = "top n,Kendalls W, p-value";

/// Random rank matrices drawn for the p-value
pub const PERMUTATIONS: usize = 1000;

/// Permuted W within this distance of the observed W counts as a tie
const TIE_TOLERANCE: f64 = 1e-12;

/// Concordance for one prefix length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agreement {
    /// Requested prefix length, or the number of ranked columns for "all"
    pub top_n: usize,
    pub w: f64,
    pub p_value: f64,
}

/// Rank matrix (`methods x features`) for the top `n` of each ranking.
pub fn rank_matrix(rankings: &[&Ranking], top_n: Option<usize>) -> Vec<Vec<f64>> {
    let mut columns: Vec<&str> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for ranking in rankings {
        for name in prefix(ranking, top_n) {
            if !index.contains_key(name) {
                index.insert(name, columns.len());
                columns.push(name);
            }
        }
    }

    let width = columns.len();
    rankings
        .iter()
        .map(|ranking| {
            let mut ranks = vec![width as f64; width];
            for (pos, name) in prefix(ranking, top_n).into_iter().enumerate() {
                if let Some(&col) = index.get(name) {
                    ranks[col] = (pos + 1) as f64;
                }
            }
            ranks
        })
        .collect()
}

fn prefix(ranking: &Ranking, top_n: Option<usize>) -> Vec<&str> {
    match top_n {
        Some(n) => ranking.top(n),
        None => ranking.names(),
    }
}

/// W = 12 S / (m^2 (n^3 - n)), S the squared deviation of the column rank
/// sums from their mean. `NaN` for fewer than two columns or rows.
pub fn kendalls_w(matrix: &[Vec<f64>]) -> f64 {
    let m = matrix.len();
    let n = matrix.first().map_or(0, Vec::len);
    if m < 2 || n < 2 {
        return f64::NAN;
    }
    let sums: Vec<f64> = (0..n).map(|j| matrix.iter().map(|row| row[j]).sum()).collect();
    let mean = sums.iter().sum::<f64>() / n as f64;
    let s: f64 = sums.iter().map(|r| (r - mean).powi(2)).sum();
    let (m, n) = (m as f64, n as f64);
    12.0 * s / (m * m * (n * n * n - n))
}

/// Share of random rank matrices of the same shape whose W is at least `w`.
pub fn permutation_p_value(w: f64, m: usize, n: usize, permutations: usize, seed: u64) -> f64 {
    if w.is_nan() || permutations == 0 {
        return f64::NAN;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let base: Vec<f64> = (1..=n).map(|r| r as f64).collect();
    let mut at_least = 0usize;
    for _ in 0..permutations {
        let trial: Vec<Vec<f64>> = (0..m)
            .map(|_| {
                let mut row = base.clone();
                row.shuffle(&mut rng);
                row
            })
            .collect();
        if kendalls_w(&trial) >= w - TIE_TOLERANCE {
            at_least += 1;
        }
    }
    at_least as f64 / permutations as f64
}

/// Concordance of `rankings` for every prefix in [`AGREEMENT_PREFIXES`].
pub fn agreement_scores(rankings: &[&Ranking], seed: u64) -> Vec<Agreement> {
    AGREEMENT_PREFIXES
        .iter()
        .map(|&top_n| {
            let matrix = rank_matrix(rankings, top_n);
            let m = matrix.len();
            let n = matrix.first().map_or(0, Vec::len);
            let w = kendalls_w(&matrix);
            Agreement {
                top_n: top_n.unwrap_or(n),
                w,
                p_value: permutation_p_value(w, m, n, PERMUTATIONS, seed),
            }
        })
        .collect()
}

/// Write `<dir>/kendallsW.csv`.
pub fn write_agreement(scores: &[Agreement], dir: &Path) -> BenchResult<PathBuf> {
    let path = dir.join(AGREEMENT_FILE);
    let file = File::create(&path).map_err(|e| BenchError::write(&path, e))?;
    let mut writer = BufWriter::new(file);
    let result = (|| {
        writeln!(writer, "{}", AGREEMENT_HEADER)?;
        for a in scores {
            writeln!(writer, "{},{:?},{:?}", a.top_n, a.w, a.p_value)?;
        }
        writer.flush()
    })();
    result.map_err(|e| BenchError::write(&path, e))?;
    Ok(path)
}
