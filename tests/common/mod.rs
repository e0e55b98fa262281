//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

/// Create a labelled DataFrame laid out like a benchmark input file:
/// `id`, `class` (`neg`/`pos`, alternating), then `f0..f{n-1}`.
///
/// Feature `f{j}` carries a class shift that shrinks with `j`, so `f0` is the
/// most informative feature and the last one is close to pure noise.
pub fn create_labelled_dataframe(rows: usize, features: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let labels: Vec<usize> = (0..rows).map(|i| i % 2).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(features + 2);
    let ids: Vec<String> = (0..rows).map(|i| format!("s{}", i)).collect();
    columns.push(Column::new("id".into(), ids));
    let classes: Vec<&str> = labels
        .iter()
        .map(|&l| if l == 1 { "pos" } else { "neg" })
        .collect();
    columns.push(Column::new("class".into(), classes));

    for j in 0..features {
        let shift = 3.0 * (features - j) as f64 / features as f64;
        let values: Vec<f64> = labels
            .iter()
            .map(|&l| l as f64 * shift + rng.gen::<f64>())
            .collect();
        columns.push(Column::new(format!("f{}", j).into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Write a DataFrame with the given separator.
pub fn write_frame(df: &mut DataFrame, path: &Path, separator: u8) {
    let mut file = std::fs::File::create(path).unwrap();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(df)
        .unwrap();
}

/// Create a temporary directory holding `data.csv` (comma-separated)
pub fn create_temp_dataset(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.csv");
    write_frame(df, &path, b',');
    (temp_dir, path)
}

/// Write `top<k>features_<method>.csv` files for `ks` into
/// `<reduced_dir>/<method>/`, taking features in column order.
pub fn write_subset_files(
    df: &DataFrame,
    reduced_dir: &Path,
    method: &str,
    ks: std::ops::RangeInclusive<usize>,
) -> PathBuf {
    let method_dir = reduced_dir.join(method);
    std::fs::create_dir_all(&method_dir).unwrap();
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();
    for k in ks {
        let mut subset = df.select(names[..k + 2].iter().map(String::as_str)).unwrap();
        let path = method_dir.join(format!("top{}features_{}.csv", k, method));
        write_frame(&mut subset, &path, b'\t');
    }
    method_dir
}

/// Parsed result table: header cells and rows of (k, values including average)
pub fn read_result_table(path: &Path) -> (Vec<String>, Vec<(usize, Vec<f64>)>) {
    let content = std::fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    let header = lines
        .next()
        .unwrap()
        .split('\t')
        .map(str::to_string)
        .collect();
    let rows = lines
        .map(|line| {
            let mut cells = line.split('\t');
            let k = cells.next().unwrap().parse().unwrap();
            let values = cells.map(|c| c.parse().unwrap()).collect();
            (k, values)
        })
        .collect();
    (header, rows)
}
