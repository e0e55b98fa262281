//! Top-k feature subsets
//!
//! Subsets live on disk as `<method dir>/top<k>features_<method>.csv`,
//! tab-separated, with an identifier column, the label, then the k highest
//! ranked features. [`SubsetBuilder`] reads them for the evaluation loop;
//! [`materialize_subsets`] writes them from a source frame and a ranking.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;

use super::dataset::{load_dataset, Dataset};
use super::error::{BenchError, BenchResult};
use super::ranking::Ranking;
use crate::utils::Diagnostics;

/// Field separator of subset files
pub const SUBSET_SEPARATOR: u8 = b'\t';

/// Conventional location of the size-`k` subset for `method`.
pub fn subset_path(method_dir: &Path, method: &str, k: usize) -> PathBuf {
    method_dir.join(format!("top{}features_{}.csv", k, method))
}

/// Loads pre-materialised subset files
#[derive(Debug, Clone, Copy)]
pub struct SubsetBuilder {
    separator: u8,
}

impl Default for SubsetBuilder {
    fn default() -> Self {
        Self {
            separator: SUBSET_SEPARATOR,
        }
    }
}

impl SubsetBuilder {
    pub fn with_separator(separator: u8) -> Self {
        Self { separator }
    }

    /// The size-`k` subset for `method`, or `Ok(None)` when no such file
    /// exists. A missing file ends the caller's k-loop; an unreadable one is
    /// a load error.
    pub fn subset_for(&self, method_dir: &Path, method: &str, k: usize) -> BenchResult<Option<Dataset>> {
        let path = subset_path(method_dir, method, k);
        if !path.is_file() {
            return Ok(None);
        }
        load_dataset(&path, self.separator).map(Some)
    }
}

/// Write the subset files for every k in `kmin..=min(kmax, usable features)`.
///
/// `frame` is the full source table; its first two columns (identifier and
/// label) lead every subset. Ranking entries that name no feature column of
/// `frame` are skipped with a warning. Returns the written paths in k order.
pub fn materialize_subsets(
    frame: &DataFrame,
    ranking: &Ranking,
    method: &str,
    output_dir: &Path,
    kmin: usize,
    kmax: usize,
    diagnostics: &dyn Diagnostics,
) -> BenchResult<Vec<PathBuf>> {
    let columns: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();
    if columns.len() < 2 {
        return Err(BenchError::load(
            output_dir,
            "source table needs an identifier and a label column",
        ));
    }
    let lead = [columns[0].clone(), columns[1].clone()];
    let available: HashSet<&str> = columns[2..].iter().map(String::as_str).collect();

    let mut ranked: Vec<String> = Vec::with_capacity(ranking.len());
    for name in ranking.names() {
        if available.contains(name) {
            ranked.push(name.to_string());
        } else {
            diagnostics.warn(&format!(
                "{}: ranked feature '{}' is not a column of the source table, skipping it",
                method, name
            ));
        }
    }

    let method_dir = output_dir.join(method);
    fs::create_dir_all(&method_dir).map_err(|e| BenchError::write(&method_dir, e))?;

    let upper = kmax.min(ranked.len());
    let mut written = Vec::new();
    for k in kmin.max(1)..=upper {
        let selection: Vec<String> = lead.iter().chain(&ranked[..k]).cloned().collect();
        let path = subset_path(&method_dir, method, k);
        write_subset(frame, &selection, &path)?;
        written.push(path);
    }
    diagnostics.info(&format!(
        "{}: wrote {} subset file(s) to {}",
        method,
        written.len(),
        method_dir.display()
    ));
    Ok(written)
}

fn write_subset(frame: &DataFrame, selection: &[String], path: &Path) -> BenchResult<()> {
    let to_io = |e: PolarsError| std::io::Error::other(e.to_string());
    let mut subset = frame
        .select(selection.iter().map(String::as_str))
        .map_err(|e| BenchError::write(path, to_io(e)))?;
    let mut file = File::create(path).map_err(|e| BenchError::write(path, e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(SUBSET_SEPARATOR)
        .finish(&mut subset)
        .map_err(|e| BenchError::write(path, to_io(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_path_convention() {
        let p = subset_path(Path::new("reduced/ReliefF"), "ReliefF", 7);
        assert_eq!(p, PathBuf::from("reduced/ReliefF/top7features_ReliefF.csv"));
    }

    #[test]
    fn test_missing_subset_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let found = SubsetBuilder::default()
            .subset_for(dir.path(), "InfoGain", 1)
            .unwrap();
        assert!(found.is_none());
    }
}
