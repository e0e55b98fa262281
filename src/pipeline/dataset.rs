//! In-memory tabular dataset with a designated label column
//!
//! Delimited files are read with polars and converted once into a columnar,
//! immutable [`Dataset`]: every feature becomes a vector of `f64` (category
//! codes for categorical columns, `NaN` for missing cells) and the label
//! becomes a vector of class indices.

use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;
use serde::Serialize;

use super::error::{BenchError, BenchResult};

/// Rows used for CSV schema inference
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Semantic type of a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeatureType {
    Numeric,
    Categorical,
}

/// A single feature column
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureType,
    /// Category labels, indexed by code (empty for numeric features)
    pub levels: Vec<String>,
    /// Numeric values or category codes; `NaN` marks a missing cell
    pub values: Vec<f64>,
}

impl Feature {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureType::Numeric,
            levels: Vec::new(),
            values,
        }
    }

    /// Build a categorical feature, assigning codes in order of first appearance.
    pub fn categorical<S: AsRef<str>>(name: impl Into<String>, cells: &[Option<S>]) -> Self {
        let (levels, values) = encode_levels(cells);
        Self {
            name: name.into(),
            kind: FeatureType::Categorical,
            levels,
            values,
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.kind == FeatureType::Categorical
    }

    pub fn value(&self, row: usize) -> Option<f64> {
        let v = self.values[row];
        if v.is_nan() {
            None
        } else {
            Some(v)
        }
    }
}

/// Immutable dataset: ordered feature columns plus one label column.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Vec<Feature>,
    label_name: String,
    classes: Vec<String>,
    labels: Vec<usize>,
}

impl Dataset {
    /// Assemble a dataset, checking that every column has one cell per label.
    pub fn new(
        features: Vec<Feature>,
        label_name: impl Into<String>,
        classes: Vec<String>,
        labels: Vec<usize>,
    ) -> BenchResult<Self> {
        let label_name = label_name.into();
        let rows = labels.len();
        if let Some(bad) = features.iter().find(|f| f.values.len() != rows) {
            return Err(BenchError::load(
                label_name.as_str(),
                format!(
                    "column '{}' has {} cells but the label has {}",
                    bad.name,
                    bad.values.len(),
                    rows
                ),
            ));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= classes.len()) {
            return Err(BenchError::load(
                label_name.as_str(),
                format!("label index {} out of range for {} classes", bad, classes.len()),
            ));
        }
        Ok(Self {
            features,
            label_name,
            classes,
            labels,
        })
    }

    /// Convert a polars frame, using the column at `label_index` as the label.
    pub fn from_frame(df: &DataFrame, label_index: usize, source: &Path) -> BenchResult<Self> {
        let columns = df.get_columns();
        let label_col = columns.get(label_index).ok_or_else(|| {
            BenchError::load(
                source,
                format!("no label column at index {} ({} columns)", label_index, columns.len()),
            )
        })?;

        let label_cells = column_to_strings(label_col).map_err(|e| BenchError::load(source, e))?;
        if label_cells.iter().any(Option::is_none) {
            return Err(BenchError::load(
                source,
                format!("label column '{}' contains missing values", label_col.name()),
            ));
        }
        let (classes, codes) = encode_levels(&label_cells);
        let labels = codes.into_iter().map(|c| c as usize).collect();

        let mut features = Vec::with_capacity(columns.len().saturating_sub(1));
        for (i, col) in columns.iter().enumerate() {
            if i == label_index {
                continue;
            }
            features.push(convert_column(col).map_err(|e| BenchError::load(source, e))?);
        }

        Dataset::new(features, label_col.name().to_string(), classes, labels)
            .map_err(|e| BenchError::load(source, e))
    }

    pub fn num_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, index: usize) -> &Feature {
        &self.features[index]
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    pub fn label_name(&self) -> &str {
        &self.label_name
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn label(&self, row: usize) -> usize {
        self.labels[row]
    }

    /// Indices of every row, in file order.
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.num_rows()).collect()
    }

    /// Per-class row counts over the given rows.
    pub fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_classes()];
        for &r in rows {
            counts[self.labels[r]] += 1;
        }
        counts
    }

    /// Number of classes that actually occur in the data.
    pub fn observed_classes(&self) -> usize {
        self.class_counts(&self.all_rows())
            .iter()
            .filter(|&&c| c > 0)
            .count()
    }

    /// A copy restricted to the named features (in the given order) plus the label.
    pub fn select(&self, names: &[&str]) -> BenchResult<Dataset> {
        let mut features = Vec::with_capacity(names.len());
        for name in names {
            let idx = self.feature_index(name).ok_or_else(|| {
                BenchError::load(
                    self.label_name.as_str(),
                    format!("feature '{}' not present in dataset", name),
                )
            })?;
            features.push(self.features[idx].clone());
        }
        Ok(Dataset {
            features,
            label_name: self.label_name.clone(),
            classes: self.classes.clone(),
            labels: self.labels.clone(),
        })
    }
}

/// Read a delimited file with a header row into a polars frame.
pub fn read_frame(path: &Path, separator: u8) -> BenchResult<DataFrame> {
    if !path.is_file() {
        return Err(BenchError::load(path, "file does not exist"));
    }
    LazyCsvReader::new(path)
        .with_separator(separator)
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| BenchError::load(path, e))
}

/// Load a dataset using the benchmark file convention: the first column is a
/// sample identifier and is dropped, the next column is the label.
pub fn load_dataset(path: &Path, separator: u8) -> BenchResult<Dataset> {
    let df = read_frame(path, separator)?;
    if df.width() < 2 {
        return Err(BenchError::load(
            path,
            format!("expected an identifier and a label column, found {} column(s)", df.width()),
        ));
    }
    let df = df.drop_many(&[df.get_column_names()[0].to_string()]);
    Dataset::from_frame(&df, 0, path)
}

fn convert_column(col: &Column) -> PolarsResult<Feature> {
    let name = col.name().to_string();
    if col.dtype().is_primitive_numeric() {
        let cast = col.cast(&DataType::Float64)?;
        let values = cast
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(Feature::numeric(name, values))
    } else {
        let cells = column_to_strings(col)?;
        Ok(Feature::categorical(name, &cells))
    }
}

fn column_to_strings(col: &Column) -> PolarsResult<Vec<Option<String>>> {
    let cast = col.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

fn encode_levels<S: AsRef<str>>(cells: &[Option<S>]) -> (Vec<String>, Vec<f64>) {
    let mut levels: Vec<String> = Vec::new();
    let mut lookup: HashMap<String, usize> = HashMap::new();
    let values = cells
        .iter()
        .map(|cell| match cell {
            Some(s) => {
                let s = s.as_ref();
                let code = match lookup.get(s) {
                    Some(&c) => c,
                    None => {
                        levels.push(s.to_string());
                        lookup.insert(s.to_string(), levels.len() - 1);
                        levels.len() - 1
                    }
                };
                code as f64
            }
            None => f64::NAN,
        })
        .collect();
    (levels, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Dataset {
        let features = vec![
            Feature::numeric("a", vec![1.0, 2.0, f64::NAN]),
            Feature::categorical("b", &[Some("x"), Some("y"), Some("x")]),
        ];
        Dataset::new(features, "class", vec!["neg".into(), "pos".into()], vec![0, 1, 1]).unwrap()
    }

    #[test]
    fn test_categorical_codes_follow_first_appearance() {
        let f = Feature::categorical("c", &[Some("red"), None, Some("blue"), Some("red")]);
        assert_eq!(f.levels, vec!["red", "blue"]);
        assert_eq!(f.values[0], 0.0);
        assert!(f.values[1].is_nan());
        assert_eq!(f.values[2], 1.0);
    }

    #[test]
    fn test_select_keeps_requested_order() {
        let ds = tiny();
        let sub = ds.select(&["b", "a"]).unwrap();
        assert_eq!(sub.feature_names(), vec!["b", "a"]);
        assert_eq!(sub.labels(), ds.labels());
        assert!(ds.select(&["missing"]).is_err());
    }

    #[test]
    fn test_class_counts_and_missing() {
        let ds = tiny();
        assert_eq!(ds.class_counts(&ds.all_rows()), vec![1, 2]);
        assert_eq!(ds.feature(0).value(2), None);
        assert_eq!(ds.observed_classes(), 2);
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let features = vec![Feature::numeric("a", vec![1.0])];
        let result = Dataset::new(features, "class", vec!["x".into()], vec![0, 0]);
        assert!(result.is_err());
    }
}
