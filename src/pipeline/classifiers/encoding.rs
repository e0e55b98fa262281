//! Numeric input encoding for vector-based classifiers
//!
//! Numeric features are min-max normalised over the training rows and
//! categorical features are one-hot encoded. Missing cells are replaced by
//! the training mean (numeric) or the training mode (categorical).

use crate::pipeline::dataset::Dataset;

#[derive(Debug, Clone)]
enum EncodedColumn {
    Numeric {
        feature: usize,
        min: f64,
        range: f64,
        mean: f64,
    },
    OneHot {
        feature: usize,
        levels: usize,
        mode: usize,
    },
}

/// Encoder fitted on training rows only
#[derive(Debug, Clone)]
pub struct InputEncoder {
    columns: Vec<EncodedColumn>,
    width: usize,
}

impl InputEncoder {
    pub fn fit(data: &Dataset, rows: &[usize]) -> Self {
        let mut columns = Vec::with_capacity(data.num_features());
        let mut width = 0;

        for (index, feature) in data.features().iter().enumerate() {
            if feature.is_categorical() {
                let levels = feature.levels.len().max(1);
                let mut counts = vec![0usize; levels];
                for &r in rows {
                    if let Some(v) = feature.value(r) {
                        counts[v as usize] += 1;
                    }
                }
                let mode = counts
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                columns.push(EncodedColumn::OneHot {
                    feature: index,
                    levels,
                    mode,
                });
                width += levels;
            } else {
                let known: Vec<f64> = rows.iter().filter_map(|&r| feature.value(r)).collect();
                let (min, max, mean) = if known.is_empty() {
                    (0.0, 0.0, 0.0)
                } else {
                    let min = known.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    let mean = known.iter().sum::<f64>() / known.len() as f64;
                    (min, max, mean)
                };
                columns.push(EncodedColumn::Numeric {
                    feature: index,
                    min,
                    range: max - min,
                    mean,
                });
                width += 1;
            }
        }

        Self { columns, width }
    }

    /// Length of every encoded vector.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Dataset feature index behind each encoded position.
    pub fn source_features(&self) -> Vec<usize> {
        let mut sources = Vec::with_capacity(self.width);
        for column in &self.columns {
            match column {
                EncodedColumn::Numeric { feature, .. } => sources.push(*feature),
                EncodedColumn::OneHot {
                    feature, levels, ..
                } => sources.extend(std::iter::repeat(*feature).take(*levels)),
            }
        }
        sources
    }

    pub fn encode(&self, data: &Dataset, row: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width);
        for column in &self.columns {
            match *column {
                EncodedColumn::Numeric {
                    feature,
                    min,
                    range,
                    mean,
                } => {
                    let v = data.feature(feature).value(row).unwrap_or(mean);
                    out.push(if range > 0.0 { (v - min) / range } else { 0.0 });
                }
                EncodedColumn::OneHot {
                    feature,
                    levels,
                    mode,
                } => {
                    let code = data
                        .feature(feature)
                        .value(row)
                        .map(|v| v as usize)
                        .filter(|&c| c < levels)
                        .unwrap_or(mode);
                    out.extend((0..levels).map(|l| if l == code { 1.0 } else { 0.0 }));
                }
            }
        }
        out
    }

    pub fn encode_rows(&self, data: &Dataset, rows: &[usize]) -> Vec<Vec<f64>> {
        rows.iter().map(|&r| self.encode(data, r)).collect()
    }
}
