//! Per-metric result rows and the append-only tables they form

use serde::Serialize;

use super::error::{BenchError, BenchResult};
use super::evaluator::EvaluationResults;
use super::metrics::Metric;

/// First header cell of every result table
pub const FEATURE_COUNT_HEADER: &str = "#ofAttributes";
pub const AVERAGE_HEADER: &str = "average";

/// Field separator of result tables
pub const TABLE_SEPARATOR: char = '\t';

/// Values of one metric at one feature count, plus their cross-classifier mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub k: usize,
    pub values: Vec<f64>,
    pub average: f64,
}

impl MetricRow {
    /// Build a row; the average covers the finite values only and is `NaN`
    /// when no classifier produced one.
    pub fn new(k: usize, values: Vec<f64>) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let average = if finite.is_empty() {
            f64::NAN
        } else {
            finite.iter().sum::<f64>() / finite.len() as f64
        };
        Self { k, values, average }
    }

    /// Tab-separated line for the table file.
    pub fn format(&self) -> String {
        std::iter::once(self.k.to_string())
            .chain(self.values.iter().map(|v| format_value(*v)))
            .chain(std::iter::once(format_value(self.average)))
            .collect::<Vec<_>>()
            .join(&TABLE_SEPARATOR.to_string())
    }
}

/// Rows for every metric in `results`, in the order the metrics were requested.
pub fn rows_for(k: usize, results: &EvaluationResults) -> Vec<(Metric, MetricRow)> {
    results
        .metrics
        .iter()
        .map(|m| (m.metric, MetricRow::new(k, m.values.clone())))
        .collect()
}

/// Append-only table of rows for one metric, ordered by strictly increasing k
#[derive(Debug, Clone, Serialize)]
pub struct ResultTable {
    pub metric: Metric,
    pub classifiers: Vec<String>,
    rows: Vec<MetricRow>,
}

impl ResultTable {
    pub fn new(metric: Metric, classifiers: Vec<String>) -> Self {
        Self {
            metric,
            classifiers,
            rows: Vec::new(),
        }
    }

    pub fn header_cells(&self) -> Vec<&str> {
        std::iter::once(FEATURE_COUNT_HEADER)
            .chain(self.classifiers.iter().map(String::as_str))
            .chain(std::iter::once(AVERAGE_HEADER))
            .collect()
    }

    pub fn header(&self) -> String {
        self.header_cells().join(&TABLE_SEPARATOR.to_string())
    }

    /// Append a row, rejecting one whose k does not exceed the last row's or
    /// whose width does not match the classifier columns.
    pub fn append(&mut self, row: MetricRow) -> BenchResult<&MetricRow> {
        if let Some(last) = self.rows.last() {
            if row.k <= last.k {
                return Err(BenchError::RowOrder {
                    metric: self.metric.to_string(),
                    last: last.k,
                    k: row.k,
                });
            }
        }
        if row.values.len() != self.classifiers.len() {
            return Err(BenchError::classifier(
                self.metric.name(),
                format!(
                    "row for k = {} has {} values for {} classifiers",
                    row.k,
                    row.values.len(),
                    self.classifiers.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(&self.rows[self.rows.len() - 1])
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn last(&self) -> Option<&MetricRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Shortest round-trip decimal, always with a fractional part (`85.0`).
pub fn format_value(v: f64) -> String {
    format!("{:?}", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_is_mean_of_values() {
        let row = MetricRow::new(3, vec![80.0, 90.0]);
        assert_eq!(row.average, 85.0);
        assert_eq!(row.format(), "3\t80.0\t90.0\t85.0");
    }

    #[test]
    fn test_average_skips_failed_classifiers() {
        let row = MetricRow::new(1, vec![0.5, f64::NAN, 0.7]);
        assert!((row.average - 0.6).abs() < 1e-12);
        assert_eq!(row.format(), "1\t0.5\tNaN\t0.7\t0.6");
        assert!(MetricRow::new(1, vec![f64::NAN]).average.is_nan());
    }

    #[test]
    fn test_header_layout() {
        let table = ResultTable::new(Metric::Accuracy, vec!["NB".into(), "C4.5".into()]);
        assert_eq!(table.header(), "#ofAttributes\tNB\tC4.5\taverage");
    }

    #[test]
    fn test_rows_must_increase() {
        let mut table = ResultTable::new(Metric::F1, vec!["NB".into()]);
        table.append(MetricRow::new(1, vec![0.5])).unwrap();
        table.append(MetricRow::new(2, vec![0.6])).unwrap();
        let err = table.append(MetricRow::new(2, vec![0.7])).unwrap_err();
        assert!(matches!(err, BenchError::RowOrder { last: 2, k: 2, .. }));
        assert!(table.append(MetricRow::new(3, vec![0.1, 0.2])).is_err());
        assert_eq!(table.len(), 2);
    }
}
