//! Result table files: header first, then one flushed line per row

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::pipeline::error::{BenchError, BenchResult};
use crate::pipeline::metrics::Metric;

/// `<output dir>/<method>_<metric>.csv`
pub fn table_path(output_dir: &Path, method: &str, metric: Metric) -> PathBuf {
    output_dir.join(format!("{}_{}.csv", method, metric.name()))
}

/// An open result table file. Every appended line is flushed immediately so
/// the file always ends on a complete row.
#[derive(Debug)]
pub struct TableFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl TableFile {
    /// Create (or truncate) the file and write the header line.
    pub fn create(path: PathBuf, header: &str) -> BenchResult<Self> {
        let file = File::create(&path).map_err(|e| BenchError::write(&path, e))?;
        let mut table = Self {
            path,
            writer: BufWriter::new(file),
        };
        table.append_line(header)?;
        Ok(table)
    }

    pub fn append_line(&mut self, line: &str) -> BenchResult<()> {
        writeln!(self.writer, "{}", line)
            .and_then(|_| self.writer.flush())
            .map_err(|e| BenchError::write(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_visible_after_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = table_path(dir.path(), "ReliefF", Metric::Kappa);
        assert!(path.ends_with("ReliefF_kappa.csv"));

        let mut table = TableFile::create(path.clone(), "#ofAttributes\tNB\taverage").unwrap();
        table.append_line("1\t0.5\t0.5").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "#ofAttributes\tNB\taverage\n1\t0.5\t0.5\n");
    }

    #[test]
    fn test_unwritable_location_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.csv");
        let err = TableFile::create(path, "h").unwrap_err();
        assert!(matches!(err, BenchError::Write { .. }));
    }
}
