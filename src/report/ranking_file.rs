//! Ranking files: `<dir>/<method>.csv`
//!
//! The header line is comma-joined (`attributeName,score`) while data rows
//! are tab-separated. Downstream tooling reads these bytes as they are, so
//! both separators are kept.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::pipeline::aggregate::format_value;
use crate::pipeline::error::{BenchError, BenchResult};
use crate::pipeline::ranking::{RankedFeature, Ranking};

pub const RANKING_HEADER: &str = "attributeName,score";

pub fn ranking_path(dir: &Path, method: &str) -> PathBuf {
    dir.join(format!("{}.csv", method))
}

/// Write `ranking` to `<dir>/<method>.csv`, replacing any existing file.
pub fn write_ranking(ranking: &Ranking, dir: &Path, method: &str) -> BenchResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| BenchError::write(dir, e))?;
    let path = ranking_path(dir, method);
    let file = File::create(&path).map_err(|e| BenchError::write(&path, e))?;
    let mut writer = BufWriter::new(file);

    let result = (|| {
        writeln!(writer, "{}", RANKING_HEADER)?;
        for entry in &ranking.entries {
            writeln!(writer, "{}\t{}", entry.name, format_value(entry.score))?;
        }
        writer.flush()
    })();
    result.map_err(|e| BenchError::write(&path, e))?;
    Ok(path)
}

/// Read a ranking file back, in file order.
pub fn read_ranking(path: &Path) -> BenchResult<Ranking> {
    let content = fs::read_to_string(path).map_err(|e| BenchError::load(path, e))?;
    let malformed = |message: String| BenchError::RankingFormat {
        path: path.to_path_buf(),
        message,
    };

    let mut lines = content.lines();
    match lines.next() {
        Some(header) if header.trim_end() == RANKING_HEADER => {}
        Some(other) => return Err(malformed(format!("unexpected header '{}'", other))),
        None => return Err(malformed("file is empty".to_string())),
    }

    let mut entries = Vec::new();
    for (i, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (name, score) = line
            .split_once('\t')
            .ok_or_else(|| malformed(format!("line {} is not tab-separated", i + 2)))?;
        let score: f64 = score
            .trim()
            .parse()
            .map_err(|_| malformed(format!("line {} has a non-numeric score '{}'", i + 2, score)))?;
        entries.push(RankedFeature {
            name: name.to_string(),
            score,
        });
    }
    Ok(Ranking { entries })
}

/// Ranking files in `dir` as (method name, path), sorted by method name.
pub fn ranking_files(dir: &Path) -> BenchResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| BenchError::load(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BenchError::load(dir, e))?.path();
        let is_csv = path.extension().is_some_and(|ext| ext == "csv");
        if path.is_file() && is_csv {
            if let Some(stem) = path.file_stem() {
                files.push((stem.to_string_lossy().into_owned(), path));
            }
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking() -> Ranking {
        Ranking {
            entries: vec![
                RankedFeature {
                    name: "gene_b".into(),
                    score: 0.75,
                },
                RankedFeature {
                    name: "gene_a".into(),
                    score: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_file_layout_mixes_separators() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ranking(&ranking(), dir.path(), "ReliefF").unwrap();
        assert!(path.ends_with("ReliefF.csv"));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "attributeName,score\ngene_b\t0.75\ngene_a\t0.0\n");
        assert_eq!(read_ranking(&path).unwrap(), ranking());
    }

    #[test]
    fn test_bad_header_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.csv");
        fs::write(&path, "name\tscore\na\t1\n").unwrap();
        assert!(matches!(
            read_ranking(&path).unwrap_err(),
            BenchError::RankingFormat { .. }
        ));
    }

    #[test]
    fn test_ranking_files_lists_csv_stems() {
        let dir = tempfile::tempdir().unwrap();
        write_ranking(&ranking(), dir.path(), "InfoGain").unwrap();
        write_ranking(&ranking(), dir.path(), "GainRatio").unwrap();
        fs::write(dir.path().join("readme.txt"), "x").unwrap();
        let names: Vec<String> = ranking_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["GainRatio", "InfoGain"]);
    }
}
