//! JSON configuration, candidate files and reports.

use crate::core::{run, LanmsError, LanmsParams};
use crate::rows::{quads_from_rows, quads_to_rows, Row, ROW_LEN};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum LanmsIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Lanms(#[from] LanmsError),
}

/// Configuration for a file-to-file run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanmsRunConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub params: LanmsParams,
}

impl LanmsRunConfig {
    /// Load a JSON config from disk.
    ///
    /// A relative `input_path`/`output_path` is resolved against the config
    /// file's directory.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LanmsIoError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;
        if let Some(base) = path.parent() {
            config.input_path = resolve(base, &config.input_path);
            config.output_path = config.output_path.map(|p| resolve(base, &p));
        }
        Ok(config)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanmsReport {
    pub input_count: usize,
    pub merged_count: usize,
    pub output_count: usize,
    pub params: LanmsParams,
    pub polygons: Vec<Row>,
}

impl LanmsReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LanmsIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LanmsIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Run the full pipeline over pixel-space rows and summarize it.
pub fn process_rows(rows: &[Row], params: &LanmsParams) -> Result<LanmsReport, LanmsError> {
    params.validate()?;
    let quads = quads_from_rows(rows.as_flattened(), params.precision)?;
    let out = run(&quads, params)?;
    log::info!(
        "{} candidates -> {} merged -> {} kept",
        quads.len(),
        out.merged.len(),
        out.kept.len()
    );
    Ok(LanmsReport {
        input_count: quads.len(),
        merged_count: out.merged.len(),
        output_count: out.kept.len(),
        params: params.clone(),
        polygons: quads_to_rows(&out.kept, params.precision),
    })
}

/// Read candidate rows from a file.
///
/// Files whose first non-blank character is `[` are parsed as a JSON array
/// of 9-number arrays. Anything else is read as text: one row per line,
/// values separated by whitespace and/or commas, `#` starts a comment.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<Row>, LanmsIoError> {
    let raw = fs::read_to_string(path)?;
    parse_rows(&raw)
}

pub fn parse_rows(raw: &str) -> Result<Vec<Row>, LanmsIoError> {
    if raw.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(raw)?);
    }

    let mut rows = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let values = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                tok.parse::<f32>().map_err(|err| LanmsIoError::Parse {
                    line: line_no,
                    message: format!("invalid number {tok:?}: {err}"),
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;
        let row: Row = values
            .as_slice()
            .try_into()
            .map_err(|_| LanmsIoError::Parse {
                line: line_no,
                message: format!("expected {ROW_LEN} values, got {}", values.len()),
            })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_rows_with_comments() {
        let raw = "# x0 y0 x1 y1 x2 y2 x3 y3 score\n\
                   0 0 1 0 1 1 0 1 0.9\n\
                   \n\
                   10, 10, 11, 10, 11, 11, 10, 11, 0.95  # far away\n";
        let rows = parse_rows(raw).expect("parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][8], 0.9);
        assert_eq!(rows[1][0], 10.0);
        assert_eq!(rows[1][8], 0.95);
    }

    #[test]
    fn parses_json_rows() {
        let rows = parse_rows("[[0,0,1,0,1,1,0,1,0.5]]").expect("parse");
        assert_eq!(rows, vec![[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.5]]);
    }

    #[test]
    fn reports_line_of_short_row() {
        let err = parse_rows("0 0 1 0 1 1 0 1 0.5\n1 2 3\n").unwrap_err();
        match err {
            LanmsIoError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("got 3"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_bad_number() {
        let err = parse_rows("0 0 1 0 1 1 0 one 0.5\n").unwrap_err();
        assert!(matches!(err, LanmsIoError::Parse { line: 1, .. }));
    }

    #[test]
    fn process_rows_counts_each_stage() {
        let rows: Vec<Row> = vec![
            [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.9],
            [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.8],
            [10.0, 10.0, 11.0, 10.0, 11.0, 11.0, 10.0, 11.0, 0.95],
        ];
        let report = process_rows(&rows, &LanmsParams::with_threshold(0.5)).expect("process");
        assert_eq!(report.input_count, 3);
        assert_eq!(report.merged_count, 2);
        assert_eq!(report.output_count, 2);
        assert_eq!(report.polygons.len(), 2);
    }
}
