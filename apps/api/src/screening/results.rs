#![allow(dead_code)]

//! Pairs resumes with scores, sorts them, and exports the ranking.

use std::cmp::Ordering;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::screening::similarity::RankError;

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 2] = ["Resume", "Score"];
/// Suggested file name for the downloadable export.
pub const EXPORT_FILE_NAME: &str = "resume_ranking_results.csv";
/// Top-K display cap used when none is configured.
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One resume and its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub resume: String,
    pub score: f64,
    /// Position of the resume among the successfully extracted uploads.
    pub upload_index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Resume")]
    resume: String,
    #[serde(rename = "Score")]
    score: f64,
}

/// Score records sorted by descending score; ties keep upload order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingResult {
    records: Vec<ScoreRecord>,
}

impl RankingResult {
    pub fn from_scores(resumes: Vec<String>, scores: Vec<f64>) -> Result<Self, RankError> {
        if resumes.len() != scores.len() {
            return Err(RankError::ScoreCountMismatch {
                documents: resumes.len(),
                scores: scores.len(),
            });
        }

        let mut records: Vec<ScoreRecord> = resumes
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(upload_index, (resume, score))| ScoreRecord {
                resume,
                score,
                upload_index,
            })
            .collect();

        // `sort_by` is stable, so equal scores stay in upload order.
        records.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        Ok(RankingResult { records })
    }

    pub fn entries(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The best `min(k, N)` records.
    pub fn top(&self, k: usize) -> &[ScoreRecord] {
        &self.records[..k.min(self.records.len())]
    }

    /// Serializes as `Resume,Score` CSV with full-precision scores.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for record in &self.records {
            let score = record.score.to_string();
            writer.write_record([record.resume.as_str(), score.as_str()])?;
        }
        writer.flush()?;
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        std::fs::write(path, self.to_csv()?)?;
        Ok(())
    }
}

/// Parses a `Resume,Score` export back into `(resume, score)` pairs.
pub fn parse_csv_export(input: &str) -> Result<Vec<(String, f64)>, ExportError> {
    let mut reader = csv::Reader::from_reader(input.as_bytes());
    reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(|r| (r.resume, r.score)).map_err(ExportError::from))
        .collect()
}

/// Formats a score for display, truncated (not rounded) to two decimals.
pub fn format_display_score(score: f64) -> String {
    // `-0.0` and NaN both display as zero.
    let score = if score > 0.0 { score.min(1.0) } else { 0.0 };
    let full = format!("{:.10}", score);
    match full.find('.') {
        Some(dot) => full[..dot + 3].to_string(),
        None => full,
    }
}
