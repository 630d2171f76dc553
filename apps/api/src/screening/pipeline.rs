//! One ranking run: extract → rank → aggregate → highlight the top-K.
//!
//! Runs are synchronous and share nothing. Uploads that cannot be extracted
//! are reported as skipped and the rest of the batch carries on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::extract::{extract_text, DocumentKind, ExtractError};
use crate::models::document::{Document, ScreeningRequest, SkippedDocument, UploadedDocument};
use crate::screening::experience::{estimate_experience_years, meets_minimum};
use crate::screening::keywords::highlight_keywords;
use crate::screening::results::{format_display_score, RankingResult, DEFAULT_TOP_K};
use crate::screening::similarity::{rank, IdfMode, RankError};

/// Characters of highlighted text shown per top candidate by default.
pub const DEFAULT_EXCERPT_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    pub top_k: usize,
    pub excerpt_chars: usize,
    pub idf_mode: IdfMode,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            idf_mode: IdfMode::default(),
        }
    }
}

/// A resume's place in the full ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResume {
    pub rank: usize,
    pub resume: String,
    pub score: f64,
    pub display_score: String,
    pub experience_years: Option<u32>,
    pub meets_experience: bool,
}

/// A top-K entry with its highlighted excerpt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCandidate {
    pub rank: usize,
    pub resume: String,
    pub score: f64,
    pub display_score: String,
    pub highlighted_excerpt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub min_experience_years: u32,
    pub ranked: Vec<RankedResume>,
    pub top_candidates: Vec<TopCandidate>,
    pub skipped: Vec<SkippedDocument>,
    #[serde(skip)]
    pub ranking: RankingResult,
}

/// Extracts every upload, splitting the batch into usable documents and
/// skipped uploads. Never fails as a whole.
pub fn extract_batch(uploads: &[UploadedDocument]) -> (Vec<Document>, Vec<SkippedDocument>) {
    let mut documents = Vec::with_capacity(uploads.len());
    let mut skipped = Vec::new();

    for upload in uploads {
        let extracted = DocumentKind::from_file_name(&upload.file_name)
            .and_then(|kind| extract_text(&upload.bytes, kind));

        match extracted {
            Ok(text) => documents.push(Document {
                id: upload.file_name.clone(),
                text,
            }),
            Err(e) => {
                match &e {
                    ExtractError::UnsupportedFormat(_) => {
                        warn!("Skipping unsupported file type: {}", upload.file_name)
                    }
                    ExtractError::ExtractionFailure { .. } => {
                        warn!("Skipping {}: {e}", upload.file_name)
                    }
                }
                skipped.push(SkippedDocument {
                    resume: upload.file_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (documents, skipped)
}

/// Scores and sorts `documents` against the job description.
///
/// An empty batch yields an empty result without invoking the ranker.
pub fn rank_documents(
    job_description: &str,
    documents: &[Document],
    idf_mode: IdfMode,
) -> Result<RankingResult, RankError> {
    if documents.is_empty() {
        return Ok(RankingResult::default());
    }

    let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
    let scores = rank(job_description, &texts[..], idf_mode)?;
    let ids = documents.iter().map(|d| d.id.clone()).collect();
    RankingResult::from_scores(ids, scores)
}

/// First `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Runs the full pipeline for one request.
///
/// Fails with `RankError::EmptyBatch` when no upload could be extracted.
pub fn run_screening(
    request: &ScreeningRequest,
    options: &RankingOptions,
) -> Result<ScreeningReport, RankError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("screening_run", %run_id);
    let _guard = span.enter();

    info!(
        "Ranking {} upload(s) against a {}-char job description",
        request.documents.len(),
        request.job_description.chars().count()
    );

    let (documents, skipped) = extract_batch(&request.documents);
    if documents.is_empty() {
        warn!("No valid resumes after extraction ({} skipped)", skipped.len());
        return Err(RankError::EmptyBatch);
    }

    let ranking = rank_documents(&request.job_description, &documents, options.idf_mode)?;

    let ranked = ranking
        .entries()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let experience_years = estimate_experience_years(&documents[record.upload_index].text);
            RankedResume {
                rank: i + 1,
                resume: record.resume.clone(),
                score: record.score,
                display_score: format_display_score(record.score),
                experience_years,
                meets_experience: meets_minimum(experience_years, request.min_experience_years),
            }
        })
        .collect();

    let top_candidates = ranking
        .top(options.top_k)
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let text = &documents[record.upload_index].text;
            TopCandidate {
                rank: i + 1,
                resume: record.resume.clone(),
                score: record.score,
                display_score: format_display_score(record.score),
                highlighted_excerpt: excerpt(
                    &highlight_keywords(text, &request.keywords),
                    options.excerpt_chars,
                ),
            }
        })
        .collect();

    if let Some(best) = ranking.entries().first() {
        info!(
            "Ranked {} resume(s), {} skipped; best: {} ({})",
            ranking.len(),
            skipped.len(),
            best.resume,
            format_display_score(best.score)
        );
    }

    Ok(ScreeningReport {
        run_id,
        generated_at: Utc::now(),
        min_experience_years: request.min_experience_years,
        ranked,
        top_candidates,
        skipped,
        ranking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::results::parse_csv_export;
    use crate::testing::{docx_bytes, pdf_bytes};

    fn request(uploads: Vec<UploadedDocument>, keywords: &[&str]) -> ScreeningRequest {
        ScreeningRequest {
            job_description: "Python SQL".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            min_experience_years: 0,
            documents: uploads,
        }
    }

    fn doc(id: &str, text: &str) -> Document {
        Document {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_rank_documents_example() {
        let documents = vec![doc("a.pdf", "I know Python and SQL"), doc("b.pdf", "I know nothing")];
        let result = rank_documents("Python SQL", &documents, IdfMode::QueryInCorpus).unwrap();
        assert_eq!(result.entries()[0].resume, "a.pdf");
        assert!(result.entries()[0].score > result.entries()[1].score);
    }

    #[test]
    fn test_rank_documents_empty_short_circuits() {
        // An empty query would be an empty vocabulary if the ranker ran.
        let result = rank_documents("", &[], IdfMode::QueryInCorpus).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_rank_documents_ties_keep_upload_order() {
        let documents = vec![
            doc("z.docx", "Rust engineer"),
            doc("y.pdf", "gardening"),
            doc("x.pdf", "Rust engineer"),
        ];
        let result = rank_documents("rust", &documents, IdfMode::QueryInCorpus).unwrap();
        let order: Vec<_> = result.entries().iter().map(|r| r.resume.as_str()).collect();
        assert_eq!(order, vec!["z.docx", "x.pdf", "y.pdf"]);
    }

    #[test]
    fn test_many_identical_resumes_keep_upload_order() {
        let text = "Backend engineer: Rust, Go, Python, SQL, Postgres, Kafka, Redis, \
                    Kubernetes, Terraform, gRPC, GraphQL, AWS, Linux, Docker, CI/CD";
        let documents: Vec<_> = (0..8).map(|i| doc(&format!("r{i}.pdf"), text)).collect();
        for _ in 0..25 {
            let result =
                rank_documents("Rust Python SQL Kafka on AWS", &documents, IdfMode::QueryInCorpus)
                    .unwrap();
            let first = result.entries()[0].score.to_bits();
            assert!(result.entries().iter().all(|r| r.score.to_bits() == first));
            let order: Vec<_> = result.entries().iter().map(|r| r.upload_index).collect();
            assert_eq!(order, (0..8).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_unrelated_resume_exports_plain_zero() {
        let documents = vec![doc("a.pdf", "I know Python and SQL"), doc("b.pdf", "I know nothing")];
        let result = rank_documents("Python SQL", &documents, IdfMode::QueryInCorpus).unwrap();
        let last = &result.entries()[1];
        assert_eq!(last.resume, "b.pdf");
        assert!(last.score.is_sign_positive());
        assert_eq!(format_display_score(last.score), "0.00");
        let csv = result.to_csv().unwrap();
        assert_eq!(csv.lines().last(), Some("b.pdf,0"));
    }

    #[test]
    fn test_extract_batch_skips_bad_uploads() {
        let uploads = vec![
            UploadedDocument::new("notes.txt", b"Python".to_vec()),
            UploadedDocument::new("good.docx", docx_bytes(&["Python", "SQL"])),
            UploadedDocument::new("broken.pdf", b"not really a pdf".to_vec()),
            UploadedDocument::new("empty.pdf", Vec::new()),
        ];
        let (documents, skipped) = extract_batch(&uploads);

        let ids: Vec<_> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["good.docx", "empty.pdf"]);
        assert_eq!(documents[0].text, "Python\nSQL");
        assert_eq!(documents[1].text, "");

        let skipped_ids: Vec<_> = skipped.iter().map(|s| s.resume.as_str()).collect();
        assert_eq!(skipped_ids, vec!["notes.txt", "broken.pdf"]);
        assert!(skipped[0].reason.contains("Unsupported file type"));
    }

    #[test]
    fn test_run_screening_end_to_end() {
        let uploads = vec![
            UploadedDocument::new("b.docx", docx_bytes(&["I know nothing"])),
            UploadedDocument::new("a.docx", docx_bytes(&["I know Python and SQL", "5 years"])),
            UploadedDocument::new("c.txt", b"Python SQL".to_vec()),
        ];
        let report = run_screening(&request(uploads, &["Python", "SQL"]), &RankingOptions::default())
            .unwrap();

        assert_eq!(report.ranked.len(), 2, "skipped uploads are not scored");
        assert_eq!(report.ranking.len(), 2);
        assert_eq!(report.ranked[0].resume, "a.docx");
        assert_eq!(report.ranked[0].rank, 1);
        assert_eq!(report.ranked[0].experience_years, Some(5));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].resume, "c.txt");

        let top = &report.top_candidates[0];
        assert!(top.highlighted_excerpt.contains("**Python**"));
        assert!(top.highlighted_excerpt.contains("**SQL**"));
        assert_eq!(top.display_score, format_display_score(top.score));
    }

    #[test]
    fn test_run_screening_pdf_upload() {
        let uploads = vec![
            UploadedDocument::new("pdf_resume.pdf", pdf_bytes(&[Some("Python SQL developer")])),
            UploadedDocument::new("other.docx", docx_bytes(&["Carpentry"])),
        ];
        let report = run_screening(&request(uploads, &[]), &RankingOptions::default()).unwrap();
        assert_eq!(report.ranked[0].resume, "pdf_resume.pdf");
        assert!(report.ranked[0].score > 0.0);
    }

    #[test]
    fn test_run_screening_empty_batch() {
        let uploads = vec![UploadedDocument::new("cv.rtf", b"{\\rtf1}".to_vec())];
        let err = run_screening(&request(uploads, &[]), &RankingOptions::default()).unwrap_err();
        assert!(matches!(err, RankError::EmptyBatch));

        let err = run_screening(&request(vec![], &[]), &RankingOptions::default()).unwrap_err();
        assert!(matches!(err, RankError::EmptyBatch));
    }

    #[test]
    fn test_top_k_and_excerpt_length() {
        let uploads: Vec<_> = (0..5)
            .map(|i| {
                UploadedDocument::new(
                    format!("r{i}.docx"),
                    docx_bytes(&[format!("Python {}", "SQL ".repeat(i + 1)).as_str()]),
                )
            })
            .collect();
        let options = RankingOptions {
            top_k: 3,
            excerpt_chars: 12,
            idf_mode: IdfMode::QueryInCorpus,
        };
        let report = run_screening(&request(uploads, &["python"]), &options).unwrap();
        assert_eq!(report.ranked.len(), 5);
        assert_eq!(report.top_candidates.len(), 3);
        for candidate in &report.top_candidates {
            assert!(candidate.highlighted_excerpt.chars().count() <= 12);
            assert!(candidate.highlighted_excerpt.starts_with("**Python**"));
        }
    }

    #[test]
    fn test_experience_threshold_annotates_without_filtering() {
        let uploads = vec![
            UploadedDocument::new("junior.docx", docx_bytes(&["Python SQL, 1 year"])),
            UploadedDocument::new("senior.docx", docx_bytes(&["Python, 8 years"])),
            UploadedDocument::new("unknown.docx", docx_bytes(&["SQL"])),
        ];
        let mut req = request(uploads, &[]);
        req.min_experience_years = 3;
        let report = run_screening(&req, &RankingOptions::default()).unwrap();

        assert_eq!(report.ranked.len(), 3);
        let meets = |name: &str| {
            report
                .ranked
                .iter()
                .find(|r| r.resume == name)
                .map(|r| r.meets_experience)
                .unwrap()
        };
        assert!(!meets("junior.docx"));
        assert!(meets("senior.docx"));
        assert!(!meets("unknown.docx"));
    }

    #[test]
    fn test_report_ranking_exports_all_entries() {
        let uploads = vec![
            UploadedDocument::new("a.docx", docx_bytes(&["Python"])),
            UploadedDocument::new("b.docx", docx_bytes(&["SQL"])),
        ];
        let report = run_screening(&request(uploads, &[]), &RankingOptions::default()).unwrap();
        let parsed = parse_csv_export(&report.ranking.to_csv().unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        for ((name, score), ranked) in parsed.iter().zip(&report.ranked) {
            assert_eq!(name, &ranked.resume);
            assert!((score - ranked.score).abs() < 1e-12);
        }
    }

    #[test]
    fn test_excerpt_counts_chars_not_bytes() {
        assert_eq!(excerpt("Zoë Müller", 3), "Zoë");
        assert_eq!(excerpt("short", 100), "short");
    }
}
