//! Axum route handlers for the Screening API.

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::document::{ScreeningRequest, UploadedDocument};
use crate::screening::experience::MAX_EXPERIENCE_YEARS;
use crate::screening::keywords::parse_keywords;
use crate::screening::pipeline::{run_screening, ScreeningReport};
use crate::screening::results::EXPORT_FILE_NAME;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

const FIELD_JOB_DESCRIPTION: &str = "job_description";
const FIELD_SKILLS: &str = "skills";
const FIELD_MIN_EXPERIENCE: &str = "min_experience_years";
const FIELD_RESUMES: &str = "resumes";

#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    #[serde(flatten)]
    pub report: ScreeningReport,
    /// The full ranking as `Resume,Score` CSV.
    pub csv: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screenings
///
/// Multipart form: `job_description`, optional `skills` (comma-separated),
/// optional `min_experience_years`, and one or more `resumes` files.
pub async fn handle_screening(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScreeningResponse>, AppError> {
    let request = read_screening_form(multipart).await?;
    let report = screen(&state, request).await?;
    let csv = report.ranking.to_csv()?;

    Ok(Json(ScreeningResponse { report, csv }))
}

/// POST /api/v1/screenings/export
///
/// Same form as `/api/v1/screenings`; responds with the CSV as a download.
pub async fn handle_screening_export(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let request = read_screening_form(multipart).await?;
    let report = screen(&state, request).await?;
    let csv = report.ranking.to_csv()?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv,
    ))
}

/// Runs the CPU-bound pipeline on the blocking pool.
async fn screen(state: &AppState, request: ScreeningRequest) -> Result<ScreeningReport, AppError> {
    let options = state.ranking;
    let report = tokio::task::spawn_blocking(move || run_screening(&request, &options))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(report)
}

// ────────────────────────────────────────────────────────────────────────────
// Form parsing
// ────────────────────────────────────────────────────────────────────────────

async fn read_screening_form(mut multipart: Multipart) -> Result<ScreeningRequest, AppError> {
    let mut job_description: Option<String> = None;
    let mut keywords = Vec::new();
    let mut min_experience_years = 0u32;
    let mut documents: Vec<UploadedDocument> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FIELD_JOB_DESCRIPTION => job_description = Some(read_text(field).await?),
            FIELD_SKILLS => keywords = parse_keywords(&read_text(field).await?),
            FIELD_MIN_EXPERIENCE => {
                min_experience_years = parse_min_experience(&read_text(field).await?)?
            }
            FIELD_RESUMES => {
                let file_name = field
                    .file_name()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::Validation("Each resume upload must have a file name".to_string())
                    })?;
                if documents.iter().any(|d| d.file_name == file_name) {
                    return Err(AppError::Validation(format!(
                        "Duplicate resume file name: {file_name}"
                    )));
                }
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read upload {file_name}: {e}"))
                })?;
                debug!("Received {file_name} ({} bytes)", bytes.len());
                documents.push(UploadedDocument { file_name, bytes });
            }
            other => debug!("Ignoring unknown form field '{other}'"),
        }
    }

    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;

    if documents.is_empty() {
        return Err(AppError::Validation(
            "At least one resume must be uploaded".to_string(),
        ));
    }

    Ok(ScreeningRequest {
        job_description,
        keywords,
        min_experience_years,
        documents,
    })
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field {name}: {e}")))
}

fn parse_min_experience(raw: &str) -> Result<u32, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    match raw.parse::<u32>() {
        Ok(years) if years <= MAX_EXPERIENCE_YEARS => Ok(years),
        _ => Err(AppError::Validation(format!(
            "min_experience_years must be a whole number between 0 and {MAX_EXPERIENCE_YEARS}"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
