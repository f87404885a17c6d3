//! Axum route handlers for jobs and their candidates.

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::archive::resume_key;
use crate::errors::AppError;
use crate::extract::DocumentKind;
use crate::models::candidate::{Applicant, CandidateRow};
use crate::models::job::{JobRow, JobSpec};
use crate::scoring::pipeline::{evaluate_upload, extract_upload, ResumeUpload};
use crate::state::AppState;

const MISSING_UPLOAD_FIELDS: &str = "All fields are required.";

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(job): Json<JobSpec>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    if job.title.trim().is_empty() || job.description.trim().is_empty() {
        return Err(AppError::Validation(
            "title and description cannot be empty".to_string(),
        ));
    }

    let row = state.store.create_job(&job).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(state.store.list_jobs().await?))
}

/// GET /api/jobs/:job_id/candidates
///
/// Ranked: highest score first, unscored candidates last.
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<CandidateRow>>, AppError> {
    if state.store.get_job(job_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    Ok(Json(state.store.list_candidates(Some(job_id)).await?))
}

/// GET /api/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<CandidateRow>, AppError> {
    state
        .store
        .get_candidate(candidate_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))
}

/// A resume file part as received, before type detection.
struct ResumePart {
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// POST /api/jobs/:job_id/candidates
///
/// Multipart form with `name`, `email` and a `resume` file (PDF or DOCX).
///
/// Steps:
/// 1. Collect the form fields; detect the resume type (415 on anything else)
/// 2. Load the job and extract the text (no external call yet)
/// 3. Archive the original file
/// 4. Score and insert the candidate
/// 5. If step 4 fails, remove the archived file again
pub async fn handle_upload_candidate(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CandidateRow>), AppError> {
    let mut name = None;
    let mut email = None;
    let mut resume = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = Some(text_field(field).await?),
            "email" => email = Some(text_field(field).await?),
            "resume" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                resume = Some(ResumePart {
                    filename,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let (Some(name), Some(email), Some(resume)) = (name, email, resume) else {
        return Err(AppError::Validation(MISSING_UPLOAD_FIELDS.to_string()));
    };
    if name.trim().is_empty() || email.trim().is_empty() || resume.bytes.is_empty() {
        return Err(AppError::Validation(MISSING_UPLOAD_FIELDS.to_string()));
    }

    let kind = DocumentKind::detect(resume.content_type.as_deref(), resume.filename.as_deref())?;
    let upload = ResumeUpload {
        bytes: resume.bytes.clone(),
        kind,
    };
    let extracted = extract_upload(
        state.store.as_ref(),
        job_id,
        Applicant { name, email },
        upload,
    )
    .await?;

    let key = resume_key(job_id, resume.filename.as_deref());
    state
        .archive
        .put(&key, resume.bytes, kind.media_type())
        .await?;

    match evaluate_upload(
        state.store.as_ref(),
        &state.gateway,
        extracted,
        Some(key.clone()),
    )
    .await
    {
        Ok(candidate) => {
            info!(
                "Candidate {} uploaded for job {job_id} (score {:?})",
                candidate.id, candidate.score
            );
            Ok((StatusCode::CREATED, Json(candidate)))
        }
        Err(e) => {
            state.archive.delete(&key).await;
            Err(e)
        }
    }
}

async fn text_field(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
}
