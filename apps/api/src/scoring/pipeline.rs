//! Scoring pipeline: extract → prompt → completion → normalize → validate → persist.
//!
//! Flows:
//! - `extract_upload` then `evaluate_upload`: a new resume for a job; the candidate is
//!   created already scored. Extraction is its own stage so a bad file is rejected
//!   before any external call.
//! - `rescore_candidate`: re-runs scoring for one stored candidate.
//! - `score_all`: sequential best-effort batch over stored candidates.
//!
//! CRITICAL: nothing is persisted unless the model reply validates into an
//! `Evaluation`. A failed run leaves the candidate exactly as it was.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{extract_resume_text, DocumentKind};
use crate::models::candidate::{Applicant, CandidateRow, NewCandidate};
use crate::models::job::{JobRow, JobSpec};
use crate::scoring::gateway::ScoringGateway;
use crate::scoring::normalizer::Evaluation;
use crate::store::CandidateStore;

/// An uploaded resume whose type has already been detected.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub bytes: Bytes,
    pub kind: DocumentKind,
}

/// Resume text extracted for a known job, ready to be scored.
#[derive(Debug, Clone)]
pub struct ExtractedResume {
    job: JobRow,
    applicant: Applicant,
    resume_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub candidate_id: Uuid,
    pub error: String,
}

/// Outcome of a batch scoring run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Candidates a scoring call was made for.
    pub attempted: u32,
    pub scored: u32,
    /// Candidates without resume text or whose job no longer resolves.
    pub skipped: u32,
    pub failures: Vec<BatchFailure>,
}

// ────────────────────────────────────────────────────────────────────────────
// Single-candidate flows
// ────────────────────────────────────────────────────────────────────────────

/// First upload stage: validates the applicant, loads the job (404 if unknown) and
/// extracts the resume text. Makes no completion or storage call.
pub async fn extract_upload(
    store: &dyn CandidateStore,
    job_id: Uuid,
    applicant: Applicant,
    upload: ResumeUpload,
) -> Result<ExtractedResume, AppError> {
    if applicant.name.trim().is_empty() || applicant.email.trim().is_empty() {
        return Err(AppError::Validation("All fields are required.".to_string()));
    }

    let job = store
        .get_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let resume_text = extract_resume_text(upload.bytes, upload.kind).await?;
    info!(
        "Extracted {} chars from {:?} resume for job {job_id}",
        resume_text.len(),
        upload.kind
    );

    Ok(ExtractedResume {
        job,
        applicant,
        resume_text,
    })
}

/// Second upload stage: scores the extracted text, validates the reply and INSERTs
/// the candidate together with its evaluation.
pub async fn evaluate_upload(
    store: &dyn CandidateStore,
    gateway: &ScoringGateway,
    resume: ExtractedResume,
    resume_key: Option<String>,
) -> Result<CandidateRow, AppError> {
    let evaluation = evaluate(gateway, &resume.job, &resume.resume_text).await?;

    store
        .insert_candidate(
            &NewCandidate {
                job_id: resume.job.id,
                name: resume.applicant.name.trim().to_string(),
                email: resume.applicant.email.trim().to_string(),
                resume_text: resume.resume_text,
                resume_key,
            },
            &evaluation,
            Utc::now(),
        )
        .await
}

/// Re-scores a stored candidate against its job and persists the new evaluation.
pub async fn rescore_candidate(
    store: &dyn CandidateStore,
    gateway: &ScoringGateway,
    candidate_id: Uuid,
) -> Result<CandidateRow, AppError> {
    let candidate = store
        .get_candidate(candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let job = store.get_job(candidate.job_id).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Job {} for candidate {candidate_id} not found",
            candidate.job_id
        ))
    })?;

    let evaluation = evaluate(gateway, &job, &candidate.resume_text).await?;
    store
        .record_evaluation(candidate_id, &evaluation, Utc::now())
        .await?;

    store
        .get_candidate(candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))
}

async fn evaluate(
    gateway: &ScoringGateway,
    job: &JobRow,
    resume_text: &str,
) -> Result<Evaluation, AppError> {
    gateway
        .score_text(&JobSpec::from(job), resume_text)
        .await?
        .into_evaluation()
}

// ────────────────────────────────────────────────────────────────────────────
// Batch scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores every candidate of one job (or of all jobs when `job_id` is `None`).
///
/// Strictly sequential: one outstanding completion call at a time, to bound cost and
/// rate-limit exposure. A failure on one candidate is logged and recorded in the
/// report; the batch continues. Only failing to list candidates or jobs aborts it.
pub async fn score_all(
    store: &dyn CandidateStore,
    gateway: &ScoringGateway,
    job_id: Option<Uuid>,
) -> Result<BatchReport, AppError> {
    let jobs: HashMap<Uuid, JobRow> = match job_id {
        Some(id) => {
            let job = store
                .get_job(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
            HashMap::from([(id, job)])
        }
        None => store
            .list_jobs()
            .await?
            .into_iter()
            .map(|job| (job.id, job))
            .collect(),
    };

    let candidates = store.list_candidates(job_id).await?;
    info!(
        "Batch scoring {} candidates across {} jobs",
        candidates.len(),
        jobs.len()
    );

    let mut report = BatchReport::default();

    for candidate in candidates {
        let Some(job) = jobs.get(&candidate.job_id) else {
            warn!(
                "Skipping candidate {}: job {} not found",
                candidate.id, candidate.job_id
            );
            report.skipped += 1;
            continue;
        };

        if candidate.resume_text.trim().is_empty() {
            warn!("Skipping candidate {}: no resume text", candidate.id);
            report.skipped += 1;
            continue;
        }

        report.attempted += 1;

        let outcome = match evaluate(gateway, job, &candidate.resume_text).await {
            Ok(evaluation) => {
                store
                    .record_evaluation(candidate.id, &evaluation, Utc::now())
                    .await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => report.scored += 1,
            Err(e) => {
                warn!("Error scoring candidate {}: {e}", candidate.id);
                report.failures.push(BatchFailure {
                    candidate_id: candidate.id,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Batch scoring finished: {} scored, {} failed, {} skipped",
        report.scored,
        report.failures.len(),
        report.skipped
    );

    Ok(report)
}
