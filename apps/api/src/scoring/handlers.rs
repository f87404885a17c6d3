//! Axum route handlers for the Scoring API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::scoring::gateway::{ScoringRequest, MISSING_FIELDS_MESSAGE};
use crate::scoring::normalizer::ScoringResult;
use crate::scoring::pipeline::{rescore_candidate, score_all, BatchReport};
use crate::state::AppState;

/// POST /api/scoreCandidate
///
/// Stateless: scores `candidateText` against `job` and returns the normalized reply.
/// A body that is not valid JSON counts as missing fields.
pub async fn handle_score_candidate(
    State(state): State<AppState>,
    body: Result<Json<ScoringRequest>, JsonRejection>,
) -> Result<Json<ScoringResult>, AppError> {
    let Json(request) = body.map_err(|rejection| {
        warn!("Rejected scoring request body: {rejection}");
        AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())
    })?;

    let result = state.gateway.score(&request).await?;
    Ok(Json(result))
}

/// Fallback for any method other than POST on the scoring endpoint.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// POST /api/candidates/:id/score
pub async fn handle_rescore_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<CandidateRow>, AppError> {
    let candidate = rescore_candidate(state.store.as_ref(), &state.gateway, candidate_id).await?;
    info!(
        "Re-scored candidate {candidate_id}: {}",
        candidate.score.unwrap_or_default()
    );
    Ok(Json(candidate))
}

/// POST /api/jobs/:job_id/score-all
pub async fn handle_score_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<BatchReport>, AppError> {
    let report = score_all(state.store.as_ref(), &state.gateway, Some(job_id)).await?;
    Ok(Json(report))
}

/// POST /api/score-all
pub async fn handle_score_everything(
    State(state): State<AppState>,
) -> Result<Json<BatchReport>, AppError> {
    let report = score_all(state.store.as_ref(), &state.gateway, None).await?;
    Ok(Json(report))
}
