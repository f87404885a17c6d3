pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless scoring
        .route(
            "/api/scoreCandidate",
            post(scoring::handle_score_candidate).fallback(scoring::method_not_allowed),
        )
        // Jobs & candidates
        .route(
            "/api/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route(
            "/api/jobs/:job_id/candidates",
            get(jobs::handle_list_candidates).post(jobs::handle_upload_candidate),
        )
        .route("/api/candidates/:id", get(jobs::handle_get_candidate))
        // Re-scoring
        .route(
            "/api/candidates/:id/score",
            post(scoring::handle_rescore_candidate),
        )
        .route("/api/jobs/:job_id/score-all", post(scoring::handle_score_job))
        .route("/api/score-all", post(scoring::handle_score_everything))
        .layer(body_limit)
        .with_state(state)
}
