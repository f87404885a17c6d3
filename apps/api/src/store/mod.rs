//! Result persister: the document store the pipeline reads jobs/candidates from
//! and writes evaluations back to.
//!
//! Pluggable, trait-based: `AppState` holds an `Arc<dyn CandidateStore>`, the
//! Postgres implementation in production and an in-memory fake in tests.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateRow, NewCandidate};
use crate::models::job::{JobRow, JobSpec};
use crate::scoring::normalizer::Evaluation;

pub use postgres::PgCandidateStore;

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn create_job(&self, job: &JobSpec) -> Result<JobRow, AppError>;

    /// Newest first.
    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError>;

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, AppError>;

    /// Inserts an already-evaluated candidate in a single statement.
    async fn insert_candidate(
        &self,
        candidate: &NewCandidate,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<CandidateRow, AppError>;

    async fn get_candidate(&self, candidate_id: Uuid) -> Result<Option<CandidateRow>, AppError>;

    /// Candidates of one job (or all jobs), highest score first, unscored last.
    async fn list_candidates(&self, job_id: Option<Uuid>) -> Result<Vec<CandidateRow>, AppError>;

    /// Atomically sets score, recommendation and evaluated_at together.
    /// On failure the candidate is left exactly as it was. `NotFound` if no such candidate.
    async fn record_evaluation(
        &self,
        candidate_id: Uuid,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}
