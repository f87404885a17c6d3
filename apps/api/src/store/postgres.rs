use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateRow, NewCandidate};
use crate::models::job::{JobRow, JobSpec};
use crate::scoring::normalizer::Evaluation;
use crate::store::CandidateStore;

#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn create_job(&self, job: &JobSpec) -> Result<JobRow, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (id, title, category, description, requirements)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.title.trim())
        .bind(job.category.trim())
        .bind(job.description.trim())
        .bind(job.requirements_text())
        .fetch_one(&self.pool)
        .await?;

        info!("Created job {} ({})", row.id, row.title);
        Ok(row)
    }

    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_candidate(
        &self,
        candidate: &NewCandidate,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<CandidateRow, AppError> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"
            INSERT INTO candidates
                (id, job_id, name, email, resume_text, resume_key,
                 score, recommendation, evaluated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate.job_id)
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.resume_text)
        .bind(&candidate.resume_key)
        .bind(i16::from(evaluation.score()))
        .bind(evaluation.recommendation())
        .bind(evaluated_at)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Inserted candidate {} for job {} with score {}",
            row.id,
            row.job_id,
            evaluation.score()
        );
        Ok(row)
    }

    async fn get_candidate(&self, candidate_id: Uuid) -> Result<Option<CandidateRow>, AppError> {
        Ok(
            sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
                .bind(candidate_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_candidates(&self, job_id: Option<Uuid>) -> Result<Vec<CandidateRow>, AppError> {
        Ok(sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT * FROM candidates
            WHERE ($1::uuid IS NULL OR job_id = $1)
            ORDER BY score DESC NULLS LAST, created_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn record_evaluation(
        &self,
        candidate_id: Uuid,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        // Single statement: the three fields change together or not at all.
        let result = sqlx::query(
            r#"
            UPDATE candidates
            SET score = $1, recommendation = $2, evaluated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(i16::from(evaluation.score()))
        .bind(evaluation.recommendation())
        .bind(evaluated_at)
        .bind(candidate_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Candidate {candidate_id} not found"
            )));
        }

        info!(
            "Recorded evaluation for candidate {candidate_id}: score {}",
            evaluation.score()
        );
        Ok(())
    }
}
