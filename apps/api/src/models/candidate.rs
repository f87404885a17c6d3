use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A candidate record. `score`, `recommendation` and `evaluated_at` are always
/// written together by a scoring run, never partially.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub name: String,
    pub email: String,
    pub resume_text: String,
    /// Object-storage key of the original uploaded file, if archived.
    pub resume_key: Option<String>,
    /// 1-100
    pub score: Option<i16>,
    pub recommendation: Option<String>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Contact details submitted alongside a resume upload.
#[derive(Debug, Clone)]
pub struct Applicant {
    pub name: String,
    pub email: String,
}

/// Insert payload for a freshly evaluated candidate.
#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub job_id: Uuid,
    pub name: String,
    pub email: String,
    pub resume_text: String,
    pub resume_key: Option<String>,
}
