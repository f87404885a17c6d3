use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    pub requirements: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The job fields a scoring run needs. Also the body of `POST /api/jobs`.
///
/// Unknown fields are ignored so front ends can post a whole job record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

impl JobSpec {
    /// A job with neither title nor description gives the model nothing to score against.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }

    /// Requirements text, if present and not blank.
    pub fn requirements_text(&self) -> Option<&str> {
        self.requirements
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

impl From<&JobRow> for JobSpec {
    fn from(row: &JobRow) -> Self {
        JobSpec {
            title: row.title.clone(),
            category: row.category.clone(),
            description: row.description.clone(),
            requirements: row.requirements.clone(),
        }
    }
}
