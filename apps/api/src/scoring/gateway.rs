//! Scoring gateway. Validates a scoring request, builds the prompt, calls the
//! completion service once, and normalizes the reply.
//!
//! Validation happens before any network call: a rejected request never reaches
//! the completion service.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::ChatCompletion;
use crate::models::job::JobSpec;
use crate::scoring::normalizer::{normalize_response, ScoringResult};
use crate::scoring::prompt_builder::build_scoring_prompt;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing candidateText or job";

/// Body of `POST /api/scoreCandidate`. Both fields are optional at the wire level
/// so a missing field is reported as a validation error, not a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    #[serde(default)]
    pub candidate_text: Option<String>,
    #[serde(default)]
    pub job: Option<JobSpec>,
}

#[derive(Clone)]
pub struct ScoringGateway {
    llm: Arc<dyn ChatCompletion>,
    language: String,
}

impl ScoringGateway {
    pub fn new(llm: Arc<dyn ChatCompletion>, language: impl Into<String>) -> Self {
        Self {
            llm,
            language: language.into(),
        }
    }

    /// Scores a wire-level request.
    pub async fn score(&self, request: &ScoringRequest) -> Result<ScoringResult, AppError> {
        let (Some(candidate_text), Some(job)) = (&request.candidate_text, &request.job) else {
            return Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        };
        self.score_text(job, candidate_text).await
    }

    /// Scores resume text against a job. Upstream failures map to `AppError::Upstream`.
    pub async fn score_text(
        &self,
        job: &JobSpec,
        candidate_text: &str,
    ) -> Result<ScoringResult, AppError> {
        if candidate_text.trim().is_empty() || job.is_empty() {
            return Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }

        let prompt = build_scoring_prompt(job, candidate_text, &self.language);
        debug!(
            "Scoring prompt built for job '{}' ({} chars)",
            job.title,
            prompt.user.len()
        );

        let raw = self.llm.complete(&prompt.user, &prompt.system).await?;
        let result = normalize_response(&raw);

        match &result.score {
            Some(score) => info!("Scored candidate for job '{}': {score}", job.title),
            None => info!(
                "Model reply for job '{}' had no usable score; returning raw text",
                job.title
            ),
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCompletion;
    use serde_json::Number;

    fn job() -> JobSpec {
        JobSpec {
            title: "Data Engineer".to_string(),
            category: "Engineering".to_string(),
            description: "Own our ETL pipelines.".to_string(),
            requirements: None,
        }
    }

    fn gateway(fake: &Arc<FakeCompletion>) -> ScoringGateway {
        ScoringGateway::new(fake.clone(), "English")
    }

    #[tokio::test]
    async fn test_missing_job_is_rejected_without_calling_llm() {
        let fake = Arc::new(FakeCompletion::replying(&[r#"{"score": 50, "recommendation": "x"}"#]));
        let request = ScoringRequest {
            candidate_text: Some("resume".to_string()),
            job: None,
        };

        let err = gateway(&fake).score(&request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == MISSING_FIELDS_MESSAGE));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_text_or_empty_job_is_rejected() {
        let fake = Arc::new(FakeCompletion::replying(&[]));
        let gw = gateway(&fake);

        assert!(gw.score_text(&job(), "   ").await.is_err());
        assert!(gw.score_text(&JobSpec::default(), "resume").await.is_err());
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_score_passes_prompt_through() {
        let fake = Arc::new(FakeCompletion::replying(&[
            r#"Sure! {"score": 83, "recommendation": "Strong ETL background"}"#,
        ]));

        let result = gateway(&fake)
            .score_text(&job(), "Built Airflow pipelines")
            .await
            .unwrap();

        assert_eq!(result.score, Some(Number::from(83)));
        assert_eq!(result.recommendation, "Strong ETL background");
        assert_eq!(fake.calls(), 1);

        let (prompt, system) = fake.last_request().unwrap();
        assert!(prompt.contains("Built Airflow pipelines"));
        assert!(prompt.contains("Data Engineer (Engineering)"));
        assert!(system.contains("JSON"));
    }

    #[tokio::test]
    async fn test_non_conforming_reply_is_returned_not_dropped() {
        let fake = Arc::new(FakeCompletion::replying(&["I cannot evaluate this."]));
        let result = gateway(&fake).score_text(&job(), "resume").await.unwrap();
        assert_eq!(result.score, None);
        assert_eq!(result.recommendation, "I cannot evaluate this.");
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_upstream_error() {
        let fake = Arc::new(FakeCompletion::failing());
        let err = gateway(&fake).score_text(&job(), "resume").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
