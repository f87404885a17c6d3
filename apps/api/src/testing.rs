//! In-memory fakes for the completion service, the store and the archive.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::archive::ResumeArchive;
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::{ChatCompletion, LlmError};
use crate::models::candidate::{CandidateRow, NewCandidate};
use crate::models::job::{JobRow, JobSpec};
use crate::scoring::gateway::ScoringGateway;
use crate::scoring::normalizer::Evaluation;
use crate::state::AppState;
use crate::store::CandidateStore;

type Responder = Box<dyn Fn(usize, &str) -> Result<String, LlmError> + Send + Sync>;

/// Scripted completion backend. The responder receives the call index and the prompt.
pub struct FakeCompletion {
    responder: Responder,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl FakeCompletion {
    pub fn new(
        responder: impl Fn(usize, &str) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// Replies in order; errors once the script runs out.
    pub fn replying(replies: &[&str]) -> Self {
        let replies: Vec<String> = replies.iter().map(|r| r.to_string()).collect();
        Self::new(move |n, _| replies.get(n).cloned().ok_or(LlmError::EmptyContent))
    }

    pub fn failing() -> Self {
        Self::new(|_, _| {
            Err(LlmError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(prompt, system)` of the most recent call.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for FakeCompletion {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((prompt.to_string(), system.to_string()));
        (self.responder)(n, prompt)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    jobs: Mutex<Vec<JobRow>>,
    candidates: Mutex<Vec<CandidateRow>>,
    failing_updates: Mutex<HashSet<Uuid>>,
}

impl InMemoryStore {
    pub fn seed_job(&self, title: &str) -> JobRow {
        let job = JobRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            category: "Engineering".to_string(),
            description: format!("We are hiring a {title}."),
            requirements: None,
            created_at: Utc::now(),
        };
        self.jobs.lock().unwrap().push(job.clone());
        job
    }

    /// Seeds a candidate, optionally with a prior evaluation dated an hour ago.
    pub fn seed_candidate(
        &self,
        job_id: Uuid,
        name: &str,
        resume_text: &str,
        prior: Option<(i16, &str)>,
    ) -> CandidateRow {
        let evaluated_at = prior.map(|_| Utc::now() - Duration::hours(1));
        let candidate = CandidateRow {
            id: Uuid::new_v4(),
            job_id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            resume_text: resume_text.to_string(),
            resume_key: None,
            score: prior.map(|(score, _)| score),
            recommendation: prior.map(|(_, rec)| rec.to_string()),
            evaluated_at,
            created_at: Utc::now(),
        };
        self.candidates.lock().unwrap().push(candidate.clone());
        candidate
    }

    /// Makes `record_evaluation` fail for this candidate.
    pub fn fail_updates_for(&self, candidate_id: Uuid) {
        self.failing_updates.lock().unwrap().insert(candidate_id);
    }

    pub fn candidate(&self, candidate_id: Uuid) -> Option<CandidateRow> {
        self.candidates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == candidate_id)
            .cloned()
    }

    pub fn candidates(&self) -> Vec<CandidateRow> {
        self.candidates.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandidateStore for InMemoryStore {
    async fn create_job(&self, job: &JobSpec) -> Result<JobRow, AppError> {
        let row = JobRow {
            id: Uuid::new_v4(),
            title: job.title.trim().to_string(),
            category: job.category.trim().to_string(),
            description: job.description.trim().to_string(),
            requirements: job.requirements_text().map(str::to_string),
            created_at: Utc::now(),
        };
        self.jobs.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError> {
        let mut jobs = self.jobs.lock().unwrap().clone();
        jobs.reverse();
        Ok(jobs)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id == job_id)
            .cloned())
    }

    async fn insert_candidate(
        &self,
        candidate: &NewCandidate,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<CandidateRow, AppError> {
        let row = CandidateRow {
            id: Uuid::new_v4(),
            job_id: candidate.job_id,
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            resume_text: candidate.resume_text.clone(),
            resume_key: candidate.resume_key.clone(),
            score: Some(i16::from(evaluation.score())),
            recommendation: Some(evaluation.recommendation().to_string()),
            evaluated_at: Some(evaluated_at),
            created_at: Utc::now(),
        };
        self.candidates.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn get_candidate(&self, candidate_id: Uuid) -> Result<Option<CandidateRow>, AppError> {
        Ok(self.candidate(candidate_id))
    }

    async fn list_candidates(&self, job_id: Option<Uuid>) -> Result<Vec<CandidateRow>, AppError> {
        let mut rows: Vec<CandidateRow> = self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .filter(|c| job_id.map_or(true, |id| c.job_id == id))
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal scores.
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(rows)
    }

    async fn record_evaluation(
        &self,
        candidate_id: Uuid,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.failing_updates.lock().unwrap().contains(&candidate_id) {
            return Err(AppError::Internal(anyhow::anyhow!("simulated write failure")));
        }

        let mut candidates = self.candidates.lock().unwrap();
        let row = candidates
            .iter_mut()
            .find(|c| c.id == candidate_id)
            .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;
        row.score = Some(i16::from(evaluation.score()));
        row.recommendation = Some(evaluation.recommendation().to_string());
        row.evaluated_at = Some(evaluated_at);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryArchive {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    puts: AtomicUsize,
}

impl InMemoryArchive {
    /// Number of `put` calls, including objects deleted since.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ResumeArchive for InMemoryArchive {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/ats_test".to_string(),
        s3_bucket: "resumes-test".to_string(),
        s3_endpoint: "http://localhost:9000".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        openai_api_key: "sk-test".to_string(),
        openai_base_url: "http://localhost:1".to_string(),
        llm_timeout_secs: 5,
        scoring_language: "English".to_string(),
        max_upload_bytes: 1024 * 1024,
        cors_allowed_origins: Vec::new(),
        host: "127.0.0.1".to_string(),
        port: 3003,
        rust_log: "info".to_string(),
    }
}

/// Fakes handed out alongside the state so tests can inspect them.
pub struct TestHarness {
    pub state: AppState,
    pub llm: Arc<FakeCompletion>,
    pub store: Arc<InMemoryStore>,
    pub archive: Arc<InMemoryArchive>,
}

pub fn test_harness(llm: FakeCompletion) -> TestHarness {
    let llm = Arc::new(llm);
    let store = Arc::new(InMemoryStore::default());
    let archive = Arc::new(InMemoryArchive::default());
    let config = test_config();

    let state = AppState {
        store: store.clone(),
        gateway: ScoringGateway::new(llm.clone(), config.scoring_language.clone()),
        archive: archive.clone(),
        config,
    };

    TestHarness {
        state,
        llm,
        store,
        archive,
    }
}
