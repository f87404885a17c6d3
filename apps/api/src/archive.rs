//! Resume archive. Keeps the original uploaded file next to the candidate record.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

const MAX_FILENAME_CHARS: usize = 100;

#[async_trait]
pub trait ResumeArchive: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError>;

    /// Best effort: failures are logged, never returned.
    async fn delete(&self, key: &str);
}

/// S3 / MinIO backed archive.
#[derive(Clone)]
pub struct S3ResumeArchive {
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ResumeArchive {
    pub fn new(s3: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { s3, bucket }
    }
}

#[async_trait]
impl ResumeArchive for S3ResumeArchive {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError> {
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

        info!("Archived resume to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self
            .s3
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            warn!("Failed to delete archived resume s3://{}/{}: {e}", self.bucket, key);
        }
    }
}

/// `resumes/{job_id}/{uuid}-{filename}`. The uuid keeps re-uploads of the same file apart.
pub fn resume_key(job_id: Uuid, filename: Option<&str>) -> String {
    format!(
        "resumes/{job_id}/{}-{}",
        Uuid::new_v4(),
        sanitize_filename(filename.unwrap_or_default())
    )
}

fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_CHARS)
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}
