//! Prompt builder. Serializes a job and resume text into a single scoring request.
//!
//! Deterministic: identical inputs always produce byte-identical prompts.
//! No validation or retries happen here.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::models::job::JobSpec;
use crate::scoring::prompts::{
    REQUIREMENTS_BLOCK_TEMPLATE, SCORING_PROMPT_TEMPLATE, SCORING_SYSTEM,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPrompt {
    pub system: String,
    pub user: String,
}

pub fn build_scoring_prompt(job: &JobSpec, candidate_text: &str, language: &str) -> ScoringPrompt {
    let requirements_block = job
        .requirements_text()
        .map(|r| fill_template(REQUIREMENTS_BLOCK_TEMPLATE, &[("requirements", r)]))
        .unwrap_or_default();

    let user = fill_template(
        SCORING_PROMPT_TEMPLATE,
        &[
            ("job_title", job.title.trim()),
            ("job_category", job.category.trim()),
            ("job_description", job.description.trim()),
            ("requirements_block", &requirements_block),
            ("candidate_text", candidate_text.trim()),
            ("language", language),
        ],
    );

    ScoringPrompt {
        system: format!("{SCORING_SYSTEM} {JSON_ONLY_INSTRUCTION}"),
        user,
    }
}

/// Single-pass placeholder substitution.
///
/// Values are never re-scanned, so a resume that happens to contain `{job_title}`
/// is inserted verbatim. Braces that do not name a known placeholder (the JSON
/// schema in the template) are copied through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (close, *v))
        });

        match substituted {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
