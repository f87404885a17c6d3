// All LLM prompt constants for the Scoring module.

/// System prompt for candidate scoring. Append `JSON_ONLY_INSTRUCTION` before sending.
pub const SCORING_SYSTEM: &str = "You are an experienced technical recruiter. \
    You evaluate how well a candidate's resume fits a job posting and explain your reasoning.";

/// Scoring prompt template.
/// Replace: {job_title}, {job_category}, {job_description}, {requirements_block},
///          {candidate_text}, {language}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"JOB POSTING:
{job_title} ({job_category})
{job_description}
{requirements_block}
CANDIDATE RESUME:
{candidate_text}

Evaluate how well this candidate matches the job on a scale from 1 to 100.

Return a JSON object with this EXACT schema (no extra fields):
{
  "score": <integer from 1 to 100>,
  "recommendation": "<one string>"
}

The "recommendation" string must be written in {language} and must contain, in order:
- Skills match with the job requirements (score out of 10)
- Relevance of work experience (score out of 10)
- Fit of education and certifications (score out of 10)
- Clarity and persuasiveness of described responsibilities (score out of 10)
- Overall document quality and communication (score out of 10)
- Strengths
- Weaknesses
- Overall recommendation

Put all of the above into the single "recommendation" string. Do NOT add other fields."#;

/// Inserted into `{requirements_block}` when the job lists explicit requirements.
/// Replace: {requirements}
pub const REQUIREMENTS_BLOCK_TEMPLATE: &str = "Requirements:\n{requirements}\n";
