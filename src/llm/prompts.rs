//! LLM prompts for candidate evaluation.

/// Fixed prompt fragments.
pub struct Prompts;

impl Prompts {
    /// System instruction sent ahead of every evaluation.
    pub fn system_evaluator() -> &'static str {
        "You are a helpful assistant who evaluates job candidates from a CV."
    }

    /// Description of the JSON object the model must return.
    pub fn evaluation_schema() -> &'static str {
        r#"{
    "score": <integer from 0 to 100>,
    "related_experience": [
        {
            "position": <job position>,
            "company": <company name>,
            "duration": <time period worked>
        }
    ],
    "explanation": <why the score was assigned>
}"#
    }
}

/// Render the evaluation request for a job title and candidate CV.
///
/// Pure: equal inputs always render byte-identical prompts. The CV text is
/// embedded verbatim with no escaping or delimiting, so instructions hidden
/// inside a CV reach the model unchanged.
pub fn build_prompt(job_title: &str, candidate_text: &str) -> String {
    format!(
        "Evaluate the following CV for the job offer titled '{job_title}'. \
         Provide a JSON response with the following information: \
         1. A numerical score (0-100) based on the relevance of experience. \
         2. A list of related experiences (Position, Company, Duration). \
         3. An explanation describing why the score was assigned.\n\n\
         Use exactly this JSON structure:\n{schema}\n\n\
         Job Offer Title: {job_title}\n\n\
         Candidate CV:\n{candidate_text}\n\n\
         Ensure the JSON output is well-structured and clearly formatted. \
         Respond with only the JSON object and nothing else.",
        schema = Prompts::evaluation_schema(),
    )
}
