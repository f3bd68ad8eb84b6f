//! Candidate evaluation against a job title.
//!
//! [`Evaluator::evaluate`] runs the whole gate/prompt/LLM/parse sequence and
//! always returns an [`EvaluationOutcome`]; no error escapes it.

use crate::config::ModelSettings;
use crate::error::{EvaluatorError, Result};
use crate::llm::{build_prompt, ChatCompletion, Message, Prompts};
use crate::validation;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

/// Highest score the model may assign.
pub const MAX_SCORE: u8 = 100;

/// One past position relevant to the job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedExperience {
    #[serde(alias = "Position")]
    pub position: String,
    #[serde(alias = "Company")]
    pub company: String,
    #[serde(alias = "Duration")]
    pub duration: String,
}

/// A scored evaluation returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Relevance score from 0 to 100.
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    /// Related experience in the order the model listed it.
    pub related_experience: Vec<RelatedExperience>,
    /// Why the score was assigned.
    pub explanation: String,
    /// Any other keys the model returned, stored as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts `85` as well as `85.0`; anything fractional or outside 0-100 is rejected.
fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if raw.fract() != 0.0 || !(0.0..=f64::from(MAX_SCORE)).contains(&raw) {
        return Err(serde::de::Error::custom(format!(
            "score {} is not a whole number in 0-{}",
            raw, MAX_SCORE
        )));
    }
    Ok(raw as u8)
}

/// Result of one evaluation attempt.
///
/// Serializes as the evaluation object itself on success and as
/// `{"error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluationOutcome {
    Success(Evaluation),
    Failure { error: String },
}

impl EvaluationOutcome {
    /// Build a failure outcome from any displayable cause.
    pub fn failure(cause: impl std::fmt::Display) -> Self {
        EvaluationOutcome::Failure {
            error: cause.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EvaluationOutcome::Success(_))
    }

    /// The evaluation, if this outcome is a success.
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            EvaluationOutcome::Success(evaluation) => Some(evaluation),
            EvaluationOutcome::Failure { .. } => None,
        }
    }

    /// The error message, if this outcome is a failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            EvaluationOutcome::Success(_) => None,
            EvaluationOutcome::Failure { error } => Some(error),
        }
    }
}

impl From<Result<Evaluation>> for EvaluationOutcome {
    fn from(result: Result<Evaluation>) -> Self {
        match result {
            Ok(evaluation) => EvaluationOutcome::Success(evaluation),
            Err(e) => EvaluationOutcome::failure(e),
        }
    }
}

/// Parse the model's reply into an [`Evaluation`].
///
/// Text that is not JSON at all is [`EvaluatorError::MalformedResponse`];
/// JSON of the wrong shape or with a score that is not a whole number in
/// 0-100 is [`EvaluatorError::Schema`]. Unrecognized keys are kept in
/// [`Evaluation::extra`].
pub fn parse_evaluation(text: &str) -> Result<Evaluation> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        error!(raw = %text, "Received malformed JSON: {}", e);
        EvaluatorError::MalformedResponse
    })?;

    let evaluation: Evaluation = serde_json::from_value(value).map_err(|e| {
        error!(raw = %text, "LLM JSON does not match the evaluation schema: {}", e);
        EvaluatorError::Schema(e.to_string())
    })?;

    Ok(evaluation)
}

/// Evaluates candidates through a chat-completion service.
pub struct Evaluator<C> {
    client: C,
}

impl<C: ChatCompletion> Evaluator<C> {
    /// Create a new evaluator over the given client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Evaluate one CV against one job title.
    ///
    /// Invalid input returns a failure without contacting the service.
    /// Transport and service errors become failures carrying the error text.
    pub async fn evaluate(
        &self,
        job_title: &str,
        candidate_text: &str,
        settings: &ModelSettings,
    ) -> EvaluationOutcome {
        if let Err(e) = validation::check(job_title, candidate_text) {
            return EvaluationOutcome::failure(e);
        }

        let messages = vec![
            Message::system(Prompts::system_evaluator()),
            Message::user(build_prompt(job_title, candidate_text)),
        ];

        let response = match self.client.chat(messages, settings).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error occurred: {}", e);
                return EvaluationOutcome::failure(e);
            }
        };

        info!("Response received from LLM.");
        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Token usage"
            );
        }
        if response.finish_reason.as_deref() == Some("length") {
            warn!(
                "LLM reply was cut off at max_tokens={}; the JSON is likely incomplete",
                settings.max_tokens
            );
        }

        let text = response.content.trim();
        debug!("Raw response from LLM: {}", text);

        parse_evaluation(text).into()
    }
}
