//! Input gate for evaluation requests.
//!
//! Lengths are counted in characters, so accented titles such as
//! "Comercial de automóviles" are measured the way a reader would.

use crate::error::{EvaluatorError, Result};
use tracing::error;

/// Minimum number of characters in a job title.
pub const MIN_JOB_TITLE_LEN: usize = 3;

/// Minimum number of characters in the candidate text.
pub const MIN_CANDIDATE_TEXT_LEN: usize = 50;

/// Check that both inputs are long enough to be worth evaluating.
///
/// Returns `false` (and logs the rejection) if either value is empty or
/// below its minimum length. Which rule failed is not reported.
pub fn validate(job_title: &str, candidate_text: &str) -> bool {
    let ok = !job_title.is_empty()
        && !candidate_text.is_empty()
        && job_title.chars().count() >= MIN_JOB_TITLE_LEN
        && candidate_text.chars().count() >= MIN_CANDIDATE_TEXT_LEN;

    if !ok {
        error!("{}", EvaluatorError::InvalidInput);
    }
    ok
}

/// Same as [`validate`], surfacing the rejection as [`EvaluatorError::InvalidInput`].
pub fn check(job_title: &str, candidate_text: &str) -> Result<()> {
    if validate(job_title, candidate_text) {
        Ok(())
    } else {
        Err(EvaluatorError::InvalidInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_text_boundary() {
        assert!(!validate("Sales", &"x".repeat(49)));
        assert!(validate("Sales", &"x".repeat(50)));
    }

    #[test]
    fn test_job_title_boundary() {
        let cv = "x".repeat(60);
        assert!(!validate("QA", &cv));
        assert!(validate("Dev", &cv));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(!validate("", &"x".repeat(60)));
        assert!(!validate("Comercial", ""));
        assert!(!validate("", ""));
    }

    #[test]
    fn test_lengths_count_characters() {
        // 49 two-byte characters: 98 bytes but still too short.
        assert!(!validate("Comercial de automóviles", &"ó".repeat(49)));
        assert!(validate("Comercial de automóviles", &"ó".repeat(50)));
    }

    #[test]
    fn test_check_error() {
        assert!(matches!(check("ab", "short"), Err(EvaluatorError::InvalidInput)));
        assert!(check("abc", &"y".repeat(50)).is_ok());
    }
}
