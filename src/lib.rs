//! CV Evaluator - scores a candidate CV against a job title with an LLM.
//!
//! # Overview
//!
//! One evaluation run:
//! 1. Optionally extracts the CV text from a PDF or DOCX file
//! 2. Rejects inputs that are too short to evaluate
//! 3. Sends a single chat completion request asking for a JSON verdict
//! 4. Folds every LLM-side failure into an [`EvaluationOutcome`]
//! 5. Appends the outcome to a JSON array file
//!
//! # Quick Start
//!
//! ```no_run
//! use cv_evaluator::{
//!     config::Config,
//!     document::CandidateSource,
//!     evaluation::Evaluator,
//!     llm::LlmClient,
//!     store::append_outcome,
//! };
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let cv = CandidateSource::File(PathBuf::from("cv.pdf")).into_text()?;
//!
//!     let settings = config.llm.model_settings();
//!     let evaluator = Evaluator::new(LlmClient::new(config.llm.clone()));
//!     let outcome = evaluator
//!         .evaluate("Comercial de automóviles", &cv, &settings)
//!         .await;
//!
//!     append_outcome(&outcome, &config.store.path);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **document**: PDF/DOCX text extraction
//! - **validation**: minimum-length gate
//! - **llm**: prompt rendering and OpenAI-compatible client
//! - **evaluation**: the evaluation pipeline and its outcome type
//! - **store**: append-only JSON result file

pub mod config;
pub mod document;
pub mod error;
pub mod evaluation;
pub mod llm;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, ModelSettings};
pub use document::{extract_text, CandidateSource, DocumentFormat};
pub use error::{EvaluatorError, Result};
pub use evaluation::{Evaluation, EvaluationOutcome, Evaluator, RelatedExperience};
pub use llm::{build_prompt, ChatCompletion, LlmClient};
pub use store::{append_outcome, load_outcomes, DEFAULT_STORE_FILENAME};
pub use validation::validate;
