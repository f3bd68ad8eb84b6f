//! CV Evaluator CLI
//!
//! Scores a candidate CV against a job title using an LLM.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cv_evaluator::{
    config::Config,
    document::{extract_text, CandidateSource},
    evaluation::{EvaluationOutcome, Evaluator},
    llm::LlmClient,
    store::{append_outcome, load_records, store_exists, store_size},
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CV Evaluator - scores a candidate CV against a job title using an LLM
#[derive(Parser)]
#[command(name = "cv-evaluator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a CV against a job title and record the outcome
    Evaluate {
        /// Job offer title
        #[arg(short, long)]
        job_title: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Result store path (defaults to the configured store)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,

        /// Override the configured max tokens
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Override the configured temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Print the outcome without appending it to the store
        #[arg(long)]
        no_save: bool,
    },

    /// Print the plain text extracted from a PDF or DOCX file
    Extract {
        /// Path to the document
        document: PathBuf,
    },

    /// List stored evaluation outcomes
    Show {
        /// Result store path (defaults to the configured store)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Output raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Test LLM connection
    Test,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// CV document (.pdf or .docx)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// CV text given inline
    #[arg(short, long)]
    text: Option<String>,

    /// Plain text file holding the CV
    #[arg(long)]
    text_file: Option<PathBuf>,
}

impl SourceArgs {
    fn into_source(self) -> Result<CandidateSource> {
        if let Some(path) = self.file {
            return Ok(CandidateSource::File(path));
        }
        if let Some(path) = self.text_file {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return Ok(CandidateSource::Inline(text));
        }
        Ok(CandidateSource::Inline(self.text.unwrap_or_default()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("cv_evaluator={}", config.log_level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Evaluate {
            job_title,
            source,
            store,
            model,
            max_tokens,
            temperature,
            no_save,
        } => {
            let mut config = config;
            if let Some(model) = model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = temperature {
                config.llm.temperature = temperature;
            }
            let store = store.unwrap_or_else(|| config.store.path.clone());
            cmd_evaluate(config, job_title, source, store, no_save).await
        }
        Commands::Extract { document } => cmd_extract(document),
        Commands::Show { store, json } => {
            cmd_show(store.unwrap_or_else(|| config.store.path.clone()), json)
        }
        Commands::Test => cmd_test(config).await,
    }
}

async fn cmd_evaluate(
    config: Config,
    job_title: String,
    source: SourceArgs,
    store: PathBuf,
    no_save: bool,
) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let candidate_text = match source.into_source()?.into_text() {
        Ok(text) => text,
        Err(e) => {
            error!("{}", e);
            anyhow::bail!("Failed to read the file. Please provide a valid .pdf, or .docx file.");
        }
    };

    info!("Evaluating CV for '{}' with model {}", job_title, config.llm.model);
    let start = Instant::now();

    let settings = config.llm.model_settings();
    let evaluator = Evaluator::new(LlmClient::new(config.llm));
    let outcome = evaluator.evaluate(&job_title, &candidate_text, &settings).await;

    info!("Evaluation finished in {:.2?}", start.elapsed());

    let rendered =
        serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
    println!("Evaluation Result: {}", rendered);

    if !no_save {
        append_outcome(&outcome, &store);
    }

    Ok(())
}

fn cmd_extract(document: PathBuf) -> Result<()> {
    let text = extract_text(&document)
        .with_context(|| format!("Failed to extract text from {}", document.display()))?;
    println!("{}", text);
    Ok(())
}

fn cmd_show(store: PathBuf, json: bool) -> Result<()> {
    if !store_exists(&store) {
        anyhow::bail!(
            "Result store not found at '{}'. Run 'evaluate' first.",
            store.display()
        );
    }

    let records = load_records(&store).context("Failed to load result store")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("Stored Evaluations");
    println!("{}", "─".repeat(60));

    for (i, record) in records.iter().enumerate() {
        match serde_json::from_value::<EvaluationOutcome>(record.clone()) {
            Ok(EvaluationOutcome::Success(evaluation)) => {
                println!(
                    "{:>3}. score {:>3}  ({} related experiences)",
                    i + 1,
                    evaluation.score,
                    evaluation.related_experience.len()
                );
                let preview: String = evaluation.explanation.chars().take(100).collect();
                println!("     {}", preview);
            }
            Ok(EvaluationOutcome::Failure { error }) => {
                println!("{:>3}. error: {}", i + 1, error);
            }
            Err(_) => println!("{:>3}. unrecognized record", i + 1),
        }
    }

    println!("{}", "─".repeat(60));
    println!(
        "{} records, {:.1} KB",
        records.len(),
        store_size(&store)? as f64 / 1024.0
    );

    Ok(())
}

async fn cmd_test(config: Config) -> Result<()> {
    println!("Testing LLM connection...\n");

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        config.llm.api_key.chars().take(8).collect::<String>()
    );
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => println!("Connection successful!"),
        Err(e) => println!("Connection failed: {}", e),
    }

    Ok(())
}
