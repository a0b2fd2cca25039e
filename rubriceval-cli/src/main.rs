// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rubriceval CLI
//!
//! Generate candidate responses, then judge them against weighted rubrics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rubriceval_cli::dataset::{self, RatedRecord};
use rubriceval_cli::RubricEvalConfig;
use rubriceval_core::{DatasetSummary, EvaluationRecord};
use rubriceval_evals::{EvaluationOrchestrator, RatingEvaluator, ResponseGenerator};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "rubriceval")]
#[command(about = "Rubric-based LLM response evaluation", long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, env = "RUBRICEVAL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Output summary as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one response per system instruction
    Generate {
        /// Generation dataset (JSON)
        #[arg(long)]
        input: PathBuf,

        /// Rubrics attached to every generated record (JSON)
        #[arg(long)]
        rubrics: PathBuf,

        /// Output file (default: <data_dir>/<timestamp>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Judge every response against its rubrics
    Evaluate {
        /// Evaluation dataset (JSON)
        #[arg(long)]
        input: PathBuf,

        /// Output file (default: <data_dir>/<timestamp>.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Judge attempts per rubric (overrides config)
        #[arg(long)]
        max_retries: Option<u32>,

        /// Judge rubrics concurrently (overrides config)
        #[arg(long)]
        parallel: bool,
    },

    /// Give every response a holistic 1-5 rating
    Rate {
        /// Evaluation dataset (JSON)
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = RatingMode::Subjective)]
        mode: RatingMode,

        /// Output file (default: <data_dir>/<timestamp>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RatingMode {
    /// No criteria, overall judgment only
    Subjective,
    /// Guided by each record's positive and negative rubrics
    FreeForm,
}

impl RatingMode {
    fn as_str(&self) -> &'static str {
        match self {
            RatingMode::Subjective => "subjective",
            RatingMode::FreeForm => "free-form",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RubricEvalConfig::load(cli.config.clone())?;

    match cli.command {
        Commands::Generate {
            input,
            rubrics,
            output,
        } => {
            let dataset = dataset::load_generation_dataset(&input)?;
            let rubrics = dataset::load_rubrics(&rubrics)?;
            let generator = ResponseGenerator::new(config.generator_client()?);

            let records = generator.generate_responses(&dataset, &rubrics).await;
            let path = dataset::save_json(&records, output.as_deref(), &config.data.data_dir)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "generated": records.len(), "path": path })
                );
            } else {
                println!("Generated {} responses -> {}", records.len(), path.display());
            }
        }

        Commands::Evaluate {
            input,
            output,
            max_retries,
            parallel,
        } => {
            let items = dataset::load_evaluation_dataset(&input)?;
            let mut evaluation = config.evaluation.clone();
            if let Some(max_retries) = max_retries {
                evaluation.max_retries = max_retries;
            }
            if parallel {
                evaluation.parallel = true;
            }

            let orchestrator = EvaluationOrchestrator::new(config.judge_client()?, evaluation);
            info!("Evaluating {} records from {:?}", items.len(), input);
            let outcome = orchestrator.evaluate_all(&items).await;

            let records = outcome
                .results
                .iter()
                .map(|result| result.to_record())
                .collect::<Result<Vec<EvaluationRecord>, _>>()
                .context("Failed to materialize evaluation records")?;
            let path = dataset::save_json(&records, output.as_deref(), &config.data.data_dir)?;

            let summary = DatasetSummary::from_results(&outcome.results, outcome.failures.len())?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "summary": summary, "path": path })
                );
            } else {
                println!("{}", summary);
                println!("Results written to {}", path.display());
            }
        }

        Commands::Rate {
            input,
            mode,
            output,
        } => {
            let items = dataset::load_evaluation_dataset(&input)?;
            let evaluator = RatingEvaluator::new(config.judge_client()?)
                .with_max_retries(config.evaluation.max_retries);

            let mut records = Vec::new();
            for (index, item) in items.iter().enumerate() {
                info!("Rating record {}/{}", index + 1, items.len());
                let transcript = item.transcript();
                let rating = match mode {
                    RatingMode::Subjective => evaluator.run_subjective_evaluation(&transcript).await,
                    RatingMode::FreeForm => {
                        evaluator
                            .run_general_evaluation(&transcript, &item.rubrics)
                            .await
                    }
                };

                match rating {
                    Ok(rating) => records.push(RatedRecord {
                        prompts: item.prompts.clone(),
                        llm_response_text: item.llm_response_text.clone(),
                        mode: mode.as_str().to_string(),
                        rating,
                    }),
                    Err(e) => error!(index, attempts = ?e.attempts(), "Rating failed: {}", e),
                }
            }

            let path = dataset::save_json(&records, output.as_deref(), &config.data.data_dir)?;
            let mean_rating = if records.is_empty() {
                0.0
            } else {
                records.iter().map(|r| r.rating.rating as f64).sum::<f64>() / records.len() as f64
            };
            let failed = items.len() - records.len();

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "rated": records.len(),
                        "failed": failed,
                        "mean_rating": mean_rating,
                        "path": path
                    })
                );
            } else {
                println!(
                    "Ratings: {} completed, {} failed, {:.2} mean rating",
                    records.len(),
                    failed,
                    mean_rating
                );
                println!("Results written to {}", path.display());
            }
        }
    }

    Ok(())
}
