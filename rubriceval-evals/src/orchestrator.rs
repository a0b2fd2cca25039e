// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Evaluation orchestration
//!
//! Runs the rubric evaluator over every rubric of a conversation and
//! assembles an [`EvaluationResult`]. An evaluation is all-or-nothing: the
//! first rubric that cannot be judged aborts it and no partial result is
//! produced.

use crate::evaluators::RubricEvaluator;
use crate::llm_client::LLMClient;
use futures::stream::{self, StreamExt, TryStreamExt};
use rubriceval_core::{
    EvalError, EvaluationConfig, EvaluationDatasetItem, EvaluationResult, Result,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Timestamp format used for generated evaluation ids
pub const EVAL_ID_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Evaluation id derived from the current local time
pub fn default_eval_id() -> String {
    chrono::Local::now().format(EVAL_ID_FORMAT).to_string()
}

/// A conversation whose evaluation was aborted
#[derive(Debug)]
pub struct EvaluationFailure {
    /// Position of the record in the input batch
    pub index: usize,
    pub error: EvalError,
}

/// Outcome of evaluating a batch of records
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<EvaluationResult>,
    pub failures: Vec<EvaluationFailure>,
}

pub struct EvaluationOrchestrator {
    evaluator: RubricEvaluator,
    config: EvaluationConfig,
}

impl EvaluationOrchestrator {
    pub fn new(llm_client: Arc<dyn LLMClient>, config: EvaluationConfig) -> Self {
        Self {
            evaluator: RubricEvaluator::new(llm_client).with_max_retries(config.max_retries),
            config,
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Judge every rubric of `item` and assemble the result.
    ///
    /// Rubrics with zero points are rejected before the judge is called.
    /// Judgments keep rubric order even when dispatched concurrently, and the
    /// first failure cancels any judgments still in flight.
    pub async fn evaluate(
        &self,
        item: &EvaluationDatasetItem,
        eval_id: Option<String>,
    ) -> Result<EvaluationResult> {
        let prompt_id = eval_id.unwrap_or_else(default_eval_id);

        for rubric in &item.rubrics {
            rubric.validate()?;
        }

        let start = Instant::now();
        let concurrency = self.config.concurrency();
        debug!(
            prompt_id = %prompt_id,
            rubrics = item.rubrics.len(),
            concurrency,
            "Starting rubric evaluation"
        );

        let mut indexed: Vec<_> = stream::iter(item.rubrics.iter().enumerate())
            .map(|(index, rubric)| async move {
                self.evaluator
                    .judge_rubric(&item.prompts, &item.llm_response_text, rubric)
                    .await
                    .map(|judgment| (index, judgment))
            })
            .buffer_unordered(concurrency)
            .try_collect()
            .await?;
        indexed.sort_by_key(|(index, _)| *index);

        let judgments = indexed.into_iter().map(|(_, judgment)| judgment).collect();
        let result = EvaluationResult::new(
            prompt_id,
            item.prompts.clone(),
            item.llm_response_text.clone(),
            judgments,
        );

        info!(
            prompt_id = %result.prompt_id,
            total_score = result.total_score(),
            theoretical_score = result.theoretical_score(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Evaluation complete"
        );

        Ok(result)
    }

    /// Evaluate records one after another with ids `<timestamp>-<index>`.
    ///
    /// A failed record is logged and reported in the outcome; the rest of the
    /// batch still runs.
    pub async fn evaluate_all(&self, items: &[EvaluationDatasetItem]) -> BatchOutcome {
        let run_id = default_eval_id();
        let mut outcome = BatchOutcome::default();

        for (index, item) in items.iter().enumerate() {
            info!("Evaluating record {}/{}", index + 1, items.len());
            match self
                .evaluate(item, Some(format!("{}-{}", run_id, index)))
                .await
            {
                Ok(result) => outcome.results.push(result),
                Err(err) => {
                    match &err {
                        EvalError::EvaluationAborted {
                            criterion,
                            attempts,
                            ..
                        } => error!(
                            index,
                            criterion = %criterion,
                            attempts,
                            "Evaluation aborted: {}",
                            err
                        ),
                        other => error!(index, "Evaluation failed: {}", other),
                    }
                    outcome.failures.push(EvaluationFailure { index, error: err });
                }
            }
        }

        outcome
    }
}
