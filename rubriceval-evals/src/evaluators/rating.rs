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

//! Holistic 1-5 ratings using LLM-as-judge

use crate::llm_client::{rating_schema, LLMClient};
use crate::prompts::{render_free_form_prompt, render_subjective_prompt};
use crate::retry::attempt_typed_call;
use rubriceval_core::config::DEFAULT_MAX_RETRIES;
use rubriceval_core::{RatingResult, Result, RubricItem};
use std::sync::Arc;
use tracing::debug;

/// Fields the judge must return for a rating
pub const RATING_FIELDS: [&str; 2] = ["explanation", "rating"];

/// Rates a whole transcript instead of judging individual rubrics.
///
/// The judge is asked for a 1-5 rating but the value is not range checked.
pub struct RatingEvaluator {
    llm_client: Arc<dyn LLMClient>,
    max_retries: u32,
}

impl RatingEvaluator {
    pub fn new(llm_client: Arc<dyn LLMClient>) -> Self {
        Self {
            llm_client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Overall rating with no criteria
    pub async fn run_subjective_evaluation(&self, transcript: &str) -> Result<RatingResult> {
        debug!(model = self.llm_client.model_name(), "Running subjective rating");
        self.rate(render_subjective_prompt(transcript)).await
    }

    /// Overall rating steered by the positive and negative rubrics
    pub async fn run_general_evaluation(
        &self,
        transcript: &str,
        rubrics: &[RubricItem],
    ) -> Result<RatingResult> {
        debug!(
            model = self.llm_client.model_name(),
            rubrics = rubrics.len(),
            "Running free-form rating"
        );
        self.rate(render_free_form_prompt(transcript, rubrics)).await
    }

    async fn rate(&self, prompt: String) -> Result<RatingResult> {
        let schema = rating_schema();
        attempt_typed_call(
            || self.llm_client.generate_json(&prompt, &schema),
            &RATING_FIELDS,
            self.max_retries,
        )
        .await
    }
}
