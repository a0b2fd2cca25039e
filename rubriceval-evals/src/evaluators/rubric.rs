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

//! Per-criterion rubric judging using LLM-as-judge

use crate::llm_client::{rubric_schema, LLMClient};
use crate::prompts::render_rubric_prompt;
use crate::retry::attempt_typed_call;
use rubriceval_core::config::DEFAULT_MAX_RETRIES;
use rubriceval_core::{
    Conversation, EvalError, Result, RubricItem, RubricJudgment, RubricResult,
};
use std::sync::Arc;
use tracing::debug;

/// Fields the judge must return for a rubric judgment
pub const RUBRIC_FIELDS: [&str; 2] = ["explanation", "criteria_met"];

/// Judges whether a response meets a single rubric item.
///
/// The judge's verdict is recorded as-is; polarity of negative rubrics is
/// applied later by scoring.
pub struct RubricEvaluator {
    llm_client: Arc<dyn LLMClient>,
    max_retries: u32,
}

impl RubricEvaluator {
    pub fn new(llm_client: Arc<dyn LLMClient>) -> Self {
        Self {
            llm_client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set judge attempt budget per rubric (default: 5)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Judge `response_text` as the reply to `conversation` against `rubric`.
    ///
    /// Fails with [`EvalError::EvaluationAborted`] naming the criterion when
    /// the judge never produces a valid verdict.
    pub async fn judge_rubric(
        &self,
        conversation: &Conversation,
        response_text: &str,
        rubric: &RubricItem,
    ) -> Result<RubricJudgment> {
        let transcript = conversation.render_transcript(response_text);
        let prompt = render_rubric_prompt(&transcript, rubric);
        let schema = rubric_schema();

        debug!(
            model = self.llm_client.model_name(),
            criterion = %rubric.criterion,
            "Judging rubric item"
        );

        let result: RubricResult = attempt_typed_call(
            || self.llm_client.generate_json(&prompt, &schema),
            &RUBRIC_FIELDS,
            self.max_retries,
        )
        .await
        .map_err(|e| match e {
            EvalError::ExhaustedRetries {
                attempts,
                last_failure,
            } => EvalError::EvaluationAborted {
                criterion: rubric.criterion.clone(),
                attempts,
                reason: last_failure
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "no judge attempts allowed".to_string()),
            },
            other => other,
        })?;

        Ok(RubricJudgment::new(rubric.clone(), result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LLMError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rubriceval_core::PromptItem;
    use serde_json::{json, Value};

    /// Records prompts and answers every call with the same verdict
    struct MockLLMClient {
        verdict: Value,
        prompts: Mutex<Vec<String>>,
    }

    impl MockLLMClient {
        fn new(verdict: Value) -> Self {
            Self {
                verdict,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMClient for MockLLMClient {
        async fn generate_json(
            &self,
            prompt: &str,
            _schema: &Value,
        ) -> std::result::Result<Value, LLMError> {
            self.prompts.lock().push(prompt.to_string());
            Ok(self.verdict.clone())
        }

        async fn generate_text(
            &self,
            _conversation: &Conversation,
            _system_instruction: &str,
        ) -> std::result::Result<String, LLMError> {
            Err(LLMError::ApiError("not used".to_string()))
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }
    }

    #[tokio::test]
    async fn test_judge_rubric_builds_prompt() {
        let client = Arc::new(MockLLMClient::new(json!({
            "explanation": "The response mentions X.",
            "criteria_met": true
        })));
        let evaluator = RubricEvaluator::new(client.clone());
        let conversation = Conversation::new(vec![PromptItem::user("X?")]);
        let rubric = RubricItem::new("mentions X", 10);

        let judgment = evaluator
            .judge_rubric(&conversation, "Y", &rubric)
            .await
            .unwrap();

        assert!(judgment.criteria_met);
        assert_eq!(judgment.rubric, rubric);

        let prompts = client.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("user: X?\nassistant: Y"));
        assert!(prompts[0].contains("[10] mentions X"));
    }

    #[tokio::test]
    async fn test_negative_rubric_verdict_recorded_verbatim() {
        let client = Arc::new(MockLLMClient::new(json!({
            "explanation": "Not rude.",
            "criteria_met": false
        })));
        let evaluator = RubricEvaluator::new(client);

        let judgment = evaluator
            .judge_rubric(
                &Conversation::new(vec![PromptItem::user("X?")]),
                "Y",
                &RubricItem::new("is rude", -5),
            )
            .await
            .unwrap();

        assert!(!judgment.criteria_met);
        assert!(judgment.is_criteria_passed().unwrap());
    }

    #[tokio::test]
    async fn test_exhaustion_names_criterion() {
        let client = Arc::new(MockLLMClient::new(json!({ "explanation": "no verdict" })));
        let evaluator = RubricEvaluator::new(client.clone()).with_max_retries(3);

        let err = evaluator
            .judge_rubric(
                &Conversation::new(vec![PromptItem::user("X?")]),
                "Y",
                &RubricItem::new("mentions X", 10),
            )
            .await
            .unwrap_err();

        match err {
            EvalError::EvaluationAborted {
                criterion,
                attempts,
                reason,
            } => {
                assert_eq!(criterion, "mentions X");
                assert_eq!(attempts, 3);
                assert!(reason.contains("criteria_met"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.prompts.lock().len(), 3);
    }
}
