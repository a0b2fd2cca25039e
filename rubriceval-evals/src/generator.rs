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

//! Response generation for evaluation datasets

use crate::llm_client::LLMClient;
use rubriceval_core::{
    Conversation, EvalError, EvaluationDatasetItem, GenerationDatasetItem, Result, RubricItem,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Produces candidate responses, one per system instruction
pub struct ResponseGenerator {
    llm_client: Arc<dyn LLMClient>,
}

impl ResponseGenerator {
    pub fn new(llm_client: Arc<dyn LLMClient>) -> Self {
        Self { llm_client }
    }

    /// Generate a single response to `conversation`
    pub async fn generate_response(
        &self,
        conversation: &Conversation,
        system_instruction: &str,
    ) -> Result<String> {
        if conversation.is_empty() {
            return Err(EvalError::InvalidInput(
                "cannot generate a response to an empty conversation".to_string(),
            ));
        }

        let text = self
            .llm_client
            .generate_text(conversation, system_instruction)
            .await
            .map_err(|e| EvalError::LLMClientError(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(EvalError::LLMClientError(
                "generator returned an empty response".to_string(),
            ));
        }

        Ok(text)
    }

    /// Generate responses for every item and instruction.
    ///
    /// Items without prompts or instructions are skipped, as are individual
    /// generations that fail. Every produced record carries `rubrics`.
    pub async fn generate_responses(
        &self,
        dataset: &[GenerationDatasetItem],
        rubrics: &[RubricItem],
    ) -> Vec<EvaluationDatasetItem> {
        let mut records = Vec::new();

        for (i, item) in dataset.iter().enumerate() {
            info!("Generating responses for item {}/{}", i + 1, dataset.len());

            if item.prompts.is_empty() {
                warn!("Skipping item {}: no prompts", i + 1);
                continue;
            }
            if item.generator_system_instructions.is_empty() {
                warn!("Skipping item {}: no system instructions", i + 1);
                continue;
            }

            let instructions = &item.generator_system_instructions;
            for (j, instruction) in instructions.iter().enumerate() {
                info!("Instruction {}/{}", j + 1, instructions.len());

                match self.generate_response(&item.prompts, instruction).await {
                    Ok(text) => records.push(EvaluationDatasetItem::new(
                        item.prompts.clone(),
                        rubrics.to_vec(),
                        text,
                    )),
                    Err(e) => warn!(
                        "Generation failed for item {} instruction {}: {}",
                        i + 1,
                        j + 1,
                        e
                    ),
                }
            }
        }

        info!(
            "Generated {} responses from {} items",
            records.len(),
            dataset.len()
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LLMError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rubriceval_core::PromptItem;
    use serde_json::Value;

    /// Echoes the system instruction, failing on instructions containing "fail"
    struct EchoClient {
        seen: Mutex<Vec<(usize, String)>>,
    }

    #[async_trait]
    impl LLMClient for EchoClient {
        async fn generate_json(
            &self,
            _prompt: &str,
            _schema: &Value,
        ) -> std::result::Result<Value, LLMError> {
            Err(LLMError::ApiError("not used".to_string()))
        }

        async fn generate_text(
            &self,
            conversation: &Conversation,
            system_instruction: &str,
        ) -> std::result::Result<String, LLMError> {
            self.seen
                .lock()
                .push((conversation.len(), system_instruction.to_string()));
            if system_instruction.contains("fail") {
                return Err(LLMError::RateLimitExceeded);
            }
            if system_instruction.contains("silent") {
                return Ok("   ".to_string());
            }
            Ok(format!("reply under '{}'", system_instruction))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    fn generation_item(turns: Vec<PromptItem>, instructions: &[&str]) -> GenerationDatasetItem {
        GenerationDatasetItem {
            prompts: Conversation::new(turns),
            generator_system_instructions: instructions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_generate_responses_skip_rules() {
        let client = Arc::new(EchoClient {
            seen: Mutex::new(Vec::new()),
        });
        let generator = ResponseGenerator::new(client.clone());
        let rubrics = vec![RubricItem::new("mentions X", 10)];

        let dataset = vec![
            generation_item(
                vec![PromptItem::user("hi"), PromptItem::assistant("hello"), PromptItem::user("X?")],
                &["be brief", "please fail", "be verbose", "stay silent"],
            ),
            generation_item(vec![], &["be brief"]),
            generation_item(vec![PromptItem::user("X?")], &[]),
        ];

        let records = generator.generate_responses(&dataset, &rubrics).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].llm_response_text, "reply under 'be brief'");
        assert_eq!(records[1].llm_response_text, "reply under 'be verbose'");
        assert_eq!(records[0].rubrics, rubrics);
        assert_eq!(records[0].prompts.len(), 3);

        let seen = client.seen.lock();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|(turns, _)| *turns == 3));
    }

    #[tokio::test]
    async fn test_empty_conversation_is_invalid_input() {
        let generator = ResponseGenerator::new(Arc::new(EchoClient {
            seen: Mutex::new(Vec::new()),
        }));

        let err = generator
            .generate_response(&Conversation::default(), "be brief")
            .await
            .unwrap_err();

        assert!(matches!(err, EvalError::InvalidInput(_)));
    }
}
