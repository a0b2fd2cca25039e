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

//! Dataset records passed between the generation and evaluation stages

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::rubric::RubricItem;

/// Input to response generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationDatasetItem {
    pub prompts: Conversation,

    /// One response is generated per instruction
    #[serde(default)]
    pub generator_system_instructions: Vec<String>,
}

/// Conversation paired with the rubrics it should be judged against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDatasetItem {
    pub prompts: Conversation,

    #[serde(default)]
    pub rubrics: Vec<RubricItem>,
}

/// A conversation, its rubrics, and the response under evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDatasetItem {
    pub prompts: Conversation,

    #[serde(default)]
    pub rubrics: Vec<RubricItem>,

    pub llm_response_text: String,
}

impl EvaluationDatasetItem {
    pub fn new(prompts: Conversation, rubrics: Vec<RubricItem>, llm_response_text: String) -> Self {
        Self {
            prompts,
            rubrics,
            llm_response_text,
        }
    }

    /// Transcript of the conversation followed by the response
    pub fn transcript(&self) -> String {
        self.prompts.render_transcript(&self.llm_response_text)
    }
}

impl From<EvaluationDatasetItem> for PromptDatasetItem {
    fn from(item: EvaluationDatasetItem) -> Self {
        Self {
            prompts: item.prompts,
            rubrics: item.rubrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_item_from_json() {
        let json = r#"{
            "prompts": [{"role": "user", "content": "X?"}],
            "rubrics": [{"criterion": "mentions X", "points": 10}],
            "llm_response_text": "Y"
        }"#;

        let item: EvaluationDatasetItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.rubrics[0].points, 10);
        assert_eq!(item.transcript(), "user: X?\nassistant: Y");
    }

    #[test]
    fn test_generation_item_defaults_instructions() {
        let item: GenerationDatasetItem =
            serde_json::from_str(r#"{"prompts": [{"role": "user", "content": "hi"}]}"#).unwrap();
        assert!(item.generator_system_instructions.is_empty());
    }
}
