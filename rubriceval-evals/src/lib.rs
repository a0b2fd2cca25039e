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

//! # Rubriceval Evaluation Pipeline
//!
//! LLM-as-judge scoring of responses against weighted rubrics.
//!
//! ## Features
//!
//! - **Rubric judging**: One structured judge call per rubric item
//! - **Bounded retries**: Malformed judge output is retried, never defaulted
//! - **Fail-fast orchestration**: All-or-nothing results, optional concurrency
//! - **Rating evaluators**: Holistic 1-5 ratings, with or without criteria
//! - **Response generation**: Candidate responses per system instruction
//!
//! ## Example
//!
//! ```rust,ignore
//! use rubriceval_evals::{EvaluationOrchestrator, OpenAIClient};
//! use rubriceval_core::{EvaluationConfig, EvaluationDatasetItem};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let judge = Arc::new(OpenAIClient::new(
//!         std::env::var("OPENAI_API_KEY").unwrap(),
//!         "gpt-4o-mini".to_string(),
//!     ));
//!     let orchestrator = EvaluationOrchestrator::new(judge, EvaluationConfig::default());
//!
//!     let item: EvaluationDatasetItem = serde_json::from_str(RECORD).unwrap();
//!     let result = orchestrator.evaluate(&item, None).await.unwrap();
//!     println!("score rate: {}", result.score_rate());
//! }
//! ```

pub mod evaluators;
pub mod generator;
pub mod llm_client;
pub mod orchestrator;
pub mod prompts;
pub mod retry;

pub use evaluators::{RatingEvaluator, RubricEvaluator};
pub use generator::ResponseGenerator;
pub use llm_client::{
    rating_schema, rubric_schema, AnthropicClient, ClientOptions, LLMClient, LLMError,
    OpenAIClient,
};
pub use orchestrator::{default_eval_id, BatchOutcome, EvaluationFailure, EvaluationOrchestrator};
pub use retry::{attempt_structured_call, attempt_typed_call};
