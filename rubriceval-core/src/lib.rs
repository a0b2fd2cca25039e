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

//! Rubriceval Core
//!
//! Data model, error types and score aggregation for rubric-based evaluation
//! of LLM responses.

pub mod config;
pub mod conversation;
pub mod error;
pub mod eval_dataset;
pub mod eval_result;
pub mod rubric;
pub mod scoring;

pub use config::EvaluationConfig;
pub use conversation::{Conversation, PromptItem, Role};
pub use error::{AttemptFailure, EvalError, Result};
pub use eval_dataset::{EvaluationDatasetItem, GenerationDatasetItem, PromptDatasetItem};
pub use eval_result::{EvaluationRecord, EvaluationResult, JudgmentRecord, RatingResult};
pub use rubric::{RubricItem, RubricJudgment, RubricResult};
pub use scoring::{
    criteria_pass_rate, score_rate, summarize, theoretical_score, total_score, DatasetSummary,
    ScoreSummary,
};
