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

//! End-to-end evaluation through the public API with a scripted judge

use async_trait::async_trait;
use parking_lot::Mutex;
use rubriceval_core::{
    Conversation, DatasetSummary, EvalError, EvaluationConfig, EvaluationDatasetItem, PromptItem,
    RubricItem,
};
use rubriceval_evals::{EvaluationOrchestrator, LLMClient, LLMError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Answers each rubric from a fixed verdict table; unknown criteria get a
/// reply without `criteria_met`.
struct VerdictTable {
    verdicts: HashMap<&'static str, bool>,
    calls: Mutex<Vec<String>>,
}

impl VerdictTable {
    fn new(verdicts: &[(&'static str, bool)]) -> Self {
        Self {
            verdicts: verdicts.iter().copied().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LLMClient for VerdictTable {
    async fn generate_json(&self, prompt: &str, _schema: &Value) -> Result<Value, LLMError> {
        for (criterion, met) in &self.verdicts {
            if prompt.contains(&format!("] {}\n", criterion)) {
                self.calls.lock().push(criterion.to_string());
                return Ok(json!({
                    "explanation": format!("judged {}", criterion),
                    "criteria_met": met
                }));
            }
        }
        self.calls.lock().push("unknown".to_string());
        Ok(json!({ "explanation": "I am not sure" }))
    }

    async fn generate_text(
        &self,
        _conversation: &Conversation,
        _system_instruction: &str,
    ) -> Result<String, LLMError> {
        Err(LLMError::ApiError("not used".to_string()))
    }

    fn model_name(&self) -> &str {
        "verdict-table"
    }
}

fn example_item(rubrics: Vec<RubricItem>) -> EvaluationDatasetItem {
    EvaluationDatasetItem::new(
        Conversation::new(vec![PromptItem::user("X?")]),
        rubrics,
        "Y".to_string(),
    )
}

#[tokio::test]
async fn test_end_to_end_example() {
    let judge = Arc::new(VerdictTable::new(&[("mentions X", true), ("is rude", false)]));
    let orchestrator = EvaluationOrchestrator::new(judge.clone(), EvaluationConfig::default());

    let result = orchestrator
        .evaluate(
            &example_item(vec![
                RubricItem::new("mentions X", 10),
                RubricItem::new("is rude", -5),
            ]),
            Some("example".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(result.prompt_id, "example");
    assert_eq!(result.judgments().len(), 2);
    assert_eq!(result.total_score(), 10);
    assert_eq!(result.theoretical_score(), 10);
    assert_eq!(result.score_rate(), 1.0);
    assert_eq!(result.criteria_pass_rate().unwrap(), 1.0);
    assert_eq!(*judge.calls.lock(), vec!["mentions X", "is rude"]);
}

#[tokio::test]
async fn test_fail_fast_produces_no_partial_result() {
    let judge = Arc::new(VerdictTable::new(&[("mentions X", true), ("cites a source", true)]));
    let orchestrator = EvaluationOrchestrator::new(
        judge.clone(),
        EvaluationConfig {
            max_retries: 3,
            ..Default::default()
        },
    );

    let err = orchestrator
        .evaluate(
            &example_item(vec![
                RubricItem::new("mentions X", 10),
                RubricItem::new("is rude", -5),
                RubricItem::new("cites a source", 2),
            ]),
            None,
        )
        .await
        .unwrap_err();

    match err {
        EvalError::EvaluationAborted {
            criterion,
            attempts,
            ..
        } => {
            assert_eq!(criterion, "is rude");
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The third rubric is never judged once the second fails.
    let calls = judge.calls.lock();
    assert_eq!(calls.len(), 4);
    assert!(!calls.iter().any(|c| c == "cites a source"));
}

#[tokio::test]
async fn test_batch_summary() {
    let judge = Arc::new(VerdictTable::new(&[("mentions X", true), ("mentions Z", false)]));
    let orchestrator = EvaluationOrchestrator::new(
        judge,
        EvaluationConfig {
            max_retries: 1,
            parallel: true,
            max_concurrent: 2,
        },
    );

    let outcome = orchestrator
        .evaluate_all(&[
            example_item(vec![RubricItem::new("mentions X", 10)]),
            example_item(vec![RubricItem::new("mentions Z", 10)]),
            example_item(vec![RubricItem::new("unjudgeable", 10)]),
        ])
        .await;

    let summary = DatasetSummary::from_results(&outcome.results, outcome.failures.len()).unwrap();
    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.failed, 1);
    assert!((summary.mean_score_rate - 0.5).abs() < 1e-12);
}
