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

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::error::Result;
use crate::rubric::{RubricItem, RubricJudgment};
use crate::scoring::{self, ScoreSummary};

/// Completed rubric evaluation of one response.
///
/// Only constructed once every rubric has a judgment. Aggregate scores are
/// never stored; they are recomputed from the judgments on access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Caller-supplied or timestamp-derived identifier
    pub prompt_id: String,

    /// Conversation that was evaluated
    pub prompts: Conversation,

    /// Response that was judged
    pub llm_response_text: String,

    /// One judgment per rubric, in rubric order
    result_by_rubrics: Vec<RubricJudgment>,
}

impl EvaluationResult {
    pub fn new(
        prompt_id: String,
        prompts: Conversation,
        llm_response_text: String,
        result_by_rubrics: Vec<RubricJudgment>,
    ) -> Self {
        Self {
            prompt_id,
            prompts,
            llm_response_text,
            result_by_rubrics,
        }
    }

    pub fn judgments(&self) -> &[RubricJudgment] {
        &self.result_by_rubrics
    }

    pub fn total_score(&self) -> i128 {
        scoring::total_score(&self.result_by_rubrics)
    }

    pub fn theoretical_score(&self) -> i128 {
        scoring::theoretical_score(&self.result_by_rubrics)
    }

    pub fn score_rate(&self) -> f64 {
        scoring::score_rate(&self.result_by_rubrics)
    }

    pub fn criteria_pass_rate(&self) -> Result<f64> {
        scoring::criteria_pass_rate(&self.result_by_rubrics)
    }

    pub fn summary(&self) -> Result<ScoreSummary> {
        scoring::summarize(&self.result_by_rubrics)
    }

    /// Materialize the derived fields for storage
    pub fn to_record(&self) -> Result<EvaluationRecord> {
        let mut judgments = Vec::with_capacity(self.result_by_rubrics.len());
        for judgment in &self.result_by_rubrics {
            judgments.push(JudgmentRecord {
                rubric: judgment.rubric.clone(),
                explanation: judgment.explanation.clone(),
                criteria_met: judgment.criteria_met,
                signed_score: judgment.signed_score(),
                is_criteria_passed: judgment.is_criteria_passed()?,
            });
        }

        Ok(EvaluationRecord {
            prompt_id: self.prompt_id.clone(),
            prompts: self.prompts.clone(),
            llm_response_text: self.llm_response_text.clone(),
            result_by_rubrics: judgments,
            total_score: self.total_score(),
            theoretical_score: self.theoretical_score(),
            score_rate: self.score_rate(),
            criteria_pass_rate: self.criteria_pass_rate()?,
        })
    }
}

/// Per-judgment view with derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentRecord {
    pub rubric: RubricItem,
    pub explanation: String,
    pub criteria_met: bool,
    pub signed_score: i64,
    pub is_criteria_passed: bool,
}

/// Storage projection of an [`EvaluationResult`].
///
/// Write-only snapshot: the derived numbers are copies, so reload the
/// [`EvaluationResult`] rather than this when scores are needed again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub prompt_id: String,
    pub prompts: Conversation,
    pub llm_response_text: String,
    pub result_by_rubrics: Vec<JudgmentRecord>,
    pub total_score: i128,
    pub theoretical_score: i128,
    pub score_rate: f64,
    pub criteria_pass_rate: f64,
}

/// Holistic 1-5 rating produced by the rating evaluators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingResult {
    pub explanation: String,
    pub rating: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::PromptItem;

    fn sample() -> EvaluationResult {
        EvaluationResult::new(
            "2025-01-01-00-00-00".to_string(),
            Conversation::new(vec![PromptItem::user("X?")]),
            "Y".to_string(),
            vec![
                RubricJudgment {
                    rubric: RubricItem::new("mentions X", 10),
                    explanation: "it does".to_string(),
                    criteria_met: true,
                },
                RubricJudgment {
                    rubric: RubricItem::new("is rude", -5),
                    explanation: "it is not".to_string(),
                    criteria_met: false,
                },
            ],
        )
    }

    #[test]
    fn test_derived_scores() {
        let result = sample();
        assert_eq!(result.total_score(), 10);
        assert_eq!(result.theoretical_score(), 10);
        assert_eq!(result.score_rate(), 1.0);
        assert_eq!(result.criteria_pass_rate().unwrap(), 1.0);
    }

    #[test]
    fn test_record_materializes_derived_fields() {
        let record = sample().to_record().unwrap();
        assert_eq!(record.total_score, 10);
        assert_eq!(record.result_by_rubrics[1].signed_score, 0);
        assert!(record.result_by_rubrics[1].is_criteria_passed);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["score_rate"], 1.0);
        assert_eq!(json["prompts"][0]["role"], "user");
        assert_eq!(json["result_by_rubrics"][0]["rubric"]["points"], 10);
    }

    #[test]
    fn test_result_deserializes_without_derived_fields() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("total_score"));

        let parsed: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }
}
