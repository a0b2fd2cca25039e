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

//! Score aggregation over completed rubric judgments
//!
//! Everything here is a pure function of a judgment slice, so results can
//! never go stale and synthetic judgment sets can be scored directly.

use crate::error::Result;
use crate::eval_result::EvaluationResult;
use crate::rubric::RubricJudgment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sum of signed scores.
///
/// Accumulated in `i128` so that no set of `i64` weights can overflow.
pub fn total_score(judgments: &[RubricJudgment]) -> i128 {
    judgments
        .iter()
        .map(|j| i128::from(j.signed_score()))
        .sum()
}

/// Achievable ceiling: sum of positive points only
pub fn theoretical_score(judgments: &[RubricJudgment]) -> i128 {
    judgments
        .iter()
        .map(|j| j.rubric.points)
        .filter(|&points| points > 0)
        .map(i128::from)
        .sum()
}

/// `total / theoretical`, or `0.0` when there is no positive ceiling
pub fn score_rate(judgments: &[RubricJudgment]) -> f64 {
    let theoretical = theoretical_score(judgments);
    if theoretical > 0 {
        total_score(judgments) as f64 / theoretical as f64
    } else {
        0.0
    }
}

/// Fraction of judgments that passed, `0.0` for an empty set.
///
/// Fails if any judgment carries a zero-point rubric.
pub fn criteria_pass_rate(judgments: &[RubricJudgment]) -> Result<f64> {
    if judgments.is_empty() {
        return Ok(0.0);
    }

    let mut passed = 0usize;
    for judgment in judgments {
        if judgment.is_criteria_passed()? {
            passed += 1;
        }
    }

    Ok(passed as f64 / judgments.len() as f64)
}

/// All aggregate metrics for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total_score: i128,
    pub theoretical_score: i128,
    pub score_rate: f64,
    pub criteria_pass_rate: f64,
}

pub fn summarize(judgments: &[RubricJudgment]) -> Result<ScoreSummary> {
    Ok(ScoreSummary {
        total_score: total_score(judgments),
        theoretical_score: theoretical_score(judgments),
        score_rate: score_rate(judgments),
        criteria_pass_rate: criteria_pass_rate(judgments)?,
    })
}

/// Averages over a batch of evaluation results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub evaluated: usize,
    pub failed: usize,
    pub mean_score_rate: f64,
    pub mean_criteria_pass_rate: f64,
}

impl DatasetSummary {
    /// `failed` counts conversations whose evaluation was aborted and are
    /// therefore absent from `results`.
    pub fn from_results(results: &[EvaluationResult], failed: usize) -> Result<Self> {
        let evaluated = results.len();
        if evaluated == 0 {
            return Ok(Self {
                evaluated,
                failed,
                mean_score_rate: 0.0,
                mean_criteria_pass_rate: 0.0,
            });
        }

        let mut score_rates = 0.0;
        let mut pass_rates = 0.0;
        for result in results {
            score_rates += result.score_rate();
            pass_rates += result.criteria_pass_rate()?;
        }

        Ok(Self {
            evaluated,
            failed,
            mean_score_rate: score_rates / evaluated as f64,
            mean_criteria_pass_rate: pass_rates / evaluated as f64,
        })
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Evaluations: {} completed, {} failed, {:.1}% mean score rate, {:.1}% mean criteria pass rate",
            self.evaluated,
            self.failed,
            self.mean_score_rate * 100.0,
            self.mean_criteria_pass_rate * 100.0
        )
    }
}
