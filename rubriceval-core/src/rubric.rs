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

//! Rubric criteria and per-criterion judgments

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// A weighted, signed rubric criterion.
///
/// Positive points reward a response that satisfies the criterion; negative
/// points describe an undesirable behavior and penalize it when present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RubricItem {
    pub criterion: String,
    pub points: i64,
}

impl RubricItem {
    pub fn new(criterion: impl Into<String>, points: i64) -> Self {
        Self {
            criterion: criterion.into(),
            points,
        }
    }

    /// Criterion text with its weight, e.g. `"[10] mentions X"`
    pub fn weighted_text(&self) -> String {
        format!("[{}] {}", self.points, self.criterion)
    }

    /// Fails with [`EvalError::InvalidRubricWeight`] when `points == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.points == 0 {
            return Err(EvalError::InvalidRubricWeight {
                criterion: self.criterion.clone(),
            });
        }
        Ok(())
    }
}

/// Typed form of the judge's raw rubric output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricResult {
    pub explanation: String,
    pub criteria_met: bool,
}

/// Outcome of judging one rubric item against one conversation and response.
///
/// `criteria_met` is recorded exactly as judged; polarity is only applied by
/// the derived accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricJudgment {
    pub rubric: RubricItem,
    pub explanation: String,
    pub criteria_met: bool,
}

impl RubricJudgment {
    pub fn new(rubric: RubricItem, result: RubricResult) -> Self {
        Self {
            rubric,
            explanation: result.explanation,
            criteria_met: result.criteria_met,
        }
    }

    /// Points awarded (or deducted) for this criterion
    pub fn signed_score(&self) -> i64 {
        if self.criteria_met {
            self.rubric.points
        } else {
            0
        }
    }

    /// Whether the response behaved as the rubric wants.
    ///
    /// For positive points the criterion must be met, for negative points it
    /// must not be. Zero points have no defined polarity and fail.
    pub fn is_criteria_passed(&self) -> Result<bool> {
        self.rubric.validate()?;
        Ok(if self.rubric.points > 0 {
            self.criteria_met
        } else {
            !self.criteria_met
        })
    }
}
