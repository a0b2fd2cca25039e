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

//! Error types shared by the evaluation pipeline

use thiserror::Error;

/// Why a single structured judge call was rejected.
///
/// These are recovered locally by retrying; they only escape as the
/// `last_failure` of [`EvalError::ExhaustedRetries`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttemptFailure {
    #[error("judge call failed: {0}")]
    Invoker(String),

    #[error("judge returned a non-object value: {0}")]
    NotAnObject(String),

    #[error("missing required fields: {}", .missing.join(", "))]
    MissingFields {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("malformed field types: {0}")]
    Malformed(String),
}

/// Errors that can occur during evaluation
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("no valid judge result after {attempts} attempt(s): {last_failure:?}")]
    ExhaustedRetries {
        attempts: u32,
        last_failure: Option<AttemptFailure>,
    },

    #[error("rubric points must be nonzero for pass/fail semantics (criterion: {criterion:?})")]
    InvalidRubricWeight { criterion: String },

    #[error("evaluation aborted: criterion {criterion:?} could not be judged after {attempts} attempt(s): {reason}")]
    EvaluationAborted {
        criterion: String,
        attempts: u32,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("LLM client error: {0}")]
    LLMClientError(String),
}

impl EvalError {
    /// Number of judge attempts spent before this error was raised, if any.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            EvalError::ExhaustedRetries { attempts, .. }
            | EvalError::EvaluationAborted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
