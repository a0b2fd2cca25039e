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

//! Evaluation policy settings
//!
//! Controls the judge retry budget and how rubric judgments are dispatched
//! within a single evaluation.

use serde::{Deserialize, Serialize};

/// Default number of judge attempts per structured call
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default upper bound on in-flight judgments when dispatching concurrently
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Retry and dispatch policy for the evaluation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Judge attempts per structured call. `0` makes every call fail without
    /// contacting the judge.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Judge rubrics concurrently instead of one at a time
    #[serde(default)]
    pub parallel: bool,

    /// In-flight judgment limit when `parallel` is set
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            parallel: false,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl EvaluationConfig {
    /// Effective concurrency: 1 unless `parallel`, never below 1
    pub fn concurrency(&self) -> usize {
        if self.parallel {
            self.max_concurrent.max(1)
        } else {
            1
        }
    }
}
