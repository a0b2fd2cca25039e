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

//! Bounded retry around structured judge calls
//!
//! A judge call succeeds only when it yields a JSON object carrying every
//! required field. Anything else is an attempt failure and is retried
//! immediately until the budget runs out.

use rubriceval_core::{AttemptFailure, EvalError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// Call `invoke` until it returns an object containing `required_fields`.
///
/// Extra fields are passed through untouched. At most `max_retries` calls are
/// made; a budget of zero makes no calls at all.
pub async fn attempt_structured_call<F, Fut, E>(
    invoke: F,
    required_fields: &[&str],
    max_retries: u32,
) -> Result<Map<String, Value>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Value, E>>,
    E: Display,
{
    retry_loop(invoke, required_fields, max_retries, Ok).await
}

/// Like [`attempt_structured_call`], then decode the object into `T`.
///
/// A value whose fields are present but of the wrong type counts as a failed
/// attempt and is retried.
pub async fn attempt_typed_call<T, F, Fut, E>(
    invoke: F,
    required_fields: &[&str],
    max_retries: u32,
) -> Result<T>
where
    T: DeserializeOwned,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Value, E>>,
    E: Display,
{
    retry_loop(invoke, required_fields, max_retries, |object| {
        serde_json::from_value(Value::Object(object))
            .map_err(|e| AttemptFailure::Malformed(e.to_string()))
    })
    .await
}

async fn retry_loop<T, F, Fut, E, D>(
    mut invoke: F,
    required_fields: &[&str],
    max_retries: u32,
    decode: D,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Value, E>>,
    E: Display,
    D: Fn(Map<String, Value>) -> std::result::Result<T, AttemptFailure>,
{
    let mut last_failure = None;

    for attempt in 1..=max_retries {
        debug!("Judge attempt {}/{}", attempt, max_retries);

        let outcome = match invoke().await {
            Ok(value) => check_required_fields(value, required_fields).and_then(&decode),
            Err(e) => Err(AttemptFailure::Invoker(e.to_string())),
        };

        match outcome {
            Ok(result) => return Ok(result),
            Err(failure) => {
                match &failure {
                    AttemptFailure::MissingFields { missing, available } => warn!(
                        attempt,
                        max_retries,
                        missing = ?missing,
                        available = ?available,
                        "Judge attempt {}/{} missing required fields",
                        attempt,
                        max_retries
                    ),
                    other => warn!(
                        attempt,
                        max_retries,
                        "Judge attempt {}/{} failed: {}",
                        attempt,
                        max_retries,
                        other
                    ),
                }
                last_failure = Some(failure);
            }
        }
    }

    Err(EvalError::ExhaustedRetries {
        attempts: max_retries,
        last_failure,
    })
}

/// Require a JSON object holding every key in `required_fields`
pub fn check_required_fields(
    value: Value,
    required_fields: &[&str],
) -> std::result::Result<Map<String, Value>, AttemptFailure> {
    let object = match value {
        Value::Object(object) => object,
        other => return Err(AttemptFailure::NotAnObject(other.to_string())),
    };

    let missing: Vec<String> = required_fields
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(object)
    } else {
        Err(AttemptFailure::MissingFields {
            missing,
            available: object.keys().cloned().collect(),
        })
    }
}
