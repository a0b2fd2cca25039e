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

//! JSON dataset files

use anyhow::{Context, Result};
use rubriceval_core::{
    Conversation, EvaluationDatasetItem, GenerationDatasetItem, PromptDatasetItem, RatingResult,
    RubricItem,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name format for outputs written without an explicit path
pub const OUTPUT_FILE_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// A rated response as written by the `rate` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedRecord {
    pub prompts: Conversation,
    pub llm_response_text: String,
    /// `subjective` or `free-form`
    pub mode: String,
    pub rating: RatingResult,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse dataset {:?}", path))
}

pub fn load_generation_dataset(path: &Path) -> Result<Vec<GenerationDatasetItem>> {
    load_json(path)
}

pub fn load_prompt_dataset(path: &Path) -> Result<Vec<PromptDatasetItem>> {
    load_json(path)
}

pub fn load_evaluation_dataset(path: &Path) -> Result<Vec<EvaluationDatasetItem>> {
    load_json(path)
}

pub fn load_rubrics(path: &Path) -> Result<Vec<RubricItem>> {
    load_json(path)
}

/// Default output path: `<data_dir>/<timestamp>.json`
pub fn timestamped_path(data_dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format(OUTPUT_FILE_FORMAT);
    data_dir.join(format!("{}.json", stamp))
}

/// Write `records` as pretty-printed UTF-8 JSON and return the path used.
///
/// Non-ASCII text is written as-is. Parent directories are created.
pub fn save_json<T: Serialize + ?Sized>(
    records: &T,
    path: Option<&Path>,
    data_dir: &Path,
) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => timestamped_path(data_dir),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
    }

    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::info!("Saved dataset to {:?}", path);

    Ok(path)
}
