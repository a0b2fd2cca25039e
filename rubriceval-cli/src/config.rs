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

use anyhow::{Context, Result};
use rubriceval_core::EvaluationConfig;
use rubriceval_evals::llm_client::{DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};
use rubriceval_evals::{AnthropicClient, ClientOptions, LLMClient, OpenAIClient};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Rubriceval Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RubricEvalConfig {
    /// Model that judges responses
    #[serde(default)]
    pub judge: ModelConfig,

    /// Model that produces candidate responses
    #[serde(default)]
    pub generator: ModelConfig,

    #[serde(default)]
    pub evaluation: EvaluationConfig,

    #[serde(default)]
    pub llm: LLMConfig,

    #[serde(default)]
    pub data: DataConfig,
}

/// LLM provider backing a model section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    Anthropic,
}

impl std::str::FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => anyhow::bail!("unknown provider {:?} (expected openai or anthropic)", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: Provider,

    /// Model name passed to the provider (e.g., "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. The judge uses 0.0 when unset.
    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Override the provider API base URL
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LLMConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Directory for timestamped output files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: default_model(),
            temperature: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

// Default values
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl RubricEvalConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config.merge_with_env(|key| std::env::var(key).ok())
    }

    /// Override fields whose environment variable is set.
    ///
    /// Supported environment variables:
    /// - RUBRICEVAL_JUDGE_PROVIDER / RUBRICEVAL_JUDGE_MODEL / RUBRICEVAL_JUDGE_BASE_URL
    /// - RUBRICEVAL_GENERATOR_PROVIDER / RUBRICEVAL_GENERATOR_MODEL
    /// - RUBRICEVAL_MAX_RETRIES, RUBRICEVAL_PARALLEL, RUBRICEVAL_MAX_CONCURRENT
    /// - RUBRICEVAL_DATA_DIR
    /// - OPENAI_API_KEY, ANTHROPIC_API_KEY
    pub fn merge_with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Model configuration
        if let Some(provider) = lookup("RUBRICEVAL_JUDGE_PROVIDER") {
            self.judge.provider = provider.parse()?;
        }
        if let Some(model) = lookup("RUBRICEVAL_JUDGE_MODEL") {
            self.judge.model = model;
        }
        if let Some(base_url) = lookup("RUBRICEVAL_JUDGE_BASE_URL") {
            self.judge.base_url = Some(base_url);
        }
        if let Some(provider) = lookup("RUBRICEVAL_GENERATOR_PROVIDER") {
            self.generator.provider = provider.parse()?;
        }
        if let Some(model) = lookup("RUBRICEVAL_GENERATOR_MODEL") {
            self.generator.model = model;
        }

        // Evaluation policy
        if let Some(retries) = lookup("RUBRICEVAL_MAX_RETRIES") {
            self.evaluation.max_retries = retries
                .parse()
                .context("RUBRICEVAL_MAX_RETRIES must be a non-negative integer")?;
        }
        if let Some(parallel) = lookup("RUBRICEVAL_PARALLEL") {
            self.evaluation.parallel = parallel
                .parse()
                .context("RUBRICEVAL_PARALLEL must be true or false")?;
        }
        if let Some(max_concurrent) = lookup("RUBRICEVAL_MAX_CONCURRENT") {
            self.evaluation.max_concurrent = max_concurrent
                .parse()
                .context("RUBRICEVAL_MAX_CONCURRENT must be a non-negative integer")?;
        }

        // Storage
        if let Some(data_dir) = lookup("RUBRICEVAL_DATA_DIR") {
            self.data.data_dir = PathBuf::from(data_dir);
        }

        // LLM credentials
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(key);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.llm.anthropic_api_key = Some(key);
        }

        Ok(self)
    }

    /// Client for the judge, deterministic unless a temperature is configured
    pub fn judge_client(&self) -> Result<Arc<dyn LLMClient>> {
        build_client(&self.judge, &self.llm, Some(self.judge.temperature.unwrap_or(0.0)))
    }

    pub fn generator_client(&self) -> Result<Arc<dyn LLMClient>> {
        build_client(&self.generator, &self.llm, self.generator.temperature)
    }
}

fn build_client(
    model: &ModelConfig,
    llm: &LLMConfig,
    temperature: Option<f64>,
) -> Result<Arc<dyn LLMClient>> {
    let options = ClientOptions {
        temperature,
        max_tokens: model.max_tokens,
        timeout: Duration::from_secs(model.timeout_secs),
    };

    let client: Arc<dyn LLMClient> = match model.provider {
        Provider::OpenAI => {
            let api_key = llm
                .openai_api_key
                .clone()
                .context("OpenAI API key not configured (set OPENAI_API_KEY)")?;
            let mut client = OpenAIClient::new(api_key, model.model.clone()).with_options(options);
            if let Some(base_url) = &model.base_url {
                client = client.with_base_url(base_url.clone());
            }
            Arc::new(client)
        }
        Provider::Anthropic => {
            let api_key = llm
                .anthropic_api_key
                .clone()
                .context("Anthropic API key not configured (set ANTHROPIC_API_KEY)")?;
            let mut client =
                AnthropicClient::new(api_key, model.model.clone()).with_options(options);
            if let Some(base_url) = &model.base_url {
                client = client.with_base_url(base_url.clone());
            }
            Arc::new(client)
        }
    };

    tracing::debug!(provider = ?model.provider, model = %model.model, "Built LLM client");
    Ok(client)
}
