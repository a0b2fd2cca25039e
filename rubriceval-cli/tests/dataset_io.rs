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

use rubriceval_cli::config::Provider;
use rubriceval_cli::dataset::{
    load_evaluation_dataset, load_generation_dataset, load_prompt_dataset, load_rubrics,
    save_json,
};
use rubriceval_cli::RubricEvalConfig;
use rubriceval_core::{Conversation, EvaluationDatasetItem, PromptItem, Role, RubricItem};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn test_load_datasets() {
    let mut generation = NamedTempFile::new().unwrap();
    write!(
        generation,
        r#"[{{
            "prompts": [{{"role": "user", "content": "X?"}}],
            "generator_system_instructions": ["be brief", "be thorough"]
        }}]"#
    )
    .unwrap();

    let items = load_generation_dataset(generation.path()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].generator_system_instructions.len(), 2);

    let mut prompts = NamedTempFile::new().unwrap();
    write!(
        prompts,
        r#"[{{
            "prompts": [{{"role": "user", "content": "X?"}}],
            "rubrics": [{{"criterion": "mentions X", "points": 10}}]
        }}]"#
    )
    .unwrap();

    let items = load_prompt_dataset(prompts.path()).unwrap();
    assert_eq!(items[0].rubrics[0], RubricItem::new("mentions X", 10));

    let mut rubrics = NamedTempFile::new().unwrap();
    write!(
        rubrics,
        r#"[{{"criterion": "mentions X", "points": 10}}, {{"criterion": "is rude", "points": -5}}]"#
    )
    .unwrap();

    let rubrics = load_rubrics(rubrics.path()).unwrap();
    assert_eq!(rubrics[1].points, -5);
}

#[test]
fn test_malformed_dataset_names_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"[{{"prompts": [{{"role": "system", "content": "hi"}}]}}]"#).unwrap();

    let err = load_generation_dataset(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse dataset"));
}

#[test]
fn test_save_json_keeps_non_ascii_and_reloads() {
    let dir = tempdir().unwrap();
    let records = vec![EvaluationDatasetItem::new(
        Conversation::new(vec![PromptItem::user("東京の天気は?")]),
        vec![RubricItem::new("mentions the weather", 3)],
        "晴れです".to_string(),
    )];

    let path = save_json(&records, Some(&dir.path().join("out/eval.json")), dir.path()).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("東京の天気は?"));
    assert!(content.contains("\n  "));

    let reloaded = load_evaluation_dataset(&path).unwrap();
    assert_eq!(reloaded, records);
    assert_eq!(reloaded[0].prompts.turns()[0].role, Role::User);
}

#[test]
fn test_save_json_default_path_is_timestamped() {
    let dir = tempdir().unwrap();
    let path = save_json(&Vec::<RubricItem>::new(), None, &dir.path().join("data")).unwrap();

    assert!(path.starts_with(dir.path().join("data")));
    let stem = path.file_stem().unwrap().to_str().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(stem, "%Y-%m-%d-%H-%M-%S").is_ok());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[judge]
provider = "anthropic"
model = "claude-sonnet-4-5"
temperature = 0.2

[evaluation]
max_retries = 3

[data]
data_dir = "/tmp/rubriceval"
"#
    )
    .unwrap();

    let config = RubricEvalConfig::from_file(file.path()).unwrap();
    assert_eq!(config.judge.provider, Provider::Anthropic);
    assert_eq!(config.judge.temperature, Some(0.2));
    assert_eq!(config.evaluation.max_retries, 3);
    assert_eq!(config.data.data_dir.to_str(), Some("/tmp/rubriceval"));
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    assert!(RubricEvalConfig::from_file(dir.path().join("absent.toml")).is_err());

    let config = RubricEvalConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.judge.max_tokens, 8192);
}
