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

//! Conversations fed to the generator and the judge

use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptItem {
    pub role: Role,
    pub content: String,
}

impl PromptItem {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chronologically ordered turns. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<PromptItem>,
}

impl Conversation {
    pub fn new(turns: Vec<PromptItem>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[PromptItem] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the conversation as the flat transcript shown to the judge.
    ///
    /// Every turn becomes a `"{role}: {content}"` line and the response under
    /// evaluation is appended as a final assistant line.
    pub fn render_transcript(&self, response_text: &str) -> String {
        let mut transcript = String::new();
        for turn in &self.turns {
            transcript.push_str(&format!("{}: {}\n", turn.role, turn.content));
        }
        transcript.push_str(&format!("{}: {}", Role::Assistant, response_text));
        transcript
    }
}

impl From<Vec<PromptItem>> for Conversation {
    fn from(turns: Vec<PromptItem>) -> Self {
        Self::new(turns)
    }
}

impl FromIterator<PromptItem> for Conversation {
    fn from_iter<I: IntoIterator<Item = PromptItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_transcript_appends_response() {
        let conversation = Conversation::new(vec![
            PromptItem::user("Hi"),
            PromptItem::assistant("Hello!"),
            PromptItem::user("What is 2+2?"),
        ]);

        assert_eq!(
            conversation.render_transcript("4"),
            "user: Hi\nassistant: Hello!\nuser: What is 2+2?\nassistant: 4"
        );
    }

    #[test]
    fn test_render_empty_conversation() {
        let conversation = Conversation::default();
        assert_eq!(conversation.render_transcript("Y"), "assistant: Y");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&PromptItem::user("X?")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"X?"}"#);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let parsed: Result<PromptItem, _> =
            serde_json::from_str(r#"{"role":"system","content":"be nice"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_conversation_is_plain_array() {
        let conversation: Conversation =
            serde_json::from_str(r#"[{"role":"user","content":"X?"}]"#).unwrap();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.turns()[0].role, Role::User);
    }
}
