use crate::config::TargetLang;
use serde::{Deserialize, Serialize};

pub const SYSTEM_TEMPLATE: &str = "Translate the following from English into {language}";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

pub fn system_instruction(target: &TargetLang) -> String {
    SYSTEM_TEMPLATE.replace("{language}", target.as_str())
}

/// Builds the system + user pair. The source text is passed through as-is.
pub fn translation_messages(source_text: &str, target: &TargetLang) -> [ChatMessage; 2] {
    [
        ChatMessage::system(system_instruction(target)),
        ChatMessage::user(source_text),
    ]
}
