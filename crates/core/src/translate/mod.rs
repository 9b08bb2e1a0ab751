mod client;
mod ollama;

use crate::config::{EndpointConfig, ModelName, TargetLang, Temperature};
use crate::prompt::ChatMessage;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use client::TranslationClient;
#[cfg(test)]
pub(crate) use client::testing;
pub use ollama::OllamaBackend;

/// A validated unit of work: trimmed, non-empty source text plus its target language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationRequest {
    source_text: String,
    target_lang: TargetLang,
}

impl TranslationRequest {
    pub fn new(source_text: &str, target_lang: TargetLang) -> Result<Self, TranslateError> {
        let trimmed = source_text.trim();
        if trimmed.is_empty() {
            return Err(TranslateError::EmptyInput);
        }
        Ok(Self {
            source_text: trimmed.to_owned(),
            target_lang,
        })
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn target_lang(&self) -> &TargetLang {
        &self.target_lang
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
}

pub type TranslationResult = Result<Translation, TranslateError>;

/// Coarse failure reason exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    EmptyInput,
    TransportError,
}

#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    #[error("input text must not be empty")]
    EmptyInput,

    #[error("translation service unreachable: {0}")]
    Transport(#[from] TransportError),
}

impl TranslateError {
    pub fn reason(&self) -> FailureReason {
        match self {
            TranslateError::EmptyInput => FailureReason::EmptyInput,
            TranslateError::Transport(_) => FailureReason::TransportError,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("http error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Network(_) => "network",
            TransportError::Status { .. } => "status",
            TransportError::InvalidResponse(_) => "invalid_response",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelSettings {
    pub model: ModelName,
    pub temperature: Temperature,
}

impl From<&EndpointConfig> for ModelSettings {
    fn from(endpoint: &EndpointConfig) -> Self {
        Self {
            model: endpoint.model.clone(),
            temperature: endpoint.temperature,
        }
    }
}

/// One chat-completion call: ordered messages for a named model.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub model: ModelName,
    pub messages: Vec<ChatMessage>,
    pub temperature: Temperature,
}

/// Transport seam for chat-completion endpoints. Returns the assistant's text content.
pub trait ChatBackend: Send + Sync {
    fn complete(&self, request: ChatRequest) -> BoxFuture<'_, Result<String, TransportError>>;
}
