use crate::config::{ConfigError, EndpointConfig};
use crate::prompt::ChatMessage;
use crate::translate::{ChatBackend, ChatRequest, TransportError};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

const CHAT_PATH: [&str; 2] = ["api", "chat"];

/// Chat backend for an Ollama server's `/api/chat` endpoint.
#[derive(Clone, Debug)]
pub struct OllamaBackend {
    client: Client,
    chat_url: Url,
}

impl OllamaBackend {
    pub fn new(base_url: &Url) -> Result<Self, ConfigError> {
        let mut chat_url = base_url.clone();
        chat_url.set_query(None);
        chat_url.set_fragment(None);
        chat_url
            .path_segments_mut()
            .map_err(|()| ConfigError::InvalidBaseUrl(format!("{base_url} cannot be a base")))?
            .pop_if_empty()
            .extend(CHAT_PATH);
        Ok(Self {
            client: Client::new(),
            chat_url,
        })
    }

    pub fn from_config(endpoint: &EndpointConfig) -> Result<Self, ConfigError> {
        Self::new(&endpoint.base_url)
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

impl ChatBackend for OllamaBackend {
    fn complete(&self, request: ChatRequest) -> BoxFuture<'_, Result<String, TransportError>> {
        async move {
            let body = OllamaChatRequest {
                model: request.model.as_str(),
                messages: &request.messages,
                stream: false,
                options: OllamaOptions {
                    temperature: request.temperature.value(),
                },
            };

            let response = self
                .client
                .post(self.chat_url.clone())
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let raw = response.text().await?;
            let parsed: OllamaChatResponse = serde_json::from_str(&raw).map_err(|e| {
                TransportError::InvalidResponse(format!("Failed to parse JSON: {e}"))
            })?;

            Ok(parsed.message.content)
        }
        .boxed()
    }
}
