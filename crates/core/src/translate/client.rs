use crate::config::TargetLang;
use crate::prompt::translation_messages;
use crate::translate::{
    ChatBackend, ChatRequest, ModelSettings, TranslateError, Translation, TranslationRequest,
    TranslationResult,
};

/// Turns source text into a translation with a single chat-completion call.
///
/// The client holds no per-call state: every call builds a fresh prompt and
/// performs exactly one backend request, with no retry and no caching.
/// Serializing calls is the caller's job (see [`crate::session`]).
#[derive(Clone, Debug)]
pub struct TranslationClient<B> {
    backend: B,
    settings: ModelSettings,
}

impl<B: ChatBackend> TranslationClient<B> {
    pub fn new(backend: B, settings: ModelSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates `source_text` and translates it into `target`.
    ///
    /// Blank input fails with [`TranslateError::EmptyInput`] before any I/O.
    pub async fn translate(&self, source_text: &str, target: &TargetLang) -> TranslationResult {
        let request = TranslationRequest::new(source_text, target.clone())?;
        self.execute(request).await
    }

    pub async fn execute(&self, request: TranslationRequest) -> TranslationResult {
        let chat = ChatRequest {
            model: self.settings.model.clone(),
            messages: translation_messages(request.source_text(), request.target_lang()).to_vec(),
            temperature: self.settings.temperature,
        };

        tracing::debug!(
            model = %self.settings.model.as_str(),
            target_lang = %request.target_lang().as_str(),
            chars = request.source_text().chars().count(),
            "sending translation request"
        );

        match self.backend.complete(chat).await {
            Ok(text) => {
                tracing::info!(
                    target_lang = %request.target_lang().as_str(),
                    chars = text.chars().count(),
                    "translation completed"
                );
                Ok(Translation { text })
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "translation request failed");
                Err(TranslateError::Transport(e))
            }
        }
    }
}
