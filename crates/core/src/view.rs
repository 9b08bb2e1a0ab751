//! Presentation layer: a rendering-agnostic [`View`] driven by a [`Controller`].

use crate::session::{SessionError, TranslationSession};
use crate::translate::{ChatBackend, FailureReason, TranslateError, Translation};

pub const WARNING_CHARS: usize = 600;
pub const OVER_CHARS: usize = 800;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text to translate.";
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Failed to translate. Please check if Ollama is running and try again.";
pub const BUSY_MESSAGE: &str = "A translation is already in progress.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountLevel {
    Normal,
    Warning,
    Over,
}

impl CountLevel {
    pub fn for_count(count: usize) -> Self {
        if count > OVER_CHARS {
            CountLevel::Over
        } else if count > WARNING_CHARS {
            CountLevel::Warning
        } else {
            CountLevel::Normal
        }
    }
}

pub fn message_for(err: &SessionError) -> &'static str {
    match err.reason() {
        None => BUSY_MESSAGE,
        Some(FailureReason::EmptyInput) => EMPTY_INPUT_MESSAGE,
        Some(FailureReason::TransportError) => TRANSPORT_FAILURE_MESSAGE,
    }
}

pub trait View {
    fn show_char_count(&mut self, count: usize, level: CountLevel);
    fn set_loading(&mut self, loading: bool);
    fn clear_response(&mut self);
    fn show_translation(&mut self, text: &str);
    fn show_error(&mut self, message: &str);
    fn show_copied(&mut self);
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard unavailable")]
    Unavailable,
    #[error("clipboard write failed: {0}")]
    Write(String),
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

pub struct Controller<B, V, C> {
    session: TranslationSession<B>,
    view: V,
    clipboard: C,
    displayed: Option<String>,
}

impl<B, V, C> Controller<B, V, C>
where
    B: ChatBackend,
    V: View,
    C: Clipboard,
{
    pub fn new(session: TranslationSession<B>, view: V, clipboard: C) -> Self {
        Self {
            session,
            view,
            clipboard,
            displayed: None,
        }
    }

    pub fn session(&self) -> &TranslationSession<B> {
        &self.session
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn displayed(&self) -> Option<&str> {
        self.displayed.as_deref()
    }

    pub fn on_input_change(&mut self, text: &str) {
        let count = text.chars().count();
        self.view.show_char_count(count, CountLevel::for_count(count));
    }

    pub async fn on_submit(&mut self, text: &str) -> Result<Translation, SessionError> {
        if text.trim().is_empty() {
            self.displayed = None;
            self.view.show_error(EMPTY_INPUT_MESSAGE);
            return Err(TranslateError::EmptyInput.into());
        }

        self.view.set_loading(true);
        self.view.clear_response();
        self.displayed = None;

        let outcome = self.session.submit(text).await;
        match &outcome {
            Ok(translation) => {
                self.view.show_translation(&translation.text);
                self.displayed = Some(translation.text.clone());
            }
            Err(e) => self.view.show_error(message_for(e)),
        }

        self.view.set_loading(false);
        outcome
    }

    /// Copies the displayed translation. `Ok(false)` when there is nothing to copy.
    pub fn on_copy(&mut self) -> Result<bool, ClipboardError> {
        let Some(text) = self.displayed.as_deref() else {
            return Ok(false);
        };
        if let Err(e) = self.clipboard.set_text(text) {
            tracing::warn!(error = %e, "failed to copy translation");
            return Err(e);
        }
        self.view.show_copied();
        Ok(true)
    }
}
