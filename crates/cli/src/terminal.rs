use ollama_translator_core::view::{CountLevel, View, OVER_CHARS, WARNING_CHARS};
use std::fmt;
use std::io::{self, Write};

/// Renders translations on stdout and everything else on stderr, so the
/// translation can be piped.
pub struct TerminalView {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self { out, err }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }
}

fn emit(w: &mut dyn Write, args: fmt::Arguments<'_>) {
    if let Err(e) = w.write_fmt(args).and_then(|()| w.flush()) {
        tracing::debug!(error = %e, "terminal write failed");
    }
}

impl View for TerminalView {
    fn show_char_count(&mut self, count: usize, level: CountLevel) {
        match level {
            CountLevel::Normal => {}
            CountLevel::Warning => emit(
                &mut *self.err,
                format_args!("note: {count} characters (over {WARNING_CHARS})\n"),
            ),
            CountLevel::Over => emit(
                &mut *self.err,
                format_args!("warning: {count} characters (over {OVER_CHARS})\n"),
            ),
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            emit(&mut *self.err, format_args!("Translating...\n"));
        }
    }

    fn clear_response(&mut self) {}

    fn show_translation(&mut self, text: &str) {
        emit(&mut *self.out, format_args!("{text}\n"));
    }

    fn show_error(&mut self, message: &str) {
        emit(&mut *self.err, format_args!("error: {message}\n"));
    }

    fn show_copied(&mut self) {
        emit(&mut *self.err, format_args!("Copied!\n"));
    }
}

#[cfg(feature = "clipboard")]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl ollama_translator_core::view::Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ollama_translator_core::view::ClipboardError> {
        use cli_clipboard::{ClipboardContext, ClipboardProvider};

        ClipboardContext::new()
            .and_then(|mut ctx| ctx.set_contents(text.to_owned()))
            .map_err(|e| ollama_translator_core::view::ClipboardError::Write(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    /// In-memory writer whose clones share one buffer.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).expect("utf-8")
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
