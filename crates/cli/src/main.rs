#![deny(warnings)]

mod terminal;

use anyhow::Context;
use clap::Parser;
use ollama_translator_core::config::{
    resolve_base_url, resolve_model, resolve_target_lang, AppConfig, EndpointConfig, StdEnv,
    Temperature, DEFAULT_TEMPERATURE,
};
use ollama_translator_core::session::TranslationSession;
use ollama_translator_core::translate::{
    ChatBackend, ModelSettings, OllamaBackend, TranslationClient,
};
use ollama_translator_core::view::{Clipboard, Controller, View};
use std::borrow::Cow;
use std::process::ExitCode;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalView;

const COPY_COMMAND: &str = ":copy";
const QUIT_COMMAND: &str = ":quit";

#[derive(Parser, Debug)]
#[command(name = "ollama-translate")]
#[command(about = "Translate English text with a local Ollama model")]
struct Args {
    /// Text to translate. Read from stdin when omitted.
    #[arg(long, conflicts_with = "interactive")]
    text: Option<String>,

    /// Translate stdin line by line until `:quit` or EOF.
    #[arg(long)]
    interactive: bool,

    /// Falls back to OLLAMA_TRANSLATE_TARGET_LANG, then "hindi".
    #[arg(long)]
    target_lang: Option<String>,

    /// Falls back to OLLAMA_TRANSLATE_BASE_URL, then http://127.0.0.1:11434.
    #[arg(long)]
    base_url: Option<String>,

    /// Falls back to OLLAMA_TRANSLATE_MODEL, then "llama3.2".
    #[arg(long)]
    model: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Copy the translation to the system clipboard.
    #[arg(long)]
    copy: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let cfg = build_config(&args, &env)?;

    tracing::info!(
        base_url = %cfg.endpoint.base_url,
        model = %cfg.endpoint.model.as_str(),
        target_lang = %cfg.target_lang.as_str(),
        "config loaded"
    );

    let backend = OllamaBackend::from_config(&cfg.endpoint)?;
    let client = TranslationClient::new(backend, ModelSettings::from(&cfg.endpoint));
    let session = TranslationSession::new(client, cfg.target_lang.clone());
    let mut controller = Controller::new(session, TerminalView::stdout(), system_clipboard());

    if args.interactive {
        run_interactive(&mut controller, BufReader::new(tokio::io::stdin())).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let translated = run_once(&mut controller, args.text, tokio::io::stdin(), args.copy).await?;
    Ok(if translated {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Translates `text`, or everything readable from `input` when `text` is absent.
///
/// Returns `false` when the translation failed. The view has already shown the
/// user-facing message by then, so the failure carries no further detail.
async fn run_once<B, V, C, R>(
    controller: &mut Controller<B, V, C>,
    text: Option<String>,
    mut input: R,
    copy: bool,
) -> anyhow::Result<bool>
where
    B: ChatBackend,
    V: View,
    C: Clipboard,
    R: AsyncRead + Unpin,
{
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = Vec::new();
            input
                .read_to_end(&mut buf)
                .await
                .context("failed to read text from stdin")?;
            String::from_utf8_lossy(&buf).into_owned()
        }
    };

    controller.on_input_change(&text);
    if controller.on_submit(&text).await.is_err() {
        return Ok(false);
    }

    if copy {
        controller.on_copy().context("failed to copy translation")?;
    }
    Ok(true)
}

async fn run_interactive<B, V, C, R>(
    controller: &mut Controller<B, V, C>,
    mut input: R,
) -> anyhow::Result<()>
where
    B: ChatBackend,
    V: View,
    C: Clipboard,
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .await
            .context("failed to read stdin")?;
        if read == 0 {
            break;
        }

        let decoded = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = decoded {
            tracing::warn!("input line is not valid UTF-8; invalid bytes replaced");
        }
        let line = decoded.trim_end_matches(['\r', '\n']);

        match line.trim() {
            QUIT_COMMAND => break,
            COPY_COMMAND => {
                if let Ok(false) = controller.on_copy() {
                    tracing::info!("nothing to copy yet");
                }
            }
            _ => {
                controller.on_input_change(line);
                // Failures are already rendered; keep reading.
                let _ = controller.on_submit(line).await;
            }
        }
    }
    Ok(())
}

#[cfg(feature = "clipboard")]
fn system_clipboard() -> terminal::SystemClipboard {
    terminal::SystemClipboard
}

#[cfg(not(feature = "clipboard"))]
fn system_clipboard() -> ollama_translator_core::view::NoClipboard {
    ollama_translator_core::view::NoClipboard
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_config(
    args: &Args,
    env: &impl ollama_translator_core::config::Env,
) -> anyhow::Result<AppConfig> {
    let endpoint = EndpointConfig {
        base_url: resolve_base_url(args.base_url.clone(), env)?,
        model: resolve_model(args.model.clone(), env)?,
        temperature: Temperature::new(args.temperature)?,
    };
    let target_lang = resolve_target_lang(args.target_lang.clone(), env)?;

    Ok(AppConfig {
        endpoint,
        target_lang,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::testing::SharedBuf;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use ollama_translator_core::config::{parse_base_url, MapEnv, TargetLang, ENV_MODEL};
    use ollama_translator_core::translate::{ChatRequest, TransportError};
    use ollama_translator_core::view::{
        ClipboardError, NoClipboard, EMPTY_INPUT_MESSAGE, TRANSPORT_FAILURE_MESSAGE,
    };
    use std::sync::{Arc, Mutex};

    /// Echoes the user message back in upper case; fails on "fail".
    #[derive(Clone, Default)]
    struct UppercaseBackend {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl UppercaseBackend {
        fn seen(&self) -> Vec<String> {
            self.seen.lock().expect("lock").clone()
        }
    }

    impl ChatBackend for UppercaseBackend {
        fn complete(&self, request: ChatRequest) -> BoxFuture<'_, Result<String, TransportError>> {
            let text = request.messages[1].content.clone();
            self.seen.lock().expect("lock").push(text.clone());
            async move {
                if text == "fail" {
                    Err(TransportError::InvalidResponse("scripted failure".into()))
                } else {
                    Ok(text.to_uppercase())
                }
            }
            .boxed()
        }
    }

    #[derive(Clone, Default)]
    struct MemoryClipboard(Arc<Mutex<Option<String>>>);

    impl Clipboard for MemoryClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            *self.0.lock().expect("lock") = Some(text.to_owned());
            Ok(())
        }
    }

    fn controller<B: ChatBackend, C: Clipboard>(
        backend: B,
        clipboard: C,
    ) -> (Controller<B, TerminalView, C>, SharedBuf, SharedBuf) {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let view = TerminalView::new(Box::new(out.clone()), Box::new(err.clone()));
        let session = TranslationSession::new(
            TranslationClient::new(backend, ModelSettings::default()),
            TargetLang::default(),
        );
        (Controller::new(session, view, clipboard), out, err)
    }

    #[test]
    fn build_config_defaults() {
        let args = Args::parse_from(["ollama-translate", "--text", "hi"]);
        let cfg = build_config(&args, &MapEnv::default()).expect("valid config");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn build_config_reads_model_from_env() {
        let args = Args::parse_from(["ollama-translate"]);
        let env = MapEnv::default().with_var(ENV_MODEL, "mistral");
        let cfg = build_config(&args, &env).expect("valid config");
        assert_eq!(cfg.endpoint.model.as_str(), "mistral");
    }

    #[test]
    fn build_config_rejects_out_of_range_temperature() {
        let args = Args::parse_from(["ollama-translate", "--temperature", "3.5"]);
        assert!(build_config(&args, &MapEnv::default()).is_err());
    }

    #[test]
    fn text_conflicts_with_interactive() {
        let parsed = Args::try_parse_from(["ollama-translate", "--text", "hi", "--interactive"]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn once_prints_translation_from_stdin() {
        let (mut c, out, _err) = controller(UppercaseBackend::default(), NoClipboard);
        let ok = run_once(&mut c, None, &b"hello there\n"[..], false)
            .await
            .expect("runs");
        assert!(ok);
        assert_eq!(out.contents(), "HELLO THERE\n");
    }

    #[tokio::test]
    async fn once_refused_connection_shows_only_generic_message() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind port");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        let base_url = parse_base_url(&format!("http://{addr}")).expect("valid url");
        let backend = OllamaBackend::new(&base_url).expect("backend");

        let (mut c, out, err) = controller(backend, NoClipboard);
        let ok = run_once(&mut c, Some("Hello".to_owned()), tokio::io::empty(), false)
            .await
            .expect("runs");

        assert!(!ok);
        assert!(out.contents().is_empty());
        assert_eq!(
            err.contents(),
            format!("Translating...\nerror: {TRANSPORT_FAILURE_MESSAGE}\n")
        );
    }

    #[tokio::test]
    async fn once_blank_input_reports_once_and_fails() {
        let backend = UppercaseBackend::default();
        let (mut c, out, err) = controller(backend.clone(), NoClipboard);
        let ok = run_once(&mut c, Some("   ".to_owned()), tokio::io::empty(), false)
            .await
            .expect("runs");

        assert!(!ok);
        assert!(out.contents().is_empty());
        assert_eq!(err.contents(), format!("error: {EMPTY_INPUT_MESSAGE}\n"));
        assert!(backend.seen().is_empty());
    }

    #[tokio::test]
    async fn once_copies_when_asked() {
        let clipboard = MemoryClipboard::default();
        let (mut c, _out, _err) = controller(UppercaseBackend::default(), clipboard.clone());
        run_once(&mut c, Some("hi".to_owned()), tokio::io::empty(), true)
            .await
            .expect("runs");
        assert_eq!(clipboard.0.lock().expect("lock").as_deref(), Some("HI"));
    }

    #[tokio::test]
    async fn interactive_keeps_going_after_failures_and_bad_bytes() {
        let backend = UppercaseBackend::default();
        let (mut c, out, err) = controller(backend.clone(), NoClipboard);
        let input: &[u8] = b"hi\nfail\n\xff\xfe\nmore\n";

        run_interactive(&mut c, input).await.expect("runs");

        assert_eq!(backend.seen(), vec!["hi", "fail", "\u{fffd}\u{fffd}", "more"]);
        assert_eq!(out.contents(), "HI\n\u{fffd}\u{fffd}\nMORE\n");
        assert!(err
            .contents()
            .contains(&format!("error: {TRANSPORT_FAILURE_MESSAGE}\n")));
    }

    #[tokio::test]
    async fn interactive_copy_and_quit_commands() {
        let backend = UppercaseBackend::default();
        let clipboard = MemoryClipboard::default();
        let (mut c, _out, err) = controller(backend.clone(), clipboard.clone());
        let input: &[u8] = b":copy\nhola\r\n:copy\n:quit\nignored\n";

        run_interactive(&mut c, input).await.expect("runs");

        assert_eq!(backend.seen(), vec!["hola"]);
        assert_eq!(clipboard.0.lock().expect("lock").as_deref(), Some("HOLA"));
        assert!(err.contents().ends_with("Copied!\n"));
    }
}
