use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_TARGET_LANG: &str = "hindi";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const ENV_BASE_URL: &str = "OLLAMA_TRANSLATE_BASE_URL";
pub const ENV_MODEL: &str = "OLLAMA_TRANSLATE_MODEL";
pub const ENV_TARGET_LANG: &str = "OLLAMA_TRANSLATE_TARGET_LANG";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetLang(pub String);

impl TargetLang {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyTargetLang);
        }
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TargetLang {
    fn default() -> Self {
        Self(DEFAULT_TARGET_LANG.to_owned())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelName(String);

impl ModelName {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelName {
    fn default() -> Self {
        Self(DEFAULT_MODEL.to_owned())
    }
}

/// Sampling temperature forwarded to the model. Zero keeps output deterministic.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Temperature(f32);

impl Temperature {
    pub fn new(value: f32) -> Result<Self, ConfigError> {
        if !value.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&value) {
            return Err(ConfigError::TemperatureOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self(DEFAULT_TEMPERATURE)
    }
}

pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_owned())),
    }
}

pub fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url is valid")
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    pub base_url: Url,
    pub model: ModelName,
    pub temperature: Temperature,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: ModelName::default(),
            temperature: Temperature::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    pub target_lang: TargetLang,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("target language must not be empty")]
    EmptyTargetLang,
    #[error("model name must not be empty")]
    EmptyModel,
    #[error("temperature must be within 0.0..=2.0, got {0}")]
    TemperatureOutOfRange(f32),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("base url scheme must be http or https, got {0}")]
    UnsupportedScheme(String),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

pub fn resolve_base_url(
    cli_value: Option<String>,
    env: &impl Env,
) -> Result<Url, ConfigError> {
    let raw = resolve_string_with_default(cli_value, ENV_BASE_URL, env, DEFAULT_BASE_URL);
    parse_base_url(&raw)
}

pub fn resolve_model(cli_value: Option<String>, env: &impl Env) -> Result<ModelName, ConfigError> {
    ModelName::new(resolve_string_with_default(
        cli_value,
        ENV_MODEL,
        env,
        DEFAULT_MODEL,
    ))
}

pub fn resolve_target_lang(
    cli_value: Option<String>,
    env: &impl Env,
) -> Result<TargetLang, ConfigError> {
    TargetLang::new(resolve_string_with_default(
        cli_value,
        ENV_TARGET_LANG,
        env,
        DEFAULT_TARGET_LANG,
    ))
}
