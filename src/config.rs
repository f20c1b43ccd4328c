use crate::summarization::PromptProfile;
use std::env;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OCR_LANGUAGE: &str = "tur";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarization service.
pub struct Config {
    /// Bearer credential for the chat-completion provider.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API (without the `/chat/completions` suffix).
    pub openai_base_url: String,
    /// Chat model identifier sent with every completion request.
    pub openai_model: String,
    /// Optional request timeout for the completion call, in milliseconds.
    pub openai_timeout_ms: Option<u64>,
    /// Prompt profile used when a request does not select one.
    pub default_profile: PromptProfile,
    /// Transport options for downloading shared files.
    pub fetch: FetchConfig,
    /// Language hint passed to the OCR engine.
    pub ocr_language: String,
    /// Path or name of the `tesseract` executable.
    pub tesseract_bin: String,
    /// Path or name of the `pdftoppm` executable.
    pub pdftoppm_bin: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Transport options applied to the remote file fetcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchConfig {
    /// Whole-request timeout in milliseconds; `None` leaves the transport without a timeout.
    pub timeout_ms: Option<u64>,
    /// Follow HTTP redirects using the transport's default policy.
    pub follow_redirects: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            follow_redirects: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            openai_api_key: load_env("OPENAI_API_KEY")?,
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: load_env_optional("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_timeout_ms: parse_optional("OPENAI_TIMEOUT_MS")?,
            default_profile: load_env_optional("SUMMARY_DEFAULT_PROFILE")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("SUMMARY_DEFAULT_PROFILE".to_string())
                    })
                })
                .transpose()?
                .unwrap_or_default(),
            fetch: FetchConfig {
                timeout_ms: parse_optional("FETCH_TIMEOUT_MS")?,
                follow_redirects: load_env_optional("FETCH_FOLLOW_REDIRECTS")
                    .map(|value| {
                        parse_bool(&value).ok_or_else(|| {
                            ConfigError::InvalidValue("FETCH_FOLLOW_REDIRECTS".to_string())
                        })
                    })
                    .transpose()?
                    .unwrap_or(true),
            },
            ocr_language: load_env_optional("OCR_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_OCR_LANGUAGE.to_string()),
            tesseract_bin: load_env_optional("TESSERACT_BIN")
                .unwrap_or_else(|| "tesseract".to_string()),
            pdftoppm_bin: load_env_optional("PDFTOPPM_BIN")
                .unwrap_or_else(|| "pdftoppm".to_string()),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

// Omits the API key.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("has_openai_api_key", &!self.openai_api_key.is_empty())
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("openai_timeout_ms", &self.openai_timeout_ms)
            .field("default_profile", &self.default_profile)
            .field("fetch", &self.fetch)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_bin", &self.tesseract_bin)
            .field("pdftoppm_bin", &self.pdftoppm_bin)
            .field("server_port", &self.server_port)
            .finish()
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        openai_base_url = %config.openai_base_url,
        openai_model = %config.openai_model,
        default_profile = ?config.default_profile,
        fetch = ?config.fetch,
        ocr_language = %config.ocr_language,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
