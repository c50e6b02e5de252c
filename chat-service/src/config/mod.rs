use service_core::config as core_config;
use service_core::config::Environment;
use service_core::error::AppError;
use std::env;

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOP_K: usize = 4;
const DEFAULT_RATE_LIMIT_PER_MIN: u32 = 60;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub provider: ProviderKind,
    pub gemini: GeminiSettings,
    pub openai: OpenAiSettings,
    pub retrieval: RetrievalConfig,
    pub assets: AssetsConfig,
    pub rate_limit_per_min: u32,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Absent outside production when the env var is unset; the chat
    /// handler reports the missing key per request instead.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Maximum number of context snippets attached to a prompt.
    pub top_k: usize,
}

#[derive(Debug, Clone)]
pub struct AssetsConfig {
    /// Directory holding the map page, `places.json` and the service worker.
    pub static_dir: String,
}

/// Which upstream the chat pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Mock,
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let environment = Environment::detect();
        let is_prod = environment.is_prod();

        let provider = match get_env("CHAT_PROVIDER", Some("gemini"), is_prod)?.as_str() {
            "gemini" => ProviderKind::Gemini,
            "openai" => ProviderKind::OpenAi,
            "mock" => ProviderKind::Mock,
            other => {
                return Err(AppError::ConfigError(format!(
                    "CHAT_PROVIDER must be one of gemini, openai, mock (got '{}')",
                    other
                )))
            }
        };

        let gemini = GeminiSettings {
            api_key: get_optional_env("GEMINI_API_KEY"),
            model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), is_prod)?,
            api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
            timeout_secs: get_env(
                "GEMINI_TIMEOUT_SECS",
                Some(&DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string()),
                is_prod,
            )?
            .parse()
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };

        let openai = OpenAiSettings {
            api_key: get_optional_env("OPENAI_API_KEY"),
            model: get_env("OPENAI_MODEL", Some(DEFAULT_OPENAI_MODEL), is_prod)?,
            api_base: get_env("OPENAI_API_BASE", Some(DEFAULT_OPENAI_API_BASE), is_prod)?,
            timeout_secs: get_env(
                "OPENAI_TIMEOUT_SECS",
                Some(&DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string()),
                is_prod,
            )?
            .parse()
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };

        // A production deployment without the selected provider's key is
        // dead on arrival; fail startup rather than every request.
        if is_prod {
            match provider {
                ProviderKind::Gemini if gemini.api_key.is_none() => {
                    return Err(AppError::ConfigError(
                        "GEMINI_API_KEY is required in production but not set".to_string(),
                    ))
                }
                ProviderKind::OpenAi if openai.api_key.is_none() => {
                    return Err(AppError::ConfigError(
                        "OPENAI_API_KEY is required in production but not set".to_string(),
                    ))
                }
                _ => {}
            }
        }

        let retrieval = RetrievalConfig {
            top_k: get_env("RETRIEVAL_TOP_K", Some(&DEFAULT_TOP_K.to_string()), is_prod)?
                .parse()
                .unwrap_or(DEFAULT_TOP_K),
        };

        let assets = AssetsConfig {
            static_dir: get_env("STATIC_DIR", Some("chat-service/public"), is_prod)?,
        };

        let rate_limit_per_min = get_env(
            "RATE_LIMIT_PER_MIN",
            Some(&DEFAULT_RATE_LIMIT_PER_MIN.to_string()),
            is_prod,
        )?
        .parse()
        .unwrap_or(DEFAULT_RATE_LIMIT_PER_MIN);

        Ok(ChatConfig {
            common,
            environment,
            provider,
            gemini,
            openai,
            retrieval,
            assets,
            rate_limit_per_min,
        })
    }

    /// Path of the places dataset inside the static directory.
    pub fn dataset_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.assets.static_dir).join("places.json")
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(format!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(format!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
