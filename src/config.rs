use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Medivox";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_COMPLETION_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_COMPLETION_MODEL: &str = "tencent/hunyuan-a13b-instruct:free";
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_VOICE_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Get the application data directory (~/Medivox/).
///
/// Falls back to the working directory when no home directory can be
/// determined (containers without $HOME).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the consultation database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("medivox.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "medivox_lib=debug,medivox=debug,tower_http=info"
    } else {
        "medivox_lib=info,medivox=info,tower_http=warn"
    }
}

/// Completion service settings (OpenAI-compatible chat completions endpoint).
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_COMPLETION_TIMEOUT_SECS),
        }
    }
}

/// Settings handed to the voice backend when a call starts.
///
/// Provider names are opaque to this crate; they are forwarded verbatim.
#[derive(Debug, Clone)]
pub struct VoiceCallConfig {
    pub assistant_name: String,
    pub first_message: String,
    pub transcriber_provider: String,
    pub transcriber_language: String,
    pub voice_provider: String,
    pub model_provider: String,
    pub model: String,
    pub connect_timeout: Duration,
}

impl Default for VoiceCallConfig {
    fn default() -> Self {
        Self {
            assistant_name: "AI Medical Doctor Voice Agent".to_string(),
            first_message:
                "Hello, Thank You for connecting, Can you please tell me your full name and age"
                    .to_string(),
            transcriber_provider: "assembly-ai".to_string(),
            transcriber_language: "en".to_string(),
            voice_provider: "playht".to_string(),
            model_provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_VOICE_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Voice backend bridge location.
#[derive(Debug, Clone, Default)]
pub struct VoiceBackendConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

/// Full runtime configuration, resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub completion: CompletionConfig,
    pub voice_backend: VoiceBackendConfig,
    pub voice_call: VoiceCallConfig,
}

impl AppConfig {
    /// Read configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (testable without touching the env).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = non_empty("MEDIVOX_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(database_path);

        let bind_addr = match non_empty("MEDIVOX_BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(value = %raw, error = %e, "Invalid MEDIVOX_BIND_ADDR, using default");
                default_bind_addr()
            }),
            None => default_bind_addr(),
        };

        let completion = CompletionConfig {
            base_url: non_empty("COMPLETION_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string()),
            api_key: non_empty("COMPLETION_API_KEY"),
            model: non_empty("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            timeout: Duration::from_secs(parse_secs(
                "COMPLETION_TIMEOUT_SECS",
                non_empty("COMPLETION_TIMEOUT_SECS"),
                DEFAULT_COMPLETION_TIMEOUT_SECS,
            )),
        };

        let voice_backend = VoiceBackendConfig {
            url: non_empty("VOICE_BACKEND_URL"),
            api_key: non_empty("VOICE_API_KEY"),
        };

        let voice_call = VoiceCallConfig {
            connect_timeout: Duration::from_secs(parse_secs(
                "VOICE_CONNECT_TIMEOUT_SECS",
                non_empty("VOICE_CONNECT_TIMEOUT_SECS"),
                DEFAULT_VOICE_CONNECT_TIMEOUT_SECS,
            )),
            ..VoiceCallConfig::default()
        };

        Self {
            db_path,
            bind_addr,
            completion,
            voice_backend,
            voice_call,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
}

fn parse_secs(key: &str, raw: Option<String>, default: u64) -> u64 {
    match raw {
        Some(v) => match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                tracing::warn!(key, value = %v, default, "Invalid duration, using default");
                default
            }
        },
        None => default,
    }
}
