use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SahayakError};
use crate::types::UserProfile;

/// Greeting that seeds every fresh chat log.
pub const DEFAULT_WELCOME_TEXT: &str =
    "Hello! I'm Sahayak, your AI teaching assistant. Ask me anything about lesson planning, \
     explaining a concept, or activities for your classroom.";

/// Shown when the answer service could not be reached or failed.
pub const DEFAULT_ERROR_TEXT: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Shown when the service answered but no known content field was present.
pub const DEFAULT_FALLBACK_TEXT: &str =
    "I apologize, but I couldn't generate a proper response.";

pub const DEFAULT_ASSISTANT_AVATAR: &str = "🤖";
pub const DEFAULT_ERROR_AVATAR: &str = "⚠️";

/// Top-level configuration for Sahayak.
///
/// Loaded from `~/.sahayak/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SahayakConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl SahayakConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SahayakConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SahayakError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Backend API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the content-generation backend, without trailing slash.
    pub base_url: String,
    /// Whole-request timeout in seconds. Generation can be slow.
    pub request_timeout_secs: u64,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Bearer token sent with every request, if set.
    pub api_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            api_token: None,
        }
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Language tag sent with every question.
    pub language: String,
    /// Caller role tag placed in the request context.
    pub user_role: String,
    /// Context tag describing where the caller teaches.
    pub context_type: String,
    pub welcome_text: String,
    pub error_text: String,
    pub fallback_text: String,
    pub assistant_avatar: String,
    pub error_avatar: String,
    /// Capacity of the chat event broadcast channel.
    pub event_capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            user_role: "teacher".to_string(),
            context_type: "classroom".to_string(),
            welcome_text: DEFAULT_WELCOME_TEXT.to_string(),
            error_text: DEFAULT_ERROR_TEXT.to_string(),
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
            assistant_avatar: DEFAULT_ASSISTANT_AVATAR.to_string(),
            error_avatar: DEFAULT_ERROR_AVATAR.to_string(),
            event_capacity: 64,
        }
    }
}

/// How the application decides who is signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Accept only the built-in demo credential.
    Mock,
    /// Nobody is ever signed in.
    Disabled,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Sign the demo account in at startup (mock mode only).
    pub auto_sign_in: bool,
    /// Profile reported for the demo account.
    pub demo_profile: UserProfile,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Mock,
            auto_sign_in: false,
            demo_profile: UserProfile::default(),
        }
    }
}
