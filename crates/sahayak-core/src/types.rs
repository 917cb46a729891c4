use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback language when a profile does not name one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Role assumed for identities that do not carry one.
pub const DEFAULT_ROLE: &str = "teacher";

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn is_user(self) -> bool {
        matches!(self, Author::User)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Assistant => write!(f, "assistant"),
        }
    }
}

/// A signed-in user as reported by the auth gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl Identity {
    /// Name to greet the user with: display name, else the local part of the email.
    pub fn greeting_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Teacher profile data as stored by the backend.
///
/// Every field is optional on the wire; use the accessors for defaulted values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub classes: Vec<String>,
}

impl UserProfile {
    /// Preferred language, `"en"` when unset or blank.
    pub fn language(&self) -> &str {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Classes taught, in stored order. Empty when unknown.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Parse a profile from an untyped JSON document, ignoring unknown fields.
    ///
    /// Fields of the wrong type are treated as absent rather than failing the
    /// whole profile.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        let classes = value
            .get("classes")
            .and_then(serde_json::Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|c| c.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            display_name: text("display_name"),
            email: text("email"),
            language: text("language"),
            classes,
        }
    }
}
