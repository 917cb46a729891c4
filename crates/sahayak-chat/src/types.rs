//! Chat log and event types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use sahayak_client::FailureKind;
use sahayak_core::Author;

/// What a message represents in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The greeting that opens every log.
    Welcome,
    /// Text the user submitted.
    Question,
    /// Content produced by the answer service (or its fallback).
    Answer,
    /// Stand-in for an answer when the service call failed.
    Error,
}

/// One entry of the chat log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: Uuid,
    /// Position in the session, monotonically increasing across resets.
    pub seq: u64,
    pub text: String,
    pub author: Author,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
    /// Display glyph. Assistant messages only.
    pub avatar: Option<String>,
    /// Opaque metadata from the answer service, passed through untouched.
    pub metadata: Option<Value>,
}

impl Message {
    pub fn user(seq: u64, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq,
            text: text.into(),
            author: Author::User,
            kind: MessageKind::Question,
            created_at: Utc::now(),
            avatar: None,
            metadata: None,
        }
    }

    pub fn assistant(
        seq: u64,
        kind: MessageKind,
        text: impl Into<String>,
        avatar: impl Into<String>,
        metadata: Option<Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq,
            text: text.into(),
            author: Author::Assistant,
            kind,
            created_at: Utc::now(),
            avatar: Some(avatar.into()),
            metadata,
        }
    }

    pub fn is_user(&self) -> bool {
        self.author.is_user()
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

/// Point-in-time copy of a session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub pending: bool,
    pub generation: u64,
}

/// Side-channel notifications. Nothing here reaches the message log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A request was issued for the given log generation.
    RequestIssued { generation: u64 },
    /// An answer (or fallback) was appended.
    AnswerAppended { generation: u64, message_id: Uuid },
    /// The answer service failed; an error message was appended instead.
    RequestFailed {
        generation: u64,
        kind: FailureKind,
        detail: String,
    },
    /// A response arrived for a log that has since been cleared.
    StaleResponseDiscarded {
        issued_generation: u64,
        current_generation: u64,
    },
    /// The log was reset and reseeded.
    Cleared { generation: u64 },
}
