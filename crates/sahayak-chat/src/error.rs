//! Error types for the chat crate.
//!
//! Answer-service failures never surface here; the session turns them into
//! chat messages. These errors cover misuse of the surrounding inputs.

/// Errors from chat input handling.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("voice error: {0}")]
    VoiceError(String),
    #[error("voice transcript is empty")]
    EmptyTranscript,
    #[error("recording exceeded the {limit_secs}s limit")]
    RecordingTooLong { limit_secs: u64 },
}
