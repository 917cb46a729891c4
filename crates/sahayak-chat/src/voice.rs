//! Voice input state for the chat screen.
//!
//! Speech recognition itself happens outside this crate. This tracks whether
//! the microphone is open and validates the transcript the recogniser hands
//! back before it is submitted as a chat message.

use std::time::{Duration, Instant};

use crate::error::ChatError;

/// Whether the microphone is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Listening,
}

/// Listening state plus the recording time limit.
#[derive(Debug)]
pub struct VoiceInput {
    state: VoiceState,
    started_at: Option<Instant>,
    /// Longest recording accepted.
    pub max_duration: Duration,
}

impl Default for VoiceInput {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl VoiceInput {
    pub fn new(max_duration: Duration) -> Self {
        Self {
            state: VoiceState::Idle,
            started_at: None,
            max_duration,
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == VoiceState::Listening
    }

    /// Open the microphone.
    pub fn start(&mut self) -> Result<(), ChatError> {
        if self.is_listening() {
            return Err(ChatError::VoiceError(
                "voice capture is already active".to_string(),
            ));
        }
        self.state = VoiceState::Listening;
        self.started_at = Some(Instant::now());
        tracing::debug!("Voice capture started");
        Ok(())
    }

    /// Close the microphone without producing a transcript.
    pub fn cancel(&mut self) {
        if self.is_listening() {
            tracing::debug!("Voice capture cancelled");
        }
        self.state = VoiceState::Idle;
        self.started_at = None;
    }

    /// Time since `start`, if listening.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    /// Whether the recording ran past `max_duration`.
    pub fn is_expired(&self) -> bool {
        self.elapsed().is_some_and(|e| e > self.max_duration)
    }

    /// Close the microphone and accept the recogniser's transcript.
    ///
    /// Returns the trimmed transcript, ready for the chat session. A recording
    /// that ran past `max_duration` is rejected.
    pub fn finish(&mut self, transcript: &str) -> Result<String, ChatError> {
        if !self.is_listening() {
            return Err(ChatError::VoiceError(
                "voice capture is not active".to_string(),
            ));
        }
        let expired = self.is_expired();
        self.cancel();
        if expired {
            tracing::debug!(limit = ?self.max_duration, "Voice recording too long");
            return Err(ChatError::RecordingTooLong {
                limit_secs: self.max_duration.as_secs(),
            });
        }
        let text = transcript.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyTranscript);
        }
        tracing::debug!(chars = text.chars().count(), "Voice transcript accepted");
        Ok(text.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
