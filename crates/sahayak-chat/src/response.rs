//! Turns answer-service outcomes into assistant messages.

use serde_json::Value;

use sahayak_client::{AnswerResponse, FailureKind, ServiceError};
use sahayak_core::config::ChatConfig;

use crate::types::MessageKind;

/// Assistant reply derived from one service outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub kind: MessageKind,
    pub text: String,
    pub avatar: String,
    pub metadata: Option<Value>,
    /// Category of the failure, when the call failed.
    pub failure: Option<(FailureKind, String)>,
}

/// Composes assistant replies with the configured fixed texts.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    pub fallback_text: String,
    pub error_text: String,
    pub assistant_avatar: String,
    pub error_avatar: String,
}

impl ResponseComposer {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            fallback_text: config.fallback_text.clone(),
            error_text: config.error_text.clone(),
            assistant_avatar: config.assistant_avatar.clone(),
            error_avatar: config.error_avatar.clone(),
        }
    }

    pub fn compose(&self, outcome: &Result<AnswerResponse, ServiceError>) -> Reply {
        match outcome {
            Ok(response) => self.answer(response),
            Err(err) => self.failure(err),
        }
    }

    /// Answer text, or the fallback apology when no known field carries text.
    pub fn answer(&self, response: &AnswerResponse) -> Reply {
        let text = match response.answer_text() {
            Some(text) => text.to_string(),
            None => {
                tracing::debug!(
                    keys = ?response.document().keys().collect::<Vec<_>>(),
                    "Answer had no text field, using fallback"
                );
                self.fallback_text.clone()
            }
        };
        Reply {
            kind: MessageKind::Answer,
            text,
            avatar: self.assistant_avatar.clone(),
            metadata: response.metadata().cloned(),
            failure: None,
        }
    }

    /// Fixed error reply. The error detail goes to the side channel only.
    pub fn failure(&self, err: &ServiceError) -> Reply {
        Reply {
            kind: MessageKind::Error,
            text: self.error_text.clone(),
            avatar: self.error_avatar.clone(),
            metadata: None,
            failure: Some((err.kind(), err.to_string())),
        }
    }
}
