//! Scripted answer service for tests and offline mode.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};
use tokio::sync::Notify;

use crate::error::ServiceError;
use crate::types::{AnswerRequest, AnswerResponse};
use crate::AnswerService;

/// Answer service that replays scripted outcomes.
///
/// Once the script is exhausted it answers with an offline echo of the
/// question. Every request is recorded for inspection.
#[derive(Debug, Default)]
pub struct MockAnswerService {
    script: Mutex<VecDeque<Result<AnswerResponse, ServiceError>>>,
    requests: Mutex<Vec<AnswerRequest>>,
    gate: Option<Arc<Notify>>,
}

impl MockAnswerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service whose every answer waits for a `notify_one` on the returned handle.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let service = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (service, gate)
    }

    /// Queue a successful answer document. Non-object values become `{}`.
    pub fn push_response(&self, document: Value) -> &Self {
        let response = AnswerResponse::from_value(document)
            .unwrap_or_else(|| AnswerResponse::new(Map::new()));
        self.push(Ok(response))
    }

    pub fn push_error(&self, error: ServiceError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, outcome: Result<AnswerResponse, ServiceError>) -> &Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<AnswerRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl AnswerService for MockAnswerService {
    async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, ServiceError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let scripted = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());

        match scripted {
            Some(outcome) => outcome,
            None => {
                tracing::debug!("Mock script exhausted, echoing question");
                let document = json!({
                    "response": format!("(offline) You asked: {}", request.question),
                    "metadata": {"model_used": "mock"},
                });
                Ok(AnswerResponse::from_value(document).unwrap_or_default())
            }
        }
    }
}
