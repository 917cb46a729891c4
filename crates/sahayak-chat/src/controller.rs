//! Async driver that front-ends use to run a chat session.
//!
//! Sends return immediately after the optimistic user message is appended;
//! the service call runs as a detached tokio task that only holds a weak
//! reference to the session. Closing the view drops the controller, and any
//! late outcome is discarded.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use sahayak_client::AnswerService;
use sahayak_core::config::ChatConfig;

use crate::session::ChatSession;
use crate::types::{ChatEvent, SessionSnapshot};

/// Owns a chat session and the answer service it talks to.
pub struct ChatController<S> {
    session: Arc<Mutex<ChatSession>>,
    service: Arc<S>,
}

impl<S: AnswerService + 'static> ChatController<S> {
    pub fn new(config: ChatConfig, service: Arc<S>) -> Self {
        Self {
            session: Arc::new(Mutex::new(ChatSession::new(config))),
            service,
        }
    }

    /// Submit user text.
    ///
    /// Returns the handle of the task awaiting the answer, or `None` when the
    /// submission was ignored (blank text, or a request already pending).
    pub fn send_user_message(&self, text: &str) -> Option<JoinHandle<()>> {
        let pending = self.lock().begin_send(text)?;

        let session = Arc::downgrade(&self.session);
        let service = Arc::clone(&self.service);
        Some(tokio::spawn(async move {
            let outcome = service.answer(pending.request()).await;
            let Some(session) = session.upgrade() else {
                tracing::debug!(
                    generation = pending.generation(),
                    "Chat session closed before the answer arrived"
                );
                return;
            };
            let mut guard = session.lock().unwrap_or_else(|e| e.into_inner());
            guard.resolve(pending, outcome);
        }))
    }

    /// Submit a transcript from the speech recogniser.
    pub fn submit_voice_transcript(&self, transcript: &str) -> Option<JoinHandle<()>> {
        self.send_user_message(transcript)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Tag subsequent requests with `role`, e.g. after a sign-in.
    pub fn set_user_role(&self, role: &str) {
        self.lock().set_user_role(role);
    }

    pub fn set_language(&self, language: &str) {
        self.lock().set_language(language);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.lock().subscribe()
    }

    /// The session lock is never held across an `.await`, so a poisoned lock
    /// only means a panic mid-update; the log is still usable.
    fn lock(&self) -> MutexGuard<'_, ChatSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}
