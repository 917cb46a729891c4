//! Chat session state machine.
//!
//! The log is seeded with a welcome message and grows by exactly one user
//! message and one assistant message per accepted send. At most one request
//! is outstanding at a time. Every reset bumps the log generation; outcomes
//! issued against an older generation are dropped.

use tokio::sync::broadcast;

use sahayak_client::{AnswerRequest, AnswerResponse, AnswerService, ServiceError};
use sahayak_core::config::ChatConfig;

use crate::context::ContextBuilder;
use crate::response::ResponseComposer;
use crate::types::{ChatEvent, Message, MessageKind, SessionSnapshot};

/// A request issued by [`ChatSession::begin_send`], awaiting its outcome.
///
/// Not `Clone`: each request resolves at most once.
#[derive(Debug)]
pub struct PendingRequest {
    generation: u64,
    request: AnswerRequest,
}

impl PendingRequest {
    /// Log generation the request was issued against.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &AnswerRequest {
        &self.request
    }
}

/// Ordered chat log plus the single-request loading state.
#[derive(Debug)]
pub struct ChatSession {
    config: ChatConfig,
    context: ContextBuilder,
    composer: ResponseComposer,
    messages: Vec<Message>,
    pending: bool,
    generation: u64,
    next_seq: u64,
    events: broadcast::Sender<ChatEvent>,
}

impl ChatSession {
    /// Open a session seeded with the welcome message.
    pub fn new(config: ChatConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let mut session = Self {
            context: ContextBuilder::new(&config),
            composer: ResponseComposer::new(&config),
            config,
            messages: Vec::new(),
            pending: false,
            generation: 0,
            next_seq: 0,
            events,
        };
        session.seed();
        session
    }

    /// Seed the welcome message.
    ///
    /// A no-op on a fresh session; otherwise the same as [`clear`](Self::clear).
    pub fn initialize(&mut self) {
        if self.is_fresh() {
            return;
        }
        self.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            pending: self.pending,
            generation: self.generation,
        }
    }

    /// Role tag for requests issued from now on.
    pub fn set_user_role(&mut self, role: &str) {
        if self.context.user_role != role {
            tracing::debug!(role, "Chat user role changed");
            self.context.user_role = role.to_string();
            self.config.user_role = role.to_string();
        }
    }

    /// Language tag for requests issued from now on.
    pub fn set_language(&mut self, language: &str) {
        if self.context.language != language {
            tracing::debug!(language, "Chat language changed");
            self.context.language = language.to_string();
            self.config.language = language.to_string();
        }
    }

    /// Subscribe to side-channel events (failures, stale responses, resets).
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Synchronous half of a send.
    ///
    /// Appends the trimmed user message, marks the session pending and returns
    /// the request to issue. Returns `None`, changing nothing, when the text is
    /// blank or a request is already outstanding.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingRequest> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring blank chat submission");
            return None;
        }
        if self.pending {
            tracing::debug!("Ignoring chat submission while a request is pending");
            return None;
        }

        let request = self.context.build(&self.messages, text);
        let seq = self.take_seq();
        self.messages.push(Message::user(seq, text));
        self.pending = true;
        self.emit(ChatEvent::RequestIssued {
            generation: self.generation,
        });
        tracing::debug!(
            generation = self.generation,
            prior = request.context.previous_messages.len(),
            "Chat request issued"
        );

        Some(PendingRequest {
            generation: self.generation,
            request,
        })
    }

    /// Asynchronous half of a send: apply the service outcome.
    ///
    /// Returns `true` if an assistant message was appended, `false` if the
    /// outcome belonged to a log that has since been cleared. Either way the
    /// request is no longer outstanding afterwards.
    pub fn resolve(
        &mut self,
        pending: PendingRequest,
        outcome: Result<AnswerResponse, ServiceError>,
    ) -> bool {
        if pending.generation != self.generation || !self.pending {
            // Only one request is ever outstanding, so this is the one `pending` tracks.
            self.pending = false;
            tracing::debug!(
                issued_generation = pending.generation,
                current_generation = self.generation,
                "Discarding response for a cleared chat log"
            );
            self.emit(ChatEvent::StaleResponseDiscarded {
                issued_generation: pending.generation,
                current_generation: self.generation,
            });
            return false;
        }

        let reply = self.composer.compose(&outcome);
        let seq = self.take_seq();
        let message = Message::assistant(seq, reply.kind, reply.text, reply.avatar, reply.metadata);
        let message_id = message.id;
        self.messages.push(message);
        self.pending = false;

        match reply.failure {
            Some((kind, detail)) => {
                tracing::warn!(
                    generation = self.generation,
                    %kind,
                    error = %detail,
                    "Answer service call failed"
                );
                self.emit(ChatEvent::RequestFailed {
                    generation: self.generation,
                    kind,
                    detail,
                });
            }
            None => {
                tracing::debug!(generation = self.generation, "Answer appended");
                self.emit(ChatEvent::AnswerAppended {
                    generation: self.generation,
                    message_id,
                });
            }
        }
        true
    }

    /// Send `text` and wait for the answer in place.
    ///
    /// Returns whether the submission was accepted. Service failures are not
    /// errors here; they show up as an error message in the log.
    pub async fn send_user_message<S: AnswerService>(&mut self, service: &S, text: &str) -> bool {
        let Some(pending) = self.begin_send(text) else {
            return false;
        };
        let outcome = service.answer(pending.request()).await;
        self.resolve(pending, outcome);
        true
    }

    /// Same as [`send_user_message`](Self::send_user_message) for a recognised transcript.
    pub async fn submit_voice_transcript<S: AnswerService>(
        &mut self,
        service: &S,
        transcript: &str,
    ) -> bool {
        self.send_user_message(service, transcript).await
    }

    /// Discard the log and reseed the welcome message.
    ///
    /// An outstanding request is not cancelled and stays pending; its outcome
    /// is discarded when it arrives, and only then are new sends accepted.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.generation += 1;
        self.seed();
        tracing::debug!(generation = self.generation, "Chat log cleared");
        self.emit(ChatEvent::Cleared {
            generation: self.generation,
        });
    }

    // -- Private helpers --

    fn seed(&mut self) {
        let seq = self.take_seq();
        self.messages.push(Message::assistant(
            seq,
            MessageKind::Welcome,
            self.config.welcome_text.clone(),
            self.config.assistant_avatar.clone(),
            None,
        ));
    }

    fn is_fresh(&self) -> bool {
        !self.pending && self.messages.len() == 1 && self.messages[0].kind == MessageKind::Welcome
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn emit(&self, event: ChatEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sahayak_client::MockAnswerService;
    use sahayak_core::Author;
    use serde_json::json;

    fn session() -> ChatSession {
        ChatSession::new(ChatConfig::default())
    }

    fn ok(value: serde_json::Value) -> Result<AnswerResponse, ServiceError> {
        Ok(AnswerResponse::from_value(value).unwrap())
    }

    // ---- Initialization ----

    #[test]
    fn test_new_session_has_single_welcome() {
        let s = session();
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].author, Author::Assistant);
        assert_eq!(s.messages()[0].kind, MessageKind::Welcome);
        assert_eq!(s.messages()[0].text, ChatConfig::default().welcome_text);
        assert!(!s.is_pending());
        assert_eq!(s.generation(), 0);
    }

    #[test]
    fn test_initialize_on_fresh_session_is_idempotent() {
        let mut s = session();
        let welcome_id = s.messages()[0].id;
        s.initialize();
        s.initialize();
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].id, welcome_id);
        assert_eq!(s.generation(), 0);
    }

    #[test]
    fn test_initialize_mid_conversation_clears() {
        let mut s = session();
        let pending = s.begin_send("hello").unwrap();
        s.resolve(pending, ok(json!({"response": "hi"})));
        assert_eq!(s.messages().len(), 3);

        s.initialize();
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].kind, MessageKind::Welcome);
        assert_eq!(s.generation(), 1);
    }

    // ---- begin_send ----

    #[test]
    fn test_begin_send_appends_trimmed_user_message() {
        let mut s = session();
        let pending = s.begin_send("  How do I teach fractions?  ").unwrap();
        assert!(s.is_pending());
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[1].author, Author::User);
        assert_eq!(s.messages()[1].text, "How do I teach fractions?");
        assert_eq!(pending.request().question, "How do I teach fractions?");
        assert_eq!(pending.generation(), 0);
    }

    #[test]
    fn test_context_excludes_new_user_message() {
        let mut s = session();
        let pending = s.begin_send("first").unwrap();
        let previous = &pending.request().context.previous_messages;
        assert_eq!(previous.len(), 1);
        assert!(!previous[0].is_user);
        s.resolve(pending, ok(json!({"response": "answer one"})));

        let pending = s.begin_send("second").unwrap();
        let texts: Vec<_> = pending
            .request()
            .context
            .previous_messages
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[1], "first");
        assert_eq!(texts[2], "answer one");
        assert!(!texts.contains(&"second"));
    }

    #[test]
    fn test_blank_submissions_are_noops() {
        let mut s = session();
        assert!(s.begin_send("").is_none());
        assert!(s.begin_send("   ").is_none());
        assert!(s.begin_send("\n\t").is_none());
        assert_eq!(s.messages().len(), 1);
        assert!(!s.is_pending());
    }

    #[test]
    fn test_send_while_pending_is_noop() {
        let mut s = session();
        let _pending = s.begin_send("first").unwrap();
        let before = s.snapshot();
        assert!(s.begin_send("second").is_none());
        assert_eq!(s.snapshot(), before);
        assert!(s.is_pending());
    }

    // ---- resolve ----

    #[test]
    fn test_resolve_success() {
        let mut s = session();
        let pending = s.begin_send("How do I teach fractions?").unwrap();
        assert!(s.resolve(pending, ok(json!({"response": "Use pizza slices..."}))));

        let msgs = s.messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1].author, Author::User);
        assert_eq!(msgs[2].author, Author::Assistant);
        assert_eq!(msgs[2].text, "Use pizza slices...");
        assert_eq!(msgs[2].kind, MessageKind::Answer);
        assert!(!s.is_pending());
    }

    #[test]
    fn test_resolve_failure_appends_error_message() {
        let config = ChatConfig::default();
        let mut s = session();
        let pending = s.begin_send("test").unwrap();
        assert!(s.resolve(pending, Err(ServiceError::Connect("refused".to_string()))));

        let last = s.messages().last().unwrap();
        assert_eq!(last.text, config.error_text);
        assert_eq!(last.avatar.as_deref(), Some(config.error_avatar.as_str()));
        assert_ne!(last.avatar.as_deref(), Some(config.assistant_avatar.as_str()));
        assert!(last.is_error());
        assert!(!s.is_pending());
    }

    #[test]
    fn test_resolve_empty_response_uses_fallback() {
        let mut s = session();
        let pending = s.begin_send("q").unwrap();
        s.resolve(pending, ok(json!({})));
        assert_eq!(
            s.messages().last().unwrap().text,
            ChatConfig::default().fallback_text
        );
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut s = session();
        let pending = s.begin_send("a").unwrap();
        s.resolve(pending, ok(json!({"response": "b"})));
        let seqs: Vec<u64> = s.messages().iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    // ---- clear and generations ----

    #[test]
    fn test_clear_always_leaves_welcome_only() {
        let mut s = session();
        for i in 0..3 {
            let pending = s.begin_send(&format!("q{i}")).unwrap();
            s.resolve(pending, ok(json!({"response": "a"})));
        }
        assert_eq!(s.messages().len(), 7);
        s.clear();
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].kind, MessageKind::Welcome);
        s.clear();
        assert_eq!(s.messages().len(), 1);
    }

    #[test]
    fn test_stale_response_after_clear_is_discarded() {
        let mut s = session();
        let mut events = s.subscribe();
        let pending = s.begin_send("question").unwrap();
        s.clear();
        assert!(s.is_pending());

        assert!(!s.resolve(pending, ok(json!({"response": "late"}))));
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].kind, MessageKind::Welcome);
        assert!(!s.is_pending());

        assert_eq!(events.try_recv().unwrap(), ChatEvent::RequestIssued { generation: 0 });
        assert_eq!(events.try_recv().unwrap(), ChatEvent::Cleared { generation: 1 });
        assert_eq!(
            events.try_recv().unwrap(),
            ChatEvent::StaleResponseDiscarded {
                issued_generation: 0,
                current_generation: 1,
            }
        );
    }

    #[test]
    fn test_send_after_clear_waits_for_in_flight_request() {
        let mut s = session();
        let old = s.begin_send("old").unwrap();
        s.clear();

        let before = s.snapshot();
        assert!(s.begin_send("new").is_none());
        assert_eq!(s.snapshot(), before);

        assert!(!s.resolve(old, ok(json!({"response": "old answer"}))));
        assert!(!s.is_pending());
        assert_eq!(s.messages().len(), 1);

        let new = s.begin_send("new").unwrap();
        assert_eq!(new.generation(), 1);
        assert!(s.resolve(new, ok(json!({"response": "new answer"}))));
        assert_eq!(s.messages().len(), 3);
        assert_eq!(s.messages().last().unwrap().text, "new answer");
        assert!(!s.is_pending());
    }

    #[test]
    fn test_initialize_while_pending_keeps_request_outstanding() {
        let mut s = session();
        let pending = s.begin_send("q").unwrap();
        s.initialize();
        assert_eq!(s.messages().len(), 1);
        assert!(s.is_pending());
        assert!(!s.resolve(pending, ok(json!({"response": "a"}))));
        assert!(!s.is_pending());
    }

    #[test]
    fn test_role_and_language_apply_to_later_requests() {
        let mut s = session();
        let first = s.begin_send("before").unwrap();
        s.set_user_role("head_teacher");
        s.set_language("hi");
        assert_eq!(first.request().context.user_role, "teacher");
        assert_eq!(first.request().language, "en");
        s.resolve(first, ok(json!({"response": "a"})));

        let second = s.begin_send("after").unwrap();
        assert_eq!(second.request().context.user_role, "head_teacher");
        assert_eq!(second.request().language, "hi");
        assert_eq!(s.config().user_role, "head_teacher");
    }

    // ---- events ----

    #[test]
    fn test_failure_event_carries_kind() {
        let mut s = session();
        let mut events = s.subscribe();
        let pending = s.begin_send("q").unwrap();
        s.resolve(pending, Err(ServiceError::Timeout("60s".to_string())));

        let _issued = events.try_recv().unwrap();
        match events.try_recv().unwrap() {
            ChatEvent::RequestFailed { kind, detail, .. } => {
                assert_eq!(kind, sahayak_client::FailureKind::Timeout);
                assert!(detail.contains("60s"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_answer_event_names_appended_message() {
        let mut s = session();
        let mut events = s.subscribe();
        let pending = s.begin_send("q").unwrap();
        s.resolve(pending, ok(json!({"response": "a"})));

        let _issued = events.try_recv().unwrap();
        let appended_id = s.messages().last().unwrap().id;
        assert_eq!(
            events.try_recv().unwrap(),
            ChatEvent::AnswerAppended {
                generation: 0,
                message_id: appended_id,
            }
        );
    }

    // ---- inline send ----

    #[tokio::test]
    async fn test_send_user_message_inline() {
        let service = MockAnswerService::new();
        service.push_response(json!({"response": "Use pizza slices..."}));
        let mut s = session();

        assert!(s.send_user_message(&service, "How do I teach fractions?").await);
        assert_eq!(s.messages().len(), 3);
        assert!(!s.is_pending());
        assert_eq!(service.request_count(), 1);
    }

    #[tokio::test]
    async fn test_send_blank_never_calls_service() {
        let service = MockAnswerService::new();
        let mut s = session();
        assert!(!s.send_user_message(&service, "   ").await);
        assert_eq!(service.request_count(), 0);
        assert_eq!(s.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_voice_transcript_is_a_send() {
        let service = MockAnswerService::new();
        service.push_response(json!({"generated_text": "Sing a counting song"}));
        let mut s = session();

        assert!(s.submit_voice_transcript(&service, " counting activities ").await);
        assert_eq!(s.messages()[1].text, "counting activities");
        assert_eq!(s.messages()[2].text, "Sing a counting song");
    }
}
