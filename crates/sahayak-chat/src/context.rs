//! Conversation context for outgoing questions.
//!
//! Reduces the chat log to the `{text, is_user}` pairs the answer service
//! expects and attaches the caller's role and classroom tags.

use sahayak_client::{AnswerContext, AnswerRequest, PriorMessage};
use sahayak_core::config::ChatConfig;

use crate::types::Message;

/// Builds answer requests from the chat log.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    pub language: String,
    pub user_role: String,
    pub context_type: String,
}

impl ContextBuilder {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            language: config.language.clone(),
            user_role: config.user_role.clone(),
            context_type: config.context_type.clone(),
        }
    }

    /// Request for `question`, with `prior` as the conversation so far.
    ///
    /// `prior` must not include the message carrying `question` itself.
    pub fn build(&self, prior: &[Message], question: &str) -> AnswerRequest {
        AnswerRequest {
            question: question.to_string(),
            language: self.language.clone(),
            context: AnswerContext {
                previous_messages: prior
                    .iter()
                    .map(|m| PriorMessage {
                        text: m.text.clone(),
                        is_user: m.is_user(),
                    })
                    .collect(),
                user_role: self.user_role.clone(),
                context_type: self.context_type.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageKind;

    fn builder() -> ContextBuilder {
        ContextBuilder::new(&ChatConfig::default())
    }

    #[test]
    fn test_build_uses_config_tags() {
        let request = builder().build(&[], "What is a verb?");
        assert_eq!(request.question, "What is a verb?");
        assert_eq!(request.language, "en");
        assert_eq!(request.context.user_role, "teacher");
        assert_eq!(request.context.context_type, "classroom");
        assert!(request.context.previous_messages.is_empty());
    }

    #[test]
    fn test_build_preserves_order_and_authorship() {
        let prior = vec![
            Message::assistant(0, MessageKind::Welcome, "Hello!", "🤖", None),
            Message::user(1, "Hi"),
            Message::assistant(2, MessageKind::Answer, "How can I help?", "🤖", None),
        ];
        let request = builder().build(&prior, "Next question");
        let previous = &request.context.previous_messages;
        assert_eq!(previous.len(), 3);
        assert_eq!(previous[0], PriorMessage { text: "Hello!".to_string(), is_user: false });
        assert_eq!(previous[1], PriorMessage { text: "Hi".to_string(), is_user: true });
        assert!(!previous[2].is_user);
    }

    #[test]
    fn test_error_messages_are_included_as_assistant_turns() {
        let prior = vec![Message::assistant(0, MessageKind::Error, "Sorry", "⚠️", None)];
        let request = builder().build(&prior, "again");
        assert_eq!(request.context.previous_messages[0].text, "Sorry");
        assert!(!request.context.previous_messages[0].is_user);
    }

    #[test]
    fn test_custom_language() {
        let config = ChatConfig {
            language: "hi".to_string(),
            ..ChatConfig::default()
        };
        let request = ContextBuilder::new(&config).build(&[], "q");
        assert_eq!(request.language, "hi");
    }
}
