//! Question-answering request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response keys that may carry the answer text, in priority order.
pub const ANSWER_TEXT_KEYS: [&str; 2] = ["response", "generated_text"];

/// One earlier message, reduced to what the backend needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorMessage {
    pub text: String,
    pub is_user: bool,
}

/// Conversation context sent alongside a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerContext {
    pub previous_messages: Vec<PriorMessage>,
    pub user_role: String,
    pub context_type: String,
}

/// A question for the answer service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question: String,
    pub language: String,
    pub context: AnswerContext,
}

/// Raw answer document as returned by the service.
///
/// The backend's payload shape is loose, so the document is kept as a JSON
/// object and read through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerResponse {
    document: Map<String, Value>,
}

impl AnswerResponse {
    pub fn new(document: Map<String, Value>) -> Self {
        Self { document }
    }

    /// Build from any JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(document) => Some(Self { document }),
            _ => None,
        }
    }

    /// First non-blank string among `keys`, in order.
    pub fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.document.get(*key).and_then(Value::as_str))
            .find(|text| !text.trim().is_empty())
    }

    /// Answer text using the standard key order.
    pub fn answer_text(&self) -> Option<&str> {
        self.first_text(&ANSWER_TEXT_KEYS)
    }

    /// The `metadata` field, untouched. `null` counts as absent.
    pub fn metadata(&self) -> Option<&Value> {
        self.document.get("metadata").filter(|m| !m.is_null())
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> AnswerResponse {
        AnswerResponse::from_value(value).unwrap()
    }

    #[test]
    fn test_request_wire_shape() {
        let request = AnswerRequest {
            question: "How do I teach fractions?".to_string(),
            language: "en".to_string(),
            context: AnswerContext {
                previous_messages: vec![PriorMessage {
                    text: "Hello!".to_string(),
                    is_user: false,
                }],
                user_role: "teacher".to_string(),
                context_type: "classroom".to_string(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "question": "How do I teach fractions?",
                "language": "en",
                "context": {
                    "previous_messages": [{"text": "Hello!", "is_user": false}],
                    "user_role": "teacher",
                    "context_type": "classroom",
                }
            })
        );
    }

    #[test]
    fn test_answer_text_prefers_response() {
        let r = response(json!({"response": "A", "generated_text": "B"}));
        assert_eq!(r.answer_text(), Some("A"));
    }

    #[test]
    fn test_answer_text_falls_through_blank_and_non_string() {
        let r = response(json!({"response": "   ", "generated_text": "B"}));
        assert_eq!(r.answer_text(), Some("B"));

        let r = response(json!({"response": 42, "generated_text": "B"}));
        assert_eq!(r.answer_text(), Some("B"));
    }

    #[test]
    fn test_answer_text_missing() {
        assert_eq!(response(json!({})).answer_text(), None);
        assert_eq!(response(json!({"content": "x"})).answer_text(), None);
    }

    #[test]
    fn test_metadata_passthrough() {
        let r = response(json!({
            "response": "A",
            "metadata": {"model_used": "gemini-1.5-flash", "confidence": 0.8}
        }));
        assert_eq!(
            r.metadata(),
            Some(&json!({"model_used": "gemini-1.5-flash", "confidence": 0.8}))
        );

        let r = response(json!({"response": "A", "metadata": null}));
        assert!(r.metadata().is_none());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(AnswerResponse::from_value(json!([1, 2])).is_none());
        assert!(AnswerResponse::from_value(json!("text")).is_none());
    }

    #[test]
    fn test_response_transparent_serde() {
        let r: AnswerResponse = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert_eq!(r.answer_text(), Some("hi"));
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"response":"hi"}"#);
    }
}
