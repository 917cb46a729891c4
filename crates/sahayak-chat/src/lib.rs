//! Chat with the Sahayak teaching assistant.
//!
//! Provides the chat session state machine, an async controller for
//! front-ends, context building for outgoing questions, and voice
//! transcript intake.

pub mod context;
pub mod controller;
pub mod error;
pub mod response;
pub mod session;
pub mod types;
pub mod voice;

pub use context::ContextBuilder;
pub use controller::ChatController;
pub use error::ChatError;
pub use response::{Reply, ResponseComposer};
pub use session::{ChatSession, PendingRequest};
pub use types::{ChatEvent, Message, MessageKind, SessionSnapshot};
pub use voice::{VoiceInput, VoiceState};
