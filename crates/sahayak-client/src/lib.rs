//! Sahayak backend client.
//!
//! Provides the `AnswerService` abstraction the chat session talks to, an
//! HTTP implementation over the backend's JSON API (question answering plus
//! content generation), and a scripted mock for tests and offline use.

use std::future::Future;

pub mod content;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use content::{
    data_url, AdaptedWorksheet, ContentRequest, ContentType, GeneratedContent, HealthStatus,
    LessonPlanRequest, QuizRequest, QuizResult, ReadingAssessment, ReadingAssessmentRequest,
    VisualAid, VisualAidRequest, WorksheetAdaptRequest, WorksheetRequest, MAX_IMAGE_BYTES,
};
pub use error::{FailureKind, ServiceError};
pub use http::HttpBackendClient;
pub use mock::MockAnswerService;
pub use types::{AnswerContext, AnswerRequest, AnswerResponse, PriorMessage, ANSWER_TEXT_KEYS};

/// Service that turns a question plus conversation context into an answer.
pub trait AnswerService: Send + Sync {
    fn answer(
        &self,
        request: &AnswerRequest,
    ) -> impl Future<Output = Result<AnswerResponse, ServiceError>> + Send;
}
