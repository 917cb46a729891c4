//! HTTP client for the Sahayak backend.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use sahayak_core::config::BackendConfig;

use crate::content::{
    AdaptedWorksheet, ContentRequest, GeneratedContent, HealthStatus, LessonPlanRequest,
    QuizRequest, QuizResult, ReadingAssessment, ReadingAssessmentRequest, VisualAid,
    VisualAidRequest, WorksheetAdaptRequest, WorksheetRequest,
};
use crate::error::ServiceError;
use crate::types::{AnswerContext, AnswerRequest, AnswerResponse};
use crate::AnswerService;

/// Longest error body kept in `ServiceError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Body of `POST /api/v1/query`. The backend reads the question from `text`.
#[derive(Serialize)]
struct QueryBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    language: &'a str,
    context: &'a AnswerContext,
}

/// Typed client over the backend's JSON endpoints.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpBackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ServiceError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ServiceError::ClientBuild("backend base_url is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ServiceError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let url = format!("{}/health", self.base_url);
        let response = self.authorize(self.http.get(url)).send().await?;
        let document = read_document(response).await?;
        Ok(serde_json::from_value(Value::Object(document))?)
    }

    /// `POST /api/v1/generate`.
    pub async fn generate_content(
        &self,
        request: &ContentRequest,
    ) -> Result<GeneratedContent, ServiceError> {
        request.validate()?;
        let document = self.post_json("/api/v1/generate", request).await?;
        GeneratedContent::from_document(document)
    }

    /// `POST /api/v1/generate-quiz`.
    pub async fn generate_quiz(&self, request: &QuizRequest) -> Result<QuizResult, ServiceError> {
        request.validate()?;
        let document = self.post_json("/api/v1/generate-quiz", request).await?;
        QuizResult::from_document(document)
    }

    /// `POST /api/v1/visual-aids`.
    pub async fn generate_visual_aid(
        &self,
        request: &VisualAidRequest,
    ) -> Result<VisualAid, ServiceError> {
        request.validate()?;
        let document = self.post_json("/api/v1/visual-aids", request).await?;
        VisualAid::from_document(document)
    }

    /// `POST /api/v1/lesson-plan`.
    pub async fn generate_lesson_plan(
        &self,
        request: &LessonPlanRequest,
    ) -> Result<GeneratedContent, ServiceError> {
        request.validate()?;
        let document = self.post_json("/api/v1/lesson-plan", request).await?;
        GeneratedContent::from_document(document)
    }

    /// `POST /api/v1/worksheet-maker`.
    pub async fn generate_worksheet(
        &self,
        request: &WorksheetRequest,
    ) -> Result<GeneratedContent, ServiceError> {
        request.validate()?;
        let document = self.post_json("/api/v1/worksheet-maker", request).await?;
        GeneratedContent::from_worksheet_document(document)
    }

    /// `POST /api/v1/worksheet-adapter`.
    pub async fn adapt_worksheet(
        &self,
        request: &WorksheetAdaptRequest,
    ) -> Result<AdaptedWorksheet, ServiceError> {
        request.validate()?;
        let document = self.post_json("/api/v1/worksheet-adapter", request).await?;
        AdaptedWorksheet::from_document(document)
    }

    /// `POST /api/v1/assess-reading`.
    pub async fn assess_reading(
        &self,
        request: &ReadingAssessmentRequest,
    ) -> Result<ReadingAssessment, ServiceError> {
        request.validate()?;
        let document = self.post_json("/api/v1/assess-reading", request).await?;
        ReadingAssessment::from_document(document)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<Map<String, Value>, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let response = self.authorize(self.http.post(url)).json(body).send().await?;
        read_document(response).await
    }
}

impl AnswerService for HttpBackendClient {
    async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, ServiceError> {
        let body = QueryBody {
            kind: "question_answering",
            text: &request.question,
            language: &request.language,
            context: &request.context,
        };
        let document = self.post_json("/api/v1/query", &body).await?;
        Ok(AnswerResponse::new(document))
    }
}

/// Check the status and parse the body as a JSON object.
async fn read_document(response: reqwest::Response) -> Result<Map<String, Value>, ServiceError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body: truncate(&text, MAX_ERROR_BODY_CHARS),
        });
    }
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(document) => Ok(document),
        other => Err(ServiceError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
