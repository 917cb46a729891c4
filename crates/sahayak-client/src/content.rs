//! Content-generation request and response types.
//!
//! Defaults follow the backend: English, grades 3-4.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ServiceError;

pub const DEFAULT_GRADE_LEVEL: &str = "grade_3_4";
pub const DEFAULT_QUIZ_SIZE: u32 = 10;
/// Largest encoded image the worksheet adapter accepts.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

fn default_language() -> String {
    "en".to_string()
}

fn default_grade_level() -> String {
    DEFAULT_GRADE_LEVEL.to_string()
}

fn default_subject() -> String {
    "general".to_string()
}

/// Encode raw bytes as a base64 `data:` URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

fn require(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidRequest(format!("{field} is required")));
    }
    Ok(())
}

// =============================================================================
// Requests
// =============================================================================

/// Kind of generated teaching content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Story,
    Explanation,
    Lesson,
    Activity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub content_type: ContentType,
    pub topic: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_grade_level")]
    pub grade_level: String,
}

impl ContentRequest {
    pub fn new(content_type: ContentType, topic: impl Into<String>) -> Self {
        Self {
            content_type,
            topic: topic.into(),
            language: default_language(),
            grade_level: default_grade_level(),
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        require("topic", &self.topic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_grade_level")]
    pub grade_level: String,
    pub num_questions: u32,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            language: default_language(),
            grade_level: default_grade_level(),
            num_questions: DEFAULT_QUIZ_SIZE,
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        require("topic", &self.topic)?;
        if self.num_questions == 0 {
            return Err(ServiceError::InvalidRequest(
                "num_questions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualAidRequest {
    pub concept: String,
    pub diagram_type: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_grade_level")]
    pub grade_level: String,
}

impl VisualAidRequest {
    pub fn new(concept: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            diagram_type: "simple".to_string(),
            language: default_language(),
            grade_level: default_grade_level(),
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        require("concept", &self.concept)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlanRequest {
    pub subject: String,
    pub grade_levels: Vec<String>,
    pub duration: String,
    pub topic: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    pub resource_level: String,
}

impl LessonPlanRequest {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            grade_levels: vec![default_grade_level()],
            duration: "week".to_string(),
            topic: None,
            language: default_language(),
            resource_level: "basic".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        require("subject", &self.subject)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetRequest {
    pub topic: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_grade_level")]
    pub grade_level: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    pub worksheet_type: String,
}

impl WorksheetRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            language: default_language(),
            grade_level: default_grade_level(),
            subject: default_subject(),
            worksheet_type: "mixed".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        require("topic", &self.topic)
    }
}

/// Photo of a textbook page to turn into grade-level worksheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetAdaptRequest {
    /// `data:image/...;base64,...` URL.
    pub image: String,
    pub target_grades: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl WorksheetAdaptRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            target_grades: vec![default_grade_level()],
            language: default_language(),
            subject: default_subject(),
        }
    }

    pub fn from_image_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self::new(data_url(mime, bytes))
    }

    /// Same checks as the backend, in the same order: present, size, format.
    pub fn validate(&self) -> Result<(), ServiceError> {
        require("image", &self.image)?;
        if self.image.len() > MAX_IMAGE_BYTES {
            return Err(ServiceError::InvalidRequest(format!(
                "image is {} bytes, limit is {MAX_IMAGE_BYTES}",
                self.image.len()
            )));
        }
        if !self.image.starts_with("data:image/") {
            return Err(ServiceError::InvalidRequest(
                "image must be a data:image/ base64 URL".to_string(),
            ));
        }
        Ok(())
    }
}

/// Recording of a student reading aloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingAssessmentRequest {
    /// Base64 audio, optionally as a `data:audio/...` URL.
    pub audio: String,
    #[serde(default)]
    pub expected_text: String,
    #[serde(default = "default_grade_level")]
    pub grade_level: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub assessment_type: String,
}

impl ReadingAssessmentRequest {
    pub fn new(audio: impl Into<String>) -> Self {
        Self {
            audio: audio.into(),
            expected_text: String::new(),
            grade_level: default_grade_level(),
            language: default_language(),
            assessment_type: "reading_fluency".to_string(),
        }
    }

    pub fn from_audio_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self::new(data_url(mime, bytes))
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        require("audio", &self.audio)
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Generated text content (stories, explanations, lesson plans).
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedContent {
    pub text: String,
    pub title: Option<String>,
    pub suggestions: Vec<String>,
    /// Every field of the response document, including the ones above.
    pub fields: Map<String, Value>,
}

impl GeneratedContent {
    /// Read the content text from `generated_text`, falling back to `content`.
    pub fn from_document(fields: Map<String, Value>) -> Result<Self, ServiceError> {
        Self::with_text_keys(fields, &["generated_text", "content"])
    }

    /// Worksheets carry their text in `worksheet_content`.
    pub fn from_worksheet_document(fields: Map<String, Value>) -> Result<Self, ServiceError> {
        Self::with_text_keys(fields, &["worksheet_content"])
    }

    fn with_text_keys(fields: Map<String, Value>, keys: &[&str]) -> Result<Self, ServiceError> {
        let text = keys
            .iter()
            .filter_map(|key| fields.get(*key).and_then(Value::as_str))
            .find(|t| !t.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ServiceError::MalformedResponse(format!("no {} field", keys.join(" or ")))
            })?;
        let title = fields
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);
        let suggestions = string_list(fields.get("suggestions"));
        Ok(Self {
            text,
            title,
            suggestions,
            fields,
        })
    }
}

/// A generated quiz. The backend returns parsed JSON when it can, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizResult {
    Structured { title: Option<String>, quiz: Value },
    Text { title: Option<String>, text: String },
}

impl QuizResult {
    pub fn from_document(fields: Map<String, Value>) -> Result<Self, ServiceError> {
        let title = fields
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(quiz) = fields.get("quiz_data").filter(|q| !q.is_null()) {
            return Ok(QuizResult::Structured {
                title,
                quiz: quiz.clone(),
            });
        }
        match fields.get("quiz_text").and_then(Value::as_str) {
            Some(text) => Ok(QuizResult::Text {
                title,
                text: text.to_string(),
            }),
            None => Err(ServiceError::MalformedResponse(
                "no quiz_data or quiz_text field".to_string(),
            )),
        }
    }
}

/// A generated diagram with teaching notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualAid {
    pub title: Option<String>,
    pub description: String,
    pub mermaid_code: Option<String>,
    pub image_base64: Option<String>,
    pub drawing_instructions: Vec<String>,
    pub key_points: Vec<String>,
}

impl VisualAid {
    pub fn from_document(fields: Map<String, Value>) -> Result<Self, ServiceError> {
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };
        let description = text("diagram_description").ok_or_else(|| {
            ServiceError::MalformedResponse("no diagram_description field".to_string())
        })?;
        Ok(Self {
            title: text("title"),
            description,
            mermaid_code: text("mermaid_code"),
            image_base64: text("image_base64"),
            drawing_instructions: string_list(fields.get("drawing_instructions")),
            key_points: string_list(fields.get("key_points")),
        })
    }
}

/// Worksheets adapted from a photographed page, keyed by grade level.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedWorksheet {
    /// Text of the first grade's worksheet.
    pub content: String,
    pub worksheets: Map<String, Value>,
    pub extracted_content: Value,
    pub teaching_suggestions: Value,
    pub metadata: Option<Value>,
}

impl AdaptedWorksheet {
    pub fn from_document(mut fields: Map<String, Value>) -> Result<Self, ServiceError> {
        let Some(Value::Object(mut data)) = fields.remove("worksheet_data") else {
            return Err(ServiceError::MalformedResponse(
                "no worksheet_data object".to_string(),
            ));
        };
        let content = data
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let worksheets = match data.remove("worksheets") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if content.trim().is_empty() && worksheets.is_empty() {
            return Err(ServiceError::MalformedResponse(
                "worksheet_data has no content".to_string(),
            ));
        }
        Ok(Self {
            content,
            worksheets,
            extracted_content: data.remove("extracted_content").unwrap_or(Value::Null),
            teaching_suggestions: data.remove("teaching_suggestions").unwrap_or(Value::Null),
            metadata: fields.remove("metadata").filter(|m| !m.is_null()),
        })
    }
}

/// Result of a reading-fluency assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingAssessment {
    pub transcription: String,
    pub feedback: String,
    pub metrics: Map<String, Value>,
    pub assessment_data: Value,
    pub assessment_type: Option<String>,
}

impl ReadingAssessment {
    pub fn from_document(mut fields: Map<String, Value>) -> Result<Self, ServiceError> {
        if !fields.contains_key("transcription") && !fields.contains_key("assessment_data") {
            return Err(ServiceError::MalformedResponse(
                "no transcription or assessment_data field".to_string(),
            ));
        }
        let text = |fields: &Map<String, Value>, key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Self {
            transcription: text(&fields, "transcription"),
            feedback: text(&fields, "feedback"),
            assessment_type: fields
                .get("assessment_type")
                .and_then(Value::as_str)
                .map(str::to_string),
            metrics: match fields.remove("metrics") {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            },
            assessment_data: fields.remove("assessment_data").unwrap_or(Value::Null),
        })
    }
}

/// Accept either a list of strings or a single string.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|i| i.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
