//! One-shot subcommands that call a single backend endpoint and print the result.

use std::path::Path;

use sahayak_client::{
    AdaptedWorksheet, ContentRequest, GeneratedContent, HttpBackendClient, LessonPlanRequest,
    QuizRequest, QuizResult, ReadingAssessment, ReadingAssessmentRequest, ServiceError, VisualAid,
    VisualAidRequest, WorksheetAdaptRequest, WorksheetRequest,
};
use sahayak_core::Feature;

use crate::cli::BackendCommand;

/// Execute a subcommand that makes one backend call.
pub async fn run(
    command: BackendCommand,
    client: &HttpBackendClient,
    language: &str,
) -> Result<(), ServiceError> {
    match command {
        BackendCommand::Health => {
            let status = client.health().await?;
            if status.is_healthy() {
                println!("{} at {} is healthy", status.service, client.base_url());
            } else {
                println!("{} reports status '{}'", client.base_url(), status.status);
            }
        }
        BackendCommand::Generate {
            content_type,
            topic,
            grade_level,
        } => {
            let mut request = ContentRequest::new(content_type, topic);
            request.language = language.to_string();
            if let Some(grade) = grade_level {
                request.grade_level = grade;
            }
            let content = client.generate_content(&request).await?;
            print_content(&content);
        }
        BackendCommand::Quiz { topic, questions } => {
            let mut request = QuizRequest::new(topic);
            request.language = language.to_string();
            request.num_questions = questions;
            let quiz = client.generate_quiz(&request).await?;
            print_quiz(&quiz)?;
        }
        BackendCommand::VisualAid {
            concept,
            diagram_type,
        } => {
            let mut request = VisualAidRequest::new(concept);
            request.language = language.to_string();
            request.diagram_type = diagram_type;
            let aid = client.generate_visual_aid(&request).await?;
            print_visual_aid(&aid);
        }
        BackendCommand::LessonPlan {
            subject,
            topic,
            duration,
        } => {
            let mut request = LessonPlanRequest::new(subject);
            request.language = language.to_string();
            request.topic = topic;
            request.duration = duration;
            let plan = client.generate_lesson_plan(&request).await?;
            print_content(&plan);
        }
        BackendCommand::Worksheet {
            topic,
            subject,
            worksheet_type,
        } => {
            let mut request = WorksheetRequest::new(topic);
            request.language = language.to_string();
            request.subject = subject;
            request.worksheet_type = worksheet_type;
            let worksheet = client.generate_worksheet(&request).await?;
            print_content(&worksheet);
        }
        BackendCommand::AdaptWorksheet {
            image,
            grades,
            subject,
        } => {
            let bytes = read_input(&image)?;
            let mut request = WorksheetAdaptRequest::from_image_bytes(media_type(&image), &bytes);
            request.language = language.to_string();
            request.subject = subject;
            if !grades.is_empty() {
                request.target_grades = grades;
            }
            let adapted = client.adapt_worksheet(&request).await?;
            print_adapted_worksheet(&adapted)?;
        }
        BackendCommand::AssessReading {
            audio,
            expected_text,
            grade_level,
        } => {
            let bytes = read_input(&audio)?;
            let mut request = ReadingAssessmentRequest::from_audio_bytes(media_type(&audio), &bytes);
            request.language = language.to_string();
            if let Some(text) = expected_text {
                request.expected_text = text;
            }
            if let Some(grade) = grade_level {
                request.grade_level = grade;
            }
            let assessment = client.assess_reading(&request).await?;
            print_reading_assessment(&assessment)?;
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>, ServiceError> {
    std::fs::read(path)
        .map_err(|e| ServiceError::InvalidRequest(format!("cannot read {}: {e}", path.display())))
}

/// Media type for an upload, from its file extension.
pub fn media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

pub fn print_features() {
    for feature in Feature::ALL {
        println!(
            "{:<20} {:<14} {:<22} {}",
            feature.tag(),
            feature.path(),
            feature.endpoint(),
            feature.title()
        );
    }
}

fn print_content(content: &GeneratedContent) {
    if let Some(title) = &content.title {
        println!("# {title}\n");
    }
    println!("{}", content.text);
    if !content.suggestions.is_empty() {
        println!("\nSuggestions:");
        for suggestion in &content.suggestions {
            println!("  - {suggestion}");
        }
    }
}

fn print_quiz(quiz: &QuizResult) -> Result<(), ServiceError> {
    match quiz {
        QuizResult::Structured { title, quiz } => {
            if let Some(title) = title {
                println!("# {title}\n");
            }
            println!("{}", serde_json::to_string_pretty(quiz)?);
        }
        QuizResult::Text { title, text } => {
            if let Some(title) = title {
                println!("# {title}\n");
            }
            println!("{text}");
        }
    }
    Ok(())
}

fn print_visual_aid(aid: &VisualAid) {
    if let Some(title) = &aid.title {
        println!("# {title}\n");
    }
    println!("{}", aid.description);
    if let Some(code) = &aid.mermaid_code {
        println!("\n```mermaid\n{code}\n```");
    }
    if !aid.drawing_instructions.is_empty() {
        println!("\nHow to draw it:");
        for (i, step) in aid.drawing_instructions.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }
    if !aid.key_points.is_empty() {
        println!("\nKey points:");
        for point in &aid.key_points {
            println!("  - {point}");
        }
    }
    if aid.image_base64.is_some() {
        println!("\n(image attached)");
    }
}

fn print_adapted_worksheet(adapted: &AdaptedWorksheet) -> Result<(), ServiceError> {
    if !adapted.content.is_empty() {
        println!("{}", adapted.content);
    }
    for (grade, worksheet) in &adapted.worksheets {
        println!("\n## {grade}\n");
        match worksheet.as_str() {
            Some(text) => println!("{text}"),
            None => println!("{}", serde_json::to_string_pretty(worksheet)?),
        }
    }
    if !adapted.teaching_suggestions.is_null() {
        println!("\nTeaching suggestions:");
        println!("{}", serde_json::to_string_pretty(&adapted.teaching_suggestions)?);
    }
    Ok(())
}

fn print_reading_assessment(assessment: &ReadingAssessment) -> Result<(), ServiceError> {
    if !assessment.transcription.is_empty() {
        println!("Heard: {}", assessment.transcription);
    }
    if !assessment.feedback.is_empty() {
        println!("\n{}", assessment.feedback);
    }
    if !assessment.metrics.is_empty() {
        println!("\nMetrics:");
        for (name, value) in &assessment.metrics {
            println!("  {name}: {value}");
        }
    }
    if assessment.transcription.is_empty() && assessment.feedback.is_empty() {
        println!("{}", serde_json::to_string_pretty(&assessment.assessment_data)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(media_type(Path::new("page.JPG")), "image/jpeg");
        assert_eq!(media_type(Path::new("scan.png")), "image/png");
        assert_eq!(media_type(Path::new("reading.wav")), "audio/wav");
        assert_eq!(media_type(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn test_unreadable_input_is_invalid_request() {
        let err = read_input(Path::new("/nonexistent/sahayak/page.png")).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }
}
