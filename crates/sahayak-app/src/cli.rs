//! CLI argument definitions for the Sahayak application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sahayak_client::ContentType;

/// Sahayak, an AI teaching assistant for the terminal.
#[derive(Parser, Debug)]
#[command(name = "sahayak", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Backend base URL.
    #[arg(short = 'b', long = "backend-url")]
    pub backend_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Language tag for questions and generated content.
    #[arg(long = "language")]
    pub language: Option<String>,

    /// Answer from a local echo service instead of the backend.
    #[arg(long = "offline")]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat with the assistant (default).
    Chat,
    /// List dashboard features and their routes.
    Features,
    #[command(flatten)]
    Backend(BackendCommand),
}

/// Subcommands that make a single backend call.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Check that the backend is reachable.
    Health,
    /// Generate a story, explanation, lesson or activity.
    Generate {
        #[arg(long = "type", value_parser = parse_content_type, default_value = "story")]
        content_type: ContentType,
        #[arg(long)]
        topic: String,
        #[arg(long)]
        grade_level: Option<String>,
    },
    /// Generate a quiz.
    Quiz {
        #[arg(long)]
        topic: String,
        #[arg(long, default_value_t = 10)]
        questions: u32,
    },
    /// Generate a diagram for a concept.
    VisualAid {
        #[arg(long)]
        concept: String,
        #[arg(long, default_value = "simple")]
        diagram_type: String,
    },
    /// Generate a lesson plan.
    LessonPlan {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long, default_value = "week")]
        duration: String,
    },
    /// Generate a worksheet on a topic.
    Worksheet {
        #[arg(long)]
        topic: String,
        #[arg(long, default_value = "general")]
        subject: String,
        #[arg(long = "type", default_value = "mixed")]
        worksheet_type: String,
    },
    /// Turn a photographed textbook page into grade-level worksheets.
    AdaptWorksheet {
        /// Image file (png, jpg, webp or gif).
        #[arg(long)]
        image: PathBuf,
        /// Target grade levels, repeatable.
        #[arg(long = "grade")]
        grades: Vec<String>,
        #[arg(long, default_value = "general")]
        subject: String,
    },
    /// Assess a recording of a student reading aloud.
    AssessReading {
        /// Audio file (wav, mp3, ogg, webm or m4a).
        #[arg(long)]
        audio: PathBuf,
        /// Passage the student was reading.
        #[arg(long)]
        expected_text: Option<String>,
        #[arg(long)]
        grade_level: Option<String>,
    },
}

fn parse_content_type(s: &str) -> Result<ContentType, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "story" => Ok(ContentType::Story),
        "explanation" => Ok(ContentType::Explanation),
        "lesson" => Ok(ContentType::Lesson),
        "activity" => Ok(ContentType::Activity),
        other => Err(format!(
            "unknown content type '{other}' (expected story, explanation, lesson or activity)"
        )),
    }
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SAHAYAK_CONFIG env var > ~/.sahayak/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SAHAYAK_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --backend-url flag > SAHAYAK_BACKEND_URL env var > config file value.
    pub fn resolve_backend_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.backend_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("SAHAYAK_BACKEND_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }
        config_url.to_string()
    }

    /// Resolve the log filter directive.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_filter(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                return filter;
            }
        }
        config_level.to_string()
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".sahayak").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".sahayak").join("config.toml");
    }
    PathBuf::from("config.toml")
}
