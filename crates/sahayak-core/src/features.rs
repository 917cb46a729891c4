//! Dashboard features and their routing table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SahayakError;

/// A screen reachable from the home dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Chat,
    ContentGeneration,
    VisualAids,
    LessonPlanner,
    QuizGenerator,
    WorksheetMaker,
    WorksheetAdapter,
    ReadingAssessment,
}

/// One row of the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub feature: Feature,
    /// Stable tag used by navigation links.
    pub tag: &'static str,
    /// In-app path of the screen.
    pub path: &'static str,
    /// Backend endpoint the screen talks to.
    pub endpoint: &'static str,
    pub title: &'static str,
}

const ROUTES: [Route; 8] = [
    Route {
        feature: Feature::Chat,
        tag: "chat",
        path: "/chat",
        endpoint: "/api/v1/query",
        title: "Ask Sahayak",
    },
    Route {
        feature: Feature::ContentGeneration,
        tag: "content_generation",
        path: "/content",
        endpoint: "/api/v1/generate",
        title: "Content Generator",
    },
    Route {
        feature: Feature::VisualAids,
        tag: "visual_aids",
        path: "/visual-aids",
        endpoint: "/api/v1/visual-aids",
        title: "Visual Aids",
    },
    Route {
        feature: Feature::LessonPlanner,
        tag: "lesson_planner",
        path: "/lesson-plan",
        endpoint: "/api/v1/lesson-plan",
        title: "Lesson Planner",
    },
    Route {
        feature: Feature::QuizGenerator,
        tag: "quiz_generator",
        path: "/quiz",
        endpoint: "/api/v1/generate-quiz",
        title: "Quiz Generator",
    },
    Route {
        feature: Feature::WorksheetMaker,
        tag: "worksheet_maker",
        path: "/worksheet-maker",
        endpoint: "/api/v1/worksheet-maker",
        title: "Worksheet Maker",
    },
    Route {
        feature: Feature::WorksheetAdapter,
        tag: "worksheet_adapter",
        path: "/worksheet-adapter",
        endpoint: "/api/v1/worksheet-adapter",
        title: "Worksheet Adapter",
    },
    Route {
        feature: Feature::ReadingAssessment,
        tag: "reading_assessment",
        path: "/reading-assessment",
        endpoint: "/api/v1/assess-reading",
        title: "Reading Assessment",
    },
];

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Chat,
        Feature::ContentGeneration,
        Feature::VisualAids,
        Feature::LessonPlanner,
        Feature::QuizGenerator,
        Feature::WorksheetMaker,
        Feature::WorksheetAdapter,
        Feature::ReadingAssessment,
    ];

    /// Routing table entry for this feature.
    pub fn route(self) -> &'static Route {
        let index = match self {
            Feature::Chat => 0,
            Feature::ContentGeneration => 1,
            Feature::VisualAids => 2,
            Feature::LessonPlanner => 3,
            Feature::QuizGenerator => 4,
            Feature::WorksheetMaker => 5,
            Feature::WorksheetAdapter => 6,
            Feature::ReadingAssessment => 7,
        };
        &ROUTES[index]
    }

    pub fn tag(self) -> &'static str {
        self.route().tag
    }

    pub fn path(self) -> &'static str {
        self.route().path
    }

    pub fn endpoint(self) -> &'static str {
        self.route().endpoint
    }

    pub fn title(self) -> &'static str {
        self.route().title
    }

    /// Whole table in dashboard order.
    pub fn routes() -> &'static [Route] {
        &ROUTES
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Feature {
    type Err = SahayakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        ROUTES
            .iter()
            .find(|route| route.tag == wanted)
            .map(|route| route.feature)
            .ok_or_else(|| SahayakError::UnknownFeature(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_table_is_consistent() {
        for feature in Feature::ALL {
            assert_eq!(feature.route().feature, feature);
        }
        assert_eq!(Feature::routes().len(), Feature::ALL.len());
    }

    #[test]
    fn test_tags_round_trip() {
        for feature in Feature::ALL {
            let parsed: Feature = feature.tag().parse().unwrap();
            assert_eq!(parsed, feature);
            assert_eq!(feature.to_string(), feature.tag());
        }
    }

    #[test]
    fn test_parse_is_lenient_on_case_and_dashes() {
        assert_eq!("Visual-Aids".parse::<Feature>().unwrap(), Feature::VisualAids);
        assert_eq!(" chat ".parse::<Feature>().unwrap(), Feature::Chat);
    }

    #[test]
    fn test_unknown_tag_is_error() {
        let err = "homework_helper".parse::<Feature>().unwrap_err();
        assert!(matches!(err, SahayakError::UnknownFeature(ref t) if t == "homework_helper"));
        assert!("".parse::<Feature>().is_err());
    }

    #[test]
    fn test_paths_and_endpoints_unique() {
        let mut paths: Vec<_> = Feature::ALL.iter().map(|f| f.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Feature::ALL.len());

        assert_eq!(Feature::Chat.endpoint(), "/api/v1/query");
        assert_eq!(Feature::QuizGenerator.endpoint(), "/api/v1/generate-quiz");
    }

    #[test]
    fn test_serde_uses_tags() {
        let json = serde_json::to_string(&Feature::LessonPlanner).unwrap();
        assert_eq!(json, "\"lesson_planner\"");
    }
}
