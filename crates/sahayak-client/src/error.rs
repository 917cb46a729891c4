//! Error types for backend calls.

use std::fmt;

use serde::Serialize;

/// Errors from the backend client.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// Coarse category of a failed call, kept for logging and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Transport,
    Status,
    MalformedResponse,
    InvalidRequest,
    Configuration,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
            FailureKind::Status => "status",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::Configuration => "configuration",
        };
        f.write_str(s)
    }
}

impl ServiceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ServiceError::Timeout(_) => FailureKind::Timeout,
            ServiceError::Connect(_) | ServiceError::Transport(_) => FailureKind::Transport,
            ServiceError::Status { .. } => FailureKind::Status,
            ServiceError::MalformedResponse(_) => FailureKind::MalformedResponse,
            ServiceError::InvalidRequest(_) => FailureKind::InvalidRequest,
            ServiceError::ClientBuild(_) => FailureKind::Configuration,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(err.to_string())
        } else if err.is_connect() {
            ServiceError::Connect(err.to_string())
        } else if err.is_decode() {
            ServiceError::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            ServiceError::InvalidRequest(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned status 500: boom");

        let err = ServiceError::Timeout("after 60s".to_string());
        assert_eq!(err.to_string(), "request timed out: after 60s");

        let err = ServiceError::InvalidRequest("topic is required".to_string());
        assert_eq!(err.to_string(), "invalid request: topic is required");
    }

    #[test]
    fn test_kind_mapping() {
        let cases = vec![
            (ServiceError::Timeout(String::new()), FailureKind::Timeout),
            (ServiceError::Connect(String::new()), FailureKind::Transport),
            (ServiceError::Transport(String::new()), FailureKind::Transport),
            (
                ServiceError::Status {
                    status: 404,
                    body: String::new(),
                },
                FailureKind::Status,
            ),
            (
                ServiceError::MalformedResponse(String::new()),
                FailureKind::MalformedResponse,
            ),
            (
                ServiceError::InvalidRequest(String::new()),
                FailureKind::InvalidRequest,
            ),
            (
                ServiceError::ClientBuild(String::new()),
                FailureKind::Configuration,
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn test_failure_kind_display_matches_serde() {
        for kind in [
            FailureKind::Timeout,
            FailureKind::Transport,
            FailureKind::Status,
            FailureKind::MalformedResponse,
            FailureKind::InvalidRequest,
            FailureKind::Configuration,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_from_serde_json_is_malformed() {
        let err: ServiceError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }
}
