use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session missing or expired")]
    Unauthorized { message: Option<String> },

    #[error("Request rejected ({status}): {body}")]
    Validation {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Resource not found: {body}")]
    NotFound { message: Option<String>, body: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited { message: Option<String> },

    #[error("Server error ({status}): {body}")]
    Server {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shapes the backend produces: `{"error": "..."}`,
/// `{"error": ["...", "..."]}` from password validation, or DRF's `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorField>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    One(String),
    Many(Vec<String>),
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable message out of a JSON error body, if any.
    pub fn extract_message(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        let message = match parsed.error {
            Some(ErrorField::One(msg)) => Some(msg),
            Some(ErrorField::Many(msgs)) if !msgs.is_empty() => Some(msgs.join(" ")),
            _ => None,
        };
        message.or(parsed.detail).filter(|m| !m.is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            404 => ApiError::NotFound {
                message,
                body: truncated,
            },
            429 => ApiError::RateLimited { message },
            code @ 400..=499 => ApiError::Validation {
                status: code,
                message,
                body: truncated,
            },
            code @ 500..=599 => ApiError::Server {
                status: code,
                message,
                body: truncated,
            },
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// The message the server supplied in its error body, if it sent one.
    /// Network failures and malformed responses never carry one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::RateLimited { message }
            | ApiError::NotFound { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::Server { message, .. } => message.as_deref(),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// The server answered and refused the request. Rate limiting, server
    /// faults and transport failures are not rejections; retrying may succeed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { .. } | ApiError::Validation { .. } | ApiError::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_extract_message_string() {
        let body = r#"{"error": "Invalid username or password"}"#;
        assert_eq!(
            ApiError::extract_message(body).as_deref(),
            Some("Invalid username or password")
        );
    }

    #[test]
    fn test_extract_message_list_is_joined() {
        let body = r#"{"error": ["This password is too short.", "Password must contain at least one number."]}"#;
        assert_eq!(
            ApiError::extract_message(body).as_deref(),
            Some("This password is too short. Password must contain at least one number.")
        );
    }

    #[test]
    fn test_extract_message_detail_fallback() {
        let body = r#"{"detail": "Authentication credentials were not provided."}"#;
        assert_eq!(
            ApiError::extract_message(body).as_deref(),
            Some("Authentication credentials were not provided.")
        );
    }

    #[test]
    fn test_extract_message_none() {
        assert_eq!(ApiError::extract_message(""), None);
        assert_eq!(ApiError::extract_message("<html>Bad Gateway</html>"), None);
        assert_eq!(ApiError::extract_message(r#"{"message": "ok"}"#), None);
        assert_eq!(ApiError::extract_message(r#"{"error": ""}"#), None);
        assert_eq!(ApiError::extract_message(r#"{"error": []}"#), None);
    }

    #[test]
    fn test_from_status_classification() {
        let body = r#"{"error":"Invalid credentials"}"#;
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, body);
        assert!(err.is_unauthorized());
        assert_eq!(err.server_message(), Some("Invalid credentials"));

        let body = r#"{"error":"Email already registered"}"#;
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, ApiError::Validation { status: 400, .. }));
        assert_eq!(err.server_message(), Some("Email already registered"));

        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error":"Todo not found"}"#);
        assert!(matches!(err, ApiError::NotFound { .. }));

        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, ApiError::RateLimited { message: None }));

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
        assert_eq!(err.server_message(), None);

        let err = ApiError::from_status(StatusCode::MOVED_PERMANENTLY, "");
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_is_rejection() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_rejection());
        assert!(ApiError::from_status(StatusCode::BAD_REQUEST, "").is_rejection());
        assert!(ApiError::from_status(StatusCode::NOT_FOUND, "").is_rejection());
        assert!(!ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "").is_rejection());
        assert!(!ApiError::from_status(StatusCode::BAD_GATEWAY, "").is_rejection());
        assert!(!ApiError::InvalidResponse("garbled".into()).is_rejection());
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("520 total bytes"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
