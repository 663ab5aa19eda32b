//! Error types returned by the Surmado client.

use serde_json::Value;

/// Errors that can occur when talking to the Surmado API.
///
/// Every API-level variant keeps the HTTP status code (when one exists) and
/// the parsed response body so callers can inspect what the server sent.
#[derive(Debug, thiserror::Error)]
pub enum SurmadoError {
    /// API key missing, or rejected by the server (401)
    #[error("{message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
        response: Option<Value>,
    },

    /// The account has run out of credits (402)
    #[error("{message}")]
    InsufficientCredits {
        message: String,
        status_code: Option<u16>,
        response: Option<Value>,
    },

    /// Report or brand not found (404)
    #[error("{message}")]
    NotFound {
        message: String,
        status_code: Option<u16>,
        response: Option<Value>,
    },

    /// Request data rejected locally or by the server (422)
    #[error("{message}")]
    Validation {
        message: String,
        status_code: Option<u16>,
        response: Option<Value>,
    },

    /// Any other API failure, including failed, cancelled and timed out reports
    #[error("{message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        response: Option<Value>,
    },

    /// Transport failure from the HTTP client, passed through untouched
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Payload could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SurmadoError {
    /// Authentication error raised before any request is made.
    pub fn missing_api_key() -> Self {
        SurmadoError::Authentication {
            message: "API key required. Set SURMADO_API_KEY environment variable \
                      or pass api_key parameter."
                .to_string(),
            status_code: None,
            response: None,
        }
    }

    /// Locally raised validation error (no request was sent).
    pub fn validation(message: impl Into<String>) -> Self {
        SurmadoError::Validation {
            message: message.into(),
            status_code: None,
            response: None,
        }
    }

    /// Generic error that carries a response body but no status code.
    pub fn api(message: impl Into<String>, response: Value) -> Self {
        SurmadoError::Api {
            message: message.into(),
            status_code: None,
            response: Some(response),
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        match self {
            SurmadoError::Authentication { message, .. }
            | SurmadoError::InsufficientCredits { message, .. }
            | SurmadoError::NotFound { message, .. }
            | SurmadoError::Validation { message, .. }
            | SurmadoError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, if the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SurmadoError::Authentication { status_code, .. }
            | SurmadoError::InsufficientCredits { status_code, .. }
            | SurmadoError::NotFound { status_code, .. }
            | SurmadoError::Validation { status_code, .. }
            | SurmadoError::Api { status_code, .. } => *status_code,
            SurmadoError::Http(err) => err.status().map(|s| s.as_u16()),
            SurmadoError::Serialization(_) => None,
        }
    }

    /// Parsed response body attached to the error.
    pub fn response(&self) -> Option<&Value> {
        match self {
            SurmadoError::Authentication { response, .. }
            | SurmadoError::InsufficientCredits { response, .. }
            | SurmadoError::NotFound { response, .. }
            | SurmadoError::Validation { response, .. }
            | SurmadoError::Api { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    /// Whether this is an insufficient-credits failure.
    pub fn is_insufficient_credits(&self) -> bool {
        matches!(self, SurmadoError::InsufficientCredits { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SurmadoError>;

/// First usable message among `keys`: non-empty strings as-is, other
/// non-null values (e.g. a list of validation details) as compact JSON.
pub(crate) fn field_message(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match data.get(*key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(false) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_api_key_error() {
        let err = SurmadoError::missing_api_key();
        assert!(matches!(err, SurmadoError::Authentication { .. }));
        assert!(err.message().contains("SURMADO_API_KEY"));
        assert_eq!(err.status_code(), None);
        assert!(err.response().is_none());
    }

    #[test]
    fn test_display_is_message() {
        let err = SurmadoError::InsufficientCredits {
            message: "no credits".to_string(),
            status_code: Some(402),
            response: Some(json!({"message": "no credits"})),
        };
        assert_eq!(err.to_string(), "no credits");
        assert_eq!(err.status_code(), Some(402));
        assert_eq!(err.response(), Some(&json!({"message": "no credits"})));
        assert!(err.is_insufficient_credits());
    }

    #[test]
    fn test_api_error_carries_body() {
        let err = SurmadoError::api("Report was cancelled", json!({"status": "cancelled"}));
        assert_eq!(err.message(), "Report was cancelled");
        assert_eq!(err.response().unwrap()["status"], "cancelled");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_field_message() {
        let body = json!({
            "detail": [{"loc": ["body", "email"], "msg": "field required"}],
            "error": "",
            "message": "no credits"
        });
        assert_eq!(field_message(&body, &["message"]).as_deref(), Some("no credits"));
        assert_eq!(
            field_message(&body, &["detail"]).as_deref(),
            Some(r#"[{"loc":["body","email"],"msg":"field required"}]"#)
        );
        assert_eq!(field_message(&body, &["error"]), None);
        assert_eq!(field_message(&json!({"error": null}), &["error"]), None);
    }
}
