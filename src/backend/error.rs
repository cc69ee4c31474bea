//! Errors returned by the hosted backend clients.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a tables or auth call.
///
/// Only the `Display` text is surfaced to the user, as a toast description.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request never produced a response (DNS, TLS, timeout, ...)
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Backend answered with a non-success status
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
    /// No signed-in user for a call that needs one
    #[error("not signed in")]
    NotAuthenticated,
    /// OAuth redirect did not yield an authorization code
    #[error("sign-in was not completed: {0}")]
    OAuth(String),
}

impl BackendError {
    /// Build an API error from a status and the raw response body.
    ///
    /// # Details
    /// The tables API reports `message`, the auth API reports one of
    /// `msg`, `error_description` or `error`. Falls back to the raw body,
    /// then to the status reason.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        BackendError::Api {
            status,
            message: extract_message(body).unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            }),
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(key)?.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_error_message() {
        let body = r#"{"code":"42501","details":null,"hint":null,"message":"permission denied for table snippets"}"#;
        let err = BackendError::from_response(StatusCode::FORBIDDEN, body);
        assert_eq!(err.to_string(), "permission denied for table snippets");
    }

    #[test]
    fn test_auth_error_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let err = BackendError::from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn test_plain_body_and_empty_body() {
        let err = BackendError::from_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "upstream down");

        let err = BackendError::from_response(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "Not Found");
    }
}
