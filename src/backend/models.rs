//! Auth API models and data structures.
//!
//! Contains request bodies and responses of the hosted auth endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Signed-in user identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Backend user ID, also the `user_id` column of owned snippets
    pub id: String,
    /// Account email (absent for some OAuth providers)
    #[serde(default)]
    pub email: Option<String>,
}

/// Token response of the auth endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiTokenResponse {
    /// Bearer token for API calls
    pub access_token: String,
    /// Token used to obtain a fresh access token
    pub refresh_token: String,
    /// Lifetime of `access_token` in seconds
    pub expires_in: i64,
    /// User the tokens belong to
    pub user: User,
}

/// Sign-up response. Carries tokens only when email confirmation is off.
#[derive(Debug, Deserialize)]
pub struct ApiSignUpResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Present when a session was issued
    #[serde(default)]
    pub user: Option<User>,
    /// Present (flattened user) when only the account was created
    #[serde(default)]
    pub id: Option<String>,
}

/// Password grant body.
#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Sign-up body.
#[derive(Debug, Serialize)]
pub struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: SignUpMetadata<'a>,
}

/// Profile metadata stored with a new account.
#[derive(Debug, Serialize)]
pub struct SignUpMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<&'a str>,
}

/// Refresh grant body.
#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// PKCE grant body.
#[derive(Debug, Serialize)]
pub struct PkceGrant<'a> {
    pub auth_code: &'a str,
    pub code_verifier: &'a str,
}

/// Authenticated session as kept by the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of `access_token`
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    /// Whether the access token expires within the next minute.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(60) <= now
    }
}

impl From<ApiTokenResponse> for Session {
    fn from(response: ApiTokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
            user: response.user,
        }
    }
}

impl ApiSignUpResponse {
    /// Session issued with the sign-up, if any.
    pub fn into_session(self) -> Option<Session> {
        Some(Session {
            access_token: self.access_token?,
            refresh_token: self.refresh_token?,
            expires_at: Utc::now() + Duration::seconds(self.expires_in.unwrap_or(3600)),
            user: self.user?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_into_session() {
        let json = r#"{
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "user": { "id": "u-1", "email": "dev@example.com", "aud": "authenticated" }
        }"#;
        let response: ApiTokenResponse = serde_json::from_str(json).unwrap();
        let session = Session::from(response);
        assert_eq!(session.user.id, "u-1");
        assert!(!session.is_expired(Utc::now()));
        assert!(session.is_expired(Utc::now() + Duration::seconds(3600)));
    }

    #[test]
    fn test_sign_up_without_session() {
        let json = r#"{ "id": "u-2", "email": "new@example.com", "confirmation_sent_at": "2024-01-01T00:00:00Z" }"#;
        let response: ApiSignUpResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id.as_deref(), Some("u-2"));
        assert!(response.into_session().is_none());
    }

    #[test]
    fn test_sign_up_with_session() {
        let json = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 60,
            "user": { "id": "u-3", "email": "x@example.com" }
        }"#;
        let response: ApiSignUpResponse = serde_json::from_str(json).unwrap();
        let session = response.into_session().unwrap();
        assert_eq!(session.user.id, "u-3");
    }

    #[test]
    fn test_sign_up_body_omits_missing_name() {
        let body = SignUpRequest {
            email: "a@b.co",
            password: "secret1",
            data: SignUpMetadata { full_name: None },
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["data"], serde_json::json!({}));
    }
}
