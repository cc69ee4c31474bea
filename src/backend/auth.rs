//! Hosted auth API client.
//!
//! Email/password sign-in and sign-up, OAuth (PKCE) URL building and code
//! exchange, token refresh, user lookup and sign-out.

use crate::backend::error::BackendError;
use crate::backend::models::{
    ApiSignUpResponse, ApiTokenResponse, PasswordGrant, PkceGrant, RefreshGrant, Session,
    SignUpMetadata, SignUpRequest, User,
};
use crate::backend::tables::{checked, decode};
use crate::config::Config;
use crate::session::SessionFile;
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Url};
use std::time::Duration;

/// Outcome of a sign-up.
#[derive(Debug)]
pub enum SignUpOutcome {
    /// Account created and signed in
    SignedIn(Session),
    /// Account created; the user has to confirm their email or sign in
    Created,
}

/// Client for the backend's auth endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    /// `<backend_url>/auth/v1`
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    /// Create a new auth client from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Returns
    /// * `Result<AuthClient>` - New client or error
    pub fn new(config: &Config) -> Result<Self> {
        if config.backend_url.is_empty() || config.anon_key.is_empty() {
            return Err(anyhow::anyhow!(
                "Backend URL and anon key are required. Please set them in config.jsonc"
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/auth/v1", config.backend_url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.anon_key)
    }

    async fn token_grant<B: serde::Serialize>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<Session, BackendError> {
        let response = self
            .request(self.client.post(format!("{}/token", self.base_url)))
            .query(&[("grant_type", grant_type)])
            .json(body)
            .send()
            .await?;

        let token: ApiTokenResponse = decode(checked(response).await?).await?;
        Ok(Session::from(token))
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        tracing::info!("password sign-in");
        self.token_grant("password", &PasswordGrant { email, password })
            .await
    }

    /// Create an account.
    ///
    /// # Arguments
    /// * `email` - Account email
    /// * `password` - Account password
    /// * `full_name` - Optional display name stored as user metadata
    ///
    /// # Returns
    /// * `Result<SignUpOutcome, BackendError>` - Signed in directly, or created only
    ///
    /// # Details
    /// When the project requires email confirmation the backend creates the
    /// account without issuing tokens.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError> {
        let body = SignUpRequest {
            email,
            password,
            data: SignUpMetadata { full_name },
        };
        let response = self
            .request(self.client.post(format!("{}/signup", self.base_url)))
            .json(&body)
            .send()
            .await?;

        let created: ApiSignUpResponse = decode(checked(response).await?).await?;
        if let Some(id) = &created.id {
            tracing::info!(user_id = %id, "account created, awaiting confirmation");
        }
        Ok(match created.into_session() {
            Some(session) => SignUpOutcome::SignedIn(session),
            None => SignUpOutcome::Created,
        })
    }

    /// Provider authorization URL for the PKCE flow.
    ///
    /// # Arguments
    /// * `provider` - OAuth provider name (e.g. "google")
    /// * `redirect_to` - Loopback URL receiving the authorization code
    /// * `verifier` - PKCE verifier, sent as a `plain` challenge
    pub fn oauth_authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        verifier: &str,
    ) -> Result<Url, BackendError> {
        Url::parse_with_params(
            &format!("{}/authorize", self.base_url),
            &[
                ("provider", provider),
                ("redirect_to", redirect_to),
                ("code_challenge", verifier),
                ("code_challenge_method", "plain"),
            ],
        )
        .map_err(|e| BackendError::OAuth(e.to_string()))
    }

    /// Exchange an OAuth authorization code for a session.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Result<Session, BackendError> {
        tracing::info!("exchanging OAuth code");
        self.token_grant(
            "pkce",
            &PkceGrant {
                auth_code: code,
                code_verifier: verifier,
            },
        )
        .await
    }

    /// Obtain fresh tokens from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError> {
        tracing::debug!("refreshing session");
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    /// Look up the user owning `access_token`.
    pub async fn user(&self, access_token: &str) -> Result<User, BackendError> {
        let response = self
            .request(self.client.get(format!("{}/user", self.base_url)))
            .bearer_auth(access_token)
            .send()
            .await?;

        decode(checked(response).await?).await
    }

    /// Revoke the session on the backend.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        tracing::info!("signing out");
        let response = self
            .request(self.client.post(format!("{}/logout", self.base_url)))
            .bearer_auth(access_token)
            .send()
            .await?;

        checked(response).await?;
        Ok(())
    }

    /// Current session lookup.
    ///
    /// # Arguments
    /// * `file` - Persisted session location
    ///
    /// # Returns
    /// * `Option<Session>` - Valid session, or None when signed out
    ///
    /// # Details
    /// Loads the persisted session, refreshes it when the access token has
    /// expired and confirms it by fetching the user. A session the backend
    /// rejects is removed from disk.
    pub async fn current_session(&self, file: &SessionFile) -> Option<Session> {
        let stored = match file.load() {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable session file");
                return None;
            }
        };

        let session = if stored.is_expired(Utc::now()) {
            match self.refresh(&stored.refresh_token).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(error = %e, "session refresh failed");
                    discard(file);
                    return None;
                }
            }
        } else {
            stored
        };

        match self.user(&session.access_token).await {
            Ok(user) => {
                let session = Session { user, ..session };
                if let Err(e) = file.save(&session) {
                    tracing::warn!(error = %e, "failed to persist session");
                }
                Some(session)
            }
            Err(BackendError::Api { status, message }) => {
                tracing::warn!(%status, %message, "stored session rejected");
                discard(file);
                None
            }
            Err(e) => {
                // Offline: keep the session, the first table call will report the error.
                tracing::warn!(error = %e, "could not verify session");
                Some(session)
            }
        }
    }
}

fn discard(file: &SessionFile) {
    if let Err(e) = file.clear() {
        tracing::warn!(error = %e, "failed to remove session file");
    }
}
