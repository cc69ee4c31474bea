//! OAuth sign-in through the system browser.
//!
//! Opens the provider page, waits for the single redirect on a loopback
//! address and exchanges the returned code for a session.

use crate::backend::auth::AuthClient;
use crate::backend::error::BackendError;
use crate::backend::models::Session;
use crate::browser::open_in_browser;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// How long to wait for the browser to come back.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(180);

const CALLBACK_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n\
<html><body><h3>CodeVault</h3><p>You can close this tab and return to the terminal.</p></body></html>";

/// Random PKCE code verifier (64 alphanumeric characters).
pub fn generate_verifier() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Result carried by the redirect request.
#[derive(Debug, PartialEq, Eq)]
pub enum Callback {
    Code(String),
    Denied(String),
}

/// Parse the request line of the redirect, e.g. `GET /callback?code=abc HTTP/1.1`.
pub fn parse_callback(request: &str) -> Option<Callback> {
    let target = request.lines().next()?.split_whitespace().nth(1)?;
    let url = reqwest::Url::parse(&format!("http://localhost{}", target)).ok()?;

    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => return Some(Callback::Code(value.into_owned())),
            "error_description" => error = Some(value.into_owned()),
            "error" if error.is_none() => error = Some(value.into_owned()),
            _ => {}
        }
    }
    error.map(Callback::Denied)
}

/// Run the OAuth flow for `provider`.
///
/// # Arguments
/// * `auth` - Auth client
/// * `provider` - Provider name (e.g. "google")
/// * `redirect_addr` - Loopback address to listen on (e.g. "127.0.0.1:54321")
///
/// # Returns
/// * `Result<Session, BackendError>` - Session for the signed-in user
pub async fn sign_in_with_provider(
    auth: &AuthClient,
    provider: &str,
    redirect_addr: &str,
) -> Result<Session, BackendError> {
    let listener = TcpListener::bind(redirect_addr)
        .await
        .map_err(|e| BackendError::OAuth(format!("cannot listen on {}: {}", redirect_addr, e)))?;

    let verifier = generate_verifier();
    let redirect_to = format!("http://{}/callback", redirect_addr);
    let url = auth.oauth_authorize_url(provider, &redirect_to, &verifier)?;

    tracing::info!(provider, %redirect_to, "opening OAuth sign-in");
    open_in_browser(url.as_str()).map_err(|e| BackendError::OAuth(e.to_string()))?;

    let callback = tokio::time::timeout(CALLBACK_TIMEOUT, accept_callback(&listener))
        .await
        .map_err(|_| BackendError::OAuth("timed out waiting for the browser".to_string()))??;

    match callback {
        Callback::Code(code) => auth.exchange_code(&code, &verifier).await,
        Callback::Denied(reason) => Err(BackendError::OAuth(reason)),
    }
}

async fn accept_callback(listener: &TcpListener) -> Result<Callback, BackendError> {
    loop {
        let (mut stream, peer) = listener
            .accept()
            .await
            .map_err(|e| BackendError::OAuth(e.to_string()))?;

        let mut buf = vec![0u8; 8192];
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| BackendError::OAuth(e.to_string()))?;
        let request = String::from_utf8_lossy(&buf[..n]);

        // Browsers also ask for /favicon.ico; only answer the redirect.
        match parse_callback(&request) {
            Some(callback) => {
                if let Err(e) = stream.write_all(CALLBACK_PAGE.as_bytes()).await {
                    tracing::debug!(%peer, error = %e, "failed to answer the redirect");
                }
                if let Err(e) = stream.shutdown().await {
                    tracing::debug!(%peer, error = %e, "failed to close the redirect connection");
                }
                return Ok(callback);
            }
            None => {
                tracing::debug!(%peer, "ignoring unrelated request on redirect address");
                if let Err(e) = stream
                    .write_all(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n")
                    .await
                {
                    tracing::debug!(%peer, error = %e, "failed to answer unrelated request");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_verifier() {
        let verifier = generate_verifier();
        assert_eq!(verifier.len(), 64);
        assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(verifier, generate_verifier());
    }

    #[test]
    fn test_parse_callback_code() {
        let request = "GET /callback?code=4f2a-b9&state=x HTTP/1.1\r\nHost: 127.0.0.1:54321\r\n\r\n";
        assert_eq!(
            parse_callback(request),
            Some(Callback::Code("4f2a-b9".to_string()))
        );
    }

    #[test]
    fn test_parse_callback_denied() {
        let request = "GET /callback?error=access_denied&error_description=User+cancelled HTTP/1.1\r\n";
        assert_eq!(
            parse_callback(request),
            Some(Callback::Denied("User cancelled".to_string()))
        );
    }

    #[test]
    fn test_parse_callback_unrelated() {
        assert_eq!(parse_callback("GET /favicon.ico HTTP/1.1\r\n"), None);
        assert_eq!(parse_callback(""), None);
    }

    #[tokio::test]
    async fn test_accept_callback_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let mut favicon = tokio::net::TcpStream::connect(addr).await.unwrap();
            favicon
                .write_all(b"GET /favicon.ico HTTP/1.1\r\n\r\n")
                .await
                .unwrap();
            let mut sink = Vec::new();
            favicon.read_to_end(&mut sink).await.unwrap();

            let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /callback?code=xyz HTTP/1.1\r\n\r\n")
                .await
                .unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).await.unwrap();
            reply
        });

        let callback = accept_callback(&listener).await.unwrap();
        assert_eq!(callback, Callback::Code("xyz".to_string()));
        assert!(client.await.unwrap().starts_with("HTTP/1.1 200 OK"));
    }

    #[tokio::test]
    async fn test_accept_callback_after_browser_hangs_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Both connections close without reading the reply.
        let client = tokio::spawn(async move {
            let mut favicon = tokio::net::TcpStream::connect(addr).await.unwrap();
            favicon
                .write_all(b"GET /favicon.ico HTTP/1.1\r\n\r\n")
                .await
                .unwrap();
            drop(favicon);

            let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /callback?error=access_denied HTTP/1.1\r\n\r\n")
                .await
                .unwrap();
        });

        let callback = accept_callback(&listener).await.unwrap();
        assert_eq!(callback, Callback::Denied("access_denied".to_string()));
        client.await.unwrap();
    }
}
