//! Loopback HTTP server answering backend requests with canned replies.

use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Reply sent to requests whose request line starts with `prefix`
/// (e.g. `"POST /auth/v1/token"`).
pub(crate) struct Route {
    pub prefix: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub(crate) fn new(prefix: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            prefix,
            status,
            body: body.into(),
        }
    }
}

/// Running fake backend. Requests are recorded in arrival order.
pub(crate) struct FakeBackend {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    pub(crate) async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let routes = Arc::new(routes);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move { serve(stream, &routes, &recorded).await });
            }
        });

        Self { url, requests }
    }

    /// Recorded requests (head and body) in arrival order.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(mut stream: TcpStream, routes: &[Route], recorded: &Mutex<Vec<String>>) {
    let request = read_request(&mut stream).await;
    let route = routes.iter().find(|r| request.starts_with(r.prefix));
    let (status, body) = match route {
        Some(route) => (route.status, route.body.as_str()),
        None => (404, r#"{"message":"no route"}"#),
    };
    recorded.lock().unwrap().push(request);

    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();
}

/// Read the head and a `Content-Length` body.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// Token endpoint reply for `user_id`.
pub(crate) fn token_body(access_token: &str, user_id: &str) -> String {
    format!(
        r#"{{"access_token":"{}","token_type":"bearer","expires_in":3600,"refresh_token":"rt-new","user":{{"id":"{}","email":"dev@example.com"}}}}"#,
        access_token, user_id
    )
}
