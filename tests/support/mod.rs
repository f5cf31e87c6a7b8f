//! In-process DataSnap stand-in.
//!
//! Serves canned bodies keyed by the request path below [`URL_PATH`] and
//! records every request it sees. Paths are matched on their raw,
//! still-percent-encoded form.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use radsnap::ConnectionConfig;

pub const URL_PATH: &str = "datasnap/rest/TServerClass";
pub const UNKNOWN_METHOD_BODY: &str = r#"{"error":"unknown method"}"#;

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<HashMap<String, String>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    /// Start a server answering `path -> body`; paths are given without the base URL.
    pub fn start(replies: &[(&str, &str)]) -> Self {
        let state = MockState {
            replies: Arc::new(
                replies
                    .iter()
                    .map(|(path, body)| (path.to_string(), body.to_string()))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = Arc::clone(&state.requests);

        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = std_listener.local_addr().expect("mock server address");
        std_listener
            .set_nonblocking(true)
            .expect("nonblocking listener");

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock server runtime");
            rt.block_on(async {
                let listener =
                    tokio::net::TcpListener::from_std(std_listener).expect("tokio listener");
                let app = Router::new().fallback(reply).with_state(state);
                axum::serve(listener, app).await
            })
            .expect("mock server runs");
        });

        Self { addr, requests }
    }

    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new("127.0.0.1", self.addr.port(), URL_PATH)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("request log").clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|req| req.path).collect()
    }

    pub fn last(&self) -> Recorded {
        self.requests()
            .pop()
            .expect("at least one request was recorded")
    }
}

async fn reply(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let prefix = format!("/{URL_PATH}/");
    let path = uri.path().strip_prefix(&prefix).unwrap_or(uri.path()).to_string();

    state.requests.lock().expect("request log").push(Recorded {
        method,
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
    });

    match state.replies.get(&path) {
        Some(body) => (StatusCode::OK, body.clone()),
        None => (StatusCode::NOT_FOUND, UNKNOWN_METHOD_BODY.to_string()),
    }
}

/// A port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let port = listener.local_addr().expect("probe address").port();
    drop(listener);
    port
}
