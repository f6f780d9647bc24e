#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use household_bridge::ResourceConfig;
use serde_json::Value;
use tokio::net::TcpListener;

pub const REFRESH_PATH: &str = "/api/auth/token/refresh/";

/// How the fake resource server answers one path.
#[derive(Clone)]
pub enum Reply {
    /// Always answer with this status and body.
    Fixed(u16, Value),
    /// 200 with the body if the bearer token matches, otherwise 401.
    RequireToken(&'static str, Value),
}

/// One request seen by the fake server.
#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub authorization: Option<String>,
    pub scope: Option<String>,
    pub cache_control: Option<String>,
    pub body: Bytes,
}

#[derive(Default)]
struct FakeState {
    replies: HashMap<String, Reply>,
    hits: Mutex<Vec<Hit>>,
}

pub struct FakeServer {
    pub addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeServer {
    pub async fn start(replies: Vec<(&str, Reply)>) -> Self {
        let state = Arc::new(FakeState {
            replies: replies
                .into_iter()
                .map(|(path, reply)| (path.to_string(), reply))
                .collect(),
            hits: Mutex::new(Vec::new()),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn config(&self) -> ResourceConfig {
        ResourceConfig::new(format!("http://{}", self.addr).parse().unwrap())
    }

    pub fn hits(&self, path: &str) -> Vec<Hit> {
        self.state
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.path == path)
            .cloned()
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let hit = Hit {
        path: uri.path().to_string(),
        authorization: header("authorization"),
        scope: header("x-household-id"),
        cache_control: header("cache-control"),
        body,
    };
    let authorization = hit.authorization.clone();
    state.hits.lock().unwrap().push(hit);

    match state.replies.get(uri.path()) {
        Some(Reply::Fixed(status, body)) => {
            (StatusCode::from_u16(*status).unwrap(), axum::Json(body.clone())).into_response()
        }
        Some(Reply::RequireToken(token, body)) => {
            if authorization.as_deref() == Some(format!("Bearer {token}").as_str()) {
                axum::Json(body.clone()).into_response()
            } else {
                StatusCode::UNAUTHORIZED.into_response()
            }
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
