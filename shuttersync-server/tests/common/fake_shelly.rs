use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
pub enum Reply {
    Status(Value),
    Error(StatusCode),
    Garbage,
}

struct Inner {
    reply: Reply,
    requests: Vec<RecordedRequest>,
}

/// Shelly roller endpoint served on a random local port.
#[derive(Clone)]
pub struct FakeShelly {
    pub address: SocketAddr,
    inner: Arc<Mutex<Inner>>,
}

impl FakeShelly {
    pub async fn start(status: Value) -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            reply: Reply::Status(status),
            requests: Vec::new(),
        }));

        let app = Router::new()
            .fallback(handle_roller)
            .with_state(inner.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { address, inner }
    }

    pub fn set_reply(&self, reply: Reply) {
        self.inner.lock().unwrap().reply = reply;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

pub fn roller_status(state: &str, current_pos: u8) -> Value {
    json!({
        "state": state,
        "power": 0.0,
        "is_valid": true,
        "safety_switch": false,
        "overtemperature": false,
        "stop_reason": "normal",
        "last_direction": "open",
        "current_pos": current_pos,
        "calibrating": false,
        "positioning": true
    })
}

async fn handle_roller(
    State(inner): State<Arc<Mutex<Inner>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let mut inner = inner.lock().unwrap();
    inner.requests.push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    });

    match &inner.reply {
        Reply::Status(status) => axum::Json(status.clone()).into_response(),
        Reply::Error(code) => (*code, "Bad things happened").into_response(),
        Reply::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
    }
}
