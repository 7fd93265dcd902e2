use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::Movie;

#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl MockReply {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path_and_query: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

type Responder = Arc<dyn Fn(&str) -> MockReply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process stand-in for the movie catalog, listening on a random port.
pub struct MockCatalog {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockCatalog {
    pub async fn start(reply: MockReply) -> Self {
        Self::with_responder(move |_| reply.clone()).await
    }

    pub async fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str) -> MockReply + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            responder: Arc::new(responder),
            requests: requests.clone(),
        };

        let app = Router::new().fallback(mock_handler).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/3", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn mock_handler(State(state): State<MockState>, uri: Uri, headers: HeaderMap) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        path_and_query: path_and_query.clone(),
        authorization: header_str(header::AUTHORIZATION),
        accept: header_str(header::ACCEPT),
    });

    let reply = (state.responder)(&path_and_query);
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let status = StatusCode::from_u16(reply.status).unwrap();
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

pub fn movie(id: i64, title: &str, poster: Option<&str>) -> Movie {
    let mut value = serde_json::json!({ "id": id, "title": title, "vote_average": 7.5 });
    if let Some(poster) = poster {
        value["poster_path"] = serde_json::Value::String(poster.to_string());
    }
    serde_json::from_value(value).unwrap()
}

pub fn results_body(movies: &[Movie]) -> String {
    serde_json::json!({ "page": 1, "results": movies }).to_string()
}
