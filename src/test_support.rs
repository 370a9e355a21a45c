//! In-process HTTP stub for unit tests.
//!
//! The stub runs an axum router on its own current-thread runtime in a
//! background thread, so blocking clients under test never execute inside an
//! async context.

use std::net::TcpListener as StdTcpListener;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use serde_json::Value;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// A request as the stub saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    /// `Value::Null` when the request had no body.
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    routes: Arc<Vec<(String, StatusCode, String)>>,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Answers every request with the same status and body.
    pub fn fixed(status: StatusCode, body: &str) -> Self {
        Self::routes(&[("*", status, body)])
    }

    /// Answers by exact path; `*` matches anything. Unmatched paths get 404.
    pub fn routes(routes: &[(&str, StatusCode, &str)]) -> Self {
        let listener = StdTcpListener::bind("127.0.0.1:0").expect("stub bind");
        listener.set_nonblocking(true).expect("stub nonblocking");
        let addr = listener.local_addr().expect("stub local addr");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            routes: Arc::new(
                routes
                    .iter()
                    .map(|(path, status, body)| (path.to_string(), *status, body.to_string()))
                    .collect(),
            ),
            requests: Arc::clone(&requests),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let join = thread::spawn(move || {
            let runtime = Builder::new_current_thread().enable_all().build().expect("stub runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("stub listener");
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `host:port`, the form the harness config takes for the API host.
    pub fn host(&self) -> &str {
        self.base_url.trim_start_matches("http://")
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().expect("stub requests lock").clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.requests.lock().expect("stub requests lock").push(SeenRequest {
        method: method.to_string(),
        path: path.clone(),
        authorization,
        body,
    });

    state
        .routes
        .iter()
        .find(|(route, _, _)| route == "*" || *route == path)
        .map(|(_, status, body)| (*status, body.clone()))
        .unwrap_or((StatusCode::NOT_FOUND, String::new()))
}
