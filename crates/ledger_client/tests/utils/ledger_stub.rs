use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Debug)]
struct StubState {
    status: StatusCode,
    reply: String,
    requests: Vec<(String, Value)>,
}

/// Ledger endpoint answering every request with a configurable status.
#[derive(Clone, Debug)]
pub struct LedgerStub {
    pub address: String,
    state: Arc<Mutex<StubState>>,
}

impl LedgerStub {
    pub async fn spawn() -> eyre::Result<Self> {
        let state = Arc::new(Mutex::new(StubState {
            status: StatusCode::OK,
            reply: String::new(),
            requests: Vec::new(),
        }));
        let router = Router::new()
            .route("/api/multisig/persist-config", post(persist_config))
            .route("/api/multisig/submit-action", post(submit_action))
            .with_state(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let address = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move { axum::serve(listener, router).await });

        Ok(Self { address, state })
    }

    pub async fn respond_with(&self, status: StatusCode, reply: &str) {
        let mut state = self.state.lock().await;
        state.status = status;
        state.reply = reply.to_string();
    }

    /// Received `(path, body)` pairs in arrival order.
    pub async fn requests(&self) -> Vec<(String, Value)> {
        self.state.lock().await.requests.clone()
    }
}

async fn persist_config(State(state): State<Arc<Mutex<StubState>>>, Json(body): Json<Value>) -> (StatusCode, String) {
    record(&state, "/api/multisig/persist-config", body).await
}

async fn submit_action(State(state): State<Arc<Mutex<StubState>>>, Json(body): Json<Value>) -> (StatusCode, String) {
    record(&state, "/api/multisig/submit-action", body).await
}

async fn record(state: &Mutex<StubState>, path: &str, body: Value) -> (StatusCode, String) {
    let mut state = state.lock().await;
    state.requests.push((path.to_string(), body));
    (state.status, state.reply.clone())
}

/// Address nothing listens on.
pub fn closed_address() -> eyre::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let address = format!("http://{}", listener.local_addr()?);
    drop(listener);
    Ok(address)
}
