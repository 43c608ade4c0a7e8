use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use multisig::types::{QuorumAction, QuorumProof, SignerSet, SignerSetId};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Default)]
struct NodeState {
    offline: bool,
    /// Extra approvals demanded on top of the recorded signer set rule.
    stricter_policy: usize,
    configs: HashMap<SignerSetId, SignerSet>,
    executed: Vec<QuorumAction>,
}

type SharedState = Arc<Mutex<NodeState>>;

#[derive(Deserialize)]
struct PersistConfigBody {
    signer_set: SignerSet,
}

#[derive(Deserialize)]
struct SubmitActionBody {
    action: QuorumAction,
    proof: QuorumProof,
}

/// Ledger service that records signer sets and verifies quorum proofs
/// against the last recorded version of the set.
#[derive(Clone, Debug)]
pub struct LedgerNode {
    pub address: String,
    state: SharedState,
}

impl LedgerNode {
    pub async fn spawn() -> eyre::Result<Self> {
        let state = SharedState::default();
        let router = Router::new()
            .route("/api/multisig/persist-config", post(persist_config))
            .route("/api/multisig/submit-action", post(submit_action))
            .with_state(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let address = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move { axum::serve(listener, router).await });
        info!("Ledger node listening on {address}");

        Ok(Self { address, state })
    }

    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    pub async fn set_stricter_policy(&self, extra_approvals: usize) {
        self.state.lock().await.stricter_policy = extra_approvals;
    }

    pub async fn recorded_config(&self, signer_set_id: SignerSetId) -> Option<SignerSet> {
        self.state.lock().await.configs.get(&signer_set_id).cloned()
    }

    pub async fn executed_actions(&self) -> Vec<QuorumAction> {
        self.state.lock().await.executed.clone()
    }
}

async fn persist_config(State(state): State<SharedState>, Json(body): Json<PersistConfigBody>) -> (StatusCode, String) {
    let mut state = state.lock().await;
    if state.offline {
        return (StatusCode::SERVICE_UNAVAILABLE, "ledger node is offline".to_string());
    }
    state.configs.insert(body.signer_set.id, body.signer_set);
    (StatusCode::OK, String::new())
}

async fn submit_action(State(state): State<SharedState>, Json(body): Json<SubmitActionBody>) -> (StatusCode, String) {
    let mut state = state.lock().await;
    if state.offline {
        return (StatusCode::SERVICE_UNAVAILABLE, "ledger node is offline".to_string());
    }
    let Some(recorded) = state.configs.get(&body.action.signer_set_id) else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "signer set was never persisted".to_string());
    };

    let approvals = body.proof.distinct_member_signers(recorded);
    let required = recorded.required_approvals(body.action.approval_rule) + state.stricter_policy;
    if approvals < required {
        return (
            StatusCode::CONFLICT,
            format!("{approvals} approvals, ledger policy requires {required}"),
        );
    }
    state.executed.push(body.action);
    (StatusCode::OK, String::new())
}
