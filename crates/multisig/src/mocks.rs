use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::{LedgerError, SignerError};
use crate::traits::{LedgerClient, SignerClient};
use crate::types::*;

#[derive(Debug)]
struct LedgerState {
    available: bool,
    reject_quorum: bool,
    latency: Option<Duration>,
    configs: BTreeMap<SignerSetId, SignerSet>,
    persisted: Vec<SignerSet>,
    submitted: Vec<(QuorumAction, QuorumProof)>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            available: true,
            reject_quorum: false,
            latency: None,
            configs: BTreeMap::new(),
            persisted: Vec::new(),
            submitted: Vec::new(),
        }
    }
}

/// Ledger kept in memory. Like a real ledger it re-checks submitted proofs
/// against the last signer set version it recorded.
#[derive(Default, Debug, Clone)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    pub async fn set_available(&self, available: bool) {
        self.state.lock().await.available = available;
    }

    /// Makes every submission fail with [`LedgerError::QuorumRejected`].
    pub async fn set_reject_quorum(&self, reject: bool) {
        self.state.lock().await.reject_quorum = reject;
    }

    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().await.latency = latency;
    }

    /// Every acknowledged `persist_config` call in arrival order.
    pub async fn persisted_configs(&self) -> Vec<SignerSet> {
        self.state.lock().await.persisted.clone()
    }

    pub async fn submitted_actions(&self) -> Vec<(QuorumAction, QuorumProof)> {
        self.state.lock().await.submitted.clone()
    }

    async fn wait_latency(&self) {
        let latency = self.state.lock().await.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn persist_config(&self, signer_set: &SignerSet) -> Result<(), LedgerError> {
        self.wait_latency().await;
        let mut state = self.state.lock().await;
        if !state.available {
            return Err(LedgerError::Unavailable("in-memory ledger is offline".to_string()));
        }
        state.configs.insert(signer_set.id, signer_set.clone());
        state.persisted.push(signer_set.clone());
        Ok(())
    }

    async fn submit_action(&self, action: &QuorumAction, proof: &QuorumProof) -> Result<(), LedgerError> {
        self.wait_latency().await;
        let mut state = self.state.lock().await;
        if !state.available {
            return Err(LedgerError::Unavailable("in-memory ledger is offline".to_string()));
        }
        if state.reject_quorum {
            return Err(LedgerError::QuorumRejected("ledger policy rejected the proof".to_string()));
        }
        if let Some(recorded) = state.configs.get(&action.signer_set_id) {
            let approvals = proof.distinct_member_signers(recorded);
            let required = recorded.required_approvals(action.approval_rule);
            if approvals < required {
                return Err(LedgerError::QuorumRejected(format!(
                    "{approvals} approvals recorded, ledger requires {required}"
                )));
            }
        }
        state.submitted.push((action.clone(), proof.clone()));
        Ok(())
    }
}

/// Wallet that can sign for a fixed set of identities.
#[derive(Default, Debug, Clone)]
pub struct MockSignerClient {
    identities: Arc<Mutex<BTreeSet<Identity>>>,
}

impl MockSignerClient {
    pub fn new(identities: impl IntoIterator<Item = impl Into<Identity>>) -> Self {
        Self {
            identities: Arc::new(Mutex::new(identities.into_iter().map(Into::into).collect())),
        }
    }

    pub async fn revoke(&self, identity: &str) {
        self.identities.lock().await.remove(identity);
    }

    /// Deterministic stand-in for a real signature.
    pub fn expected_signature(identity: &str, payload: &[u8]) -> SignatureBytes {
        format!("{identity}:{}", hex::encode(payload)).into_bytes()
    }
}

#[async_trait]
impl SignerClient for MockSignerClient {
    async fn sign(&self, identity: &str, payload: &[u8]) -> Result<SignatureBytes, SignerError> {
        if !self.identities.lock().await.contains(identity) {
            return Err(SignerError::Unavailable(identity.to_string()));
        }
        Ok(Self::expected_signature(identity, payload))
    }
}
