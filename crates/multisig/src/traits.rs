use std::fmt::Debug;

use async_trait::async_trait;

use crate::errors::{LedgerError, SignerError};
use crate::types::{QuorumAction, QuorumProof, SignatureBytes, SignerSet};

/// Wallet side: turns a payload plus identity into a signature.
#[async_trait]
pub trait SignerClient: Debug + Send + Sync {
    async fn sign(&self, identity: &str, payload: &[u8]) -> Result<SignatureBytes, SignerError>;
}

/// Durable record of signer sets and the place fully authorized actions go to.
///
/// Implementations re-validate the proof on their own and may answer
/// [`LedgerError::QuorumRejected`] even if the local check passed.
#[async_trait]
pub trait LedgerClient: Debug + Send + Sync {
    async fn persist_config(&self, signer_set: &SignerSet) -> Result<(), LedgerError>;

    async fn submit_action(&self, action: &QuorumAction, proof: &QuorumProof) -> Result<(), LedgerError>;
}
