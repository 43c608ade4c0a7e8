use std::time::Duration;

use thiserror::Error;

use crate::types::{ActionId, ActionStatus, Identity};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("No signing capability for identity: {0}")]
    Unavailable(Identity),
    #[error("Signer did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger rejected quorum proof: {0}")]
    QuorumRejected(String),
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
    #[error("Ledger did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Already present: {0}")]
    Duplicate(String),
    #[error("Not authorized: {0}")]
    Authorization(String),
    #[error("Action {action_id} is {status}, operation not allowed")]
    State { action_id: ActionId, status: ActionStatus },
    #[error("Action {0} is being submitted to the ledger")]
    SubmissionInFlight(ActionId),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl MultisigError {
    /// Collaborator hiccups are safe to retry, everything else is a caller error.
    pub fn is_retryable(&self) -> bool {
        match self {
            MultisigError::Signer(_) => true,
            MultisigError::Ledger(LedgerError::Unavailable(_) | LedgerError::Timeout(_)) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MultisigError>;
