//! Threshold multi-signature coordination: signer sets, quorum actions and
//! the state machine that drives an action from proposal to execution.
//!
//! Key custody and durable storage stay behind [`traits::SignerClient`] and
//! [`traits::LedgerClient`].

pub mod config;
pub mod config_store;
pub mod coordinator;
pub mod errors;
pub mod mocks;
pub mod traits;
pub mod types;

pub use config::QuorumConfig;
pub use config_store::ConfigStore;
pub use coordinator::QuorumCoordinator;
pub use errors::{LedgerError, MultisigError, SignerError};
