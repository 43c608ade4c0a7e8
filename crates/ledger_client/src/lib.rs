//! HTTP client for the external ledger that records signer sets and
//! accepts quorum-approved actions.

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpLedgerClient;
pub use config::LedgerEndpointConfig;
