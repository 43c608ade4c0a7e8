use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_IDENTITY_LENGTH: usize = 8;
pub const DEFAULT_LEDGER_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SIGNER_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumConfig {
    pub min_identity_length: usize,
    pub ledger_timeout_ms: u64,
    pub signer_timeout_ms: u64,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            min_identity_length: DEFAULT_MIN_IDENTITY_LENGTH,
            ledger_timeout_ms: DEFAULT_LEDGER_TIMEOUT_MS,
            signer_timeout_ms: DEFAULT_SIGNER_TIMEOUT_MS,
        }
    }
}

impl QuorumConfig {
    pub fn ledger_timeout(&self) -> Duration {
        Duration::from_millis(self.ledger_timeout_ms)
    }

    pub fn signer_timeout(&self) -> Duration {
        Duration::from_millis(self.signer_timeout_ms)
    }
}
