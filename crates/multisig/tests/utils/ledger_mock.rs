use std::fmt;

use async_trait::async_trait;
use mockall::mock;
use multisig::LedgerError;
use multisig::traits::LedgerClient;
use multisig::types::{QuorumAction, QuorumProof, SignerSet};

mock! {
    pub Ledger {}

    #[async_trait]
    impl LedgerClient for Ledger {
        async fn persist_config(&self, signer_set: &SignerSet) -> Result<(), LedgerError>;
        async fn submit_action(&self, action: &QuorumAction, proof: &QuorumProof) -> Result<(), LedgerError>;
    }
}

impl fmt::Debug for MockLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockLedger").finish_non_exhaustive()
    }
}
