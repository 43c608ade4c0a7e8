use std::sync::{Arc, LazyLock};

use global_utils::logger::{LoggerGuard, init_logger};
use multisig::mocks::{InMemoryLedger, MockSignerClient};
use multisig::traits::LedgerClient;
use multisig::types::{Identity, SignerSet};
use multisig::{ConfigStore, QuorumConfig, QuorumCoordinator};

pub static TEST_LOGGER: LazyLock<LoggerGuard> = LazyLock::new(init_logger);

pub const ALICE: &str = "0xalice-0000000001";
pub const BOB: &str = "0xbob-00000000000002";
pub const CAROL: &str = "0xcarol-0000000003";
pub const DAVE: &str = "0xdave-000000000004";

pub struct TestEnv {
    pub store: Arc<ConfigStore>,
    pub coordinator: Arc<QuorumCoordinator>,
    pub ledger: InMemoryLedger,
    pub wallet: MockSignerClient,
}

pub fn identities(ids: &[&str]) -> Vec<Identity> {
    ids.iter().map(|id| id.to_string()).collect()
}

pub fn signature_of(identity: &str) -> Vec<u8> {
    format!("sig:{identity}").into_bytes()
}

pub fn init_env() -> TestEnv {
    let ledger = InMemoryLedger::default();
    let wallet = MockSignerClient::new([ALICE, BOB, CAROL, DAVE]);
    let (store, coordinator) = build(Arc::new(ledger.clone()), wallet.clone(), QuorumConfig::default());
    TestEnv {
        store,
        coordinator,
        ledger,
        wallet,
    }
}

pub fn build(
    ledger: Arc<dyn LedgerClient>,
    wallet: MockSignerClient,
    config: QuorumConfig,
) -> (Arc<ConfigStore>, Arc<QuorumCoordinator>) {
    let store = Arc::new(ConfigStore::new(ledger.clone(), config.clone()));
    let coordinator = Arc::new(QuorumCoordinator::new(store.clone(), ledger, Arc::new(wallet), config));
    (store, coordinator)
}

/// Saved signer set with the given members and threshold.
pub async fn persisted_set(store: &ConfigStore, members: &[&str], threshold: usize) -> eyre::Result<SignerSet> {
    let set = store.create("treasury", identities(members)).await?;
    store.set_threshold(set.id, threshold).await?;
    Ok(store.save(set.id).await?)
}

/// Draft signer set with the given members and threshold.
pub async fn draft_set(store: &ConfigStore, members: &[&str], threshold: usize) -> eyre::Result<SignerSet> {
    let set = store.create("treasury draft", identities(members)).await?;
    Ok(store.set_threshold(set.id, threshold).await?)
}
