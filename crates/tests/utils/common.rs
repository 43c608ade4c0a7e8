use std::path::Path;
use std::sync::{Arc, LazyLock};

use config_parser::config::AppConfig;
use global_utils::config_variant::ConfigVariant;
use global_utils::logger::{LoggerGuard, init_logger};
use ledger_client::HttpLedgerClient;
use multisig::mocks::MockSignerClient;
use multisig::{ConfigStore, QuorumCoordinator};

use crate::utils::ledger_node::LedgerNode;

pub static TEST_LOGGER: LazyLock<LoggerGuard> = LazyLock::new(init_logger);

pub const ALICE: &str = "0xalice-0000000001";
pub const BOB: &str = "0xbob-00000000000002";
pub const CAROL: &str = "0xcarol-0000000003";

const CONFIG_FOLDER: &str = "../../infrastructure/configuration";

pub struct TestEnv {
    pub node: LedgerNode,
    pub store: Arc<ConfigStore>,
    pub coordinator: Arc<QuorumCoordinator>,
    pub wallet: MockSignerClient,
}

/// Repository configuration pointed at a freshly spawned ledger node.
pub async fn init_env() -> eyre::Result<TestEnv> {
    let node = LedgerNode::spawn().await?;
    let folder = Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FOLDER);
    let mut config = AppConfig::init_config_from_folder(&folder, ConfigVariant::Local)?;
    config.ledger.address = node.address.clone();

    let ledger = Arc::new(HttpLedgerClient::new(config.ledger.clone()));
    let wallet = MockSignerClient::new([ALICE, BOB, CAROL]);
    let store = Arc::new(ConfigStore::new(ledger.clone(), config.quorum.clone()));
    let coordinator = Arc::new(QuorumCoordinator::new(
        store.clone(),
        ledger,
        Arc::new(wallet.clone()),
        config.quorum,
    ));
    Ok(TestEnv {
        node,
        store,
        coordinator,
        wallet,
    })
}
