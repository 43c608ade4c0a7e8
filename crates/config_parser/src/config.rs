use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use global_utils::config_path::ConfigPath;
use global_utils::config_variant::ConfigVariant;
use ledger_client::LedgerEndpointConfig;
use multisig::QuorumConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::error::{ConfigParserError, Result};

const CONFIG_FOLDER_NAME: &str = "../../infrastructure/configuration";
const PRODUCTION_CONFIG_FOLDER: &str = "/configuration_multisig";
const DEFAULT_APP_LOCAL_BASE_FILENAME: &str = "base.toml";
const ENV_PREFIX: &str = "MULTISIG";
const ENV_SEPARATOR: &str = "__";

/// Configuration of the whole coordinator.
///
/// Sources are merged in order: `base.toml`, `<variant>.toml`, then
/// `MULTISIG__<SECTION>__<KEY>` environment variables.
///
/// ```rust,no_run
/// use config_parser::config::AppConfig;
/// use global_utils::config_variant::ConfigVariant;
/// let config = AppConfig::init_config(ConfigVariant::Local);
/// assert!(config.is_ok())
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub quorum: QuorumConfig,
    pub ledger: LedgerEndpointConfig,
}

impl AppConfig {
    #[instrument(level = "debug", ret)]
    pub fn init_config(config_variant: ConfigVariant) -> Result<Self> {
        trace!("Initializing, {config_variant}...");
        let folder = match ConfigPath::try_from_env()? {
            Some(config_path) => PathBuf::from(config_path.path),
            None => default_config_folder(config_variant),
        };
        Self::init_config_from_folder(&folder, config_variant)
    }

    #[instrument(level = "debug", ret)]
    pub fn init_config_from_folder(folder: &Path, config_variant: ConfigVariant) -> Result<Self> {
        debug!("Configuration folder lookup path: {}", folder.display());
        let (path_to_base, path_to_variant) = (
            folder.join(DEFAULT_APP_LOCAL_BASE_FILENAME),
            folder.join(format!("{config_variant}.toml")),
        );
        trace!(
            "Paths to resolve: path_to_base: '{}', path_to_variant: '{}'",
            path_to_base.display(),
            path_to_variant.display()
        );

        let app_config = Config::builder()
            .add_source(File::from(path_to_base))
            .add_source(File::from(path_to_variant).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<AppConfig>()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<()> {
        if self.ledger.address.trim().is_empty() {
            return Err(ConfigParserError::Custom("ledger.address is empty".to_string()));
        }
        if self.quorum.ledger_timeout_ms == 0 || self.quorum.signer_timeout_ms == 0 {
            return Err(ConfigParserError::Custom(
                "quorum timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_folder(config_variant: ConfigVariant) -> PathBuf {
    match config_variant {
        ConfigVariant::Production => PathBuf::from(PRODUCTION_CONFIG_FOLDER),
        ConfigVariant::Local => {
            if let Err(err) = dotenvy::dotenv() {
                debug!("No .env file loaded: {err}");
            }
            Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FOLDER_NAME)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_configuration_loads_from_repository() {
        let folder = default_config_folder(ConfigVariant::Local);
        let config = AppConfig::init_config_from_folder(&folder, ConfigVariant::Local).unwrap();
        assert_eq!(config.quorum.min_identity_length, 8);
        assert!(config.ledger.address.starts_with("http://"));
    }

    #[test]
    fn production_overrides_base_values() {
        let folder = default_config_folder(ConfigVariant::Local);
        let config = AppConfig::init_config_from_folder(&folder, ConfigVariant::Production).unwrap();
        assert_eq!(config.quorum.ledger_timeout_ms, 5_000);
        assert!(config.ledger.address.starts_with("https://"));
    }
}
