use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub const APP_CONFIGURATION_NAME: &str = "MULTISIG_ENVIRONMENT";

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigVariant {
    #[strum(serialize = "production")]
    Production,
    #[strum(serialize = "local")]
    Local,
}

impl ConfigVariant {
    #[instrument(level = "trace", ret)]
    pub fn init() -> ConfigVariant {
        let raw = std::env::var(APP_CONFIGURATION_NAME).ok();
        info!("{APP_CONFIGURATION_NAME}: {:?}", raw);
        Self::from_raw(raw.as_deref())
    }

    fn from_raw(raw: Option<&str>) -> ConfigVariant {
        match raw {
            Some(x) if x == ConfigVariant::Production.to_string() => ConfigVariant::Production,
            _ => ConfigVariant::Local,
        }
    }
}
