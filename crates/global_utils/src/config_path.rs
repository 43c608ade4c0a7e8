use crate::env_parser::{EnvParser, EnvParserError, parse_optional_env};

/// Folder holding `base.toml` and the per-variant configuration files.
pub struct ConfigPath {
    pub path: String,
}

impl EnvParser for ConfigPath {
    const ENV_NAME: &'static str = "MULTISIG_CONFIG_PATH";
}

impl ConfigPath {
    /// Reads `MULTISIG_CONFIG_PATH` env
    pub fn from_env() -> Result<Self, EnvParserError> {
        Ok(Self {
            path: ConfigPath::obtain_env_value()?,
        })
    }

    /// Same as [`ConfigPath::from_env`], but an unset variable yields `None`.
    pub fn try_from_env() -> Result<Option<Self>, EnvParserError> {
        Ok(parse_optional_env::<String>(Self::ENV_NAME)?.map(|path| Self { path }))
    }
}
