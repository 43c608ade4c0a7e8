use config::ConfigError;
use global_utils::env_parser::EnvParserError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, ConfigParserError>;

#[derive(Debug, Error)]
pub enum ConfigParserError {
    #[error("Failed to merge configuration sources, error: {0}")]
    ConfigMergingError(#[from] ConfigError),
    #[error(transparent)]
    EnvParser(#[from] EnvParserError),
    #[error("Occurred custom error: {0}")]
    Custom(String),
}
