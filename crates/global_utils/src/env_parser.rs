use std::{env::VarError, str::FromStr};

use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum EnvParserError {
    #[error("Failed to parse env variable {missing_var_name}, err: {err}, check if it exists and is valid")]
    ConfigEnvParseError { missing_var_name: String, err: VarError },
    #[error("Env variable {var_name} holds invalid value '{value}'")]
    InvalidValue { var_name: String, value: String },
}

pub trait EnvParser {
    const ENV_NAME: &'static str;
    fn obtain_env_value() -> Result<String, EnvParserError> {
        obtain_env_value(Self::ENV_NAME)
    }
}

#[instrument(level = "debug", skip(name), fields(name = name.as_ref()), ret)]
pub fn obtain_env_value(name: impl AsRef<str>) -> Result<String, EnvParserError> {
    std::env::var(name.as_ref()).map_err(|err| EnvParserError::ConfigEnvParseError {
        missing_var_name: name.as_ref().to_string(),
        err,
    })
}

/// Reads env variable `name` and parses it, `None` when the variable is absent.
pub fn parse_optional_env<T: FromStr>(name: impl AsRef<str>) -> Result<Option<T>, EnvParserError> {
    match std::env::var(name.as_ref()) {
        Ok(value) => value.parse::<T>().map(Some).map_err(|_| EnvParserError::InvalidValue {
            var_name: name.as_ref().to_string(),
            value,
        }),
        Err(VarError::NotPresent) => Ok(None),
        Err(err) => Err(EnvParserError::ConfigEnvParseError {
            missing_var_name: name.as_ref().to_string(),
            err,
        }),
    }
}
