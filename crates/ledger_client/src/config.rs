use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LedgerEndpointConfig {
    /// Base url, request paths are appended as is.
    pub address: String,
}
