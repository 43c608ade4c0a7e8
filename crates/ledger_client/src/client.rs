use async_trait::async_trait;
use multisig::LedgerError;
use multisig::traits::LedgerClient;
use multisig::types::{QuorumAction, QuorumProof, SignerSet};
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::LedgerEndpointConfig;
use crate::error::LedgerClientError;

const PERSIST_CONFIG_PATH: &str = "/api/multisig/persist-config";
const SUBMIT_ACTION_PATH: &str = "/api/multisig/submit-action";

#[derive(Serialize, Debug)]
pub struct PersistConfigRequest<'a> {
    pub signer_set: &'a SignerSet,
}

#[derive(Serialize, Debug)]
pub struct SubmitActionRequest<'a> {
    pub action: &'a QuorumAction,
    pub proof: &'a QuorumProof,
}

#[derive(Clone, Debug)]
pub struct HttpLedgerClient {
    config: LedgerEndpointConfig,
    client: Client,
}

impl HttpLedgerClient {
    pub fn new(config: LedgerEndpointConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn send_post_request<T: Serialize>(&self, url: Url, request: &T) -> Result<(), LedgerClientError> {
        debug!("Sending request to URL: {}", url);
        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LedgerClientError::HttpError {
                status,
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    fn get_url(&self, path: &str) -> Result<Url, LedgerClientError> {
        Ok(Url::parse(&format!("{}{}", self.config.address, path))?)
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    #[instrument(skip(self, signer_set), fields(signer_set_id = %signer_set.id), err)]
    async fn persist_config(&self, signer_set: &SignerSet) -> Result<(), LedgerError> {
        let url = self.get_url(PERSIST_CONFIG_PATH)?;
        self.send_post_request(url, &PersistConfigRequest { signer_set })
            .await
            .map_err(LedgerError::from)
    }

    #[instrument(skip(self, action, proof), fields(action_id = %action.id), err)]
    async fn submit_action(&self, action: &QuorumAction, proof: &QuorumProof) -> Result<(), LedgerError> {
        let url = self.get_url(SUBMIT_ACTION_PATH)?;
        self.send_post_request(url, &SubmitActionRequest { action, proof })
            .await
            .map_err(LedgerError::from)
    }
}
