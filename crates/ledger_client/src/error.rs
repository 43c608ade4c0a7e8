use multisig::LedgerError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerClientError {
    #[error("Failed to parse URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to send HTTP request: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Ledger answered with status {status}, error: {body}")]
    HttpError { status: StatusCode, body: String },
}

impl From<LedgerClientError> for LedgerError {
    fn from(err: LedgerClientError) -> Self {
        match err {
            LedgerClientError::HttpError { status, body }
                if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY =>
            {
                LedgerError::QuorumRejected(body)
            }
            other => LedgerError::Unavailable(other.to_string()),
        }
    }
}
