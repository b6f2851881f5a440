use accredo_core::AuthFailure;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthFailure),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request failed: {status} {body}")]
    Status { status: StatusCode, body: String },
    #[error("error decoding response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Network(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
