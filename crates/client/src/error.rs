use reqwest::StatusCode;
use ticketdesk_common::error::TicketdeskError;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },

    #[error("could not decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response has no `{0}` field")]
    MissingField(&'static str),

    #[error("no bearer token, log in first")]
    MissingToken,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            Self::RequestError(e) => e.status(),
            _ => None,
        }
    }
}

impl From<ApiClientError> for TicketdeskError {
    fn from(err: ApiClientError) -> Self {
        let message = err.to_string();
        match &err {
            ApiClientError::HttpError { status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth(message),
                StatusCode::NOT_FOUND => Self::NotFound(message),
                StatusCode::CONFLICT => Self::Conflict(message),
                s if s.is_client_error() => Self::Validation(message),
                _ => Self::Network(message),
            },
            ApiClientError::RequestError(e) if e.is_decode() => Self::Parse(message),
            ApiClientError::RequestError(_) | ApiClientError::MaxRetriesExceeded { .. } => {
                Self::Network(message)
            }
            ApiClientError::Decode { .. } | ApiClientError::MissingField(_) => Self::Parse(message),
            ApiClientError::MissingToken => Self::Auth(message),
            ApiClientError::InvalidUrl(_) => Self::Config(message),
        }
    }
}
