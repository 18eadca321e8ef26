use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingIdentifier(&'static str),
    /// Non-2xx responses carry the status; transport and decode failures do not.
    #[error("Lichess API error: {}", remote_detail(.status, .message))]
    Remote {
        status: Option<u16>,
        message: String,
    },
    #[error("failed to build http client: {0}")]
    Client(String),
}

impl ApiError {
    pub fn remote(message: impl Into<String>) -> Self {
        ApiError::Remote {
            status: None,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

fn remote_detail(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => code.to_string(),
        None => message.to_string(),
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Remote {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
