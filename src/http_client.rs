use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::error::{ApiError, ApiResult};

const USER_AGENT: &str = concat!("chess_terminal/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide client. The timeout of the first call sticks.
pub fn http_client(timeout: Duration) -> ApiResult<&'static Client> {
    CLIENT.get_or_try_init(|| build_http_client(timeout))
}

pub fn build_http_client(timeout: Duration) -> ApiResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| ApiError::Client(err.to_string()))
}
