use std::time::Duration;

use reqwest::blocking::Client;

use crate::api::{ApiError, ApiResult};

const USER_AGENT: &str = concat!("match_predictor/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client(timeout: Duration) -> ApiResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(ApiError::Client)
}
