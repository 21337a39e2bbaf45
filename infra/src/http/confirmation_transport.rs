use async_trait::async_trait;
use mv_core::services::confirmation::{ConfirmationTransport, TransportRequest, TransportResponse};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use crate::InfrastructureError;

/// `POST {base}/status` over reqwest.
///
/// Any HTTP status counts as a response; only connect, timeout and body read
/// failures surface as `Err`.
#[derive(Clone)]
pub struct ReqwestConfirmationTransport {
    client: Client,
}

impl ReqwestConfirmationTransport {
    pub fn new() -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .user_agent(concat!("milverify/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ConfirmationTransport for ReqwestConfirmationTransport {
    async fn post_json(&self, request: &TransportRequest) -> Result<TransportResponse, String> {
        debug!(url = %request.url, "Posting confirmation request");

        let response = self
            .client
            .post(&request.url)
            .header("apikey", &request.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(request.timeout)
            .json(&request.body)
            .send()
            .await
            .map_err(describe)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(describe)?;

        Ok(TransportResponse::new(status, body))
    }
}

/// Strip the URL from reqwest errors; it is already in the audit request
fn describe(error: reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_body() || error.is_decode() {
        "response body unreadable"
    } else {
        "request failed"
    };
    format!("{}: {}", kind, error.without_url())
}
