use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::auth::BearerToken;
use crate::error::Result;

use super::method::HttpMethod;
use super::request::ApiRequest;
use super::response::ApiResult;

/// Blocking REST client for the management API.
///
/// Transport failures (connection refused, timeout) are returned as errors;
/// any response that arrives is mapped through [`ApiResult::from_status`].
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::blocking::Client,
    token: Option<BearerToken>,
    read_timeout: Option<Duration>,
}

impl RestClient {
    pub fn new(token: Option<BearerToken>) -> Result<Self> {
        Self::with_read_timeout(token, None)
    }

    /// `read_timeout` applies to GET; mutating calls carry their own.
    pub fn with_read_timeout(token: Option<BearerToken>, read_timeout: Option<Duration>) -> Result<Self> {
        // reqwest's blocking client times out after 30s unless told otherwise.
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self {
            client,
            token,
            read_timeout,
        })
    }

    pub fn get(&self, url: &str) -> Result<ApiResult> {
        self.execute(&ApiRequest::get(url).timeout(self.read_timeout))
    }

    pub fn post(&self, url: &str, data: Option<Value>) -> Result<ApiResult> {
        self.execute(&ApiRequest::with_body(HttpMethod::Post, url, data))
    }

    pub fn put(&self, url: &str, data: Option<Value>) -> Result<ApiResult> {
        self.execute(&ApiRequest::with_body(HttpMethod::Put, url, data))
    }

    pub fn delete(&self, url: &str, data: Option<Value>) -> Result<ApiResult> {
        self.execute(&ApiRequest::with_body(HttpMethod::Delete, url, data))
    }

    pub fn execute(&self, request: &ApiRequest) -> Result<ApiResult> {
        let mut builder = self.client.request(request.method.into(), &request.url);

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.secret());
        }
        if request.method.sends_body() {
            let body = request.body.clone().unwrap_or_else(|| json!({}));
            builder = builder.json(&body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = builder.send()?;
        let status = response.status().as_u16();
        let bytes = response.bytes()?;
        debug!(method = %request.method, url = %request.url, status, "received response");

        Ok(ApiResult::from_status(status, &bytes))
    }
}
