use std::time::Duration;

use serde_json::Value;

use super::method::HttpMethod;

/// Default per-request timeout for mutating calls.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_body(method: HttpMethod, url: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            url: url.into(),
            body,
            timeout: Some(DEFAULT_WRITE_TIMEOUT),
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The line recorded in a test's command trace, e.g. `POST http://h/api/pool`.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_is_method_and_url() {
        let request = ApiRequest::with_body(HttpMethod::Put, "http://h/api/x", None);
        assert_eq!(request.describe(), "PUT http://h/api/x");
    }

    #[test]
    fn writes_default_to_sixty_seconds_and_reads_to_none() {
        assert_eq!(
            ApiRequest::with_body(HttpMethod::Post, "u", None).timeout,
            Some(DEFAULT_WRITE_TIMEOUT)
        );
        assert_eq!(ApiRequest::get("u").timeout, None);
    }
}
