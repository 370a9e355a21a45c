use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::auth::BearerToken;
use crate::config::HarnessConfig;
use crate::http::{ApiRequest, ApiResult, HttpMethod, RestClient};
use crate::shell::{self, CommandOutput};
use crate::storage::ConfigStore;

use super::case::{CaseError, CaseResult};
use super::trace::CommandTrace;

/// What every test context is built from.
#[derive(Debug, Clone, Default)]
pub struct CaseSettings {
    pub token: Option<BearerToken>,
    /// `host[:port]` used by [`CaseContext::api_url`].
    pub api_host: Option<String>,
    pub http_timeout: Option<Duration>,
    /// Holds the configuration file tests read with [`CaseContext::config_store`].
    pub work_dir: PathBuf,
}

impl From<&HarnessConfig> for CaseSettings {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            token: config.token.clone(),
            api_host: config.api_host.clone(),
            http_timeout: config.http_timeout,
            work_dir: config.work_dir.clone(),
        }
    }
}

/// The handle a test body works through.
///
/// Every shell command and API call goes into the test's [`CommandTrace`],
/// which ends up in the terminal output and in the record file.
#[derive(Debug)]
pub struct CaseContext {
    settings: CaseSettings,
    client: RestClient,
    trace: CommandTrace,
}

impl CaseContext {
    pub fn new(settings: CaseSettings) -> crate::error::Result<Self> {
        let client = RestClient::with_read_timeout(settings.token.clone(), settings.http_timeout)?;
        Ok(Self {
            settings,
            client,
            trace: CommandTrace::new(),
        })
    }

    /// Swaps the token used by subsequent calls.
    pub fn set_token(&mut self, token: Option<BearerToken>) -> CaseResult {
        self.client = RestClient::with_read_timeout(token.clone(), self.settings.http_timeout)?;
        self.settings.token = token;
        Ok(())
    }

    /// `http://<host>/api/<path>`.
    pub fn api_url(&self, path: &str) -> Result<String, CaseError> {
        let host = self
            .settings
            .api_host
            .as_deref()
            .ok_or_else(|| CaseError::Other("no API host configured".to_string()))?;
        Ok(format!("http://{host}/api/{}", path.trim_start_matches('/')))
    }

    pub fn get(&mut self, url: &str) -> Result<ApiResult, CaseError> {
        self.call(ApiRequest::get(url).timeout(self.settings.http_timeout))
    }

    pub fn post(&mut self, url: &str, data: Option<Value>) -> Result<ApiResult, CaseError> {
        self.call(ApiRequest::with_body(HttpMethod::Post, url, data))
    }

    /// POST that may take up to `timeout` before the call is abandoned.
    pub fn post_with_timeout(
        &mut self,
        url: &str,
        data: Option<Value>,
        timeout: Duration,
    ) -> Result<ApiResult, CaseError> {
        self.call(ApiRequest::with_body(HttpMethod::Post, url, data).timeout(Some(timeout)))
    }

    pub fn put(&mut self, url: &str, data: Option<Value>) -> Result<ApiResult, CaseError> {
        self.call(ApiRequest::with_body(HttpMethod::Put, url, data))
    }

    pub fn delete(&mut self, url: &str, data: Option<Value>) -> Result<ApiResult, CaseError> {
        self.call(ApiRequest::with_body(HttpMethod::Delete, url, data))
    }

    fn call(&mut self, request: ApiRequest) -> Result<ApiResult, CaseError> {
        self.trace.push(request.describe());
        Ok(self.client.execute(&request)?)
    }

    pub fn run_shell(&mut self, command: &str) -> Result<CommandOutput, CaseError> {
        self.trace.push(command);
        Ok(shell::run(command)?)
    }

    /// Runs `command` and returns what it printed (stdout, else stderr).
    pub fn cmd_print(&mut self, command: &str) -> Result<String, CaseError> {
        self.trace.push(command);
        Ok(shell::run_print(command)?)
    }

    /// Fails the test with the payload when the operation did not succeed.
    pub fn assert_operation_success(&self, result: &ApiResult) -> CaseResult {
        if result.success {
            Ok(())
        } else {
            Err(CaseError::assertion(format!("operation failed: {}", result.payload)))
        }
    }

    pub fn config_store(&self) -> Result<ConfigStore, CaseError> {
        Ok(ConfigStore::in_dir(&self.settings.work_dir)?)
    }

    pub fn trace(&self) -> &CommandTrace {
        &self.trace
    }

    pub(crate) fn into_trace(self) -> CommandTrace {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::test_support::StubServer;

    fn context_for(server: &StubServer) -> CaseContext {
        CaseContext::new(CaseSettings {
            token: BearerToken::new("abc"),
            api_host: Some(server.host().to_string()),
            ..CaseSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn api_calls_are_traced_and_sent_with_token() {
        let server = StubServer::routes(&[
            ("/api/pool", StatusCode::CREATED, r#"{"id": 7}"#),
            ("/api/pool/7", StatusCode::OK, r#"{"name": "rbd"}"#),
        ]);
        let mut ctx = context_for(&server);

        let url = ctx.api_url("pool").unwrap();
        let created = ctx.post(&url, Some(json!({"name": "rbd"}))).unwrap();
        let fetched = ctx.get(&ctx.api_url("/pool/7").unwrap()).unwrap();

        assert_eq!(created.payload, json!({"id": 7}));
        assert_eq!(fetched.payload, json!({"name": "rbd"}));
        assert_eq!(
            ctx.trace().actions(),
            [
                format!("POST {}", server.url("/api/pool")),
                format!("GET {}", server.url("/api/pool/7")),
            ]
        );
        assert!(server
            .requests()
            .iter()
            .all(|seen| seen.authorization.as_deref() == Some("Bearer abc")));
    }

    #[test]
    fn set_token_changes_later_calls() {
        let server = StubServer::fixed(StatusCode::OK, "{}");
        let mut ctx = context_for(&server);

        ctx.set_token(BearerToken::new("xyz")).unwrap();
        ctx.delete(&server.url("/api/x"), None).unwrap();

        assert_eq!(server.requests()[0].authorization.as_deref(), Some("Bearer xyz"));
    }

    #[test]
    fn shell_commands_are_traced() {
        let mut ctx = CaseContext::new(CaseSettings::default()).unwrap();

        let printed = ctx.cmd_print("echo hi").unwrap();
        let output = ctx.run_shell("true").unwrap();

        assert_eq!(printed, "hi\n");
        assert_eq!(output.exit_code, 0);
        assert_eq!(ctx.into_trace().actions(), ["echo hi", "true"]);
    }

    #[test]
    fn api_url_without_host_is_an_error() {
        let ctx = CaseContext::new(CaseSettings::default()).unwrap();
        assert!(matches!(ctx.api_url("x"), Err(CaseError::Other(_))));
    }

    #[test]
    fn operation_success_follows_the_success_flag() {
        let ctx = CaseContext::new(CaseSettings::default()).unwrap();

        let ok = ApiResult {
            success: true,
            payload: json!({}),
        };
        let failed = ApiResult::from_status(500, b"");

        assert!(ctx.assert_operation_success(&ok).is_ok());
        match ctx.assert_operation_success(&failed) {
            Err(CaseError::Assertion(message)) => assert_eq!(message, "operation failed: \"Error\""),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn config_store_lives_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CaseContext::new(CaseSettings {
            work_dir: dir.path().to_path_buf(),
            ..CaseSettings::default()
        })
        .unwrap();

        let store = ctx.config_store().unwrap();
        store.put("cluster", json!({"mon": "10.0.0.1"})).unwrap();

        assert_eq!(store.path(), dir.path().join("configuration.txt"));
        assert_eq!(ctx.config_store().unwrap().get("cluster").unwrap(), Some(json!({"mon": "10.0.0.1"})));
    }
}
