use serde_json::Value;

/// Payload reported for any non-accepted status; the real body is dropped.
pub const ERROR_PAYLOAD: &str = "Error";

/// `(success, payload)` view of an API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    pub success: bool,
    pub payload: Value,
}

impl ApiResult {
    /// Maps a status and raw body the way every API call is judged:
    /// 200, 201 and 202 succeed with the body decoded as JSON when it parses
    /// (the raw text otherwise); every other status fails with `"Error"`.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        if matches!(status, 200 | 201 | 202) {
            let text = String::from_utf8_lossy(body);
            let payload =
                serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.into_owned()));
            Self {
                success: true,
                payload,
            }
        } else {
            Self {
                success: false,
                payload: Value::String(ERROR_PAYLOAD.to_string()),
            }
        }
    }
}
