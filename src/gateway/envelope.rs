use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Decoded `{status, message, ...}` envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success(T),
    NoMore(String),
}

/// Decode a response body. The envelope wins over the HTTP status: the
/// backend reports application errors with 4xx/5xx codes and a JSON body.
pub fn decode<T: DeserializeOwned>(http_status: u16, body: &str) -> ClientResult<Reply<T>> {
    let ok = (200..300).contains(&http_status);

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) if ok => return Err(ClientError::Transport(format!("malformed response: {e}"))),
        Err(_) => {
            return Err(ClientError::Transport(format!(
                "server returned HTTP {http_status}"
            )));
        }
    };

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    match value.get("status").and_then(Value::as_str) {
        Some("success") => serde_json::from_value(value)
            .map(Reply::Success)
            .map_err(|e| ClientError::Transport(format!("malformed response: {e}"))),
        Some("no_more") => Ok(Reply::NoMore(message.unwrap_or_default())),
        Some("error") => Err(ClientError::application(
            message.unwrap_or_else(|| format!("server error (HTTP {http_status})")),
        )),
        Some(other) => Err(ClientError::Transport(format!(
            "unexpected status {other:?} (HTTP {http_status})"
        ))),
        None if ok => Err(ClientError::Transport("response without status".into())),
        None => Err(ClientError::Transport(format!(
            "server returned HTTP {http_status}"
        ))),
    }
}

/// For calls whose only payload is the status itself.
pub fn expect_success<T>(reply: Reply<T>) -> ClientResult<T> {
    match reply {
        Reply::Success(t) => Ok(t),
        Reply::NoMore(msg) => Err(ClientError::Transport(format!(
            "unexpected no_more status: {msg}"
        ))),
    }
}
