use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error envelope returned by the backend on non-2xx responses
/// (`{"detail": ...}`). `detail` is either a message or a list of
/// validation entries, so it is kept as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Null => "no detail provided".to_string(),
            serde_json::Value::Array(entries) => entries
                .iter()
                .map(|entry| {
                    entry
                        .get("msg")
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| entry.to_string())
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
#[error("backend returned {status}: {message}")]
pub struct ApiException {
    pub status: u16,
    pub message: String,
}

impl ApiException {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Builds the exception from a raw response body, falling back to the
    /// body text when it is not the JSON envelope.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => Self::new(status, parsed.message()),
            Err(_) if body.trim().is_empty() => Self::new(status, "empty response body"),
            Err(_) => Self::new(status, body.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_detail_list_is_flattened() {
        let exc = ApiException::from_body(
            422,
            r#"{"detail":[{"loc":["query","q"],"msg":"field required"},{"msg":"bad limit"}]}"#,
        );
        assert_eq!(exc.status, 422);
        assert_eq!(exc.message, "field required; bad limit");
    }

    #[test]
    fn plain_text_body_is_kept() {
        let exc = ApiException::from_body(502, "upstream down\n");
        assert_eq!(exc.to_string(), "backend returned 502: upstream down");
    }
}
