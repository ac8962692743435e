//! Client error taxonomy.

use serde_json::Value;
use thiserror::Error;

/// Shown when the server cannot be reached or gave no usable reason.
pub const GENERIC_NETWORK_MESSAGE: &str =
    "Could not reach the server. Please check your connection and try again.";

/// Errors surfaced to the user by client operations.
///
/// Each variant carries a human-readable message, usually the server's
/// `detail` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Bad input, shown inline next to the form.
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or an expired session.
    #[error("{0}")]
    Auth(String),

    /// Connectivity or server failure.
    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    NotFound(String),

    /// A business rule refused the action (e.g. quest already claimed).
    #[error("{0}")]
    Business(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn message(&self) -> &str {
        match self {
            ClientError::Validation(m)
            | ClientError::Auth(m)
            | ClientError::Network(m)
            | ClientError::NotFound(m)
            | ClientError::Business(m) => m,
        }
    }

    /// Map a failed HTTP response to an error.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        match status {
            400 | 413 | 415 | 422 => {
                ClientError::Validation(detail.unwrap_or_else(|| "Invalid request".into()))
            }
            401 => ClientError::Auth(
                detail.unwrap_or_else(|| "Your session has expired. Please log in again.".into()),
            ),
            403 => ClientError::Business(
                detail.unwrap_or_else(|| "You are not allowed to do that".into()),
            ),
            404 => ClientError::NotFound(detail.unwrap_or_else(|| "Not found".into())),
            _ => ClientError::Network(detail.unwrap_or_else(|| GENERIC_NETWORK_MESSAGE.into())),
        }
    }

    /// Reinterpret a rejected request as a business rule refusal.
    pub(crate) fn into_business(self) -> Self {
        match self {
            ClientError::Validation(m) => ClientError::Business(m),
            other => other,
        }
    }
}

/// Pull a message out of an error body.
///
/// Accepts `{"detail": "..."}` and the list form
/// `{"detail": [{"msg": "..."}]}` emitted by some validators.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_extracted() {
        assert_eq!(
            extract_detail(r#"{"detail": "Username already registered"}"#).as_deref(),
            Some("Username already registered")
        );
    }

    #[test]
    fn detail_list_is_joined() {
        let body = r#"{"detail": [{"msg": "field required"}, {"msg": "bad email"}]}"#;
        assert_eq!(extract_detail(body).as_deref(), Some("field required; bad email"));
    }

    #[test]
    fn missing_detail_yields_none() {
        assert_eq!(extract_detail("<html>502</html>"), None);
        assert_eq!(extract_detail(r#"{"error": "x"}"#), None);
        assert_eq!(extract_detail(r#"{"detail": ""}"#), None);
    }

    #[test]
    fn statuses_map_to_kinds() {
        assert!(matches!(ClientError::from_status(400, None), ClientError::Validation(_)));
        assert!(matches!(ClientError::from_status(401, None), ClientError::Auth(_)));
        assert!(matches!(ClientError::from_status(403, None), ClientError::Business(_)));
        assert!(matches!(ClientError::from_status(404, None), ClientError::NotFound(_)));
        assert_eq!(
            ClientError::from_status(502, None),
            ClientError::Network(GENERIC_NETWORK_MESSAGE.into())
        );
    }

    #[test]
    fn server_detail_wins_over_default() {
        let err = ClientError::from_status(400, Some("Quest has already been claimed".into()));
        assert_eq!(err.message(), "Quest has already been claimed");
        assert_eq!(
            err.into_business(),
            ClientError::Business("Quest has already been claimed".into())
        );
    }
}
