//! Error taxonomy for calls against the admin API.
//!
//! Every failure that can come out of the transport is classified into one
//! [`ApiError`] variant. The variant decides how the failure is surfaced:
//! `Auth` invalidates the session, everything else turns into a banner or a
//! notification carrying [`ApiError::user_message`].

use serde_json::Value;
use thiserror::Error;

use crate::http::Response;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never reached the server or no response came back.
    #[error("network error: {0}")]
    Network(String),

    /// 401: the session is expired or invalid.
    #[error("session expired")]
    Auth,

    /// 400/422: the server rejected the payload.
    #[error("validation failed: {}", .detail.as_deref().unwrap_or("no detail"))]
    Validation { detail: Option<String> },

    /// 404.
    #[error("not found: {}", .detail.as_deref().unwrap_or("no detail"))]
    NotFound { detail: Option<String> },

    /// 5xx.
    #[error("server error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    /// Any other non-2xx status.
    #[error("unexpected status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Unknown { status: u16, detail: Option<String> },

    /// The response body does not match the expected schema.
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// A typed API result.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Classifies a non-2xx response.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let detail = extract_detail(body);
        match status {
            401 => Self::Auth,
            400 | 422 => Self::Validation { detail },
            404 => Self::NotFound { detail },
            500..=599 => Self::Server { status, detail },
            _ => Self::Unknown { status, detail },
        }
    }

    /// Returns `Err` classified from the status unless the response is 2xx.
    pub fn check(response: &Response) -> ApiResult<()> {
        if response.is_success() {
            Ok(())
        } else {
            Err(Self::from_status(response.status, &response.body))
        }
    }

    /// True for errors that end the session rather than the operation.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::Auth)
    }

    /// Text suitable for a toast or banner: server detail when present,
    /// otherwise a fallback specific to the error class.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Unable to reach the server. Check your connection and try again.".to_owned()
            }
            Self::Auth => "Your session has expired. Please sign in again.".to_owned(),
            Self::Validation { detail } => detail
                .clone()
                .unwrap_or_else(|| "The submitted data is invalid.".to_owned()),
            Self::NotFound { detail } => detail
                .clone()
                .unwrap_or_else(|| "The requested record no longer exists.".to_owned()),
            Self::Server { detail, .. } => detail
                .clone()
                .unwrap_or_else(|| "The server encountered an error. Try again later.".to_owned()),
            Self::Unknown { status, detail } => detail
                .clone()
                .unwrap_or_else(|| format!("Request failed with status {status}.")),
            Self::Shape(_) => "The server returned data in an unexpected format.".to_owned(),
        }
    }
}

/// Pulls a human-readable detail out of an error body.
///
/// Understands `{"detail": "..."}`, `{"detail": [{"msg": "..."}, ...]}` and
/// `{"message": "..."}`.
fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => Some(detail.clone()),
        Some(Value::Array(entries)) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => value
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .map(str::to_owned),
    }
}
