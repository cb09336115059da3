//! API error body
//!
//! Non-2xx responses from the incident API may carry a JSON body of the
//! form:
//! ```json
//! { "error": "Incident not found" }
//! ```
//! The field is optional; clients fall back to [`request_failed_message`].

use serde::{Deserialize, Serialize};

/// Error body returned by the incident API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    /// Best-effort extraction of the `error` field from a raw body.
    ///
    /// Returns `None` for malformed JSON, a missing field or a blank message.
    pub fn message_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Fallback message when the response carries no usable error body
pub fn request_failed_message(status: u16) -> String {
    format!("Request failed ({status})")
}
