use serde_json::Value;
use uuid::Uuid;

use crate::api::codes::{JSON_CODE_NETWORK_FAILURE, JSON_CODE_NOT_AUTHENTICATED, JSON_CODE_SUCCESS};

/// A backend response.
///
/// Failures resolve rather than reject: a transport-level error is reported
/// as a response with [`JSON_CODE_NETWORK_FAILURE`], so callers always get a
/// response to inspect.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The backend result code. Only [`JSON_CODE_SUCCESS`] is a true success.
    pub json_code: i64,
    /// The backend-provided message, if any.
    pub message: Option<String>,
    /// The response payload, if any.
    pub data: Option<Value>,
    /// The request id stamped by the dispatcher.
    pub request_id: Option<Uuid>,
}

impl ApiResponse {
    /// A successful response carrying `data`.
    pub fn success(data: Option<Value>) -> Self {
        Self {
            json_code: JSON_CODE_SUCCESS,
            message: None,
            data,
            request_id: None,
        }
    }

    /// A backend failure with `json_code` and a message.
    pub fn failure(json_code: i64, message: impl Into<String>) -> Self {
        Self {
            json_code,
            message: Some(message.into()),
            data: None,
            request_id: None,
        }
    }

    /// A transport-level failure; no backend response was received.
    pub fn network_failure(message: impl Into<String>) -> Self {
        Self::failure(JSON_CODE_NETWORK_FAILURE, message)
    }

    /// Whether the backend reported success.
    pub fn is_success(&self) -> bool {
        self.json_code == JSON_CODE_SUCCESS
    }

    /// Whether the backend rejected the auth token as expired.
    pub fn is_not_authenticated(&self) -> bool {
        self.json_code == JSON_CODE_NOT_AUTHENTICATED
    }
}
