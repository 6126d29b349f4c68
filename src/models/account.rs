use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The presentation-facing auth surface.
///
/// User-visible sign-in failures travel through `errors` and `message`; the
/// controller never returns them to rendering code directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    /// Whether an auth request is in flight.
    pub is_loading: bool,
    /// The current user-facing error, if any.
    pub errors: Option<String>,
    /// The current user-facing informational message, if any.
    pub message: Option<String>,
    /// Whether the backend requires a second factor for this login.
    pub requires_two_factor_auth: bool,
    /// Whether the login has been validated.
    pub validated: bool,
}

impl Account {
    /// Parses an account from a raw store value.
    pub fn from_store_value(value: Option<&Value>) -> Account {
        value
            .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
            .unwrap_or_default()
    }
}
