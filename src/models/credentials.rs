use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The credentials owned exclusively by the auth flow.
///
/// Secret fields are wiped from memory on drop. Cleared on sign-out unless
/// stashed for a later account switch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// The login the user typed (email or phone).
    #[serde(default)]
    pub login: Option<String>,
    /// The one-time magic code pending exchange.
    #[serde(default)]
    pub validate_code: Option<String>,
    /// The backend-generated login used for silent reauthentication.
    #[serde(default)]
    pub auto_generated_login: Option<String>,
    /// The backend-generated secret paired with `auto_generated_login`.
    #[serde(default)]
    pub auto_generated_password: Option<String>,
    /// The account the credentials belong to.
    #[serde(default)]
    pub account_id: Option<i64>,
}

impl Credentials {
    /// Whether the auto-generated login half of a stash is populated.
    pub fn has_auto_generated_login(&self) -> bool {
        self.auto_generated_login
            .as_deref()
            .is_some_and(|login| !login.is_empty())
    }

    /// Parses credentials from a raw store value. Missing or malformed values
    /// read as empty credentials.
    pub fn from_store_value(value: Option<&Value>) -> Credentials {
        value
            .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
            .unwrap_or_default()
    }

    /// Serializes the credentials for the reactive store.
    pub fn to_store_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_auto_generated_login_does_not_count() {
        let mut credentials = Credentials::default();
        credentials.auto_generated_login = Some(String::new());
        assert!(!credentials.has_auto_generated_login());

        credentials.auto_generated_login = Some("gen-login".to_string());
        assert!(credentials.has_auto_generated_login());
    }
}
