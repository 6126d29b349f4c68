use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The sentinel written over a token to force it invalid.
pub const INVALID_AUTH_TOKEN: &str = "invalidated";

/// The kind of auth token the backend issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthTokenType {
    /// A regular authenticated user.
    Normal,
    /// A guest browsing a public room without an account.
    Anonymous,
    /// A customer-support impersonation token.
    Support,
}

/// The state of a magic-link auto-authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AutoAuthState {
    /// No magic-link sign-in has started.
    #[default]
    NotStarted,
    /// A magic-link sign-in is in flight.
    SigningIn,
    /// The magic-link sign-in completed.
    JustSignedIn,
    /// The magic-link sign-in failed.
    Failed,
}

impl AutoAuthState {
    /// Normalizes a cached value on controller construction.
    ///
    /// An in-flight magic-link auth found in the cache is treated as already
    /// completed on remount; anything else resets to `NotStarted`.
    pub fn normalized_from_cache(cached: Option<AutoAuthState>) -> AutoAuthState {
        match cached {
            Some(AutoAuthState::SigningIn) | Some(AutoAuthState::JustSignedIn) => {
                AutoAuthState::JustSignedIn
            }
            _ => AutoAuthState::NotStarted,
        }
    }
}

/// The active session, mirrored from the reactive store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    /// The bearer token driving API auth headers.
    pub auth_token: Option<String>,
    /// The encrypted variant handed to embedding hosts.
    pub encrypted_auth_token: Option<String>,
    /// The kind of token the backend issued.
    pub auth_token_type: Option<AuthTokenType>,
    /// The account the session belongs to.
    pub account_id: Option<i64>,
    /// The login the session was created for.
    pub email: Option<String>,
    /// When the session was created, in epoch milliseconds.
    pub creation_date: Option<i64>,
    /// The magic-link auto-authentication state.
    pub auto_auth_state: Option<AutoAuthState>,
}

impl Session {
    /// Whether the session carries a usable token.
    pub fn has_auth_token(&self) -> bool {
        self.auth_token.as_deref().is_some_and(|token| !token.is_empty())
    }

    /// Whether this is an anonymous (guest) session.
    pub fn is_anonymous(&self) -> bool {
        self.auth_token_type == Some(AuthTokenType::Anonymous)
    }

    /// Whether this is a customer-support impersonation session.
    pub fn is_support(&self) -> bool {
        self.auth_token_type == Some(AuthTokenType::Support)
    }

    /// Stamps `creation_date` if absent. Set exactly once per session instantiation.
    pub fn stamp_creation_date(&mut self, now_ms: i64) {
        if self.creation_date.is_none() {
            self.creation_date = Some(now_ms);
        }
    }

    /// Parses a session from a raw store value. Missing or malformed values
    /// read as an empty session.
    pub fn from_store_value(value: Option<&Value>) -> Session {
        value
            .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
            .unwrap_or_default()
    }

    /// Serializes the session for the reactive store.
    pub fn to_store_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_date_is_stamped_exactly_once() {
        let mut session = Session::default();
        session.stamp_creation_date(1_000);
        assert_eq!(session.creation_date, Some(1_000));
        session.stamp_creation_date(2_000);
        assert_eq!(session.creation_date, Some(1_000));
    }

    #[test]
    fn cached_auto_auth_state_normalizes() {
        assert_eq!(
            AutoAuthState::normalized_from_cache(Some(AutoAuthState::SigningIn)),
            AutoAuthState::JustSignedIn
        );
        assert_eq!(
            AutoAuthState::normalized_from_cache(Some(AutoAuthState::JustSignedIn)),
            AutoAuthState::JustSignedIn
        );
        assert_eq!(
            AutoAuthState::normalized_from_cache(Some(AutoAuthState::Failed)),
            AutoAuthState::NotStarted
        );
        assert_eq!(
            AutoAuthState::normalized_from_cache(None),
            AutoAuthState::NotStarted
        );
    }

    #[test]
    fn store_values_use_camel_case_keys() {
        let session = Session {
            auth_token: Some("abc".to_string()),
            account_id: Some(7),
            auth_token_type: Some(AuthTokenType::Anonymous),
            ..Session::default()
        };
        let value = session.to_store_value();
        assert_eq!(value["authToken"], "abc");
        assert_eq!(value["accountId"], 7);
        assert_eq!(value["authTokenType"], "anonymous");
    }

    #[test]
    fn malformed_store_value_reads_as_empty_session() {
        let value = serde_json::json!("not-an-object");
        let session = Session::from_store_value(Some(&value));
        assert!(!session.has_auth_token());
    }
}
