use crate::models::credentials::Credentials;
use crate::models::session::Session;

/// The controller's in-memory mirror of the reactive store.
///
/// Updated exclusively by the store-subscription callbacks registered in the
/// controller's constructor; no other code path writes these fields, so the
/// mirror never diverges from the persisted store.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// The active session.
    pub session: Session,
    /// The active credentials.
    pub credentials: Credentials,
    /// The parked session of a previous identity.
    pub stashed_session: Session,
    /// The parked credentials of a previous identity.
    pub stashed_credentials: Credentials,
    /// The user's preferred locale.
    pub preferred_locale: Option<String>,
    /// The active workspace id.
    pub active_policy_id: Option<String>,
}

impl SessionContext {
    /// Whether a usable auth token is present.
    pub fn is_authenticated(&self) -> bool {
        self.session.has_auth_token()
    }

    /// Whether the active session is an anonymous (guest) one.
    pub fn is_anonymous(&self) -> bool {
        self.session.is_anonymous()
    }

    /// Whether the active session is a customer-support impersonation.
    pub fn is_supportal(&self) -> bool {
        self.session.is_support()
    }

    /// Whether a complete stash exists.
    ///
    /// A stash counts only when both the stashed token and the stashed
    /// auto-generated login are simultaneously non-empty; a partial stash
    /// reads as no stash.
    pub fn has_stashed_session(&self) -> bool {
        self.stashed_session.has_auth_token()
            && self.stashed_credentials.has_auto_generated_login()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_stash_reads_as_no_stash() {
        let mut ctx = SessionContext::default();
        assert!(!ctx.has_stashed_session());

        ctx.stashed_session.auth_token = Some("abc".to_string());
        assert!(!ctx.has_stashed_session());

        ctx.stashed_credentials.auto_generated_login = Some("gen-login".to_string());
        assert!(ctx.has_stashed_session());

        ctx.stashed_session.auth_token = Some(String::new());
        assert!(!ctx.has_stashed_session());
    }
}
