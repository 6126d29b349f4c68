//! Trait seams for the controller's external collaborators. Each is injected
//! at construction; the controller never reaches into ambient globals.

/// The real-time messaging transport. The controller drives connection
/// lifecycle around the authorization handshake but does not implement the
/// transport itself.
pub trait PusherTransport: Send + Sync {
    /// Tears the transport down.
    fn disconnect(&self);
    /// Re-establishes the transport after a successful reauthentication.
    fn reconnect(&self);
}

/// The navigation surface the controller redirects through.
pub trait Navigator: Send + Sync {
    /// Navigates to the sign-in screen.
    fn go_to_sign_in(&self);
    /// Whether the sign-in screen is already active.
    fn is_on_sign_in(&self) -> bool;
    /// Resets the navigation stack to the home screen.
    fn reset_to_home(&self);
    /// Opens an external URL (the backend-hosted sign-out redirect).
    fn open_external_url(&self, url: &str);
    /// The public room a deep link currently points at, if any.
    fn active_public_room_id(&self) -> Option<String>;
}

/// An account switch reported to the embedding host shell.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSwitch {
    /// The token now driving API auth headers.
    pub auth_token: String,
    /// The active workspace id, if any.
    pub policy_id: Option<String>,
    /// The account that was active before the switch.
    pub previous_account_id: Option<i64>,
}

/// The embedding host shell, when the controller runs inside a wrapping
/// native application. Purely an outward notification surface.
pub trait HostShell: Send + Sync {
    /// Hands the shell a freshly issued auth token.
    fn send_auth_token(&self, token: &str);
    /// Tells the shell the active account changed.
    fn switch_account(&self, switch: AccountSwitch);
    /// Tells the shell to clear its own legacy-domain auth state.
    fn sign_out_from_old_dot(&self);
}
