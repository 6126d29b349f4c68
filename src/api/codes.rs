//! Backend command names and jsonCode sentinels.

/// Side-effect-free existence check for a login.
pub const CMD_BEGIN_SIGN_IN: &str = "BeginSignIn";
/// Exchanges a magic code (and optional second factor) for a session.
pub const CMD_SIGNIN_USER: &str = "SigninUser";
/// Exchanges a magic-link code addressed by account id for a session.
pub const CMD_SIGNIN_USER_WITH_LINK: &str = "SigninUserWithLink";
/// Invalidates the authenticated session remotely.
pub const CMD_LOG_OUT: &str = "LogOut";
/// Silent reauthentication with the auto-generated credentials.
pub const CMD_AUTHENTICATE: &str = "Authenticate";
/// Per-channel authorization handshake for the real-time transport.
pub const CMD_AUTHENTICATE_PUSHER: &str = "AuthenticatePusher";

/// The only jsonCode treated as a true success.
pub const JSON_CODE_SUCCESS: i64 = 200;
/// The expired-token sentinel.
pub const JSON_CODE_NOT_AUTHENTICATED: i64 = 407;
/// The magic code did not match.
pub const JSON_CODE_INCORRECT_MAGIC_CODE: i64 = 401;
/// The magic code is no longer valid.
pub const JSON_CODE_EXPIRED_MAGIC_CODE: i64 = 405;
/// Transport-level failure; no backend response was received.
pub const JSON_CODE_NETWORK_FAILURE: i64 = 0;
