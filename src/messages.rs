//! User-facing message constants surfaced through the account store fields.

/// The fallback message for any sign-in failure without a more specific mapping.
pub const GENERIC_SIGN_IN_FAILURE: &str =
    "We're having trouble signing you in. Please try again.";

/// Shown when the entered magic code does not match.
pub const INCORRECT_MAGIC_CODE: &str = "Incorrect magic code. Please try again.";

/// Shown when the magic code is no longer valid.
pub const EXPIRED_MAGIC_CODE: &str = "That magic code has expired. Please request a new one.";

/// Shown when the login lookup fails.
pub const UNABLE_TO_FIND_ACCOUNT: &str =
    "We couldn't find an account matching that login. Please double-check it.";

/// The default blocked state for backend-declared hard failures.
pub const ACCOUNT_BLOCKED: &str =
    "Something went wrong with your account. Please contact support for help.";

/// Logged and surfaced when a sign-in is attempted without a pending login.
pub const MISSING_PENDING_LOGIN: &str =
    "Please enter your login before requesting a magic code.";
