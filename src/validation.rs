use crate::error::{Result, SessionError};

/// Validates a login identifier (email or E.164-style phone number).
///
/// # Arguments
///
/// * `login` - The login to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the login is valid.
pub fn validate_login(login: &str) -> Result<()> {
    let login = login.trim();

    if login.is_empty() {
        return Err(SessionError::Validation(
            "Login cannot be empty".to_string(),
        ));
    }

    if login.len() > 254 {
        return Err(SessionError::Validation(
            "Login must be at most 254 characters".to_string(),
        ));
    }

    let looks_like_email = login.contains('@')
        && login.split('@').count() == 2
        && login.split('@').all(|part| !part.is_empty())
        && login.rsplit('@').next().is_some_and(|domain| domain.contains('.'));

    let looks_like_phone = {
        let digits = login.strip_prefix('+').unwrap_or(login);
        digits.len() >= 5 && digits.chars().all(|c| c.is_ascii_digit())
    };

    if !looks_like_email && !looks_like_phone {
        return Err(SessionError::Validation(
            "Please enter a valid email address or phone number".to_string(),
        ));
    }

    Ok(())
}

/// Validates a one-time magic code.
///
/// # Arguments
///
/// * `code` - The code to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the code is well-formed.
pub fn validate_magic_code(code: &str) -> Result<()> {
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(SessionError::Validation(
            "Magic codes are 6 digits".to_string(),
        ));
    }

    Ok(())
}

/// Validates an optional two-factor authentication code.
///
/// # Arguments
///
/// * `code` - The code to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the code is well-formed.
pub fn validate_two_factor_code(code: &str) -> Result<()> {
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(SessionError::Validation(
            "Two-factor codes are 6 digits".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails_and_phone_numbers() {
        assert!(validate_login("a@x.com").is_ok());
        assert!(validate_login("user.name@sub.domain.org").is_ok());
        assert!(validate_login("+15551234567").is_ok());
        assert!(validate_login("5551234567").is_ok());
    }

    #[test]
    fn rejects_malformed_logins() {
        assert!(validate_login("").is_err());
        assert!(validate_login("no-at-sign").is_err());
        assert!(validate_login("@x.com").is_err());
        assert!(validate_login("a@").is_err());
        assert!(validate_login("a@nodot").is_err());
        assert!(validate_login("+123").is_err());
    }

    #[test]
    fn magic_codes_are_six_digits() {
        assert!(validate_magic_code("123456").is_ok());
        assert!(validate_magic_code("12345").is_err());
        assert!(validate_magic_code("12345a").is_err());
    }
}
