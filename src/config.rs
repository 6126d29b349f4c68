use std::env;
use anyhow::{Context, Result};

/// The controller's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// How long a session stays valid, in days.
    pub session_expiration_days: i64,
    /// The delay before a forced expiry takes effect, in seconds.
    pub expire_session_delay_secs: u64,
    /// The minimum spacing between Pusher reauthentication cycles, in milliseconds.
    pub pusher_reauth_min_interval_ms: u64,
    /// The backend-hosted sign-out URL used to clear cross-domain auth cookies.
    pub old_dot_sign_out_url: String,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            session_expiration_days: env::var("SESSION_EXPIRATION_DAYS")
                .unwrap_or_else(|_| "90".to_string())
                .parse()
                .context("Invalid SESSION_EXPIRATION_DAYS")?,
            expire_session_delay_secs: env::var("EXPIRE_SESSION_DELAY_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("Invalid EXPIRE_SESSION_DELAY_SECS")?,
            pusher_reauth_min_interval_ms: env::var("PUSHER_REAUTH_MIN_INTERVAL_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("Invalid PUSHER_REAUTH_MIN_INTERVAL_MS")?,
            old_dot_sign_out_url: env::var("OLD_DOT_SIGN_OUT_URL")
                .unwrap_or_else(|_| "https://legacy.example.com/signout?clean=true".to_string()),
        })
    }

    /// The session expiration window in milliseconds.
    pub fn expiration_window_ms(&self) -> i64 {
        self.session_expiration_days * 86_400_000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_expiration_days: 90,
            expire_session_delay_secs: 15,
            pusher_reauth_min_interval_ms: 5000,
            old_dot_sign_out_url: "https://legacy.example.com/signout?clean=true".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_window_covers_whole_days() {
        let config = Config {
            session_expiration_days: 2,
            ..Config::default()
        };
        assert_eq!(config.expiration_window_ms(), 2 * 24 * 60 * 60 * 1000);
    }
}
