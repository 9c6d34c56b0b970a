// Fixed endpoints, environment names and the mutable per-process session
// settings (timeout, auth debug toggle).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CliError, Result};

/// Base URL every request is built from.
pub const DEFAULT_BASE_URL: &str = "https://www.moltbook.com/api/v1";

/// The only scheme + host the client will ever talk to.
pub const ALLOWED_ORIGIN: &str = "https://www.moltbook.com";

/// Path prefix all API endpoints live under.
pub const API_PREFIX: &str = "/api/v1";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MOLTBOOK_API_KEY";

/// Environment variable that may override the base URL (still origin-checked).
pub const BASE_URL_ENV: &str = "MOLTBOOK_BASE_URL";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Keys issued by the service start with this; others are accepted with a warning.
pub const EXPECTED_KEY_PREFIX: &str = "moltbook_";

/// Runtime settings changed only through the session menu actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub timeout: Duration,
    pub auth_debug: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_debug: false,
        }
    }
}

impl SessionConfig {
    /// Build a config from startup flags, clamping the timeout into range.
    pub fn new(timeout_secs: u64, auth_debug: bool) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs.clamp(1, MAX_TIMEOUT_SECS)),
            auth_debug,
        }
    }

    pub fn set_timeout_secs(&mut self, secs: u64) -> Result<Duration> {
        if secs == 0 || secs > MAX_TIMEOUT_SECS {
            return Err(CliError::validation(format!(
                "timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"
            )));
        }
        self.timeout = Duration::from_secs(secs);
        Ok(self.timeout)
    }

    /// Flip the masked auth line on or off and return the new state.
    pub fn toggle_auth_debug(&mut self) -> bool {
        self.auth_debug = !self.auth_debug;
        self.auth_debug
    }
}

/// Default location of the credential record:
/// `<config dir>/moltbook/credentials.json`.
pub fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("moltbook")
        .join("credentials.json")
}
