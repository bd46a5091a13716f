//! Runtime settings the router needs from the host process.

use shopping_core::service::auth_service::DEFAULT_SESSION_TTL_MS;

pub const SESSION_COOKIE_NAME: &str = "sessionid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub session_cookie: String,
    pub session_ttl_ms: i64,
    /// Adds `Secure` to the session cookie; enable behind TLS.
    pub secure_cookies: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            session_cookie: SESSION_COOKIE_NAME.to_string(),
            session_ttl_ms: DEFAULT_SESSION_TTL_MS,
            secure_cookies: false,
        }
    }
}

impl ApiConfig {
    pub fn with_session_ttl_secs(mut self, secs: u64) -> Self {
        self.session_ttl_ms = i64::try_from(secs)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .unwrap_or(i64::MAX);
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
