//! Client configuration.
//!
//! Points the client at a REST root (for the WordPress backend this is the
//! plugin namespace, e.g. `https://office.example/wp-json/office/v1`) and
//! carries the basic-auth token, timeouts, refresh cadence and the directory
//! where session state is persisted.

use std::path::PathBuf;
use std::time::Duration;

use base64::Engine as _;
use url::Url;
use zeroize::Zeroizing;

use crate::refresher::RefreshPolicy;
use crate::retry::RetryPolicy;

/// Configuration for connecting to the office desk backend.
///
/// Custom `Debug` implementation redacts the `auth_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct DeskApiConfig {
    /// REST root. Resource paths (`clients`, `auth/nonce`, ...) are joined onto it.
    pub base_url: Url,
    /// Pre-encoded basic-auth token (`base64(user:app_password)`), if known up front.
    pub auth_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Directory holding `state.json`.
    pub state_dir: PathBuf,
    /// Background nonce refresh cadence.
    pub refresh: RefreshPolicy,
    /// Transport retry policy.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for DeskApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeskApiConfig")
            .field("base_url", &self.base_url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("state_dir", &self.state_dir)
            .field("refresh", &self.refresh)
            .field("retry", &self.retry)
            .finish()
    }
}

impl DeskApiConfig {
    /// Create a configuration with defaults for everything but the URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            auth_token: None,
            timeout_secs: 30,
            state_dir: default_state_dir(),
            refresh: RefreshPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DESK_API_URL` (required)
    /// - `DESK_AUTH_TOKEN`, or `DESK_USERNAME` + `DESK_APP_PASSWORD` (optional;
    ///   without them the token must come from a stored session)
    /// - `DESK_TIMEOUT_SECS` (default: 30)
    /// - `DESK_STATE_DIR` (default: `$HOME/.desk`)
    /// - `DESK_NONCE_REFRESH_SECS` (default: 1800)
    /// - `DESK_NONCE_STALE_SECS` (default: 1500)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("DESK_API_URL").map_err(|_| ConfigError::MissingUrl)?;
        let base_url = parse_base_url("DESK_API_URL", &raw_url)?;

        let auth_token = match std::env::var("DESK_AUTH_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Some(Zeroizing::new(token.trim().to_string())),
            _ => match (
                std::env::var("DESK_USERNAME"),
                std::env::var("DESK_APP_PASSWORD"),
            ) {
                (Ok(user), Ok(password)) => Some(basic_token(&user, &password)?),
                _ => None,
            },
        };

        let defaults = RefreshPolicy::default();
        Ok(Self {
            base_url,
            auth_token,
            timeout_secs: env_u64("DESK_TIMEOUT_SECS").unwrap_or(30),
            state_dir: state_dir_from_env(),
            refresh: RefreshPolicy {
                interval: env_u64("DESK_NONCE_REFRESH_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.interval),
                stale_after: env_u64("DESK_NONCE_STALE_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.stale_after),
            },
            retry: RetryPolicy::default(),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// Retries are disabled so tests observe every request exactly once.
    pub fn local_mock(uri: &str, state_dir: PathBuf) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("mock", uri)?,
            auth_token: None,
            timeout_secs: 5,
            state_dir,
            refresh: RefreshPolicy::default(),
            retry: RetryPolicy::none(),
        })
    }

    /// Path of the persisted state file.
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }
}

/// Encode `user:password` as a basic-auth token.
pub fn basic_token(username: &str, password: &str) -> Result<Zeroizing<String>, ConfigError> {
    if username.is_empty() || username.contains(':') {
        return Err(ConfigError::InvalidCredentials(
            "username must be non-empty and must not contain ':'".into(),
        ));
    }
    if password.is_empty() {
        return Err(ConfigError::InvalidCredentials("password must not be empty".into()));
    }
    let raw = Zeroizing::new(format!("{username}:{password}"));
    Ok(Zeroizing::new(
        base64::engine::general_purpose::STANDARD.encode(raw.as_bytes()),
    ))
}

fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    Ok(url)
}

fn env_u64(var: &str) -> Option<u64> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

/// `DESK_STATE_DIR`, or `$HOME/.desk` when unset.
pub fn state_dir_from_env() -> PathBuf {
    std::env::var("DESK_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_state_dir())
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".desk")
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DESK_API_URL environment variable is required")]
    MissingUrl,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("invalid credential characters in authorization header")]
    InvalidHeader,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = DeskApiConfig::local_mock("http://127.0.0.1:9000", PathBuf::from("/tmp/x")).unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.retry, RetryPolicy::none());
        assert_eq!(cfg.state_file(), PathBuf::from("/tmp/x/state.json"));
    }

    #[test]
    fn basic_token_encodes_user_and_password() {
        let token = basic_token("test", "secret").unwrap();
        assert_eq!(token.as_str(), "dGVzdDpzZWNyZXQ=");
    }

    #[test]
    fn basic_token_rejects_colon_in_username() {
        assert!(basic_token("a:b", "pw").is_err());
        assert!(basic_token("", "pw").is_err());
        assert!(basic_token("user", "").is_err());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(parse_base_url("X", "ftp://example.com").is_err());
        assert!(parse_base_url("X", "not a url").is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let mut cfg = DeskApiConfig::new(Url::parse("https://office.example/wp-json/office/v1").unwrap());
        cfg.auth_token = Some(Zeroizing::new("super-secret".into()));
        let printed = format!("{cfg:?}");
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("super-secret"));
    }
}
