//! Authentication strategies for remote resource backends
//!
//! Each backend binds one strategy at construction time. A strategy is a pure
//! function of its captured configuration: it never looks at the request being
//! sent, so request signing or nonce-based schemes are not expressible here.

use std::collections::BTreeMap;

use base64::Engine;

/// Configuration problems detected before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required but was empty or unset")]
    Missing(&'static str),
}

/// Header name to header value mapping produced by a strategy
pub type AuthHeaders = BTreeMap<String, String>;

/// The closed set of supported authentication schemes
#[derive(Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// `Authorization: Bearer <token>`
    BearerToken { token: String },
    /// `Authorization: Basic base64(<key>:<secret>)`
    BasicCredentials { key: String, secret: String },
    /// The backend takes no authentication at all
    NoAuth,
}

// Credentials stay out of debug output and logs.
impl std::fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthStrategy::BearerToken { .. } => f.write_str("BearerToken(****)"),
            AuthStrategy::BasicCredentials { key, .. } => {
                write!(f, "BasicCredentials({key}:****)")
            }
            AuthStrategy::NoAuth => f.write_str("NoAuth"),
        }
    }
}

impl AuthStrategy {
    /// Bearer strategy; an empty token is a configuration error
    pub fn bearer(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::Missing("bearer token"));
        }
        Ok(AuthStrategy::BearerToken { token })
    }

    /// Basic strategy; both halves of the credential pair must be present
    pub fn basic(key: impl Into<String>, secret: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        let secret = secret.into();
        if key.trim().is_empty() {
            return Err(ConfigError::Missing("basic auth key"));
        }
        if secret.trim().is_empty() {
            return Err(ConfigError::Missing("basic auth secret"));
        }
        Ok(AuthStrategy::BasicCredentials { key, secret })
    }

    /// Compute the request headers for this strategy
    ///
    /// `None` is the explicit "no authentication" marker: callers omit the
    /// `Authorization` header rather than treating it as a failure.
    pub fn headers(&self) -> Option<AuthHeaders> {
        let value = match self {
            AuthStrategy::BearerToken { token } => format!("Bearer {token}"),
            AuthStrategy::BasicCredentials { key, secret } => {
                let encoded =
                    base64::engine::general_purpose::STANDARD.encode(format!("{key}:{secret}"));
                format!("Basic {encoded}")
            }
            AuthStrategy::NoAuth => return None,
        };

        let mut headers = AuthHeaders::new();
        headers.insert("Authorization".to_string(), value);
        Some(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_headers() {
        let auth = AuthStrategy::bearer("abc").unwrap();
        let headers = auth.headers().unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers["Authorization"], "Bearer abc");
    }

    #[test]
    fn test_basic_headers() {
        let auth = AuthStrategy::basic("k", "s").unwrap();
        let headers = auth.headers().unwrap();

        // base64("k:s")
        assert_eq!(headers["Authorization"], "Basic azpz");
    }

    #[test]
    fn test_no_auth_is_explicit_absence() {
        assert_eq!(AuthStrategy::NoAuth.headers(), None);
    }

    #[test]
    fn test_empty_bearer_fails_closed() {
        assert_eq!(
            AuthStrategy::bearer(""),
            Err(ConfigError::Missing("bearer token"))
        );
        assert!(AuthStrategy::bearer("   ").is_err());
    }

    #[test]
    fn test_basic_requires_both_halves() {
        assert_eq!(
            AuthStrategy::basic("", "s"),
            Err(ConfigError::Missing("basic auth key"))
        );
        assert_eq!(
            AuthStrategy::basic("k", ""),
            Err(ConfigError::Missing("basic auth secret"))
        );
    }

    #[test]
    fn test_blank_basic_credentials_fail_closed() {
        assert_eq!(
            AuthStrategy::basic("   ", "s"),
            Err(ConfigError::Missing("basic auth key"))
        );
        assert_eq!(
            AuthStrategy::basic("k", "\t "),
            Err(ConfigError::Missing("basic auth secret"))
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let bearer = AuthStrategy::bearer("super-secret").unwrap();
        let basic = AuthStrategy::basic("key", "hunter2").unwrap();

        assert!(!format!("{bearer:?}").contains("super-secret"));
        assert!(!format!("{basic:?}").contains("hunter2"));
    }
}
