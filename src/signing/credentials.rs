//! Temporary credential sources for request signing

use std::fmt;

use serde::Deserialize;

/// Access key pair plus optional session token
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Credentials {
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: String,
    #[serde(default)]
    pub(crate) session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Identity provider handing out credentials on demand.
///
/// Returning `None` means no identity is available; callers must treat that
/// as distinct from a transport failure.
pub(crate) trait CredentialsProvider: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

/// Reads the standard `AWS_*` environment variables on every call
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct EnvCredentials;

impl EnvCredentials {
    fn from_lookup<F>(lookup: F) -> Option<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Credentials {
            access_key_id: non_empty("AWS_ACCESS_KEY_ID")?,
            secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY")?,
            session_token: non_empty("AWS_SESSION_TOKEN"),
        })
    }
}

impl CredentialsProvider for EnvCredentials {
    fn credentials(&self) -> Option<Credentials> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Fixed credentials, e.g. from the config file
#[derive(Debug, Clone)]
pub(crate) struct StaticCredentials(pub(crate) Option<Credentials>);

impl CredentialsProvider for StaticCredentials {
    fn credentials(&self) -> Option<Credentials> {
        self.0.clone()
    }
}
