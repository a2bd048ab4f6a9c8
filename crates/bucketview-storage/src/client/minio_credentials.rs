//! Static credentials for S3-compatible services.

use minio::s3::creds::StaticProvider;
use serde::{Deserialize, Serialize};

/// Access key pair with an optional session token.
///
/// The secret is never serialized and never printed by [`Debug`].
#[derive(Clone, Serialize, Deserialize)]
pub struct MinioCredentials {
    /// Access key identifier.
    pub access_key: String,

    /// Secret access key.
    #[serde(skip_serializing, default)]
    pub secret_key: String,

    /// Session token for temporary (STS) credentials.
    #[serde(default)]
    pub session_token: Option<String>,
}

impl MinioCredentials {
    /// Creates credentials from an access key and secret key.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
        }
    }

    /// Attaches a session token.
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    /// Returns whether both halves of the key pair are present.
    pub fn is_complete(&self) -> bool {
        !self.access_key.is_empty() && !self.secret_key.is_empty()
    }

    /// Returns the access key with everything after the first four characters hidden.
    pub fn access_key_masked(&self) -> String {
        match self.access_key.char_indices().nth(4) {
            Some((cut, _)) => format!("{}***", &self.access_key[..cut]),
            None => "*".repeat(self.access_key.chars().count()),
        }
    }
}

impl std::fmt::Debug for MinioCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinioCredentials")
            .field("access_key", &self.access_key_masked())
            .field("secret_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl From<&MinioCredentials> for StaticProvider {
    fn from(credentials: &MinioCredentials) -> Self {
        StaticProvider::new(
            &credentials.access_key,
            &credentials.secret_key,
            credentials.session_token.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masking_keeps_prefix_only() {
        let creds = MinioCredentials::new("AKIATEST12345", "secret");
        assert_eq!(creds.access_key_masked(), "AKIA***");

        let short = MinioCredentials::new("ABC", "secret");
        assert_eq!(short.access_key_masked(), "***");
    }

    #[test]
    fn debug_hides_secrets() {
        let creds =
            MinioCredentials::new("AKIATEST12345", "topsecret").with_session_token("sts-token-value");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("sts-token-value"));
        assert!(!debug.contains("AKIATEST12345"));
    }

    #[test]
    fn completeness() {
        assert!(MinioCredentials::new("a", "b").is_complete());
        assert!(!MinioCredentials::new("", "b").is_complete());
        assert!(!MinioCredentials::new("a", "").is_complete());
    }
}
