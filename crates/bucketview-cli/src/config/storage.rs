//! Storage connection options.

use std::time::Duration;

use anyhow::Context;
use bucketview_storage::{MinioConfig, MinioCredentials, RetryPolicy};
use clap::Args;
use url::Url;

use crate::TRACING_TARGET_CONFIG;

/// Connection to the S3-compatible service.
#[derive(Clone, Args)]
pub struct StorageArgs {
    /// Service endpoint, e.g. `https://s3.us-east-1.amazonaws.com`.
    #[arg(long, env = "MINIO_ENDPOINT")]
    pub endpoint: Url,

    /// Access key id.
    #[arg(long, env = "MINIO_ACCESS_KEY", hide_env_values = true)]
    pub access_key: String,

    /// Secret access key.
    #[arg(long, env = "MINIO_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Session token for temporary credentials.
    #[arg(long, env = "MINIO_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// Region to sign requests for.
    #[arg(long, env = "MINIO_REGION")]
    pub region: Option<String>,

    /// Address buckets as `bucket.host` instead of `host/bucket`.
    #[arg(long, env = "MINIO_VIRTUAL_HOST_STYLE")]
    pub virtual_host_style: bool,

    /// Timeout of a single request, in seconds.
    #[arg(long, env = "MINIO_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    /// Attempts per request before a failure is final.
    #[arg(long, env = "MINIO_MAX_ATTEMPTS", default_value_t = 20)]
    pub max_attempts: u32,
}

impl StorageArgs {
    /// Builds the storage client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an `https` URL with a host.
    pub fn minio_config(&self) -> anyhow::Result<MinioConfig> {
        let mut credentials = MinioCredentials::new(&self.access_key, &self.secret_key);
        if let Some(token) = &self.session_token {
            credentials = credentials.with_session_token(token);
        }

        let mut config = MinioConfig::new(self.endpoint.clone(), credentials)
            .context("invalid storage endpoint")?
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_path_style(!self.virtual_host_style)
            .with_retry(RetryPolicy::default().with_max_attempts(self.max_attempts));

        if let Some(region) = &self.region {
            config = config.with_region(region);
        }

        Ok(config)
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            endpoint = %self.endpoint,
            region = ?self.region,
            virtual_host_style = self.virtual_host_style,
            request_timeout_secs = self.request_timeout_secs,
            max_attempts = self.max_attempts,
            "Storage configuration"
        );
    }
}

impl std::fmt::Debug for StorageArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageArgs")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &"****")
            .field("secret_key", &"****")
            .field("session_token", &self.session_token.as_ref().map(|_| "****"))
            .field("region", &self.region)
            .field("virtual_host_style", &self.virtual_host_style)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(endpoint: &str) -> StorageArgs {
        StorageArgs {
            endpoint: Url::parse(endpoint).unwrap(),
            access_key: "AKIAEXAMPLE".into(),
            secret_key: "wJalrXUtnFEMI".into(),
            session_token: None,
            region: Some("us-east-1".into()),
            virtual_host_style: false,
            request_timeout_secs: 30,
            max_attempts: 5,
        }
    }

    #[test]
    fn builds_minio_config() {
        let config = args("https://s3.example.com").minio_config().unwrap();
        assert_eq!(config.region.as_deref(), Some("us-east-1"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, 5);
        assert!(config.path_style);
    }

    #[test]
    fn rejects_plain_http() {
        assert!(args("http://s3.example.com").minio_config().is_err());
    }

    #[test]
    fn debug_hides_secrets() {
        let debug = format!("{:?}", args("https://s3.example.com"));
        assert!(!debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("wJalrXUtnFEMI"));
    }
}
