//! MinIO client, its configuration, and the retry policy it applies.
//!
//! The client is created once per connection context and shared by every
//! query against the bucket; see `bucketview-table` for the cache that owns it.

mod minio_client;
mod minio_config;
mod minio_credentials;
mod retry;

pub use minio_client::MinioClient;
pub use minio_config::MinioConfig;
pub use minio_credentials::MinioCredentials;
pub use retry::{RetryPolicy, ThrottleState};
