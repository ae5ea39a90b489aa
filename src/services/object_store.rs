//! S3-compatible object storage used as the durable cache tier.
//!
//! Works against AWS S3 or any S3-compatible endpoint (Cloudflare R2,
//! MinIO) when `storage.endpoint_url` is set. Explicit keys in the config
//! take precedence; otherwise the AWS default credential chain is used.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};

use super::weather::cache::{DurableCache, DurableEntry};
use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub async fn new(config: &StorageConfig) -> Self {
        let region = Region::new(config.region.clone());

        let client = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                let creds = Credentials::new(access_key, secret_key, None, None, "locus-config");
                let mut builder = aws_sdk_s3::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(creds);
                if let Some(endpoint) = &config.endpoint_url {
                    builder = builder.endpoint_url(endpoint).force_path_style(true);
                }
                aws_sdk_s3::Client::from_conf(builder.build())
            }
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                let mut builder = aws_sdk_s3::config::Builder::from(&shared);
                if let Some(endpoint) = &config.endpoint_url {
                    builder = builder.endpoint_url(endpoint).force_path_style(true);
                }
                aws_sdk_s3::Client::from_conf(builder.build())
            }
        };

        tracing::info!(
            "Durable cache: s3://{} (endpoint: {})",
            config.bucket,
            config.endpoint_url.as_deref().unwrap_or("aws default")
        );

        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }
}

fn to_chrono(ts: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl DurableCache for S3ObjectStore {
    async fn get(&self, key: &str) -> AppResult<Option<DurableEntry>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err.as_service_error().is_some_and(GetObjectError::is_no_such_key) {
                    return Ok(None);
                }
                return Err(AppError::Cache(format!(
                    "Failed to read s3://{}/{}: {}",
                    self.bucket, key, err
                )));
            }
        };

        // Objects without a timestamp are treated as infinitely old
        let last_modified = output
            .last_modified()
            .and_then(to_chrono)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let bytes = output.body.collect().await.map_err(|e| {
            AppError::Cache(format!("Failed to read body of s3://{}/{}: {}", self.bucket, key, e))
        })?;

        Ok(Some(DurableEntry {
            body: bytes.into_bytes().to_vec(),
            last_modified,
        }))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> AppResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Cache(format!("Failed to write s3://{}/{}: {}", self.bucket, key, e)))?;

        tracing::debug!("Stored s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversion() {
        let ts = aws_sdk_s3::primitives::DateTime::from_secs(1_700_000_000);
        let converted = to_chrono(&ts).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }
}
