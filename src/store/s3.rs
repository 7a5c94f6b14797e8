//! Signed access to S3 and S3-compatible stores through `aws-sdk-s3`.
//!
//! Credentials and region come from an explicit [`StoreConfig`]; the SDK's own
//! retry layer is disabled so every request is a single attempt.
use super::{RangeFetcher, SizeProbe, check_length};
use crate::config::StoreConfig;
use crate::error::{Result, TransferError};
use crate::plan::{ObjectLocator, Part};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use bytes::Bytes;
use std::fmt::Debug;

const PROVIDER_NAME: &str = "s3-ranged-get";

#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(config: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            config.session_token.clone(),
            None,
            PROVIDER_NAME,
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

/// Provider code and message when the service answered, otherwise the full
/// transport error chain.
fn describe<E, R>(err: &SdkError<E, R>) -> (Option<String>, String)
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    let service = err.as_service_error();
    let code = service.and_then(|e| e.code()).map(str::to_owned);
    let message = service
        .and_then(|e| e.message())
        .map(str::to_owned)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());
    (code, message)
}

#[async_trait]
impl SizeProbe for S3Store {
    async fn content_length(&self, locator: &ObjectLocator) -> Result<u64> {
        let output = self
            .client
            .head_object()
            .bucket(&locator.bucket)
            .key(&locator.key)
            .send()
            .await
            .map_err(|e| {
                let (code, message) = describe(&e);
                TransferError::RemoteMetadata { code, message }
            })?;

        let length = output
            .content_length()
            .ok_or_else(|| TransferError::RemoteMetadata {
                code: None,
                message: format!("no content length returned for {locator}"),
            })?;

        u64::try_from(length).map_err(|_| TransferError::RemoteMetadata {
            code: None,
            message: format!("negative content length {length} for {locator}"),
        })
    }
}

#[async_trait]
impl RangeFetcher for S3Store {
    async fn fetch_range(&self, locator: &ObjectLocator, part: Part) -> Result<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&locator.bucket)
            .key(&locator.key)
            .range(part.http_range())
            .send()
            .await
            .map_err(|e| {
                let (code, message) = describe(&e);
                let message = match code {
                    Some(code) => format!("{code}: {message}"),
                    None => message,
                };
                TransferError::RangeFetch { part, message }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| TransferError::RangeFetch {
                part,
                message: e.to_string(),
            })?
            .into_bytes();

        check_length(part, data)
    }
}
