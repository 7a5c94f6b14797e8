//! Anonymous access to public objects over plain HTTP(S).
//!
//! Objects are addressed path-style: `{endpoint}/{bucket}/{key}`. Requests are
//! unsigned, so this only works for publicly readable buckets or endpoints that
//! do not require authentication.
use super::{RangeFetcher, SizeProbe, check_length};
use crate::error::{Result, TransferError};
use crate::plan::{ObjectLocator, Part};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, RANGE};
use tracing::trace;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpStore {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("s3-ranged-get/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransferError::InvalidConfig(format!("http client: {e}")))?;
        Self::with_client(client, endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| TransferError::InvalidConfig(format!("endpoint {endpoint:?}: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(TransferError::InvalidConfig(format!(
                "endpoint {endpoint} cannot carry a path"
            )));
        }
        Ok(Self { client, endpoint })
    }

    /// Builds the object URL, percent-encoding each key segment.
    pub fn object_url(&self, locator: &ObjectLocator) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&locator.bucket)
                .extend(locator.key.split('/'));
        }
        url
    }
}

#[async_trait]
impl SizeProbe for HttpStore {
    async fn content_length(&self, locator: &ObjectLocator) -> Result<u64> {
        let metadata_error = |message: String| TransferError::RemoteMetadata {
            code: None,
            message,
        };

        let response = self
            .client
            .head(self.object_url(locator))
            .send()
            .await
            .map_err(|e| metadata_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::RemoteMetadata {
                code: Some(status.as_u16().to_string()),
                message: format!("HEAD {locator} returned {status}"),
            });
        }

        // HEAD bodies are empty, so read the header rather than the body length.
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .ok_or_else(|| metadata_error("Content-Length not found in response header".into()))?
            .to_str()
            .map_err(|e| metadata_error(e.to_string()))?
            .parse::<u64>()
            .map_err(|e| metadata_error(format!("invalid Content-Length: {e}")))?;

        Ok(content_length)
    }
}

#[async_trait]
impl RangeFetcher for HttpStore {
    async fn fetch_range(&self, locator: &ObjectLocator, part: Part) -> Result<Bytes> {
        let fetch_error = |message: String| TransferError::RangeFetch { part, message };

        let response = self
            .client
            .get(self.object_url(locator))
            .header(RANGE, part.http_range())
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("server returned {status}")));
        }
        if status != StatusCode::PARTIAL_CONTENT {
            // A full 200 body is only acceptable when the part is the whole object.
            let whole_object = status == StatusCode::OK
                && part.start == 0
                && response.content_length() == Some(part.len);
            if !whole_object {
                return Err(fetch_error(format!(
                    "server ignored range, returned {status}"
                )));
            }
            trace!(%status, %part, "server returned whole object for range request");
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        check_length(part, data)
    }
}
