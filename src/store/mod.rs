//! Read-only access to remote objects.
//!
//! The engine needs two operations from a backend: the object's length and
//! the bytes of one range. Each is a separate trait so a test can fake one
//! without the other.
use crate::error::Result;
use crate::plan::{ObjectLocator, Part};
use async_trait::async_trait;
use bytes::Bytes;

pub mod http;
pub mod retry;
pub mod s3;

pub use http::HttpStore;
pub use retry::RetryingFetcher;
pub use s3::S3Store;

/// Metadata-only round trip returning the object's total length.
#[async_trait]
pub trait SizeProbe: Send + Sync {
    /// Fails with [`TransferError::RemoteMetadata`](crate::TransferError::RemoteMetadata).
    async fn content_length(&self, locator: &ObjectLocator) -> Result<u64>;
}

/// Retrieves exactly one part of an object in a single attempt.
#[async_trait]
pub trait RangeFetcher: Send + Sync {
    /// Returns exactly `part.len` bytes. Fails with `RangeFetch` on transport
    /// or protocol errors and `ShortRead` on a length mismatch.
    async fn fetch_range(&self, locator: &ObjectLocator, part: Part) -> Result<Bytes>;
}

/// Checks that a payload covers the whole part.
pub(crate) fn check_length(part: Part, data: Bytes) -> Result<Bytes> {
    let actual = data.len() as u64;
    if actual != part.len {
        return Err(crate::TransferError::ShortRead {
            part,
            expected: part.len,
            actual,
        });
    }
    Ok(data)
}

#[async_trait]
impl<T: SizeProbe + ?Sized> SizeProbe for std::sync::Arc<T> {
    async fn content_length(&self, locator: &ObjectLocator) -> Result<u64> {
        (**self).content_length(locator).await
    }
}

#[async_trait]
impl<T: RangeFetcher + ?Sized> RangeFetcher for std::sync::Arc<T> {
    async fn fetch_range(&self, locator: &ObjectLocator, part: Part) -> Result<Bytes> {
        (**self).fetch_range(locator, part).await
    }
}
