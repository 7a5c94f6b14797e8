//! Transfer and store configuration.
//!
//! Both values are built once by the caller and handed to the engine; nothing
//! here reads the process environment.
use crate::error::{Result, TransferError};

/// 64 MiB per part.
pub const DEFAULT_PART_SIZE: u64 = 64 * 1024 * 1024;
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Shape of one transfer. Fixed for its whole duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    /// Maximum number of bytes fetched per request.
    pub part_size: u64,
    /// Number of parts fetched at once.
    pub concurrency: usize,
    /// Whether to render a progress bar.
    pub show_progress: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            show_progress: true,
        }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<()> {
        if self.part_size == 0 {
            return Err(TransferError::InvalidConfig(
                "part size must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(TransferError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Connection settings for the object store.
///
/// Empty credentials are accepted here and rejected by the store on first use.
#[derive(Clone, Default)]
pub struct StoreConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// Overrides the regional endpoint (S3-compatible services, local mocks).
    pub endpoint_url: Option<String>,
}

impl StoreConfig {
    /// Base URL for path-style requests.
    pub fn endpoint(&self) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", self.region))
    }
}

// Keep secrets out of logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}
