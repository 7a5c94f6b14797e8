//! # s3-ranged-get
//!
//! `s3-ranged-get` downloads one large object from S3-compatible storage by
//! splitting it into fixed-size byte ranges and fetching them concurrently.
//! It supports:
//! - A bounded worker pool with first-error-wins abort
//! - Positional writes, so parts may complete in any order
//! - Signed (aws-sdk-s3) and anonymous (plain HTTP) backends
//! - Optional progress reporting, retries and cancellation
//!
//! The [`TransferCoordinator`] is the entry point; the binary is a thin CLI
//! around it.

pub mod config;
pub mod coordinator;
pub mod downloader;
pub mod error;
pub mod observer;
pub mod plan;
pub mod store;
pub mod writer;

pub use config::{StoreConfig, TransferConfig};
pub use coordinator::{TransferCoordinator, TransferOutcome, TransferState};
pub use error::{Result, TransferError};
pub use observer::{ConsoleObserver, NoopObserver, ProgressObserver};
pub use plan::{ObjectLocator, Part, plan_parts};
pub use store::{HttpStore, RangeFetcher, RetryingFetcher, S3Store, SizeProbe};
pub use writer::{FileWriter, MemoryWriter, PositionalWriter};
