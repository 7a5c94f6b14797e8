//! The parallel ranged-transfer engine.
//!
//! A transfer moves through `Planning -> Running -> {Completed | Failed}`.
//! During `Running` a fixed pool of workers claims parts from a shared cursor,
//! fetches each one, and writes it at its start offset. The first error stops
//! further claims; parts already in flight are allowed to finish.
use crate::config::TransferConfig;
use crate::error::{Result, TransferError};
use crate::observer::ProgressObserver;
use crate::plan::{ObjectLocator, Part, plan_parts};
use crate::store::{RangeFetcher, SizeProbe};
use crate::writer::PositionalWriter;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Planning,
    Running,
    Completed,
    Failed,
}

/// Result of one transfer, produced after every part has resolved.
#[derive(Debug)]
pub struct TransferOutcome {
    /// Bytes written to the destination, including those of parts that
    /// finished after a failure was recorded.
    pub bytes_written: u64,
    /// The first fatal error, if any.
    pub error: Option<TransferError>,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn state(&self) -> TransferState {
        if self.is_success() {
            TransferState::Completed
        } else {
            TransferState::Failed
        }
    }

    pub fn into_result(self) -> Result<u64> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.bytes_written),
        }
    }
}

pub struct TransferCoordinator {
    config: TransferConfig,
    probe: Arc<dyn SizeProbe>,
    fetcher: Arc<dyn RangeFetcher>,
    cancel: CancellationToken,
}

impl TransferCoordinator {
    pub fn new(
        config: TransferConfig,
        probe: Arc<dyn SizeProbe>,
        fetcher: Arc<dyn RangeFetcher>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            probe,
            fetcher,
            cancel: CancellationToken::new(),
        })
    }

    /// Stops claiming new parts once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Probes the object size, then transfers the whole object.
    ///
    /// A probe failure ends the transfer before any part is requested.
    pub async fn download(
        &self,
        locator: &ObjectLocator,
        writer: Arc<dyn PositionalWriter>,
        observer: Arc<dyn ProgressObserver>,
    ) -> TransferOutcome {
        debug!(state = ?TransferState::Planning, %locator, "probing object size");
        match self.probe.content_length(locator).await {
            Ok(total_size) => {
                self.download_with_size(locator, total_size, writer, observer)
                    .await
            }
            Err(e) => {
                warn!(state = ?TransferState::Failed, %locator, error = %e, "size probe failed");
                observer.message(format!("Failed: {e}"));
                observer.finish();
                TransferOutcome {
                    bytes_written: 0,
                    error: Some(e),
                }
            }
        }
    }

    /// Transfers an object whose size is already known.
    pub async fn download_with_size(
        &self,
        locator: &ObjectLocator,
        total_size: u64,
        writer: Arc<dyn PositionalWriter>,
        observer: Arc<dyn ProgressObserver>,
    ) -> TransferOutcome {
        let parts = plan_parts(total_size, self.config.part_size);
        debug!(
            state = ?TransferState::Planning,
            %locator,
            total_size,
            parts = parts.len(),
            part_size = self.config.part_size,
            "planned transfer"
        );
        observer.start(total_size);

        let outcome = if parts.is_empty() {
            TransferOutcome {
                bytes_written: 0,
                error: None,
            }
        } else {
            self.run(locator, parts, writer, Arc::clone(&observer)).await
        };

        if let Some(e) = &outcome.error {
            observer.message(format!("Failed: {e}"));
        }
        observer.finish();

        match &outcome.error {
            None => {
                debug_assert_eq!(outcome.bytes_written, total_size);
                info!(
                    state = ?TransferState::Completed,
                    %locator,
                    bytes = outcome.bytes_written,
                    "transfer completed"
                );
            }
            Some(e) => warn!(
                state = ?TransferState::Failed,
                %locator,
                bytes = outcome.bytes_written,
                error = %e,
                "transfer failed"
            ),
        }
        outcome
    }

    async fn run(
        &self,
        locator: &ObjectLocator,
        parts: Vec<Part>,
        writer: Arc<dyn PositionalWriter>,
        observer: Arc<dyn ProgressObserver>,
    ) -> TransferOutcome {
        let workers = self.config.concurrency.min(parts.len());
        let pool = Arc::new(WorkerPool {
            locator: locator.clone(),
            parts,
            next: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
            stop: AtomicBool::new(false),
            first_error: Mutex::new(None),
            fetcher: Arc::clone(&self.fetcher),
            writer,
            observer,
            cancel: self.cancel.clone(),
        });

        debug!(state = ?TransferState::Running, workers, "starting workers");
        let mut tasks = JoinSet::new();
        for worker in 0..workers {
            let pool = Arc::clone(&pool);
            tasks.spawn(async move { pool.work(worker).await });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                pool.record_error(TransferError::Worker(e.to_string()));
            }
        }

        let error = pool
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        TransferOutcome {
            bytes_written: pool.bytes_written.load(Ordering::SeqCst),
            error,
        }
    }
}

/// State shared by the workers of one transfer.
struct WorkerPool {
    locator: ObjectLocator,
    parts: Vec<Part>,
    /// Index of the next unclaimed part.
    next: AtomicUsize,
    bytes_written: AtomicU64,
    stop: AtomicBool,
    first_error: Mutex<Option<TransferError>>,
    fetcher: Arc<dyn RangeFetcher>,
    writer: Arc<dyn PositionalWriter>,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
}

impl WorkerPool {
    async fn work(&self, worker: usize) {
        while let Some(part) = self.claim() {
            match self.transfer(part).await {
                Ok(written) => {
                    self.bytes_written.fetch_add(written, Ordering::SeqCst);
                    self.observer.inc(written);
                    trace!(worker, %part, "part written");
                }
                Err(e) => {
                    self.record_error(e);
                    break;
                }
            }
        }
    }

    /// Hands out each part at most once. Returns `None` when the plan is
    /// exhausted or the transfer is stopping.
    fn claim(&self) -> Option<Part> {
        if self.stop.load(Ordering::Acquire) {
            return None;
        }
        let part = *self.parts.get(self.next.fetch_add(1, Ordering::AcqRel))?;
        if self.cancel.is_cancelled() {
            self.record_error(TransferError::Cancelled);
            return None;
        }
        Some(part)
    }

    async fn transfer(&self, part: Part) -> Result<u64> {
        let data = self.fetcher.fetch_range(&self.locator, part).await?;
        let written = self
            .writer
            .write_at(data, part.start)
            .await
            .map_err(|source| TransferError::Write { part, source })?;
        Ok(written as u64)
    }

    /// First error wins; later ones are logged and dropped.
    fn record_error(&self, e: TransferError) {
        self.stop.store(true, Ordering::Release);
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            warn!(error = %e, "stopping transfer, no new parts will be started");
            *slot = Some(e);
        } else {
            debug!(error = %e, "discarding error after first failure");
        }
    }
}
