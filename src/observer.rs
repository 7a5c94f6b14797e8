//! Progress reporting.
//!
//! Observers are notified as parts land on the destination. They are purely
//! informational: nothing they do can fail or stall a transfer.
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {decimal_bytes}/{decimal_total_bytes} ({decimal_bytes_per_sec}, {eta})";

pub trait ProgressObserver: Send + Sync {
    /// Called once the total size is known, before any bytes are reported.
    fn start(&self, _total: u64) {}

    /// `n` more bytes were written to the destination.
    fn inc(&self, n: u64);

    /// Short status line, e.g. the reason a transfer failed.
    fn message(&self, _msg: String) {}

    /// Called exactly once when the transfer ends, successfully or not.
    fn finish(&self);
}

/// Terminal progress bar.
pub struct ConsoleObserver {
    pub pb: ProgressBar,
}

impl ConsoleObserver {
    pub fn new(label: impl Into<String>) -> Self {
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message(label.into());
        Self { pb }
    }
}

impl ProgressObserver for ConsoleObserver {
    fn start(&self, total: u64) {
        self.pb.set_length(total);
    }

    fn inc(&self, n: u64) {
        self.pb.inc(n);
    }

    fn message(&self, msg: String) {
        self.pb.set_message(msg);
    }

    fn finish(&self) {
        self.pb.finish();
    }
}

/// Used when progress reporting is turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn inc(&self, _n: u64) {}

    fn finish(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_observer_tracks_bytes() {
        let observer = ConsoleObserver {
            pb: ProgressBar::hidden(),
        };
        observer.start(100);
        observer.inc(40);
        observer.inc(60);
        assert_eq!(observer.pb.length(), Some(100));
        assert_eq!(observer.pb.position(), 100);

        observer.message("Failed: disk full".into());
        assert_eq!(observer.pb.message(), "Failed: disk full");

        observer.finish();
        assert!(observer.pb.is_finished());
    }
}
