//! Command-line entrypoint for `s3-ranged-get`.
//!
//! Parses arguments, builds the store from explicit configuration, probes
//! the object, pre-allocates the destination and hands the rest to the
//! transfer engine.
mod args;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use s3_ranged_get::downloader::{destination_path, prepare_destination};
use s3_ranged_get::{
    ConsoleObserver, FileWriter, HttpStore, NoopObserver, ObjectLocator, ProgressObserver,
    RangeFetcher, RetryingFetcher, S3Store, SizeProbe, TransferCoordinator,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.transfer_config();
    let store_config = args.store_config();
    let locator = ObjectLocator::new(&args.bucket, &args.item);
    info!(%locator, ?config, ?store_config, "starting download");

    let (probe, fetcher): (Arc<dyn SizeProbe>, Arc<dyn RangeFetcher>) = if args.anonymous {
        let store = Arc::new(HttpStore::new(&store_config.endpoint())?);
        (store.clone(), store)
    } else {
        let store = Arc::new(S3Store::new(&store_config));
        (store.clone(), store)
    };

    let fetcher: Arc<dyn RangeFetcher> = if args.retries > 0 {
        Arc::new(RetryingFetcher::new(fetcher, args.retries, RETRY_BASE_DELAY))
    } else {
        fetcher
    };

    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived Ctrl+C. Finishing in-flight parts...");
            signal_token.cancel();
        }
    });

    let coordinator = TransferCoordinator::new(config, Arc::clone(&probe), fetcher)?
        .with_cancellation(cancel_token);

    // Probe before creating the file so it can be pre-allocated.
    let size = probe.content_length(&locator).await?;

    let output_path = destination_path(&args.path, &args.item);
    let file = prepare_destination(&output_path, size)
        .await
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    let file = Arc::new(file);

    let observer: Arc<dyn ProgressObserver> = if config.show_progress {
        Arc::new(ConsoleObserver::new(args.item.clone()))
    } else {
        Arc::new(NoopObserver)
    };

    let bytes = coordinator
        .download_with_size(
            &locator,
            size,
            Arc::new(FileWriter::new(Arc::clone(&file))),
            observer,
        )
        .await
        .into_result()
        .with_context(|| format!("error downloading {locator}"))?;

    file.sync_all()
        .with_context(|| format!("failed to flush {}", output_path.display()))?;

    println!("Download completed {} {} bytes", output_path.display(), bytes);
    Ok(())
}
