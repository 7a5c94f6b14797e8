use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser};
use s3_ranged_get::config::{DEFAULT_CONCURRENCY, DEFAULT_PART_SIZE};
use s3_ranged_get::{StoreConfig, TransferConfig};
use std::path::PathBuf;

/// Downloads one object from S3 in parallel byte ranges.
///
/// The object is split into parts that are fetched concurrently and
/// written straight to their offsets in `PATH/ITEM`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Bucket holding the object.
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub bucket: String,

    /// Key of the object. Also names the file written into PATH.
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub item: String,

    /// Directory to write the file into.
    pub path: PathBuf,

    /// Bytes fetched per request.
    #[arg(long, default_value_t = DEFAULT_PART_SIZE)]
    pub part_size: u64,

    /// Number of parts fetched at once.
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Do not render a progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Retries per failed part (0 = single attempt).
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    #[arg(long, env = "AWS_REGION", default_value = "")]
    pub region: String,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", default_value = "", hide_env_values = true)]
    pub access_key_id: String,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", default_value = "", hide_env_values = true)]
    pub secret_access_key: String,

    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// Custom endpoint for S3-compatible services.
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Send unsigned requests (public buckets).
    #[arg(long)]
    pub anonymous: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig {
            part_size: self.part_size,
            concurrency: self.concurrency,
            show_progress: !self.no_progress,
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            region: self.region.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }
}
