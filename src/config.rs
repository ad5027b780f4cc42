//! Runtime settings for the `bank-rails` binary.
//!
//! Every setting is a long flag backed by a `BANK_RAILS_*` environment
//! variable and a default. The binary flattens [`Settings`] into its command
//! line; library types never read the environment themselves.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::account;
use crate::engine::DEFAULT_SYMBOL;
use crate::model::{RoutingNumber, TrendSignal};
use crate::retry::RetryPolicy;
use crate::routing::cache;

pub const ENV_PREFIX: &str = "BANK_RAILS_";

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";
pub const DEFAULT_DIRECTORY_URL: &str = "http://localhost:8081";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_BANK_NAME: &str = "Capetain Cetriva";
/// Routing number of the default bank, used when resolution fails.
pub const DEFAULT_ROUTING_NUMBER: &str = "021000021";
pub const DEFAULT_PAYMENT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_LOOKUP_BACKOFF_MS: u64 = 1_000;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Payment gateway base URL
    #[arg(long, env = "BANK_RAILS_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: String,

    /// Bearer token sent to the payment gateway
    #[arg(long, env = "BANK_RAILS_GATEWAY_TOKEN", hide_env_values = true)]
    pub gateway_token: Option<String>,

    /// Routing directory base URL
    #[arg(long, env = "BANK_RAILS_DIRECTORY_URL", default_value = DEFAULT_DIRECTORY_URL)]
    pub directory_url: String,

    #[arg(
        long,
        env = "BANK_RAILS_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS
    )]
    pub http_timeout_secs: u64,

    /// Routing number cache file
    #[arg(long, env = "BANK_RAILS_CACHE_PATH", default_value = cache::DEFAULT_PATH)]
    pub cache_path: PathBuf,

    #[arg(long, env = "BANK_RAILS_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Bank whose routing number the payments use
    #[arg(long, env = "BANK_RAILS_BANK_NAME", default_value = DEFAULT_BANK_NAME)]
    pub bank_name: String,

    /// Routing number used when the bank name cannot be resolved
    #[arg(long, env = "BANK_RAILS_ROUTING_NUMBER", default_value = DEFAULT_ROUTING_NUMBER)]
    pub fallback_routing: RoutingNumber,

    /// Market outlook applied to the equities bucket
    #[arg(
        long,
        env = "BANK_RAILS_TREND_SIGNAL",
        value_enum,
        ignore_case = true,
        default_value_t = TrendSignal::Favorable
    )]
    pub trend_signal: TrendSignal,

    #[arg(long, env = "BANK_RAILS_TREND_SYMBOL", default_value = DEFAULT_SYMBOL)]
    pub trend_symbol: String,

    /// Length of generated beneficiary account numbers
    #[arg(
        long,
        env = "BANK_RAILS_ACCOUNT_LENGTH",
        default_value_t = account::DEFAULT_LENGTH,
        value_parser = account_length
    )]
    pub account_length: usize,

    #[arg(
        long,
        env = "BANK_RAILS_PAYMENT_RETRY_DELAY_MS",
        default_value_t = DEFAULT_PAYMENT_RETRY_DELAY_MS
    )]
    pub payment_retry_delay_ms: u64,

    /// Base of the exponential backoff between directory lookups
    #[arg(long, env = "BANK_RAILS_LOOKUP_BACKOFF_MS", default_value_t = DEFAULT_LOOKUP_BACKOFF_MS)]
    pub lookup_backoff_ms: u64,
}

impl Settings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Fixed pause between payment attempts.
    pub fn payment_retry(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            RetryPolicy::DEFAULT_ATTEMPTS,
            Duration::from_millis(self.payment_retry_delay_ms),
        )
    }

    /// Doubling pause between directory lookups.
    pub fn lookup_retry(&self) -> RetryPolicy {
        RetryPolicy::exponential(
            RetryPolicy::DEFAULT_ATTEMPTS,
            Duration::from_millis(self.lookup_backoff_ms),
        )
    }
}

fn account_length(value: &str) -> Result<usize, String> {
    let length: usize = value.trim().parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
    if length < account::MIN_LENGTH {
        return Err(format!("must be at least {}", account::MIN_LENGTH));
    }
    Ok(length)
}
