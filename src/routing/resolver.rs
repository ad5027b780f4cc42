//! Bank name to routing number resolution, cache first.

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;
use tracing::{error, info, warn};

use super::cache::{CacheEntry, RoutingCache};
use super::directory::{DirectoryError, DirectoryReply, RoutingDirectory};
use crate::model::RoutingNumber;
use crate::retry::RetryPolicy;

/// JSON field and XML element carrying the routing number.
pub const ROUTING_FIELD: &str = "routingNumber";

/// Why a single directory lookup failed.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("directory returned status {0}")]
    Status(u16),

    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),

    #[error("malformed json body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed xml body: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("response has no {ROUTING_FIELD}")]
    MissingField,

    #[error("directory returned invalid routing number '{0}'")]
    InvalidRoutingNumber(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid argument: bank name is empty")]
    EmptyBankName,

    #[error("routing number for '{bank_name}' not found after {attempts} attempts: {source}")]
    NotFound {
        bank_name: String,
        attempts: u32,
        #[source]
        source: LookupError,
    },
}

pub struct RoutingResolver<D> {
    directory: D,
    cache: RoutingCache,
    retry: RetryPolicy,
}

impl<D: RoutingDirectory> RoutingResolver<D> {
    /// Three attempts, sleeping 1s then 2s between them.
    pub fn default_retry() -> RetryPolicy {
        RetryPolicy::exponential(RetryPolicy::DEFAULT_ATTEMPTS, Duration::from_secs(1))
    }

    pub fn new(directory: D, cache: RoutingCache, retry: RetryPolicy) -> Self {
        Self {
            directory,
            cache,
            retry,
        }
    }

    /// Resolve `bank_name` to its routing number.
    ///
    /// - Fresh cache entries (keyed by lower-cased name) are returned without a lookup
    /// - On a miss the directory is queried, retrying with exponential backoff
    /// - A successful lookup is written back to the cache file
    pub async fn resolve(&self, bank_name: &str) -> Result<RoutingNumber, ResolveError> {
        let bank_name = bank_name.trim();
        if bank_name.is_empty() {
            return Err(ResolveError::EmptyBankName);
        }
        let key = bank_name.to_lowercase();

        let mut entries = self.cache.load().await;
        if let Some(entry) = entries.get(&key) {
            match RoutingNumber::parse(&entry.routing_number) {
                Some(routing) => {
                    info!(bank = bank_name, routing = %routing, "routing cache hit");
                    return Ok(routing);
                }
                None => warn!(
                    bank = bank_name,
                    cached = %entry.routing_number,
                    "ignoring cached routing number that fails validation"
                ),
            }
        }

        let mut attempt = 0;
        loop {
            match self.lookup(bank_name).await {
                Ok(routing) => {
                    entries.insert(key, CacheEntry::now(routing.as_str()));
                    if let Err(e) = self.cache.save(&entries).await {
                        error!(path = %self.cache.path().display(), error = %e, "failed to save routing cache");
                    }
                    info!(bank = bank_name, routing = %routing, "resolved routing number");
                    return Ok(routing);
                }
                Err(e) => {
                    warn!(bank = bank_name, attempt = attempt + 1, error = %e, "routing lookup failed");
                    if !self.retry.pause(attempt).await {
                        error!(bank = bank_name, attempts = attempt + 1, "giving up on routing lookup");
                        return Err(ResolveError::NotFound {
                            bank_name: bank_name.to_string(),
                            attempts: attempt + 1,
                            source: e,
                        });
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn lookup(&self, bank_name: &str) -> Result<RoutingNumber, LookupError> {
        let reply = self.directory.search(bank_name).await?;
        extract_routing_number(&reply)
    }
}

/// Pick the routing number out of a directory reply according to its content type.
fn extract_routing_number(reply: &DirectoryReply) -> Result<RoutingNumber, LookupError> {
    if !(200..300).contains(&reply.status) {
        return Err(LookupError::Status(reply.status));
    }

    let content_type = reply.content_type.as_deref().unwrap_or_default();
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let raw = match mime.as_str() {
        "application/json" => from_json(&reply.body)?,
        "application/xml" | "text/xml" => from_xml(&reply.body)?,
        _ => return Err(LookupError::UnsupportedContentType(content_type.to_string())),
    };

    RoutingNumber::parse(raw.trim()).ok_or(LookupError::InvalidRoutingNumber(raw))
}

fn from_json(body: &str) -> Result<String, LookupError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    value
        .get(ROUTING_FIELD)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or(LookupError::MissingField)
}

fn from_xml(body: &str) -> Result<String, LookupError> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut inside = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == ROUTING_FIELD.as_bytes() => inside = true,
            Event::Text(text) if inside => return Ok(text.unescape()?.into_owned()),
            Event::CData(data) if inside => return Ok(String::from_utf8_lossy(&data).into_owned()),
            Event::End(_) if inside => return Err(LookupError::MissingField),
            Event::Eof => return Err(LookupError::MissingField),
            _ => {}
        }
    }
}
