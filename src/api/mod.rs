//! Persistence boundary: the `ConfigStore` trait plus its HTTP and in-memory
//! implementations. The editor depends on this trait only, never on a
//! concrete transport.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::records::Record;

pub use http::HttpConfigStore;
pub use memory::InMemoryConfigStore;

/// Environment variable selecting the consumer-config service.
pub const BASE_URL_ENV: &str = "PIPELINE_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

pub fn base_url_from_env() -> String {
    std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status} for {url}")]
    Server {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Async load/save of the flat consumer-config records.
///
/// Both calls are whole-collection: the backing service replaces its table on
/// save, so there is no per-record API here.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Record>, StoreError>;

    async fn save(&self, records: &[Record]) -> Result<(), StoreError>;
}
