//! In-memory `ConfigStore`. Backs controller tests and the `--offline`
//! session; cloning shares the underlying records, so a test can keep a
//! handle while the editor owns its clone.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::{ConfigStore, StoreError};
use crate::records::Record;

#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    fail_requests: bool,
}

impl InMemoryConfigStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                records,
                fail_requests: false,
            })),
        }
    }

    /// Snapshot of the stored records.
    #[cfg(test)]
    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().unwrap().records.clone()
    }

    /// Make subsequent load/save calls fail with a server error.
    #[cfg(test)]
    pub fn set_fail_requests(&self, fail: bool) {
        self.inner.lock().unwrap().fail_requests = fail;
    }

    fn server_error() -> StoreError {
        StoreError::Server {
            url: "memory:consumer_configs".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_requests {
            return Err(Self::server_error());
        }
        Ok(inner.records.clone())
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_requests {
            return Err(Self::server_error());
        }
        inner.records = records.to_vec();
        Ok(())
    }
}
