//! HTTP implementation of `ConfigStore`, speaking to the consumer-config
//! service: GET/POST `<base>/consumer_configs`.

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ConfigStore, StoreError};
use crate::records::Record;

pub struct HttpConfigStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpConfigStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/consumer_configs", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ConfigStore for HttpConfigStore {
    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        let url = self.endpoint();
        debug!(%url, "loading consumer configs");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                url: url.clone(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(StoreError::Server {
                url,
                status: response.status(),
            });
        }
        response
            .json::<Vec<Record>>()
            .await
            .map_err(|source| StoreError::Transport { url, source })
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let url = self.endpoint();
        debug!(%url, count = records.len(), "saving consumer configs");

        let response = self
            .client
            .post(&url)
            .json(records)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                url: url.clone(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(StoreError::Server {
                url,
                status: response.status(),
            });
        }
        Ok(())
    }
}
