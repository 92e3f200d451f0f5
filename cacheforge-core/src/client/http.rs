//! HTTP client for the cache service REST API and its actuator endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use cacheforge_types::{
    ApiErrorBody, CounterName, MetricResponse, OperationResponse, RawSnapshot, SetRequest,
};

use super::{select_measurement, CacheOperations, SnapshotClient};
use crate::config::EndpointConfig;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct HttpCacheClient {
    client: Client,
    base_url: Url,
}

impl HttpCacheClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Ok(Self { client, base_url })
    }

    pub fn from_config(endpoint: &EndpointConfig) -> Result<Self, FetchError> {
        Self::new(&endpoint.base_url, endpoint.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends each segment percent-encoded, so `/` or `?` inside a key stays part of it.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let error = serde_json::from_slice::<ApiErrorBody>(&body).ok();
            return Err(FetchError::Status {
                status: status.as_u16(),
                code: error.as_ref().map(|e| e.error_code.clone()),
                message: error.map(|e| e.message).filter(|m| !m.is_empty()),
            });
        }

        serde_json::from_slice(&body).map_err(|e| FetchError::decode(e.to_string()))
    }
}

#[async_trait]
impl SnapshotClient for HttpCacheClient {
    async fn fetch_snapshot(&self) -> Result<RawSnapshot, FetchError> {
        let url = self.endpoint(&["api", "cache", "state"])?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn fetch_counter(&self, counter: CounterName) -> Result<f64, FetchError> {
        let url = self.endpoint(&["actuator", "metrics", counter.metric_name()])?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let metric: MetricResponse = Self::decode(response).await?;
        select_measurement(&metric, counter)
    }
}

#[async_trait]
impl CacheOperations for HttpCacheClient {
    async fn set(&self, request: &SetRequest) -> Result<OperationResponse, FetchError> {
        let url = self.endpoint(&["api", "cache", "set"])?;
        debug!("POST {}", url);
        let response = self.client.post(url).json(request).send().await?;
        Self::decode(response).await
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<OperationResponse, FetchError> {
        let url = self.endpoint(&["api", "cache", "get", namespace, key])?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<OperationResponse, FetchError> {
        let url = self.endpoint(&["api", "cache", "del", namespace, key])?;
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        Self::decode(response).await
    }
}
