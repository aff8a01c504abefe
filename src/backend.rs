use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::models::{ComparisonRow, District, MonthlyRecord};

/// The REST surface the dashboard reads from.
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn districts(&self) -> Result<Vec<District>, FetchError>;
    async fn district_months(&self, district_id: u32) -> Result<Vec<MonthlyRecord>, FetchError>;
    /// Rows come back in whatever order the backend chooses.
    async fn compare(&self, district_ids: &[u32]) -> Result<Vec<ComparisonRow>, FetchError>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpBackend { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let response = match self.client.get(url.as_str()).send().await {
            Ok(r) => r,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

/// `1,2,3` as the compare endpoint expects it.
fn join_ids(ids: &[u32]) -> String {
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
}

#[async_trait]
impl MetricsBackend for HttpBackend {
    async fn districts(&self) -> Result<Vec<District>, FetchError> {
        self.get_json(self.url("/districts")).await
    }

    async fn district_months(&self, district_id: u32) -> Result<Vec<MonthlyRecord>, FetchError> {
        self.get_json(self.url(&format!("/districts/{}/months", district_id))).await
    }

    async fn compare(&self, district_ids: &[u32]) -> Result<Vec<ComparisonRow>, FetchError> {
        self.get_json(self.url(&format!("/compare?districts={}", join_ids(district_ids))))
            .await
    }
}
