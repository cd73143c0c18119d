use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use shared::{
    error::ApiException,
    protocol::{
        CarrierRecord, ExportFormat, HealthResponse, PageRequest, PortRecord, ScheduleFilter,
        SchedulePage,
    },
};
use tracing::debug;
use url::Url;

pub mod search;

pub use search::{CarrierSearch, PortSearch, SearchError, SuggestionQuery, SuggestionSearch};

/// Upper bound the backend accepts for `limit` on suggestion endpoints.
pub const MAX_SUGGESTION_LIMIT: usize = 50;

/// The ports endpoint has shipped both a bare array and an `items`
/// envelope; accept either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortSearchResponse {
    Wrapped { items: Vec<PortRecord> },
    Bare(Vec<PortRecord>),
}

impl PortSearchResponse {
    fn into_items(self) -> Vec<PortRecord> {
        match self {
            Self::Wrapped { items } => items,
            Self::Bare(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CarrierSearchResponse {
    Wrapped { items: Vec<CarrierRecord> },
    Bare(Vec<CarrierRecord>),
}

impl CarrierSearchResponse {
    fn into_items(self) -> Vec<CarrierRecord> {
        match self {
            Self::Wrapped { items } => items,
            Self::Bare(items) => items,
        }
    }
}

/// HTTP client for the schedule-search backend.
#[derive(Clone)]
pub struct ScheduleApiClient {
    http: Client,
    base_url: String,
}

impl ScheduleApiClient {
    pub fn new(base_url: &Url) -> Result<Self> {
        Self::with_http_client(base_url, Client::new())
    }

    pub fn with_http_client(base_url: &Url, http: Client) -> Result<Self> {
        match base_url.scheme() {
            "http" | "https" => {}
            other => return Err(anyhow!("api url must use http or https, got {other}")),
        }
        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, SearchError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, params = query.len(), "GET");
        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let exc = ApiException::from_body(status.as_u16(), &body);
        Err(SearchError::Status {
            status: exc.status,
            message: exc.message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SearchError> {
        let response = self.get(path, query).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SearchError::Decode(e.to_string()))
    }

    pub async fn search_ports(
        &self,
        query: &str,
        country: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PortRecord>, SearchError> {
        let mut params = vec![
            ("q", query.trim().to_string()),
            ("limit", limit.clamp(1, MAX_SUGGESTION_LIMIT).to_string()),
        ];
        if let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) {
            params.push(("country", country.to_ascii_uppercase()));
        }
        let response: PortSearchResponse = self.get_json("/api/ports/search", &params).await?;
        Ok(response.into_items())
    }

    pub async fn search_carriers(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CarrierRecord>, SearchError> {
        let params = [
            ("q", query.trim().to_string()),
            ("limit", limit.clamp(1, MAX_SUGGESTION_LIMIT).to_string()),
        ];
        let response: CarrierSearchResponse =
            self.get_json("/api/carriers/search", &params).await?;
        Ok(response.into_items())
    }

    pub async fn list_schedules(
        &self,
        filter: &ScheduleFilter,
        page: PageRequest,
    ) -> Result<SchedulePage> {
        let mut params = filter.query_pairs();
        params.push(("page", page.page.max(1).to_string()));
        params.push(("pageSize", page.page_size.max(1).to_string()));
        self.get_json("/api/schedules", &params)
            .await
            .context("failed to list schedules")
    }

    /// Full matching set in the export's fixed column order.
    pub async fn export_schedules(
        &self,
        filter: &ScheduleFilter,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        let response = self
            .get(format.endpoint(), &filter.query_pairs())
            .await
            .with_context(|| format!("failed to export schedules as {}", format.file_name()))?;
        let bytes = response
            .bytes()
            .await
            .context("failed to read export body")?;
        Ok(bytes.to_vec())
    }

    pub async fn health(&self) -> Result<bool> {
        let response: HealthResponse = self
            .get_json("/health", &[])
            .await
            .context("health check failed")?;
        Ok(response.ok)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
