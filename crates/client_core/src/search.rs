//! Suggestion lookup seam consumed by type-ahead fields.

use async_trait::async_trait;
use shared::domain::Suggestion;
use thiserror::Error;

use crate::ScheduleApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionQuery {
    pub text: String,
    pub country: Option<String>,
    pub limit: usize,
}

impl SuggestionQuery {
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            country: None,
            limit,
        }
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The request was aborted on purpose; never a user-facing failure.
    #[error("search request cancelled")]
    Cancelled,
    #[error("search request timed out")]
    Timeout,
    #[error("search transport failure: {0}")]
    Transport(String),
    #[error("search backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid search response: {0}")]
    Decode(String),
}

impl SearchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Ordered candidate lookup. Ranking belongs to the implementation;
/// callers render results in the order returned. Dropping the returned
/// future cancels the call.
#[async_trait]
pub trait SuggestionSearch: Send + Sync {
    async fn search(&self, query: &SuggestionQuery) -> Result<Vec<Suggestion>, SearchError>;
}

/// Port lookup over `/api/ports/search`.
#[derive(Clone)]
pub struct PortSearch {
    client: ScheduleApiClient,
}

impl PortSearch {
    pub fn new(client: ScheduleApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SuggestionSearch for PortSearch {
    async fn search(&self, query: &SuggestionQuery) -> Result<Vec<Suggestion>, SearchError> {
        let ports = self
            .client
            .search_ports(&query.text, query.country.as_deref(), query.limit)
            .await?;
        Ok(ports.into_iter().map(Suggestion::from).collect())
    }
}

/// Carrier lookup over `/api/carriers/search`.
#[derive(Clone)]
pub struct CarrierSearch {
    client: ScheduleApiClient,
}

impl CarrierSearch {
    pub fn new(client: ScheduleApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SuggestionSearch for CarrierSearch {
    async fn search(&self, query: &SuggestionQuery) -> Result<Vec<Suggestion>, SearchError> {
        let carriers = self
            .client
            .search_carriers(&query.text, query.limit)
            .await?;
        Ok(carriers.into_iter().map(Suggestion::from).collect())
    }
}
