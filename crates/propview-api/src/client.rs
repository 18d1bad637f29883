use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::query::RecordQuery;
use crate::retry::{is_retryable_status, with_backoff, RetryConfig};

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record service request failed: {0}")]
    RequestFailed(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record service rejected the API key")]
    AuthRequired,

    #[error("record service rate limit exceeded")]
    RateLimited,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecordError>;

/// The free-form field map a record carries
pub type RecordFields = serde_json::Map<String, Value>;

/// One row in a hosted table: internal id plus its fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: RecordFields,
}

#[derive(Debug, Deserialize)]
struct RecordPage {
    records: Vec<TableRecord>,
}

/// Client for the hosted table-record service
pub struct RecordClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl RecordClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("propview/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Override the default retry policy
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run a query against a table; an empty query returns the whole table
    pub async fn query(&self, table: &str, query: &RecordQuery) -> Result<Vec<TableRecord>> {
        let url = format!("{}/query", self.table_url(table));
        debug!("querying table {table} with {} filters", query.filters.len());

        let response = self
            .execute(|| self.client.post(&url).bearer_auth(&self.api_key).json(query))
            .await?;
        let response = Self::check_status(response, table).await?;

        let page: RecordPage = response.json().await?;
        Ok(page.records)
    }

    /// Fetch one record by its internal id
    pub async fn get(&self, table: &str, id: &str) -> Result<TableRecord> {
        let url = self.record_url(table, id);

        let response = self
            .execute(|| self.client.get(&url).bearer_auth(&self.api_key))
            .await?;
        let response = Self::check_status(response, id).await?;

        Ok(response.json().await?)
    }

    /// Create a record; the service assigns the internal id
    pub async fn create(&self, table: &str, fields: RecordFields) -> Result<TableRecord> {
        let url = format!("{}/records", self.table_url(table));
        let body = serde_json::json!({ "fields": fields });

        let response = self
            .execute(|| self.client.post(&url).bearer_auth(&self.api_key).json(&body))
            .await?;
        let response = Self::check_status(response, table).await?;

        Ok(response.json().await?)
    }

    /// Merge the given fields into an existing record
    pub async fn update(&self, table: &str, id: &str, fields: RecordFields) -> Result<TableRecord> {
        let url = self.record_url(table, id);
        let body = serde_json::json!({ "fields": fields });

        let response = self
            .execute(|| {
                self.client
                    .patch(&url)
                    .bearer_auth(&self.api_key)
                    .json(&body)
            })
            .await?;
        let response = Self::check_status(response, id).await?;

        Ok(response.json().await?)
    }

    /// Delete a record, returning the deleted row
    pub async fn delete(&self, table: &str, id: &str) -> Result<TableRecord> {
        let url = self.record_url(table, id);

        let response = self
            .execute(|| self.client.delete(&url).bearer_auth(&self.api_key))
            .await?;
        let response = Self::check_status(response, id).await?;

        Ok(response.json().await?)
    }

    /// Send a request, retrying network failures and transient statuses
    async fn execute<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        with_backoff(&self.retry, || async {
            let response = build().send().await?;
            let status = response.status();

            if is_retryable_status(status) {
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(RecordError::RateLimited);
                }
                return Err(RecordError::RequestFailed(format!(
                    "transient status {status}"
                )));
            }

            Ok(response)
        })
        .await
    }

    /// Map terminal statuses to error kinds; retryable ones never reach here
    async fn check_status(response: reqwest::Response, subject: &str) -> Result<reqwest::Response> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RecordError::NotFound(subject.to_string()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RecordError::AuthRequired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecordError::RequestFailed(format!(
                "status {status}: {body}"
            )));
        }

        Ok(response)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/tables/{}", self.base_url, table)
    }

    fn record_url(&self, table: &str, id: &str) -> String {
        format!("{}/records/{}", self.table_url(table), id)
    }
}
