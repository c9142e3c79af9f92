use crate::domain::model::{Record, ServiceRequestTable, CREATED_DATE};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Single-page SoQL client for a Socrata resource endpoint.
#[derive(Debug, Clone)]
pub struct SocrataClient {
    client: Client,
    endpoint: String,
    limit: usize,
    app_token: Option<String>,
    timeout: Option<Duration>,
}

impl SocrataClient {
    pub fn new(endpoint: impl Into<String>, limit: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            limit,
            app_token: None,
            timeout: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        let mut client = Self::new(config.api_endpoint(), config.row_limit());
        client.app_token = config.app_token().map(str::to_string);
        client.timeout = config.request_timeout();
        client
    }

    pub fn with_app_token(mut self, token: impl Into<String>) -> Self {
        self.app_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn query_params(&self, since_iso: &str) -> Vec<(&'static str, String)> {
        vec![
            ("$limit", self.limit.to_string()),
            ("$where", format!("{} >= '{}'", CREATED_DATE, since_iso)),
            ("$order", format!("{} DESC", CREATED_DATE)),
        ]
    }

    /// Full request URL, used for dry runs and debug logging.
    pub fn request_url(&self, since_iso: &str) -> Result<Url> {
        Url::parse_with_params(&self.endpoint, self.query_params(since_iso)).map_err(|e| {
            EtlError::InvalidConfigValueError {
                field: "source.endpoint".to_string(),
                value: self.endpoint.clone(),
                reason: format!("Invalid URL format: {}", e),
            }
        })
    }

    /// 單次 GET，取回 `created_date >= since_iso` 的資料 (新到舊)
    pub async fn fetch_since(&self, since_iso: &str) -> Result<ServiceRequestTable> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params(since_iso));

        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        let response = response.error_for_status()?;
        let json_data: Value = response.json().await?;

        let items = match json_data {
            Value::Array(items) => items,
            other => {
                return Err(EtlError::ProcessingError {
                    message: format!(
                        "Expected a JSON array from {}, got {}",
                        self.endpoint,
                        json_kind(&other)
                    ),
                })
            }
        };

        let mut table = ServiceRequestTable::new();
        let mut skipped = 0usize;
        for item in items {
            match item {
                Value::Object(obj) => table.push(Record::from(obj)),
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::warn!("Skipped {} non-object elements in API response", skipped);
        }

        tracing::info!("📊 Fetched {} raw records", table.len());
        Ok(table)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
