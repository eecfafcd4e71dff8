// src/overtime_client.rs
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::model::YearMonth;

// Error type for the usage API client
#[derive(Error, Debug)]
pub enum OvertimeError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Usage API error: Status={status}, Message={message}")]
    ApiError { status: StatusCode, message: String },
}

#[async_trait]
pub trait OvertimeSource: Send + Sync {
    /// Overtime minutes for the configured employee, `Ok(None)` when the month has no record.
    async fn fetch_overtime(&self, year_month: YearMonth) -> Result<Option<u32>, OvertimeError>;
}

#[derive(Debug, Clone)]
pub struct OvertimeApiConfig {
    pub base_url: String,
    pub endpoint: String,
    pub token: String,
    pub employee_key: String,
    pub division_id: String,
}

// The target employee's row of the monthly usage listing
#[derive(Debug, Deserialize)]
struct OvertimeRecord {
    #[serde(default)]
    overtime: Option<f64>,
}

impl OvertimeRecord {
    // Whole, non-negative minutes; `650.0` is accepted as 650
    fn minutes(&self) -> Result<u32, serde_json::Error> {
        match self.overtime {
            None => Ok(0),
            Some(value)
                if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) =>
            {
                Ok(value as u32)
            }
            Some(value) => Err(serde::de::Error::custom(format!(
                "overtime must be a whole, non-negative number of minutes, got {}",
                value
            ))),
        }
    }
}

#[derive(Clone)]
pub struct OvertimeApiClient {
    client: Client,
    config: OvertimeApiConfig,
}

impl OvertimeApiClient {
    pub fn new(config: OvertimeApiConfig, client: Client) -> Self {
        Self { client, config }
    }

    pub fn month_url(&self, year_month: YearMonth) -> Result<Url, OvertimeError> {
        let raw = format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.endpoint.trim_matches('/'),
            year_month.key()
        );
        Ok(Url::parse(&raw)?)
    }

    // Other employees' rows are never parsed, so only the target row can fail
    fn select_employee(&self, body: Value) -> Result<Option<u32>, OvertimeError> {
        let records = match body {
            Value::Array(records) => records,
            other => {
                warn!(
                    "Usage API returned a non-array body ({}); treating as no data",
                    json_kind(&other)
                );
                return Ok(None);
            }
        };

        let employee_key = self.config.employee_key.as_str();
        let Some(record) = records
            .into_iter()
            .find(|record| record.get("employeeKey").and_then(Value::as_str) == Some(employee_key))
        else {
            return Ok(None);
        };

        let record: OvertimeRecord = serde_json::from_value(record)?;
        Ok(Some(record.minutes()?))
    }
}

#[async_trait]
impl OvertimeSource for OvertimeApiClient {
    async fn fetch_overtime(&self, year_month: YearMonth) -> Result<Option<u32>, OvertimeError> {
        let url = self.month_url(year_month)?;
        debug!("Fetching overtime for {} from {}", year_month, url);

        let response = self
            .client
            .get(url)
            .query(&[("division", self.config.division_id.as_str())])
            .bearer_auth(&self.config.token)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(OvertimeError::ApiError { status, message });
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        let minutes = self.select_employee(body)?;
        match minutes {
            Some(minutes) => info!("Overtime for {}: {} min", year_month, minutes),
            None => info!(
                "No overtime record for employee {} in {}",
                self.config.employee_key, year_month
            ),
        }
        Ok(minutes)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
