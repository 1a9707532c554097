use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{HistoricalSeries, PricePoint, SimulationResult};

/// One row of `GET /user/api/market_data`
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataRow {
    pub date: String,
    pub close: f64,
    /// The server serialises volume as a float
    #[serde(default)]
    pub volume: f64,
}

/// Raw body of `GET /user/api/monte-carlo/{ticker}`; validated before use
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationPayload {
    pub ticker: Option<String>,
    pub dates: Option<Vec<String>>,
    pub all_paths: Option<Vec<Vec<f64>>>,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub percentile_5: Option<f64>,
    pub percentile_95: Option<f64>,
    pub current_price: Option<f64>,
    pub annual_return: Option<f64>,
    pub annual_volatility: Option<f64>,
}

/// Error body returned by the server
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Failures at the fetch boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Request never produced a response (connect failure, timeout)
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    /// Non-2xx response, or an error object in place of data
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    /// Response body did not match the expected schema
    #[error("Invalid response: {0}")]
    ValidationError(String),
}

impl ApiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::ServerError { status: 429, .. })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    // Some endpoints send full timestamps; only the calendar date matters
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| ApiError::ValidationError(format!("unparseable date '{}'", raw)))
}

/// Convert market data rows into an ordered, de-duplicated series
pub fn rows_into_series(ticker: &str, rows: Vec<MarketDataRow>) -> Result<HistoricalSeries, ApiError> {
    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        if !row.close.is_finite() {
            return Err(ApiError::ValidationError(format!("non-numeric close on {}", row.date)));
        }
        points.push(PricePoint {
            date: parse_date(&row.date)?,
            close: row.close,
            volume: row.volume.max(0.0).round() as u64,
        });
    }
    Ok(HistoricalSeries::new(ticker, points))
}

impl SimulationPayload {
    /// Check the payload against the simulation schema.
    ///
    /// Dates and paths must be present and non-empty, every path must have one
    /// value per date, and the summary statistics must be present.
    pub fn validate(self, ticker: &str) -> Result<SimulationResult, ApiError> {
        let raw_dates = self
            .dates
            .ok_or_else(|| ApiError::ValidationError("simulation response is missing 'dates'".to_string()))?;
        let all_paths = self
            .all_paths
            .ok_or_else(|| ApiError::ValidationError("simulation response is missing 'all_paths'".to_string()))?;

        if raw_dates.is_empty() {
            return Err(ApiError::ValidationError("simulation response has no dates".to_string()));
        }
        if all_paths.is_empty() {
            return Err(ApiError::ValidationError("simulation response has no paths".to_string()));
        }
        if let Some((index, path)) = all_paths.iter().enumerate().find(|(_, p)| p.len() != raw_dates.len()) {
            return Err(ApiError::ValidationError(format!(
                "path {} has {} values but there are {} dates",
                index,
                path.len(),
                raw_dates.len()
            )));
        }

        let dates = raw_dates
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>, _>>()?;

        let missing = |field: &str| ApiError::ValidationError(format!("simulation response is missing '{}'", field));

        Ok(SimulationResult {
            ticker: self.ticker.unwrap_or_else(|| ticker.to_string()),
            dates,
            all_paths,
            mean_price: self.mean_price.ok_or_else(|| missing("mean_price"))?,
            percentile_5: self.percentile_5.ok_or_else(|| missing("percentile_5"))?,
            percentile_95: self.percentile_95.ok_or_else(|| missing("percentile_95"))?,
            median_price: self.median_price,
            current_price: self.current_price,
            annual_return: self.annual_return,
            annual_volatility: self.annual_volatility,
        })
    }
}
