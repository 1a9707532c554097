use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::models::{rows_into_series, ApiError, ErrorResponse, MarketDataRow, SimulationPayload};
use crate::models::{
    AnalysisRequest, AnalysisResponse, BalanceSheet, ChatReply, ChatRequest, DateRange, FundReceipt, FundRequest,
    FundamentalData, HistoricalSeries, IncomeStatement, OrderReceipt, OrderRequest, Quote, SimulationResult,
};

/// Look-back used when the whole history is requested
const ALL_HISTORY_DAYS: i64 = 3650;

/// Client for the brokerage server's `/user/api` endpoints
pub struct MarketApiClient {
    http_client: HttpClient,
    base_url: String,
    session_cookie: Option<String>,
}

impl MarketApiClient {
    /// Create a client against `base_url` with a per-request timeout
    pub fn new(base_url: String, session_cookie: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::NetworkFailure(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_cookie,
        })
    }

    /// Default headers, carrying the session cookie when one is configured
    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(cookie) = &self.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::NetworkFailure(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        Ok(headers)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .headers(self.create_headers()?)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(format!("Request failed: {}", e)))?;

        Self::read_body(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .headers(self.create_headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(format!("Request failed: {}", e)))?;

        Self::read_body(response).await
    }

    async fn read_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkFailure(format!("Failed to read response: {}", e)))?;
        decode_body(status, &body)
    }

    /// GET /user/api/market_data
    ///
    /// The complete daily history for `ticker`, ordered ascending by date.
    /// Narrower ranges are cut from it locally.
    pub async fn fetch_series(&self, ticker: &str) -> Result<HistoricalSeries, ApiError> {
        let query = series_query(ticker);
        let rows: Vec<MarketDataRow> = self.get("/user/api/market_data", &query).await?;
        rows_into_series(ticker, rows)
    }

    /// GET /user/api/monte-carlo/{ticker}
    ///
    /// Runs the server-side simulation for `days` future dates and `trials` paths.
    pub async fn fetch_simulation(&self, ticker: &str, days: u32, trials: u32) -> Result<SimulationResult, ApiError> {
        let path = format!("/user/api/monte-carlo/{}", ticker);
        let query = [("days", days.to_string()), ("simulations", trials.to_string())];
        let payload: SimulationPayload = self.get(&path, &query).await?;
        payload.validate(ticker)
    }

    /// GET /user/api/real_time_stock_data
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ApiError> {
        // The server reads `ticker`; older pages sent `symbol`
        let query = [("symbol", symbol.to_string()), ("ticker", symbol.to_string())];
        self.get("/user/api/real_time_stock_data", &query).await
    }

    /// GET /user/api/fundamental_data
    pub async fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalData, ApiError> {
        self.get("/user/api/fundamental_data", &[("ticker", ticker.to_string())]).await
    }

    /// GET /user/api/balance_sheet
    pub async fn fetch_balance_sheet(&self, ticker: &str) -> Result<BalanceSheet, ApiError> {
        self.get("/user/api/balance_sheet", &[("ticker", ticker.to_string())]).await
    }

    /// GET /user/api/income_statement
    pub async fn fetch_income_statement(&self, ticker: &str) -> Result<IncomeStatement, ApiError> {
        self.get("/user/api/income_statement", &[("ticker", ticker.to_string())]).await
    }

    /// POST /user/api/stock_analysis
    pub async fn analyze_stocks(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ApiError> {
        self.post("/user/api/stock_analysis", request).await
    }

    /// POST /user/api/create_order
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
        self.post("/user/api/create_order", order).await
    }

    /// POST /user/api/deposit
    pub async fn deposit(&self, amount: f64) -> Result<FundReceipt, ApiError> {
        self.post("/user/api/deposit", &FundRequest { amount }).await
    }

    /// POST /user/api/withdraw
    pub async fn withdraw(&self, amount: f64) -> Result<FundReceipt, ApiError> {
        self.post("/user/api/withdraw", &FundRequest { amount }).await
    }

    /// POST /user/api/chat
    pub async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        self.post("/user/api/chat", &body).await
    }
}

/// Query string for the complete history of `ticker`
pub(crate) fn series_query(ticker: &str) -> Vec<(&'static str, String)> {
    vec![
        ("ticker", ticker.to_string()),
        ("range", DateRange::All.token().to_string()),
        ("days", ALL_HISTORY_DAYS.to_string()),
    ]
}

/// Turn a status code and body into data or an `ApiError`
pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(error_from_response(status, body));
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ApiError::ValidationError(format!("response is not valid JSON: {}", e)))?;

    if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
        warn!("Server reported an error with status {}: {}", status, message);
        return Err(ApiError::ServerError {
            status,
            message: message.to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| ApiError::ValidationError(format!("unexpected response shape: {}", e)))
}

/// Build the error for a non-2xx response, preferring the server's own message
pub(crate) fn error_from_response(status: u16, body: &str) -> ApiError {
    let server_message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.or(e.message))
        .filter(|m| !m.trim().is_empty());

    let message = server_message.unwrap_or_else(|| format!("Request failed with status {}", status));

    match status {
        429 => warn!("Rate limited by server: {}", message),
        500..=599 => warn!("Server error {}: {}", status, message),
        _ => debug!("Request rejected with status {}: {}", status, message),
    }

    ApiError::ServerError { status, message }
}
