use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::market::{ApiError, MarketApiClient};
use crate::models::{DateRange, HistoricalSeries, SimulationResult, ViewMode};
use crate::services::chart_controller::{Applied, ChartSummary, LoadPlan, StockChartController};
use crate::utils::errors::AppError;

pub const DEFAULT_SIMULATION_DAYS: u32 = 60;
pub const DEFAULT_SIMULATION_TRIALS: u32 = 200;
pub const MAX_SIMULATION_DAYS: u32 = 365;
pub const MAX_SIMULATION_TRIALS: u32 = 1000;

/// The chart controller shared between concurrently running commands
pub type SharedController = Arc<Mutex<StockChartController>>;

/// Where chart data comes from
#[async_trait]
pub trait ChartDataSource: Send + Sync {
    /// The complete history for `ticker`
    async fn fetch_series(&self, ticker: &str) -> Result<HistoricalSeries, ApiError>;
    async fn fetch_simulation(&self, ticker: &str, days: u32, trials: u32) -> Result<SimulationResult, ApiError>;
}

#[async_trait]
impl ChartDataSource for MarketApiClient {
    async fn fetch_series(&self, ticker: &str) -> Result<HistoricalSeries, ApiError> {
        MarketApiClient::fetch_series(self, ticker).await
    }

    async fn fetch_simulation(&self, ticker: &str, days: u32, trials: u32) -> Result<SimulationResult, ApiError> {
        MarketApiClient::fetch_simulation(self, ticker, days, trials).await
    }
}

/// Normalize a ticker typed by the user
pub fn normalize_ticker(raw: &str) -> Result<String, AppError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::UserInput("Please enter a ticker symbol".to_string()));
    }
    if !ticker.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '^') {
        return Err(AppError::UserInput(format!("'{}' is not a valid ticker symbol", raw.trim())));
    }
    Ok(ticker)
}

/// Check simulation parameters against the server's limits
pub fn validate_simulation_params(days: u32, trials: u32) -> Result<(), AppError> {
    if !(1..=MAX_SIMULATION_DAYS).contains(&days) {
        return Err(AppError::UserInput(format!(
            "Days must be between 1 and {}",
            MAX_SIMULATION_DAYS
        )));
    }
    if !(1..=MAX_SIMULATION_TRIALS).contains(&trials) {
        return Err(AppError::UserInput(format!(
            "Number of simulations must be between 1 and {}",
            MAX_SIMULATION_TRIALS
        )));
    }
    Ok(())
}

/// Select a ticker and range, fetching the complete series when it is not cached.
///
/// Returns what was drawn, or `None` when a newer selection superseded this one.
pub async fn select_ticker(
    controller: &SharedController,
    source: &dyn ChartDataSource,
    ticker: &str,
    range: DateRange,
    today: NaiveDate,
) -> Result<Option<ChartSummary>, AppError> {
    let plan = controller.lock().await.select(ticker, range, today)?;
    load(controller, source, plan, today).await
}

/// Change the range of the current ticker
pub async fn select_range(
    controller: &SharedController,
    source: &dyn ChartDataSource,
    range: DateRange,
    today: NaiveDate,
) -> Result<Option<ChartSummary>, AppError> {
    let plan = controller.lock().await.select_range(range, today)?;
    load(controller, source, plan, today).await
}

async fn load(
    controller: &SharedController,
    source: &dyn ChartDataSource,
    plan: LoadPlan,
    today: NaiveDate,
) -> Result<Option<ChartSummary>, AppError> {
    let (ticker, token) = match plan {
        LoadPlan::Ready => return Ok(controller.lock().await.summary()),
        LoadPlan::Fetch { ticker, token } => (ticker, token),
    };

    info!("Fetching price history for {}", ticker);
    let result = source.fetch_series(&ticker).await;

    // Summarise under the same lock that applied the response
    let mut ctl = controller.lock().await;
    match ctl.complete_load(token, result, today)? {
        Applied::Rendered => Ok(ctl.summary()),
        Applied::Stale => Ok(None),
    }
}

/// Run a simulation for the current ticker.
///
/// Returns the simulation that was drawn, or `None` when it was superseded.
pub async fn run_simulation(
    controller: &SharedController,
    source: &dyn ChartDataSource,
    days: u32,
    trials: u32,
) -> Result<Option<SimulationResult>, AppError> {
    validate_simulation_params(days, trials)?;

    let (ticker, token) = controller.lock().await.begin_simulation()?;
    info!("Running simulation for {}: {} days, {} trials", ticker, days, trials);

    let result = source.fetch_simulation(&ticker, days, trials).await;
    let mut ctl = controller.lock().await;
    match ctl.complete_simulation(token, result)? {
        Applied::Rendered => Ok(ctl.simulation().cloned()),
        Applied::Stale => Ok(None),
    }
}

/// Set the view mode; returns whether the chart was redrawn
pub async fn set_mode(controller: &SharedController, mode: ViewMode) -> Result<bool, AppError> {
    let redrawn = controller.lock().await.set_mode(mode)?;
    debug!("Mode {} (redrawn: {})", mode, redrawn);
    Ok(redrawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::market::models::SimulationPayload;
    use crate::models::PricePoint;
    use crate::services::chart_service::testing::RecordingSurface;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn series(ticker: &str, count: usize) -> HistoricalSeries {
        HistoricalSeries::new(
            ticker,
            (0..count)
                .map(|i| PricePoint {
                    date: today() - Duration::days(i as i64),
                    close: 100.0 + i as f64,
                    volume: 500,
                })
                .collect(),
        )
    }

    fn simulation(ticker: &str, days: u32, trials: u32) -> SimulationResult {
        SimulationResult {
            ticker: ticker.to_string(),
            dates: (1..=days).map(|i| today() + Duration::days(i as i64)).collect(),
            all_paths: (0..trials).map(|t| vec![100.0 + t as f64; days as usize]).collect(),
            mean_price: 100.0,
            percentile_5: 90.0,
            percentile_95: 110.0,
            median_price: None,
            current_price: None,
            annual_return: None,
            annual_volatility: None,
        }
    }

    /// Serves canned data and counts calls
    #[derive(Default)]
    struct FakeSource {
        series_calls: AtomicUsize,
        simulation_calls: AtomicUsize,
        malformed_simulation: bool,
        history_len: usize,
    }

    #[async_trait]
    impl ChartDataSource for FakeSource {
        async fn fetch_series(&self, ticker: &str) -> Result<HistoricalSeries, ApiError> {
            self.series_calls.fetch_add(1, Ordering::SeqCst);
            Ok(series(ticker, self.history_len))
        }

        async fn fetch_simulation(&self, ticker: &str, days: u32, trials: u32) -> Result<SimulationResult, ApiError> {
            self.simulation_calls.fetch_add(1, Ordering::SeqCst);
            if self.malformed_simulation {
                let payload = SimulationPayload {
                    dates: Some(vec!["2026-10-20".to_string()]),
                    mean_price: Some(1.0),
                    percentile_5: Some(1.0),
                    percentile_95: Some(1.0),
                    ..Default::default()
                };
                return payload.validate(ticker);
            }
            Ok(simulation(ticker, days, trials))
        }
    }

    /// Holds the first series request until released
    struct GatedSource {
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChartDataSource for GatedSource {
        async fn fetch_series(&self, ticker: &str) -> Result<HistoricalSeries, ApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                self.gate.notified().await;
                return Ok(series(ticker, 10));
            }
            Ok(series(ticker, 300))
        }

        async fn fetch_simulation(&self, _ticker: &str, _days: u32, _trials: u32) -> Result<SimulationResult, ApiError> {
            Err(ApiError::NetworkFailure("unused".to_string()))
        }
    }

    fn shared() -> (SharedController, RecordingSurface) {
        let surface = RecordingSurface::default();
        let controller = StockChartController::new(ViewMode::History, Box::new(surface.clone()));
        (Arc::new(Mutex::new(controller)), surface)
    }

    fn source(history_len: usize) -> FakeSource {
        FakeSource {
            history_len,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_cached_series_is_filtered_without_refetch() {
        let (controller, surface) = shared();
        let source = source(400);

        let all = select_ticker(&controller, &source, "AAPL", DateRange::All, today()).await.unwrap().unwrap();
        select_range(&controller, &source, DateRange::ThreeMonths, today()).await.unwrap();
        let year = select_range(&controller, &source, DateRange::OneYear, today()).await.unwrap().unwrap();

        assert_eq!(all.points, 400);
        assert_eq!(year.range, DateRange::OneYear);
        assert!(year.points < all.points);
        assert_eq!(year.last_date, Some(today()));
        assert_eq!(source.series_calls.load(Ordering::SeqCst), 1);
        assert_eq!(surface.draw_count(), 3);
    }

    #[tokio::test]
    async fn test_reversed_custom_range_never_fetches() {
        let (controller, _) = shared();
        let source = source(10);
        let range = DateRange::Custom {
            start: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        };

        let result = select_ticker(&controller, &source, "AAPL", range, today()).await;
        assert!(matches!(result, Err(AppError::InvalidRange { .. })));
        assert_eq!(source.series_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_simulation_keeps_history_view() {
        let (controller, surface) = shared();
        let source = FakeSource {
            history_len: 100,
            malformed_simulation: true,
            ..Default::default()
        };

        select_ticker(&controller, &source, "AAPL", DateRange::All, today()).await.unwrap();
        let result = run_simulation(&controller, &source, 60, 200).await;

        assert!(matches!(result, Err(AppError::Api(ApiError::ValidationError(_)))));
        let ctl = controller.lock().await;
        assert_eq!(ctl.mode(), ViewMode::History);
        assert!(ctl.simulation().is_none());
        assert_eq!(surface.draw_count(), 1);
    }

    #[tokio::test]
    async fn test_simulation_parameters_checked_before_request() {
        let (controller, _) = shared();
        let source = source(50);
        select_ticker(&controller, &source, "AAPL", DateRange::All, today()).await.unwrap();

        assert!(matches!(run_simulation(&controller, &source, 0, 200).await, Err(AppError::UserInput(_))));
        assert!(matches!(run_simulation(&controller, &source, 60, 1001).await, Err(AppError::UserInput(_))));
        assert_eq!(source.simulation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_simulation_renders_merged_chart() {
        let (controller, surface) = shared();
        let source = source(252);
        select_ticker(&controller, &source, "AAPL", DateRange::All, today()).await.unwrap();

        let drawn = run_simulation(&controller, &source, 30, 100).await.unwrap().unwrap();
        assert_eq!(drawn.trials(), 100);

        let spec = surface.last().unwrap();
        assert_eq!(spec.labels.len(), 60 + 30);
        assert_eq!(controller.lock().await.mode(), ViewMode::Simulation);

        assert!(set_mode(&controller, ViewMode::History).await.unwrap());
        assert_eq!(surface.last().unwrap().labels.len(), 252 + 30);
    }

    #[tokio::test]
    async fn test_slow_response_for_old_ticker_is_discarded() {
        let (controller, surface) = shared();
        let source = Arc::new(GatedSource {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });

        let slow = {
            let controller = Arc::clone(&controller);
            let source = Arc::clone(&source);
            tokio::spawn(async move {
                select_ticker(&controller, source.as_ref(), "AAPL", DateRange::All, today()).await
            })
        };
        while source.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        select_ticker(&controller, source.as_ref(), "MSFT", DateRange::All, today()).await.unwrap();
        source.gate.notify_one();

        assert!(slow.await.unwrap().unwrap().is_none());
        let ctl = controller.lock().await;
        assert_eq!(ctl.ticker(), Some("MSFT"));
        assert_eq!(ctl.current_series().unwrap().ticker(), "MSFT");
        assert_eq!(ctl.current_series().unwrap().len(), 300);
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_ticker("brk.b").unwrap(), "BRK.B");
        assert!(normalize_ticker("").is_err());
        assert!(normalize_ticker("AA PL").is_err());
    }
}
