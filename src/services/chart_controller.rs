use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::api::market::ApiError;
use crate::models::{ChartSpec, DateRange, HistoricalSeries, SimulationResult, ViewMode};
use crate::services::chart_service::{self, ChartSurface};
use crate::services::{merge_service, range_service};
use crate::utils::errors::AppError;

/// Generations current when a request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    data: u64,
    simulation: u64,
}

/// What the caller must do after selecting a ticker or range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPlan {
    /// Served from the cached complete series and already rendered
    Ready,
    /// The complete series for `ticker` must be fetched
    Fetch { ticker: String, token: RequestToken },
}

/// Result of handing a response back to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Rendered,
    /// A newer request superseded this one; the response was dropped
    Stale,
}

/// What is on the chart right now
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSummary {
    pub ticker: String,
    pub range: DateRange,
    pub mode: ViewMode,
    pub points: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub last_close: Option<f64>,
}

/// Owns the chart's view state and the single chart surface.
///
/// Network calls happen outside; callers take a token when a request starts
/// and hand it back with the response. Ticker or range changes bump the data
/// generation, simulation requests bump the simulation generation, and a
/// response carrying an older generation is discarded.
///
/// New state is drawn first and committed only once the surface accepted it,
/// so a failed draw leaves the controller as it was.
pub struct StockChartController {
    ticker: Option<String>,
    range: DateRange,
    mode: ViewMode,
    complete: Option<HistoricalSeries>,
    current: Option<HistoricalSeries>,
    simulation: Option<SimulationResult>,
    data_generation: u64,
    simulation_generation: u64,
    surface: Box<dyn ChartSurface>,
}

impl StockChartController {
    pub fn new(mode: ViewMode, surface: Box<dyn ChartSurface>) -> Self {
        Self {
            ticker: None,
            range: DateRange::All,
            mode,
            complete: None,
            current: None,
            simulation: None,
            data_generation: 0,
            simulation_generation: 0,
            surface,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn current_series(&self) -> Option<&HistoricalSeries> {
        self.current.as_ref()
    }

    pub fn simulation(&self) -> Option<&SimulationResult> {
        self.simulation.as_ref()
    }

    /// Summary of the displayed series, if one is loaded
    pub fn summary(&self) -> Option<ChartSummary> {
        let ticker = self.ticker.clone()?;
        let current = self.current.as_ref()?;
        Some(ChartSummary {
            ticker,
            range: self.range,
            mode: self.mode,
            points: current.len(),
            first_date: current.first_date(),
            last_date: current.last_date(),
            last_close: current.points().last().map(|p| p.close),
        })
    }

    fn token(&self) -> RequestToken {
        RequestToken {
            data: self.data_generation,
            simulation: self.simulation_generation,
        }
    }

    /// Select a ticker and range.
    ///
    /// Clears any simulation. When the complete series for this ticker is
    /// cached it is filtered and rendered immediately; otherwise the caller
    /// must fetch it.
    pub fn select(&mut self, ticker: &str, range: DateRange, today: NaiveDate) -> Result<LoadPlan, AppError> {
        if let DateRange::Custom { start, end } = range {
            if start > end {
                return Err(AppError::InvalidRange { start, end });
            }
        }

        let cached = match (&self.complete, self.ticker.as_deref() == Some(ticker)) {
            (Some(complete), true) => Some(range_service::filter(complete, &range, today)?),
            _ => None,
        };

        if let Some(filtered) = cached {
            self.surface.draw(&chart_service::history_spec(&filtered))?;
            info!("Serving {} {} from cache ({} points)", ticker, range, filtered.len());
            self.data_generation += 1;
            self.simulation = None;
            self.range = range;
            self.current = Some(filtered);
            return Ok(LoadPlan::Ready);
        }

        self.data_generation += 1;
        self.simulation = None;
        if self.ticker.as_deref() != Some(ticker) {
            self.complete = None;
            self.current = None;
            self.ticker = Some(ticker.to_string());
        }
        self.range = range;

        debug!("No cached series for {}; fetching (generation {})", ticker, self.data_generation);
        Ok(LoadPlan::Fetch {
            ticker: ticker.to_string(),
            token: self.token(),
        })
    }

    /// Change the range of the current ticker
    pub fn select_range(&mut self, range: DateRange, today: NaiveDate) -> Result<LoadPlan, AppError> {
        let ticker = self
            .ticker
            .clone()
            .ok_or_else(|| AppError::UserInput("Select a ticker first, e.g. `chart AAPL`".to_string()))?;
        self.select(&ticker, range, today)
    }

    /// Accept the complete series fetched for `token`
    pub fn complete_load(
        &mut self,
        token: RequestToken,
        result: Result<HistoricalSeries, ApiError>,
        today: NaiveDate,
    ) -> Result<Applied, AppError> {
        if token.data != self.data_generation {
            warn!(
                "Discarding stale price history (generation {}, current {})",
                token.data, self.data_generation
            );
            return Ok(Applied::Stale);
        }

        let series = result?;
        if series.is_empty() {
            return Err(AppError::NoData(format!("No price data found for {}", series.ticker())));
        }

        let filtered = range_service::filter(&series, &self.range, today)?;
        self.surface.draw(&chart_service::history_spec(&filtered))?;

        info!("Loaded {} points for {}, {} in range {}", series.len(), series.ticker(), filtered.len(), self.range);
        self.complete = Some(series);
        self.current = Some(filtered);
        Ok(Applied::Rendered)
    }

    /// Start a simulation request for the current ticker
    pub fn begin_simulation(&mut self) -> Result<(String, RequestToken), AppError> {
        let ticker = match (&self.ticker, &self.current) {
            (Some(ticker), Some(current)) if !current.is_empty() => ticker.clone(),
            _ => {
                return Err(AppError::UserInput(
                    "Load price history before running a simulation".to_string(),
                ))
            }
        };

        self.simulation_generation += 1;
        Ok((ticker, self.token()))
    }

    /// Accept a simulation response.
    ///
    /// On success the view switches to simulation mode and redraws; on failure
    /// mode, stored simulation and chart are left as they were.
    pub fn complete_simulation(
        &mut self,
        token: RequestToken,
        result: Result<SimulationResult, ApiError>,
    ) -> Result<Applied, AppError> {
        if token != self.token() {
            warn!("Discarding stale simulation (token {:?}, current {:?})", token, self.token());
            return Ok(Applied::Stale);
        }

        let simulation = result?;
        let spec = match &self.current {
            Some(current) => simulation_chart(current, &simulation, ViewMode::Simulation),
            None => return Err(AppError::UserInput("Load price history before running a simulation".to_string())),
        };
        self.surface.draw(&spec)?;

        info!(
            "Simulation ready for {}: {} paths over {} days",
            simulation.ticker,
            simulation.trials(),
            simulation.horizon()
        );
        self.simulation = Some(simulation);
        self.mode = ViewMode::Simulation;
        Ok(Applied::Rendered)
    }

    /// Set the view mode. Redraws only when a simulation is loaded.
    pub fn set_mode(&mut self, mode: ViewMode) -> Result<bool, AppError> {
        let spec = match (&self.current, &self.simulation) {
            (Some(current), Some(simulation)) => simulation_chart(current, simulation, mode),
            _ => {
                debug!("View mode set to {} (no simulation loaded)", mode);
                self.mode = mode;
                return Ok(false);
            }
        };

        self.surface.draw(&spec)?;
        self.mode = mode;
        Ok(true)
    }
}

fn simulation_chart(current: &HistoricalSeries, simulation: &SimulationResult, mode: ViewMode) -> ChartSpec {
    let timeline = merge_service::merge(current, simulation, mode);
    debug_assert!(timeline.is_aligned());
    chart_service::simulation_spec(current.ticker(), &timeline, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::market::models::SimulationPayload;
    use crate::models::{DatasetRole, PricePoint};
    use crate::services::chart_service::testing::RecordingSurface;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn series(ticker: &str, count: usize) -> HistoricalSeries {
        HistoricalSeries::new(
            ticker,
            (0..count)
                .map(|i| PricePoint {
                    date: today() - Duration::days(i as i64),
                    close: 150.0 + i as f64,
                    volume: 1_000,
                })
                .collect(),
        )
    }

    fn simulation(days: usize, trials: usize) -> SimulationResult {
        SimulationResult {
            ticker: "AAPL".to_string(),
            dates: (1..=days).map(|i| today() + Duration::days(i as i64)).collect(),
            all_paths: vec![vec![150.0; days]; trials],
            mean_price: 150.0,
            percentile_5: 140.0,
            percentile_95: 160.0,
            median_price: None,
            current_price: Some(150.0),
            annual_return: None,
            annual_volatility: None,
        }
    }

    fn controller() -> (StockChartController, RecordingSurface) {
        let surface = RecordingSurface::default();
        (StockChartController::new(ViewMode::History, Box::new(surface.clone())), surface)
    }

    fn fetch_token(plan: LoadPlan) -> RequestToken {
        match plan {
            LoadPlan::Fetch { token, .. } => token,
            LoadPlan::Ready => panic!("expected a fetch"),
        }
    }

    fn loaded(count: usize) -> (StockChartController, RecordingSurface) {
        let (mut ctl, surface) = controller();
        let token = fetch_token(ctl.select("AAPL", DateRange::All, today()).unwrap());
        ctl.complete_load(token, Ok(series("AAPL", count)), today()).unwrap();
        (ctl, surface)
    }

    #[test]
    fn test_first_selection_fetches_then_range_is_local() {
        let (mut ctl, surface) = loaded(400);
        assert_eq!(surface.draw_count(), 1);

        let plan = ctl.select_range(DateRange::OneMonth, today()).unwrap();
        assert_eq!(plan, LoadPlan::Ready);
        assert_eq!(surface.draw_count(), 2);
        assert!(ctl.current_series().unwrap().len() <= 31);
    }

    #[test]
    fn test_ticker_change_drops_cache() {
        let (mut ctl, _) = loaded(50);
        assert!(matches!(ctl.select("MSFT", DateRange::All, today()).unwrap(), LoadPlan::Fetch { .. }));
        assert!(ctl.current_series().is_none());
    }

    #[test]
    fn test_reversed_custom_range_rejected_before_fetch() {
        let (mut ctl, surface) = controller();
        let range = DateRange::Custom {
            start: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        };
        assert!(matches!(ctl.select("AAPL", range, today()), Err(AppError::InvalidRange { .. })));
        assert!(ctl.ticker().is_none());
        assert_eq!(surface.draw_count(), 0);
    }

    #[test]
    fn test_stale_history_response_is_discarded() {
        let (mut ctl, _) = controller();
        let slow_all = fetch_token(ctl.select("AAPL", DateRange::All, today()).unwrap());
        let fast_month = fetch_token(ctl.select("AAPL", DateRange::OneMonth, today()).unwrap());

        ctl.complete_load(fast_month, Ok(series("AAPL", 300)), today()).unwrap();
        let month_len = ctl.current_series().unwrap().len();

        let applied = ctl.complete_load(slow_all, Ok(series("AAPL", 300)), today()).unwrap();
        assert_eq!(applied, Applied::Stale);
        assert_eq!(ctl.current_series().unwrap().len(), month_len);
        assert_eq!(ctl.range(), DateRange::OneMonth);
    }

    #[test]
    fn test_simulation_switches_mode_and_merges() {
        let (mut ctl, surface) = loaded(252);
        let (ticker, token) = ctl.begin_simulation().unwrap();
        assert_eq!(ticker, "AAPL");

        ctl.complete_simulation(token, Ok(simulation(30, 200))).unwrap();

        assert_eq!(ctl.mode(), ViewMode::Simulation);
        let spec = surface.last().unwrap();
        assert_eq!(spec.labels.len(), merge_service::SIMULATION_HISTORY_WINDOW + 30);
        assert_eq!(spec.datasets_with_role(DatasetRole::SimulationPath).count(), 200);
        assert_eq!(surface.draw_count(), 2);
    }

    #[test]
    fn test_malformed_simulation_blocks_transition() {
        let (mut ctl, surface) = loaded(100);
        let (_, token) = ctl.begin_simulation().unwrap();

        let payload = SimulationPayload {
            dates: Some(vec!["2026-10-20".to_string()]),
            mean_price: Some(1.0),
            percentile_5: Some(1.0),
            percentile_95: Some(1.0),
            ..Default::default()
        };
        let result = ctl.complete_simulation(token, payload.validate("AAPL"));

        assert!(matches!(result, Err(AppError::Api(ApiError::ValidationError(_)))));
        assert_eq!(ctl.mode(), ViewMode::History);
        assert!(ctl.simulation().is_none());
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_simulation_requires_history() {
        let (mut ctl, _) = controller();
        assert!(matches!(ctl.begin_simulation(), Err(AppError::UserInput(_))));
    }

    #[test]
    fn test_range_change_invalidates_pending_and_loaded_simulation() {
        let (mut ctl, _) = loaded(200);
        let (_, token) = ctl.begin_simulation().unwrap();
        ctl.select_range(DateRange::SixMonths, today()).unwrap();

        assert_eq!(ctl.complete_simulation(token, Ok(simulation(10, 5))).unwrap(), Applied::Stale);
        assert!(ctl.simulation().is_none());
        assert_eq!(ctl.mode(), ViewMode::History);
    }

    #[test]
    fn test_newer_simulation_wins() {
        let (mut ctl, _) = loaded(200);
        let (_, first) = ctl.begin_simulation().unwrap();
        let (_, second) = ctl.begin_simulation().unwrap();

        ctl.complete_simulation(second, Ok(simulation(10, 7))).unwrap();
        assert_eq!(ctl.complete_simulation(first, Ok(simulation(10, 3))).unwrap(), Applied::Stale);
        assert_eq!(ctl.simulation().unwrap().trials(), 7);
    }

    #[test]
    fn test_set_mode_without_simulation_does_not_draw() {
        let (mut ctl, surface) = loaded(100);
        assert!(!ctl.set_mode(ViewMode::Simulation).unwrap());
        assert_eq!(ctl.mode(), ViewMode::Simulation);
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_set_mode_is_idempotent() {
        let (mut ctl, surface) = loaded(120);
        let (_, token) = ctl.begin_simulation().unwrap();
        ctl.complete_simulation(token, Ok(simulation(20, 80))).unwrap();

        ctl.set_mode(ViewMode::History).unwrap();
        let first = surface.last();
        ctl.set_mode(ViewMode::History).unwrap();

        assert_eq!(surface.last(), first);
        assert_eq!(surface.last().unwrap().labels.len(), 120 + 20);
        assert_eq!(
            surface.last().unwrap().datasets_with_role(DatasetRole::SimulationPath).count(),
            merge_service::MAX_PATHS_HISTORY
        );
        assert_eq!(surface.draw_count(), 4);
    }

    #[test]
    fn test_empty_history_is_reported() {
        let (mut ctl, surface) = controller();
        let token = fetch_token(ctl.select("ZZZZ", DateRange::All, today()).unwrap());
        let result = ctl.complete_load(token, Ok(HistoricalSeries::new("ZZZZ", vec![])), today());
        assert!(matches!(result, Err(AppError::NoData(_))));
        assert_eq!(surface.draw_count(), 0);
    }

    #[test]
    fn test_failed_simulation_draw_keeps_history_state() {
        let (mut ctl, surface) = loaded(100);
        let (_, token) = ctl.begin_simulation().unwrap();

        surface.set_failing(true);
        let result = ctl.complete_simulation(token, Ok(simulation(30, 50)));

        assert!(matches!(result, Err(AppError::Render(_))));
        assert_eq!(ctl.mode(), ViewMode::History);
        assert!(ctl.simulation().is_none());
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_failed_mode_redraw_keeps_mode() {
        let (mut ctl, surface) = loaded(100);
        let (_, token) = ctl.begin_simulation().unwrap();
        ctl.complete_simulation(token, Ok(simulation(30, 50))).unwrap();

        surface.set_failing(true);
        assert!(ctl.set_mode(ViewMode::History).is_err());
        assert_eq!(ctl.mode(), ViewMode::Simulation);
        assert!(ctl.simulation().is_some());
    }

    #[test]
    fn test_failed_load_draw_commits_nothing() {
        let (mut ctl, surface) = controller();
        let token = fetch_token(ctl.select("AAPL", DateRange::All, today()).unwrap());

        surface.set_failing(true);
        assert!(ctl.complete_load(token, Ok(series("AAPL", 80)), today()).is_err());
        assert!(ctl.current_series().is_none());

        // Nothing was cached, so the next selection fetches again
        surface.set_failing(false);
        assert!(matches!(ctl.select_range(DateRange::OneMonth, today()).unwrap(), LoadPlan::Fetch { .. }));
    }

    #[test]
    fn test_failed_cached_range_draw_keeps_previous_range() {
        let (mut ctl, surface) = loaded(300);
        let before = ctl.current_series().cloned();

        surface.set_failing(true);
        assert!(ctl.select_range(DateRange::OneMonth, today()).is_err());
        assert_eq!(ctl.range(), DateRange::All);
        assert_eq!(ctl.current_series().cloned(), before);
    }

    #[test]
    fn test_history_after_simulation_is_drawn_at_full_strength() {
        let (mut ctl, surface) = loaded(252);
        let (_, token) = ctl.begin_simulation().unwrap();
        ctl.complete_simulation(token, Ok(simulation(30, 50))).unwrap();

        ctl.select_range(DateRange::SixMonths, today()).unwrap();

        assert!(ctl.simulation().is_none());
        let spec = surface.last().unwrap();
        assert_eq!(spec.y_axis_title, "Price ($)");
        let line = spec.datasets_with_role(DatasetRole::HistoricalPrice).next().unwrap();
        assert_eq!(line.color.a, 1.0);
        assert_eq!(line.stroke_width, 2);
        assert_eq!(spec.datasets_with_role(DatasetRole::SimulationPath).count(), 0);
    }

    #[test]
    fn test_summary_describes_current_selection() {
        let (mut ctl, _) = loaded(400);
        ctl.select_range(DateRange::OneMonth, today()).unwrap();

        let summary = ctl.summary().unwrap();
        assert_eq!(summary.ticker, "AAPL");
        assert_eq!(summary.range, DateRange::OneMonth);
        assert_eq!(summary.points, ctl.current_series().unwrap().len());
        assert_eq!(summary.last_date, Some(today()));
        assert_eq!(summary.last_close, Some(150.0));
    }
}
