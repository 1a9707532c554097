//! Monte Carlo simulation models

use chrono::NaiveDate;

/// A validated simulation response: one path per trial, one value per date
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub ticker: String,
    pub dates: Vec<NaiveDate>,
    pub all_paths: Vec<Vec<f64>>,
    pub mean_price: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    pub median_price: Option<f64>,
    pub current_price: Option<f64>,
    pub annual_return: Option<f64>,
    pub annual_volatility: Option<f64>,
}

impl SimulationResult {
    pub fn trials(&self) -> usize {
        self.all_paths.len()
    }

    pub fn horizon(&self) -> usize {
        self.dates.len()
    }
}
