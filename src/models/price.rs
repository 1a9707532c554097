//! Historical price models

use chrono::NaiveDate;

/// A single daily close with its traded volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

/// Daily closes for one ticker, ascending by date with one point per date
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl HistoricalSeries {
    /// Build a series, sorting by date and keeping the first point seen for each date
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The most recent `n` points (all of them when the series is shorter)
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// A new series over the same ticker holding only points matching `keep`
    pub fn retain_dates<F>(&self, keep: F) -> Self
    where
        F: Fn(NaiveDate) -> bool,
    {
        Self {
            ticker: self.ticker.clone(),
            points: self.points.iter().copied().filter(|p| keep(p.date)).collect(),
        }
    }
}
