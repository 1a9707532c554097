//! Merged history + simulation timeline

use chrono::NaiveDate;

/// Parallel, equally long series sharing one label axis.
///
/// The first `history_len` labels are historical dates; the remainder are
/// simulated dates. Historical series hold `None` over the simulated region
/// and simulated series hold `None` over the historical region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedTimeline {
    pub labels: Vec<NaiveDate>,
    pub history_len: usize,
    pub history_series: Vec<Option<f64>>,
    pub volume_series: Vec<Option<f64>>,
    pub path_series: Vec<Vec<Option<f64>>>,
    pub median_series: Vec<Option<f64>>,
    pub lower_band: Vec<Option<f64>>,
    pub upper_band: Vec<Option<f64>>,
}

impl MergedTimeline {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Every series has exactly one entry per label
    pub fn is_aligned(&self) -> bool {
        let n = self.labels.len();
        self.history_series.len() == n
            && self.volume_series.len() == n
            && self.median_series.len() == n
            && self.lower_band.len() == n
            && self.upper_band.len() == n
            && self.path_series.iter().all(|p| p.len() == n)
    }
}
