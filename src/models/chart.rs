//! Chart render models

use chrono::NaiveDate;

/// An RGBA colour with a 0.0..=1.0 alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

/// What a dataset represents on the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetRole {
    HistoricalPrice,
    Volume,
    SimulationPath,
    Median,
    LowerBand,
    UpperBand,
}

/// One line or bar series of the chart
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    pub label: String,
    pub role: DatasetRole,
    pub values: Vec<Option<f64>>,
    pub color: Rgba,
    pub stroke_width: u32,
    pub show_in_legend: bool,
    /// Drawn against the right-hand (volume) axis
    pub secondary_axis: bool,
}

/// Everything a surface needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub labels: Vec<NaiveDate>,
    pub datasets: Vec<DatasetSpec>,
    pub y_axis_title: String,
    pub secondary_axis_title: String,
}

#[cfg(test)]
impl ChartSpec {
    pub fn datasets_with_role(&self, role: DatasetRole) -> impl Iterator<Item = &DatasetSpec> {
        self.datasets.iter().filter(move |d| d.role == role)
    }

    /// Labels shown in the legend, in draw order
    pub fn legend_labels(&self) -> Vec<&str> {
        self.datasets
            .iter()
            .filter(|d| d.show_in_legend)
            .map(|d| d.label.as_str())
            .collect()
    }
}
