//! Stock risk analysis models

use serde::{Deserialize, Serialize};

/// Request body for the risk analysis endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisRequest {
    pub tickers: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

/// Response of the risk analysis endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub results: Vec<StockAnalysis>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Analysis outcome for one ticker
#[derive(Debug, Clone, Deserialize)]
pub struct StockAnalysis {
    pub ticker: String,
    pub error: Option<String>,
    pub risk_assessment: Option<RiskAssessment>,
}

/// Sortino ratio as sent by the server: a number, or "∞" when there is no downside
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SortinoValue {
    Number(f64),
    Text(String),
}

impl SortinoValue {
    /// Finite numeric value, if any
    pub fn finite(&self) -> Option<f64> {
        match self {
            SortinoValue::Number(v) if v.is_finite() => Some(*v),
            SortinoValue::Number(_) => None,
            SortinoValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// Risk metrics computed server-side. Volatility, drawdown and VaR are percentages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskAssessment {
    pub volatility: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub beta: Option<f64>,
    pub var_95: Option<f64>,
    pub sortino_ratio: Option<SortinoValue>,
    pub r_squared: Option<f64>,
    #[serde(default)]
    pub risk_summary: Vec<String>,
}

/// Rating of a single metric against a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricRating {
    Adverse,
    Acceptable,
}

/// Overall risk level derived from the share of adverse ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => f.write_str("Low"),
            RiskLevel::Medium => f.write_str("Medium"),
            RiskLevel::High => f.write_str("High"),
        }
    }
}

/// A metric value with its rating
#[derive(Debug, Clone, PartialEq)]
pub struct RatedMetric {
    pub name: &'static str,
    pub value: f64,
    pub rating: MetricRating,
}

/// Assessment re-rated against the configured thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedRisk {
    pub ticker: String,
    pub metrics: Vec<RatedMetric>,
    pub overall: Option<RiskLevel>,
    /// Fit against the market index; shown but not rated
    pub r_squared: Option<f64>,
    pub summary: Vec<String>,
}
