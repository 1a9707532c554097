use tracing::{info, warn};

use crate::api::market::MarketApiClient;
use crate::config::RiskThresholds;
use crate::models::risk::{RiskAssessment, StockAnalysis};
use crate::models::{AnalysisRequest, EvaluatedRisk, MetricRating, RatedMetric, RiskLevel};
use crate::services::range_service;
use crate::utils::errors::AppError;

/// Outcome per ticker: evaluated risk, or the server's reason it could not be analysed
#[derive(Debug, Clone, PartialEq)]
pub enum TickerRisk {
    Evaluated(EvaluatedRisk),
    Failed { ticker: String, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskReport {
    pub start_date: String,
    pub end_date: String,
    pub tickers: Vec<TickerRisk>,
}

/// Build an analysis request from a comma separated ticker list and two dates
pub fn validate_analysis_request(tickers: &str, start: &str, end: &str) -> Result<AnalysisRequest, AppError> {
    let tickers: Vec<String> = tickers
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tickers.is_empty() {
        return Err(AppError::UserInput("Please enter at least one ticker symbol".to_string()));
    }

    let start_date = range_service::parse_input_date(start)?;
    let end_date = range_service::parse_input_date(end)?;
    if start_date > end_date {
        return Err(AppError::UserInput("Start date must be before end date".to_string()));
    }

    Ok(AnalysisRequest {
        tickers,
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
    })
}

fn rate(adverse: bool) -> MetricRating {
    if adverse {
        MetricRating::Adverse
    } else {
        MetricRating::Acceptable
    }
}

/// Rate each metric present in `assessment` and derive the overall level.
///
/// Volatility, drawdown and VaR arrive as percentages.
pub fn evaluate(ticker: &str, assessment: &RiskAssessment, thresholds: &RiskThresholds) -> EvaluatedRisk {
    let mut metrics = Vec::new();
    let mut push = |name: &'static str, value: Option<f64>, adverse: fn(f64, &RiskThresholds) -> bool| {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            metrics.push(RatedMetric {
                name,
                value,
                rating: rate(adverse(value, thresholds)),
            });
        }
    };

    push("Volatility", assessment.volatility.map(|v| v / 100.0), |v, t| v > t.volatility_high);
    push("Max Drawdown", assessment.max_drawdown.map(|v| v / 100.0), |v, t| v < t.drawdown_high);
    push("Sharpe Ratio", assessment.sharpe_ratio, |v, t| v < t.sharpe_poor);
    push("Beta", assessment.beta, |v, t| v > t.beta_high);
    push("VaR (95%)", assessment.var_95.map(|v| v / 100.0), |v, t| v < t.var_high);
    push(
        "Sortino Ratio",
        assessment.sortino_ratio.as_ref().and_then(|s| s.finite()),
        |v, t| v < t.sortino_poor,
    );

    let overall = overall_level(&metrics, thresholds);
    EvaluatedRisk {
        ticker: ticker.to_string(),
        metrics,
        overall,
        r_squared: assessment.r_squared.filter(|v| v.is_finite()),
        summary: assessment.risk_summary.clone(),
    }
}

/// Overall level from the share of adverse ratings; `None` when nothing was rated
pub fn overall_level(metrics: &[RatedMetric], thresholds: &RiskThresholds) -> Option<RiskLevel> {
    if metrics.is_empty() {
        return None;
    }
    let adverse = metrics.iter().filter(|m| m.rating == MetricRating::Adverse).count();
    let ratio = adverse as f64 / metrics.len() as f64;

    Some(if ratio >= thresholds.high_ratio {
        RiskLevel::High
    } else if ratio <= thresholds.low_ratio {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    })
}

fn evaluate_result(result: &StockAnalysis, thresholds: &RiskThresholds) -> TickerRisk {
    match (&result.error, &result.risk_assessment) {
        (Some(error), _) => TickerRisk::Failed {
            ticker: result.ticker.clone(),
            error: error.clone(),
        },
        (None, Some(assessment)) => TickerRisk::Evaluated(evaluate(&result.ticker, assessment, thresholds)),
        (None, None) => TickerRisk::Failed {
            ticker: result.ticker.clone(),
            error: "No risk assessment returned".to_string(),
        },
    }
}

/// Run the risk analysis for a validated request
pub async fn analyze(
    client: &MarketApiClient,
    request: &AnalysisRequest,
    thresholds: &RiskThresholds,
) -> Result<RiskReport, AppError> {
    info!("Analysing {} ticker(s) from {} to {}", request.tickers.len(), request.start_date, request.end_date);
    let response = client.analyze_stocks(request).await?;

    let tickers: Vec<TickerRisk> = response
        .results
        .iter()
        .map(|r| evaluate_result(r, thresholds))
        .collect();

    for failed in tickers.iter().filter_map(|t| match t {
        TickerRisk::Failed { ticker, error } => Some((ticker, error)),
        TickerRisk::Evaluated(_) => None,
    }) {
        warn!("Risk analysis failed for {}: {}", failed.0, failed.1);
    }

    Ok(RiskReport {
        start_date: response.start_date.unwrap_or_else(|| request.start_date.clone()),
        end_date: response.end_date.unwrap_or_else(|| request.end_date.clone()),
        tickers,
    })
}
