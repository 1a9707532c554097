use super::AppState;
use crate::models::{MetricRating, RatedMetric};
use crate::services::risk_service::{self, TickerRisk};
use crate::utils::errors::AppError;
use crate::utils::format::{format_percentage, format_ratio};
use crate::utils::{Panel, Table};

fn display_value(metric: &RatedMetric) -> String {
    match metric.name {
        "Volatility" | "Max Drawdown" | "VaR (95%)" => format_percentage(Some(metric.value * 100.0)),
        _ => format_ratio(Some(metric.value)),
    }
}

/// `analyze <T1,T2,..> <start> <end>`
pub async fn execute(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let (tickers, start, end) = match args {
        [tickers, start, end, ..] => (*tickers, *start, *end),
        _ => {
            return Err(AppError::UserInput(
                "Usage: `analyze <TICKER,TICKER,...> <YYYY-MM-DD> <YYYY-MM-DD>`".to_string(),
            ))
        }
    };

    let request = risk_service::validate_analysis_request(tickers, start, end)?;
    let report = risk_service::analyze(&state.client, &request, &state.risk).await?;

    for ticker in &report.tickers {
        match ticker {
            TickerRisk::Failed { ticker, error } => {
                Panel::new(format!("⚠️ {} Risk Analysis", ticker)).description(format!("❌ {}", error)).print();
            }
            TickerRisk::Evaluated(risk) => {
                let mut table = Table::new(&["Metric", "Value", "Rating"]);
                for metric in &risk.metrics {
                    let rating = match metric.rating {
                        MetricRating::Adverse => "⚠️ high",
                        MetricRating::Acceptable => "ok",
                    };
                    table.add_row(vec![metric.name.to_string(), display_value(metric), rating.to_string()]);
                }

                let overall = risk.overall.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
                let mut panel = Panel::new(format!("🛡️ {} Risk Analysis", risk.ticker))
                    .field("Overall Risk", overall)
                    .field("R²", format_ratio(risk.r_squared));
                if !table.is_empty() {
                    panel = panel.description(table.render());
                }
                if !risk.summary.is_empty() {
                    panel = panel.field("Summary", risk.summary.join("\n"));
                }
                panel
                    .footer(format!("Period {} to {}", report.start_date, report.end_date))
                    .print();
            }
        }
    }
    Ok(())
}
