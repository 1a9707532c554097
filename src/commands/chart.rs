use chrono::Local;
use tracing::info;

use super::AppState;
use crate::models::DateRange;
use crate::services::chart_controller::ChartSummary;
use crate::services::range_service::{self, RANGE_HELP};
use crate::services::stock_service;
use crate::utils::errors::AppError;
use crate::utils::format::format_price;
use crate::utils::Panel;

/// `chart <TICKER> [range] [start end]`
pub async fn execute(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    info!("📈 Chart command called with args: {:?}", args);

    let (ticker, rest) = match args.split_first() {
        Some((ticker, rest)) => (stock_service::normalize_ticker(ticker)?, rest),
        None => {
            return Err(AppError::UserInput(
                "Usage: `chart <TICKER> [range]`, e.g. `chart AAPL 6m`".to_string(),
            ))
        }
    };
    let range = match rest.split_first() {
        Some((token, dates)) => range_service::parse_range(token, dates)?,
        None => DateRange::All,
    };

    let today = Local::now().date_naive();
    let drawn = stock_service::select_ticker(&state.controller, state.client.as_ref(), &ticker, range, today).await?;
    report(state, drawn);
    Ok(())
}

/// `range <1m|3m|6m|1y|all|custom> [start end]`
pub async fn execute_range(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let range = match args.split_first() {
        Some((token, dates)) => range_service::parse_range(token, dates)?,
        None => return Err(AppError::UserInput(RANGE_HELP.to_string())),
    };

    let today = Local::now().date_naive();
    let drawn = stock_service::select_range(&state.controller, state.client.as_ref(), range, today).await?;
    report(state, drawn);
    Ok(())
}

fn report(state: &AppState, drawn: Option<ChartSummary>) {
    match drawn {
        Some(summary) => summary_panel(&summary)
            .footer(format!("Chart saved to {}", state.chart_path.display()))
            .print(),
        None => info!("Chart request superseded by a newer selection"),
    }
}

fn summary_panel(summary: &ChartSummary) -> Panel {
    let mut panel = Panel::new(format!("📈 {} Price History", summary.ticker))
        .field("Range", summary.range.to_string())
        .field("Points", summary.points.to_string())
        .field("Mode", summary.mode.to_string());

    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        panel = panel.field("Period", format!("{} to {}", first, last));
    }
    if let Some(close) = summary.last_close {
        panel = panel.field("Last Close", format_price(close));
    }
    panel
}
