pub mod account;
pub mod analyze;
pub mod chart;
pub mod chat;
pub mod fundamentals;
pub mod help;
pub mod quote;
pub mod simulate;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::api::market::MarketApiClient;
use crate::config::RiskThresholds;
use crate::services::stock_service::SharedController;
use crate::utils::errors::{user_message, AppError};
use crate::utils::Panel;

/// Everything a command needs, cheap to clone into a task
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<MarketApiClient>,
    pub controller: SharedController,
    pub risk: RiskThresholds,
    pub chart_path: PathBuf,
    pub default_ticker: String,
}

/// Parse and run one input line
pub async fn handle_message(state: &AppState, line: &str) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (command, args) = match parts.split_first() {
        Some((command, args)) => (command.to_lowercase(), args),
        None => return,
    };

    let result = match command.as_str() {
        "chart" | "c" => chart::execute(state, args).await,
        "range" | "r" => chart::execute_range(state, args).await,
        "simulate" | "sim" => simulate::execute(state, args).await,
        "mode" => simulate::execute_mode(state, args).await,
        "stats" => simulate::execute_stats(state).await,
        "quote" | "q" => quote::execute(state, args).await,
        "fundamentals" | "fund" => fundamentals::execute(state, args).await,
        "analyze" | "risk" => analyze::execute(state, args).await,
        "deposit" => account::execute_deposit(state, args).await,
        "withdraw" => account::execute_withdraw(state, args).await,
        "order" => account::execute_order(state, args).await,
        "chat" | "ask" => chat::execute(state, args).await,
        "help" | "?" => help::execute(),
        _ => Err(AppError::UserInput(format!(
            "Unknown command '{}'. Type `help` for a list of commands.",
            command
        ))),
    };

    match result {
        Ok(()) => info!("Command {} completed", command),
        Err(e) => {
            error!("❌ Error executing command {}: {}", command, e);
            error_panel(&e).print();
        }
    }
}

/// The panel shown in place of a failed command's output
pub fn error_panel(error: &AppError) -> Panel {
    Panel::new("Command Error").description(user_message(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::market::ApiError;

    #[test]
    fn test_error_panel_uses_friendly_message() {
        let panel = error_panel(&AppError::from(ApiError::NetworkFailure("timed out".to_string())));
        assert_eq!(panel.title(), "Command Error");
        assert!(panel.to_string().contains("Network Error"));
    }
}
