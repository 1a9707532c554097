use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::market::MarketApiClient;
use commands::AppState;
use config::Config;
use models::DateRange;
use services::chart_controller::StockChartController;
use services::chart_service::PngSurface;
use services::stock_service;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Logs go to stderr so panels on stdout stay readable
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "stockview=debug".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting stockview {}...", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    debug!("Configuration: api={}, chart={}", config.api_base_url, config.chart_path.display());
    if config.session_cookie.is_none() {
        warn!("STOCKVIEW_SESSION_COOKIE is not set; login-protected endpoints will be refused");
    }

    let client = match MarketApiClient::new(
        config.api_base_url.clone(),
        config.session_cookie.clone(),
        config.request_timeout,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create API client: {}", e);
            return;
        }
    };

    let surface = PngSurface::new(config.chart_path.clone(), config.chart_width, config.chart_height);
    let controller = StockChartController::new(config.default_view_mode, Box::new(surface));

    let state = AppState {
        client,
        controller: Arc::new(Mutex::new(controller)),
        risk: config.risk,
        chart_path: config.chart_path.clone(),
        default_ticker: config.default_ticker.clone(),
    };

    commands::help::help_panel().print();

    // Initial chart for the default ticker
    {
        let state = state.clone();
        tokio::spawn(async move {
            let today = Local::now().date_naive();
            if let Err(e) = stock_service::select_ticker(
                &state.controller,
                state.client.as_ref(),
                &state.default_ticker,
                DateRange::All,
                today,
            )
            .await
            {
                warn!("Initial load of {} failed: {}", state.default_ticker, e);
                commands::error_panel(&e).print();
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        let trimmed = line.trim();
        if matches!(trimmed, "quit" | "exit") {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        // Each action runs on its own task so slow requests can overlap
        let state = state.clone();
        tokio::spawn(async move {
            commands::handle_message(&state, &line).await;
        });
    }

    info!("👋 stockview shutting down");
}
