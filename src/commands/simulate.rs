use tracing::info;

use super::AppState;
use crate::models::{SimulationResult, ViewMode};
use crate::services::stock_service::{self, DEFAULT_SIMULATION_DAYS, DEFAULT_SIMULATION_TRIALS};
use crate::utils::errors::AppError;
use crate::utils::format::{format_percentage, format_price};
use crate::utils::Panel;

fn parse_count(raw: Option<&&str>, default: u32, what: &str) -> Result<u32, AppError> {
    match raw {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| AppError::UserInput(format!("Please enter a whole number of {}", what))),
        None => Ok(default),
    }
}

/// `simulate [days] [trials]`
pub async fn execute(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    info!("🎲 Simulate command called with args: {:?}", args);
    let days = parse_count(args.first(), DEFAULT_SIMULATION_DAYS, "days")?;
    let trials = parse_count(args.get(1), DEFAULT_SIMULATION_TRIALS, "simulations")?;

    match stock_service::run_simulation(&state.controller, state.client.as_ref(), days, trials).await? {
        Some(sim) => stats_panel(&sim, ViewMode::Simulation)
            .footer(format!("Chart saved to {}", state.chart_path.display()))
            .print(),
        None => info!("Simulation superseded by a newer request"),
    }
    Ok(())
}

/// `mode <history|simulation>`
pub async fn execute_mode(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let mode = match args.first() {
        Some(raw) => raw.parse::<ViewMode>().map_err(AppError::UserInput)?,
        None => {
            let current = state.controller.lock().await.mode();
            Panel::new("🔀 View Mode").field("Mode", current.to_string()).print();
            return Ok(());
        }
    };

    let redrawn = stock_service::set_mode(&state.controller, mode).await?;
    let panel = Panel::new("🔀 View Mode").field("Mode", mode.to_string());
    if redrawn {
        panel.footer(format!("Chart saved to {}", state.chart_path.display())).print();
    } else {
        panel.footer("Run `simulate` to see the simulation overlay").print();
    }
    Ok(())
}

/// `stats`
pub async fn execute_stats(state: &AppState) -> Result<(), AppError> {
    let panel = {
        let ctl = state.controller.lock().await;
        let sim = ctl
            .simulation()
            .ok_or_else(|| AppError::UserInput("No simulation loaded. Run `simulate` first.".to_string()))?;
        stats_panel(sim, ctl.mode())
    };
    panel.print();
    Ok(())
}

fn stats_panel(sim: &SimulationResult, mode: ViewMode) -> Panel {
    let mut panel = Panel::new(format!("🎲 {} Monte Carlo Simulation", sim.ticker))
        .field("Expected Price", format_price(sim.mean_price))
        .field(
            "90% Interval",
            format!("{} - {}", format_price(sim.percentile_5), format_price(sim.percentile_95)),
        )
        .field("Trials", sim.trials().to_string())
        .field("Horizon", format!("{} days", sim.horizon()));

    if let Some(current) = sim.current_price {
        panel = panel.field("Current Price", format_price(current));
    }
    if let Some(median) = sim.median_price {
        panel = panel.field("Median Price", format_price(median));
    }
    if let Some(ret) = sim.annual_return {
        panel = panel.field("Annual Return", format_percentage(Some(ret)));
    }
    if let Some(vol) = sim.annual_volatility {
        panel = panel.field("Annual Volatility", format_percentage(Some(vol)));
    }

    panel.field("Mode", mode.to_string())
}
