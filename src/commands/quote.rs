use super::AppState;
use crate::services::quote_service;
use crate::utils::errors::AppError;
use crate::utils::format::{format_number, format_price};
use crate::utils::Panel;

/// `quote [SYMBOL]`, defaulting to the current chart ticker
pub async fn execute(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let symbol = match args.first() {
        Some(symbol) => symbol.to_string(),
        None => state
            .controller
            .lock()
            .await
            .ticker()
            .map(str::to_string)
            .unwrap_or_else(|| state.default_ticker.clone()),
    };

    let quote = quote_service::get_quote(&state.client, &symbol).await?;
    let arrow = if quote.change >= 0.0 { "▲" } else { "▼" };

    let mut panel = Panel::new(format!("💹 {} Quote", quote.ticker.as_deref().unwrap_or(&symbol).to_uppercase()))
        .field("Price", format_price(quote.price))
        .field(
            "Change",
            format!("{} {:+.2} ({:+.2}%)", arrow, quote.change, quote.change_percent),
        )
        .field("Volume", format_number(quote.volume))
        .field("High", quote.high.map(format_price).unwrap_or_else(|| "-".to_string()))
        .field("Low", quote.low.map(format_price).unwrap_or_else(|| "-".to_string()));

    if let Some(updated) = &quote.last_updated {
        panel = panel.footer(format!("Last updated: {}", updated));
    }
    panel.print();
    Ok(())
}
