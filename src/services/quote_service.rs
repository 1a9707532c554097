use tracing::info;

use crate::api::market::MarketApiClient;
use crate::models::Quote;
use crate::services::stock_service::normalize_ticker;
use crate::utils::errors::AppError;
use crate::utils::ratelimit::check_quote_rate_limit;

/// Fetch a near real-time quote, subject to the local quote rate limit
pub async fn get_quote(client: &MarketApiClient, symbol: &str) -> Result<Quote, AppError> {
    let symbol = normalize_ticker(symbol)?;

    if let Err(wait) = check_quote_rate_limit() {
        return Err(AppError::UserInput(format!(
            "⏳ Quote requests are limited to 5 per minute. Please wait {} seconds.",
            wait.as_secs().max(1)
        )));
    }

    let quote = client.fetch_quote(&symbol).await?;
    info!("Quote for {}: {:.2} ({:+.2}%)", symbol, quote.price, quote.change_percent);
    Ok(quote)
}
