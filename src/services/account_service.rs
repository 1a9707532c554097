use tracing::info;

use crate::api::market::MarketApiClient;
use crate::models::{ExecutionType, FundReceipt, OrderReceipt, OrderRequest, OrderSide};
use crate::services::stock_service::normalize_ticker;
use crate::utils::errors::AppError;

/// Parse a strictly positive amount
pub fn parse_positive(raw: &str, what: &str) -> Result<f64, AppError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(AppError::UserInput(format!("Please enter a valid {} greater than 0", what))),
    }
}

pub fn parse_side(raw: &str) -> Result<OrderSide, AppError> {
    match raw.to_lowercase().as_str() {
        "buy" => Ok(OrderSide::Buy),
        "sell" => Ok(OrderSide::Sell),
        _ => Err(AppError::UserInput(format!("Unknown order side '{}'. Use buy or sell", raw))),
    }
}

/// Build an order; a limit price makes it a limit order, otherwise it executes at market
pub fn build_order(side: &str, ticker: &str, quantity: &str, limit_price: Option<&str>) -> Result<OrderRequest, AppError> {
    let order_type = parse_side(side)?;
    let ticker = normalize_ticker(ticker)?;
    let order_quantity = parse_positive(quantity, "quantity")?;
    let order_price = limit_price.map(|p| parse_positive(p, "limit price")).transpose()?;

    Ok(OrderRequest {
        ticker,
        order_type,
        order_execution_type: if order_price.is_some() {
            ExecutionType::Limit
        } else {
            ExecutionType::Market
        },
        order_quantity,
        order_price,
    })
}

pub async fn place_order(client: &MarketApiClient, order: &OrderRequest) -> Result<OrderReceipt, AppError> {
    info!(
        "Placing {:?} {:?} order: {} x {}",
        order.order_execution_type, order.order_type, order.order_quantity, order.ticker
    );
    Ok(client.create_order(order).await?)
}

pub async fn deposit(client: &MarketApiClient, amount: &str) -> Result<FundReceipt, AppError> {
    let amount = parse_positive(amount, "amount")?;
    info!("Depositing {:.2}", amount);
    Ok(client.deposit(amount).await?)
}

pub async fn withdraw(client: &MarketApiClient, amount: &str) -> Result<FundReceipt, AppError> {
    let amount = parse_positive(amount, "amount")?;
    info!("Withdrawing {:.2}", amount);
    Ok(client.withdraw(amount).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amounts_must_be_positive() {
        assert_eq!(parse_positive("12.5", "amount").unwrap(), 12.5);
        assert!(parse_positive("0", "amount").is_err());
        assert!(parse_positive("-3", "amount").is_err());
        assert!(parse_positive("abc", "amount").is_err());
        assert!(parse_positive("inf", "amount").is_err());
    }

    #[test]
    fn test_limit_price_selects_execution_type() {
        let market = build_order("buy", "aapl", "10", None).unwrap();
        assert_eq!(market.order_execution_type, ExecutionType::Market);
        assert_eq!(market.order_price, None);
        assert_eq!(market.ticker, "AAPL");

        let limit = build_order("SELL", "msft", "2", Some("410.5")).unwrap();
        assert_eq!(limit.order_type, OrderSide::Sell);
        assert_eq!(limit.order_execution_type, ExecutionType::Limit);
        assert_eq!(limit.order_price, Some(410.5));
    }

    #[test]
    fn test_invalid_orders() {
        assert!(build_order("hold", "AAPL", "1", None).is_err());
        assert!(build_order("buy", "AAPL", "0", None).is_err());
        assert!(build_order("buy", "AAPL", "1", Some("-5")).is_err());
    }

    #[test]
    fn test_market_order_omits_price_on_the_wire() {
        let order = build_order("buy", "AAPL", "3", None).unwrap();
        let body = serde_json::to_value(&order).unwrap();
        assert_eq!(body["order_type"], "buy");
        assert_eq!(body["order_execution_type"], "market");
        assert!(body.get("order_price").is_none());
    }
}
