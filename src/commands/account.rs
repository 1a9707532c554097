use super::AppState;
use crate::services::account_service;
use crate::utils::errors::AppError;
use crate::utils::Panel;

/// `deposit <amount>`
pub async fn execute_deposit(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let amount = args
        .first()
        .ok_or_else(|| AppError::UserInput("Usage: `deposit <amount>`".to_string()))?;
    let receipt = account_service::deposit(&state.client, amount).await?;

    let mut panel = Panel::new("💰 Deposit").description(receipt.message.unwrap_or_else(|| "Deposit successful".to_string()));
    if let Some(id) = receipt.transaction_id {
        panel = panel.footer(format!("Transaction #{}", id));
    }
    panel.print();
    Ok(())
}

/// `withdraw <amount>`
pub async fn execute_withdraw(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let amount = args
        .first()
        .ok_or_else(|| AppError::UserInput("Usage: `withdraw <amount>`".to_string()))?;
    let receipt = account_service::withdraw(&state.client, amount).await?;

    let mut panel = Panel::new("💸 Withdrawal").description(receipt.message.unwrap_or_else(|| "Withdrawal successful".to_string()));
    if let Some(id) = receipt.transaction_id {
        panel = panel.footer(format!("Transaction #{}", id));
    }
    panel.print();
    Ok(())
}

/// `order <buy|sell> <TICKER> <qty> [limit_price]`
pub async fn execute_order(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let order = match args {
        [side, ticker, quantity] => account_service::build_order(side, ticker, quantity, None)?,
        [side, ticker, quantity, price] => account_service::build_order(side, ticker, quantity, Some(*price))?,
        _ => {
            return Err(AppError::UserInput(
                "Usage: `order <buy|sell> <TICKER> <quantity> [limit_price]`".to_string(),
            ))
        }
    };

    let receipt = account_service::place_order(&state.client, &order).await?;

    // Rejected orders still come back as 200 with status "error"
    if receipt.status.as_deref() == Some("error") {
        return Err(AppError::UserInput(
            receipt.message.unwrap_or_else(|| "Order was rejected".to_string()),
        ));
    }

    let mut panel = Panel::new("🧾 Order Submitted")
        .field("Ticker", order.ticker.clone())
        .field("Side", format!("{:?}", order.order_type))
        .field("Type", format!("{:?}", order.order_execution_type))
        .field("Quantity", order.order_quantity.to_string());
    if let Some(price) = order.order_price {
        panel = panel.field("Limit Price", format!("${:.2}", price));
    }
    if let Some(status) = &receipt.order_status {
        panel = panel.field("Status", status.clone());
    }
    if let Some(message) = &receipt.message {
        panel = panel.description(message.clone());
    }
    if let Some(id) = receipt.order_id {
        panel = panel.footer(format!("Order #{}", id));
    }
    panel.print();
    Ok(())
}
