use super::AppState;
use crate::services::fundamentals_service;
use crate::utils::errors::AppError;
use crate::utils::format::{format_number, format_percentage, format_ratio};
use crate::utils::Panel;

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn year(value: Option<i32>) -> String {
    value.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
}

/// `fundamentals [TICKER]`
pub async fn execute(state: &AppState, args: &[&str]) -> Result<(), AppError> {
    let ticker = match args.first() {
        Some(ticker) => ticker.to_string(),
        None => state
            .controller
            .lock()
            .await
            .ticker()
            .map(str::to_string)
            .unwrap_or_else(|| state.default_ticker.clone()),
    };

    let report = fundamentals_service::get_report(&state.client, &ticker).await?;
    let profile = &report.profile;
    let balance = &report.balance_sheet;
    let income = &report.income_statement;

    Panel::new(format!("🏢 {} Company Profile", profile.ticker))
        .field("Company", text(&profile.company_name))
        .field("Sector", text(&profile.sector))
        .field("Industry", text(&profile.industry))
        .field("Market Cap", format_number(profile.market_cap))
        .field("P/E Ratio", format_ratio(profile.pe_ratio))
        .field("EPS", format_ratio(profile.eps))
        .field("Dividend Yield", format_percentage(profile.dividend_yield))
        .footer(format!("Fiscal year {}", year(profile.fiscal_year)))
        .print();

    Panel::new("📑 Balance Sheet")
        .field("Total Assets", format_number(balance.total_assets))
        .field("Total Liabilities", format_number(balance.total_liabilities))
        .field("Total Equity", format_number(balance.total_equity))
        .field("Cash & Equivalents", format_number(balance.cash_and_equivalents))
        .field("Current Assets", format_number(balance.current_assets))
        .field("Current Liabilities", format_number(balance.current_liabilities))
        .field("Long-term Debt", format_number(balance.long_term_debt))
        .footer(format!("Fiscal year {}", year(balance.fiscal_year)))
        .print();

    Panel::new("📊 Income Statement")
        .field("Total Revenue", format_number(income.total_revenue))
        .field("Gross Profit", format_number(income.gross_profit))
        .field("Operating Income", format_number(income.operating_income))
        .field("Net Income", format_number(income.net_income))
        .field("EPS", format_ratio(income.eps))
        .field("Shares Outstanding", format_number(income.shares_outstanding))
        .footer(format!("Fiscal year {}", year(income.fiscal_year)))
        .print();

    Ok(())
}
