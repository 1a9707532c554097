use tracing::info;

use crate::api::market::MarketApiClient;
use crate::models::{BalanceSheet, FundamentalData, IncomeStatement};
use crate::services::stock_service::normalize_ticker;
use crate::utils::errors::AppError;

#[derive(Debug, Clone)]
pub struct CompanyReport {
    pub profile: FundamentalData,
    pub balance_sheet: BalanceSheet,
    pub income_statement: IncomeStatement,
}

/// Fetch company profile, balance sheet and income statement concurrently
pub async fn get_report(client: &MarketApiClient, ticker: &str) -> Result<CompanyReport, AppError> {
    let ticker = normalize_ticker(ticker)?;
    info!("Fetching fundamentals for {}", ticker);

    let (profile, balance_sheet, income_statement) = tokio::join!(
        client.fetch_fundamentals(&ticker),
        client.fetch_balance_sheet(&ticker),
        client.fetch_income_statement(&ticker),
    );

    Ok(CompanyReport {
        profile: profile?,
        balance_sheet: balance_sheet?,
        income_statement: income_statement?,
    })
}
