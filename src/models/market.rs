//! Quote and company fundamentals models

use serde::Deserialize;

/// Near real-time quote for one symbol
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    pub ticker: Option<String>,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FundamentalData {
    pub ticker: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub fiscal_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceSheet {
    pub fiscal_year: Option<i32>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_equity: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub long_term_debt: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomeStatement {
    pub fiscal_year: Option<i32>,
    pub total_revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub eps: Option<f64>,
    pub shares_outstanding: Option<f64>,
}
