//! Data models for stockview commands and services
//!
//! Chart state (prices, simulations, merged timelines, render specs) and the
//! request/response shapes of the account, quote and analysis endpoints.

pub mod account;
pub mod chart;
pub mod market;
pub mod price;
pub mod range;
pub mod risk;
pub mod simulation;
pub mod timeline;
pub mod view_mode;

// Re-export commonly used types for convenience
pub use account::{ChatReply, ChatRequest, ExecutionType, FundReceipt, FundRequest, OrderReceipt, OrderRequest, OrderSide};
pub use chart::{ChartSpec, DatasetRole, DatasetSpec, Rgba};
pub use market::{BalanceSheet, FundamentalData, IncomeStatement, Quote};
pub use price::{HistoricalSeries, PricePoint};
pub use range::DateRange;
pub use risk::{AnalysisRequest, AnalysisResponse, EvaluatedRisk, MetricRating, RatedMetric, RiskLevel};
pub use simulation::SimulationResult;
pub use timeline::MergedTimeline;
pub use view_mode::ViewMode;
