pub mod account_service;
pub mod chart_controller;
pub mod chart_service;
pub mod chat_service;
pub mod fundamentals_service;
pub mod merge_service;
pub mod quote_service;
pub mod range_service;
pub mod risk_service;
pub mod stock_service;
