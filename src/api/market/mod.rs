pub mod client;
pub mod models;

pub use client::MarketApiClient;
pub use models::ApiError;
