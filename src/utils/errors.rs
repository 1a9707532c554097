use chrono::NaiveDate;
use thiserror::Error;

use crate::api::market::ApiError;

/// Anything a user action can fail with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    UserInput(String),
    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("{0}")]
    NoData(String),
    #[error("Failed to render chart: {0}")]
    Render(String),
}

/// Message shown in the error panel for a failed command
///
/// Network and rate-limit failures get a hint to retry; server messages are
/// shown as the server wrote them.
pub fn user_message(error: &AppError) -> String {
    match error {
        AppError::Api(ApiError::NetworkFailure(detail)) => {
            format!("⚠️ Network Error: could not reach the server ({}). Please try again.", detail)
        }
        AppError::Api(e) if e.is_rate_limited() => {
            "⚠️ Rate Limited: the market data provider is throttling requests. Please try again later.".to_string()
        }
        AppError::Api(ApiError::ServerError { message, .. }) => format!("❌ {}", message),
        AppError::Api(ApiError::ValidationError(detail)) => {
            format!("❌ The server sent data in an unexpected format: {}", detail)
        }
        other => format!("❌ {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_passes_through() {
        let err = AppError::from(ApiError::ServerError {
            status: 400,
            message: "Insufficient account balance".to_string(),
        });
        assert_eq!(user_message(&err), "❌ Insufficient account balance");
    }

    #[test]
    fn test_rate_limit_message() {
        let err = AppError::from(ApiError::ServerError {
            status: 429,
            message: "Too many requests".to_string(),
        });
        assert!(user_message(&err).contains("Rate Limited"));
    }

    #[test]
    fn test_invalid_range_message() {
        let err = AppError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        };
        assert_eq!(user_message(&err), "❌ Start date 2026-05-01 is after end date 2026-04-01");
    }
}
