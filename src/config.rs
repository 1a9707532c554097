use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::models::ViewMode;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_CHART_PATH: &str = "stock_chart.png";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHART_WIDTH: u32 = 1024;
const DEFAULT_CHART_HEIGHT: u32 = 768;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Limits a risk metric is rated against. Fractions, not percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    /// Annualised volatility above this is high
    pub volatility_high: f64,
    /// Max drawdown below this is high
    pub drawdown_high: f64,
    /// Sharpe below this is poor
    pub sharpe_poor: f64,
    /// Beta above this is high
    pub beta_high: f64,
    /// 95% daily VaR below this is high
    pub var_high: f64,
    /// Sortino below this is poor
    pub sortino_poor: f64,
    /// Share of adverse ratings at or above which overall risk is High
    pub high_ratio: f64,
    /// Share of adverse ratings at or below which overall risk is Low
    pub low_ratio: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            volatility_high: 0.30,
            drawdown_high: -0.30,
            sharpe_poor: 0.0,
            beta_high: 1.5,
            var_high: -0.03,
            sortino_poor: 0.0,
            high_ratio: 0.7,
            low_ratio: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub session_cookie: Option<String>,
    pub request_timeout: Duration,
    pub default_ticker: String,
    pub default_view_mode: ViewMode,
    pub chart_path: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    pub risk: RiskThresholds,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; unset or blank keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = get("STOCKVIEW_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let default_view_mode = match get("STOCKVIEW_DEFAULT_VIEW_MODE") {
            Some(raw) => raw.parse::<ViewMode>().map_err(|reason| ConfigError::Invalid {
                var: "STOCKVIEW_DEFAULT_VIEW_MODE",
                reason,
            })?,
            None => ViewMode::default(),
        };

        let timeout_secs: u64 = parse_var(&get, "STOCKVIEW_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "STOCKVIEW_REQUEST_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        let defaults = RiskThresholds::default();
        let risk = RiskThresholds {
            volatility_high: parse_var(&get, "STOCKVIEW_RISK_VOLATILITY_HIGH", defaults.volatility_high)?,
            drawdown_high: parse_var(&get, "STOCKVIEW_RISK_DRAWDOWN_HIGH", defaults.drawdown_high)?,
            sharpe_poor: parse_var(&get, "STOCKVIEW_RISK_SHARPE_POOR", defaults.sharpe_poor)?,
            beta_high: parse_var(&get, "STOCKVIEW_RISK_BETA_HIGH", defaults.beta_high)?,
            var_high: parse_var(&get, "STOCKVIEW_RISK_VAR_HIGH", defaults.var_high)?,
            sortino_poor: parse_var(&get, "STOCKVIEW_RISK_SORTINO_POOR", defaults.sortino_poor)?,
            high_ratio: parse_var(&get, "STOCKVIEW_RISK_HIGH_RATIO", defaults.high_ratio)?,
            low_ratio: parse_var(&get, "STOCKVIEW_RISK_LOW_RATIO", defaults.low_ratio)?,
        };

        Ok(Self {
            api_base_url,
            session_cookie: get("STOCKVIEW_SESSION_COOKIE"),
            request_timeout: Duration::from_secs(timeout_secs),
            default_ticker: get("STOCKVIEW_DEFAULT_TICKER")
                .unwrap_or_else(|| DEFAULT_TICKER.to_string())
                .to_uppercase(),
            default_view_mode,
            chart_path: PathBuf::from(get("STOCKVIEW_CHART_PATH").unwrap_or_else(|| DEFAULT_CHART_PATH.to_string())),
            chart_width: parse_var(&get, "STOCKVIEW_CHART_WIDTH", DEFAULT_CHART_WIDTH)?,
            chart_height: parse_var(&get, "STOCKVIEW_CHART_HEIGHT", DEFAULT_CHART_HEIGHT)?,
            risk,
        })
    }
}

fn parse_var<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            reason: format!("'{}' ({})", raw, e),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.default_ticker, "AAPL");
        assert_eq!(cfg.default_view_mode, ViewMode::History);
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!((cfg.chart_width, cfg.chart_height), (1024, 768));
        assert_eq!(cfg.session_cookie, None);
        assert_eq!(cfg.risk, RiskThresholds::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("STOCKVIEW_API_BASE_URL", "https://stocks.example.com/"),
            ("STOCKVIEW_DEFAULT_TICKER", "msft"),
            ("STOCKVIEW_DEFAULT_VIEW_MODE", "simulation"),
            ("STOCKVIEW_SESSION_COOKIE", "session=abc"),
            ("STOCKVIEW_RISK_BETA_HIGH", "2.0"),
        ])
        .unwrap();
        assert_eq!(cfg.api_base_url, "https://stocks.example.com");
        assert_eq!(cfg.default_ticker, "MSFT");
        assert_eq!(cfg.default_view_mode, ViewMode::Simulation);
        assert_eq!(cfg.session_cookie.as_deref(), Some("session=abc"));
        assert_eq!(cfg.risk.beta_high, 2.0);
    }

    #[test]
    fn test_malformed_values_name_the_variable() {
        let err = config(&[("STOCKVIEW_CHART_WIDTH", "wide")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "STOCKVIEW_CHART_WIDTH", .. }));

        let err = config(&[("STOCKVIEW_DEFAULT_VIEW_MODE", "candles")]).unwrap_err();
        assert!(err.to_string().starts_with("STOCKVIEW_DEFAULT_VIEW_MODE"));

        assert!(config(&[("STOCKVIEW_REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back() {
        let cfg = config(&[("STOCKVIEW_DEFAULT_TICKER", "   "), ("STOCKVIEW_SESSION_COOKIE", "")]).unwrap();
        assert_eq!(cfg.default_ticker, "AAPL");
        assert_eq!(cfg.session_cookie, None);
    }
}
