use chrono::{Months, NaiveDate};

use crate::models::{DateRange, HistoricalSeries};
use crate::utils::errors::AppError;

pub const RANGE_HELP: &str = "Supported ranges: 1m, 3m, 6m, 1y, all, custom <start> <end> (dates as YYYY-MM-DD)";

/// Parse a range token, reading start/end dates from `args` for `custom`
/// Supported: 1m, 3m, 6m, 1y, all, custom
pub fn parse_range(token: &str, args: &[&str]) -> Result<DateRange, AppError> {
    match token.to_lowercase().as_str() {
        "1m" | "1month" => Ok(DateRange::OneMonth),
        "3m" | "3months" => Ok(DateRange::ThreeMonths),
        "6m" | "6months" => Ok(DateRange::SixMonths),
        "1y" | "1year" | "12m" => Ok(DateRange::OneYear),
        "all" => Ok(DateRange::All),
        "custom" => {
            let (start, end) = match args {
                [start, end, ..] => (parse_input_date(start)?, parse_input_date(end)?),
                _ => {
                    return Err(AppError::UserInput(
                        "Please provide both a start and an end date: custom <YYYY-MM-DD> <YYYY-MM-DD>".to_string(),
                    ))
                }
            };
            custom_range(start, end)
        }
        _ => Err(AppError::UserInput(format!("Unknown range: '{}'. {}", token, RANGE_HELP))),
    }
}

/// A custom range, rejected when the start is after the end
pub fn custom_range(start: NaiveDate, end: NaiveDate) -> Result<DateRange, AppError> {
    if start > end {
        return Err(AppError::InvalidRange { start, end });
    }
    Ok(DateRange::Custom { start, end })
}

pub fn parse_input_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::UserInput(format!("Invalid date '{}'. Use YYYY-MM-DD", raw)))
}

/// Earliest date kept by a fixed range, counted back from `today`
pub fn cutoff(range: &DateRange, today: NaiveDate) -> Option<NaiveDate> {
    let months = range.months_back()?;
    today.checked_sub_months(Months::new(months))
}

/// Restrict a complete series to `range`.
///
/// `all` returns the series unchanged; fixed ranges keep `date >= cutoff`;
/// custom ranges keep `start <= date <= end`.
pub fn filter(series: &HistoricalSeries, range: &DateRange, today: NaiveDate) -> Result<HistoricalSeries, AppError> {
    match range {
        DateRange::All => Ok(series.clone()),
        DateRange::Custom { start, end } => {
            let (start, end) = (*start, *end);
            if start > end {
                return Err(AppError::InvalidRange { start, end });
            }
            Ok(series.retain_dates(|d| d >= start && d <= end))
        }
        fixed => match cutoff(fixed, today) {
            Some(from) => Ok(series.retain_dates(|d| d >= from)),
            None => Ok(series.clone()),
        },
    }
}
