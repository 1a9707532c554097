//! Chart date-range selection

use chrono::NaiveDate;
use std::fmt;

/// A range token as chosen in the range selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    Custom { start: NaiveDate, end: NaiveDate },
    #[default]
    All,
}

impl DateRange {
    /// Wire token sent as the `range` query parameter
    pub fn token(&self) -> &'static str {
        match self {
            DateRange::OneMonth => "1m",
            DateRange::ThreeMonths => "3m",
            DateRange::SixMonths => "6m",
            DateRange::OneYear => "1y",
            DateRange::Custom { .. } => "custom",
            DateRange::All => "all",
        }
    }

    /// Look-back in months for the fixed ranges
    pub fn months_back(&self) -> Option<u32> {
        match self {
            DateRange::OneMonth => Some(1),
            DateRange::ThreeMonths => Some(3),
            DateRange::SixMonths => Some(6),
            DateRange::OneYear => Some(12),
            DateRange::Custom { .. } | DateRange::All => None,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Custom { start, end } => write!(f, "{} to {}", start, end),
            other => f.write_str(other.token()),
        }
    }
}
