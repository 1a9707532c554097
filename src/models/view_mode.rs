//! Chart view mode

use std::fmt;
use std::str::FromStr;

/// Which side of the chart is emphasised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    History,
    Simulation,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::History => "history",
            ViewMode::Simulation => "simulation",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "history" | "hist" | "h" => Ok(ViewMode::History),
            "simulation" | "sim" | "s" => Ok(ViewMode::Simulation),
            other => Err(format!("Unknown view mode: '{}'. Use: history, simulation", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("History".parse::<ViewMode>(), Ok(ViewMode::History));
        assert_eq!("sim".parse::<ViewMode>(), Ok(ViewMode::Simulation));
        assert!("forecast".parse::<ViewMode>().is_err());
    }
}
