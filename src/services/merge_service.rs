use crate::models::{HistoricalSeries, MergedTimeline, SimulationResult, ViewMode};

/// Historical points kept ahead of the simulated region in simulation mode
pub const SIMULATION_HISTORY_WINDOW: usize = 60;
/// Most simulated paths drawn in simulation mode
pub const MAX_PATHS_SIMULATION: usize = 500;
/// Most simulated paths drawn in history mode
pub const MAX_PATHS_HISTORY: usize = 50;

pub const LOWER_PERCENTILE: f64 = 0.05;
pub const UPPER_PERCENTILE: f64 = 0.95;

/// Most paths drawn for `mode`
pub fn path_cap(mode: ViewMode) -> usize {
    match mode {
        ViewMode::History => MAX_PATHS_HISTORY,
        ViewMode::Simulation => MAX_PATHS_SIMULATION,
    }
}

/// Join filtered history and a simulation into one timeline.
///
/// In simulation mode only the last `SIMULATION_HISTORY_WINDOW` historical
/// points are kept. Median and percentile bands are computed from every
/// trial, not only the drawn ones.
pub fn merge(history: &HistoricalSeries, sim: &SimulationResult, mode: ViewMode) -> MergedTimeline {
    let shown = match mode {
        ViewMode::Simulation => history.tail(SIMULATION_HISTORY_WINDOW),
        ViewMode::History => history.points(),
    };
    let history_len = shown.len();
    let sim_len = sim.dates.len();

    let labels = shown
        .iter()
        .map(|p| p.date)
        .chain(sim.dates.iter().copied())
        .collect();

    let history_series = shown
        .iter()
        .map(|p| Some(p.close))
        .chain(std::iter::repeat(None).take(sim_len))
        .collect();

    let volume_series = shown
        .iter()
        .map(|p| Some(p.volume as f64))
        .chain(std::iter::repeat(None).take(sim_len))
        .collect();

    let path_series = sim
        .all_paths
        .iter()
        .take(path_cap(mode))
        .map(|path| simulated_region(history_len, path.iter().copied().map(Some)))
        .collect();

    let columns = trial_columns(sim);
    let median_series = simulated_region(history_len, columns.iter().map(|c| median(c)));
    let lower_band = simulated_region(
        history_len,
        columns.iter().map(|c| nearest_rank(c, LOWER_PERCENTILE)),
    );
    let upper_band = simulated_region(
        history_len,
        columns.iter().map(|c| nearest_rank(c, UPPER_PERCENTILE)),
    );

    MergedTimeline {
        labels,
        history_len,
        history_series,
        volume_series,
        path_series,
        median_series,
        lower_band,
        upper_band,
    }
}

/// `None` over the historical region followed by the simulated values
fn simulated_region<I>(history_len: usize, values: I) -> Vec<Option<f64>>
where
    I: Iterator<Item = Option<f64>>,
{
    std::iter::repeat(None).take(history_len).chain(values).collect()
}

/// Trial values per date index, each column sorted ascending
fn trial_columns(sim: &SimulationResult) -> Vec<Vec<f64>> {
    (0..sim.dates.len())
        .map(|i| {
            let mut column: Vec<f64> = sim.all_paths.iter().filter_map(|p| p.get(i).copied()).collect();
            column.sort_by(|a, b| a.total_cmp(b));
            column
        })
        .collect()
}

/// Middle order statistic of a sorted slice: element `floor(n / 2)`
pub fn median(sorted: &[f64]) -> Option<f64> {
    sorted.get(sorted.len() / 2).copied()
}

/// Nearest-rank percentile of a sorted slice: element `floor(p * (n - 1))`
pub fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let index = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
    sorted.get(index).copied()
}
