use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::debug;

use crate::models::{ChartSpec, DatasetRole, DatasetSpec, HistoricalSeries, MergedTimeline, Rgba, ViewMode};
use crate::utils::errors::AppError;

const HISTORY_COLOR: Rgba = Rgba::new(75, 192, 192, 1.0);
const VOLUME_COLOR: Rgba = Rgba::new(153, 102, 255, 0.2);
const MEDIAN_COLOR: Rgba = Rgba::new(255, 99, 132, 1.0);
const LOWER_BAND_COLOR: Rgba = Rgba::new(220, 53, 69, 0.9);
const UPPER_BAND_COLOR: Rgba = Rgba::new(40, 167, 69, 0.9);

/// Colours cycled through for simulated paths
pub const PATH_PALETTE: [Rgba; 10] = [
    Rgba::new(255, 99, 132, 0.3),
    Rgba::new(54, 162, 235, 0.3),
    Rgba::new(255, 206, 86, 0.3),
    Rgba::new(75, 192, 192, 0.3),
    Rgba::new(153, 102, 255, 0.3),
    Rgba::new(255, 159, 64, 0.3),
    Rgba::new(199, 199, 199, 0.3),
    Rgba::new(83, 102, 255, 0.3),
    Rgba::new(255, 99, 71, 0.3),
    Rgba::new(50, 205, 50, 0.3),
];

pub const PATH_LABEL: &str = "Simulated path";

/// Something a chart can be drawn onto. There is one per controller.
pub trait ChartSurface: Send {
    fn draw(&mut self, spec: &ChartSpec) -> Result<(), AppError>;
}

/// Draws charts into a PNG file, overwriting it on every render
pub struct PngSurface {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl PngSurface {
    pub fn new(path: PathBuf, width: u32, height: u32) -> Self {
        Self { path, width, height }
    }
}

impl ChartSurface for PngSurface {
    fn draw(&mut self, spec: &ChartSpec) -> Result<(), AppError> {
        render_png(spec, &self.path, self.width, self.height)?;
        debug!("Chart written to {} ({} labels, {} datasets)", self.path.display(), spec.labels.len(), spec.datasets.len());
        Ok(())
    }
}

pub fn y_axis_title(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::History => "Price ($)",
        ViewMode::Simulation => "Price ($), history + simulated",
    }
}

/// Historical line styling: full strength in history mode, muted in simulation mode
fn history_style(mode: ViewMode) -> (Rgba, u32) {
    match mode {
        ViewMode::History => (HISTORY_COLOR, 2),
        ViewMode::Simulation => (HISTORY_COLOR.with_alpha(0.5), 1),
    }
}

fn history_dataset(values: Vec<Option<f64>>, mode: ViewMode) -> DatasetSpec {
    let (color, stroke_width) = history_style(mode);
    DatasetSpec {
        label: "Historical price".to_string(),
        role: DatasetRole::HistoricalPrice,
        values,
        color,
        stroke_width,
        show_in_legend: true,
        secondary_axis: false,
    }
}

fn volume_dataset(values: Vec<Option<f64>>) -> DatasetSpec {
    DatasetSpec {
        label: "Volume".to_string(),
        role: DatasetRole::Volume,
        values,
        color: VOLUME_COLOR,
        stroke_width: 1,
        show_in_legend: true,
        secondary_axis: true,
    }
}

fn band_dataset(label: &str, role: DatasetRole, values: Vec<Option<f64>>, color: Rgba) -> DatasetSpec {
    DatasetSpec {
        label: label.to_string(),
        role,
        values,
        color,
        stroke_width: 2,
        show_in_legend: true,
        secondary_axis: false,
    }
}

/// Chart of a plain historical series. Always drawn in history styling,
/// whatever the view mode, since there is no simulation to set it against.
pub fn history_spec(series: &HistoricalSeries) -> ChartSpec {
    let mode = ViewMode::History;
    let points = series.points();
    ChartSpec {
        title: format!("{} Price History", series.ticker()),
        labels: points.iter().map(|p| p.date).collect(),
        datasets: vec![
            history_dataset(points.iter().map(|p| Some(p.close)).collect(), mode),
            volume_dataset(points.iter().map(|p| Some(p.volume as f64)).collect()),
        ],
        y_axis_title: y_axis_title(mode).to_string(),
        secondary_axis_title: "Volume".to_string(),
    }
}

/// Chart of history merged with a simulation
pub fn simulation_spec(ticker: &str, timeline: &MergedTimeline, mode: ViewMode) -> ChartSpec {
    let mut datasets = Vec::with_capacity(timeline.path_series.len() + 5);

    datasets.push(history_dataset(timeline.history_series.clone(), mode));
    datasets.push(volume_dataset(timeline.volume_series.clone()));

    for (index, path) in timeline.path_series.iter().enumerate() {
        datasets.push(DatasetSpec {
            label: PATH_LABEL.to_string(),
            role: DatasetRole::SimulationPath,
            values: path.clone(),
            color: PATH_PALETTE[index % PATH_PALETTE.len()],
            stroke_width: 1,
            show_in_legend: false,
            secondary_axis: false,
        });
    }

    datasets.push(band_dataset("Median forecast", DatasetRole::Median, timeline.median_series.clone(), MEDIAN_COLOR));
    datasets.push(band_dataset("5th percentile", DatasetRole::LowerBand, timeline.lower_band.clone(), LOWER_BAND_COLOR));
    datasets.push(band_dataset("95th percentile", DatasetRole::UpperBand, timeline.upper_band.clone(), UPPER_BAND_COLOR));

    ChartSpec {
        title: format!("{} Monte Carlo Forecast ({} paths shown)", ticker, timeline.path_series.len()),
        labels: timeline.labels.clone(),
        datasets,
        y_axis_title: y_axis_title(mode).to_string(),
        secondary_axis_title: "Volume".to_string(),
    }
}

/// Contiguous runs of present values as (index, value) pairs
fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => current.push((i, *v)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Padded value range of the price-axis datasets
fn price_bounds(spec: &ChartSpec) -> (f64, f64) {
    let values = spec
        .datasets
        .iter()
        .filter(|d| !d.secondary_axis)
        .flat_map(|d| d.values.iter().flatten().copied())
        .filter(|v| v.is_finite());

    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    // Avoid a zero-height axis for flat series
    let padding = (max - min).max(1e-8) * 0.1;
    ((min - padding).max(0.0), max + padding)
}

fn render_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Render(e.to_string())
}

fn to_color(c: Rgba) -> RGBAColor {
    RGBAColor(c.r, c.g, c.b, c.a)
}

/// Draw `spec` as a PNG at `path`
pub fn render_png(spec: &ChartSpec, path: &Path, width: u32, height: u32) -> Result<(), AppError> {
    if spec.labels.len() < 2 {
        return Err(AppError::Render(
            "Not enough price data to draw a chart (minimum 2 points required)".to_string(),
        ));
    }

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (y_min, y_max) = price_bounds(spec);
    let volume_peak = spec
        .datasets
        .iter()
        .filter(|d| d.secondary_axis)
        .flat_map(|d| d.values.iter().flatten().copied())
        .fold(0.0_f64, f64::max);
    // Volume bars occupy roughly the bottom quarter of the plot
    let volume_max = (volume_peak * 4.0).max(1.0);
    let x_max = spec.labels.len() - 1;
    let labels = &spec.labels;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 32).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(70)
        .build_cartesian_2d(0usize..x_max, y_min..y_max)
        .map_err(render_err)?
        .set_secondary_coord(0usize..x_max, 0f64..volume_max);

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|idx: &usize| {
            labels
                .get(*idx)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .x_desc("Date")
        .y_desc(&spec.y_axis_title)
        .draw()
        .map_err(render_err)?;

    chart
        .configure_secondary_axes()
        .y_desc(&spec.secondary_axis_title)
        .draw()
        .map_err(render_err)?;

    for dataset in spec.datasets.iter().filter(|d| d.secondary_axis) {
        let fill = to_color(dataset.color).filled();
        chart
            .draw_secondary_series(dataset.values.iter().enumerate().filter_map(|(i, v)| {
                v.map(|v| Rectangle::new([(i, 0.0), ((i + 1).min(x_max), v)], fill))
            }))
            .map_err(render_err)?;
    }

    for dataset in spec.datasets.iter().filter(|d| !d.secondary_axis) {
        let style = to_color(dataset.color).stroke_width(dataset.stroke_width);
        let mut labelled = false;
        for run in segments(&dataset.values) {
            let anno = chart
                .draw_series(LineSeries::new(run, style))
                .map_err(render_err)?;
            if dataset.show_in_legend && !labelled {
                anno.label(dataset.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
                labelled = true;
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Keeps every spec it is asked to draw, or refuses them all while failing
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSurface {
        drawn: Arc<Mutex<Vec<ChartSpec>>>,
        failing: Arc<AtomicBool>,
    }

    impl RecordingSurface {
        pub(crate) fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub(crate) fn draw_count(&self) -> usize {
            self.drawn.lock().unwrap().len()
        }

        pub(crate) fn last(&self) -> Option<ChartSpec> {
            self.drawn.lock().unwrap().last().cloned()
        }
    }

    impl ChartSurface for RecordingSurface {
        fn draw(&mut self, spec: &ChartSpec) -> Result<(), AppError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(AppError::Render("surface unavailable".to_string()));
            }
            self.drawn.lock().unwrap().push(spec.clone());
            Ok(())
        }
    }
}
