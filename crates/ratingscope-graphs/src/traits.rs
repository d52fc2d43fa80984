//! Chart renderer trait and the data renderers consume.

use crate::aggregator::PreparedTable;
use crate::selection::MonthSelection;
use crate::style::ChartStyle;
use plotly::Plot;
use ratingscope_common::{Metric, Month, PlotKind, RatingsError, Result};
use ratingscope_config::FilterDefinition;
use tracing::debug;

/// One plottable value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Month of the value.
    pub month: Month,
    /// Series label.
    pub series: String,
    /// Metric value.
    pub value: f64,
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Filter title, e.g. `Income Brackets`.
    pub filter_title: String,
    /// Plotted metric.
    pub metric: Metric,
    /// Grouping column, when the filter has one.
    pub group_column: Option<String>,
    /// Months shown.
    pub selection: MonthSelection,
    /// Series labels in legend order.
    pub series: Vec<String>,
    /// Values, month ascending then legend order.
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    /// Extracts the values of `metric` from `table`. Cells where the metric
    /// is undefined are left out.
    pub fn from_table(
        table: &PreparedTable,
        filter: &FilterDefinition,
        metric: Metric,
        selection: MonthSelection,
    ) -> Result<Self> {
        let mut points = Vec::with_capacity(table.rows().len());
        for row in table.rows() {
            match table.value(row, metric)? {
                Some(value) => points.push(ChartPoint {
                    month: row.month,
                    series: row.series.clone(),
                    value,
                }),
                None => debug!(series = %row.series, month = %row.month, "Undefined value skipped"),
            }
        }

        if points.is_empty() {
            return Err(RatingsError::chart(format!(
                "no {} values to plot for filter '{}'",
                metric, filter.name
            )));
        }

        Ok(Self {
            filter_title: filter.title.clone(),
            metric,
            group_column: table.group_column().map(str::to_string),
            selection,
            series: table.series().to_vec(),
            points,
        })
    }

    /// `<Metric> for <filter title>`
    pub fn base_title(&self) -> String {
        format!("{} for {}", self.metric.display_name(), self.filter_title)
    }

    /// Distinct months with a value, ascending.
    pub fn months(&self) -> Vec<Month> {
        let mut months: Vec<Month> = self.points.iter().map(|point| point.month).collect();
        months.sort();
        months.dedup();
        months
    }

    /// Points of `series`, month ascending.
    pub fn series_points<'a>(&'a self, series: &'a str) -> impl Iterator<Item = &'a ChartPoint> {
        self.points.iter().filter(move |point| point.series == series)
    }

    /// Points of `month`, legend order.
    pub fn month_points(&self, month: Month) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter().filter(move |point| point.month == month)
    }

    /// Smallest and largest plotted value.
    pub fn value_bounds(&self) -> (f64, f64) {
        self.points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), point| {
            (low.min(point.value), high.max(point.value))
        })
    }
}

/// One trace as drawn: its name, x labels, and the points behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceData {
    /// Legend name.
    pub name: String,
    /// X axis values, parallel to `points`.
    pub x: Vec<String>,
    /// Plotted points.
    pub points: Vec<ChartPoint>,
}

impl TraceData {
    /// Y values, parallel to `x`.
    pub fn y(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }
}

/// A chart flavour.
pub trait ChartRenderer: Send + Sync {
    /// Chart title.
    fn title(&self, data: &ChartData) -> String;

    /// Traces in drawing order.
    fn traces(&self, data: &ChartData) -> Vec<TraceData>;

    /// Builds the plotly figure.
    fn render(&self, data: &ChartData, style: &ChartStyle) -> Result<Plot>;
}

/// Renderer for `kind`.
pub fn renderer_for(kind: PlotKind) -> Box<dyn ChartRenderer> {
    match kind {
        PlotKind::Timeline => Box::new(crate::timeline::TimelineRenderer),
        PlotKind::Bar => Box::new(crate::bar::BarRenderer),
    }
}
