//! Plot building: renders a prepared table and writes the chart page and
//! its CSV extract.

use crate::aggregator::{format_value, PreparedTable};
use crate::artifact::{ArtifactName, OutputDirs};
use crate::selection::MonthSelection;
use crate::style::ChartStyle;
use crate::traits::{renderer_for, ChartData, TraceData};
use ratingscope_common::{Metric, PlotKind, Result};
use ratingscope_config::FilterDefinition;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// What to plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotRequest {
    /// Chart flavour.
    pub plot: PlotKind,
    /// Plotted metric.
    pub metric: Metric,
    /// Months shown.
    pub selection: MonthSelection,
}

/// Files written for one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotOutcome {
    /// Artifact name.
    pub name: ArtifactName,
    /// Chart page.
    pub html_path: PathBuf,
    /// CSV extract.
    pub csv_path: PathBuf,
    /// Number of plotted values.
    pub points: usize,
}

/// Renders charts into an output directory.
#[derive(Debug, Clone)]
pub struct PlotBuilder {
    dirs: OutputDirs,
    style: ChartStyle,
}

impl PlotBuilder {
    /// Builder writing under `dirs` with `style`.
    pub const fn new(dirs: OutputDirs, style: ChartStyle) -> Self {
        Self { dirs, style }
    }

    /// Output layout.
    pub const fn dirs(&self) -> &OutputDirs {
        &self.dirs
    }

    /// Renders `table` for `request` and writes the page and extract.
    /// Existing files of the same name are overwritten.
    #[instrument(skip_all, fields(filter = %filter.name, plot = %request.plot, metric = %request.metric))]
    pub fn build(
        &self,
        request: &PlotRequest,
        table: &PreparedTable,
        filter: &FilterDefinition,
    ) -> Result<PlotOutcome> {
        let data = ChartData::from_table(table, filter, request.metric, request.selection)?;
        let renderer = renderer_for(request.plot);
        let traces = renderer.traces(&data);
        let plot = renderer.render(&data, &self.style)?;

        self.dirs.ensure()?;
        let name = ArtifactName::new(request.plot, &filter.name, request.metric, &request.selection);
        let html_path = self.dirs.html_path(&name);
        let csv_path = self.dirs.csv_path(&name);

        std::fs::write(&html_path, plot.to_html())?;
        let points = write_extract(&csv_path, data.group_column.as_deref(), request.metric, &traces)?;

        info!(
            artifact = %name,
            points,
            html = %html_path.display(),
            "Chart written"
        );
        Ok(PlotOutcome {
            name,
            html_path,
            csv_path,
            points,
        })
    }

    /// Dumps `table` to the working data file and returns its path.
    pub fn write_working_data(&self, table: &PreparedTable) -> Result<PathBuf> {
        self.dirs.ensure()?;
        let path = self.dirs.working_data_path();
        table.write_csv_file(&path)?;
        Ok(path)
    }
}

/// Writes the plotted values in drawing order.
fn write_extract(
    path: &Path,
    group_column: Option<&str>,
    metric: Metric,
    traces: &[TraceData],
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["month"];
    header.extend(group_column);
    header.push(metric.as_str());
    writer.write_record(&header)?;

    let mut written = 0;
    for point in traces.iter().flat_map(|trace| &trace.points) {
        let month = point.month.to_string();
        let value = format_value(point.value);
        let mut record = vec![month.as_str()];
        if group_column.is_some() {
            record.push(point.series.as_str());
        }
        record.push(value.as_str());
        writer.write_record(&record)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
