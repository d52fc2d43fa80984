//! Command line arguments.

use clap::Parser;
use ratingscope_common::{Metric, Month, PlotKind, Result};
use ratingscope_config::{ConfigError, Settings};
use std::path::PathBuf;

/// Plot TV ratings exports as interactive charts.
#[derive(Debug, Clone, Parser)]
#[command(name = "ratingscope", version)]
pub struct Cli {
    /// Metric to plot: reach_imp, grp_imp, reach% or avg_freq
    #[arg(short, long, default_value = "reach_imp")]
    pub metric: String,

    /// Filter name, the file name in the filters directory without `.json`
    #[arg(short, long, default_value = "totals")]
    pub filter: String,

    /// Plot type: timeline or bar
    #[arg(short, long, default_value = "timeline")]
    pub plot: String,

    /// Bar chart month or timeline end, YYYY-MM (default: latest in the data)
    #[arg(long, value_name = "YYYY-MM")]
    pub month: Option<String>,

    /// Bar chart comparison month or timeline start, YYYY-MM
    #[arg(long, value_name = "YYYY-MM")]
    pub compare_month: Option<String>,

    /// Refresh the dashboard page after plotting
    #[arg(short, long)]
    pub dashboard: bool,

    /// Refresh the dashboard page, then open it in the default browser
    #[arg(short, long)]
    pub open: bool,

    /// Plot every filter, metric and plot type, then refresh the dashboard
    #[arg(short = 'a', long)]
    pub run_all: bool,

    /// Input CSV (overrides settings)
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Output root holding `csv/` and `html/` (overrides settings)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Settings file (default: ratingscope.yaml, .yml or .toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `ratingscope_graphs=trace`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

/// Validated plot arguments of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotArgs {
    /// Filter name.
    pub filter: String,
    /// Metric to plot.
    pub metric: Metric,
    /// Plot type.
    pub plot: PlotKind,
    /// Explicit month.
    pub month: Option<Month>,
    /// Explicit comparison month.
    pub compare: Option<Month>,
}

impl Cli {
    /// Parses the metric, plot type and months.
    pub fn plot_args(&self) -> Result<PlotArgs> {
        let (month, compare) = self.months()?;
        Ok(PlotArgs {
            filter: self.filter.clone(),
            metric: self.metric.parse()?,
            plot: self.plot.parse()?,
            month,
            compare,
        })
    }

    /// `--month` and `--compare-month`, parsed.
    pub fn months(&self) -> Result<(Option<Month>, Option<Month>)> {
        Ok((
            self.month.as_deref().map(str::parse::<Month>).transpose()?,
            self.compare_month.as_deref().map(str::parse::<Month>).transpose()?,
        ))
    }

    /// Whether a single run ends with a dashboard refresh.
    pub const fn refreshes_dashboard(&self) -> bool {
        self.dashboard || self.open
    }

    /// Applies the path and log level flags on top of `settings` and
    /// validates the result.
    pub fn apply_overrides(&self, settings: &mut Settings) -> Result<()> {
        if let Some(data) = &self.data {
            settings.data_file.clone_from(data);
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir.clone_from(output_dir);
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
        settings.validate_all().map_err(ConfigError::ValidationError)?;
        Ok(())
    }
}
