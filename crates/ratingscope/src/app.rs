//! Run orchestration: one plot, or every plot followed by a dashboard
//! refresh.

use crate::cli::PlotArgs;
use crate::error::{AppError, AppResult};
use ratingscope_common::{Metric, Month, PlotKind, Result};
use ratingscope_config::{FilterDefinition, FilterLoader, Settings};
use ratingscope_dashboard::{open_in_browser, DashboardUpdater, UpdateSummary};
use ratingscope_graphs::{
    ChartStyle, Dataset, MonthSelection, OutputDirs, PlotBuilder, PlotOutcome, PlotRequest,
    Preparer,
};
use tracing::{error, info, instrument, warn};

/// Outcome of a `--run-all` batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Plots written.
    pub built: usize,
    /// Combinations the data cannot support.
    pub skipped: usize,
    /// Plots that failed.
    pub failed: usize,
    /// Dashboard refresh result.
    pub dashboard: UpdateSummary,
}

/// The application, configured from settings.
#[derive(Debug, Clone)]
pub struct App {
    settings: Settings,
    filters: FilterLoader,
    preparer: Preparer,
    builder: PlotBuilder,
}

impl App {
    /// Application over `settings`.
    pub fn new(settings: Settings) -> Self {
        let filters = FilterLoader::new(&settings.filters_dir);
        let builder = PlotBuilder::new(
            OutputDirs::new(&settings.output_dir),
            ChartStyle::from(&settings.chart),
        );
        Self {
            settings,
            filters,
            preparer: Preparer::new(),
            builder,
        }
    }

    /// Effective settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Plots one filter, metric and plot type.
    #[instrument(skip_all, fields(filter = %args.filter, metric = %args.metric, plot = %args.plot))]
    pub fn run(&self, args: &PlotArgs) -> Result<PlotOutcome> {
        let filter = self.filters.load(&args.filter)?;
        let dataset = Dataset::load(&self.settings.data_file)?;
        let selection = MonthSelection::resolve(&dataset, args.plot, args.month, args.compare)?;
        self.preparer.check_metric(&dataset, &filter, args.metric)?;
        self.plot(&dataset, &filter, args.plot, args.metric, selection)
    }

    /// Plots every filter, metric and plot type, then refreshes the
    /// dashboard. Unsupported combinations are skipped and failing plots
    /// logged; the batch fails at the end when any plot failed.
    #[instrument(skip_all)]
    pub fn run_all(&self, month: Option<Month>, compare: Option<Month>) -> AppResult<BatchSummary> {
        let dataset = Dataset::load(&self.settings.data_file)?;
        let selections = PlotKind::ALL
            .into_iter()
            .map(|plot| Ok((plot, MonthSelection::resolve(&dataset, plot, month, compare)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut summary = BatchSummary::default();
        for name in self.filters.available()? {
            let filter = match self.filters.load(&name) {
                Ok(filter) => filter,
                Err(e) => {
                    error!(filter = %name, kind = e.kind(), error = %e, "Skipping filter");
                    summary.failed += 1;
                    continue;
                }
            };

            for metric in Metric::ALL {
                if let Err(e) = self.preparer.check_metric(&dataset, &filter, metric) {
                    warn!(filter = %name, %metric, reason = %e, "Skipping unsupported combination");
                    summary.skipped += selections.len();
                    continue;
                }
                for (plot, selection) in &selections {
                    match self.plot(&dataset, &filter, *plot, metric, *selection) {
                        Ok(_) => summary.built += 1,
                        Err(e) => {
                            error!(
                                filter = %name,
                                %metric,
                                %plot,
                                kind = e.kind(),
                                error = %e,
                                "Plot failed"
                            );
                            summary.failed += 1;
                        }
                    }
                }
            }
        }

        summary.dashboard = self.refresh_dashboard()?;
        info!(
            built = summary.built,
            skipped = summary.skipped,
            failed = summary.failed,
            "Batch finished"
        );
        if summary.failed > 0 {
            return Err(AppError::Batch {
                failed: summary.failed,
                attempted: summary.built + summary.failed,
            });
        }
        Ok(summary)
    }

    /// Rewrites the dashboard selector from the charts on disk.
    pub fn refresh_dashboard(&self) -> Result<UpdateSummary> {
        DashboardUpdater::from_settings(&self.settings).update()
    }

    /// Opens the dashboard page in the default browser.
    pub fn open_dashboard(&self) -> Result<()> {
        open_in_browser(&self.settings.dashboard_page)
    }

    fn plot(
        &self,
        dataset: &Dataset,
        filter: &FilterDefinition,
        plot: PlotKind,
        metric: Metric,
        selection: MonthSelection,
    ) -> Result<PlotOutcome> {
        let table = self.preparer.prepare(dataset, filter, &selection)?;
        self.builder.write_working_data(&table)?;
        let request = PlotRequest {
            plot,
            metric,
            selection,
        };
        self.builder.build(&request, &table, filter)
    }
}
