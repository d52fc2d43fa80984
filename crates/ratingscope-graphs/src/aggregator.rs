//! Data preparation: filtering, bracketing and aggregation of raw rows.

use crate::dataset::{Dataset, RawRecord};
use crate::selection::MonthSelection;
use ratingscope_common::{Metric, Month, RatingsError, Result};
use ratingscope_config::FilterDefinition;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Name of the prepared-data dump inside the CSV output directory.
pub const WORKING_DATA_FILE: &str = "working-data.csv";

/// Aggregated values of one (month, series) cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateCell {
    /// Sum of reach impressions.
    pub reach_imp: f64,
    /// Sum of GRP impressions.
    pub grp_imp: f64,
    /// Sum of universes; `None` when any contributing row lacks one.
    pub universe: Option<f64>,
    /// Exported reach percentage, kept only for single-row cells.
    pub reach_pct: Option<f64>,
    /// Exported average frequency, kept only for single-row cells.
    pub avg_freq: Option<f64>,
}

impl AggregateCell {
    /// Value of `metric` for this cell.
    ///
    /// Additive metrics are the sums. Ratio metrics use the exported value
    /// when the cell is a single raw row and are recomputed otherwise.
    /// `Ok(None)` means the ratio is undefined (zero denominator).
    pub fn value(&self, metric: Metric) -> Result<Option<f64>> {
        match metric {
            Metric::ReachImp => Ok(Some(self.reach_imp)),
            Metric::GrpImp => Ok(Some(self.grp_imp)),
            Metric::AvgFreq => Ok(self
                .avg_freq
                .or_else(|| ratio(self.grp_imp, self.reach_imp))),
            Metric::ReachPct => {
                if let Some(reach_pct) = self.reach_pct {
                    return Ok(Some(reach_pct));
                }
                let universe = self.universe.ok_or_else(|| {
                    RatingsError::invalid_argument_field(
                        "reach% cannot be derived for merged cells without a universe column",
                        "metric",
                    )
                })?;
                Ok(ratio(self.reach_imp, universe).map(|share| share * 100.0))
            }
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator.abs() > f64::EPSILON).then_some(numerator / denominator)
}

/// One prepared row: a cell of the (month, series) grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    /// Month of the cell.
    pub month: Month,
    /// Series label: group value, bracket label or filter title.
    pub series: String,
    /// Aggregated values.
    pub cell: AggregateCell,
}

/// Raw rows grouped by (month, series), sorted by month then legend order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTable {
    group_column: Option<String>,
    series: Vec<String>,
    rows: Vec<PreparedRow>,
}

impl PreparedTable {
    /// Name of the grouping column, if the filter has one.
    pub fn group_column(&self) -> Option<&str> {
        self.group_column.as_deref()
    }

    /// Series labels present in the table, in legend order.
    pub fn series(&self) -> &[String] {
        &self.series
    }

    /// Rows, month ascending then legend order.
    pub fn rows(&self) -> &[PreparedRow] {
        &self.rows
    }

    /// Distinct months, ascending.
    pub fn months(&self) -> Vec<Month> {
        let mut months: Vec<Month> = self.rows.iter().map(|row| row.month).collect();
        months.dedup();
        months
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `metric` in `row`, with the cell named in errors.
    pub fn value(&self, row: &PreparedRow, metric: Metric) -> Result<Option<f64>> {
        row.cell.value(metric).map_err(|e| match e {
            RatingsError::InvalidArgument { message, field } => RatingsError::InvalidArgument {
                message: format!("{message} ('{}' in {})", row.series, row.month.label()),
                field,
            },
            other => other,
        })
    }

    /// Writes every row with all metrics as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        let series_column = self.group_column.as_deref().unwrap_or("series");
        writer.write_record([
            "month",
            series_column,
            "reach_imp",
            "grp_imp",
            "universe",
            "reach%",
            "avg_freq",
        ])?;

        for row in &self.rows {
            let derived = |metric: Metric| {
                row.cell
                    .value(metric)
                    .ok()
                    .flatten()
                    .map(format_value)
                    .unwrap_or_default()
            };
            writer.write_record([
                row.month.to_string(),
                row.series.clone(),
                format_value(row.cell.reach_imp),
                format_value(row.cell.grp_imp),
                row.cell.universe.map(format_value).unwrap_or_default(),
                derived(Metric::ReachPct),
                derived(Metric::AvgFreq),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the dump to `path`, replacing any previous file.
    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))?;
        debug!(path = %path.display(), rows = self.rows.len(), "Wrote working data");
        Ok(())
    }
}

/// Formats a value for CSV output, rounded to six decimals.
pub fn format_value(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{rounded}")
}

#[derive(Debug, Default)]
struct Accumulator {
    reach_imp: f64,
    grp_imp: f64,
    universe: f64,
    universe_complete: bool,
    contributions: usize,
    included: usize,
    subtracted: bool,
    first_reach_pct: Option<f64>,
    first_avg_freq: Option<f64>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            universe_complete: true,
            ..Self::default()
        }
    }

    fn add(&mut self, record: &RawRecord, sign: f64) {
        if self.contributions == 0 {
            self.first_reach_pct = record.reach_pct;
            self.first_avg_freq = record.avg_freq;
        }
        self.contributions += 1;
        if sign > 0.0 {
            self.included += 1;
        }
        self.subtracted |= sign < 0.0;
        self.reach_imp += sign * record.reach_imp;
        self.grp_imp += sign * record.grp_imp;
        match record.universe {
            Some(universe) => self.universe += sign * universe,
            None => self.universe_complete = false,
        }
    }

    fn finish(&self) -> AggregateCell {
        let single = self.contributions == 1 && !self.subtracted;
        AggregateCell {
            reach_imp: self.reach_imp,
            grp_imp: self.grp_imp,
            universe: self.universe_complete.then_some(self.universe),
            reach_pct: if single { self.first_reach_pct } else { None },
            avg_freq: if single { self.first_avg_freq } else { None },
        }
    }
}

/// Filters, brackets and aggregates raw rows into a [`PreparedTable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Preparer;

impl Preparer {
    /// Creates a preparer.
    pub const fn new() -> Self {
        Self
    }

    /// Prepares the rows of `dataset` selected by `filter` and `selection`.
    #[instrument(skip_all, fields(filter = %filter.name))]
    pub fn prepare(
        &self,
        dataset: &Dataset,
        filter: &FilterDefinition,
        selection: &MonthSelection,
    ) -> Result<PreparedTable> {
        let series_order = filter.series_order();
        let mut cells: BTreeMap<(Month, usize), Accumulator> = BTreeMap::new();
        let mut matched = 0usize;

        for record in dataset.records() {
            if !selection.contains(record.month)
                || !filter.selects(&record.daypart, &record.demographic, &record.characteristic)
            {
                continue;
            }
            matched += 1;
            for (series, sign) in Self::contributions(filter, &series_order, record) {
                cells
                    .entry((record.month, series))
                    .or_insert_with(Accumulator::new)
                    .add(record, sign);
            }
        }

        if cells.is_empty() {
            return Err(RatingsError::not_found(format!(
                "no rows match filter '{}' for {}",
                filter.name,
                selection.describe()
            )));
        }
        for month in selection.points() {
            if !cells.keys().any(|(cell_month, _)| *cell_month == month) {
                return Err(RatingsError::not_found(format!(
                    "no rows match filter '{}' in {}",
                    filter.name,
                    month.label()
                )));
            }
        }

        if let Some(brackets) = &filter.brackets {
            if let Some(((month, series), _)) = cells.iter().find(|(_, cell)| cell.included == 0) {
                return Err(RatingsError::data_format(format!(
                    "bracket '{}' of filter '{}' has no rows for {} in {}",
                    series_order[*series],
                    filter.name,
                    brackets.definitions[*series].include.join(", "),
                    month.label()
                )));
            }
        }

        let mut present = vec![false; series_order.len()];
        let rows: Vec<PreparedRow> = cells
            .into_iter()
            .map(|((month, series), accumulator)| {
                present[series] = true;
                PreparedRow {
                    month,
                    series: series_order[series].clone(),
                    cell: accumulator.finish(),
                }
            })
            .collect();
        let series = series_order
            .into_iter()
            .zip(present)
            .filter_map(|(label, present)| present.then_some(label))
            .collect();

        info!(matched, rows = rows.len(), "Prepared data");
        Ok(PreparedTable {
            group_column: filter.group_column().map(|column| column.name().to_string()),
            series,
            rows,
        })
    }

    /// Series indexes a selected raw row contributes to, with the sign of the
    /// contribution.
    fn contributions(
        filter: &FilterDefinition,
        series_order: &[String],
        record: &RawRecord,
    ) -> Vec<(usize, f64)> {
        if let Some(brackets) = &filter.brackets {
            let raw = record.label(brackets.source);
            return brackets
                .definitions
                .iter()
                .enumerate()
                .filter_map(|(index, definition)| {
                    if definition.include.iter().any(|label| label == raw) {
                        Some((index, 1.0))
                    } else if definition.exclude.iter().any(|label| label == raw) {
                        Some((index, -1.0))
                    } else {
                        None
                    }
                })
                .collect();
        }

        match filter.multi_valued_dimension() {
            Some(dimension) => {
                let value = record.label(dimension);
                series_order
                    .iter()
                    .position(|label| label == value)
                    .map(|index| vec![(index, 1.0)])
                    .unwrap_or_default()
            }
            None => vec![(0, 1.0)],
        }
    }

    /// Fails with Invalid Argument when `metric` cannot be computed for some
    /// cell of `filter` over the whole dataset. Runs before any output is
    /// written.
    pub fn check_metric(
        &self,
        dataset: &Dataset,
        filter: &FilterDefinition,
        metric: Metric,
    ) -> Result<()> {
        if metric == Metric::ReachPct && !dataset.has_reach_pct() && !dataset.has_universe() {
            return Err(RatingsError::invalid_argument_field(
                format!(
                    "reach% needs a reach% or universe column, {} has neither",
                    dataset.source().display()
                ),
                "metric",
            ));
        }
        if metric.is_additive() {
            return Ok(());
        }

        let table = self.prepare(dataset, filter, &MonthSelection::all(dataset.month_range()))?;
        for row in table.rows() {
            table.value(row, metric).map_err(|e| match e {
                RatingsError::InvalidArgument { message, field } => RatingsError::InvalidArgument {
                    message: format!(
                        "unsupported combination of metric {metric} and filter '{}': {message}",
                        filter.name
                    ),
                    field,
                },
                other => other,
            })?;
        }
        Ok(())
    }
}
