//! Artifact naming and output directory layout.
//!
//! Every chart is written twice, as `<output>/html/<stem>.html` and
//! `<output>/csv/<stem>.csv`, where the stem is
//! `<plot>_<filter>_<metric-slug>_<months>`. The months part is
//! `<start>-to-<end>` for timelines and `<month>` or `<compare>-vs-<month>`
//! for bar charts.

use crate::aggregator::WORKING_DATA_FILE;
use crate::selection::MonthSelection;
use ratingscope_common::{is_safe_name, Metric, Month, PlotKind, RatingsError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// The months part of an artifact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthSpan {
    /// Timeline span, inclusive.
    Range {
        /// First month.
        start: Month,
        /// Last month.
        end: Month,
    },
    /// Bar chart of one month.
    Single(Month),
    /// Bar chart of a month against a comparison month.
    Versus {
        /// Comparison month.
        compare: Month,
        /// Month of interest.
        month: Month,
    },
}

impl MonthSpan {
    fn encode(self) -> String {
        match self {
            Self::Range { start, end } => format!("{start}-to-{end}"),
            Self::Single(month) => month.to_string(),
            Self::Versus { compare, month } => format!("{compare}-vs-{month}"),
        }
    }

    fn decode(raw: &str) -> Option<Self> {
        if let Some((start, end)) = raw.split_once("-to-") {
            return Some(Self::Range {
                start: start.parse().ok()?,
                end: end.parse().ok()?,
            });
        }
        if let Some((compare, month)) = raw.split_once("-vs-") {
            return Some(Self::Versus {
                compare: compare.parse().ok()?,
                month: month.parse().ok()?,
            });
        }
        raw.parse().ok().map(Self::Single)
    }

    /// Display form, e.g. `Jan 2023 to Sep 2025` or `Mar 2023 vs Mar 2025`.
    pub fn label(self) -> String {
        match self {
            Self::Range { start, end } => format!("{} to {}", start.label(), end.label()),
            Self::Single(month) => month.label(),
            Self::Versus { compare, month } => {
                format!("{} vs {}", compare.label(), month.label())
            }
        }
    }
}

impl From<&MonthSelection> for MonthSpan {
    fn from(selection: &MonthSelection) -> Self {
        match *selection {
            MonthSelection::Range { start, end } => Self::Range { start, end },
            MonthSelection::Points {
                month,
                compare: Some(compare),
            } => Self::Versus { compare, month },
            MonthSelection::Points {
                month,
                compare: None,
            } => Self::Single(month),
        }
    }
}

/// Name of a chart artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    /// Chart flavour.
    pub plot: PlotKind,
    /// Filter name.
    pub filter: String,
    /// Plotted metric.
    pub metric: Metric,
    /// Months shown.
    pub months: MonthSpan,
}

impl ArtifactName {
    /// Names the chart for `plot` of `metric` under `filter` over `selection`.
    pub fn new(plot: PlotKind, filter: &str, metric: Metric, selection: &MonthSelection) -> Self {
        Self {
            plot,
            filter: filter.to_string(),
            metric,
            months: selection.into(),
        }
    }

    /// File stem, without extension.
    pub fn stem(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.plot.as_str(),
            self.filter,
            self.metric.slug(),
            self.months.encode()
        )
    }

    /// Reverses [`ArtifactName::stem`]. Filter names may themselves contain
    /// underscores; the plot is the first part and the metric and months
    /// are the last two.
    pub fn parse(stem: &str) -> Result<Self> {
        let invalid = || RatingsError::invalid_argument(format!("'{stem}' is not an artifact name"));

        let (plot, rest) = stem.split_once('_').ok_or_else(invalid)?;
        let (rest, months) = rest.rsplit_once('_').ok_or_else(invalid)?;
        let (filter, metric) = rest.rsplit_once('_').ok_or_else(invalid)?;

        let plot = plot.parse::<PlotKind>().map_err(|_| invalid())?;
        let metric = Metric::from_slug(metric).ok_or_else(invalid)?;
        let months = MonthSpan::decode(months).ok_or_else(invalid)?;
        if !is_safe_name(filter) {
            return Err(invalid());
        }

        let consistent = matches!(
            (plot, months),
            (PlotKind::Timeline, MonthSpan::Range { .. })
                | (PlotKind::Bar, MonthSpan::Single(_) | MonthSpan::Versus { .. })
        );
        if !consistent {
            return Err(invalid());
        }

        Ok(Self {
            plot,
            filter: filter.to_string(),
            metric,
            months,
        })
    }

    /// `<stem>.html`
    pub fn html_file(&self) -> String {
        format!("{}.html", self.stem())
    }

    /// `<stem>.csv`
    pub fn csv_file(&self) -> String {
        format!("{}.csv", self.stem())
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}

/// Output directory layout: `html/` and `csv/` under one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    root: PathBuf,
}

impl OutputDirs {
    /// Layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Chart pages directory.
    pub fn html_dir(&self) -> PathBuf {
        self.root.join("html")
    }

    /// CSV extracts directory.
    pub fn csv_dir(&self) -> PathBuf {
        self.root.join("csv")
    }

    /// Creates both directories when missing.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(self.html_dir())?;
        std::fs::create_dir_all(self.csv_dir())?;
        Ok(())
    }

    /// Page path of `name`.
    pub fn html_path(&self, name: &ArtifactName) -> PathBuf {
        self.html_dir().join(name.html_file())
    }

    /// Extract path of `name`.
    pub fn csv_path(&self, name: &ArtifactName) -> PathBuf {
        self.csv_dir().join(name.csv_file())
    }

    /// Path of the prepared-data dump.
    pub fn working_data_path(&self) -> PathBuf {
        self.csv_dir().join(WORKING_DATA_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn month(raw: &str) -> Month {
        raw.parse().unwrap()
    }

    #[test]
    fn test_timeline_stem() {
        let selection = MonthSelection::Range {
            start: month("2023-01"),
            end: month("2025-09"),
        };
        let name = ArtifactName::new(PlotKind::Timeline, "totals", Metric::ReachImp, &selection);
        assert_eq!(name.stem(), "timeline_totals_reach-imp_2023-01-to-2025-09");
        assert_eq!(name.months.label(), "Jan 2023 to Sep 2025");
    }

    #[test]
    fn test_bar_stems() {
        let versus = MonthSelection::Points {
            month: month("2025-03"),
            compare: Some(month("2023-03")),
        };
        let name = ArtifactName::new(PlotKind::Bar, "race", Metric::ReachPct, &versus);
        assert_eq!(name.html_file(), "bar_race_reach-pct_2023-03-vs-2025-03.html");
        assert_eq!(name.months.label(), "Mar 2023 vs Mar 2025");

        let single = MonthSelection::Points {
            month: month("2025-09"),
            compare: None,
        };
        let name = ArtifactName::new(PlotKind::Bar, "income-brackets", Metric::AvgFreq, &single);
        assert_eq!(name.csv_file(), "bar_income-brackets_avg-freq_2025-09.csv");
    }

    #[test]
    fn test_parse_handles_underscored_filters() {
        let name = ArtifactName::parse("bar_my_custom_filter_grp-imp_2024-02").unwrap();
        assert_eq!(name.filter, "my_custom_filter");
        assert_eq!(name.metric, Metric::GrpImp);
        assert_eq!(name.months, MonthSpan::Single(month("2024-02")));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        for stem in [
            "dashboard",
            "timeline_totals_reach-imp_2025-09",
            "bar_totals_ratings_2025-09",
            "pie_totals_reach-imp_2025-09",
            "bar_totals_reach-imp_latest",
        ] {
            assert!(ArtifactName::parse(stem).is_err(), "{stem}");
        }
    }

    #[test]
    fn test_output_dirs() {
        let dirs = OutputDirs::new("output");
        let name = ArtifactName::parse("timeline_totals_reach-imp_2023-01-to-2025-09").unwrap();
        assert_eq!(
            dirs.html_path(&name),
            PathBuf::from("output/html/timeline_totals_reach-imp_2023-01-to-2025-09.html")
        );
        assert_eq!(
            dirs.csv_path(&name),
            PathBuf::from("output/csv/timeline_totals_reach-imp_2023-01-to-2025-09.csv")
        );
        assert_eq!(dirs.working_data_path(), PathBuf::from("output/csv/working-data.csv"));
    }

    fn month_strategy() -> impl Strategy<Value = Month> {
        (2000i32..2100, 1u32..=12).prop_map(|(year, month)| Month::new(year, month).unwrap())
    }

    proptest! {
        #[test]
        fn prop_names_parse_back(
            filter in "[a-z][a-z0-9_-]{0,15}",
            metric in prop::sample::select(Metric::ALL.to_vec()),
            first in month_strategy(),
            second in month_strategy(),
            timeline in any::<bool>(),
            compare in any::<bool>(),
        ) {
            let (start, end) = if first <= second { (first, second) } else { (second, first) };
            let (plot, selection) = if timeline {
                (PlotKind::Timeline, MonthSelection::Range { start, end })
            } else {
                let compare = (compare && start != end).then_some(start);
                (PlotKind::Bar, MonthSelection::Points { month: end, compare })
            };
            let name = ArtifactName::new(plot, &filter, metric, &selection);
            prop_assert_eq!(ArtifactName::parse(&name.stem()).unwrap(), name);
        }
    }
}
