//! Common type definitions shared by every stage of the pipeline.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{RatingsError, Result};

/// A calendar month, the period granularity of the ratings export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Creates a month, rejecting month numbers outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(RatingsError::invalid_argument(format!(
                "month number {month} is outside 1..=12"
            )));
        }
        Ok(Self { year, month })
    }

    /// Calendar year.
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, 1-12.
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(self) -> NaiveDate {
        // year/month are validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Human label used in chart legends and titles, e.g. `Mar 2025`.
    pub fn label(self) -> String {
        self.first_day().format("%b %Y").to_string()
    }

    /// Parses a period cell from the ratings export.
    ///
    /// Accepts `Jan 2023`, `January 2023` and `2023-01`. Returns `None` for
    /// anything else, including blank cells.
    pub fn parse_period(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(month) = raw.parse::<Self>() {
            return Some(month);
        }
        NaiveDate::parse_from_str(&format!("1 {raw}"), "%d %B %Y")
            .ok()
            .map(Self::from)
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Strict `YYYY-MM` parsing, the format used on the command line.
impl FromStr for Month {
    type Err = RatingsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            RatingsError::invalid_argument(format!("invalid month '{s}', expected YYYY-MM"))
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

/// First and last month present in a dataset, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    /// Earliest month.
    pub first: Month,
    /// Latest month.
    pub last: Month,
}

impl MonthRange {
    /// Whether `month` lies inside the range.
    pub fn contains(&self, month: Month) -> bool {
        self.first <= month && month <= self.last
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.first, self.last)
    }
}

/// Metrics that can be plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Reach impressions, additive.
    ReachImp,
    /// Gross rating point impressions, additive.
    GrpImp,
    /// Reach as a percentage of the universe.
    ReachPct,
    /// Average frequency, `grp_imp / reach_imp`.
    AvgFreq,
}

impl Metric {
    /// Every supported metric, in the order `--run-all` walks them.
    pub const ALL: [Self; 4] = [Self::AvgFreq, Self::ReachPct, Self::GrpImp, Self::ReachImp];

    /// Canonical column name in the prepared data.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReachImp => "reach_imp",
            Self::GrpImp => "grp_imp",
            Self::ReachPct => "reach%",
            Self::AvgFreq => "avg_freq",
        }
    }

    /// Filename-safe slug used in artifact names.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::ReachImp => "reach-imp",
            Self::GrpImp => "grp-imp",
            Self::ReachPct => "reach-pct",
            Self::AvgFreq => "avg-freq",
        }
    }

    /// Reverses [`Metric::slug`].
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|metric| metric.slug() == slug)
    }

    /// Axis and title label.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ReachImp => "Reach Impressions",
            Self::GrpImp => "GRP Impressions",
            Self::ReachPct => "Reach %",
            Self::AvgFreq => "Average Frequency",
        }
    }

    /// Whether values of this metric can be summed and subtracted across
    /// demographic cells. Ratio metrics must be recomputed instead.
    pub const fn is_additive(self) -> bool {
        matches!(self, Self::ReachImp | Self::GrpImp)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = RatingsError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "reach_imp" => Ok(Self::ReachImp),
            "grp_imp" => Ok(Self::GrpImp),
            "reach%" | "reach_pct" => Ok(Self::ReachPct),
            "avg_freq" => Ok(Self::AvgFreq),
            _ => Err(RatingsError::invalid_argument_field(
                format!(
                    "unsupported metric '{s}', expected one of: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                ),
                "metric",
            )),
        }
    }
}

/// Chart flavours the plot builder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind {
    /// Line chart over the full selected month range.
    Timeline,
    /// Grouped bars for one month, optionally against a comparison month.
    Bar,
}

impl PlotKind {
    /// Every plot kind.
    pub const ALL: [Self; 2] = [Self::Bar, Self::Timeline];

    /// Name used on the command line and in artifact names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeline => "timeline",
            Self::Bar => "bar",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotKind {
    type Err = RatingsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timeline" => Ok(Self::Timeline),
            "bar" => Ok(Self::Bar),
            _ => Err(RatingsError::invalid_argument_field(
                format!("unsupported plot type '{s}', expected timeline or bar"),
                "plot",
            )),
        }
    }
}

/// Demographic columns of the raw export that filters select on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Segment of the broadcast day.
    Daypart,
    /// Age level such as `P18+`.
    Demographic,
    /// Income or race level.
    Characteristic,
}

impl Dimension {
    /// Selection order used to pick a grouping column.
    pub const ALL: [Self; 3] = [Self::Daypart, Self::Demographic, Self::Characteristic];

    /// Normalized column name.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Daypart => "daypart",
            Self::Demographic => "demographic",
            Self::Characteristic => "characteristic",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_parsing() {
        let month: Month = "2025-03".parse().unwrap();
        assert_eq!((month.year(), month.month()), (2025, 3));
        assert_eq!(month.to_string(), "2025-03");
        assert_eq!(month.label(), "Mar 2025");

        assert!("2025-13".parse::<Month>().is_err());
        assert!("2025-3".parse::<Month>().is_err());
        assert!("March".parse::<Month>().is_err());
    }

    #[test]
    fn test_parse_period_formats() {
        let expected = Month::new(2023, 1).unwrap();
        assert_eq!(Month::parse_period("Jan 2023"), Some(expected));
        assert_eq!(Month::parse_period(" January 2023 "), Some(expected));
        assert_eq!(Month::parse_period("2023-01"), Some(expected));
        assert_eq!(Month::parse_period(""), None);
        assert_eq!(Month::parse_period("Source: export"), None);
    }

    #[test]
    fn test_month_ordering_and_range() {
        let range = MonthRange {
            first: Month::new(2023, 1).unwrap(),
            last: Month::new(2025, 9).unwrap(),
        };
        assert!(range.contains(Month::new(2024, 12).unwrap()));
        assert!(!range.contains(Month::new(2022, 12).unwrap()));
        assert!(!range.contains(Month::new(2030, 1).unwrap()));
        assert_eq!(range.to_string(), "2023-01 to 2025-09");
    }

    #[test]
    fn test_metric_names() {
        assert_eq!("reach%".parse::<Metric>().unwrap(), Metric::ReachPct);
        assert_eq!("reach_pct".parse::<Metric>().unwrap(), Metric::ReachPct);
        assert_eq!("GRP-IMP".parse::<Metric>().unwrap(), Metric::GrpImp);
        assert_eq!(Metric::from_slug("avg-freq"), Some(Metric::AvgFreq));

        let error = "ratings".parse::<Metric>().unwrap_err();
        assert!(matches!(error, RatingsError::InvalidArgument { .. }));
        assert!(error.to_string().contains("reach_imp"));
    }

    #[test]
    fn test_metric_additivity() {
        assert!(Metric::ReachImp.is_additive());
        assert!(Metric::GrpImp.is_additive());
        assert!(!Metric::ReachPct.is_additive());
        assert!(!Metric::AvgFreq.is_additive());
    }

    #[test]
    fn test_plot_kind() {
        assert_eq!("bar".parse::<PlotKind>().unwrap(), PlotKind::Bar);
        assert_eq!(PlotKind::Timeline.to_string(), "timeline");
        assert!("pie".parse::<PlotKind>().is_err());
    }

    #[test]
    fn test_dimension_serde() {
        let dimension: Dimension = serde_json::from_str("\"characteristic\"").unwrap();
        assert_eq!(dimension, Dimension::Characteristic);
        assert_eq!(dimension.column(), "characteristic");
    }
}
