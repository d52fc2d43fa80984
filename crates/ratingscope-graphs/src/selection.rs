//! Month selection for timeline and bar plots.

use crate::dataset::Dataset;
use ratingscope_common::{ensure, Month, MonthRange, PlotKind, RatingsError, Result};

/// Months a plot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthSelection {
    /// Every month from `start` to `end`, inclusive. Used by timelines.
    Range {
        /// First month shown.
        start: Month,
        /// Last month shown.
        end: Month,
    },
    /// One month, optionally against a comparison month. Used by bar charts.
    Points {
        /// Month of interest.
        month: Month,
        /// Month it is compared with.
        compare: Option<Month>,
    },
}

impl MonthSelection {
    /// Resolves the command line months against the months of `dataset`.
    ///
    /// A timeline runs from `compare` (or the first month) to `month` (or the
    /// last month). A bar chart shows `month` (or the last month) and
    /// `compare` when given. Every month passed explicitly must have rows in
    /// the dataset; a gap inside the data's range is not found as well.
    pub fn resolve(
        dataset: &Dataset,
        plot: PlotKind,
        month: Option<Month>,
        compare: Option<Month>,
    ) -> Result<Self> {
        let range = dataset.month_range();
        for requested in month.iter().chain(compare.iter()) {
            if !dataset.has_month(*requested) {
                return Err(RatingsError::not_found(format!(
                    "month {requested} not found; data covers {range}"
                )));
            }
        }

        match plot {
            PlotKind::Timeline => {
                let start = compare.unwrap_or(range.first);
                let end = month.unwrap_or(range.last);
                ensure!(
                    start <= end,
                    invalid_argument,
                    "timeline start {} is after its end {}",
                    start,
                    end
                );
                Ok(Self::Range { start, end })
            }
            PlotKind::Bar => {
                let month = month.unwrap_or(range.last);
                let compare = compare.filter(|compare| *compare != month);
                Ok(Self::Points { month, compare })
            }
        }
    }

    /// Every month of the dataset as a range.
    pub const fn all(range: MonthRange) -> Self {
        Self::Range {
            start: range.first,
            end: range.last,
        }
    }

    /// Whether `month` is part of the selection.
    pub fn contains(&self, month: Month) -> bool {
        match self {
            Self::Range { start, end } => *start <= month && month <= *end,
            Self::Points { month: point, compare } => {
                *point == month || *compare == Some(month)
            }
        }
    }

    /// Explicit months of a bar selection, ascending. Empty for ranges.
    pub fn points(&self) -> Vec<Month> {
        match self {
            Self::Range { .. } => Vec::new(),
            Self::Points { month, compare } => {
                let mut points: Vec<Month> = compare.iter().copied().chain([*month]).collect();
                points.sort();
                points.dedup();
                points
            }
        }
    }

    /// Human description, e.g. `Jan 2023 to Sep 2025` or `Mar 2023 vs. Mar 2025`.
    pub fn describe(&self) -> String {
        match self {
            Self::Range { start, end } => format!("{} to {}", start.label(), end.label()),
            Self::Points {
                month,
                compare: Some(compare),
            } => format!("{} vs. {}", compare.label(), month.label()),
            Self::Points {
                month,
                compare: None,
            } => month.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratingscope_common::test_utils::ratings_fixtures;

    fn month(raw: &str) -> Month {
        raw.parse().unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_reader(ratings_fixtures::sample_csv().as_bytes(), "sample.csv").unwrap()
    }

    fn range() -> MonthRange {
        MonthRange {
            first: month("2023-01"),
            last: month("2025-09"),
        }
    }

    #[test]
    fn test_timeline_defaults_to_full_range() {
        let selection = MonthSelection::resolve(&dataset(), PlotKind::Timeline, None, None).unwrap();
        assert_eq!(selection, MonthSelection::all(range()));
        assert_eq!(selection.describe(), "Jan 2023 to Sep 2025");
    }

    #[test]
    fn test_timeline_uses_compare_as_start() {
        let selection = MonthSelection::resolve(
            &dataset(),
            PlotKind::Timeline,
            Some(month("2024-12")),
            Some(month("2024-01")),
        )
        .unwrap();
        assert_eq!(
            selection,
            MonthSelection::Range {
                start: month("2024-01"),
                end: month("2024-12")
            }
        );
        assert!(selection.contains(month("2024-06")));
        assert!(!selection.contains(month("2025-01")));
    }

    #[test]
    fn test_inverted_timeline_rejected() {
        let error = MonthSelection::resolve(
            &dataset(),
            PlotKind::Timeline,
            Some(month("2023-06")),
            Some(month("2024-06")),
        )
        .unwrap_err();
        assert!(matches!(error, RatingsError::InvalidArgument { .. }));
    }

    #[test]
    fn test_bar_points() {
        let selection = MonthSelection::resolve(
            &dataset(),
            PlotKind::Bar,
            Some(month("2025-03")),
            Some(month("2023-03")),
        )
        .unwrap();
        assert_eq!(selection.points(), vec![month("2023-03"), month("2025-03")]);
        assert_eq!(selection.describe(), "Mar 2023 vs. Mar 2025");

        let latest = MonthSelection::resolve(&dataset(), PlotKind::Bar, None, None).unwrap();
        assert_eq!(latest.points(), vec![month("2025-09")]);
    }

    #[test]
    fn test_bar_compare_equal_to_month_collapses() {
        let selection = MonthSelection::resolve(
            &dataset(),
            PlotKind::Bar,
            Some(month("2025-03")),
            Some(month("2025-03")),
        )
        .unwrap();
        assert_eq!(
            selection,
            MonthSelection::Points {
                month: month("2025-03"),
                compare: None
            }
        );
    }

    #[test]
    fn test_month_outside_data_names_range() {
        let error = MonthSelection::resolve(&dataset(), PlotKind::Bar, Some(month("2030-01")), None)
            .unwrap_err();
        assert!(matches!(error, RatingsError::NotFound { .. }));
        assert_eq!(
            error.to_string(),
            "Not found: month 2030-01 not found; data covers 2023-01 to 2025-09"
        );
    }

    #[test]
    fn test_compare_before_data_fails() {
        let error = MonthSelection::resolve(
            &dataset(),
            PlotKind::Timeline,
            None,
            Some(month("2022-12")),
        )
        .unwrap_err();
        assert!(error.to_string().contains("month 2022-12 not found"));
    }

    #[test]
    fn test_gap_month_inside_range_not_found() {
        let csv = "month,daypart,demographic,characteristic,reach_imp,grp_imp\n\
                   2023-01,Prime,P2+,Total,100,300\n\
                   2023-03,Prime,P2+,Total,120,340\n";
        let gapped = Dataset::from_reader(csv.as_bytes(), "gapped.csv").unwrap();

        for plot in PlotKind::ALL {
            let error =
                MonthSelection::resolve(&gapped, plot, Some(month("2023-02")), None).unwrap_err();
            assert_eq!(
                error.to_string(),
                "Not found: month 2023-02 not found; data covers 2023-01 to 2023-03"
            );
        }
        let error =
            MonthSelection::resolve(&gapped, PlotKind::Bar, None, Some(month("2023-02"))).unwrap_err();
        assert!(matches!(error, RatingsError::NotFound { .. }));
    }
}
