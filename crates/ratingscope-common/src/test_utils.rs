//! Test utilities and shared fixtures for the ratingscope workspace.
//!
//! Provides a deterministic ratings export covering January 2023 through
//! September 2025, the shipped filter definitions, and a minimal dashboard
//! page, so every crate tests against the same data.

use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Ratings export fixtures.
pub mod ratings_fixtures {
    use super::*;

    /// Number of months in [`sample_csv`], Jan 2023 through Sep 2025.
    pub const SAMPLE_MONTHS: usize = 33;

    /// Header of the sample export, in the upstream dashboard's spelling.
    pub const HEADER: &str = "Month,Daypart,Demographic,Characteristic,Reach Imp,Reach%,Avg Freq,GRP Imp,Universe";

    /// Daypart labels with their share of the total day, in tenths.
    pub const DAYPARTS: [(&str, u64); 4] =
        [("Total Day", 10), ("Daytime", 3), ("Prime", 4), ("Late Fringe", 2)];

    /// Cumulative age levels with their base weight.
    pub const AGE_LEVELS: [(&str, u64); 5] =
        [("P2+", 100), ("P2-11", 12), ("P18+", 78), ("P35-64", 40), ("P65+", 18)];

    /// Cumulative income levels (P2+, Total Day) with their base weight.
    pub const INCOME_LEVELS: [(&str, u64); 6] = [
        ("Less than $25K", 20),
        ("$25K+", 80),
        ("$50K+", 60),
        ("$75K+", 42),
        ("$100K+", 30),
        ("$200K+", 8),
    ];

    /// Race and ethnicity levels (P2+, Total Day) with their base weight.
    pub const RACE_LEVELS: [(&str, u64); 4] =
        [("White", 60), ("Black", 14), ("Hispanic", 18), ("Asian", 6)];

    /// Reach impressions of a cell: `weight * daypart_share * (1000 + 10 * month_index)`.
    pub const fn reach_imp(weight: u64, daypart_share: u64, month_index: u64) -> u64 {
        weight * daypart_share * (1000 + 10 * month_index)
    }

    /// Universe of a cell: reach is always `40% + 0.4% * month_index` of it.
    pub const fn universe(weight: u64, daypart_share: u64) -> u64 {
        weight * daypart_share * 2500
    }

    fn month_label(index: u64) -> String {
        const NAMES: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let year = 2023 + index / 12;
        format!("{} {year}", NAMES[(index % 12) as usize])
    }

    fn group_thousands(value: u64) -> String {
        let digits = value.to_string();
        let mut out = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    fn push_row(
        out: &mut String,
        index: u64,
        daypart: (&str, u64),
        demographic: &str,
        characteristic: &str,
        weight: u64,
        with_universe: bool,
    ) {
        let reach = reach_imp(weight, daypart.1, index);
        let grp = reach * 3;
        let universe = universe(weight, daypart.1);
        #[allow(clippy::cast_precision_loss)]
        let reach_pct = 100.0 * reach as f64 / universe as f64;
        out.push_str(&format!(
            "{},{},{demographic},{characteristic},\"{}\",{reach_pct:.1}%,3.0,\"{}\"",
            month_label(index),
            daypart.0,
            group_thousands(reach),
            group_thousands(grp),
        ));
        if with_universe {
            out.push_str(&format!(",{universe}"));
        }
        out.push('\n');
    }

    fn build_csv(with_universe: bool) -> String {
        let mut out = String::new();
        if with_universe {
            out.push_str(HEADER);
        } else {
            out.push_str(HEADER.trim_end_matches(",Universe"));
        }
        out.push('\n');

        for index in 0..SAMPLE_MONTHS as u64 {
            for daypart in DAYPARTS {
                for (demographic, weight) in AGE_LEVELS {
                    push_row(&mut out, index, daypart, demographic, "Total", weight, with_universe);
                }
            }
            let total_day = DAYPARTS[0];
            for (characteristic, weight) in INCOME_LEVELS.into_iter().chain(RACE_LEVELS) {
                push_row(&mut out, index, total_day, "P2+", characteristic, weight, with_universe);
            }
        }
        out.push_str("Source: ratings dashboard export,,,,,,,,\n");
        out
    }

    /// Full sample export, including a universe column and a footer line.
    pub fn sample_csv() -> String {
        build_csv(true)
    }

    /// Sample export without the universe column.
    pub fn sample_csv_without_universe() -> String {
        build_csv(false)
    }

    /// Writes [`sample_csv`] into `dir` and returns its path.
    pub fn write_sample_csv(dir: &Path) -> PathBuf {
        let path = dir.join("2023-01_2025-09.csv");
        std::fs::write(&path, sample_csv()).expect("Failed to write sample CSV");
        path
    }
}

/// Filter definition fixtures, identical to the files shipped in `config/`.
pub mod config_fixtures {
    use super::*;

    /// Names of the shipped filters.
    pub const FILTER_NAMES: [&str; 7] = [
        "age-brackets",
        "age-levels",
        "dayparts",
        "income-brackets",
        "income-levels",
        "race",
        "totals",
    ];

    /// JSON body of a shipped filter, or `None` for unknown names.
    pub fn filter_json(name: &str) -> Option<&'static str> {
        let json = match name {
            "totals" => {
                r#"{
  "title": "Totals",
  "daypart": "Total Day",
  "demographic": "P2+",
  "characteristic": "Total"
}"#
            }
            "dayparts" => {
                r#"{
  "title": "Dayparts",
  "daypart": ["Daytime", "Prime", "Late Fringe"],
  "demographic": "P2+",
  "characteristic": "Total"
}"#
            }
            "age-levels" => {
                r#"{
  "title": "Age Levels",
  "daypart": "Total Day",
  "demographic": ["P2+", "P2-11", "P18+", "P35-64", "P65+"],
  "characteristic": "Total"
}"#
            }
            "age-brackets" => {
                r#"{
  "title": "Age Brackets",
  "daypart": "Total Day",
  "demographic": ["P2+", "P2-11", "P18+", "P35-64", "P65+"],
  "characteristic": "Total",
  "brackets": {
    "source": "demographic",
    "column": "age_bracket",
    "definitions": [
      { "label": "Ages 2-11", "include": ["P2-11"] },
      { "label": "Ages 12-17", "include": ["P2+"], "exclude": ["P2-11", "P18+"] },
      { "label": "Ages 18-34", "include": ["P18+"], "exclude": ["P35-64", "P65+"] },
      { "label": "Ages 35-64", "include": ["P35-64"] },
      { "label": "Ages 65+", "include": ["P65+"] }
    ]
  }
}"#
            }
            "income-levels" => {
                r#"{
  "title": "Income Levels",
  "daypart": "Total Day",
  "demographic": "P2+",
  "characteristic": ["Less than $25K", "$25K+", "$50K+", "$75K+", "$100K+", "$200K+"]
}"#
            }
            "income-brackets" => {
                r#"{
  "title": "Income Brackets",
  "daypart": "Total Day",
  "demographic": "P2+",
  "characteristic": ["Less than $25K", "$25K+", "$50K+", "$75K+", "$100K+", "$200K+"],
  "brackets": {
    "source": "characteristic",
    "column": "income_bracket",
    "definitions": [
      { "label": "Less than $25K", "include": ["Less than $25K"] },
      { "label": "$25K-$50K", "include": ["$25K+"], "exclude": ["$50K+"] },
      { "label": "$50K-$75K", "include": ["$50K+"], "exclude": ["$75K+"] },
      { "label": "$75K-$100K", "include": ["$75K+"], "exclude": ["$100K+"] },
      { "label": "$100K-$200K", "include": ["$100K+"], "exclude": ["$200K+"] },
      { "label": "$200K+", "include": ["$200K+"] }
    ]
  }
}"#
            }
            "race" => {
                r#"{
  "title": "Race and Ethnicity",
  "daypart": "Total Day",
  "demographic": "P2+",
  "characteristic": ["White", "Black", "Hispanic", "Asian"]
}"#
            }
            _ => return None,
        };
        Some(json)
    }

    /// Writes every shipped filter into `dir` as `<name>.json`.
    pub fn write_filters(dir: &Path) {
        std::fs::create_dir_all(dir).expect("Failed to create filters directory");
        for name in FILTER_NAMES {
            let json = filter_json(name).expect("fixture exists");
            std::fs::write(dir.join(format!("{name}.json")), json)
                .expect("Failed to write filter fixture");
        }
    }
}

/// Dashboard page fixtures.
pub mod dashboard_fixtures {
    /// Minimal dashboard page with an empty plot selector.
    pub const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Ratings Dashboard</title>
  </head>
  <body>
    <nav>
      <select id="plotSelect">
      </select>
    </nav>
    <iframe id="plotFrame"></iframe>
  </body>
</html>
"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0001, 0.001);
        assert_approx_eq(1.0, 0.9999, 0.001);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq(1.0, 1.1, 0.05);
    }

    #[test]
    fn test_sample_csv_shape() {
        let csv = ratings_fixtures::sample_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], ratings_fixtures::HEADER);
        // header + per month (4 dayparts * 5 ages + 6 incomes + 4 races) + footer
        assert_eq!(lines.len(), 1 + ratings_fixtures::SAMPLE_MONTHS * 30 + 1);
        assert!(lines[1].starts_with("Jan 2023,Total Day,P2+,Total,\"1,000,000\",40.0%"));
        assert!(lines[lines.len() - 2].starts_with("Sep 2025,"));
    }

    #[test]
    fn test_filter_fixtures_are_json() {
        for name in config_fixtures::FILTER_NAMES {
            let json = config_fixtures::filter_json(name).unwrap();
            let value: serde_json::Value = serde_json::from_str(json).unwrap();
            assert!(value.get("title").is_some(), "{name} has no title");
        }
        assert!(config_fixtures::filter_json("nope").is_none());
    }
}
