//! Default values for settings.

use crate::schema::{ChartSettings, DashboardSettings, Settings};
use ratingscope_common::LoggingConfig;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default ratings export location.
pub const DEFAULT_DATA_FILE: &str = "data/2023-01_2025-09.csv";

/// Default output root.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default filter directory.
pub const DEFAULT_FILTERS_DIR: &str = "config";

/// Default dashboard page.
pub const DEFAULT_DASHBOARD_PAGE: &str = "index.html";

/// Default `<select>` id on the dashboard page.
pub const DEFAULT_SELECT_ID: &str = "plotSelect";

/// Default series palette.
pub const DEFAULT_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Display names of artifact name parts that title-casing gets wrong.
pub const DEFAULT_LABELS: [(&str, &str); 13] = [
    ("avg-freq", "Average Frequency"),
    ("reach-pct", "Reach Percentage"),
    ("grp-imp", "Group Impressions"),
    ("reach-imp", "Reach Impressions"),
    ("age-brackets", "Age Brackets"),
    ("age-levels", "Age Levels"),
    ("dayparts", "Dayparts"),
    ("income-brackets", "Income Brackets"),
    ("income-levels", "Income Levels"),
    ("race", "Race and Ethnicity"),
    ("totals", "Totals"),
    ("bar", "Bar Chart"),
    ("timeline", "Timeline"),
];

/// The built-in label map.
pub fn default_labels() -> BTreeMap<String, String> {
    DEFAULT_LABELS
        .iter()
        .map(|(part, label)| ((*part).to_string(), (*label).to_string()))
        .collect()
}

/// Deserializes a label map on top of [`default_labels`], so a settings file
/// only lists the labels it changes.
pub fn labels_over_defaults<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut labels = default_labels();
    labels.extend(BTreeMap::<String, String>::deserialize(deserializer)?);
    Ok(labels)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            filters_dir: PathBuf::from(DEFAULT_FILTERS_DIR),
            dashboard_page: PathBuf::from(DEFAULT_DASHBOARD_PAGE),
            logging: LoggingConfig::default(),
            chart: ChartSettings::default(),
            dashboard: DashboardSettings::default(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            font_family: "\"Open Sans\", verdana, arial, sans-serif".to_string(),
            font_color: "rgb(71, 71, 71)".to_string(),
            font_size: 12,
            title_font_size: 20,
            colors: DEFAULT_COLORS.iter().map(ToString::to_string).collect(),
            width: None,
            height: Some(600),
            headroom: 1.12,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            select_id: DEFAULT_SELECT_ID.to_string(),
            labels: default_labels(),
        }
    }
}
