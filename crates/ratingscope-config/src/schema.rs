//! Filter definitions and application settings structures

use ratingscope_common::{Dimension, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use validator::Validate;

/// One label or an ordered list of labels of a demographic column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    /// A single label; the column is fixed.
    One(String),
    /// An ordered list of labels; order is the legend order.
    Many(Vec<String>),
}

impl Selector {
    /// Selected labels in declaration order.
    pub fn labels(&self) -> &[String] {
        match self {
            Self::One(label) => std::slice::from_ref(label),
            Self::Many(labels) => labels,
        }
    }

    /// Whether `value` is selected.
    pub fn matches(&self, value: &str) -> bool {
        self.labels().iter().any(|label| label == value)
    }

    /// Whether more than one label is selected.
    pub fn is_multi_valued(&self) -> bool {
        self.labels().len() > 1
    }
}

/// One output bracket: the sum of `include` rows minus the sum of `exclude` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BracketDefinition {
    /// Legend label of the bracket, e.g. `$25K-$50K`.
    pub label: String,
    /// Raw labels added into the bracket.
    #[serde(default)]
    pub include: Vec<String>,
    /// Raw labels subtracted from the bracket.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Merges the raw labels of one column into non-overlapping brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BracketSpec {
    /// Raw column the brackets are built from.
    pub source: Dimension,
    /// Name of the resulting column, e.g. `income_bracket`.
    pub column: String,
    /// Brackets in legend order.
    pub definitions: Vec<BracketDefinition>,
    /// Raw labels intentionally left out of every bracket.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop: Vec<String>,
}

impl BracketSpec {
    /// Bracket labels in legend order.
    pub fn labels(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.label.clone()).collect()
    }
}

/// Column the prepared data is grouped by, besides the month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupColumn {
    /// A raw column with a multi-valued selector.
    Dimension(Dimension),
    /// A bracket column produced by [`BracketSpec`].
    Bracket(String),
}

impl GroupColumn {
    /// Column name used in CSV extracts.
    pub fn name(&self) -> &str {
        match self {
            Self::Dimension(dimension) => dimension.column(),
            Self::Bracket(column) => column,
        }
    }
}

/// A named row filter over the ratings export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterDefinition {
    /// File stem the filter was loaded from.
    #[serde(skip)]
    pub name: String,
    /// Display title, e.g. `Income Brackets`.
    pub title: String,
    /// Daypart selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daypart: Option<Selector>,
    /// Age level selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographic: Option<Selector>,
    /// Income or race selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<Selector>,
    /// Optional bracket merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brackets: Option<BracketSpec>,
}

impl FilterDefinition {
    /// Selector for `dimension`, if any.
    pub const fn selector(&self, dimension: Dimension) -> Option<&Selector> {
        match dimension {
            Dimension::Daypart => self.daypart.as_ref(),
            Dimension::Demographic => self.demographic.as_ref(),
            Dimension::Characteristic => self.characteristic.as_ref(),
        }
    }

    /// Whether a raw row with these labels passes every selector.
    pub fn selects(&self, daypart: &str, demographic: &str, characteristic: &str) -> bool {
        [
            (Dimension::Daypart, daypart),
            (Dimension::Demographic, demographic),
            (Dimension::Characteristic, characteristic),
        ]
        .into_iter()
        .all(|(dimension, value)| {
            self.selector(dimension)
                .map_or(true, |selector| selector.matches(value))
        })
    }

    /// First raw column with a multi-valued selector.
    pub fn multi_valued_dimension(&self) -> Option<Dimension> {
        Dimension::ALL.into_iter().find(|dimension| {
            self.selector(*dimension)
                .is_some_and(Selector::is_multi_valued)
        })
    }

    /// The bracket column, else the first multi-valued selector, else none.
    pub fn group_column(&self) -> Option<GroupColumn> {
        if let Some(brackets) = &self.brackets {
            return Some(GroupColumn::Bracket(brackets.column.clone()));
        }
        self.multi_valued_dimension().map(GroupColumn::Dimension)
    }

    /// Series labels in legend order. Ungrouped filters have one series
    /// named after the title.
    pub fn series_order(&self) -> Vec<String> {
        if let Some(brackets) = &self.brackets {
            return brackets.labels();
        }
        self.multi_valued_dimension()
            .and_then(|dimension| self.selector(dimension))
            .map_or_else(|| vec![self.title.clone()], |s| s.labels().to_vec())
    }

    /// Whether brackets are defined.
    pub const fn is_bracketed(&self) -> bool {
        self.brackets.is_some()
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// Ratings export to read
    #[validate(custom(function = "crate::validation::validate_path", message = "Data file path is invalid"))]
    pub data_file: PathBuf,

    /// Output root; `html/` and `csv/` are created inside
    #[validate(custom(function = "crate::validation::validate_path", message = "Output directory path is invalid"))]
    pub output_dir: PathBuf,

    /// Directory holding `<filter>.json` files
    #[validate(custom(function = "crate::validation::validate_path", message = "Filters directory path is invalid"))]
    pub filters_dir: PathBuf,

    /// Dashboard page with the plot selector
    #[validate(custom(function = "crate::validation::validate_path", message = "Dashboard page path is invalid"))]
    pub dashboard_page: PathBuf,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Chart styling
    pub chart: ChartSettings,

    /// Dashboard labelling
    pub dashboard: DashboardSettings,
}

impl Settings {
    /// Directory receiving chart pages.
    pub fn html_dir(&self) -> PathBuf {
        self.output_dir.join("html")
    }

    /// Directory receiving CSV extracts.
    pub fn csv_dir(&self) -> PathBuf {
        self.output_dir.join("csv")
    }

    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        self.chart.validate()?;
        self.dashboard.validate()?;
        Ok(())
    }
}

/// Chart styling shared by every renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartSettings {
    /// Font family for every text element
    #[validate(length(min = 1, message = "Font family cannot be empty"))]
    pub font_family: String,

    /// Text color (any CSS color)
    #[validate(length(min = 1, message = "Font color cannot be empty"))]
    pub font_color: String,

    /// Base font size
    #[validate(range(min = 8, max = 72, message = "Font size must be between 8 and 72"))]
    pub font_size: usize,

    /// Title font size
    #[validate(range(min = 8, max = 72, message = "Title font size must be between 8 and 72"))]
    pub title_font_size: usize,

    /// Series palette (hex), cycled when there are more series than colors
    #[validate(length(min = 1, message = "Palette needs at least one color"))]
    #[validate(custom(function = "crate::validation::validate_palette", message = "Palette colors must be hex colors like #1f77b4"))]
    pub colors: Vec<String>,

    /// Fixed width in pixels; responsive when unset
    #[validate(range(min = 100, max = 4000, message = "Width must be between 100 and 4000 pixels"))]
    pub width: Option<usize>,

    /// Fixed height in pixels; responsive when unset
    #[validate(range(min = 100, max = 4000, message = "Height must be between 100 and 4000 pixels"))]
    pub height: Option<usize>,

    /// Upper bound of the y axis as a multiple of the largest value
    #[validate(range(min = 1.0, max = 3.0, message = "Headroom must be between 1.0 and 3.0"))]
    pub headroom: f64,
}

/// Dashboard selector labelling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DashboardSettings {
    /// `id` of the `<select>` element holding the chart list
    #[validate(length(min = 1, message = "Selector id cannot be empty"))]
    pub select_id: String,

    /// Display names for artifact name parts, e.g. `race` -> `Race and Ethnicity`
    #[serde(deserialize_with = "crate::defaults::labels_over_defaults")]
    pub labels: BTreeMap<String, String>,
}
