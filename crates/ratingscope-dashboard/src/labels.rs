//! Human labels for dashboard options.

use ratingscope_common::clean_label;
use ratingscope_config::defaults::default_labels;
use ratingscope_graphs::ArtifactName;
use std::collections::BTreeMap;

const SEPARATOR: &str = " | ";

/// Maps artifact name parts to display labels.
///
/// Keys are the raw parts as they appear in file names: plot kinds
/// (`bar`), filter names (`race`) and metric slugs (`reach-pct`). Parts
/// without an entry are title-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: BTreeMap<String, String>,
}

impl LabelMap {
    /// Label map with exactly `labels`.
    pub const fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    /// Label of one name part.
    pub fn part(&self, key: &str) -> String {
        self.labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| clean_label(key))
    }

    /// Option label for the chart file stem `stem`, e.g.
    /// `Bar Chart | Race and Ethnicity | Reach Percentage | Mar 2023 vs Mar 2025`.
    pub fn option_label(&self, stem: &str) -> String {
        match ArtifactName::parse(stem) {
            Ok(name) => [
                self.part(name.plot.as_str()),
                self.part(&name.filter),
                self.part(name.metric.slug()),
                name.months.label(),
            ]
            .join(SEPARATOR),
            Err(_) => stem
                .split('_')
                .filter(|part| !part.is_empty())
                .map(|part| self.part(part))
                .collect::<Vec<_>>()
                .join(SEPARATOR),
        }
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new(default_labels())
    }
}

impl From<BTreeMap<String, String>> for LabelMap {
    fn from(labels: BTreeMap<String, String>) -> Self {
        Self::new(labels)
    }
}
