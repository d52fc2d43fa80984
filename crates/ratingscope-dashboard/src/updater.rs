//! Dashboard page rewrite.

use crate::labels::LabelMap;
use crate::scanner::{scan_charts, ChartFile};
use ratingscope_common::{escape_html, RatingsError, Result};
use ratingscope_config::defaults::DEFAULT_SELECT_ID;
use ratingscope_config::Settings;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, instrument};

const EMPTY_OPTION: &str = r#"<option value="" disabled selected>No charts to display</option>"#;

static OPTION_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<option\b[^>]*?\bvalue\s*=\s*"([^"]*)""#).expect("Invalid option regex")
});

/// Result of a dashboard refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateSummary {
    /// Options now listed.
    pub entries: usize,
    /// Options added for new chart files.
    pub added: usize,
    /// Options dropped because their file is gone.
    pub removed: usize,
    /// Whether the page was rewritten.
    pub changed: bool,
}

/// Rewrites the chart selector of the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardUpdater {
    page: PathBuf,
    html_dir: PathBuf,
    select_id: String,
    labels: LabelMap,
}

impl DashboardUpdater {
    /// Updater for `page`, listing the charts in `html_dir`.
    pub fn new(page: impl Into<PathBuf>, html_dir: impl Into<PathBuf>, labels: LabelMap) -> Self {
        Self {
            page: page.into(),
            html_dir: html_dir.into(),
            select_id: DEFAULT_SELECT_ID.to_string(),
            labels,
        }
    }

    /// Updater configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.dashboard_page,
            settings.html_dir(),
            LabelMap::new(settings.dashboard.labels.clone()),
        )
        .with_select_id(&settings.dashboard.select_id)
    }

    /// Targets the `<select>` with id `select_id` instead of `plotSelect`.
    #[must_use]
    pub fn with_select_id(mut self, select_id: &str) -> Self {
        self.select_id = select_id.to_string();
        self
    }

    /// Dashboard page path.
    pub fn page(&self) -> &Path {
        &self.page
    }

    /// Rescans the chart directory and rewrites the selector. The page is
    /// left untouched when nothing changed.
    #[instrument(skip_all, fields(page = %self.page.display()))]
    pub fn update(&self) -> Result<UpdateSummary> {
        if !self.page.is_file() {
            return Err(RatingsError::config(format!(
                "dashboard page {} does not exist",
                self.page.display()
            )));
        }
        let content = std::fs::read_to_string(&self.page)?;
        let page_dir = self.page.parent().unwrap_or_else(|| Path::new(""));
        let charts = scan_charts(&self.html_dir, page_dir)?;

        let (rendered, mut summary) = self.render(&content, &charts)?;
        if rendered == content {
            debug!(entries = summary.entries, "Dashboard already up to date");
            return Ok(summary);
        }

        std::fs::write(&self.page, rendered)?;
        summary.changed = true;
        info!(
            entries = summary.entries,
            added = summary.added,
            removed = summary.removed,
            "Dashboard updated"
        );
        Ok(summary)
    }

    /// Renders `content` with its selector listing `charts`.
    pub fn render(&self, content: &str, charts: &[ChartFile]) -> Result<(String, UpdateSummary)> {
        let select = Regex::new(&format!(
            r#"(?s)([ \t]*)(<select\b[^>]*\bid\s*=\s*"{}"[^>]*>)(.*?)</select>"#,
            regex::escape(&self.select_id)
        ))
        .map_err(|e| RatingsError::config_with_source("invalid dashboard select id", e))?;

        let captures = select.captures(content).ok_or_else(|| {
            RatingsError::config(format!(
                "dashboard page {} has no <select id=\"{}\"> element",
                self.page.display(),
                self.select_id
            ))
        })?;
        let (Some(whole), Some(indent), Some(open), Some(body)) =
            (captures.get(0), captures.get(1), captures.get(2), captures.get(3))
        else {
            return Err(RatingsError::config("dashboard selector could not be parsed"));
        };

        let existing = existing_values(body.as_str());
        let (ordered, summary) = order_charts(&existing, charts);
        let selected = newest(charts);

        let indent = indent.as_str();
        let mut replacement = format!("{indent}{}\n", open.as_str());
        if ordered.is_empty() {
            replacement.push_str(&format!("{indent}  {EMPTY_OPTION}\n"));
        }
        for chart in &ordered {
            let selected = if Some(chart.href.as_str()) == selected {
                " selected"
            } else {
                ""
            };
            replacement.push_str(&format!(
                "{indent}  <option value=\"{}\"{selected}>{}</option>\n",
                escape_html(&chart.href),
                escape_html(&self.labels.option_label(chart.stem())),
            ));
        }
        replacement.push_str(&format!("{indent}</select>"));

        let mut rendered = String::with_capacity(content.len() + replacement.len());
        rendered.push_str(&content[..whole.start()]);
        rendered.push_str(&replacement);
        rendered.push_str(&content[whole.end()..]);
        Ok((rendered, summary))
    }
}

/// Option values already on the page, in page order, without duplicates.
fn existing_values(body: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    OPTION_VALUE_REGEX
        .captures_iter(body)
        .filter_map(|captures| captures.get(1))
        .map(|value| unescape_html(value.as_str()))
        .filter(|value| !value.is_empty() && seen.insert(value.clone()))
        .collect()
}

/// Existing entries that still exist keep their order; new charts follow
/// in name order.
fn order_charts<'a>(existing: &[String], charts: &'a [ChartFile]) -> (Vec<&'a ChartFile>, UpdateSummary) {
    let by_href: HashMap<&str, &ChartFile> =
        charts.iter().map(|chart| (chart.href.as_str(), chart)).collect();

    let mut ordered: Vec<&ChartFile> = Vec::with_capacity(charts.len());
    let mut removed = 0;
    for value in existing {
        match by_href.get(value.as_str()) {
            Some(chart) => ordered.push(*chart),
            None => removed += 1,
        }
    }
    let kept: BTreeSet<&str> = ordered.iter().map(|chart| chart.href.as_str()).collect();
    let mut added = 0;
    for chart in charts {
        if !kept.contains(chart.href.as_str()) {
            ordered.push(chart);
            added += 1;
        }
    }

    let summary = UpdateSummary {
        entries: ordered.len(),
        added,
        removed,
        changed: false,
    };
    (ordered, summary)
}

/// Link of the most recently modified chart. Ties go to the first name.
fn newest(charts: &[ChartFile]) -> Option<&str> {
    charts
        .iter()
        .max_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| b.file_name.cmp(&a.file_name))
        })
        .map(|chart| chart.href.as_str())
}

fn unescape_html(input: &str) -> String {
    input
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
