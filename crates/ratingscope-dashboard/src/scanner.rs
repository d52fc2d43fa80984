//! Chart page discovery.

use ratingscope_common::Result;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// A chart page found in the html output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFile {
    /// File name, e.g. `bar_race_reach-imp_2025-09.html`.
    pub file_name: String,
    /// Path relative to the dashboard page's directory, forward slashes.
    pub href: String,
    /// Last modification time.
    pub modified: SystemTime,
}

impl ChartFile {
    /// File name without the `.html` extension.
    pub fn stem(&self) -> &str {
        self.file_name
            .strip_suffix(".html")
            .unwrap_or(&self.file_name)
    }
}

/// Lists the `*.html` files directly inside `html_dir`, sorted by name.
/// Links are made relative to `page_dir`. A missing directory holds no
/// charts.
pub fn scan_charts(html_dir: &Path, page_dir: &Path) -> Result<Vec<ChartFile>> {
    if !html_dir.is_dir() {
        debug!(dir = %html_dir.display(), "Chart directory missing, treating as empty");
        return Ok(Vec::new());
    }

    let prefix = link_prefix(page_dir, html_dir);
    let mut charts = Vec::new();
    for entry in std::fs::read_dir(html_dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if !metadata.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("html") {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            debug!(path = %path.display(), "Skipping non UTF-8 file name");
            continue;
        };
        charts.push(ChartFile {
            file_name: file_name.to_string(),
            href: format!("{prefix}{file_name}"),
            modified: metadata.modified()?,
        });
    }

    charts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    debug!(dir = %html_dir.display(), charts = charts.len(), "Scanned chart directory");
    Ok(charts)
}

/// Relative link from `page_dir` to `html_dir`, with a trailing slash
/// unless empty.
fn link_prefix(page_dir: &Path, html_dir: &Path) -> String {
    let relative = html_dir
        .strip_prefix(page_dir)
        .map(Path::to_path_buf)
        .ok()
        .or_else(|| {
            let page_dir = absolute(page_dir)?;
            let html_dir = absolute(html_dir)?;
            Some(relative_path(&page_dir, &html_dir))
        })
        .unwrap_or_else(|| html_dir.to_path_buf());

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            Component::ParentDir => Some("..".to_string()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("{}/", parts.join("/"))
    }
}

fn absolute(path: &Path) -> Option<PathBuf> {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    path.canonicalize().ok()
}

fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component.as_os_str());
    }
    relative
}
