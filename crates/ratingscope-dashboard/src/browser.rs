//! Opening the dashboard page in the default browser.

use ratingscope_common::{RatingsError, Result};
use std::path::Path;
use tracing::info;
use url::Url;

/// Absolute `file://` URL of `page`.
pub fn page_url(page: &Path) -> Result<Url> {
    let absolute = page.canonicalize().map_err(|e| {
        RatingsError::config_with_source(
            format!("cannot resolve dashboard page {}", page.display()),
            e,
        )
    })?;
    Url::from_file_path(&absolute).map_err(|()| {
        RatingsError::config(format!("no file URL for {}", absolute.display()))
    })
}

/// Opens `page` in the user's default browser.
pub fn open_in_browser(page: &Path) -> Result<()> {
    let url = page_url(page)?;
    info!(%url, "Opening dashboard");
    webbrowser::open(url.as_str())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratingscope_common::test_utils::{create_temp_dir, dashboard_fixtures};

    #[test]
    fn test_page_url_is_absolute_file_url() {
        let temp = create_temp_dir();
        let page = temp.path().join("index.html");
        std::fs::write(&page, dashboard_fixtures::PAGE).unwrap();

        let url = page_url(&page).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/index.html"));
        assert_eq!(url.to_file_path().unwrap(), page.canonicalize().unwrap());
    }

    #[test]
    fn test_missing_page_is_config_error() {
        let temp = create_temp_dir();
        let error = page_url(&temp.path().join("missing.html")).unwrap_err();
        assert!(matches!(error, RatingsError::Config { .. }));
        assert!(error.to_string().contains("missing.html"));
    }
}
