//! Main entry point for ratingscope.

use anyhow::Context;
use clap::Parser;
use ratingscope::{App, Cli};
use ratingscope_common::init_logging;
use ratingscope_config::SettingsLoader;
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut settings =
        SettingsLoader::load(cli.config.as_deref()).context("failed to load settings")?;
    cli.apply_overrides(&mut settings).context("invalid command line settings")?;
    init_logging(&settings.logging).context("failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data = %settings.data_file.display(),
        output = %settings.output_dir.display(),
        "Starting ratingscope"
    );
    let app = App::new(settings);

    if cli.run_all {
        let (month, compare) = cli.months()?;
        let summary = app.run_all(month, compare)?;
        info!(
            built = summary.built,
            skipped = summary.skipped,
            dashboard_entries = summary.dashboard.entries,
            "All plots written"
        );
        return open_dashboard(cli, &app);
    }

    let args = cli.plot_args()?;
    let outcome = app
        .run(&args)
        .with_context(|| format!("cannot plot {} of filter '{}'", args.metric, args.filter))?;
    info!(html = %outcome.html_path.display(), csv = %outcome.csv_path.display(), "Plot written");

    if cli.refreshes_dashboard() {
        let summary = app
            .refresh_dashboard()
            .context("failed to update the dashboard page")?;
        info!(entries = summary.entries, changed = summary.changed, "Dashboard refreshed");
    }
    open_dashboard(cli, &app)
}

fn open_dashboard(cli: &Cli, app: &App) -> anyhow::Result<()> {
    if cli.open {
        app.open_dashboard().context("failed to open the dashboard page")?;
    }
    Ok(())
}
