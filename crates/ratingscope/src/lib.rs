//! # ratingscope
//!
//! Command line entry point: turns a ratings export into interactive charts
//! and keeps the dashboard page pointing at them.
//!
//! A single run plots one filter, metric and plot type. `--run-all` walks
//! every filter, metric and plot type, skipping combinations the data cannot
//! support, and always refreshes the dashboard afterwards.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod error;

pub use app::*;
pub use cli::*;
pub use error::*;
