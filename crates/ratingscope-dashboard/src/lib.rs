//! # ratingscope dashboard
//!
//! Keeps the static dashboard page in step with the charts on disk.
//!
//! The page carries a `<select id="plotSelect">` whose options point at the
//! chart pages under the html output directory. [`DashboardUpdater`] rescans
//! that directory, keeps the existing option order, appends new charts,
//! drops stale ones and selects the newest. Option labels are decoded from
//! artifact names by [`LabelMap`]. [`open_in_browser`] shows the page
//! afterwards.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod labels;
pub mod scanner;
pub mod updater;

pub use browser::*;
pub use labels::*;
pub use scanner::*;
pub use updater::*;
