//! # ratingscope graphs
//!
//! Turns a ratings export into charts.
//!
//! The pipeline is linear: [`Dataset::load`] parses the export,
//! [`MonthSelection::resolve`] pins down the months to show,
//! [`Preparer::prepare`] filters and brackets the rows into a
//! [`PreparedTable`], and [`PlotBuilder::build`] renders an interactive
//! plotly page plus a CSV extract named by [`ArtifactName`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod artifact;
pub mod dataset;
pub mod manager;
pub mod selection;
pub mod style;
pub mod traits;

// Chart implementations
pub mod bar;
pub mod timeline;

pub use aggregator::*;
pub use artifact::*;
pub use bar::*;
pub use dataset::*;
pub use manager::*;
pub use selection::*;
pub use style::*;
pub use timeline::*;
pub use traits::*;
