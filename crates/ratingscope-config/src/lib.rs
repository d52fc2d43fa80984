//! # ratingscope config
//!
//! Filter definitions and application settings.
//!
//! Filters are JSON documents, one per named filter, describing which rows of
//! the ratings export to keep and how raw demographic labels merge into
//! non-overlapping brackets. Every filter is validated on load so the rest of
//! the pipeline can rely on the partition invariant. Settings are YAML or
//! TOML with environment overrides.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::*;
pub use schema::*;
pub use validation::*;
