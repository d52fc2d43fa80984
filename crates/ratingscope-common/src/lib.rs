//! # ratingscope common
//!
//! Shared types, error taxonomy, logging setup, and text utilities for
//! ratingscope.
//!
//! This crate provides the foundational types used across all other crates
//! in the workspace: calendar months, the metric and plot enumerations, and
//! the [`RatingsError`] every component reports through.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod macros;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::*;
pub use logging::*;
pub use types::*;
pub use utils::*;
