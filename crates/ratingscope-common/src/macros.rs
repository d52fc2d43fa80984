//! Convenience macros for early returns with a [`RatingsError`](crate::RatingsError)

/// Return early with a `RatingsError` built by the named constructor.
///
/// The first argument is one of the single-message constructors on
/// `RatingsError` (`config`, `data_format`, `not_found`, `invalid_argument`,
/// `chart`).
///
/// # Examples
///
/// ```rust
/// use ratingscope_common::{bail, Result};
///
/// fn check_label(label: &str) -> Result<()> {
///     if label.is_empty() {
///         bail!(config, "bracket label cannot be empty");
///     }
///     Ok(())
/// }
///
/// assert!(check_label("").is_err());
/// ```
#[macro_export]
macro_rules! bail {
    ($ctor:ident, $msg:literal $(,)?) => {
        return Err($crate::RatingsError::$ctor(format!($msg)))
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::RatingsError::$ctor(format!($fmt, $($arg)*)))
    };
}

/// Return early with a `RatingsError` unless the condition holds.
///
/// # Examples
///
/// ```rust
/// use ratingscope_common::{ensure, Result};
///
/// fn check_range(start: u32, end: u32) -> Result<()> {
///     ensure!(start <= end, invalid_argument, "start {} is after end {}", start, end);
///     Ok(())
/// }
///
/// assert!(check_range(1, 2).is_ok());
/// assert!(check_range(3, 2).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $ctor:ident, $msg:literal $(,)?) => {
        if !$cond {
            return Err($crate::RatingsError::$ctor(format!($msg)));
        }
    };
    ($cond:expr, $ctor:ident, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::RatingsError::$ctor(format!($fmt, $($arg)*)));
        }
    };
}
