//! Utility functions for RSO
//!
//! Input validation for the manual boundary and environment loading.

use std::path::PathBuf;

use crate::error::{Result, RsoError};
use crate::types::{MAX_BASE_UNIT_SIZE, MAX_USAGE_GB, MIN_BASE_UNIT_SIZE};

/// Clamp a base unit size into [10, 100]
#[inline]
pub fn clamp_base_unit_size(size: u64) -> u64 {
    size.clamp(MIN_BASE_UNIT_SIZE, MAX_BASE_UNIT_SIZE)
}

/// Parse a user-supplied amount.
///
/// Only integers are accepted; sign is preserved so that callers can reject
/// non-positive values with a precise message.
///
/// # Example
/// ```
/// use rso_core::util::parse_amount;
///
/// assert_eq!(parse_amount(" 30 ").unwrap(), 30);
/// assert_eq!(parse_amount("-4").unwrap(), -4);
/// assert!(parse_amount("ten").is_err());
/// ```
pub fn parse_amount(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| RsoError::InvalidAmount(format!("'{trimmed}' is not a whole number")))
}

/// Require a strictly positive amount, returning it unsigned
pub fn positive_amount(amount: i64) -> Result<u64> {
    if amount <= 0 {
        return Err(RsoError::InvalidAmount(format!(
            "{amount} must be greater than zero"
        )));
    }
    Ok(amount.unsigned_abs())
}

/// Usage after adding `amount` to `used`, rejected above [`MAX_USAGE_GB`]
pub fn grown_usage(used: u64, amount: u64) -> Result<u64> {
    used.checked_add(amount)
        .filter(|total| *total <= MAX_USAGE_GB)
        .ok_or_else(|| {
            RsoError::InvalidAmount(format!(
                "adding {amount} GB to {used} GB exceeds the {MAX_USAGE_GB} GB limit"
            ))
        })
}

/// `$RSO_ENV_FILE`, else `<config dir>/rso/rso.env`
pub fn env_file_path() -> Option<PathBuf> {
    std::env::var_os("RSO_ENV_FILE")
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("rso").join("rso.env")))
}

/// Apply the env file, if present. Returns the number of variables set.
pub fn load_env_file() -> usize {
    env_file_path()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .map_or(0, |contents| apply_env(&contents))
}

/// Set `KEY=value` pairs that are not already in the environment.
/// Blank lines and `#` comments are skipped; surrounding quotes are stripped.
pub fn apply_env(contents: &str) -> usize {
    let pairs = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"')));

    let mut applied = 0;
    for (key, value) in pairs {
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, value);
            applied += 1;
        }
    }
    applied
}
