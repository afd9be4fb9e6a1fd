//! Configuration access port trait.

use std::str::FromStr;

use crate::domain::error::CrossoverError;

pub trait ConfigPort {
    /// Raw value of `key` in `section`, if present.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}

/// Parse an optional key with `FromStr`, falling back to `default` when the
/// key is absent or blank. A present but unparseable value is an error.
pub fn get_parsed<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, CrossoverError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match config.get_string(section, key).filter(|s| !s.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| CrossoverError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}
