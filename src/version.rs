//! Version marker parsing.
//!
//! Markers are semantic versions compared with standard `major.minor.patch`
//! ordering ("7.10.0" sorts above "7.9.0"). Catalog fields parse strictly; a
//! malformed value there is a deploy defect. Persisted marker values parse
//! leniently and degrade to "unset", since the gate must never surface a
//! half-initialized state.

use anyhow::{Context, Result};
use semver::Version;
use tracing::warn;

/// Parse a version from catalog or host input.
///
/// # Errors
///
/// Returns an error if `marker` is not a valid semantic version.
pub fn parse(marker: &str) -> Result<Version> {
    Version::parse(marker).with_context(|| format!("Invalid version marker: {marker}"))
}

/// Parse a persisted marker value, treating malformed input as unset.
#[must_use]
pub fn parse_marker(value: &str) -> Option<Version> {
    match Version::parse(value) {
        Ok(version) => Some(version),
        Err(err) => {
            warn!("Ignoring malformed version marker {value:?}: {err}");
            None
        }
    }
}
