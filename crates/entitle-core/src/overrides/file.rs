//! Overrides read from a TOML file.
//!
//! ```toml
//! apple_signin = ["Default"]
//! app_group_identifiers = ["group.com.test.testapp"]
//! ```

use std::path::Path;

use serde_json::{Map, Value};

use super::RawOverrides;
use crate::error::{MergeError, Result};

/// Load overrides from a TOML file whose top-level keys are parameter names.
///
/// Values are not type checked here; that happens when the parameters are
/// validated.
pub fn load_overrides_file(path: &Path) -> Result<RawOverrides> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| MergeError::io("Failed to read overrides file", path, source))?;
    let map: Map<String, Value> =
        toml::from_str(&content).map_err(|source| MergeError::OverridesFile {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("Loaded {} override(s) from {}", map.len(), path.display());

    RawOverrides::from_map(&map)
}
