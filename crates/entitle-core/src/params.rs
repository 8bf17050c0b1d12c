//! Parameter validation performed before an update runs.
//!
//! Mirrors the checks a build host applies to declared options: the path must
//! look like an entitlements file and exist, and every supplied override must
//! be a sequence. Element types are checked later by [`OverrideSet::from_raw`].
//!
//! [`OverrideSet::from_raw`]: crate::overrides::OverrideSet::from_raw

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{MergeError, Result};
use crate::overrides::{RawOverrides, json_kind};

/// Substring every entitlements file path must contain.
pub const ENTITLEMENTS_MARKER: &str = ".entitlements";

/// How strictly parameters are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every check applies.
    #[default]
    Strict,
    /// Skip the on-disk existence check of the entitlements file.
    Test,
}

/// Named inputs for one update.
#[derive(Debug, Clone, Default)]
pub struct UpdateParams {
    pub entitlements_file: PathBuf,
    pub overrides: RawOverrides,
}

impl UpdateParams {
    pub fn new(entitlements_file: impl Into<PathBuf>) -> Self {
        Self {
            entitlements_file: entitlements_file.into(),
            overrides: RawOverrides::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: RawOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn validate(&self, mode: ValidationMode) -> Result<()> {
        validate_entitlements_path(&self.entitlements_file, mode)?;
        for (field, value) in self.overrides.iter() {
            if !matches!(value, Value::Array(_)) {
                return Err(MergeError::InvalidOverrideType {
                    parameter: field.parameter(),
                    found: json_kind(value).to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Check the naming convention and, outside test mode, existence.
pub fn validate_entitlements_path(path: &Path, mode: ValidationMode) -> Result<()> {
    if !path.to_string_lossy().contains(ENTITLEMENTS_MARKER) {
        return Err(MergeError::InvalidPathConvention {
            path: path.to_path_buf(),
        });
    }
    if mode == ValidationMode::Strict && !path.exists() {
        return Err(MergeError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::OverrideField;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn rejects_path_without_marker() {
        let err = validate_entitlements_path(Path::new("App/Info.plist"), ValidationMode::Test)
            .unwrap_err();

        assert!(matches!(err, MergeError::InvalidPathConvention { .. }));
    }

    #[test]
    fn strict_mode_requires_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("App.entitlements");

        let err = validate_entitlements_path(&path, ValidationMode::Strict).unwrap_err();

        assert!(matches!(err, MergeError::FileNotFound { .. }));
    }

    #[test]
    fn test_mode_skips_existence_check() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("App.entitlements");

        validate_entitlements_path(&path, ValidationMode::Test).unwrap();
    }

    #[test]
    fn marker_may_appear_anywhere_in_path() {
        validate_entitlements_path(
            Path::new("build/App.entitlements.d/release.plist"),
            ValidationMode::Test,
        )
        .unwrap();
    }

    #[test]
    fn validate_rejects_non_sequence_override() {
        let mut overrides = RawOverrides::new();
        overrides.set(OverrideField::AppPayments, json!({"merchant": "x"}));
        let params = UpdateParams::new("App.entitlements").with_overrides(overrides);

        let err = params.validate(ValidationMode::Test).unwrap_err();

        match err {
            MergeError::InvalidOverrideType { parameter, found } => {
                assert_eq!(parameter, "app_payments");
                assert_eq!(found, "object");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validate_leaves_element_types_alone() {
        let mut overrides = RawOverrides::new();
        overrides.set(OverrideField::AppleSignin, json!([1, 2]));
        let params = UpdateParams::new("App.entitlements").with_overrides(overrides);

        params.validate(ValidationMode::Test).unwrap();
    }
}
