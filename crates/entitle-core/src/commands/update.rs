//! Update command implementation.
//!
//! Validates the parameters of one update, folds the overrides file and the
//! explicit overrides together, and runs the merger.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::codec::{DocumentCodec, XmlPlistCodec};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::document::EntitlementsDocument;
use crate::error::Result;
use crate::merger::EntitlementsMerger;
use crate::overrides::{OverrideField, OverrideSet, RawOverrides, load_overrides_file};
use crate::params::{UpdateParams, ValidationMode};

static DEFAULT_CODEC: XmlPlistCodec = XmlPlistCodec;
static DEFAULT_DIAGNOSTICS: TracingDiagnostics = TracingDiagnostics;

/// Options for the update command
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Path to the `.entitlements` file
    pub entitlements_file: PathBuf,
    /// Overrides given directly by the caller
    pub overrides: OverrideSet,
    /// TOML file with additional overrides; explicit overrides win per field
    pub overrides_file: Option<PathBuf>,
    /// Validation strictness
    pub validation: ValidationMode,
}

impl UpdateOptions {
    pub fn new(entitlements_file: impl Into<PathBuf>) -> Self {
        Self {
            entitlements_file: entitlements_file.into(),
            ..Self::default()
        }
    }

    pub fn with_overrides(mut self, overrides: OverrideSet) -> Self {
        self.overrides = overrides;
        self
    }

    /// Set one override field
    pub fn with_field(mut self, field: OverrideField, values: Vec<String>) -> Self {
        self.overrides.set(field, values);
        self
    }

    pub fn with_overrides_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.overrides_file = Some(path.into());
        self
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }
}

/// Result of an update
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub path: PathBuf,
    /// Document keys that were overwritten
    pub replaced_keys: Vec<&'static str>,
    /// Final document contents
    #[serde(skip)]
    pub document: EntitlementsDocument,
}

/// Update command executor
pub struct UpdateCommand<'a> {
    codec: &'a dyn DocumentCodec,
    diagnostics: &'a dyn Diagnostics,
}

impl UpdateCommand<'static> {
    /// XML plist codec reporting through `tracing`.
    pub fn with_defaults() -> Self {
        Self::new(&DEFAULT_CODEC, &DEFAULT_DIAGNOSTICS)
    }
}

impl<'a> UpdateCommand<'a> {
    pub fn new(codec: &'a dyn DocumentCodec, diagnostics: &'a dyn Diagnostics) -> Self {
        Self { codec, diagnostics }
    }

    /// Run the update, reporting any failure as a user error before
    /// returning it.
    pub fn execute(&self, options: &UpdateOptions) -> Result<UpdateReport> {
        self.run(options).inspect_err(|err| {
            self.diagnostics.user_error(&err.to_string());
        })
    }

    fn run(&self, options: &UpdateOptions) -> Result<UpdateReport> {
        let path = options.entitlements_file.as_path();
        self.diagnostics
            .message(&format!("Entitlements file: {}", path.display()));

        let params = UpdateParams::new(path).with_overrides(collect_overrides(options)?);
        params.validate(options.validation)?;
        let overrides = OverrideSet::from_raw(&params.overrides)?;

        let merger = EntitlementsMerger::new(self.codec, self.diagnostics);
        let report = merger.apply(path, &overrides)?;

        Ok(UpdateReport {
            path: report.path.clone(),
            replaced_keys: report.replaced_keys(),
            document: report.document,
        })
    }
}

fn collect_overrides(options: &UpdateOptions) -> Result<RawOverrides> {
    let mut raw = match &options.overrides_file {
        Some(file) => load_overrides_file(file)?,
        None => RawOverrides::new(),
    };
    raw.extend(RawOverrides::from(&options.overrides));
    Ok(raw)
}

/// Convenience wrapper: update `path` with `overrides` using the defaults.
pub fn update_entitlements(path: &Path, overrides: OverrideSet) -> Result<UpdateReport> {
    UpdateCommand::with_defaults().execute(&UpdateOptions::new(path).with_overrides(overrides))
}
