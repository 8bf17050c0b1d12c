//! Load, override, and save an entitlements file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::codec::DocumentCodec;
use crate::diagnostics::Diagnostics;
use crate::document::EntitlementsDocument;
use crate::error::{MergeError, Result};
use crate::overrides::{OverrideField, OverrideSet};

/// Outcome of a successful merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub path: PathBuf,
    /// Fields whose document keys were overwritten.
    pub replaced: Vec<OverrideField>,
    #[serde(skip)]
    pub document: EntitlementsDocument,
}

impl MergeReport {
    pub fn replaced_keys(&self) -> Vec<&'static str> {
        self.replaced
            .iter()
            .map(|field| field.document_key())
            .collect()
    }
}

/// Applies an [`OverrideSet`] to an entitlements file in place.
pub struct EntitlementsMerger<'a> {
    codec: &'a dyn DocumentCodec,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> EntitlementsMerger<'a> {
    pub fn new(codec: &'a dyn DocumentCodec, diagnostics: &'a dyn Diagnostics) -> Self {
        Self { codec, diagnostics }
    }

    /// Decode `path`, write every present override, and save it back.
    ///
    /// The file is replaced by rename, so on any error it keeps its previous
    /// contents.
    pub fn apply(&self, path: &Path, overrides: &OverrideSet) -> Result<MergeReport> {
        let mut document = read_document(self.codec, path)?;

        let replaced = document.apply_overrides(overrides);
        tracing::debug!(
            "Replaced {} entitlement(s) in {}",
            replaced.len(),
            path.display()
        );

        let bytes = self
            .codec
            .encode(document.as_dictionary())
            .map_err(|source| MergeError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        write_atomic(path, &bytes)?;

        self.diagnostics
            .message(&format!("New entitlements file set: {}", document.render()));

        Ok(MergeReport {
            path: path.to_path_buf(),
            replaced,
            document,
        })
    }
}

/// Decode the entitlements file at `path` without modifying it.
pub fn read_document(codec: &dyn DocumentCodec, path: &Path) -> Result<EntitlementsDocument> {
    if !path.is_file() {
        return Err(MergeError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)
        .map_err(|source| MergeError::io("Failed to read entitlements file", path, source))?;
    let dictionary = codec
        .decode(&bytes)
        .map_err(|source| MergeError::DecodeFailure {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(EntitlementsDocument::from_dictionary(dictionary))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    // Write through symlinks to the real file
    let target = fs::canonicalize(path)
        .map_err(|source| MergeError::io("Failed to resolve entitlements file", path, source))?;
    let permissions = fs::metadata(&target)
        .map_err(|source| MergeError::io("Failed to read entitlements file", &target, source))?
        .permissions();

    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "entitlements".to_string());
    let tmp_path = target.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    fs::write(&tmp_path, bytes)
        .map_err(|source| MergeError::io("Failed to write temporary file", &tmp_path, source))?;

    let replaced = fs::set_permissions(&tmp_path, permissions)
        .map_err(|source| MergeError::io("Failed to copy file permissions", &tmp_path, source))
        .and_then(|()| {
            fs::rename(&tmp_path, &target).map_err(|source| {
                MergeError::io("Failed to replace entitlements file", &target, source)
            })
        });
    if replaced.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, XmlPlistCodec};
    use crate::diagnostics::RecordingDiagnostics;
    use plist::Dictionary;
    use tempfile::TempDir;

    struct FailingEncoder;

    impl DocumentCodec for FailingEncoder {
        fn decode(&self, bytes: &[u8]) -> std::result::Result<Dictionary, CodecError> {
            XmlPlistCodec.decode(bytes)
        }

        fn encode(&self, _dictionary: &Dictionary) -> std::result::Result<Vec<u8>, CodecError> {
            Err(CodecError::NotADictionary("test"))
        }
    }

    const EMPTY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
</dict>
</plist>
"#;

    #[test]
    fn encode_failure_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("App.entitlements");
        fs::write(&path, EMPTY).unwrap();
        let diagnostics = RecordingDiagnostics::new();
        let merger = EntitlementsMerger::new(&FailingEncoder, &diagnostics);

        let err = merger
            .apply(&path, &OverrideSet::new().with_apple_signin(["Default"]))
            .unwrap_err();

        assert!(matches!(err, MergeError::Encode { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), EMPTY);
        assert!(diagnostics.messages().is_empty());
    }

    #[test]
    fn write_leaves_no_temporary_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("App.entitlements");
        fs::write(&path, EMPTY).unwrap();
        let diagnostics = RecordingDiagnostics::new();

        EntitlementsMerger::new(&XmlPlistCodec, &diagnostics)
            .apply(&path, &OverrideSet::new().with_app_payments(["merchant.a"]))
            .unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("App.entitlements")]);
    }

    #[test]
    fn report_lists_replaced_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("App.entitlements");
        fs::write(&path, EMPTY).unwrap();
        let diagnostics = RecordingDiagnostics::new();

        let report = EntitlementsMerger::new(&XmlPlistCodec, &diagnostics)
            .apply(
                &path,
                &OverrideSet::new()
                    .with_app_payments(["merchant.a"])
                    .with_apple_signin(["Default"]),
            )
            .unwrap();

        assert_eq!(
            report.replaced_keys(),
            vec![
                "com.apple.developer.applesignin",
                "com.apple.developer.in-app-payments"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_is_updated_through_the_link() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("Real.entitlements");
        let link = temp.path().join("App.entitlements");
        fs::write(&real, EMPTY).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let diagnostics = RecordingDiagnostics::new();

        EntitlementsMerger::new(&XmlPlistCodec, &diagnostics)
            .apply(&link, &OverrideSet::new().with_app_payments(["merchant.a"]))
            .unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert!(fs::read_to_string(&real).unwrap().contains("merchant.a"));
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("App.entitlements");
        fs::write(&path, EMPTY).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let diagnostics = RecordingDiagnostics::new();

        EntitlementsMerger::new(&XmlPlistCodec, &diagnostics)
            .apply(&path, &OverrideSet::new().with_apple_signin(["Default"]))
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
