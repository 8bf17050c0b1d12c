//! Error types for entitlements updates.

use std::path::PathBuf;

use crate::codec::CodecError;

/// Errors raised while validating parameters or updating an entitlements file.
///
/// Every variant is fatal for the invocation that produced it.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The entitlements file does not exist.
    #[error("Could not find entitlements file at path '{}'", path.display())]
    FileNotFound { path: PathBuf },

    /// The file exists but is not a plist with a dictionary at its root.
    #[error("Entitlements file at '{}' cannot be parsed", path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// An override value is not an ordered sequence of strings.
    #[error("The parameter {parameter} needs to be an array of strings, found {found}")]
    InvalidOverrideType {
        parameter: &'static str,
        found: String,
    },

    /// The path does not follow the `.entitlements` naming convention.
    #[error("Please pass a path to an entitlements file, got '{}'", path.display())]
    InvalidPathConvention { path: PathBuf },

    /// An override name that does not map to a recognized entitlement.
    #[error("Unknown entitlements parameter '{0}'")]
    UnknownParameter(String),

    /// The updated document could not be serialized.
    #[error("Failed to serialize entitlements file '{}'", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// The overrides file is not valid TOML.
    #[error("Failed to parse overrides file '{}'", path.display())]
    OverridesFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Reading or writing a file failed.
    #[error("{action} '{}'", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MergeError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MergeError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = MergeError> = std::result::Result<T, E>;
