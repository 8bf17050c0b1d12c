//! Entitle Core Library
//!
//! Reads an Xcode `.entitlements` plist, replaces a fixed set of capability
//! keys with caller-supplied values, and writes the file back in place.

pub mod codec;
pub mod commands;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod merger;
pub mod overrides;
pub mod params;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::codec::{CodecError, DocumentCodec, XmlPlistCodec};
    pub use crate::commands::{ShowCommand, UpdateCommand, UpdateOptions, UpdateReport};
    pub use crate::diagnostics::{Diagnostics, RecordingDiagnostics, TracingDiagnostics};
    pub use crate::document::EntitlementsDocument;
    pub use crate::error::MergeError;
    pub use crate::merger::{EntitlementsMerger, MergeReport};
    pub use crate::overrides::{OverrideField, OverrideSet, RawOverrides};
    pub use crate::params::{UpdateParams, ValidationMode};
}
