//! Show command: read an entitlements file without writing it.

use std::path::Path;

use crate::codec::{DocumentCodec, XmlPlistCodec};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::document::EntitlementsDocument;
use crate::error::Result;
use crate::merger::read_document;
use crate::params::{ValidationMode, validate_entitlements_path};

static DEFAULT_CODEC: XmlPlistCodec = XmlPlistCodec;
static DEFAULT_DIAGNOSTICS: TracingDiagnostics = TracingDiagnostics;

pub struct ShowCommand<'a> {
    codec: &'a dyn DocumentCodec,
    diagnostics: &'a dyn Diagnostics,
}

impl ShowCommand<'static> {
    pub fn with_defaults() -> Self {
        Self::new(&DEFAULT_CODEC, &DEFAULT_DIAGNOSTICS)
    }
}

impl<'a> ShowCommand<'a> {
    pub fn new(codec: &'a dyn DocumentCodec, diagnostics: &'a dyn Diagnostics) -> Self {
        Self { codec, diagnostics }
    }

    pub fn execute(&self, path: &Path) -> Result<EntitlementsDocument> {
        validate_entitlements_path(path, ValidationMode::Strict)
            .and_then(|()| read_document(self.codec, path))
            .inspect_err(|err| self.diagnostics.user_error(&err.to_string()))
    }
}
