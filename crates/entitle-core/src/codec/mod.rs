//! Plist encoding and decoding for entitlements documents.
//!
//! The merge logic only ever sees a [`plist::Dictionary`]; how the bytes on
//! disk map to that dictionary is the business of a [`DocumentCodec`].

mod xml;

use plist::{Dictionary, Value};

pub use xml::XmlPlistCodec;

/// Errors produced by a [`DocumentCodec`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Plist(#[from] plist::Error),

    #[error("expected a dictionary at the plist root, found {0}")]
    NotADictionary(&'static str),
}

/// Trait for turning entitlements file contents into a dictionary and back.
pub trait DocumentCodec: Send + Sync {
    /// Decode file contents into the root dictionary.
    fn decode(&self, bytes: &[u8]) -> Result<Dictionary, CodecError>;

    /// Encode the root dictionary into file contents.
    fn encode(&self, dictionary: &Dictionary) -> Result<Vec<u8>, CodecError>;
}

/// Short human name for the kind of a plist value.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Dictionary(_) => "dictionary",
        Value::Boolean(_) => "boolean",
        Value::Data(_) => "data",
        Value::Date(_) => "date",
        Value::Real(_) => "real",
        Value::Integer(_) => "integer",
        Value::String(_) => "string",
        Value::Uid(_) => "uid",
        _ => "value",
    }
}
