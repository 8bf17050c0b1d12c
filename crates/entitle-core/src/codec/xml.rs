//! XML plist codec.

use std::io::Cursor;

use plist::{Dictionary, Value};

use super::{CodecError, DocumentCodec, value_kind};

/// Reads any plist the `plist` crate understands and writes XML plists.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlPlistCodec;

impl DocumentCodec for XmlPlistCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Dictionary, CodecError> {
        let value = Value::from_reader(Cursor::new(bytes))?;
        match value {
            Value::Dictionary(dictionary) => Ok(dictionary),
            other => Err(CodecError::NotADictionary(value_kind(&other))),
        }
    }

    fn encode(&self, dictionary: &Dictionary) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        Value::Dictionary(dictionary.clone()).to_writer_xml(&mut bytes)?;
        // Xcode leaves a trailing newline on entitlements files
        bytes.push(b'\n');
        Ok(bytes)
    }
}
