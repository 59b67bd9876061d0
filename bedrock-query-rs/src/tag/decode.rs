//! Payload decoders producing [`Tag`] trees.

use crate::content_type::{ContentType, PayloadFormat};
use crate::error::DecodeError;
use crate::tag::{NbtDecoder, Tag};
use serde_json::Value;

/// Turns raw record bytes into a tag tree.
pub trait TagDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Tag, DecodeError>;
}

/// Picks the decoder for a record's content type.
pub trait DecoderRegistry {
    /// `None` when records of this type carry no tag tree.
    fn decoder_for(&self, content_type: ContentType) -> Option<&dyn TagDecoder>;
}

/// Decodes by [`PayloadFormat`]: NBT, JSON, or nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDecoders;

impl DecoderRegistry for DefaultDecoders {
    fn decoder_for(&self, content_type: ContentType) -> Option<&dyn TagDecoder> {
        match content_type.payload_format() {
            PayloadFormat::Nbt => Some(&NbtDecoder),
            PayloadFormat::Json => Some(&JsonDecoder),
            PayloadFormat::Binary => None,
        }
    }
}

/// Decodes UTF-8 JSON payloads into JSON-mode tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl TagDecoder for JsonDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Tag, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::Json(e.to_string()))?;
        Ok(Tag::from(value))
    }
}

impl From<Value> for Tag {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Tag::Null,
            Value::Bool(b) => Tag::Boolean(b),
            Value::Number(n) => Tag::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Tag::String(s),
            Value::Array(items) => Tag::List(items.into_iter().map(Tag::from).collect()),
            Value::Object(map) => {
                Tag::Object(map.into_iter().map(|(k, v)| (k, Tag::from(v))).collect())
            }
        }
    }
}
