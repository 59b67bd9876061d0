//! Candidate records: the per-search view of database entries.

use crate::content_type::{ContentType, classify_key, display_key};
use crate::tag::{DecoderRegistry, Tag};
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::BTreeMap;

/// One database entry prepared for a search.
///
/// Built once per search from a store snapshot and read-only during
/// evaluation, except for the decode-once caches of the tag tree and its
/// dumped text.
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    pub key: Vec<u8>,
    pub display_key: String,
    pub content_type: ContentType,
    pub raw_value: Option<Vec<u8>>,
    pub searchable_contents: Vec<String>,
    pub custom_data_fields: BTreeMap<String, String>,
    decoded: OnceCell<Option<Tag>>,
    dumped: OnceCell<String>,
}

impl CandidateRecord {
    /// Create a record from a raw key, deriving content type and display key.
    pub fn from_key(key: impl Into<Vec<u8>>) -> Self {
        let key = key.into();
        let content_type = classify_key(&key);
        let display_key = display_key(&key);
        Self::new(key, display_key, content_type)
    }

    pub fn new(key: impl Into<Vec<u8>>, display_key: impl Into<String>, content_type: ContentType) -> Self {
        let display_key = display_key.into();
        Self {
            key: key.into(),
            searchable_contents: vec![display_key.clone()],
            display_key,
            content_type,
            raw_value: None,
            custom_data_fields: BTreeMap::new(),
            decoded: OnceCell::new(),
            dumped: OnceCell::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.raw_value = Some(value.into());
        self
    }

    /// Attach an already decoded tree.
    pub fn with_decoded(self, tag: Tag) -> Self {
        // A fresh record's cell is empty, so this cannot fail.
        let _ = self.decoded.set(Some(tag));
        self
    }

    pub fn with_contents(mut self, contents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.searchable_contents
            .extend(contents.into_iter().map(Into::into));
        self
    }

    pub fn with_custom_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_data_fields.insert(name.into(), value.into());
        self
    }

    /// The decoded tree, if it has been decoded (or attached) already.
    pub fn decoded_value(&self) -> Option<&Tag> {
        self.decoded.get().and_then(Option::as_ref)
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded.get().is_some()
    }

    /// Decode the raw value once, caching the outcome.
    ///
    /// Records without a value, without a decoder for their content type, or
    /// whose payload fails to decode cache `None`.
    pub fn decode_with(&self, decoders: &dyn DecoderRegistry) -> Option<&Tag> {
        self.decoded
            .get_or_init(|| {
                let bytes = self.raw_value.as_deref()?;
                let decoder = decoders.decoder_for(self.content_type)?;
                match decoder.decode(bytes) {
                    Ok(tag) => Some(tag),
                    Err(e) => {
                        log::warn!("failed to decode {}: {}", self.display_key, e);
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Render the decoded tree into the searchable text, once.
    pub fn dump_contents(&self) -> Option<&str> {
        if let Some(dumped) = self.dumped.get() {
            return Some(dumped.as_str());
        }
        let tag = self.decoded_value()?;
        Some(self.dumped.get_or_init(|| tag.to_string()).as_str())
    }

    /// All text the `contents` field is matched against.
    pub fn contents(&self) -> impl Iterator<Item = &str> {
        self.searchable_contents
            .iter()
            .map(String::as_str)
            .chain(self.dumped.get().map(String::as_str))
    }

    /// A custom data field, empty when the record does not carry it.
    pub fn custom_field(&self, name: &str) -> &str {
        self.custom_data_fields
            .get(name)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            key: self.key.clone(),
            display_key: self.display_key.clone(),
            content_type: self.content_type,
        }
    }
}

/// Serializable identity of a record, for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    #[serde(serialize_with = "serialize_key")]
    pub key: Vec<u8>,
    pub display_key: String,
    pub content_type: ContentType,
}

fn serialize_key<S: serde::Serializer>(key: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    use base64::Engine;
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::DefaultDecoders;

    fn entity_json() -> &'static [u8] {
        br#"{"identifier": "minecraft:cow"}"#
    }

    struct JsonEverything;

    impl DecoderRegistry for JsonEverything {
        fn decoder_for(&self, _: ContentType) -> Option<&dyn crate::tag::TagDecoder> {
            Some(&crate::tag::JsonDecoder)
        }
    }

    #[test]
    fn test_from_key_classifies() {
        let record = CandidateRecord::from_key(b"map_-5".to_vec());
        assert_eq!(record.content_type, ContentType::Map);
        assert_eq!(record.display_key, "map_-5");
        assert_eq!(record.searchable_contents, vec!["map_-5"]);
    }

    #[test]
    fn test_decode_once() {
        let record = CandidateRecord::from_key(b"player_1".to_vec()).with_value(entity_json());
        assert!(!record.is_decoded());
        assert!(record.decoded_value().is_none());
        let tag = record.decode_with(&JsonEverything).cloned();
        assert!(tag.is_some());
        assert!(record.is_decoded());
        assert_eq!(record.decoded_value().cloned(), tag);
    }

    #[test]
    fn test_decode_failure_cached_as_none() {
        let record = CandidateRecord::from_key(b"player_1".to_vec()).with_value(b"not nbt".to_vec());
        assert!(record.decode_with(&DefaultDecoders).is_none());
        assert!(record.is_decoded());
        assert!(record.decoded_value().is_none());
    }

    #[test]
    fn test_binary_records_never_decode() {
        let mut key = vec![0u8; 8];
        key.push(0x2b);
        let record = CandidateRecord::from_key(key).with_value(vec![1, 2, 3]);
        assert_eq!(record.content_type, ContentType::Data3D);
        assert!(record.decode_with(&DefaultDecoders).is_none());
    }

    #[test]
    fn test_dump_contents_feeds_contents() {
        let record = CandidateRecord::new(b"k".to_vec(), "k", ContentType::Entity)
            .with_decoded(Tag::Compound(vec![("Health".to_string(), Tag::Short(20))]));
        assert_eq!(record.contents().count(), 1);
        assert_eq!(record.dump_contents(), Some("{Health:20s}"));
        let contents: Vec<&str> = record.contents().collect();
        assert_eq!(contents, vec!["k", "{Health:20s}"]);
    }

    #[test]
    fn test_custom_field_defaults_to_empty() {
        let record = CandidateRecord::from_key(b"map_1".to_vec()).with_custom_field("mapid", "1");
        assert_eq!(record.custom_field("mapid"), "1");
        assert_eq!(record.custom_field("other"), "");
    }
}
