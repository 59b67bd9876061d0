//! Record stores and candidate construction.
//!
//! The search engine only needs two things from a world database: a value
//! lookup by key and the keys belonging to a content type. [`MemoryStore`]
//! implements both over an in-memory snapshot, loadable from a JSON-lines
//! dump where each line is one entry:
//!
//! ```text
//! {"key": "<base64>", "value": "<base64>"}
//! {"keyText": "map_-1", "json": {"scale": 0}}
//! ```

use crate::content_type::{ContentType, classify_key};
use crate::error::{Error, Result};
use crate::record::CandidateRecord;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read access to a world database.
pub trait RecordStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Keys of one content type, in key order.
    fn keys_of_content_type(&self, content_type: ContentType) -> Vec<Vec<u8>>;
}

/// An in-memory snapshot of a world database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<Vec<u8>, Vec<u8>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DumpLine {
    key: Option<String>,
    key_text: Option<String>,
    value: Option<String>,
    json: Option<serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.records.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load a JSON-lines dump file.
    pub fn load_dump(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::DumpNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::from_dump_reader(BufReader::new(file))
    }

    /// Parse a JSON-lines dump. Blank lines and `#` comments are skipped.
    pub fn from_dump_reader(reader: impl BufRead) -> Result<Self> {
        let mut store = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (key, value) = parse_dump_line(trimmed).map_err(|message| {
                Error::InvalidDumpRecord {
                    line: i + 1,
                    message,
                }
            })?;
            store.insert(key, value);
        }
        log::debug!("loaded {} records from dump", store.len());
        Ok(store)
    }
}

fn parse_dump_line(line: &str) -> std::result::Result<(Vec<u8>, Vec<u8>), String> {
    let entry: DumpLine = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let key = match (entry.key, entry.key_text) {
        (Some(encoded), None) => STANDARD.decode(encoded).map_err(|e| format!("key: {}", e))?,
        (None, Some(text)) => text.into_bytes(),
        (Some(_), Some(_)) => return Err("both 'key' and 'keyText' given".to_string()),
        (None, None) => return Err("missing 'key' or 'keyText'".to_string()),
    };
    let value = match (entry.value, entry.json) {
        (Some(encoded), None) => STANDARD.decode(encoded).map_err(|e| format!("value: {}", e))?,
        (None, Some(json)) => json.to_string().into_bytes(),
        (None, None) => Vec::new(),
        (Some(_), Some(_)) => return Err("both 'value' and 'json' given".to_string()),
    };
    Ok((key, value))
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.records.get(key).cloned()
    }

    fn keys_of_content_type(&self, content_type: ContentType) -> Vec<Vec<u8>> {
        self.records
            .keys()
            .filter(|key| classify_key(key) == content_type)
            .cloned()
            .collect()
    }
}

/// Build candidate records for the given content types.
///
/// Records are ordered by content type (in the order given), then by key.
/// Values are attached undecoded.
pub fn build_candidates(
    store: &dyn RecordStore,
    content_types: &[ContentType],
) -> Vec<CandidateRecord> {
    let mut records = Vec::new();
    for &content_type in content_types {
        for key in store.keys_of_content_type(content_type) {
            let value = store.get(&key);
            let mut record = CandidateRecord::from_key(key);
            for (name, field) in derived_custom_fields(&record.display_key, content_type) {
                record = record.with_custom_field(name, field);
            }
            if let Some(value) = value {
                record = record.with_value(value);
            }
            records.push(record);
        }
    }
    log::debug!(
        "built {} candidates for {} content types",
        records.len(),
        content_types.len()
    );
    records
}

/// Custom data fields derived from the key alone.
fn derived_custom_fields(display_key: &str, content_type: ContentType) -> Vec<(&'static str, String)> {
    match content_type {
        ContentType::Map => display_key
            .strip_prefix("map_")
            .map(|id| vec![("mapid", id.to_string())])
            .unwrap_or_default(),
        ContentType::Player | ContentType::PlayerClient => {
            let id = display_key
                .strip_prefix("player_server_")
                .or_else(|| display_key.strip_prefix("player_"))
                .unwrap_or(display_key);
            vec![("playerid", id.to_string())]
        }
        ContentType::PendingTicks | ContentType::RandomTicks => {
            let coords: Vec<&str> = display_key.splitn(4, ", ").take(3).collect();
            vec![("chunk", coords.join(", "))]
        }
        _ => Vec::new(),
    }
}
