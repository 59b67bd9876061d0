//! bedrock-query - structured search over Minecraft Bedrock world records.
//!
//! # Overview
//!
//! A world database is a set of LevelDB entries whose values are mostly
//! little-endian NBT. bedrock-query provides:
//! - Classification of raw keys into content types
//! - Decoding of NBT and JSON payloads into tag trees
//! - A search language with `keyword:value` filters, free text, and the
//!   prefix operators `|` (any of), `-` (none of), `^` (one of), `&` (all of)
//! - Per-screen configuration of the recognized keywords
//! - Lazy and batched evaluation with decode-once caching
//!
//! # Example
//!
//! ```
//! use bedrock_query::config::ScreenConfig;
//! use bedrock_query::record::CandidateRecord;
//! use bedrock_query::search::compile;
//!
//! let records = vec![
//!     CandidateRecord::from_key(b"map_-1".to_vec()),
//!     CandidateRecord::from_key(b"~local_player".to_vec()),
//! ];
//! let query = compile("type:Map", &ScreenConfig::all(), records).unwrap();
//! let keys: Vec<&str> = query.results().map(|r| r.display_key.as_str()).collect();
//! assert_eq!(keys, vec!["map_-1"]);
//! ```

pub mod cli;
pub mod config;
pub mod content_type;
pub mod error;
pub mod record;
pub mod search;
pub mod store;
pub mod tag;

// Re-export main types at crate root
pub use config::{Config, ScreenConfig};
pub use content_type::ContentType;
pub use error::{Error, QueryError, Result};
pub use record::CandidateRecord;
pub use search::{CompiledQuery, compile};
pub use tag::{Tag, TagType};
