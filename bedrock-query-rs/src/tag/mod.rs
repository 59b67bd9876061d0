//! Decoded tag trees (NBT and JSON payloads).
//!
//! A [`Tag`] is the read-only view the search engine has of a record payload.
//! NBT payloads produce the thirteen NBT variants; JSON payloads produce the
//! JSON-mode variants (`Object`, `Number`, `Boolean`, `Null`) alongside the
//! shared `List` and `String` variants.

pub mod decode;
pub mod nbt;

pub use decode::{DecoderRegistry, DefaultDecoders, JsonDecoder, TagDecoder};
pub use nbt::NbtDecoder;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A node in a decoded tag tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<Tag>),
    /// Named children in file order.
    Compound(Vec<(String, Tag)>),
    ByteArray(Vec<i8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    /// JSON object entries.
    Object(Vec<(String, Tag)>),
    Number(f64),
    Boolean(bool),
    Null,
}

/// The closed set of tag type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    List,
    Compound,
    ByteArray,
    ShortArray,
    IntArray,
    LongArray,
    Object,
    Number,
    Boolean,
    Null,
}

impl TagType {
    pub const ALL: [TagType; 17] = [
        TagType::Byte,
        TagType::Short,
        TagType::Int,
        TagType::Long,
        TagType::Float,
        TagType::Double,
        TagType::String,
        TagType::List,
        TagType::Compound,
        TagType::ByteArray,
        TagType::ShortArray,
        TagType::IntArray,
        TagType::LongArray,
        TagType::Object,
        TagType::Number,
        TagType::Boolean,
        TagType::Null,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagType::Byte => "byte",
            TagType::Short => "short",
            TagType::Int => "int",
            TagType::Long => "long",
            TagType::Float => "float",
            TagType::Double => "double",
            TagType::String => "string",
            TagType::List => "list",
            TagType::Compound => "compound",
            TagType::ByteArray => "byteArray",
            TagType::ShortArray => "shortArray",
            TagType::IntArray => "intArray",
            TagType::LongArray => "longArray",
            TagType::Object => "object",
            TagType::Number => "number",
            TagType::Boolean => "boolean",
            TagType::Null => "null",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagType {
    type Err = String;

    /// Case-insensitive lookup by type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tag type '{}'", s))
    }
}

impl Tag {
    pub fn tag_type(&self) -> TagType {
        match self {
            Tag::Byte(_) => TagType::Byte,
            Tag::Short(_) => TagType::Short,
            Tag::Int(_) => TagType::Int,
            Tag::Long(_) => TagType::Long,
            Tag::Float(_) => TagType::Float,
            Tag::Double(_) => TagType::Double,
            Tag::String(_) => TagType::String,
            Tag::List(_) => TagType::List,
            Tag::Compound(_) => TagType::Compound,
            Tag::ByteArray(_) => TagType::ByteArray,
            Tag::ShortArray(_) => TagType::ShortArray,
            Tag::IntArray(_) => TagType::IntArray,
            Tag::LongArray(_) => TagType::LongArray,
            Tag::Object(_) => TagType::Object,
            Tag::Number(_) => TagType::Number,
            Tag::Boolean(_) => TagType::Boolean,
            Tag::Null => TagType::Null,
        }
    }

    /// Named entries of a compound or object, `None` for any other node.
    pub fn entries(&self) -> Option<&[(String, Tag)]> {
        match self {
            Tag::Compound(entries) | Tag::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a direct child by path segment.
    ///
    /// Compound and object children are addressed by key, list and array
    /// elements by decimal index. Array elements are materialized as owned
    /// scalar tags.
    pub fn child(&self, segment: &str, case_sensitive: bool) -> Option<Cow<'_, Tag>> {
        if let Some(entries) = self.entries() {
            return entries
                .iter()
                .find(|(key, _)| segment_eq(key, segment, case_sensitive))
                .map(|(_, tag)| Cow::Borrowed(tag));
        }
        let index: usize = segment.parse().ok()?;
        match self {
            Tag::List(items) => items.get(index).map(Cow::Borrowed),
            Tag::ByteArray(v) => v.get(index).map(|b| Cow::Owned(Tag::Byte(*b))),
            Tag::ShortArray(v) => v.get(index).map(|s| Cow::Owned(Tag::Short(*s))),
            Tag::IntArray(v) => v.get(index).map(|i| Cow::Owned(Tag::Int(*i))),
            Tag::LongArray(v) => v.get(index).map(|l| Cow::Owned(Tag::Long(*l))),
            _ => None,
        }
    }

    /// Depth-first walk over every node below (and excluding) this one.
    ///
    /// The visitor receives the node's key (compound key or element index)
    /// and the node itself; returning `true` stops the walk. Returns whether
    /// the walk was stopped.
    pub fn any_descendant(&self, visit: &mut dyn FnMut(&str, &Tag) -> bool) -> bool {
        match self {
            Tag::Compound(entries) | Tag::Object(entries) => entries
                .iter()
                .any(|(key, tag)| visit(key, tag) || tag.any_descendant(visit)),
            Tag::List(items) => items
                .iter()
                .enumerate()
                .any(|(i, tag)| visit(&i.to_string(), tag) || tag.any_descendant(visit)),
            Tag::ByteArray(v) => visit_scalars(v, Tag::Byte, visit),
            Tag::ShortArray(v) => visit_scalars(v, Tag::Short, visit),
            Tag::IntArray(v) => visit_scalars(v, Tag::Int, visit),
            Tag::LongArray(v) => visit_scalars(v, Tag::Long, visit),
            _ => false,
        }
    }

    /// The stringified value of a scalar node, `None` for containers.
    pub fn value_string(&self) -> Option<String> {
        match self {
            Tag::Byte(v) => Some(v.to_string()),
            Tag::Short(v) => Some(v.to_string()),
            Tag::Int(v) => Some(v.to_string()),
            Tag::Long(v) => Some(v.to_string()),
            Tag::Float(v) => Some(v.to_string()),
            Tag::Double(v) | Tag::Number(v) => Some(v.to_string()),
            Tag::String(s) => Some(s.clone()),
            Tag::Boolean(b) => Some(b.to_string()),
            Tag::Null => Some("null".to_string()),
            _ => None,
        }
    }
}

/// SNBT rendering for NBT nodes, JSON rendering for JSON-mode nodes.
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Byte(v) => write!(f, "{}b", v),
            Tag::Short(v) => write!(f, "{}s", v),
            Tag::Int(v) => write!(f, "{}", v),
            Tag::Long(v) => write!(f, "{}L", v),
            Tag::Float(v) => write!(f, "{}f", v),
            Tag::Double(v) => write!(f, "{}d", v),
            Tag::String(s) => write_quoted(f, s),
            Tag::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Tag::Compound(entries) => {
                f.write_str("{")?;
                for (i, (key, tag)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if is_bare_key(key) {
                        f.write_str(key)?;
                    } else {
                        write_quoted(f, key)?;
                    }
                    write!(f, ":{}", tag)?;
                }
                f.write_str("}")
            }
            Tag::ByteArray(v) => write_array(f, "B", v, "b"),
            Tag::ShortArray(v) => write_array(f, "S", v, "s"),
            Tag::IntArray(v) => write_array(f, "I", v, ""),
            Tag::LongArray(v) => write_array(f, "L", v, "L"),
            Tag::Object(entries) => {
                f.write_str("{")?;
                for (i, (key, tag)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ":{}", tag)?;
                }
                f.write_str("}")
            }
            Tag::Number(v) => write!(f, "{}", v),
            Tag::Boolean(b) => write!(f, "{}", b),
            Tag::Null => f.write_str("null"),
        }
    }
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            _ => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_array<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    values: &[T],
    suffix: &str,
) -> fmt::Result {
    write!(f, "[{};", prefix)?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}{}", v, suffix)?;
    }
    f.write_str("]")
}

fn visit_scalars<T: Copy>(
    values: &[T],
    wrap: fn(T) -> Tag,
    visit: &mut dyn FnMut(&str, &Tag) -> bool,
) -> bool {
    values
        .iter()
        .enumerate()
        .any(|(i, v)| visit(&i.to_string(), &wrap(*v)))
}

/// Compare a key or path segment, optionally ignoring case.
pub(crate) fn segment_eq(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
