//! Parsed conditions, predicates and compiled queries.

use crate::content_type::ContentType;
use crate::record::CandidateRecord;
use crate::tag::TagType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A `keyword:value` condition from the search string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// Lower-cased filter keyword.
    pub keyword: String,
    /// Raw prefix symbol, when present and not `-`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Whether the condition was prefixed with `-`.
    pub negated: bool,
    pub value: String,
}

impl Condition {
    /// The prefix symbol as written (`""` when none).
    pub fn symbol(&self) -> &str {
        if self.negated {
            "-"
        } else {
            self.operator.as_deref().unwrap_or("")
        }
    }

    /// Grouping key: prefix symbol followed by keyword, e.g. `-typeid`.
    pub fn composite_key(&self) -> String {
        format!("{}{}", self.symbol(), self.keyword)
    }
}

/// A free-text part of the search string. A leading operator symbol is kept
/// as part of the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeTextSegment {
    pub text: String,
}

/// Output of the condition parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSearch {
    pub conditions: Vec<Condition>,
    pub free_text: Vec<FreeTextSegment>,
}

/// Set operator selected by a prefix symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrefixOperator {
    AnyOf,
    NoneOf,
    OneOf,
    AllOf,
}

impl PrefixOperator {
    pub const ALL: [PrefixOperator; 4] = [
        PrefixOperator::AnyOf,
        PrefixOperator::NoneOf,
        PrefixOperator::OneOf,
        PrefixOperator::AllOf,
    ];

    /// Interpret a prefix symbol; the empty string is the default `AnyOf`.
    pub fn from_symbol(symbol: &str) -> Option<PrefixOperator> {
        match symbol {
            "" | "|" => Some(PrefixOperator::AnyOf),
            "-" => Some(PrefixOperator::NoneOf),
            "^" => Some(PrefixOperator::OneOf),
            "&" => Some(PrefixOperator::AllOf),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            PrefixOperator::AnyOf => "|",
            PrefixOperator::NoneOf => "-",
            PrefixOperator::OneOf => "^",
            PrefixOperator::AllOf => "&",
        }
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A value a tag node is compared against, after stringification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagQueryValue {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for TagQueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagQueryValue::Integer(i) => write!(f, "{}", i),
            TagQueryValue::Unsigned(u) => write!(f, "{}", u),
            TagQueryValue::Float(x) => write!(f, "{}", x),
            TagQueryValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TagQueryValue {
    fn from(s: &str) -> Self {
        TagQueryValue::Text(s.to_string())
    }
}

fn is_true(b: &bool) -> bool {
    *b
}

/// A predicate against one node of a decoded tag tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagQuery {
    /// Compound keys and list indices from the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    #[serde(skip_serializing_if = "is_true")]
    pub case_sensitive_path: bool,
    /// Key of a node at any depth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "is_true")]
    pub case_sensitive_key: bool,
    /// `None` matches any type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<TagType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<TagQueryValue>,
    #[serde(skip_serializing_if = "is_true")]
    pub case_sensitive_value: bool,
}

impl Default for TagQuery {
    fn default() -> Self {
        Self {
            path: None,
            case_sensitive_path: true,
            key: None,
            case_sensitive_key: true,
            tag_type: None,
            value: None,
            case_sensitive_value: true,
        }
    }
}

impl TagQuery {
    /// Match the node at `path` against `value`.
    pub fn at_path(path: &[&str], value: impl Into<TagQueryValue>) -> Self {
        Self {
            path: Some(path.iter().map(|s| s.to_string()).collect()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Match any node keyed `key` against `value`.
    pub fn with_key(key: &str, value: impl Into<TagQueryValue>) -> Self {
        Self {
            key: Some(key.to_string()),
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

/// Leaf predicates grouped by set operator.
///
/// Empty buckets are absent: they impose no constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPredicate<T> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub none_of: Vec<T>,
}

impl<T> Default for SetPredicate<T> {
    fn default() -> Self {
        Self {
            any_of: Vec::new(),
            one_of: Vec::new(),
            all_of: Vec::new(),
            none_of: Vec::new(),
        }
    }
}

impl<T> SetPredicate<T> {
    pub fn is_empty(&self) -> bool {
        self.any_of.is_empty()
            && self.one_of.is_empty()
            && self.all_of.is_empty()
            && self.none_of.is_empty()
    }

    pub fn bucket_mut(&mut self, op: PrefixOperator) -> &mut Vec<T> {
        match op {
            PrefixOperator::AnyOf => &mut self.any_of,
            PrefixOperator::OneOf => &mut self.one_of,
            PrefixOperator::AllOf => &mut self.all_of,
            PrefixOperator::NoneOf => &mut self.none_of,
        }
    }

    pub fn push(&mut self, op: PrefixOperator, item: T) {
        self.bucket_mut(op).push(item);
    }
}

/// A validated query ready for evaluation.
///
/// Every populated dimension must pass for a record to match; a query with
/// no populated dimension matches everything.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<ContentType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_content_types: Option<Vec<ContentType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_key_contents: Option<SetPredicate<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_key_contents: Option<SetPredicate<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_value_contents: Option<SetPredicate<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents_string_contents: Option<SetPredicate<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbt_tags: Option<SetPredicate<TagQuery>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_data_fields: BTreeMap<String, SetPredicate<String>>,
    /// Whether textual fields compare case-sensitively.
    pub case_sensitive: bool,
    #[serde(skip)]
    pub search_targets: Vec<CandidateRecord>,
}

impl CompiledQuery {
    pub fn with_targets(mut self, targets: Vec<CandidateRecord>) -> Self {
        self.search_targets = targets;
        self
    }

    /// True when no dimension constrains the result.
    pub fn is_pass_through(&self) -> bool {
        self.content_types.is_none()
            && self.exclude_content_types.is_none()
            && self.display_key_contents.is_none()
            && self.raw_key_contents.is_none()
            && self.raw_value_contents.is_none()
            && self.contents_string_contents.is_none()
            && self.nbt_tags.is_none()
            && self.custom_data_fields.is_empty()
    }

    /// Whether evaluation needs decoded tag trees.
    pub fn needs_tags(&self) -> bool {
        self.nbt_tags.is_some()
    }

    /// Whether evaluation reads the `contents` text.
    pub fn needs_contents(&self) -> bool {
        self.contents_string_contents.is_some()
    }
}
