//! Evaluation of compiled queries against candidate records.

use crate::record::CandidateRecord;
use crate::search::types::{CompiledQuery, SetPredicate, TagQuery};
use crate::tag::{DecoderRegistry, Tag, segment_eq};
use std::borrow::Cow;

impl<T> SetPredicate<T> {
    /// Combine the atomic `test` over the four buckets.
    ///
    /// anyOf needs at least one hit, allOf every item, oneOf exactly one,
    /// noneOf no hit. Empty buckets impose nothing.
    pub fn evaluate(&self, mut test: impl FnMut(&T) -> bool) -> bool {
        (self.any_of.is_empty() || self.any_of.iter().any(&mut test))
            && (self.all_of.is_empty() || self.all_of.iter().all(&mut test))
            && (self.one_of.is_empty() || self.one_of.iter().filter(|&t| test(t)).count() == 1)
            && !self.none_of.iter().any(&mut test)
    }
}

fn contains_text(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Follow `path` from `root`. An empty path resolves to the root.
fn resolve<'a>(root: &'a Tag, path: &[String], case_sensitive: bool) -> Option<Cow<'a, Tag>> {
    let mut current = Cow::Borrowed(root);
    for segment in path {
        current = match current {
            Cow::Borrowed(tag) => tag.child(segment, case_sensitive)?,
            Cow::Owned(tag) => Cow::Owned(tag.child(segment, case_sensitive)?.into_owned()),
        };
    }
    Some(current)
}

/// The single child of a one-entry compound or object root.
fn unwrap_root(root: &Tag) -> Option<&Tag> {
    match root.entries()? {
        [(_, inner)] => Some(inner),
        _ => None,
    }
}

/// Type and value constraints of a query against one node.
fn node_matches(node: &Tag, query: &TagQuery) -> bool {
    if query.tag_type.is_some_and(|t| node.tag_type() != t) {
        return false;
    }
    match &query.value {
        None => true,
        Some(expected) => node.value_string().is_some_and(|actual| {
            segment_eq(&actual, &expected.to_string(), query.case_sensitive_value)
        }),
    }
}

/// Whether any node of the tree satisfies the query.
pub fn tag_matches(root: &Tag, query: &TagQuery) -> bool {
    if let Some(path) = &query.path {
        if let Some(key) = &query.key {
            let last_matches = path
                .last()
                .is_some_and(|last| segment_eq(last, key, query.case_sensitive_key));
            if !last_matches {
                return false;
            }
        }
        let at = |tree: &Tag| {
            resolve(tree, path, query.case_sensitive_path)
                .is_some_and(|node| node_matches(&node, query))
        };
        let under = |tree: &Tag| at(tree) || unwrap_root(tree).is_some_and(&at);
        if under(root) {
            return true;
        }
        // Concatenated roots decode to a list; each element is a root of its own.
        return matches!(root, Tag::List(roots) if roots.iter().any(&under));
    }

    match &query.key {
        Some(key) => root.any_descendant(&mut |node_key, node| {
            segment_eq(node_key, key, query.case_sensitive_key) && node_matches(node, query)
        }),
        None => {
            node_matches(root, query) || root.any_descendant(&mut |_, node| node_matches(node, query))
        }
    }
}

impl CompiledQuery {
    /// Decode and dump what this query will look at, once per record.
    pub fn prepare(&self, record: &CandidateRecord, decoders: &dyn DecoderRegistry) {
        if self.needs_tags() || self.needs_contents() {
            record.decode_with(decoders);
        }
        if self.needs_contents() {
            record.dump_contents();
        }
    }

    fn text_matches(&self, predicate: &Option<SetPredicate<String>>, field: &str) -> bool {
        predicate.as_ref().is_none_or(|p| {
            p.evaluate(|needle| contains_text(field, needle, self.case_sensitive))
        })
    }

    fn bytes_match(predicate: &Option<SetPredicate<String>>, field: &[u8]) -> bool {
        predicate
            .as_ref()
            .is_none_or(|p| p.evaluate(|needle| contains_bytes(field, needle.as_bytes())))
    }

    /// Whether a record passes every populated dimension.
    ///
    /// Tag predicates see only an already decoded tree; a record without one
    /// fails every tag atom.
    pub fn matches(&self, record: &CandidateRecord) -> bool {
        if let Some(types) = &self.content_types {
            if !types.contains(&record.content_type) {
                return false;
            }
        }
        if let Some(types) = &self.exclude_content_types {
            if types.contains(&record.content_type) {
                return false;
            }
        }
        if !self.text_matches(&self.display_key_contents, &record.display_key) {
            return false;
        }
        if !Self::bytes_match(&self.raw_key_contents, &record.key) {
            return false;
        }
        if !Self::bytes_match(
            &self.raw_value_contents,
            record.raw_value.as_deref().unwrap_or_default(),
        ) {
            return false;
        }
        if let Some(predicate) = &self.contents_string_contents {
            let passes = predicate.evaluate(|needle| {
                record
                    .contents()
                    .any(|text| contains_text(text, needle, self.case_sensitive))
            });
            if !passes {
                return false;
            }
        }
        for (name, predicate) in &self.custom_data_fields {
            let field = record.custom_field(name);
            if !predicate.evaluate(|needle| contains_text(field, needle, self.case_sensitive)) {
                return false;
            }
        }
        if let Some(predicate) = &self.nbt_tags {
            let tree = record.decoded_value();
            if !predicate.evaluate(|query| tree.is_some_and(|tree| tag_matches(tree, query))) {
                return false;
            }
        }
        true
    }

    /// Lazily evaluate the query over its own search targets.
    pub fn results(&self) -> impl Iterator<Item = &CandidateRecord> + Clone {
        evaluate(self, &self.search_targets)
    }
}

/// Lazily filter `records` through `query`, preserving order.
///
/// The returned iterator is cloneable when the source is, and a clone
/// re-evaluates from the start.
pub fn evaluate<'a, I>(
    query: &'a CompiledQuery,
    records: I,
) -> impl Iterator<Item = &'a CandidateRecord> + Clone
where
    I: IntoIterator<Item = &'a CandidateRecord>,
    I::IntoIter: Clone,
{
    records.into_iter().filter(move |record| {
        let matched = query.matches(record);
        log::trace!("{} -> {}", record.display_key, matched);
        matched
    })
}

/// Like [`evaluate`], decoding each record on demand first.
pub fn evaluate_decoding<'a, I>(
    query: &'a CompiledQuery,
    records: I,
    decoders: &'a dyn DecoderRegistry,
) -> impl Iterator<Item = &'a CandidateRecord> + Clone
where
    I: IntoIterator<Item = &'a CandidateRecord>,
    I::IntoIter: Clone,
{
    evaluate(
        query,
        records.into_iter().inspect(move |record| query.prepare(record, decoders)),
    )
}
