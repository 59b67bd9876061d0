//! Validation and assembly of parsed searches into compiled queries.

use crate::config::{FieldTarget, KeywordKind, ScreenConfig};
use crate::error::QueryError;
use crate::record::CandidateRecord;
use crate::search::builders;
use crate::search::parser::parse_search;
use crate::search::types::{CompiledQuery, ParsedSearch, PrefixOperator, SetPredicate};

/// Conditions sharing one `${op}${keyword}` composite key.
struct ConditionGroup<'a> {
    symbol: &'a str,
    keyword: &'a str,
    values: Vec<String>,
}

fn group_conditions(parsed: &ParsedSearch) -> Vec<ConditionGroup<'_>> {
    let mut groups: Vec<(String, ConditionGroup<'_>)> = Vec::new();
    for condition in &parsed.conditions {
        let key = condition.composite_key();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.values.push(condition.value.clone()),
            None => groups.push((
                key,
                ConditionGroup {
                    symbol: condition.symbol(),
                    keyword: &condition.keyword,
                    values: vec![condition.value.clone()],
                },
            )),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

fn slot<T>(predicate: &mut Option<SetPredicate<T>>) -> &mut SetPredicate<T> {
    predicate.get_or_insert_with(SetPredicate::default)
}

/// Split an operator symbol off a free-text segment. A segment that is only
/// a symbol is literal text.
fn split_free_text(text: &str) -> (PrefixOperator, &str) {
    let mut chars = text.chars();
    if let Some(first) = chars.next() {
        let rest = chars.as_str();
        if !rest.is_empty() {
            if let Some(op) = PrefixOperator::from_symbol(&first.to_string()) {
                return (op, rest);
            }
        }
    }
    (PrefixOperator::AnyOf, text)
}

/// Validate and assemble a parsed search for a screen.
///
/// Every composite key is validated before any value is built, so an
/// unknown keyword is reported ahead of an invalid value. The first error
/// aborts assembly.
pub fn assemble(
    parsed: &ParsedSearch,
    screen: &ScreenConfig,
    targets: Vec<CandidateRecord>,
) -> Result<CompiledQuery, QueryError> {
    let groups = group_conditions(parsed);

    let mut validated = Vec::with_capacity(groups.len());
    for group in &groups {
        let op = PrefixOperator::from_symbol(group.symbol).ok_or_else(|| {
            QueryError::UnknownOperatorSymbol {
                symbol: group.symbol.to_string(),
                keyword: group.keyword.to_string(),
            }
        })?;
        let spec = screen
            .keyword(group.keyword)
            .ok_or_else(|| QueryError::UnknownFilterKeyword {
                keyword: group.keyword.to_string(),
                valid: screen.keyword_names(),
            })?;
        if !spec.supports(op) {
            return Err(QueryError::UnsupportedOperatorForKeyword {
                symbol: op.symbol().to_string(),
                keyword: group.keyword.to_string(),
            });
        }
        validated.push((op, spec, &group.values));
    }

    let mut query = CompiledQuery {
        case_sensitive: screen.case_sensitive,
        ..CompiledQuery::default()
    };

    for (op, spec, values) in validated {
        match &spec.kind {
            KeywordKind::TagPath { path } => slot(&mut query.nbt_tags)
                .bucket_mut(op)
                .extend(builders::tag_path_queries(path, values)),
            KeywordKind::NbtLiteral => slot(&mut query.nbt_tags)
                .bucket_mut(op)
                .extend(builders::nbt_queries(values)?),
            KeywordKind::Field { field } => {
                let target = match field {
                    FieldTarget::DisplayKey => slot(&mut query.display_key_contents),
                    FieldTarget::RawKey => slot(&mut query.raw_key_contents),
                    FieldTarget::RawValue => slot(&mut query.raw_value_contents),
                    FieldTarget::Contents => slot(&mut query.contents_string_contents),
                    FieldTarget::Custom(name) => {
                        query.custom_data_fields.entry(name.clone()).or_default()
                    }
                };
                target.bucket_mut(op).extend(builders::field_queries(values));
            }
            KeywordKind::ContentType => {
                let types = builders::content_types(values)?;
                let list = match op {
                    PrefixOperator::AnyOf => &mut query.content_types,
                    PrefixOperator::NoneOf => &mut query.exclude_content_types,
                    _ => {
                        return Err(QueryError::UnsupportedOperatorForKeyword {
                            symbol: op.symbol().to_string(),
                            keyword: spec.keyword.clone(),
                        });
                    }
                };
                list.get_or_insert_with(Vec::new).extend(types);
            }
        }
    }

    for segment in &parsed.free_text {
        let (op, text) = split_free_text(&segment.text);
        let contents = slot(&mut query.contents_string_contents);
        if op == PrefixOperator::NoneOf {
            // Each negated segment replaces the previous one.
            contents.none_of = vec![text.to_string()];
        } else {
            contents.push(op, text.to_string());
        }
    }

    log::debug!(
        "assembled query for screen '{}': {}",
        screen.name,
        serde_json::to_string(&query).unwrap_or_default()
    );
    Ok(query.with_targets(targets))
}

/// Parse and assemble in one step.
pub fn compile(
    input: &str,
    screen: &ScreenConfig,
    targets: Vec<CandidateRecord>,
) -> Result<CompiledQuery, QueryError> {
    assemble(&parse_search(input), screen, targets)
}
