//! Conversion of condition values into predicates.

use crate::content_type::ContentType;
use crate::error::QueryError;
use crate::search::suggest::suggest;
use crate::search::types::{TagQuery, TagQueryValue};
use crate::tag::TagType;
use serde::Deserialize;
use serde_json::Value;

/// Tag queries comparing the node at `path` with each value.
pub fn tag_path_queries(path: &[String], values: &[String]) -> Vec<TagQuery> {
    values
        .iter()
        .map(|value| TagQuery {
            path: Some(path.to_vec()),
            case_sensitive_path: true,
            value: Some(TagQueryValue::Text(value.clone())),
            ..TagQuery::default()
        })
        .collect()
}

/// Parse every value as an `nbt` literal. The first invalid one is an error.
pub fn nbt_queries(values: &[String]) -> Result<Vec<TagQuery>, QueryError> {
    values
        .iter()
        .map(|value| NbtLiteral::parse(value).map(NbtLiteral::into_query))
        .collect()
}

/// Field string queries are the literal values.
pub fn field_queries(values: &[String]) -> Vec<String> {
    values.to_vec()
}

/// Resolve content type names, suggesting close names for unknown ones.
pub fn content_types(values: &[String]) -> Result<Vec<ContentType>, QueryError> {
    values
        .iter()
        .map(|value| {
            ContentType::from_name(value).ok_or_else(|| QueryError::UnknownContentType {
                value: value.clone(),
                suggestions: suggest(value, ContentType::ALL.iter().map(|ct| ct.name())),
            })
        })
        .collect()
}

/// The two accepted spellings of an `nbt` filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtLiteral {
    /// `{"key": "Health", "tagType": "short", "value": 20}`
    Json(TagQuery),
    /// `[tagType:]key=value` or `[tagType:]a/b/c=value`
    Shorthand(TagQuery),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct JsonLiteral {
    path: Option<Vec<Value>>,
    case_sensitive_path: Option<bool>,
    key: Option<String>,
    case_sensitive_key: Option<bool>,
    tag_type: Option<String>,
    value: Option<TagQueryValue>,
    case_sensitive_value: Option<bool>,
}

impl JsonLiteral {
    fn is_empty(&self) -> bool {
        self.path.is_none()
            && self.case_sensitive_path.is_none()
            && self.key.is_none()
            && self.case_sensitive_key.is_none()
            && self.tag_type.is_none()
            && self.value.is_none()
            && self.case_sensitive_value.is_none()
    }
}

impl NbtLiteral {
    /// Try the JSON object form, falling back to the shorthand form.
    pub fn parse(literal: &str) -> Result<NbtLiteral, QueryError> {
        let invalid = |reason: String| QueryError::InvalidNbtQueryLiteral {
            literal: literal.to_string(),
            reason,
        };
        if literal.trim_start().starts_with('{') {
            let parsed: JsonLiteral =
                serde_json::from_str(literal).map_err(|e| invalid(e.to_string()))?;
            return Self::from_json(parsed).map(NbtLiteral::Json).map_err(invalid);
        }
        Self::from_shorthand(literal)
            .map(NbtLiteral::Shorthand)
            .map_err(invalid)
    }

    pub fn into_query(self) -> TagQuery {
        match self {
            NbtLiteral::Json(query) | NbtLiteral::Shorthand(query) => query,
        }
    }

    fn from_json(raw: JsonLiteral) -> Result<TagQuery, String> {
        if raw.is_empty() {
            return Err("expected at least one of path, caseSensitivePath, key, \
                        caseSensitiveKey, tagType, value, caseSensitiveValue"
                .to_string());
        }
        let path = raw
            .path
            .map(|segments| {
                segments
                    .into_iter()
                    .map(|segment| match segment {
                        Value::String(s) => Ok(s),
                        Value::Number(n) => Ok(n.to_string()),
                        other => Err(format!("invalid path segment {}", other)),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(TagQuery {
            path,
            case_sensitive_path: raw.case_sensitive_path.unwrap_or(true),
            key: raw.key,
            case_sensitive_key: raw.case_sensitive_key.unwrap_or(true),
            tag_type: parse_tag_type(raw.tag_type.as_deref())?,
            value: raw.value,
            case_sensitive_value: raw.case_sensitive_value.unwrap_or(true),
        })
    }

    fn from_shorthand(literal: &str) -> Result<TagQuery, String> {
        let (target, value) = literal
            .split_once('=')
            .ok_or_else(|| "expected a JSON object or [tagType:]key=value".to_string())?;
        let (tag_type, key) = match target.split_once(':') {
            Some((tag_type, key)) => (parse_tag_type(Some(tag_type))?, key),
            None => (None, target),
        };
        if key.is_empty() {
            return Err("missing key before '='".to_string());
        }
        let segments: Vec<String> = key.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(format!("empty segment in path '{}'", key));
        }

        let mut query = TagQuery {
            tag_type,
            value: (!value.is_empty()).then(|| TagQueryValue::from(value)),
            ..TagQuery::default()
        };
        if segments.len() == 1 {
            query.key = segments.into_iter().next();
        } else {
            query.path = Some(segments);
        }
        Ok(query)
    }
}

/// `*` and absence both mean any type.
fn parse_tag_type(name: Option<&str>) -> Result<Option<TagType>, String> {
    match name {
        None | Some("*") => Ok(None),
        Some(name) => name.parse().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tag_path_queries() {
        let queries = tag_path_queries(&strings(&["identifier"]), &strings(&["minecraft:cow"]));
        assert_eq!(
            queries,
            vec![TagQuery::at_path(&["identifier"], "minecraft:cow")]
        );
    }

    #[test]
    fn test_nbt_json_literal() {
        let literal = NbtLiteral::parse(r#"{"key": "0", "value": 0}"#).unwrap();
        assert_eq!(
            literal,
            NbtLiteral::Json(TagQuery::with_key("0", TagQueryValue::Integer(0)))
        );
    }

    #[test]
    fn test_nbt_json_literal_full() {
        let query = NbtLiteral::parse(
            r#"{"path": ["Items", 0, "Name"], "caseSensitivePath": false,
                "tagType": "STRING", "value": "minecraft:apple", "caseSensitiveValue": false}"#,
        )
        .unwrap()
        .into_query();
        assert_eq!(query.path, Some(strings(&["Items", "0", "Name"])));
        assert!(!query.case_sensitive_path);
        assert!(query.case_sensitive_key);
        assert_eq!(query.tag_type, Some(TagType::String));
        assert!(!query.case_sensitive_value);
    }

    #[test]
    fn test_nbt_json_any_type() {
        let query = NbtLiteral::parse(r#"{"key": "Health", "tagType": "*"}"#)
            .unwrap()
            .into_query();
        assert_eq!(query.tag_type, None);
        assert_eq!(query.key.as_deref(), Some("Health"));
    }

    #[test]
    fn test_nbt_json_without_recognized_fields() {
        assert!(matches!(
            NbtLiteral::parse("{}"),
            Err(QueryError::InvalidNbtQueryLiteral { .. })
        ));
        assert!(matches!(
            NbtLiteral::parse(r#"{"colour": "red"}"#),
            Err(QueryError::InvalidNbtQueryLiteral { .. })
        ));
    }

    #[test]
    fn test_nbt_bad_json() {
        match NbtLiteral::parse("{bad json") {
            Err(QueryError::InvalidNbtQueryLiteral { literal, .. }) => {
                assert_eq!(literal, "{bad json")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_nbt_shorthand_key() {
        let literal = NbtLiteral::parse("Health=20").unwrap();
        assert_eq!(literal, NbtLiteral::Shorthand(TagQuery::with_key("Health", "20")));
    }

    #[test]
    fn test_nbt_shorthand_typed_path() {
        let query = NbtLiteral::parse("byte:Items/0/Count=1").unwrap().into_query();
        assert_eq!(query.path, Some(strings(&["Items", "0", "Count"])));
        assert_eq!(query.key, None);
        assert_eq!(query.tag_type, Some(TagType::Byte));
        assert_eq!(query.value, Some(TagQueryValue::Text("1".to_string())));
    }

    #[test]
    fn test_nbt_shorthand_value_may_contain_colons() {
        let query = NbtLiteral::parse("*:identifier=minecraft:cow")
            .unwrap()
            .into_query();
        assert_eq!(query.key.as_deref(), Some("identifier"));
        assert_eq!(query.tag_type, None);
        assert_eq!(query.value.unwrap().to_string(), "minecraft:cow");
    }

    #[test]
    fn test_nbt_shorthand_empty_value_is_unconstrained() {
        let query = NbtLiteral::parse("compound:Armor=").unwrap().into_query();
        assert_eq!(query.value, None);
        assert_eq!(query.tag_type, Some(TagType::Compound));
    }

    #[test]
    fn test_nbt_shorthand_errors() {
        for literal in ["Health", "=5", "vector:Pos=1", "a//b=1"] {
            assert!(
                matches!(
                    NbtLiteral::parse(literal),
                    Err(QueryError::InvalidNbtQueryLiteral { .. })
                ),
                "{} should be rejected",
                literal
            );
        }
    }

    #[test]
    fn test_nbt_queries_stop_at_first_error() {
        let err = nbt_queries(&strings(&["a=1", "broken", "{"])).unwrap_err();
        assert!(matches!(
            err,
            QueryError::InvalidNbtQueryLiteral { literal, .. } if literal == "broken"
        ));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(
            content_types(&strings(&["map", "PLAYER"])).unwrap(),
            vec![ContentType::Map, ContentType::Player]
        );
    }

    #[test]
    fn test_unknown_content_type_suggests() {
        assert_eq!(
            content_types(&strings(&["Dat3D"])).unwrap_err(),
            QueryError::UnknownContentType {
                value: "Dat3D".to_string(),
                suggestions: vec!["Data3D".to_string()],
            }
        );
    }
}
