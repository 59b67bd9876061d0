//! Splits a search string into conditions and free text.
//!
//! Tokens are separated by whitespace outside of quotes. Single and double
//! quotes group text; inside a quoted span the other quote character is
//! literal and the same one can be escaped with a backslash. A token of the
//! form `[op]keyword:value` (with the keyword outside any quotes) is a
//! condition, anything else is free text. Parsing never fails: an
//! unterminated quote runs to the end of the input.

use crate::search::types::{Condition, FreeTextSegment, ParsedSearch};
use regex::Regex;
use std::sync::LazyLock;

static CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<op>[|&^-])?(?P<keyword>[A-Za-z_]+):(?P<value>.*)$").unwrap()
});

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Split into raw tokens, quotes and escapes left in place.
fn split_tokens(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == '\\' && chars.peek() == Some(&q) {
                    current.push(q);
                    chars.next();
                } else if ch == q {
                    quote = None;
                }
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                if is_quote(ch) {
                    quote = Some(ch);
                }
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Remove quoting from a raw token. Returns the text and whether any quoted
/// span was present.
fn unquote(raw: &str) -> (String, bool) {
    let mut out = String::with_capacity(raw.len());
    let mut quoted = false;
    let mut quote: Option<char> = None;
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) if ch == '\\' && chars.peek() == Some(&q) => {
                out.push(q);
                chars.next();
            }
            Some(q) if ch == q => quote = None,
            Some(_) => out.push(ch),
            None if is_quote(ch) => {
                quote = Some(ch);
                quoted = true;
            }
            None => out.push(ch),
        }
    }
    (out, quoted)
}

/// Parse a search string.
pub fn parse_search(input: &str) -> ParsedSearch {
    let mut parsed = ParsedSearch::default();

    for raw in split_tokens(input) {
        if let Some(caps) = CONDITION.captures(&raw) {
            let (value, quoted) = unquote(&caps["value"]);
            if !value.is_empty() || quoted {
                let op = caps.name("op").map(|m| m.as_str());
                parsed.conditions.push(Condition {
                    keyword: caps["keyword"].to_lowercase(),
                    operator: op.filter(|op| *op != "-").map(str::to_string),
                    negated: op == Some("-"),
                    value,
                });
                continue;
            }
        }
        let (text, _) = unquote(&raw);
        if !text.is_empty() {
            parsed.free_text.push(FreeTextSegment { text });
        }
    }

    log::trace!(
        "parsed {} conditions and {} free-text segments",
        parsed.conditions.len(),
        parsed.free_text.len()
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cond(keyword: &str, operator: Option<&str>, negated: bool, value: &str) -> Condition {
        Condition {
            keyword: keyword.to_string(),
            operator: operator.map(str::to_string),
            negated,
            value: value.to_string(),
        }
    }

    fn texts(parsed: &ParsedSearch) -> Vec<&str> {
        parsed.free_text.iter().map(|s| s.text.as_str()).collect()
    }

    // -- Tokenizer --

    #[test]
    fn test_split_on_whitespace() {
        assert_eq!(split_tokens("  a  b\tc\n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_keeps_quoted_whitespace() {
        assert_eq!(
            split_tokens(r#"name:"Steve Jobs" x"#),
            vec![r#"name:"Steve Jobs""#, "x"]
        );
    }

    #[test]
    fn test_split_other_quote_inside_span() {
        assert_eq!(split_tokens(r#"'say "hi" now' b"#), vec![r#"'say "hi" now'"#, "b"]);
    }

    #[test]
    fn test_split_escaped_same_quote() {
        assert_eq!(split_tokens(r#""a \" b" c"#), vec![r#""a \" b""#, "c"]);
    }

    #[test]
    fn test_split_unterminated_quote() {
        assert_eq!(split_tokens(r#"a "b c"#), vec!["a", r#""b c"#]);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a \" b""#), (r#"a " b"#.to_string(), true));
        assert_eq!(unquote("plain"), ("plain".to_string(), false));
        assert_eq!(unquote(r#""""#), (String::new(), true));
        assert_eq!(unquote(r#"'it"s'"#), (r#"it"s"#.to_string(), true));
    }

    // -- Conditions --

    #[test]
    fn test_parse_plain_condition() {
        let parsed = parse_search("typeid:minecraft:zombie");
        assert_eq!(
            parsed.conditions,
            vec![cond("typeid", None, false, "minecraft:zombie")]
        );
        assert!(parsed.free_text.is_empty());
    }

    #[test]
    fn test_parse_prefixed_conditions() {
        let parsed = parse_search("-typeid:cow ^name:Bob &uuid:5 |dbkey:map");
        assert_eq!(
            parsed.conditions,
            vec![
                cond("typeid", None, true, "cow"),
                cond("name", Some("^"), false, "Bob"),
                cond("uuid", Some("&"), false, "5"),
                cond("dbkey", Some("|"), false, "map"),
            ]
        );
    }

    #[test]
    fn test_parse_keyword_lowercased() {
        let parsed = parse_search("TypeID:cow");
        assert_eq!(parsed.conditions[0].keyword, "typeid");
    }

    #[test]
    fn test_parse_quoted_value() {
        let parsed = parse_search(r#"name:"Steve Jobs""#);
        assert_eq!(parsed.conditions, vec![cond("name", None, false, "Steve Jobs")]);
    }

    #[test]
    fn test_parse_explicit_empty_value() {
        let parsed = parse_search(r#"name:"""#);
        assert_eq!(parsed.conditions, vec![cond("name", None, false, "")]);
    }

    #[test]
    fn test_parse_bare_keyword_is_free_text() {
        let parsed = parse_search("name:");
        assert!(parsed.conditions.is_empty());
        assert_eq!(texts(&parsed), vec!["name:"]);
    }

    #[test]
    fn test_quoted_keyword_is_free_text() {
        let parsed = parse_search(r#""name:bob""#);
        assert!(parsed.conditions.is_empty());
        assert_eq!(texts(&parsed), vec!["name:bob"]);
    }

    #[test]
    fn test_unknown_symbol_keeps_token_as_free_text() {
        let parsed = parse_search("!name:bob");
        assert!(parsed.conditions.is_empty());
        assert_eq!(texts(&parsed), vec!["!name:bob"]);
    }

    // -- Free text --

    #[test]
    fn test_free_text_keeps_operator_prefix() {
        let parsed = parse_search(r#"zombie -"iron golem" ^a &b"#);
        assert_eq!(texts(&parsed), vec!["zombie", "-iron golem", "^a", "&b"]);
    }

    #[test]
    fn test_mixed_conditions_and_free_text() {
        let parsed = parse_search("chest nbt:Items/0/Count=1 -type:Data3D");
        assert_eq!(texts(&parsed), vec!["chest"]);
        assert_eq!(
            parsed.conditions,
            vec![
                cond("nbt", None, false, "Items/0/Count=1"),
                cond("type", None, true, "Data3D"),
            ]
        );
    }

    #[test]
    fn test_json_value_with_spaces_quoted() {
        let parsed = parse_search(r#"nbt:'{"key": "Health", "value": 20}'"#);
        assert_eq!(
            parsed.conditions,
            vec![cond("nbt", None, false, r#"{"key": "Health", "value": 20}"#)]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_search("   "), ParsedSearch::default());
    }

    #[test]
    fn test_unterminated_quote_best_effort() {
        let parsed = parse_search(r#"name:"Steve"#);
        assert_eq!(parsed.conditions, vec![cond("name", None, false, "Steve")]);
    }
}
