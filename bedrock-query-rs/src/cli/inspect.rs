//! Commands that inspect queries, screens and keys without a dump.

use crate::cli::args::{ClassifyArgs, ExplainArgs, ParseArgs};
use crate::cli::output::Output;
use crate::config::{Config, FieldTarget, KeywordKind, KeywordSpec};
use crate::content_type::{ContentType, classify_key, display_key};
use crate::error::Result;
use crate::search::{CompiledQuery, ParsedSearch, compile, parse_search};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub query: String,
    pub parsed: ParsedSearch,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub screen: String,
    pub compiled: CompiledQuery,
}

#[derive(Debug, Serialize)]
pub struct ScreensResponse {
    pub screens: Vec<ScreenInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenInfo {
    pub name: String,
    pub case_sensitive: bool,
    pub content_types: Vec<ContentType>,
    pub keywords: Vec<KeywordInfo>,
}

#[derive(Debug, Serialize)]
pub struct KeywordInfo {
    pub keyword: String,
    pub target: String,
    pub operators: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub content_type: ContentType,
    pub display_key: String,
}

pub fn parse(args: &ParseArgs, output: &Output) -> Result<()> {
    output.print(&ParseResponse {
        query: args.query.clone(),
        parsed: parse_search(&args.query),
    })
}

pub fn explain(config: &Config, args: &ExplainArgs, output: &Output) -> Result<()> {
    let screen = config.screen(args.screen.as_deref())?;
    let compiled = compile(&args.query, &screen, Vec::new())?;
    output.print(&ExplainResponse {
        screen: screen.name,
        compiled,
    })
}

/// Short description of what a keyword searches.
fn describe_target(spec: &KeywordSpec) -> String {
    match &spec.kind {
        KeywordKind::TagPath { path } => format!("tag {}", path.join("/")),
        KeywordKind::NbtLiteral => "tag query".to_string(),
        KeywordKind::ContentType => "content type".to_string(),
        KeywordKind::Field { field } => match field {
            FieldTarget::DisplayKey => "display key".to_string(),
            FieldTarget::RawKey => "raw key".to_string(),
            FieldTarget::RawValue => "raw value".to_string(),
            FieldTarget::Contents => "contents".to_string(),
            FieldTarget::Custom(name) => format!("field {}", name),
        },
    }
}

pub fn screens(config: &Config, output: &Output) -> Result<()> {
    let screens = config
        .screens()
        .into_iter()
        .map(|screen| ScreenInfo {
            keywords: screen
                .keywords
                .iter()
                .map(|spec| KeywordInfo {
                    keyword: spec.keyword.clone(),
                    target: describe_target(spec),
                    operators: spec.operators.iter().map(|op| op.symbol()).collect(),
                })
                .collect(),
            name: screen.name,
            case_sensitive: screen.case_sensitive,
            content_types: screen.content_types,
        })
        .collect();
    output.print(&ScreensResponse { screens })
}

pub fn classify(args: &ClassifyArgs, output: &Output) -> Result<()> {
    let key = STANDARD.decode(args.key.trim())?;
    output.print(&ClassifyResponse {
        content_type: classify_key(&key),
        display_key: display_key(&key),
    })
}
