//! Screen definitions and user configuration.
//!
//! A screen is one searchable collection of records: the content types it
//! shows, the filter keywords it recognizes, and the operators each keyword
//! accepts. The built-in presets cover the usual world browser views; more
//! can be declared in the config file.

use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::search::PrefixOperator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Record field a string keyword searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTarget {
    DisplayKey,
    /// Raw key bytes.
    RawKey,
    /// Raw value bytes.
    RawValue,
    /// Searchable contents, including the dumped tag tree.
    Contents,
    /// A named custom data field.
    Custom(String),
}

/// What a filter keyword's values turn into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeywordKind {
    /// Tag query at a fixed path, the value compared for equality.
    TagPath { path: Vec<String> },
    /// Freeform tag query literal.
    NbtLiteral,
    /// Substring match against a record field.
    Field { field: FieldTarget },
    /// Content type allow/deny list.
    ContentType,
}

fn all_operators() -> Vec<PrefixOperator> {
    PrefixOperator::ALL.to_vec()
}

/// A filter keyword recognized by a screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSpec {
    pub keyword: String,
    pub kind: KeywordKind,
    #[serde(default = "all_operators")]
    pub operators: Vec<PrefixOperator>,
}

impl KeywordSpec {
    pub fn supports(&self, op: PrefixOperator) -> bool {
        self.operators.contains(&op)
    }
}

/// Declarative configuration of one search screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub name: String,
    /// Content types the screen's candidates are built from.
    pub content_types: Vec<ContentType>,
    /// Whether textual fields compare case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,
    pub keywords: Vec<KeywordSpec>,
}

impl ScreenConfig {
    pub fn builder(name: impl Into<String>) -> ScreenConfigBuilder {
        ScreenConfigBuilder {
            config: ScreenConfig {
                name: name.into(),
                content_types: ContentType::ALL.to_vec(),
                case_sensitive: false,
                keywords: Vec::new(),
            },
        }
    }

    /// Look up a keyword (already lower-cased).
    pub fn keyword(&self, keyword: &str) -> Option<&KeywordSpec> {
        self.keywords.iter().find(|k| k.keyword == keyword)
    }

    pub fn keyword_names(&self) -> Vec<String> {
        self.keywords.iter().map(|k| k.keyword.clone()).collect()
    }

    /// Every record type, searchable by key, tag and contents.
    pub fn all() -> Self {
        Self::builder("all")
            .field("dbkey", FieldTarget::DisplayKey)
            .nbt("nbt")
            .content_type("type")
            .field("contents", FieldTarget::Contents)
            .build()
    }

    pub fn players() -> Self {
        Self::builder("players")
            .content_types(&[ContentType::Player, ContentType::PlayerClient])
            .field("dbkey", FieldTarget::DisplayKey)
            .nbt("nbt")
            .content_type("type")
            .field("contents", FieldTarget::Contents)
            .tag_path("name", &["CustomName"])
            .tag_path("uuid", &["UniqueID"])
            .field("playerid", FieldTarget::Custom("playerid".to_string()))
            .build()
    }

    pub fn entities() -> Self {
        Self::builder("entities")
            .content_types(&[ContentType::Entity, ContentType::ActorPrefix])
            .tag_path("typeid", &["identifier"])
            .tag_path("name", &["CustomName"])
            .tag_path("uuid", &["UniqueID"])
            .nbt("nbt")
            .build()
    }

    pub fn maps() -> Self {
        Self::builder("maps")
            .content_types(&[ContentType::Map])
            .field("dbkey", FieldTarget::DisplayKey)
            .nbt("nbt")
            .field("contents", FieldTarget::Contents)
            .field("mapid", FieldTarget::Custom("mapid".to_string()))
            .build()
    }

    pub fn ticks() -> Self {
        Self::builder("ticks")
            .content_types(&[ContentType::PendingTicks, ContentType::RandomTicks])
            .field("dbkey", FieldTarget::DisplayKey)
            .nbt("nbt")
            .field("contents", FieldTarget::Contents)
            .field("chunk", FieldTarget::Custom("chunk".to_string()))
            .build()
    }

    /// The built-in screens.
    pub fn presets() -> Vec<ScreenConfig> {
        vec![
            Self::all(),
            Self::players(),
            Self::entities(),
            Self::maps(),
            Self::ticks(),
        ]
    }
}

/// Builder for [`ScreenConfig`]. Content types default to all of them.
#[derive(Debug, Clone)]
pub struct ScreenConfigBuilder {
    config: ScreenConfig,
}

impl ScreenConfigBuilder {
    pub fn content_types(mut self, types: &[ContentType]) -> Self {
        self.config.content_types = types.to_vec();
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.config.case_sensitive = case_sensitive;
        self
    }

    /// Add a keyword with an explicit operator subset.
    pub fn keyword(
        mut self,
        keyword: &str,
        kind: KeywordKind,
        operators: &[PrefixOperator],
    ) -> Self {
        self.config.keywords.push(KeywordSpec {
            keyword: keyword.to_lowercase(),
            kind,
            operators: operators.to_vec(),
        });
        self
    }

    pub fn tag_path(self, keyword: &str, path: &[&str]) -> Self {
        let path = path.iter().map(|s| s.to_string()).collect();
        self.keyword(keyword, KeywordKind::TagPath { path }, &PrefixOperator::ALL)
    }

    pub fn nbt(self, keyword: &str) -> Self {
        self.keyword(keyword, KeywordKind::NbtLiteral, &PrefixOperator::ALL)
    }

    pub fn field(self, keyword: &str, field: FieldTarget) -> Self {
        self.keyword(keyword, KeywordKind::Field { field }, &PrefixOperator::ALL)
    }

    /// Content type filter; only `|` and `-` apply.
    pub fn content_type(self, keyword: &str) -> Self {
        self.keyword(
            keyword,
            KeywordKind::ContentType,
            &[PrefixOperator::AnyOf, PrefixOperator::NoneOf],
        )
    }

    pub fn build(self) -> ScreenConfig {
        self.config
    }
}

/// User configuration, read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen used when none is given on the command line.
    pub default_screen: String,
    /// Overrides every screen's case sensitivity when set.
    pub case_sensitive: Option<bool>,
    /// Wall-clock budget of one materializer batch.
    pub batch_millis: u64,
    /// Additional screens; a screen named like a preset replaces it.
    pub screens: Vec<ScreenConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_screen: "all".to_string(),
            case_sensitive: None,
            batch_millis: 10,
            screens: Vec::new(),
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/bedrock-query/config.toml` or the platform equivalent.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("bedrock-query")
            .join("config.toml")
    }

    /// Load the config file.
    ///
    /// An explicitly given path must exist. A missing file at the default
    /// location yields the default config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };
        if !path.is_file() {
            if explicit {
                return Err(Error::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        for screen in &config.screens {
            if screen.keywords.is_empty() {
                return Err(Error::ConfigError(format!(
                    "Screen '{}' declares no keywords",
                    screen.name
                )));
            }
        }
        Ok(config)
    }

    /// Presets followed by user screens, user definitions replacing presets
    /// of the same name.
    pub fn screens(&self) -> Vec<ScreenConfig> {
        let mut screens = ScreenConfig::presets();
        for screen in &self.screens {
            match screens.iter_mut().find(|s| s.name == screen.name) {
                Some(existing) => *existing = screen.clone(),
                None => screens.push(screen.clone()),
            }
        }
        if let Some(case_sensitive) = self.case_sensitive {
            for screen in &mut screens {
                screen.case_sensitive = case_sensitive;
            }
        }
        screens
    }

    /// Resolve a screen by name, falling back to the default screen.
    pub fn screen(&self, name: Option<&str>) -> Result<ScreenConfig> {
        let name = name.unwrap_or(&self.default_screen);
        self.screens()
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownScreen(name.to_string()))
    }
}
