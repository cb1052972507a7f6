//! Generator configuration.
//!
//! Every option has a serde default, so a partial JSON document (or none at
//! all) yields a usable configuration.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{DocError, Result};
use crate::model::DeclarationKind;
use crate::render::Columns;

/// Glob used by folder and workspace scopes when none is configured.
pub const DEFAULT_FILE_GLOB: &str = "**/*.{js,jsx,mjs,cjs,ts,tsx,mts,cts}";

/// Substitution token replaced by the class name in constructor descriptions.
pub const CLASS_NAME_TOKEN: &str = "{Object}";

/// Configuration for header synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Emit type values (`{T}`) on tag lines.
    #[serde(default = "default_true")]
    pub include_types: bool,

    #[serde(default = "default_true")]
    pub include_export: bool,

    #[serde(default = "default_true")]
    pub include_async: bool,

    /// Emit `@public` / `@protected` / `@private`.
    #[serde(default = "default_true")]
    pub include_visibility: bool,

    #[serde(default = "default_true")]
    pub include_static: bool,

    #[serde(default = "default_true")]
    pub include_abstract: bool,

    #[serde(default = "default_true")]
    pub include_readonly: bool,

    /// Emit `@returns` for callables that return a value.
    #[serde(default = "default_true")]
    pub include_return: bool,

    /// Default text of the description region.
    #[serde(default = "default_description_placeholder")]
    pub description_placeholder: String,

    #[serde(default)]
    pub description_style: DescriptionStyle,

    /// Value of the `@author` line; omitted when unset.
    #[serde(default)]
    pub author: Option<String>,

    /// strftime pattern of the `@date` line; omitted when unset.
    #[serde(default)]
    pub date_format: Option<String>,

    /// Render one-line headers as `/** ... */`.
    #[serde(default)]
    pub single_line_comments: bool,

    #[serde(default = "default_true")]
    pub empty_line_after_header: bool,

    /// Document variables initialized with a function as methods.
    #[serde(default = "default_true")]
    pub function_variables_as_functions: bool,

    /// Constructor description; `{Object}` is replaced by the class name.
    #[serde(default = "default_description_for_constructors")]
    pub description_for_constructors: String,

    /// Wrap union and intersection types in parentheses.
    #[serde(default = "default_true")]
    pub include_parenthesis_for_multiple_types: bool,

    #[serde(default)]
    pub custom_tags: Vec<CustomTag>,

    /// Column where tag values start; `0` disables alignment.
    #[serde(default)]
    pub tag_value_column_start: usize,

    #[serde(default)]
    pub tag_name_column_start: usize,

    #[serde(default)]
    pub tag_description_column_start: usize,

    /// Files visited by folder and workspace scopes.
    #[serde(default = "default_file_glob")]
    pub file_glob: String,

    #[serde(default)]
    pub generative: GenerativeConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            include_types: true,
            include_export: true,
            include_async: true,
            include_visibility: true,
            include_static: true,
            include_abstract: true,
            include_readonly: true,
            include_return: true,
            description_placeholder: default_description_placeholder(),
            description_style: DescriptionStyle::default(),
            author: None,
            date_format: None,
            single_line_comments: false,
            empty_line_after_header: true,
            function_variables_as_functions: true,
            description_for_constructors: default_description_for_constructors(),
            include_parenthesis_for_multiple_types: true,
            custom_tags: Vec::new(),
            tag_value_column_start: 0,
            tag_name_column_start: 0,
            tag_description_column_start: 0,
            file_glob: default_file_glob(),
            generative: GenerativeConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(mut self, include: bool) -> Self {
        self.include_types = include;
        self
    }

    pub fn with_parenthesized_unions(mut self, include: bool) -> Self {
        self.include_parenthesis_for_multiple_types = include;
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn with_description_style(mut self, style: DescriptionStyle) -> Self {
        self.description_style = style;
        self
    }

    pub fn with_single_line_comments(mut self, enabled: bool) -> Self {
        self.single_line_comments = enabled;
        self
    }

    pub fn with_empty_line_after_header(mut self, enabled: bool) -> Self {
        self.empty_line_after_header = enabled;
        self
    }

    pub fn with_custom_tag(mut self, tag: CustomTag) -> Self {
        self.custom_tags.push(tag);
        self
    }

    pub fn with_columns(mut self, value: usize, name: usize, description: usize) -> Self {
        self.tag_value_column_start = value;
        self.tag_name_column_start = name;
        self.tag_description_column_start = description;
        self
    }

    pub fn with_file_glob(mut self, glob: impl Into<String>) -> Self {
        self.file_glob = glob.into();
        self
    }

    /// Column starts as used by the renderer.
    pub fn columns(&self) -> Columns {
        Columns {
            value: self.tag_value_column_start,
            name: self.tag_name_column_start,
            description: self.tag_description_column_start,
        }
    }

    /// Rejects values the generator cannot honour.
    pub fn validate(&self) -> Result<()> {
        if let Some(format) = &self.date_format {
            if format.trim().is_empty() {
                return Err(DocError::invalid_config("dateFormat cannot be empty"));
            }
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(DocError::invalid_config(format!(
                    "dateFormat '{format}' is not a valid strftime pattern"
                )));
            }
        }

        let columns = [
            self.tag_value_column_start,
            self.tag_name_column_start,
            self.tag_description_column_start,
        ];
        let enabled: Vec<usize> = columns.into_iter().filter(|column| *column > 0).collect();
        if enabled.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(DocError::invalid_config(
                "tag column starts must increase from value to name to description",
            ));
        }

        for tag in &self.custom_tags {
            let name = tag.tag.trim();
            if name.is_empty() || name.starts_with('@') || name.contains(char::is_whitespace) {
                return Err(DocError::invalid_config(format!(
                    "custom tag '{}' must be a bare tag name",
                    tag.tag
                )));
            }
            if tag.kinds.as_ref().is_some_and(|kinds| kinds.is_empty()) {
                return Err(DocError::invalid_config(format!(
                    "custom tag '{}' lists no declaration kinds",
                    tag.tag
                )));
            }
        }

        if self.file_glob.trim().is_empty() {
            return Err(DocError::invalid_config("fileGlob cannot be empty"));
        }
        globset::Glob::new(&self.file_glob).map_err(|error| {
            DocError::invalid_config(format!("fileGlob '{}': {error}", self.file_glob))
        })?;

        self.generative
            .validate()
            .map_err(|message| DocError::invalid_config(format!("generative: {message}")))
    }
}

/// Where declaration descriptions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionStyle {
    /// Editable region with `descriptionPlaceholder` as default text.
    #[default]
    Placeholder,
    /// Fixed `descriptionPlaceholder` text.
    Static,
}

impl std::str::FromStr for DescriptionStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder),
            "static" => Ok(Self::Static),
            _ => Err(format!(
                "Invalid description style: '{s}'. Valid options: placeholder, static"
            )),
        }
    }
}

/// A configured extra tag appended to matching headers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomTag {
    /// Tag name without `@`.
    pub tag: String,
    /// Default text of the tag's editable value.
    #[serde(default)]
    pub placeholder: String,
    /// Declaration kinds the tag applies to; all kinds when absent.
    #[serde(default)]
    pub kinds: Option<Vec<DeclarationKind>>,
}

impl CustomTag {
    pub fn new(tag: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            placeholder: placeholder.into(),
            kinds: None,
        }
    }

    pub fn for_kinds(mut self, kinds: impl IntoIterator<Item = DeclarationKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn admits(&self, kind: DeclarationKind) -> bool {
        self.kinds.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Which natural-language service backs generative descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    #[default]
    None,
    Ollama,
}

/// Settings of the generative description strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeConfig {
    #[serde(default)]
    pub service: ServiceKind,

    /// Model name to use (e.g., "llama3.2:3b", "qwen2.5-coder:7b").
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_url")]
    pub url: String,

    /// Language the descriptions are written in.
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Temperature for generation (0.0-1.0, lower = more deterministic).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_true")]
    pub describe_type_parameters: bool,

    #[serde(default = "default_true")]
    pub describe_parameters: bool,

    #[serde(default = "default_true")]
    pub describe_returns: bool,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            service: ServiceKind::default(),
            model: default_model(),
            url: default_url(),
            language: default_language(),
            timeout_seconds: default_timeout(),
            temperature: default_temperature(),
            describe_type_parameters: true,
            describe_parameters: true,
            describe_returns: true,
        }
    }
}

impl GenerativeConfig {
    pub fn enabled(&self) -> bool {
        self.service != ServiceKind::None
    }

    pub fn with_service(mut self, service: ServiceKind) -> Self {
        self.service = service;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.enabled() {
            return Ok(());
        }

        if self.model.is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if self.url.is_empty() {
            return Err("Service URL cannot be empty".to_string());
        }

        if self.language.trim().is_empty() {
            return Err("Language cannot be empty".to_string());
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_description_placeholder() -> String {
    "Description placeholder".to_string()
}

fn default_description_for_constructors() -> String {
    format!("Creates an instance of {CLASS_NAME_TOKEN}.")
}

fn default_file_glob() -> String {
    DEFAULT_FILE_GLOB.to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{ "includeTypes": false, "customTags": [{ "tag": "since", "kinds": ["method"] }] }"#,
        )
        .unwrap();
        assert!(!config.include_types);
        assert!(config.include_return);
        assert_eq!(config.file_glob, DEFAULT_FILE_GLOB);
        assert_eq!(
            config.custom_tags[0].kinds,
            Some(vec![DeclarationKind::Method])
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_date_format() {
        let config = GeneratorConfig::default().with_date_format("%Y-%");
        assert!(config.validate().is_err());
        let config = GeneratorConfig::default().with_date_format("%Y-%m-%d");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unordered_columns() {
        assert!(GeneratorConfig::default().with_columns(20, 10, 0).validate().is_err());
        assert!(GeneratorConfig::default().with_columns(0, 10, 30).validate().is_ok());
    }

    #[test]
    fn rejects_prefixed_custom_tag() {
        let config = GeneratorConfig::default().with_custom_tag(CustomTag::new("@since", ""));
        assert!(config.validate().is_err());
    }

    #[test]
    fn generative_validation_only_when_enabled() {
        let mut config = GeneratorConfig::default();
        config.generative.temperature = 3.0;
        assert!(config.validate().is_ok());
        config.generative.service = ServiceKind::Ollama;
        assert!(config.validate().is_err());
    }

    #[test]
    fn custom_tag_whitelist() {
        let tag = CustomTag::new("since", "1.0").for_kinds([DeclarationKind::ClassLike]);
        assert!(tag.admits(DeclarationKind::ClassLike));
        assert!(!tag.admits(DeclarationKind::Method));
        assert!(CustomTag::new("since", "").admits(DeclarationKind::File));
    }
}
