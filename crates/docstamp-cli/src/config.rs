//! Configuration loading.
//!
//! Layers, lowest to highest priority:
//! 1. [`GeneratorConfig::default`]
//! 2. `docstamp.json` in the working directory, or the `--config` file
//! 3. `DOCSTAMP_*` environment variables (`__` separates nested keys, so
//!    `DOCSTAMP_GENERATIVE__MODEL` sets `generative.model`)
//! 4. Command-line overrides

use std::path::{Path, PathBuf};

use docstamp::GeneratorConfig;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::Serialize;

use crate::cli::GenerationArgs;
use crate::error::{ConfigError, Result};

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docstamp.json";

const ENV_PREFIX: &str = "DOCSTAMP_";

/// Command-line values that take precedence over every other layer.
///
/// Unset options are skipped so they never mask lower layers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    description_style: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_types: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_glob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generative: Option<GenerativeOverrides>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerativeOverrides {
    service: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl From<&GenerationArgs> for Overrides {
    fn from(args: &GenerationArgs) -> Self {
        Self {
            description_style: args.description_style.map(|style| style.as_str()),
            include_types: args.no_types.then_some(false),
            author: args.author.clone(),
            date_format: args.date_format.clone(),
            file_glob: args.glob.clone(),
            generative: args.ollama.then(|| GenerativeOverrides {
                service: "ollama",
                model: args.model.clone(),
                url: args.ollama_url.clone(),
            }),
        }
    }
}

/// Loads and validates the generator configuration.
///
/// `cwd` is where `docstamp.json` is looked up; `explicit` is the `--config`
/// path, which must exist.
pub fn load_config(
    cwd: &Path,
    explicit: Option<&Path>,
    args: &GenerationArgs,
) -> Result<GeneratorConfig> {
    let mut figment = Figment::from(Serialized::defaults(GeneratorConfig::default()));

    if let Some(path) = config_file(cwd, explicit)? {
        tracing::debug!(path = %path.display(), "loading config file");
        figment = figment.merge(Json::file(path));
    }

    let config: GeneratorConfig = figment
        .merge(
            Env::prefixed(ENV_PREFIX)
                .map(|key| env_key(key.as_str()).into())
                .lowercase(false),
        )
        .merge(Serialized::defaults(Overrides::from(args)))
        .extract()
        .map_err(|e| ConfigError::InvalidValue {
            field: e.path.join("."),
            value: e.kind.to_string(),
            hint: "Check docstamp.json syntax and DOCSTAMP_* values".to_string(),
        })?;

    config.validate().map_err(|e| ConfigError::Invalid {
        message: e.to_string(),
    })?;
    Ok(config)
}

fn config_file(cwd: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            let path = cwd.join(path);
            if path.is_file() {
                Ok(Some(path))
            } else {
                Err(ConfigError::NotFound(path).into())
            }
        }
        None => {
            let path = cwd.join(DEFAULT_CONFIG_FILE);
            Ok(path.is_file().then_some(path))
        }
    }
}

/// Maps `GENERATIVE__TIMEOUT_SECONDS` to `generative.timeoutSeconds`.
fn env_key(key: &str) -> String {
    key.split("__")
        .map(camel_case)
        .collect::<Vec<_>>()
        .join(".")
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, word) in segment.split('_').filter(|w| !w.is_empty()).enumerate() {
        let word = word.to_ascii_lowercase();
        if i == 0 {
            out.push_str(&word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StyleArg;
    use docstamp::{DescriptionStyle, ServiceKind};
    use tempfile::TempDir;

    #[test]
    fn env_keys_become_camel_case_paths() {
        assert_eq!(env_key("INCLUDE_TYPES"), "includeTypes");
        assert_eq!(env_key("GENERATIVE__TIMEOUT_SECONDS"), "generative.timeoutSeconds");
        assert_eq!(env_key("AUTHOR"), "author");
    }

    #[test]
    fn defaults_without_any_layer() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path(), None, &GenerationArgs::default()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn file_then_cli_layers() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            r#"{ "author": "Ada", "includeTypes": false, "descriptionStyle": "static" }"#,
        )
        .unwrap();

        let from_file = load_config(temp.path(), None, &GenerationArgs::default()).unwrap();
        assert_eq!(from_file.author.as_deref(), Some("Ada"));
        assert!(!from_file.include_types);
        assert_eq!(from_file.description_style, DescriptionStyle::Static);

        let args = GenerationArgs {
            author: Some("Grace".into()),
            description_style: Some(StyleArg::Placeholder),
            ollama: true,
            model: Some("qwen2.5-coder:7b".into()),
            ..GenerationArgs::default()
        };
        let overridden = load_config(temp.path(), None, &args).unwrap();
        assert_eq!(overridden.author.as_deref(), Some("Grace"));
        assert!(!overridden.include_types);
        assert_eq!(overridden.description_style, DescriptionStyle::Placeholder);
        assert_eq!(overridden.generative.service, ServiceKind::Ollama);
        assert_eq!(overridden.generative.model, "qwen2.5-coder:7b");
        assert_eq!(
            overridden.generative.url,
            GeneratorConfig::default().generative.url
        );
    }

    #[test]
    fn explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let result = load_config(
            temp.path(),
            Some(Path::new("missing.json")),
            &GenerationArgs::default(),
        );
        assert!(matches!(
            result,
            Err(crate::error::CliError::Config(ConfigError::NotFound(_)))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("bad.json"), r#"{ "fileGlob": "  " }"#).unwrap();
        let result = load_config(
            temp.path(),
            Some(Path::new("bad.json")),
            &GenerationArgs::default(),
        );
        assert!(matches!(
            result,
            Err(crate::error::CliError::Config(ConfigError::Invalid { .. }))
        ));
    }
}
