//! Per-language site configuration.
//!
//! A config folder contains YAML files named after what they configure:
//!
//! ```text
//! config/
//! +-- base.yml     # shared by every language
//! +-- en.yml       # overrides for English pages
//! +-- ru.yml       # overrides for Russian pages
//! ```
//!
//! `default.yml` is accepted as the historical name of `base.yml` and is only
//! used when no `base.yml` exists.
//!
//! # Merging
//!
//! - `base` is always present, unmodified
//! - every language `L` gets `deep_merge(base, L)`: language values win, nested
//!   mappings are merged key by key, everything else is replaced wholesale

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ConfigError;
use crate::yaml::read_yaml_file;

/// Name of the shared configuration file (without extension).
const BASE_NAME: &str = "base";

/// Historical name of the shared configuration file.
const LEGACY_BASE_NAME: &str = "default";

/// Raw configuration files: one base mapping plus per-language overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigFiles {
    /// Shared configuration.
    pub base: Value,
    /// Language overrides keyed by language code.
    pub langs: BTreeMap<String, Value>,
}

/// Merged configuration: `base` plus one fully merged view per language.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedConfig {
    views: BTreeMap<String, Value>,
}

impl MergedConfig {
    /// Build a merged configuration from already merged views.
    #[must_use]
    pub fn from_views(views: BTreeMap<String, Value>) -> Self {
        Self { views }
    }

    /// Configuration view for a language (or `"base"`).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.views.get(name)
    }

    /// The shared base configuration.
    #[must_use]
    pub fn base(&self) -> Option<&Value> {
        self.views.get(BASE_NAME)
    }

    /// Language codes with their own view (excluding `base`).
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.views
            .keys()
            .map(String::as_str)
            .filter(|name| *name != BASE_NAME)
    }

    /// Configuration as a single JSON object (`{"base": ..., "en": ...}`).
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.views
                .iter()
                .map(|(name, view)| (name.clone(), view.clone()))
                .collect(),
        )
    }
}

/// Return all `*.yml` files directly inside `folder`, sorted by name.
///
/// Not recursive. A missing folder yields an empty list.
pub fn get_config_files_list(folder: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let folder = if folder.as_os_str().is_empty() {
        Path::new(".")
    } else {
        folder
    };
    let pattern = format!(
        "{}/*.yml",
        glob::Pattern::escape(&folder.to_string_lossy())
    );

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable config path");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    Ok(files)
}

/// Read configuration files into base and language slots.
///
/// The file stem decides the slot: `base` (or `default` when there is no
/// `base`) fills the base, every other stem becomes a language. Unreadable
/// or malformed files are logged and treated as empty.
pub fn read_config_files(files: &[PathBuf]) -> ConfigFiles {
    let mut configs = ConfigFiles {
        base: empty_object(),
        langs: BTreeMap::new(),
    };
    let mut has_base = false;

    for path in files {
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let value = read_yaml_file(path).map_or_else(empty_object, |value| {
            if value.is_object() {
                value
            } else {
                tracing::warn!(path = %path.display(), "Config file is not a mapping, ignoring");
                empty_object()
            }
        });

        match name.as_str() {
            BASE_NAME => {
                configs.base = value;
                has_base = true;
            }
            LEGACY_BASE_NAME if !has_base => {
                configs.base = value;
            }
            LEGACY_BASE_NAME => {}
            _ => {
                configs.langs.insert(name, value);
            }
        }
    }

    configs
}

/// Merge base configuration with every language override.
///
/// With no languages the result only contains `base`.
#[must_use]
pub fn merge_configs(configs: &ConfigFiles) -> MergedConfig {
    let mut views = BTreeMap::new();
    views.insert(BASE_NAME.to_owned(), configs.base.clone());

    for (lang, overrides) in &configs.langs {
        views.insert(lang.clone(), deep_merge(&configs.base, overrides));
    }

    MergedConfig { views }
}

/// Load and merge all configuration files from `folder`.
pub fn load_config(folder: &Path) -> Result<MergedConfig, ConfigError> {
    let files = get_config_files_list(folder)?;
    tracing::debug!(folder = %folder.display(), files = files.len(), "Loading site config");
    let configs = read_config_files(&files);
    Ok(merge_configs(&configs))
}

/// Recursively merge `overrides` onto a copy of `base`.
///
/// Mappings are merged key by key; any other value in `overrides` replaces
/// the base value. Neither input is modified.
#[must_use]
pub fn deep_merge(base: &Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        (_, other) => other.clone(),
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
