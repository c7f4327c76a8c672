//! Build settings (`fledermaus.toml`).
//!
//! Parsed with serde and auto-discovered in the current directory and its
//! parents. Relative paths are resolved against the directory holding the
//! settings file. Path values support `~` and `${VAR}` / `${VAR:-default}`
//! expansion.
//!
//! ```toml
//! [paths]
//! source_dir = "source"
//! config_dir = "config"
//! templates_dir = "templates"
//! output_dir = "public"
//!
//! [content]
//! extensions = ["md", "html"]
//! cut_tag = "<!-- cut -->"
//! highlight = true
//! highlight_theme = "base16-ocean.light"
//!
//! [[listings]]
//! source_path_prefix = "all"
//! url_prefix = "/all"
//! documents_per_page = 10
//! layout = "index"
//! index = true
//! order = ["-date"]
//! filter = { lang = "en" }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ConfigError;

/// Settings filename to search for.
const SETTINGS_FILENAME: &str = "fledermaus.toml";

/// CLI settings that override settings file values.
///
/// All fields are optional. Only non-None values override the loaded settings.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Build settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder layout.
    pub paths: PathSettings,
    /// Content parsing options.
    pub content: ContentSettings,
    /// Paginated document listings.
    pub listings: Vec<ListingSettings>,
    /// Path to the settings file (set after loading).
    #[serde(skip)]
    pub settings_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Folder layout of a site.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Source documents.
    pub source_dir: PathBuf,
    /// Site configuration YAML files.
    pub config_dir: PathBuf,
    /// Templates.
    pub templates_dir: PathBuf,
    /// Generated site.
    pub output_dir: PathBuf,
    /// Page change cache file.
    pub cache_file: PathBuf,
    /// Whether the page change cache is used.
    pub cache_enabled: bool,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("source"),
            config_dir: PathBuf::from("config"),
            templates_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("public"),
            cache_file: PathBuf::from(".fledermaus/pages.json"),
            cache_enabled: true,
        }
    }
}

/// Content parsing options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Source file extensions to load.
    pub extensions: Vec<String>,
    /// Marker splitting content into `excerpt` and `more`.
    pub cut_tag: Option<String>,
    /// Syntax highlighting of fenced code blocks in Markdown.
    pub highlight: bool,
    /// Bundled syntect theme used for highlighting.
    pub highlight_theme: String,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_owned(), "html".to_owned()],
            cut_tag: Some("<!-- cut -->".to_owned()),
            highlight: true,
            highlight_theme: "base16-ocean.light".to_owned(),
        }
    }
}

/// One paginated listing (e.g. the blog index or per-tag pages).
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ListingSettings {
    /// Source path of the first page, without extension (e.g. `"all"`).
    pub source_path_prefix: String,
    /// URL of the first page (e.g. `"/all"`).
    pub url_prefix: String,
    /// Number of documents on one page.
    pub documents_per_page: usize,
    /// Layout of every listing page.
    pub layout: String,
    /// Append `index` to the first page's source path.
    #[serde(default)]
    pub index: bool,
    /// Sort fields, `-` prefix for descending order.
    #[serde(default)]
    pub order: Vec<String>,
    /// Exact-match field filters.
    #[serde(default)]
    pub filter: BTreeMap<String, serde_json::Value>,
    /// Produce one listing per value of this field (e.g. `"tags"`).
    #[serde(default)]
    pub group_by: Option<String>,
    /// Extra fields added to every listing page.
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Settings {
    /// Load settings from file with optional CLI settings.
    ///
    /// If `settings_path` is provided, loads from that file.
    /// Otherwise, searches for `fledermaus.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `settings_path` doesn't exist or parsing fails.
    pub fn load(
        settings_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut settings = if let Some(path) = settings_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(cli) = cli_settings {
            settings.apply_cli_settings(cli);
        }

        Ok(settings)
    }

    /// Parse settings from TOML content, resolving paths against `base_dir`.
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut settings: Self = toml::from_str(content)?;
        settings.expand_paths()?;
        settings.resolve_paths(base_dir);
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions cannot be empty".to_owned(),
            ));
        }
        if self.content.cut_tag.as_deref() == Some("") {
            return Err(ConfigError::Validation(
                "content.cut_tag cannot be empty".to_owned(),
            ));
        }
        for (i, listing) in self.listings.iter().enumerate() {
            if listing.documents_per_page == 0 {
                return Err(ConfigError::Validation(format!(
                    "listings[{i}].documents_per_page must be greater than 0"
                )));
            }
            if listing.layout.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "listings[{i}].layout cannot be empty"
                )));
            }
        }
        Ok(())
    }

    fn apply_cli_settings(&mut self, cli: &CliSettings) {
        if let Some(source_dir) = &cli.source_dir {
            self.paths.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &cli.output_dir {
            self.paths.output_dir.clone_from(output_dir);
        }
        if let Some(cache_enabled) = cli.cache_enabled {
            self.paths.cache_enabled = cache_enabled;
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        let mut settings = Self::from_toml(&content, base_dir)?;
        settings.settings_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Search for settings file in current directory and parents.
    fn discover() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(SETTINGS_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let mut settings = Self {
            paths: PathSettings::default(),
            content: ContentSettings::default(),
            listings: Vec::new(),
            settings_path: None,
        };
        settings.resolve_paths(base);
        settings
    }

    fn expand_paths(&mut self) -> Result<(), ConfigError> {
        let paths = &mut self.paths;
        paths.source_dir = expand_path(&paths.source_dir, "paths.source_dir")?;
        paths.config_dir = expand_path(&paths.config_dir, "paths.config_dir")?;
        paths.templates_dir = expand_path(&paths.templates_dir, "paths.templates_dir")?;
        paths.output_dir = expand_path(&paths.output_dir, "paths.output_dir")?;
        paths.cache_file = expand_path(&paths.cache_file, "paths.cache_file")?;
        Ok(())
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        let paths = &mut self.paths;
        for path in [
            &mut paths.source_dir,
            &mut paths.config_dir,
            &mut paths.templates_dir,
            &mut paths.output_dir,
            &mut paths.cache_file,
        ] {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
    }
}

/// Expand `~` and environment variables in a path value.
fn expand_path(path: &Path, field: &str) -> Result<PathBuf, ConfigError> {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default_with_base(Path::new("/site"));
        assert_eq!(settings.paths.source_dir, PathBuf::from("/site/source"));
        assert_eq!(settings.paths.config_dir, PathBuf::from("/site/config"));
        assert_eq!(
            settings.paths.templates_dir,
            PathBuf::from("/site/templates")
        );
        assert_eq!(settings.paths.output_dir, PathBuf::from("/site/public"));
        assert!(settings.paths.cache_enabled);
        assert_eq!(settings.content.extensions, vec!["md", "html"]);
        assert!(settings.listings.is_empty());
    }

    #[test]
    fn test_from_toml_resolves_relative_paths() {
        let toml = r#"
[paths]
source_dir = "content"
output_dir = "/var/www"
"#;
        let settings = Settings::from_toml(toml, Path::new("/site")).unwrap();
        assert_eq!(settings.paths.source_dir, PathBuf::from("/site/content"));
        assert_eq!(settings.paths.output_dir, PathBuf::from("/var/www"));
        assert_eq!(settings.paths.config_dir, PathBuf::from("/site/config"));
    }

    #[test]
    fn test_from_toml_listings() {
        let toml = r#"
[[listings]]
source_path_prefix = "all"
url_prefix = "/all"
documents_per_page = 10
layout = "index"
index = true
order = ["-date"]
filter = { lang = "en" }

[[listings]]
source_path_prefix = "tags"
url_prefix = "/tags"
documents_per_page = 20
layout = "tag"
group_by = "tags"
"#;
        let settings = Settings::from_toml(toml, Path::new("/site")).unwrap();
        assert_eq!(settings.listings.len(), 2);

        let all = &settings.listings[0];
        assert_eq!(all.source_path_prefix, "all");
        assert_eq!(all.documents_per_page, 10);
        assert!(all.index);
        assert_eq!(all.order, vec!["-date"]);
        assert_eq!(all.filter.get("lang"), Some(&json!("en")));
        assert!(all.group_by.is_none());

        let tags = &settings.listings[1];
        assert!(!tags.index);
        assert_eq!(tags.group_by.as_deref(), Some("tags"));
        assert!(tags.filter.is_empty());
    }

    #[test]
    fn test_from_toml_content_settings() {
        let toml = r#"
[content]
extensions = ["md"]
cut_tag = "<!-- more -->"
"#;
        let settings = Settings::from_toml(toml, Path::new("/site")).unwrap();
        assert_eq!(settings.content.extensions, vec!["md"]);
        assert_eq!(settings.content.cut_tag.as_deref(), Some("<!-- more -->"));
        assert!(settings.content.highlight);
        assert_eq!(settings.content.highlight_theme, "base16-ocean.light");
    }

    #[test]
    fn test_from_toml_highlight_settings() {
        let toml = r#"
[content]
highlight = false
highlight_theme = "InspiredGitHub"
"#;
        let settings = Settings::from_toml(toml, Path::new("/site")).unwrap();
        assert!(!settings.content.highlight);
        assert_eq!(settings.content.highlight_theme, "InspiredGitHub");
        assert_eq!(settings.content.extensions, vec!["md", "html"]);
    }

    #[test]
    fn test_validate_zero_documents_per_page() {
        let toml = r#"
[[listings]]
source_path_prefix = "all"
url_prefix = "/all"
documents_per_page = 0
layout = "index"
"#;
        let result = Settings::from_toml(toml, Path::new("/site"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_extensions() {
        let toml = "[content]\nextensions = []\n";
        let result = Settings::from_toml(toml, Path::new("/site"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = Settings::from_toml("[paths\n", Path::new("/site"));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_expand_env_in_paths() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("FM_TEST_OUTPUT", "/tmp/fm-out");
        }

        let toml = "[paths]\noutput_dir = \"${FM_TEST_OUTPUT}/site\"\n";
        let settings = Settings::from_toml(toml, Path::new("/site")).unwrap();
        assert_eq!(settings.paths.output_dir, PathBuf::from("/tmp/fm-out/site"));
    }

    #[test]
    fn test_expand_env_missing_var() {
        let toml = "[paths]\noutput_dir = \"${FM_TEST_SURELY_UNSET_VAR}/site\"\n";
        let result = Settings::from_toml(toml, Path::new("/site"));
        assert!(matches!(result, Err(ConfigError::EnvVar { .. })));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Settings::load(Some(Path::new("/nonexistent/fledermaus.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file_with_cli_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, "[paths]\nsource_dir = \"content\"\n").unwrap();

        let cli = CliSettings {
            output_dir: Some(PathBuf::from("/custom/out")),
            cache_enabled: Some(false),
            ..CliSettings::default()
        };
        let settings = Settings::load(Some(&path), Some(&cli)).unwrap();

        assert_eq!(settings.paths.source_dir, tmp.path().join("content"));
        assert_eq!(settings.paths.output_dir, PathBuf::from("/custom/out"));
        assert!(!settings.paths.cache_enabled);
        assert_eq!(settings.settings_path, Some(path));
    }
}
