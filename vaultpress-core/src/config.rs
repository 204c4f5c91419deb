//! Configuration parsing and management.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Main configuration struct matching the vaultpress.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source_root_path: String,

    #[serde(default)]
    pub blog_name: String,

    #[serde(default)]
    pub site_url: Option<String>,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub posts: PostsConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_locale() -> String {
    String::from("en")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_posts_dir")]
    pub posts: PathBuf,

    #[serde(default = "default_assets_dir")]
    pub assets: PathBuf,

    #[serde(default = "default_dist_dir")]
    pub dist: PathBuf,
}

fn default_posts_dir() -> PathBuf {
    PathBuf::from("src/content/posts")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("public/assets")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            posts: default_posts_dir(),
            assets: default_assets_dir(),
            dist: default_dist_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostsConfig {
    #[serde(default)]
    pub exclude_tags: Option<Vec<String>>,

    #[serde(default)]
    pub translate: Option<TranslateSettings>,
}

/// LLM backend identifiers accepted in `posts.translate.provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslateSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub provider: Option<Provider>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub target_langs: Vec<String>,
}

impl TranslateSettings {
    /// The API key with `${VAR}` references resolved from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .and_then(resolve_env_reference)
            .filter(|key| !key.is_empty())
    }
}

/// Resolve a value of the exact form `${NAME}` against the environment.
/// Any other value is returned unchanged.
pub fn resolve_env_reference(raw: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^\$\{([A-Za-z0-9_]+)\}$").expect("valid regex"));

    match re.captures(raw).and_then(|caps| caps.get(1)) {
        Some(name) => std::env::var(name.as_str()).ok(),
        None => Some(raw.to_string()),
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration text and check required fields.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;

        if config.source_root_path.trim().is_empty() {
            return Err(ConfigError::MissingField("source_root_path".into()));
        }
        if config.blog_name.trim().is_empty() {
            return Err(ConfigError::MissingField("blog_name".into()));
        }

        Ok(config)
    }

    /// The vault directory, with `~` expanded
    pub fn source_root(&self) -> PathBuf {
        self.resolve_path(&expand_home(&self.source_root_path))
    }

    /// Directory receiving synced Markdown posts
    pub fn posts_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.posts)
    }

    /// Root of the per-slug asset directories
    pub fn assets_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.assets)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.dist)
    }

    pub fn exclude_tags(&self) -> Option<&[String]> {
        self.posts.exclude_tags.as_deref()
    }

    pub fn translate_settings(&self) -> Option<&TranslateSettings> {
        self.posts.translate.as_ref()
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.as_deref().and_then(Path::parent) {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }
}

/// Expand a leading `~` to `$HOME`.
fn expand_home(raw: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (raw, home) {
        ("~", Some(home)) => home,
        (raw, Some(home)) if raw.starts_with("~/") => home.join(&raw[2..]),
        (raw, _) => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
source_root_path: /vault
blog_name: My Blog
site_url: https://example.com
locale: ko
paths:
  posts: content/posts
posts:
  exclude_tags: [work, personal]
  translate:
    enabled: true
    provider: anthropic
    api_key: sk-test
    model: claude-test
    target_langs: [en, ja]
"#;

    #[test]
    fn test_default_values() {
        let config = Config::from_yaml("source_root_path: /vault\nblog_name: Blog\n").unwrap();

        assert_eq!(config.locale, "en");
        assert_eq!(config.paths.posts, PathBuf::from("src/content/posts"));
        assert_eq!(config.paths.assets, PathBuf::from("public/assets"));
        assert_eq!(config.paths.dist, PathBuf::from("dist"));
        assert!(config.exclude_tags().is_none());
        assert!(config.translate_settings().is_none());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(FULL).unwrap();

        assert_eq!(config.locale, "ko");
        assert_eq!(config.site_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.source_root(), PathBuf::from("/vault"));
        assert_eq!(
            config.exclude_tags(),
            Some(&["work".to_string(), "personal".to_string()][..])
        );

        let translate = config.translate_settings().unwrap();
        assert!(translate.enabled);
        assert_eq!(translate.provider, Some(Provider::Anthropic));
        assert_eq!(translate.resolved_api_key().as_deref(), Some("sk-test"));
        assert_eq!(translate.target_langs, vec!["en", "ja"]);
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(matches!(
            Config::from_yaml("blog_name: Blog\n"),
            Err(ConfigError::MissingField(field)) if field == "source_root_path"
        ));
        assert!(matches!(
            Config::from_yaml("source_root_path: /vault\nblog_name: \"\"\n"),
            Err(ConfigError::MissingField(field)) if field == "blog_name"
        ));
    }

    #[test]
    fn test_unknown_provider_is_parse_error() {
        let yaml = "source_root_path: /v\nblog_name: B\nposts:\n  translate:\n    provider: deepl\n";
        assert!(matches!(Config::from_yaml(yaml), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaultpress.yml");
        std::fs::write(&path, FULL).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.posts_dir(), dir.path().join("content/posts"));
        assert_eq!(config.assets_dir(), dir.path().join("public/assets"));
        assert_eq!(config.dist_dir(), dir.path().join("dist"));
    }

    #[test]
    fn test_home_expansion() {
        let Some(home) = std::env::var_os("HOME").map(PathBuf::from) else {
            return;
        };
        assert_eq!(expand_home("~/vault"), home.join("vault"));
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("/abs/~/x"), PathBuf::from("/abs/~/x"));
    }

    #[test]
    fn test_env_reference() {
        assert_eq!(resolve_env_reference("plain").as_deref(), Some("plain"));
        assert_eq!(
            resolve_env_reference("${VAULTPRESS_TEST_SURELY_UNSET_VAR}"),
            None
        );
        let path = std::env::var("PATH").ok();
        assert_eq!(resolve_env_reference("${PATH}"), path);
    }

    #[test]
    fn test_env_reference_requires_word_name() {
        for raw in ["${}", "${MY KEY}", "${A-B}", " ${PATH}", "${PATH}x"] {
            assert_eq!(resolve_env_reference(raw).as_deref(), Some(raw), "{raw}");
        }
    }
}
