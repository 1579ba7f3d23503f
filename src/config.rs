use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const DEFAULT_COLLECTION: &str = "Users";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Where the user collection lives and how to reach it
#[derive(Debug, Clone, Serialize)]
pub struct RemoteConfig {
    /// Firestore REST root (e.g. "https://firestore.googleapis.com/v1")
    pub base_url: ConfigValue<String>,
    /// Google Cloud project id
    pub project_id: ConfigValue<Option<String>>,
    /// Firestore database id
    pub database: ConfigValue<String>,
    /// Collection holding the user documents
    pub collection: ConfigValue<String>,
    /// Full collection URL; overrides the four values above when set
    pub collection_url: ConfigValue<Option<String>>,
    /// Web API key sent as the `key` query parameter
    #[serde(serialize_with = "mask_secret")]
    pub api_key: ConfigValue<Option<String>>,
}

impl RemoteConfig {
    /// Resolves the collection URL from either `collection_url` or the
    /// project/database/collection triple.
    pub fn collection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.collection_url.value {
            return Ok(url.trim_end_matches('/').to_string());
        }

        let project_id = self
            .project_id
            .value
            .as_deref()
            .ok_or(ConfigError::NotConfigured("project_id"))?;

        Ok(format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.base_url.value.trim_end_matches('/'),
            project_id,
            self.database.value,
            self.collection.value
        ))
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key.value.clone()
    }
}

fn mask_secret<S: Serializer>(
    value: &ConfigValue<Option<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let masked = ConfigValue::new(
        value.value.as_deref().map(mask),
        value.source.clone(),
    );
    masked.serialize(serializer)
}

/// Shows only the last four characters of a secret.
pub fn mask(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", visible)
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Remote store configuration
    pub remote: RemoteConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    remote: RemoteFile,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RemoteFile {
    base_url: Option<String>,
    project_id: Option<String>,
    database: Option<String>,
    collection: Option<String>,
    collection_url: Option<String>,
    api_key: Option<String>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut remote = RemoteConfig {
            base_url: ConfigValue::new(DEFAULT_BASE_URL.to_string(), ConfigSource::Default),
            project_id: ConfigValue::new(None, ConfigSource::Default),
            database: ConfigValue::new(DEFAULT_DATABASE.to_string(), ConfigSource::Default),
            collection: ConfigValue::new(DEFAULT_COLLECTION.to_string(), ConfigSource::Default),
            collection_url: ConfigValue::new(None, ConfigSource::Default),
            api_key: ConfigValue::new(None, ConfigSource::Default),
        };
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            let file = file_config.remote;
            if let Some(url) = file.base_url {
                remote.base_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(project) = file.project_id {
                remote.project_id = ConfigValue::new(Some(project), ConfigSource::File);
            }
            if let Some(database) = file.database {
                remote.database = ConfigValue::new(database, ConfigSource::File);
            }
            if let Some(collection) = file.collection {
                remote.collection = ConfigValue::new(collection, ConfigSource::File);
            }
            if let Some(url) = file.collection_url {
                remote.collection_url = ConfigValue::new(Some(url), ConfigSource::File);
            }
            if let Some(key) = file.api_key {
                remote.api_key = ConfigValue::new(Some(key), ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(url) = std::env::var("USERBOOK_BASE_URL") {
            remote.base_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(project) = std::env::var("USERBOOK_PROJECT_ID") {
            remote.project_id = ConfigValue::new(Some(project), ConfigSource::Environment);
        }
        if let Ok(database) = std::env::var("USERBOOK_DATABASE") {
            remote.database = ConfigValue::new(database, ConfigSource::Environment);
        }
        if let Ok(collection) = std::env::var("USERBOOK_COLLECTION") {
            remote.collection = ConfigValue::new(collection, ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("USERBOOK_COLLECTION_URL") {
            remote.collection_url = ConfigValue::new(Some(url), ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("USERBOOK_API_KEY") {
            remote.api_key = ConfigValue::new(Some(key), ConfigSource::Environment);
        }

        Ok(Self {
            config_file,
            remote,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/userbook/
    /// - macOS: ~/Library/Application Support/userbook/
    /// - Windows: %APPDATA%/userbook/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("userbook")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    NotConfigured(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::NotConfigured(key) => write!(
                f,
                "Remote store not configured. Set remote.{} or remote.collection_url in the config file.",
                key
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
