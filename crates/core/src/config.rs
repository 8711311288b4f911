// Configuration files.
//
// Global config: `~/.eventsync/config.toml`
// Repository config: `<repo>/.eventsync/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::git::sync::DEFAULT_COMMIT_MESSAGE;
use crate::store::DEFAULT_LOG_FILE_NAME;

/// Root directory for global state: `~/.eventsync/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".eventsync"))
}

/// Path to the global config file: `~/.eventsync/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

/// Path to the repository config file: `<repo>/.eventsync/config.toml`.
pub fn repo_config_path(repo_dir: &Path) -> PathBuf {
    repo_dir.join(".eventsync").join("config.toml")
}

// ── Global config ──────────────────────────────────────────────────

/// User-wide defaults at `~/.eventsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Repository used when no `--repo` is given.
    pub repo_dir: Option<PathBuf>,
    /// Project recorded when the caller does not name one.
    pub default_project: Option<String>,
    /// Agent recorded when the caller does not name one.
    pub default_agent: Option<String>,
}

impl GlobalConfig {
    /// Load from `~/.eventsync/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        global_config_path().and_then(|p| Self::load_from(&p).ok()).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        write_toml(self, path)
    }
}

// ── Repository config ──────────────────────────────────────────────

/// Per-repository configuration at `<repo>/.eventsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RepoConfig {
    pub log: LogConfig,
    pub sync: SyncConfig,
}

impl RepoConfig {
    /// Load from `<repo>/.eventsync/config.toml`. A missing file yields
    /// defaults; a malformed one is an error.
    pub fn load(repo_dir: &Path) -> Result<Self, ConfigError> {
        let path = repo_config_path(repo_dir);
        match Self::load_from(&path) {
            Err(ConfigError::Io(error)) if error.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    pub fn save(&self, repo_dir: &Path) -> Result<(), ConfigError> {
        self.save_to(&repo_config_path(repo_dir))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        write_toml(self, path)
    }
}

/// Event log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Log file name, relative to the repository directory.
    pub file_name: String,
    /// `fdatasync` after every append.
    pub fsync: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { file_name: DEFAULT_LOG_FILE_NAME.into(), fsync: true }
    }
}

/// Remote sync settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Commit message used when the caller does not supply one.
    pub default_message: String,
    /// Remote to push to. Only used together with `branch`; otherwise the
    /// current branch's upstream is used.
    pub remote: Option<String>,
    pub branch: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { default_message: DEFAULT_COMMIT_MESSAGE.into(), remote: None, branch: None }
    }
}

fn write_toml<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
    }
    let contents = toml::to_string_pretty(value).map_err(ConfigError::Serialize)?;
    std::fs::write(path, contents).map_err(ConfigError::Io)
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Serialize(e) => Some(e),
        }
    }
}
