use crate::domain::VersionRecord;
use crate::error::{ResourceError, Result};
use crate::git::RetryPolicy;
use crate::models::Source;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a settings file
pub const SETTINGS_ENV: &str = "SEMVER_GIT_RESOURCE_CONFIG";

/// Settings file name looked up in the working and user config directories
pub const SETTINGS_FILE: &str = "semver-git.toml";

/// Git credentials from the resource source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub private_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// A private key, or both a username and a password
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.private_key) || (present(&self.username) && present(&self.password))
    }
}

/// Validated description of where the version lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub remote_uri: String,
    pub version_branch: String,
    pub source_branch: String,
    pub version_file: String,
    pub initial_version: VersionRecord,
    pub credentials: Credentials,
    pub skip_ssl_verification: bool,
}

impl RepositoryConfig {
    pub const DEFAULT_VERSION_BRANCH: &'static str = "version";
    pub const DEFAULT_SOURCE_BRANCH: &'static str = "master";

    /// Validate a resource source before anything touches the network
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` - With defaults filled in
    /// * `Err(ResourceError::Config)` - Missing uri/version file, missing
    ///   credentials, or an unparsable initial version
    pub fn from_source(source: &Source) -> Result<Self> {
        if source.uri.trim().is_empty() {
            return Err(ResourceError::config("missing git uri"));
        }
        if source.version_file.trim().is_empty() {
            return Err(ResourceError::config("missing version file"));
        }

        let initial_version = match source.initial_version.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => VersionRecord::parse(raw).map_err(|_| {
                ResourceError::config(format!("invalid initial version ({})", raw))
            })?,
            _ => VersionRecord::default(),
        };

        let credentials = Credentials {
            private_key: source.private_key.clone(),
            username: source.username.clone(),
            password: source.password.clone(),
        };
        if !credentials.is_complete() {
            return Err(ResourceError::config(
                "missing git credentials. set a username and password or a private key",
            ));
        }

        let or_default = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Ok(RepositoryConfig {
            remote_uri: source.uri.trim().to_string(),
            version_branch: or_default(&source.version_branch, Self::DEFAULT_VERSION_BRANCH),
            source_branch: or_default(&source.source_code_branch, Self::DEFAULT_SOURCE_BRANCH),
            version_file: source.version_file.trim().to_string(),
            initial_version,
            credentials,
            skip_ssl_verification: source.skip_ssl_verification.unwrap_or(false),
        })
    }
}

/// Runtime settings that are not part of a pipeline's source
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Settings {
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub git: GitConfig,
}

fn default_push_attempts() -> u32 {
    10
}

fn default_backoff_ms() -> u64 {
    250
}

fn default_bump_rounds() -> u32 {
    3
}

/// Bounds on how hard a bump fights concurrent writers
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RetryConfig {
    /// Push attempts with the same content before re-reading
    #[serde(default = "default_push_attempts")]
    pub push_attempts: u32,

    /// Linear backoff unit between push attempts
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Full read-bump-publish rounds
    #[serde(default = "default_bump_rounds")]
    pub bump_rounds: u32,
}

impl RetryConfig {
    pub fn push_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.push_attempts, Duration::from_millis(self.backoff_ms))
    }

    pub fn rounds(&self) -> u32 {
        self.bump_rounds.max(1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            push_attempts: default_push_attempts(),
            backoff_ms: default_backoff_ms(),
            bump_rounds: default_bump_rounds(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_committer_name() -> String {
    "semver-git-resource".to_string()
}

fn default_committer_email() -> String {
    "semver-git-resource@localhost".to_string()
}

/// How commits are attributed and which remote name is used
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_committer_name")]
    pub committer_name: String,

    #[serde(default = "default_committer_email")]
    pub committer_email: String,
}

impl GitConfig {
    /// Environment overrides that give git a commit identity
    pub fn identity_env(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("GIT_AUTHOR_NAME", self.committer_name.as_str()),
            ("GIT_AUTHOR_EMAIL", self.committer_email.as_str()),
            ("GIT_COMMITTER_NAME", self.committer_name.as_str()),
            ("GIT_COMMITTER_EMAIL", self.committer_email.as_str()),
        ]
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            committer_name: default_committer_name(),
            committer_email: default_committer_email(),
        }
    }
}

/// Loads settings from file or returns defaults.
///
/// Attempts to load settings in the following order:
/// 1. Custom path provided as parameter
/// 2. Path in `$SEMVER_GIT_RESOURCE_CONFIG`
/// 3. `semver-git.toml` in current directory
/// 4. `semver-git.toml` in the user config directory
/// 5. Default settings if no file found
///
/// # Returns
/// * `Ok(Settings)` - Loaded or default settings
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = settings_path(path) else {
        return Ok(Settings::default());
    };

    let text = fs::read_to_string(&path).map_err(|e| {
        ResourceError::config(format!("cannot read settings {}: {}", path.display(), e))
    })?;
    toml::from_str(&text).map_err(|e| {
        ResourceError::config(format!("cannot parse settings {}: {}", path.display(), e))
    })
}

fn settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env::var_os(SETTINGS_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = Path::new(".").join(SETTINGS_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(SETTINGS_FILE))
        .filter(|path| path.exists())
}
