//! The version file on the version branch

use crate::config::RepositoryConfig;
use crate::domain::VersionRecord;
use crate::error::{ResourceError, Result};
use crate::git::{CommandRunner, RepositorySync};
use tracing::{debug, info};

/// Reads and writes the version record stored on the version branch
pub struct VersionStore<R: CommandRunner> {
    sync: RepositorySync<R>,
    branch: String,
    file: String,
    initial_version: VersionRecord,
}

impl<R: CommandRunner> VersionStore<R> {
    pub fn new(sync: RepositorySync<R>, config: &RepositoryConfig) -> Self {
        VersionStore {
            sync,
            branch: config.version_branch.clone(),
            file: config.version_file.clone(),
            initial_version: config.initial_version.clone(),
        }
    }

    pub fn sync(&self) -> &RepositorySync<R> {
        &self.sync
    }

    /// Current stored version, freshly synced from the remote
    ///
    /// A missing version file means nothing was ever bumped and yields the
    /// configured initial version.
    pub fn read(&self) -> Result<VersionRecord> {
        self.sync
            .sync_to(&self.branch)
            .map_err(|e| e.context("error syncing version branch"))?;

        let Some(text) = self.sync.read_file(&self.file)? else {
            debug!(file = %self.file, "version file absent, using initial version");
            return Ok(self.initial_version.clone());
        };

        let raw = text.trim();
        VersionRecord::parse(raw).map_err(|e| ResourceError::Validation {
            message: format!("invalid version: {}", raw),
            cause: Some(Box::new(e)),
        })
    }

    /// Store `version` and push it to the version branch
    pub fn write(&self, version: &VersionRecord) -> Result<()> {
        let text = version.to_string();
        self.sync.write_file(&self.file, &text)?;
        self.sync.publish(
            &self.branch,
            &[self.file.as_str()],
            &format!("bumped version to {}", text),
        )?;
        info!(version = %text, branch = %self.branch, "version written");
        Ok(())
    }
}
