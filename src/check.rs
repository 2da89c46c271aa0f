//! Discovering new version/commit pairs since a baseline

use crate::domain::{CommitRef, VersionRecord};
use crate::error::Result;
use crate::git::{CommandRunner, RepositorySync};
use crate::store::VersionStore;
use tracing::debug;

/// One discovered version: the stored number paired with a source commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedVersion {
    pub version: VersionRecord,
    pub commit: CommitRef,
}

/// Answers "what is new since the caller's baseline"
pub struct CheckEngine<R: CommandRunner> {
    store: VersionStore<R>,
    source: RepositorySync<R>,
    source_branch: String,
}

impl<R: CommandRunner> CheckEngine<R> {
    pub fn new(
        store: VersionStore<R>,
        source: RepositorySync<R>,
        source_branch: impl Into<String>,
    ) -> Self {
        CheckEngine {
            store,
            source,
            source_branch: source_branch.into(),
        }
    }

    /// The stored version if it is at least `baseline`
    pub fn check_version(&self, baseline: &VersionRecord) -> Result<Option<VersionRecord>> {
        let stored = self.store.read()?;
        if stored >= *baseline {
            Ok(Some(stored))
        } else {
            debug!(stored = %stored, baseline = %baseline, "stored version is behind the baseline");
            Ok(None)
        }
    }

    /// Source commits after `baseline`, oldest first
    ///
    /// With an empty baseline only the current tip is returned.
    pub fn check_refs(&self, baseline: &CommitRef) -> Result<Vec<CommitRef>> {
        self.source.sync_to(&self.source_branch)?;

        if baseline.is_empty() {
            return Ok(vec![self.source.head_commit()?]);
        }
        self.source.commits_since(baseline)
    }

    /// Pair the qualifying version with every new commit
    ///
    /// The version gates the result: without a qualifying version the source
    /// branch is not consulted and nothing is returned.
    pub fn check(
        &self,
        baseline: &VersionRecord,
        baseline_ref: &CommitRef,
    ) -> Result<Vec<CheckedVersion>> {
        let Some(version) = self
            .check_version(baseline)
            .map_err(|e| e.context("error checking version"))?
        else {
            return Ok(Vec::new());
        };

        let commits = self
            .check_refs(baseline_ref)
            .map_err(|e| e.context("error checking refs"))?;

        Ok(commits
            .into_iter()
            .map(|commit| CheckedVersion {
                version: version.clone(),
                commit,
            })
            .collect())
    }
}
