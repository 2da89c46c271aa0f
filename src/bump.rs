//! Atomic read-bump-publish of the stored version

use crate::boundary::BoundaryWarning;
use crate::domain::{BumpPolicy, VersionRecord};
use crate::error::Result;
use crate::git::CommandRunner;
use crate::store::VersionStore;
use tracing::{debug, info, warn};

/// Advances the stored version under a bump policy
pub struct BumpOrchestrator<R: CommandRunner> {
    store: VersionStore<R>,
    rounds: u32,
}

impl<R: CommandRunner> BumpOrchestrator<R> {
    pub fn new(store: VersionStore<R>) -> Self {
        BumpOrchestrator { store, rounds: 3 }
    }

    /// Full read-bump-publish rounds before a conflict is reported
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds.max(1);
        self
    }

    pub fn store(&self) -> &VersionStore<R> {
        &self.store
    }

    /// Read, bump and publish; returns the version now stored
    ///
    /// A policy that leaves the version unchanged publishes nothing. When the
    /// push keeps being rejected the whole cycle restarts from a fresh read,
    /// so the published value always derives from the tip it lands on.
    ///
    /// # Returns
    /// * `Ok(VersionRecord)` - The new version, or the current one if unchanged
    /// * `Err` - Read failures as reported by the store; write failures
    ///   prefixed with `error publishing bump`
    pub fn bump(&self, policy: &BumpPolicy) -> Result<VersionRecord> {
        let mut round = 0;
        loop {
            round += 1;
            let current = self.store.read()?;
            let next = policy.apply(&current);

            if next == current {
                debug!(policy = %policy, "policy leaves the version as it is");
                BoundaryWarning::UnchangedVersion {
                    version: current.to_string(),
                }
                .emit();
                return Ok(current);
            }

            match self.store.write(&next) {
                Ok(()) => {
                    info!(from = %current, to = %next, "bumped version");
                    return Ok(next);
                }
                Err(e) if e.is_conflict() && round < self.rounds => {
                    warn!(round, rounds = self.rounds, error = %e, "publishing kept conflicting, re-reading");
                }
                Err(e) => return Err(e.context("error publishing bump")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryConfig;
    use crate::error::ResourceError;
    use crate::git::{CommandError, RepositorySync, RetryPolicy, ScriptedRunner, Workspace};
    use crate::models::Source;
    use std::fs;
    use tempfile::TempDir;

    fn orchestrator(dir: &TempDir, runner: &ScriptedRunner) -> BumpOrchestrator<ScriptedRunner> {
        let config = RepositoryConfig::from_source(&Source {
            uri: "git@example.com:org/repo.git".to_string(),
            version_file: "number".to_string(),
            private_key: Some("key".to_string()),
            ..Source::default()
        })
        .unwrap();
        let sync = RepositorySync::new(runner.clone(), &config.remote_uri, Workspace::at(dir.path()))
            .with_retry(RetryPolicy::immediate(2));
        BumpOrchestrator::new(VersionStore::new(sync, &config)).with_rounds(2)
    }

    fn stored(text: &str) -> (TempDir, ScriptedRunner) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("number"), text).unwrap();
        (dir, ScriptedRunner::new())
    }

    #[test]
    fn test_bump_publishes_new_version() {
        let (dir, runner) = stored("1.2.3\n");

        let next = orchestrator(&dir, &runner)
            .bump(&BumpPolicy::Minor(String::new()))
            .unwrap();

        assert_eq!(next.to_string(), "1.3.0");
        assert_eq!(fs::read_to_string(dir.path().join("number")).unwrap(), "1.3.0");
        assert_eq!(runner.count(" push origin version"), 1);
    }

    #[test]
    fn test_unchanged_version_is_not_written() {
        for policy in [BumpPolicy::Final, BumpPolicy::Identity] {
            let (dir, runner) = stored("1.2.3");

            let result = orchestrator(&dir, &runner).bump(&policy).unwrap();

            assert_eq!(result.to_string(), "1.2.3");
            assert_eq!(runner.count(" add "), 0);
            assert_eq!(runner.count(" commit "), 0);
            assert_eq!(runner.count(" push "), 0);
            assert_eq!(fs::read_to_string(dir.path().join("number")).unwrap(), "1.2.3");
        }
    }

    #[test]
    fn test_read_errors_are_returned_verbatim() {
        let (dir, runner) = stored("garbage");

        let err = orchestrator(&dir, &runner)
            .bump(&BumpPolicy::Patch(String::new()))
            .unwrap_err();

        assert!(matches!(err, ResourceError::Validation { .. }));
        assert_eq!(err.to_string(), "invalid version: garbage");
    }

    #[test]
    fn test_write_errors_are_labeled() {
        let (dir, runner) = stored("1.0.0");
        runner.fail(" push ", "exit code 128", "fatal: Authentication failed");

        let err = orchestrator(&dir, &runner)
            .bump(&BumpPolicy::Patch(String::new()))
            .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("error publishing bump: git push of branch 'version' failed"));
    }

    #[test]
    fn test_conflicts_restart_from_a_fresh_read() {
        let (dir, runner) = stored("1.0.0");
        runner.script(
            " push ",
            vec![
                Err(CommandError::new("", "exit code 1", "! [rejected] (fetch first)")),
                Err(CommandError::new("", "exit code 1", "! [rejected] (fetch first)")),
            ],
            Ok(String::new()),
        );

        let next = orchestrator(&dir, &runner)
            .bump(&BumpPolicy::Patch(String::new()))
            .unwrap();

        // the scripted fetch leaves the bumped file in place, so the second
        // round reads 1.0.1 and publishes 1.0.2
        assert_eq!(next.to_string(), "1.0.2");
        assert_eq!(runner.count(" reset --hard "), 2);
        assert_eq!(runner.count(" push "), 3);
    }

    #[test]
    fn test_conflicts_beyond_rounds_are_reported() {
        let (dir, runner) = stored("1.0.0");
        runner.fail(" push ", "exit code 1", "! [rejected] version -> version (non-fast-forward)");

        let err = orchestrator(&dir, &runner)
            .bump(&BumpPolicy::Major(String::new()))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "error publishing bump: push to branch 'version' was rejected 2 time(s)"
        );
        assert_eq!(runner.count(" push "), 4);
    }
}
