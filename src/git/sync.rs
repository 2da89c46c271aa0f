//! Mirror one branch of a remote into a local workspace and publish back

use crate::boundary::BoundaryWarning;
use crate::domain::CommitRef;
use crate::error::{ResourceError, Result};
use crate::git::{quote, CommandError, CommandRunner};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Push output meaning "someone else moved the branch" or "nothing went out"
fn conflict_signal() -> &'static Regex {
    static SIGNAL: OnceLock<Regex> = OnceLock::new();
    SIGNAL.get_or_init(|| {
        Regex::new(r"\[(remote )?rejected\]|non-fast-forward|fetch first|Everything up-to-date")
            .expect("conflict pattern is valid")
    })
}

/// Log output meaning git does not know the baseline commit
fn unknown_revision_signal() -> &'static Regex {
    static SIGNAL: OnceLock<Regex> = OnceLock::new();
    SIGNAL.get_or_init(|| {
        Regex::new(r"unknown revision|bad revision|Invalid revision range|bad object")
            .expect("revision pattern is valid")
    })
}

/// How often a rejected push is retried before giving up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total push attempts, at least 1
    pub max_attempts: u32,
    /// Delay unit; attempt `n` waits `n * backoff` before retrying
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Retry immediately, used by tests
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(10, Duration::from_millis(250))
    }
}

/// Local directory mirroring a remote branch for one operation
///
/// A temporary workspace is removed when dropped.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    _guard: Option<TempDir>,
}

impl Workspace {
    /// A fresh, empty temporary directory
    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("semver-git-repo")
            .tempdir()?;
        Ok(Workspace {
            path: dir.path().to_path_buf(),
            _guard: Some(dir),
        })
    }

    /// Use an existing directory, left in place afterwards
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Workspace {
            path: path.into(),
            _guard: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or empty directories need a clone rather than a fetch
    fn needs_clone(&self) -> bool {
        match fs::read_dir(&self.path) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }
}

enum PushOutcome {
    Pushed,
    Conflict(Option<CommandError>, String),
}

/// Clone/fetch/reset and publish-with-retry against one remote
pub struct RepositorySync<R: CommandRunner> {
    runner: R,
    remote_uri: String,
    remote: String,
    workspace: Workspace,
    retry: RetryPolicy,
}

impl<R: CommandRunner> RepositorySync<R> {
    pub fn new(runner: R, remote_uri: impl Into<String>, workspace: Workspace) -> Self {
        RepositorySync {
            runner,
            remote_uri: remote_uri.into(),
            remote: "origin".to_string(),
            workspace,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the push retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Name of the remote the workspace fetches from and pushes to
    pub fn with_remote_name(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }

    fn git(&self, args: &str) -> String {
        format!(
            "git -C {} {}",
            quote(&self.workspace.path().to_string_lossy()),
            args
        )
    }

    fn run_stage(&self, stage: &str, branch: &str, command: &str) -> Result<String> {
        self.runner.run(command).map_err(|e| {
            ResourceError::sync(
                format!(
                    "git {} of branch '{}' failed: {}",
                    stage,
                    branch,
                    describe(&e)
                ),
                e,
            )
        })
    }

    /// Make the workspace mirror the remote tip of `branch`
    ///
    /// Clones into a missing or empty workspace, fetches otherwise, then
    /// hard-resets so no local change survives.
    pub fn sync_to(&self, branch: &str) -> Result<()> {
        if self.workspace.needs_clone() {
            info!(branch, workspace = %self.workspace.path().display(), "cloning");
            let command = format!(
                "git clone {} --origin {} --branch {} {}",
                quote(&self.remote_uri),
                quote(&self.remote),
                quote(branch),
                quote(&self.workspace.path().to_string_lossy())
            );
            self.run_stage("clone", branch, &command)?;
        } else {
            debug!(branch, "fetching");
            let command = self.git(&format!("fetch {} {}", quote(&self.remote), quote(branch)));
            self.run_stage("fetch", branch, &command)?;
        }

        let command = self.git(&format!(
            "reset --hard {}",
            quote(&format!("{}/{}", self.remote, branch))
        ));
        self.run_stage("reset", branch, &command)?;
        Ok(())
    }

    /// Commit `files` and push them to `branch`
    ///
    /// Rejected pushes (and pushes reporting "Everything up-to-date") rerun
    /// the whole add/commit/push sequence with the same content, up to
    /// `max_attempts` times. Any other failure is returned immediately.
    ///
    /// # Returns
    /// * `Ok(())` - The push was accepted
    /// * `Err(ResourceError::Conflict)` - Every attempt was rejected
    /// * `Err(ResourceError::Sync)` - A stage failed for another reason
    pub fn publish(&self, branch: &str, files: &[&str], message: &str) -> Result<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.stage(branch, files)?;
            self.commit(branch, message)?;

            match self.push(branch)? {
                PushOutcome::Pushed => {
                    info!(branch, attempt, "published");
                    return Ok(());
                }
                PushOutcome::Conflict(cause, output) => {
                    warn!(
                        branch,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        output = %output,
                        "push rejected, retrying"
                    );
                    if attempt >= self.retry.max_attempts {
                        return Err(ResourceError::Conflict {
                            branch: branch.to_string(),
                            attempts: attempt,
                            cause,
                        });
                    }
                    let delay = self.retry.delay_after(attempt);
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
            }
        }
    }

    fn stage(&self, branch: &str, files: &[&str]) -> Result<()> {
        let paths: Vec<String> = files.iter().map(|f| quote(f)).collect();
        let command = self.git(&format!("add -- {}", paths.join(" ")));
        self.run_stage("add", branch, &command)?;
        Ok(())
    }

    fn commit(&self, branch: &str, message: &str) -> Result<()> {
        let command = self.git(&format!("commit -m {}", quote(message)));
        match self.runner.run(&command) {
            Ok(_) => Ok(()),
            // A retry re-stages content that is already committed
            Err(e) if is_nothing_to_commit(&e.output) => {
                debug!(branch, "nothing to commit");
                Ok(())
            }
            Err(e) => Err(ResourceError::sync(
                format!("git commit on branch '{}' failed: {}", branch, describe(&e)),
                e,
            )),
        }
    }

    fn push(&self, branch: &str) -> Result<PushOutcome> {
        let command = self.git(&format!("push {} {}", quote(&self.remote), quote(branch)));
        match self.runner.run(&command) {
            Ok(output) if conflict_signal().is_match(&output) => {
                Ok(PushOutcome::Conflict(None, output))
            }
            Ok(_) => Ok(PushOutcome::Pushed),
            Err(e) if conflict_signal().is_match(&e.output) => {
                let output = e.output.clone();
                Ok(PushOutcome::Conflict(Some(e), output))
            }
            Err(e) => Err(ResourceError::sync(
                format!("git push of branch '{}' failed: {}", branch, describe(&e)),
                e,
            )),
        }
    }

    /// Contents of `path` relative to the workspace root, `None` if absent
    pub fn read_file(&self, path: &str) -> Result<Option<String>> {
        let full = self.workspace.path().join(path);
        if !full.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(full)?))
    }

    /// Write `content` to `path` relative to the workspace root
    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let full = self.workspace.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, content)?;
        Ok(())
    }

    /// Commit at the tip of the checked-out branch
    pub fn head_commit(&self) -> Result<CommitRef> {
        let output = self.runner.run(&self.git("rev-parse HEAD")).map_err(|e| {
            ResourceError::sync(format!("git rev-parse HEAD failed: {}", describe(&e)), e)
        })?;
        let hash = output.lines().map(str::trim).find(|l| !l.is_empty());
        match hash {
            Some(hash) => Ok(CommitRef::new(hash)),
            None => Err(ResourceError::Sync {
                message: "git rev-parse HEAD printed no commit".to_string(),
                cause: None,
            }),
        }
    }

    /// Commits reachable from HEAD but not from `baseline`, oldest first
    ///
    /// Falls back to the tip alone when git does not know `baseline`.
    pub fn commits_since(&self, baseline: &CommitRef) -> Result<Vec<CommitRef>> {
        let command = self.git(&format!(
            "log --reverse --format=%H {}",
            quote(&format!("{}..HEAD", baseline))
        ));

        match self.runner.run(&command) {
            Ok(output) => Ok(output
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(CommitRef::new)
                .collect()),
            Err(e) if unknown_revision_signal().is_match(&e.output) => {
                BoundaryWarning::UnknownBaselineRef {
                    commit: baseline.to_string(),
                }
                .emit();
                Ok(vec![self.head_commit()?])
            }
            Err(e) => Err(ResourceError::sync(
                format!("git log since '{}' failed: {}", baseline, describe(&e)),
                e,
            )),
        }
    }
}

fn is_nothing_to_commit(output: &str) -> bool {
    output.contains("nothing to commit") || output.contains("nothing added to commit")
}

/// Last meaningful line of the command output, or the exit reason
fn describe(err: &CommandError) -> String {
    err.output
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| err.message.clone())
}
