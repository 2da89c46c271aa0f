//! Per-operation credential staging
//!
//! Key material lives in a private temporary directory for exactly as long as
//! the [CredentialScope] does, and reaches git only through environment
//! overrides on the runner. Nothing is written to the user's home directory.

use crate::config::Credentials;
use crate::error::{ResourceError, Result};
use crate::git::{quote, CommandRunner};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Staged credentials, removed from disk on drop
#[derive(Debug)]
pub struct CredentialScope {
    dir: TempDir,
    private_key: Option<PathBuf>,
    netrc: Option<PathBuf>,
}

impl CredentialScope {
    /// Write the credentials to a private directory and point `runner` at them
    ///
    /// - a private key becomes `GIT_SSH_COMMAND` with host key checking disabled
    /// - a username/password pair becomes a `.netrc` in a scoped `HOME`
    /// - `GIT_TERMINAL_PROMPT=0` so git fails instead of waiting for input
    /// - `skip_ssl_verification` sets `GIT_SSL_NO_VERIFY`
    ///
    /// # Returns
    /// * `Ok(CredentialScope)` - Keep alive until the operation finishes
    /// * `Err` - Passphrase-protected keys, or files that cannot be written
    pub fn stage<R: CommandRunner>(
        credentials: &Credentials,
        skip_ssl_verification: bool,
        runner: &mut R,
    ) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("semver-git-credentials")
            .tempdir()?;
        let mut scope = CredentialScope {
            dir,
            private_key: None,
            netrc: None,
        };

        if let Some(key) = credentials.private_key.as_deref().filter(|k| !k.is_empty()) {
            if key.contains("ENCRYPTED") {
                return Err(ResourceError::config(
                    "private keys with passphrases are not supported",
                ));
            }
            let path = scope.dir.path().join("private-key");
            write_private(&path, &ensure_trailing_newline(key))?;
            runner.set_env(
                "GIT_SSH_COMMAND",
                &format!(
                    "ssh -o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null -i {}",
                    quote(&path.to_string_lossy())
                ),
            );
            debug!(path = %path.display(), "staged private key");
            scope.private_key = Some(path);
        }

        if let (Some(username), Some(password)) = (
            credentials.username.as_deref().filter(|u| !u.is_empty()),
            credentials.password.as_deref().filter(|p| !p.is_empty()),
        ) {
            // netrc tokens are whitespace separated and cannot be quoted
            if username.chars().chain(password.chars()).any(char::is_whitespace) {
                return Err(ResourceError::config(
                    "usernames and passwords containing whitespace are not supported",
                ));
            }
            let path = scope.dir.path().join(".netrc");
            write_private(
                &path,
                &format!("default login {} password {}\n", username, password),
            )?;
            runner.set_env("HOME", &scope.dir.path().to_string_lossy());
            debug!(path = %path.display(), "staged netrc");
            scope.netrc = Some(path);
        }

        runner.set_env("GIT_TERMINAL_PROMPT", "0");
        if skip_ssl_verification {
            runner.set_env("GIT_SSL_NO_VERIFY", "true");
        }

        Ok(scope)
    }

    /// Directory holding the staged files
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn private_key_path(&self) -> Option<&Path> {
        self.private_key.as_deref()
    }

    pub fn netrc_path(&self) -> Option<&Path> {
        self.netrc.as_deref()
    }
}

fn ensure_trailing_newline(key: &str) -> String {
    if key.ends_with('\n') {
        key.to_string()
    } else {
        format!("{}\n", key)
    }
}

/// Write a file readable only by the current user
fn write_private(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
