use crate::git::{CommandError, CommandRunner};
use std::collections::BTreeMap;
use std::process::Command;
use tracing::debug;

/// Runs commands through `sh -c` with accumulated environment overrides
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    env: BTreeMap<String, String>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment overrides applied to every command
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

impl CommandRunner for ShellRunner {
    fn set_env(&mut self, key: &str, value: &str) {
        self.env.insert(key.to_string(), value.to_string());
    }

    fn run(&self, command: &str) -> Result<String, CommandError> {
        debug!(command, "running");

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .envs(&self.env)
            .output()
            .map_err(|e| CommandError::new(command, format!("failed to start: {}", e), ""))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = match (stdout.trim(), stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        };

        if output.status.success() {
            Ok(combined)
        } else {
            Err(CommandError::new(
                command,
                format!("exit code {}", output.status.code().unwrap_or(-1)),
                combined,
            ))
        }
    }
}
