use std::fmt;
use tracing::warn;

/// Non-fatal degradations met while serving a request.
/// The operation continues with a fallback; the operator should still know.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The baseline version from the orchestrator does not parse
    InvalidBaselineVersion { raw: String },
    /// The baseline commit is unknown to the source repository
    UnknownBaselineRef { commit: String },
    /// The bump parameters name no known policy
    UnrecognizedBump { bump: String, pre: String },
    /// The bump left the stored version as it was
    UnchangedVersion { version: String },
}

impl BoundaryWarning {
    /// Report the warning through the log
    pub fn emit(&self) {
        warn!(kind = self.kind(), "{}", self);
    }

    fn kind(&self) -> &'static str {
        match self {
            BoundaryWarning::InvalidBaselineVersion { .. } => "invalid_baseline_version",
            BoundaryWarning::UnknownBaselineRef { .. } => "unknown_baseline_ref",
            BoundaryWarning::UnrecognizedBump { .. } => "unrecognized_bump",
            BoundaryWarning::UnchangedVersion { .. } => "unchanged_version",
        }
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::InvalidBaselineVersion { raw } => {
                write!(
                    f,
                    "Cannot parse baseline version '{}', checking from 0.0.0",
                    raw
                )
            }
            BoundaryWarning::UnknownBaselineRef { commit } => {
                let short = commit.get(..7).unwrap_or(commit);
                write!(
                    f,
                    "Baseline commit '{}' not found on the source branch, using the tip",
                    short
                )
            }
            BoundaryWarning::UnrecognizedBump { bump, pre } => {
                write!(
                    f,
                    "Unrecognized bump '{}' (pre '{}'), leaving the version unchanged",
                    bump, pre
                )
            }
            BoundaryWarning::UnchangedVersion { version } => {
                write!(f, "Version {} unchanged, nothing published", version)
            }
        }
    }
}
