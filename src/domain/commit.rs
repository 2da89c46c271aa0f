use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque commit identifier on the source branch
///
/// Only ever compared and passed back to git; never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitRef(String);

impl CommitRef {
    pub fn new(hash: impl Into<String>) -> Self {
        CommitRef(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty ref means "no baseline yet"
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitRef {
    fn from(hash: &str) -> Self {
        CommitRef::new(hash)
    }
}
