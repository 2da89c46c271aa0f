use crate::domain::PreRelease;
use crate::error::{ResourceError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version stored in the version branch
///
/// Canonical text is `major.minor.patch[-label[.counter]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRecord {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<PreRelease>,
}

impl VersionRecord {
    /// Create a release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        VersionRecord {
            major,
            minor,
            patch,
            pre_release: None,
        }
    }

    /// Same numeric triple with the given pre-release
    pub fn with_pre_release(mut self, pre_release: Option<PreRelease>) -> Self {
        self.pre_release = pre_release;
        self
    }

    /// Parse a version from its canonical text (e.g. "1.2.3" or "1.2.3-rc.1")
    ///
    /// The numeric core follows semver rules (no leading zeros, no `v`
    /// prefix). Build metadata is not part of the stored format and is
    /// rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let parsed = semver::Version::parse(text).map_err(|e| {
            ResourceError::validation(
                format!("cannot parse '{}' as a semantic version", text),
                Some(e),
            )
        })?;

        if !parsed.build.is_empty() {
            return Err(ResourceError::validation::<semver::Error>(
                format!("build metadata is not supported: '{}'", text),
                None,
            ));
        }

        let pre_release = if parsed.pre.is_empty() {
            None
        } else {
            Some(PreRelease::parse(parsed.pre.as_str())?)
        };

        Ok(VersionRecord {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            pre_release,
        })
    }

    /// True for versions without a pre-release suffix
    pub fn is_release(&self) -> bool {
        self.pre_release.is_none()
    }

    fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl Default for VersionRecord {
    fn default() -> Self {
        VersionRecord::new(0, 0, 0)
    }
}

impl Ord for VersionRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple()
            .cmp(&other.triple())
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for VersionRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for VersionRecord {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self> {
        VersionRecord::parse(s)
    }
}

impl fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}
