//! Pre-release suffix of a stored version
//!
//! A pre-release is a label with an optional counter, written `label` or
//! `label.N` after the `-` of a semantic version (e.g. `rc.2`, `beta.1`,
//! `nightly`). According to semver.org: https://semver.org/#spec-item-9

use crate::error::{ResourceError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Pre-release label with an optional counter
///
/// # Examples
/// - "rc" -> PreRelease { label: "rc", counter: None }
/// - "rc.1" -> PreRelease { label: "rc", counter: Some(1) }
/// - "alpha.beta.3" -> PreRelease { label: "alpha.beta", counter: Some(3) }
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreRelease {
    /// The pre-release label, never empty
    pub label: String,
    /// Counter incremented each time the same label is applied again
    pub counter: Option<u64>,
}

impl PreRelease {
    /// Create a new pre-release
    pub fn new(label: impl Into<String>, counter: Option<u64>) -> Self {
        PreRelease {
            label: label.into(),
            counter,
        }
    }

    /// Parse a pre-release from the text after the `-` of a version
    ///
    /// The last dot-separated identifier is the counter when it is numeric;
    /// the remaining identifiers form the label.
    ///
    /// # Returns
    /// * `Ok(PreRelease)` - Parsed pre-release
    /// * `Err` - If the text is empty, has empty identifiers, contains
    ///   characters outside `[0-9A-Za-z-]`, or has no label
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ResourceError::validation::<std::num::ParseIntError>(
                "empty pre-release identifier",
                None,
            ));
        }

        let identifiers: Vec<&str> = s.split('.').collect();
        for identifier in &identifiers {
            if !is_valid_identifier(identifier) {
                return Err(ResourceError::validation::<std::num::ParseIntError>(
                    format!("invalid pre-release identifier: '{}'", s),
                    None,
                ));
            }
            if has_leading_zero(identifier) {
                return Err(ResourceError::validation::<std::num::ParseIntError>(
                    format!("numeric pre-release identifier has a leading zero: '{}'", s),
                    None,
                ));
            }
        }

        let (label_parts, counter) = match identifiers.split_last() {
            Some((last, rest)) if is_numeric(last) => {
                let counter = last.parse::<u64>().map_err(|e| {
                    ResourceError::validation(
                        format!("invalid pre-release counter: '{}'", last),
                        Some(e),
                    )
                })?;
                (rest, Some(counter))
            }
            _ => (identifiers.as_slice(), None),
        };

        if label_parts.is_empty() {
            return Err(ResourceError::validation::<std::num::ParseIntError>(
                format!("pre-release '{}' has no label", s),
                None,
            ));
        }

        Ok(PreRelease {
            label: label_parts.join("."),
            counter,
        })
    }

    /// Increment the counter
    ///
    /// If the counter is None, returns Some(1). Otherwise increments by 1.
    pub fn increment_counter(&self) -> Self {
        let counter = match self.counter {
            Some(n) => Some(n.saturating_add(1)),
            None => Some(1),
        };

        PreRelease {
            label: self.label.clone(),
            counter,
        }
    }
}

fn is_numeric(identifier: &str) -> bool {
    identifier.chars().all(|c| c.is_ascii_digit())
}

/// Numeric identifiers must not carry leading zeros (`01`, `007`)
fn has_leading_zero(identifier: &str) -> bool {
    identifier.len() > 1 && identifier.starts_with('0') && is_numeric(identifier)
}

/// Checks a single dot-separated identifier of a pre-release
fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl FromStr for PreRelease {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self> {
        PreRelease::parse(s)
    }
}

impl Ord for PreRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.counter.cmp(&other.counter))
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)?;
        if let Some(counter) = self.counter {
            write!(f, ".{}", counter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerelease_parse_with_counter() {
        let pr = PreRelease::parse("beta.1").unwrap();
        assert_eq!(pr.label, "beta");
        assert_eq!(pr.counter, Some(1));
    }

    #[test]
    fn test_prerelease_parse_no_counter() {
        let pr = PreRelease::parse("alpha").unwrap();
        assert_eq!(pr.label, "alpha");
        assert_eq!(pr.counter, None);
    }

    #[test]
    fn test_prerelease_parse_dotted_label() {
        let pr = PreRelease::parse("alpha.beta.3").unwrap();
        assert_eq!(pr.label, "alpha.beta");
        assert_eq!(pr.counter, Some(3));
    }

    #[test]
    fn test_prerelease_parse_custom_with_hyphen() {
        let pr = PreRelease::parse("release-candidate.5").unwrap();
        assert_eq!(pr.label, "release-candidate");
        assert_eq!(pr.counter, Some(5));
    }

    #[test]
    fn test_prerelease_parse_invalid() {
        assert!(PreRelease::parse("").is_err());
        assert!(PreRelease::parse("invalid!name").is_err());
        assert!(PreRelease::parse("rc..1").is_err());
        assert!(PreRelease::parse("7").is_err());
        assert!(PreRelease::parse("rc.01").is_err());
        assert!(PreRelease::parse("rc.01.2").is_err());
        assert!(PreRelease::parse("007.1").is_err());
        assert!(PreRelease::parse("rc.0").is_ok());
    }

    #[test]
    fn test_prerelease_increment_with_counter() {
        let pr = PreRelease::parse("rc.1").unwrap();
        let incremented = pr.increment_counter();
        assert_eq!(incremented.label, "rc");
        assert_eq!(incremented.counter, Some(2));
    }

    #[test]
    fn test_prerelease_increment_from_none() {
        let pr = PreRelease::new("alpha", None);
        assert_eq!(pr.increment_counter().counter, Some(1));
    }

    #[test]
    fn test_prerelease_ordering() {
        let alpha = PreRelease::parse("alpha.9").unwrap();
        let beta = PreRelease::parse("beta.1").unwrap();
        let beta2 = PreRelease::parse("beta.2").unwrap();
        let bare = PreRelease::parse("beta").unwrap();

        assert!(alpha < beta);
        assert!(beta < beta2);
        assert!(bare < beta);
    }

    #[test]
    fn test_prerelease_display() {
        assert_eq!(PreRelease::parse("rc.2").unwrap().to_string(), "rc.2");
        assert_eq!(PreRelease::parse("alpha").unwrap().to_string(), "alpha");
    }
}
