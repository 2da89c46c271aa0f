//! Bump policies and the pure version arithmetic behind them

use crate::domain::{PreRelease, VersionRecord};
use std::fmt;

/// How the stored version should advance
///
/// The `String` carried by the component variants is the requested
/// pre-release label; an empty string means "no pre-release".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpPolicy {
    Patch(String),
    Minor(String),
    Major(String),
    PreRelease(String),
    Final,
    Identity,
}

impl BumpPolicy {
    /// Build a policy from the `bump` and `pre` request params
    ///
    /// - `patch`, `minor`, `major` (any case) bump that component, tagged with `pre`
    /// - `final` strips the pre-release
    /// - empty `bump` with a non-empty `pre` bumps the pre-release only
    /// - anything else is [BumpPolicy::Identity]
    ///
    /// Returns the policy and whether the params were recognized. Both empty
    /// params map to Identity and count as recognized.
    pub fn from_params(bump: &str, pre: &str) -> (Self, bool) {
        let bump = bump.trim();
        let pre = pre.trim();

        // The tag always gains a counter, so it must parse as a labelled pre-release
        if !pre.is_empty() && PreRelease::parse(&format!("{}.1", pre)).is_err() {
            return (BumpPolicy::Identity, false);
        }

        let policy = match bump.to_ascii_lowercase().as_str() {
            "" if pre.is_empty() => return (BumpPolicy::Identity, true),
            "" => BumpPolicy::PreRelease(pre.to_string()),
            "patch" => BumpPolicy::Patch(pre.to_string()),
            "minor" => BumpPolicy::Minor(pre.to_string()),
            "major" => BumpPolicy::Major(pre.to_string()),
            "final" => BumpPolicy::Final,
            _ => return (BumpPolicy::Identity, false),
        };

        (policy, true)
    }

    /// Compute the next version; never fails
    ///
    /// - **Patch**: patch += 1
    /// - **Minor**: minor += 1, patch = 0
    /// - **Major**: major += 1, minor = 0, patch = 0
    /// - **PreRelease**: numbers unchanged, tag applied to the current pre-release
    /// - **Final**: pre-release removed
    /// - **Identity**: unchanged
    ///
    /// Component bumps clear the pre-release before applying their tag.
    pub fn apply(&self, current: &VersionRecord) -> VersionRecord {
        match self {
            BumpPolicy::Patch(tag) => {
                let next = VersionRecord::new(
                    current.major,
                    current.minor,
                    current.patch.saturating_add(1),
                );
                apply_tag(next, tag)
            }
            BumpPolicy::Minor(tag) => {
                let next = VersionRecord::new(current.major, current.minor.saturating_add(1), 0);
                apply_tag(next, tag)
            }
            BumpPolicy::Major(tag) => {
                let next = VersionRecord::new(current.major.saturating_add(1), 0, 0);
                apply_tag(next, tag)
            }
            BumpPolicy::PreRelease(tag) => apply_tag(current.clone(), tag),
            BumpPolicy::Final => current.clone().with_pre_release(None),
            BumpPolicy::Identity => current.clone(),
        }
    }
}

/// Same label again increments its counter; a new label starts at 1
fn apply_tag(version: VersionRecord, tag: &str) -> VersionRecord {
    if tag.is_empty() {
        return version.with_pre_release(None);
    }

    let pre_release = match &version.pre_release {
        Some(current) if current.label == tag => current.increment_counter(),
        _ => PreRelease::new(tag, Some(1)),
    };

    version.with_pre_release(Some(pre_release))
}

impl fmt::Display for BumpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, tag) = match self {
            BumpPolicy::Patch(tag) => ("patch", tag.as_str()),
            BumpPolicy::Minor(tag) => ("minor", tag.as_str()),
            BumpPolicy::Major(tag) => ("major", tag.as_str()),
            BumpPolicy::PreRelease(tag) => ("pre-release", tag.as_str()),
            BumpPolicy::Final => ("final", ""),
            BumpPolicy::Identity => ("none", ""),
        };
        if tag.is_empty() {
            write!(f, "{}", name)
        } else {
            write!(f, "{} ({})", name, tag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> VersionRecord {
        VersionRecord::parse(text).unwrap()
    }

    #[test]
    fn test_component_bumps() {
        let current = v("1.2.3");
        assert_eq!(BumpPolicy::Patch(String::new()).apply(&current), v("1.2.4"));
        assert_eq!(BumpPolicy::Minor(String::new()).apply(&current), v("1.3.0"));
        assert_eq!(BumpPolicy::Major(String::new()).apply(&current), v("2.0.0"));
    }

    #[test]
    fn test_component_bumps_with_tag() {
        let current = v("1.2.3");
        let pre = "pre".to_string();
        assert_eq!(BumpPolicy::Patch(pre.clone()).apply(&current), v("1.2.4-pre.1"));
        assert_eq!(BumpPolicy::Minor(pre.clone()).apply(&current), v("1.3.0-pre.1"));
        assert_eq!(BumpPolicy::Major(pre).apply(&current), v("2.0.0-pre.1"));
    }

    #[test]
    fn test_component_bump_clears_pre_release_before_tagging() {
        let current = v("1.2.3-rc.4");
        assert_eq!(BumpPolicy::Minor(String::new()).apply(&current), v("1.3.0"));
        assert_eq!(BumpPolicy::Patch("rc".into()).apply(&current), v("1.2.4-rc.1"));
    }

    #[test]
    fn test_pre_release_continuity() {
        let policy = BumpPolicy::PreRelease("rc".to_string());
        let first = policy.apply(&v("1.0.0"));
        assert_eq!(first, v("1.0.0-rc.1"));
        assert_eq!(policy.apply(&first), v("1.0.0-rc.2"));
    }

    #[test]
    fn test_pre_release_label_change_resets_counter() {
        let next = BumpPolicy::PreRelease("beta".to_string()).apply(&v("1.0.0-rc.1"));
        assert_eq!(next, v("1.0.0-beta.1"));
    }

    #[test]
    fn test_pre_release_without_counter_starts_at_one() {
        let next = BumpPolicy::PreRelease("rc".to_string()).apply(&v("1.0.0-rc"));
        assert_eq!(next, v("1.0.0-rc.1"));
    }

    #[test]
    fn test_final_strips_pre_release() {
        assert_eq!(BumpPolicy::Final.apply(&v("1.0.0-rc.3")), v("1.0.0"));
        assert_eq!(BumpPolicy::Final.apply(&v("1.0.0")), v("1.0.0"));
    }

    #[test]
    fn test_identity_is_unchanged() {
        let current = v("3.1.4-beta.2");
        assert_eq!(BumpPolicy::Identity.apply(&current), current);
    }

    #[test]
    fn test_from_params() {
        assert_eq!(
            BumpPolicy::from_params("patch", ""),
            (BumpPolicy::Patch(String::new()), true)
        );
        assert_eq!(
            BumpPolicy::from_params("MAJOR", "rc"),
            (BumpPolicy::Major("rc".into()), true)
        );
        assert_eq!(
            BumpPolicy::from_params("", "beta"),
            (BumpPolicy::PreRelease("beta".into()), true)
        );
        assert_eq!(BumpPolicy::from_params("final", ""), (BumpPolicy::Final, true));
        assert_eq!(BumpPolicy::from_params("", ""), (BumpPolicy::Identity, true));
    }

    #[test]
    fn test_from_params_unrecognized_degrades_to_identity() {
        assert_eq!(
            BumpPolicy::from_params("sideways", ""),
            (BumpPolicy::Identity, false)
        );
        assert_eq!(
            BumpPolicy::from_params("patch", "bad tag!"),
            (BumpPolicy::Identity, false)
        );
    }

    #[test]
    fn test_from_params_rejects_leading_zero_tags() {
        for pre in ["rc.01", "007", "00", "alpha.01.beta"] {
            assert_eq!(
                BumpPolicy::from_params("patch", pre),
                (BumpPolicy::Identity, false),
                "pre '{}' should not be accepted",
                pre
            );
        }
        assert_eq!(
            BumpPolicy::from_params("patch", "rc.0"),
            (BumpPolicy::Patch("rc.0".into()), true)
        );
    }

    #[test]
    fn test_accepted_params_produce_parsable_versions() {
        let bumps = ["patch", "minor", "major", "final", ""];
        let tags = ["", "rc", "beta", "rc.2", "alpha.beta", "pre-release", "x-1.y", "7", "0", "build.0"];
        let starts = ["0.0.0", "1.2.3", "1.2.3-rc.4", "2.0.0-beta", "1.0.0-7.1"];

        for start in starts {
            let current = v(start);
            for bump in bumps {
                for pre in tags {
                    let (policy, recognized) = BumpPolicy::from_params(bump, pre);
                    assert!(recognized, "({}, {}) should be recognized", bump, pre);

                    let next = policy.apply(&current);
                    let text = next.to_string();
                    assert_eq!(
                        VersionRecord::parse(&text).ok(),
                        Some(next.clone()),
                        "{} under ({}, {}) produced '{}'",
                        start,
                        bump,
                        pre,
                        text
                    );

                    // applying again keeps the text readable
                    let again = policy.apply(&next);
                    assert_eq!(VersionRecord::parse(&again.to_string()).ok(), Some(again));
                }
            }
        }
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(BumpPolicy::Minor("rc".into()).to_string(), "minor (rc)");
        assert_eq!(BumpPolicy::Final.to_string(), "final");
    }
}
