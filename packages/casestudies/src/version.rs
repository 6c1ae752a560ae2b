// ABOUTME: Version policy for case studies
// ABOUTME: "major.minor" tags; feedback bumps minor, publishing pins 1.0

use std::fmt;
use std::str::FromStr;

/// First version assigned on initial submission
pub const INITIAL_VERSION: &str = "0.1";

/// Version every case study is pinned to on publication
pub const PUBLISHED_VERSION: &str = "1.0";

/// A parsed "major.minor" version tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    /// The version after one incorporate-feedback cycle: minor + 1, major
    /// untouched
    pub fn bump_minor(self) -> Version {
        Version {
            major: self.major,
            minor: self.minor + 1,
        }
    }
}

impl FromStr for Version {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.trim().split_once('.').ok_or(())?;
        Ok(Version {
            major: major.parse().map_err(|_| ())?,
            minor: minor.parse().map_err(|_| ())?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The version a record receives after incorporate-feedback. A missing or
/// unparseable current version falls back to the initial base rather than
/// erroring: version tags are bookkeeping, not correctness-critical input.
pub fn next_feedback_version(current: Option<&str>) -> String {
    match current.and_then(|v| Version::from_str(v).ok()) {
        Some(version) => version.bump_minor().to_string(),
        None => INITIAL_VERSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_bump_is_monotonic() {
        assert_eq!(next_feedback_version(Some("0.1")), "0.2");
        assert_eq!(next_feedback_version(Some("0.2")), "0.3");
        assert_eq!(next_feedback_version(Some("0.9")), "0.10");
        assert_eq!(next_feedback_version(Some("1.5")), "1.6");
        assert_eq!(next_feedback_version(Some("12.34")), "12.35");
    }

    #[test]
    fn test_major_component_untouched() {
        for current in ["0.1", "1.0", "3.7"] {
            let bumped: Version = next_feedback_version(Some(current)).parse().unwrap();
            let original: Version = current.parse().unwrap();
            assert_eq!(bumped.major, original.major);
            assert_eq!(bumped.minor, original.minor + 1);
        }
    }

    #[test]
    fn test_missing_or_garbage_version_falls_back_to_base() {
        assert_eq!(next_feedback_version(None), INITIAL_VERSION);
        assert_eq!(next_feedback_version(Some("")), INITIAL_VERSION);
        assert_eq!(next_feedback_version(Some("not-a-version")), INITIAL_VERSION);
        assert_eq!(next_feedback_version(Some("1.x")), INITIAL_VERSION);
    }
}
