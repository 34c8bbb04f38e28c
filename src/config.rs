//! Release configuration.
//!
//! [`ReleaseConfig`] is the read-only input to a run. It is assembled by the
//! command layer from CLI flags and GitHub Actions inputs and is not mutated
//! afterwards.

use std::fmt;
use std::str::FromStr;

use crate::error::ReleaseError;
use crate::pattern::VersionPattern;

/// Which version component a release bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Increment {
    Major,
    Minor,
    Patch,
}

impl Increment {
    /// Bump `(major, minor, patch)`, zeroing every less significant part.
    ///
    /// `None` when the bumped component would overflow.
    pub fn apply(self, major: u64, minor: u64, patch: u64) -> Option<(u64, u64, u64)> {
        match self {
            Increment::Major => Some((major.checked_add(1)?, 0, 0)),
            Increment::Minor => Some((major, minor.checked_add(1)?, 0)),
            Increment::Patch => Some((major, minor, patch.checked_add(1)?)),
        }
    }
}

impl FromStr for Increment {
    type Err = ReleaseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(Increment::Major),
            "minor" => Ok(Increment::Minor),
            "patch" => Ok(Increment::Patch),
            _ => Err(ReleaseError::configuration(format!(
                "unsupported incremented-value '{}' (expected major, minor or patch)",
                value
            ))),
        }
    }
}

impl fmt::Display for Increment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Increment::Major => "major",
            Increment::Minor => "minor",
            Increment::Patch => "patch",
        };
        f.write_str(name)
    }
}

/// Interpret an action-style boolean input. Only `"true"` is true.
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Everything that steers version resolution and publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Version used when no previous tag matches.
    pub default_version: String,
    /// Literal prefix of version tags, e.g. `v`.
    pub tag_prefix: String,
    /// Raw `incremented-value` input; parsed by [`ReleaseConfig::increment`].
    pub increment: String,
    pub prerelease: Option<String>,
    pub metadata: Option<String>,
    pub dry_run: bool,
    pub add_major_tag: bool,
    pub add_minor_tag: bool,
    /// `"true"`, `"false"`, or a ref name that should produce a release.
    pub create_release: Option<String>,
    /// Restrict the previous-tag search to this major version.
    pub previous_major: Option<String>,
    /// Restrict the previous-tag search to this minor version.
    pub previous_minor: Option<String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            default_version: "0.1.0".to_string(),
            tag_prefix: "v".to_string(),
            increment: "patch".to_string(),
            prerelease: None,
            metadata: None,
            dry_run: false,
            add_major_tag: false,
            add_minor_tag: false,
            create_release: None,
            previous_major: None,
            previous_minor: None,
        }
    }
}

impl ReleaseConfig {
    /// Parse the configured increment mode.
    pub fn increment(&self) -> Result<Increment, ReleaseError> {
        self.increment.parse()
    }

    /// Configured prerelease identifier, `None` when unset or blank.
    pub fn prerelease(&self) -> Option<&str> {
        non_empty(self.prerelease.as_deref())
    }

    /// Configured build metadata, `None` when unset or blank.
    pub fn metadata(&self) -> Option<&str> {
        non_empty(self.metadata.as_deref())
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease().is_some()
    }

    /// Whether the full version should be published as a release rather than
    /// a plain tag ref.
    ///
    /// Unset means yes. Otherwise the value must be exactly `"true"` or name
    /// the ref the run was triggered from.
    pub fn should_create_release(&self, ref_name: Option<&str>) -> bool {
        match self.create_release.as_deref() {
            None => true,
            Some(value) if value.trim().is_empty() => true,
            Some(value) => value == "true" || ref_name == Some(value),
        }
    }

    /// Matcher for selecting the previous version tag.
    pub fn tag_pattern(&self) -> Result<VersionPattern, ReleaseError> {
        VersionPattern::build(
            &self.tag_prefix,
            non_empty(self.previous_major.as_deref()),
            non_empty(self.previous_minor.as_deref()),
            false,
        )
    }

    /// Matcher for validating the default version, which may omit the
    /// prefix.
    pub fn default_version_pattern(&self) -> Result<VersionPattern, ReleaseError> {
        VersionPattern::build(&self.tag_prefix, None, None, true)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
