//! Next-version resolution.

use crate::config::ReleaseConfig;
use crate::error::ReleaseError;
use crate::pattern::VersionMatch;

/// The most recent existing version tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousVersion {
    /// Tag name as listed, prefix included.
    pub name: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl From<VersionMatch> for PreviousVersion {
    fn from(m: VersionMatch) -> Self {
        Self {
            name: m.text,
            major: m.major,
            minor: m.minor,
            patch: m.patch,
        }
    }
}

/// The version a run publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// `core[-prerelease][+metadata]`, without the tag prefix.
    pub semver: String,
    /// `MAJOR.MINOR.PATCH`.
    pub core: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    prerelease: bool,
}

impl ResolvedVersion {
    fn new(
        (major, minor, patch): (u64, u64, u64),
        prerelease: Option<&str>,
        metadata: Option<&str>,
    ) -> Self {
        let core = format_version(major, minor, patch);
        let mut semver = core.clone();
        if let Some(pre) = prerelease {
            semver.push('-');
            semver.push_str(pre);
        }
        if let Some(meta) = metadata {
            semver.push('+');
            semver.push_str(meta);
        }

        Self {
            semver,
            core,
            major,
            minor,
            patch,
            prerelease: prerelease.is_some(),
        }
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease
    }

    /// `{prefix}{semver}`
    pub fn full_tag(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.semver)
    }

    /// Floating `{prefix}{major}` alias.
    pub fn major_tag(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.major)
    }

    /// Floating `{prefix}{major}.{minor}` alias.
    pub fn minor_tag(&self, prefix: &str) -> String {
        format!("{}{}.{}", prefix, self.major, self.minor)
    }
}

/// Compute the next version from the previous tag and the configuration.
///
/// With a previous tag the configured component is bumped. Without one the
/// default version is used as-is: no increment is applied, and a suffix it
/// carries is kept unless the configuration sets its own.
///
/// # Errors
///
/// Returns [`ReleaseError::Configuration`] when the increment mode is not
/// `major`, `minor` or `patch`, when the bumped component would overflow, or
/// when the default version is needed but is not a valid version.
pub fn resolve_next(
    previous: Option<&PreviousVersion>,
    config: &ReleaseConfig,
) -> Result<ResolvedVersion, ReleaseError> {
    let increment = config.increment()?;

    let Some(prev) = previous else {
        let default = config.default_version.trim();
        let parsed = config
            .default_version_pattern()?
            .captures(default)
            .filter(|m| m.text == default)
            .ok_or_else(|| {
                ReleaseError::configuration(format!(
                    "default-version '{}' is not a valid version",
                    config.default_version
                ))
            })?;
        return Ok(ResolvedVersion::new(
            (parsed.major, parsed.minor, parsed.patch),
            config.prerelease().or(parsed.prerelease.as_deref()),
            config.metadata().or(parsed.metadata.as_deref()),
        ));
    };

    let parts = increment
        .apply(prev.major, prev.minor, prev.patch)
        .ok_or_else(|| {
            ReleaseError::configuration(format!(
                "cannot apply {} increment to '{}': version component overflows",
                increment, prev.name
            ))
        })?;

    Ok(ResolvedVersion::new(
        parts,
        config.prerelease(),
        config.metadata(),
    ))
}

/// Format version as string.
pub fn format_version(major: u64, minor: u64, patch: u64) -> String {
    format!("{}.{}.{}", major, minor, patch)
}
