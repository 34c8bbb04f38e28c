//! Values handed to the calling pipeline.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{
    Context,
    Result,
};
use serde::Serialize;

use crate::version::{
    PreviousVersion,
    ResolvedVersion,
};

/// Output values of a run, keyed the way workflow steps read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseOutputs {
    /// Previous tag name, empty when there was none.
    pub previous_version: String,
    pub core_version: String,
    pub semantic_version: String,
    pub major_version: String,
    pub minor_version: String,
    pub patch_version: String,
}

impl ReleaseOutputs {
    pub fn new(previous: Option<&PreviousVersion>, resolved: &ResolvedVersion) -> Self {
        Self {
            previous_version: previous.map(|p| p.name.clone()).unwrap_or_default(),
            core_version: resolved.core.clone(),
            semantic_version: resolved.semver.clone(),
            major_version: resolved.major.to_string(),
            minor_version: resolved.minor.to_string(),
            patch_version: resolved.patch.to_string(),
        }
    }

    /// `(key, value)` pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("previous-version", self.previous_version.as_str()),
            ("core-version", self.core_version.as_str()),
            ("semantic-version", self.semantic_version.as_str()),
            ("major-version", self.major_version.as_str()),
            ("minor-version", self.minor_version.as_str()),
            ("patch-version", self.patch_version.as_str()),
        ]
    }

    /// `key=value` lines, as understood by `GITHUB_OUTPUT`.
    pub fn to_key_values(&self) -> String {
        self.entries()
            .iter()
            .map(|(key, value)| format!("{}={}\n", key, value))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize outputs")
    }

    /// Append the outputs to a `GITHUB_OUTPUT` file.
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        file.write_all(self.to_key_values().as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))
    }
}

/// How outputs are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Only the semantic version.
    Version,
    /// Only the full tag name.
    Tag,
    /// All outputs as a JSON object.
    Json,
    /// All outputs as `key=value` lines, appended to `GITHUB_OUTPUT` when set.
    GithubActions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReleaseConfig;
    use crate::version::resolve_next;

    fn outputs() -> ReleaseOutputs {
        let prev = PreviousVersion {
            name: "v1.2.3".to_string(),
            major: 1,
            minor: 2,
            patch: 3,
        };
        let config = ReleaseConfig {
            increment: "minor".to_string(),
            prerelease: Some("rc.1".to_string()),
            ..ReleaseConfig::default()
        };
        let resolved = resolve_next(Some(&prev), &config).unwrap();
        ReleaseOutputs::new(Some(&prev), &resolved)
    }

    #[test]
    fn test_key_values() {
        assert_eq!(
            outputs().to_key_values(),
            "previous-version=v1.2.3\n\
             core-version=1.3.0\n\
             semantic-version=1.3.0-rc.1\n\
             major-version=1\n\
             minor-version=3\n\
             patch-version=0\n"
        );
    }

    #[test]
    fn test_json_uses_output_names() {
        let json: serde_json::Value = serde_json::from_str(&outputs().to_json().unwrap()).unwrap();
        assert_eq!(json["previous-version"], "v1.2.3");
        assert_eq!(json["semantic-version"], "1.3.0-rc.1");
        assert_eq!(json["patch-version"], "0");
    }

    #[test]
    fn test_previous_version_empty_when_absent() {
        let config = ReleaseConfig::default();
        let resolved = resolve_next(None, &config).unwrap();
        let outputs = ReleaseOutputs::new(None, &resolved);
        assert_eq!(outputs.previous_version, "");
        assert!(outputs.to_key_values().starts_with("previous-version=\n"));
    }

    #[test]
    fn test_append_to_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "earlier=1\n").unwrap();

        outputs().append_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier=1\nprevious-version=v1.2.3\n"));
        assert!(content.ends_with("patch-version=0\n"));
    }
}
