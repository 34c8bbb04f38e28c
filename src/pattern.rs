//! Version tag matching.
//!
//! A [`VersionPattern`] recognises `<prefix>MAJOR.MINOR.PATCH[-PRE][+META]`
//! tag names. It is line-anchored, so the same matcher works on a single tag
//! or on a newline-joined tag list.

use std::cmp::Ordering;

use regex::{
    Captures,
    Regex,
};

use crate::error::ReleaseError;

/// Compiled matcher for version tags.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    regex: Regex,
}

/// A tag that matched a [`VersionPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMatch {
    /// The full matched text, prefix included.
    pub text: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub metadata: Option<String>,
}

impl VersionPattern {
    /// Build a matcher for tags starting with `tag_prefix`.
    ///
    /// `pinned_major` / `pinned_minor` restrict matches to one version line,
    /// e.g. `Some("1"), Some("4")` only accepts `1.4.x` tags. With
    /// `tag_prefix_optional` the prefix may be left out.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::Configuration`] if a pinned component is not a
    /// plain decimal number.
    pub fn build(
        tag_prefix: &str,
        pinned_major: Option<&str>,
        pinned_minor: Option<&str>,
        tag_prefix_optional: bool,
    ) -> Result<Self, ReleaseError> {
        let prefix = if tag_prefix.is_empty() {
            String::new()
        } else if tag_prefix_optional {
            format!("(?:{})?", regex::escape(tag_prefix))
        } else {
            regex::escape(tag_prefix)
        };
        let major = component("previous-major-version", pinned_major)?;
        let minor = component("previous-minor-version", pinned_minor)?;

        let source = format!(
            r"(?mR)^{prefix}(?P<major>{major})\.(?P<minor>{minor})\.(?P<patch>\d+)(?:-(?P<prerelease>\w[\w.]*))?(?:\+(?P<metadata>\w[\w.]*))?$"
        );
        let regex = Regex::new(&source).map_err(|e| {
            ReleaseError::configuration(format!("cannot build tag pattern for prefix '{tag_prefix}': {e}"))
        })?;

        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// First match in `text`.
    pub fn captures(&self, text: &str) -> Option<VersionMatch> {
        self.regex.captures(text).and_then(|caps| to_match(&caps))
    }

    /// Every match in a newline-joined list, in input order.
    pub fn find_all(&self, text: &str) -> Vec<VersionMatch> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| to_match(&caps))
            .collect()
    }

    /// Pick the highest version among `tags` that match this pattern.
    ///
    /// Tags are compared by major, minor and patch, then a release outranks
    /// any prerelease of the same core, then prerelease precedence. On a
    /// full tie the earlier tag wins.
    pub fn select_previous<S: AsRef<str>>(&self, tags: &[S]) -> Option<VersionMatch> {
        let joined = tags
            .iter()
            .map(|tag| tag.as_ref())
            .collect::<Vec<&str>>()
            .join("\n");

        let mut best: Option<VersionMatch> = None;
        for candidate in self.find_all(&joined) {
            let replace = match &best {
                None => true,
                Some(current) => candidate.cmp_precedence(current) == Ordering::Greater,
            };
            if replace {
                best = Some(candidate);
            }
        }
        best
    }
}

impl VersionMatch {
    /// Semver precedence, ignoring build metadata.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| {
                // A release sorts above its prereleases.
                other.prerelease.is_some().cmp(&self.prerelease.is_some())
            })
            .then_with(|| prerelease_key(&self.prerelease).cmp(&prerelease_key(&other.prerelease)))
    }
}

fn component(input: &str, pinned: Option<&str>) -> Result<String, ReleaseError> {
    match pinned {
        None => Ok(r"\d+".to_string()),
        Some(value) if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(value.to_string())
        }
        Some(value) => Err(ReleaseError::configuration(format!(
            "{input} must be a number, got '{value}'"
        ))),
    }
}

fn to_match(caps: &Captures<'_>) -> Option<VersionMatch> {
    let number = |name: &str| caps.name(name)?.as_str().parse::<u64>().ok();
    let text = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

    Some(VersionMatch {
        text: caps.get(0)?.as_str().to_string(),
        major: number("major")?,
        minor: number("minor")?,
        patch: number("patch")?,
        prerelease: text("prerelease"),
        metadata: text("metadata"),
    })
}

fn prerelease_key(prerelease: &Option<String>) -> Option<semver::Prerelease> {
    prerelease
        .as_deref()
        .and_then(|pre| semver::Prerelease::new(pre).ok())
}
