//! Helpers shared by the `next` and `release` commands.

use std::env;
use std::path::Path;

use anyhow::{
    Context,
    Result,
};

use crate::config::ReleaseConfig;
use crate::error::ReleaseError;
use crate::github::{
    TagSource,
    list_all_tags,
};
use crate::outputs::{
    OutputFormat,
    ReleaseOutputs,
};
use crate::version::{
    PreviousVersion,
    ResolvedVersion,
    resolve_next,
};

/// Detect GitHub repository from environment or git remote.
#[allow(clippy::disallowed_methods)] // CLI tool needs direct env access
pub fn detect_repo(repo_path: &Path) -> Result<(String, String)> {
    // Try GITHUB_REPOSITORY env var first (set by GitHub Actions)
    if let Ok(repo) = env::var("GITHUB_REPOSITORY")
        && let Some(parsed) = split_owner_repo(&repo)
    {
        return Ok(parsed);
    }

    let repo = gix::discover(repo_path).context("Failed to discover git repository")?;
    let remote = repo
        .find_default_remote(gix::remote::Direction::Fetch)
        .context("Failed to find default remote")?
        .context("No default remote found")?;
    let remote_url = remote
        .url(gix::remote::Direction::Fetch)
        .context("Failed to get remote URL")?;

    parse_github_url(&remote_url.to_string()).context(
        "Could not detect GitHub repository. Set GITHUB_REPOSITORY or use --owner/--repo flags",
    )
}

/// Get owner and repo from args or environment.
pub fn get_owner_repo(
    owner: Option<String>,
    repo: Option<String>,
    repo_path: &Path,
) -> Result<(String, String)> {
    match (owner, repo) {
        (Some(o), Some(r)) => Ok((o, r)),
        (Some(_), None) | (None, Some(_)) => {
            anyhow::bail!("Both --owner and --repo must be provided together");
        }
        (None, None) => detect_repo(repo_path),
    }
}

/// Parse `git@github.com:owner/repo.git` or `https://github.com/owner/repo.git`.
fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))?;
    split_owner_repo(rest.strip_suffix(".git").unwrap_or(rest))
}

fn split_owner_repo(value: &str) -> Option<(String, String)> {
    let mut parts = value.trim_end_matches('/').split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Some((owner.to_string(), repo.to_string()))
        }
        _ => None,
    }
}

/// Commit to tag: `explicit` (usually `GITHUB_SHA`), else the local HEAD.
pub fn resolve_sha(explicit: Option<String>, repo_path: &Path) -> Result<String> {
    if let Some(sha) = explicit.filter(|s| !s.trim().is_empty()) {
        return Ok(sha.trim().to_string());
    }

    let repo = gix::discover(repo_path).with_context(|| {
        format!(
            "Failed to discover git repository at {}",
            repo_path.display()
        )
    })?;
    let head = repo.head().context("Failed to read HEAD")?;
    let commit_id = head.id().context("HEAD does not point to a commit")?;

    Ok(commit_id.detach().to_string())
}

/// Ref the run was triggered from: `explicit` (usually `GITHUB_REF_NAME`),
/// else the checked-out branch. `None` on a detached HEAD.
pub fn resolve_ref_name(explicit: Option<String>, repo_path: &Path) -> Option<String> {
    if let Some(name) = explicit.filter(|s| !s.trim().is_empty()) {
        return Some(name.trim().to_string());
    }

    let repo = gix::discover(repo_path).ok()?;
    let head_name = repo.head_name().ok()??;
    Some(head_name.shorten().to_string())
}

/// Tags, previous version and next version of one run.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub tags: Vec<String>,
    pub previous: Option<PreviousVersion>,
    pub resolved: ResolvedVersion,
}

impl Resolution {
    pub fn outputs(&self) -> ReleaseOutputs {
        ReleaseOutputs::new(self.previous.as_ref(), &self.resolved)
    }
}

/// List every tag, select the previous version and resolve the next one.
///
/// The increment mode and pinned components are checked before any tag is
/// requested.
pub async fn resolve_from_source<S>(
    source: &S,
    config: &ReleaseConfig,
) -> Result<Resolution, ReleaseError>
where
    S: TagSource + ?Sized,
{
    config.increment()?;
    let pattern = config.tag_pattern()?;

    let tags = list_all_tags(source).await?;
    let previous = pattern.select_previous(&tags).map(PreviousVersion::from);
    let resolved = resolve_next(previous.as_ref(), config)?;

    Ok(Resolution {
        tags,
        previous,
        resolved,
    })
}

/// Print or write outputs in the requested format.
pub fn emit_outputs(
    outputs: &ReleaseOutputs,
    full_tag: &str,
    format: OutputFormat,
    github_output: Option<&Path>,
) -> Result<()> {
    match format {
        OutputFormat::Version => println!("{}", outputs.semantic_version),
        OutputFormat::Tag => println!("{}", full_tag),
        OutputFormat::Json => println!("{}", outputs.to_json()?),
        OutputFormat::GithubActions => match github_output {
            Some(path) => outputs.append_to(path)?,
            None => print!("{}", outputs.to_key_values()),
        },
    }
    Ok(())
}
