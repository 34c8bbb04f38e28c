//! Calculate the next version command.
//!
//! Lists the repository's tags, picks the most recent version tag and
//! computes the next version. Nothing is published.
//!
//! # Examples
//!
//! ```bash
//! # Next patch version (e.g., "1.2.4")
//! version-tagger next
//!
//! # Next minor prerelease tag (e.g., "v1.3.0-rc.1")
//! version-tagger next --incremented-value minor --prerelease rc.1 --format tag
//!
//! # Back-port: next patch on the 1.4 line
//! version-tagger next --previous-major-version 1 --previous-minor-version 4
//!
//! # All outputs as JSON
//! version-tagger next --format json
//! ```

use std::path::PathBuf;

use anyhow::{
    Context,
    Result,
};
use clap::Parser;

use super::args::{
    RepoArgs,
    VersionArgs,
};
use super::common::{
    emit_outputs,
    get_owner_repo,
    resolve_from_source,
};
use crate::github::GitHubClient;
use crate::outputs::OutputFormat;

/// Arguments for the `next` command.
#[derive(Parser, Debug)]
pub struct NextArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub version: VersionArgs,

    /// Output format.
    ///
    /// - `version`: the semantic version (e.g., "1.2.4")
    /// - `tag`: the full tag name (e.g., "v1.2.4")
    /// - `json`: all outputs as a JSON object
    /// - `github-actions`: all outputs as `key=value` lines
    #[arg(long, value_enum, default_value = "version")]
    pub format: OutputFormat,

    /// Path to GitHub Actions output file.
    ///
    /// Only used with `--format github-actions`; prints to stdout when unset.
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

/// Calculate the next version from the repository's existing tags.
///
/// # Errors
///
/// Returns an error if:
/// - The increment mode, pinned components or default version are invalid
/// - The GitHub repository cannot be detected
/// - Listing tags fails on any page
///
/// # Example Output
///
/// With `--format github-actions`:
/// ```text
/// previous-version=v1.2.3
/// core-version=1.2.4
/// semantic-version=1.2.4
/// major-version=1
/// minor-version=2
/// patch-version=4
/// ```
pub fn next(args: NextArgs) -> Result<()> {
    let config = args.version.to_config();
    // Fail on bad input before touching the network.
    config.increment()?;
    config.tag_pattern()?;

    let (owner, repo) = get_owner_repo(args.repo.owner, args.repo.repo, &args.repo.repo_path)?;
    let client = GitHubClient::new(&owner, &repo, args.repo.github_token.as_deref())?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let resolution = rt.block_on(resolve_from_source(&client, &config))?;

    emit_outputs(
        &resolution.outputs(),
        &resolution.resolved.full_tag(&config.tag_prefix),
        args.format,
        args.github_output.as_deref(),
    )
}
