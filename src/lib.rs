#![doc = include_str!("../README.md")]

/// Command implementations and argument types.
///
/// The `run_release` pipeline is generic over the tag listing and tag
/// publishing ports, so it can be driven by something other than GitHub:
///
/// ```no_run
/// use version_tagger::commands::run_release;
/// use version_tagger::config::ReleaseConfig;
/// use version_tagger::github::GitHubClient;
///
/// # async fn demo() -> anyhow::Result<()> {
/// let client = GitHubClient::new("owner", "repo", Some("token"))?;
/// let config = ReleaseConfig {
///     add_major_tag: true,
///     ..ReleaseConfig::default()
/// };
/// let run = run_release(&client, &client, &config, Some("main"), "0123abcd").await?;
/// println!("published {}", run.report.plan.full_tag);
/// # Ok(())
/// # }
/// ```
pub mod commands;
/// Release configuration.
pub mod config;
/// Error types.
pub mod error;
/// GitHub helpers.
pub mod github;
/// Output values.
pub mod outputs;
/// Version tag matching.
pub mod pattern;
/// Tag and release publishing.
pub mod reconcile;
/// Version helpers.
pub mod version;

#[cfg(test)]
mod testing;
