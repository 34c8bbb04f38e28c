//! Publish the next version command.
//!
//! Resolves the next version like `next`, emits the outputs, then publishes
//! the version as a GitHub release or a plain tag and moves the floating
//! major/minor alias tags.
//!
//! # Examples
//!
//! ```bash
//! # Release the next patch version and move v1 / v1.2
//! version-tagger release --add-major-tag true --add-minor-tag true
//!
//! # Only tag, no release
//! version-tagger release --create-release false
//!
//! # Release only when running on main, tag otherwise
//! version-tagger release --create-release main
//!
//! # See what would happen
//! version-tagger release --dry-run true
//! ```

use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    Result,
};
use cargo_plugin_utils::logger::Logger;
use clap::Parser;

use super::args::{
    PublishArgs,
    RepoArgs,
    VersionArgs,
};
use super::common::{
    Resolution,
    emit_outputs,
    get_owner_repo,
    resolve_from_source,
    resolve_ref_name,
    resolve_sha,
};
use crate::config::ReleaseConfig;
use crate::error::ReleaseError;
use crate::github::{
    GitHubClient,
    TagSource,
};
use crate::outputs::OutputFormat;
use crate::reconcile::{
    AliasKind,
    Publication,
    ReconcilePlan,
    ReconcileReport,
    TagHost,
    plan,
    reconcile,
};

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub version: VersionArgs,

    #[command(flatten)]
    pub publish: PublishArgs,

    /// Output format, see `next --help`.
    #[arg(long, value_enum, default_value = "github-actions")]
    pub format: OutputFormat,

    /// Path to GitHub Actions output file.
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

/// Resolve and publish the next version.
///
/// # Errors
///
/// Returns an error (and the process exits non-zero) if the configuration is
/// invalid, tags cannot be listed, no token is available outside a dry run,
/// or the full version cannot be published. Alias tag failures are only
/// reported as warnings.
pub fn release(args: ReleaseArgs) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(release_async(args))
}

async fn release_async(args: ReleaseArgs) -> Result<()> {
    let mut logger = Logger::new();

    let config = args.publish.apply(args.version.to_config());
    config.increment()?;
    config.tag_pattern()?;

    let (owner, repo) = get_owner_repo(
        args.repo.owner.clone(),
        args.repo.repo.clone(),
        &args.repo.repo_path,
    )?;
    let token = args.repo.github_token.as_deref();
    if token.is_none() && !config.dry_run {
        anyhow::bail!("GITHUB_TOKEN is required to publish; set it or pass --dry-run true");
    }
    let client = GitHubClient::new(&owner, &repo, token)?;
    let ref_name = resolve_ref_name(args.publish.ref_name.clone(), &args.repo.repo_path);
    let sha = match resolve_sha(args.publish.sha.clone(), &args.repo.repo_path) {
        Ok(sha) => sha,
        Err(e) if config.dry_run => {
            logger.warning("Unknown", &format!("commit ({:#})", e));
            "HEAD".to_string()
        }
        Err(e) => return Err(e),
    };

    logger.status("Listing", &format!("tags of {}/{}", owner, repo));
    release_with(
        &mut logger,
        &client,
        &client,
        &config,
        ref_name.as_deref(),
        &sha,
        args.format,
        args.github_output.as_deref(),
    )
    .await?;

    Ok(())
}

/// Resolve, emit the outputs, then publish.
///
/// Outputs are written before anything is mutated so that later workflow
/// steps see the resolved version even when publishing fails.
#[allow(clippy::too_many_arguments)]
async fn release_with<S, H>(
    logger: &mut Logger,
    source: &S,
    host: &H,
    config: &ReleaseConfig,
    ref_name: Option<&str>,
    sha: &str,
    format: OutputFormat,
    github_output: Option<&Path>,
) -> Result<ReleaseRun>
where
    S: TagSource + ?Sized,
    H: TagHost + ?Sized,
{
    let resolution = resolve_from_source(source, config).await;
    logger.finish();
    let resolution = resolution?;

    log_resolution(logger, &resolution);
    emit_outputs(
        &resolution.outputs(),
        &resolution.resolved.full_tag(&config.tag_prefix),
        format,
        github_output,
    )?;

    let report = publish(&resolution, host, config, ref_name, sha).await?;
    log_report(logger, &report, sha);

    Ok(ReleaseRun { resolution, report })
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct ReleaseRun {
    pub resolution: Resolution,
    pub report: ReconcileReport,
}

/// Resolve the next version from `source` and publish it through `host`.
///
/// Nothing is mutated when resolution fails or the configuration asks for a
/// dry run.
pub async fn run_release<S, H>(
    source: &S,
    host: &H,
    config: &ReleaseConfig,
    ref_name: Option<&str>,
    sha: &str,
) -> Result<ReleaseRun, ReleaseError>
where
    S: TagSource + ?Sized,
    H: TagHost + ?Sized,
{
    let resolution = resolve_from_source(source, config).await?;
    let report = publish(&resolution, host, config, ref_name, sha).await?;

    Ok(ReleaseRun { resolution, report })
}

async fn publish<H>(
    resolution: &Resolution,
    host: &H,
    config: &ReleaseConfig,
    ref_name: Option<&str>,
    sha: &str,
) -> Result<ReconcileReport, ReleaseError>
where
    H: TagHost + ?Sized,
{
    let plan = plan(&resolution.resolved, config, &resolution.tags, ref_name);
    reconcile(plan, host, sha).await
}

fn log_resolution(logger: &mut Logger, resolution: &Resolution) {
    match &resolution.previous {
        Some(previous) => logger.print_message(&format!(
            "Found previous version tag '{}'; next version is {}",
            previous.name, resolution.resolved.semver
        )),
        None => logger.print_message(&format!(
            "Found no previous version tag; using {} as next version",
            resolution.resolved.semver
        )),
    }
}

fn describe(plan: &ReconcilePlan) -> String {
    match &plan.publication {
        Publication::Release {
            tag,
            prerelease: true,
        } => format!("prerelease {}", tag),
        Publication::Release { tag, .. } => format!("release {}", tag),
        Publication::Ref { reference } => reference.clone(),
    }
}

fn alias_name(kind: AliasKind) -> &'static str {
    match kind {
        AliasKind::Major => "major",
        AliasKind::Minor => "minor",
    }
}

fn log_report(logger: &mut Logger, report: &ReconcileReport, sha: &str) {
    let plan = &report.plan;

    if !report.published {
        logger.print_message("Dry run, nothing was published");
        logger.print_message(&format!("  Would create {} at {}", describe(plan), sha));
        for step in &plan.aliases {
            let verb = if step.existed { "move" } else { "create" };
            logger.print_message(&format!(
                "  Would {} {} alias {}",
                verb,
                alias_name(step.kind),
                step.tag
            ));
        }
    } else {
        logger.print_message(&format!("✓ Created {}", describe(plan)));
        for outcome in &report.aliases {
            let step = &outcome.step;
            if let Some(err) = &outcome.delete_error
                && step.existed
            {
                logger.warning("Ignored", &err.to_string());
            }
            match &outcome.create_error {
                None => logger.print_message(&format!(
                    "✓ Pointed {} alias {} at {}",
                    alias_name(step.kind),
                    step.tag,
                    sha
                )),
                Some(err) => logger.warning("Failed", &err.to_string()),
            }
        }
    }

    if plan.aliases_suppressed {
        logger.print_message("  Alias tags are not moved for prereleases");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        Call,
        FakeHost,
        FakeTags,
    };

    const SHA: &str = "feedbeef";

    fn aliased() -> ReleaseConfig {
        ReleaseConfig {
            add_major_tag: true,
            add_minor_tag: true,
            ..ReleaseConfig::default()
        }
    }

    #[tokio::test]
    async fn test_full_run_publishes_and_moves_aliases() {
        let tags = FakeTags::new(["v1", "v1.2", "v1.2.3", "v1.2.2", "v1.1.0"]);
        let host = FakeHost::default();

        let run = run_release(&tags, &host, &aliased(), Some("main"), SHA)
            .await
            .unwrap();

        assert_eq!(run.report.plan.full_tag, "v1.2.4");
        assert_eq!(run.resolution.outputs().previous_version, "v1.2.3");
        assert_eq!(
            host.calls(),
            vec![
                Call::CreateRelease("v1.2.4".into(), SHA.into(), false),
                Call::DeleteRef("refs/tags/v1".into()),
                Call::CreateRef("refs/tags/v1".into(), SHA.into()),
                Call::DeleteRef("refs/tags/v1.2".into()),
                Call::CreateRef("refs/tags/v1.2".into(), SHA.into()),
            ]
        );
        assert!(run.report.aliases.iter().all(|a| a.step.existed));
    }

    #[tokio::test]
    async fn test_bogus_increment_issues_no_calls() {
        let tags = FakeTags::new(["v1.2.3"]);
        let host = FakeHost::default();
        let config = ReleaseConfig {
            increment: "bogus".to_string(),
            ..aliased()
        };

        let err = run_release(&tags, &host, &config, None, SHA)
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Configuration(_)));
        assert!(tags.requested().is_empty());
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_issues_no_mutations() {
        let tags = FakeTags {
            fail_on_page: Some(1),
            ..FakeTags::new(["v1.2.3"])
        };
        let host = FakeHost::default();

        let err = run_release(&tags, &host, &aliased(), None, SHA)
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::UpstreamList { page: 1, .. }));
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_resolves_without_mutations() {
        let tags = FakeTags::new(["v0.9.0"]);
        let host = FakeHost::default();
        let config = ReleaseConfig {
            dry_run: true,
            increment: "major".to_string(),
            ..aliased()
        };

        let run = run_release(&tags, &host, &config, None, SHA).await.unwrap();

        assert_eq!(run.resolution.resolved.semver, "1.0.0");
        assert!(!run.report.published);
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_release_follows_ref_name() {
        let config = ReleaseConfig {
            create_release: Some("main".to_string()),
            ..ReleaseConfig::default()
        };

        let host = FakeHost::default();
        run_release(&FakeTags::new(["v2.0.0"]), &host, &config, Some("main"), SHA)
            .await
            .unwrap();
        assert_eq!(
            host.calls(),
            vec![Call::CreateRelease("v2.0.1".into(), SHA.into(), false)]
        );

        let host = FakeHost::default();
        run_release(&FakeTags::new(["v2.0.0"]), &host, &config, Some("feature"), SHA)
            .await
            .unwrap();
        assert_eq!(
            host.calls(),
            vec![Call::CreateRef("refs/tags/v2.0.1".into(), SHA.into())]
        );
    }

    #[tokio::test]
    async fn test_outputs_written_before_publish_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("github_output");
        let tags = FakeTags::new(["v1.2.3"]);
        let host = FakeHost {
            fail_release: true,
            ..FakeHost::default()
        };
        let mut logger = Logger::new();

        let err = release_with(
            &mut logger,
            &tags,
            &host,
            &aliased(),
            None,
            SHA,
            OutputFormat::GithubActions,
            Some(&output),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReleaseError>(),
            Some(ReleaseError::Publish { .. })
        ));
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("semantic-version=1.2.4\n"));
        assert!(written.contains("previous-version=v1.2.3\n"));
        assert_eq!(
            host.calls(),
            vec![Call::CreateRelease("v1.2.4".into(), SHA.into(), false)]
        );
    }

    #[tokio::test]
    async fn test_back_port_patch_on_pinned_line() {
        let tags = FakeTags::new(["v2.1.0", "v1.5.0", "v1.4.7", "v1.4.6"]);
        let host = FakeHost::default();
        let config = ReleaseConfig {
            previous_major: Some("1".to_string()),
            previous_minor: Some("4".to_string()),
            add_minor_tag: true,
            ..ReleaseConfig::default()
        };

        let run = run_release(&tags, &host, &config, None, SHA).await.unwrap();

        assert_eq!(run.report.plan.full_tag, "v1.4.8");
        assert_eq!(
            host.calls().last(),
            Some(&Call::CreateRef("refs/tags/v1.4".into(), SHA.into()))
        );
    }
}
