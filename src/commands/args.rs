//! Argument groups shared by the commands.
//!
//! Every input can be given as a flag or through the environment variable
//! GitHub Actions sets for it (`INPUT_<NAME>` for action inputs, `GITHUB_*`
//! for the run context).

use std::path::PathBuf;

use clap::Args;

use crate::config::{
    ReleaseConfig,
    parse_flag,
};

/// Which repository to query.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// GitHub repository owner.
    ///
    /// Defaults to `GITHUB_REPOSITORY` environment variable (set by GitHub
    /// Actions) or auto-detected from the current git remote.
    #[arg(long)]
    pub owner: Option<String>,

    /// GitHub repository name.
    ///
    /// Defaults to `GITHUB_REPOSITORY` environment variable (set by GitHub
    /// Actions) or auto-detected from the current git remote.
    #[arg(long)]
    pub repo: Option<String>,

    /// GitHub token for API authentication.
    ///
    /// Required to publish. Optional for reading tags of public
    /// repositories.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Path to the local git checkout, used when the repository, commit or
    /// ref is not given explicitly.
    #[arg(long, default_value = ".")]
    pub repo_path: PathBuf,
}

/// How the next version is computed.
#[derive(Args, Debug, Clone)]
pub struct VersionArgs {
    /// Version to use when no previous version tag exists.
    #[arg(long, env = "INPUT_DEFAULT-VERSION", default_value = "0.1.0")]
    pub default_version: String,

    /// Prefix of version tags.
    #[arg(long, env = "INPUT_TAG-PREFIX", default_value = "v")]
    pub tag_prefix: String,

    /// Component to increment: `major`, `minor` or `patch`.
    #[arg(long, env = "INPUT_INCREMENTED-VALUE", default_value = "patch")]
    pub incremented_value: String,

    /// Prerelease identifier appended as `-<prerelease>`.
    #[arg(long, env = "INPUT_PRERELEASE")]
    pub prerelease: Option<String>,

    /// Build metadata appended as `+<metadata>`.
    #[arg(long, env = "INPUT_METADATA")]
    pub metadata: Option<String>,

    /// Only consider previous tags with this major version.
    #[arg(long, env = "INPUT_PREVIOUS-MAJOR-VERSION")]
    pub previous_major_version: Option<String>,

    /// Only consider previous tags with this minor version.
    #[arg(long, env = "INPUT_PREVIOUS-MINOR-VERSION")]
    pub previous_minor_version: Option<String>,
}

impl VersionArgs {
    /// Configuration with publishing switched off.
    pub fn to_config(&self) -> ReleaseConfig {
        ReleaseConfig {
            default_version: self.default_version.clone(),
            tag_prefix: self.tag_prefix.clone(),
            increment: self.incremented_value.clone(),
            prerelease: self.prerelease.clone(),
            metadata: self.metadata.clone(),
            dry_run: true,
            add_major_tag: false,
            add_minor_tag: false,
            create_release: None,
            previous_major: self.previous_major_version.clone(),
            previous_minor: self.previous_minor_version.clone(),
        }
    }
}

/// How the version is published.
#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// Compute and report, but do not create anything (`true` to enable).
    #[arg(long, env = "INPUT_DRY-RUN", default_value = "false")]
    pub dry_run: String,

    /// Move the `<prefix><major>` alias tag to the new commit.
    #[arg(long, env = "INPUT_ADD-MAJOR-TAG", default_value = "false")]
    pub add_major_tag: String,

    /// Move the `<prefix><major>.<minor>` alias tag to the new commit.
    #[arg(long, env = "INPUT_ADD-MINOR-TAG", default_value = "false")]
    pub add_minor_tag: String,

    /// Create a GitHub release: `true`, `false`, or the ref name that should
    /// get releases. Defaults to always.
    #[arg(long, env = "INPUT_CREATE-RELEASE")]
    pub create_release: Option<String>,

    /// Commit to tag. Defaults to the local HEAD.
    #[arg(long, env = "GITHUB_SHA")]
    pub sha: Option<String>,

    /// Branch or tag the run was triggered from. Defaults to the checked-out
    /// branch.
    #[arg(long, env = "GITHUB_REF_NAME")]
    pub ref_name: Option<String>,
}

impl PublishArgs {
    pub fn apply(&self, config: ReleaseConfig) -> ReleaseConfig {
        ReleaseConfig {
            dry_run: parse_flag(&self.dry_run),
            add_major_tag: parse_flag(&self.add_major_tag),
            add_minor_tag: parse_flag(&self.add_minor_tag),
            create_release: self.create_release.clone(),
            ..config
        }
    }
}
