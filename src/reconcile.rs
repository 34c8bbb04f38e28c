//! Publishing the resolved version as tags and releases.
//!
//! Reconciliation is split in two: [`plan`] decides what should happen
//! without touching anything, [`reconcile`] carries the plan out through a
//! [`TagHost`]. The full version is published first and must succeed. The
//! floating major and minor aliases follow; each is deleted (best-effort) and
//! recreated on the current commit, and a failure on one never stops the
//! other.

use async_trait::async_trait;

use crate::config::ReleaseConfig;
use crate::error::ReleaseError;
use crate::version::ResolvedVersion;

/// Side-effecting operations on the hosting service.
///
/// References are fully qualified, e.g. `refs/tags/v1.2.3`.
#[async_trait]
pub trait TagHost {
    /// Create a release (and with it the tag) for `tag` at `sha`.
    async fn create_release(&self, tag: &str, sha: &str, prerelease: bool) -> anyhow::Result<()>;

    /// Create `reference` pointing at `sha`.
    async fn create_ref(&self, reference: &str, sha: &str) -> anyhow::Result<()>;

    /// Delete `reference`.
    async fn delete_ref(&self, reference: &str) -> anyhow::Result<()>;
}

/// Fully qualified ref for a tag name.
pub fn tag_ref(tag: &str) -> String {
    format!("refs/tags/{}", tag)
}

/// How the full version gets published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    Release { tag: String, prerelease: bool },
    Ref { reference: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Major,
    Minor,
}

/// A floating alias tag to move onto the new commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasStep {
    pub kind: AliasKind,
    pub tag: String,
    pub reference: String,
    /// The tag already exists and will be moved rather than created.
    pub existed: bool,
}

/// Everything a run would do, decided up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub full_tag: String,
    pub publication: Publication,
    pub aliases: Vec<AliasStep>,
    /// Alias flags were set but the version is a prerelease.
    pub aliases_suppressed: bool,
    pub dry_run: bool,
}

/// What happened to one alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasOutcome {
    pub step: AliasStep,
    pub delete_error: Option<ReleaseError>,
    pub create_error: Option<ReleaseError>,
}

impl AliasOutcome {
    pub fn created(&self) -> bool {
        self.create_error.is_none()
    }
}

/// Result of carrying out a [`ReconcilePlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub plan: ReconcilePlan,
    /// `false` for dry runs.
    pub published: bool,
    pub aliases: Vec<AliasOutcome>,
}

impl ReconcileReport {
    /// Alias outcomes that ended without the alias being created.
    pub fn failed_aliases(&self) -> impl Iterator<Item = &AliasOutcome> {
        self.aliases.iter().filter(|outcome| !outcome.created())
    }
}

/// Decide how `resolved` will be published.
///
/// `existing_tags` is the tag list the previous version was selected from;
/// it only determines [`AliasStep::existed`]. `ref_name` is the branch or tag
/// the run was triggered from.
pub fn plan<S: AsRef<str>>(
    resolved: &ResolvedVersion,
    config: &ReleaseConfig,
    existing_tags: &[S],
    ref_name: Option<&str>,
) -> ReconcilePlan {
    let prefix = config.tag_prefix.as_str();
    let full_tag = resolved.full_tag(prefix);

    let publication = if config.should_create_release(ref_name) {
        Publication::Release {
            tag: full_tag.clone(),
            prerelease: resolved.is_prerelease(),
        }
    } else {
        Publication::Ref {
            reference: tag_ref(&full_tag),
        }
    };

    let wanted = [
        (AliasKind::Major, config.add_major_tag, resolved.major_tag(prefix)),
        (AliasKind::Minor, config.add_minor_tag, resolved.minor_tag(prefix)),
    ];
    let prerelease = resolved.is_prerelease();
    let any_alias = wanted.iter().any(|(_, enabled, _)| *enabled);

    let aliases = if prerelease {
        Vec::new()
    } else {
        wanted
            .into_iter()
            .filter(|(_, enabled, _)| *enabled)
            .map(|(kind, _, tag)| AliasStep {
                kind,
                reference: tag_ref(&tag),
                existed: existing_tags.iter().any(|t| t.as_ref() == tag.as_str()),
                tag,
            })
            .collect()
    };

    ReconcilePlan {
        full_tag,
        publication,
        aliases,
        aliases_suppressed: prerelease && any_alias,
        dry_run: config.dry_run,
    }
}

/// Carry out `plan` against `host`, pointing new refs at `sha`.
///
/// A dry-run plan performs no calls at all.
///
/// # Errors
///
/// Returns [`ReleaseError::Publish`] if the full version cannot be published;
/// no alias is touched in that case. Alias failures are reported in the
/// returned [`ReconcileReport`] instead.
pub async fn reconcile<H>(
    plan: ReconcilePlan,
    host: &H,
    sha: &str,
) -> Result<ReconcileReport, ReleaseError>
where
    H: TagHost + ?Sized,
{
    if plan.dry_run {
        return Ok(ReconcileReport {
            plan,
            published: false,
            aliases: Vec::new(),
        });
    }

    let published = match &plan.publication {
        Publication::Release { tag, prerelease } => {
            host.create_release(tag, sha, *prerelease).await
        }
        Publication::Ref { reference } => host.create_ref(reference, sha).await,
    };
    published.map_err(|e| ReleaseError::Publish {
        tag: plan.full_tag.clone(),
        message: format!("{:#}", e),
    })?;

    let mut aliases = Vec::with_capacity(plan.aliases.len());
    for step in &plan.aliases {
        aliases.push(move_alias(step, host, sha).await);
    }

    Ok(ReconcileReport {
        plan,
        published: true,
        aliases,
    })
}

/// [`plan`] followed by [`reconcile`].
pub async fn run_reconcile<H, S>(
    resolved: &ResolvedVersion,
    config: &ReleaseConfig,
    existing_tags: &[S],
    ref_name: Option<&str>,
    sha: &str,
    host: &H,
) -> Result<ReconcileReport, ReleaseError>
where
    H: TagHost + ?Sized,
    S: AsRef<str>,
{
    let plan = plan(resolved, config, existing_tags, ref_name);
    reconcile(plan, host, sha).await
}

async fn move_alias<H>(step: &AliasStep, host: &H, sha: &str) -> AliasOutcome
where
    H: TagHost + ?Sized,
{
    let alias_error = |e: anyhow::Error| ReleaseError::AliasMutation {
        reference: step.reference.clone(),
        message: format!("{:#}", e),
    };

    // Missing refs fail to delete too; that is expected for new aliases.
    let delete_error = host.delete_ref(&step.reference).await.err().map(alias_error);
    let create_error = host
        .create_ref(&step.reference, sha)
        .await
        .err()
        .map(alias_error);

    AliasOutcome {
        step: step.clone(),
        delete_error,
        create_error,
    }
}
