//! GitHub API integration for listing and publishing tags.

use anyhow::{
    Context,
    Result,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::params::repos::Reference;

use crate::error::ReleaseError;
use crate::reconcile::TagHost;

/// Page size used when listing tags.
pub const TAGS_PER_PAGE: u8 = 100;

/// Paginated source of tag names.
#[async_trait]
pub trait TagSource {
    /// One page of tag names, 1-based.
    async fn list_tags_page(&self, page: u32, per_page: u8) -> Result<Vec<String>>;
}

/// Fetch every tag, page by page, until a short page comes back.
///
/// # Errors
///
/// Returns [`ReleaseError::UpstreamList`] on the first failing page. Nothing
/// is retried and tags from earlier pages are discarded.
pub async fn list_all_tags<S>(source: &S) -> Result<Vec<String>, ReleaseError>
where
    S: TagSource + ?Sized,
{
    let mut tags = Vec::new();
    let mut page = 1;

    loop {
        let batch = source
            .list_tags_page(page, TAGS_PER_PAGE)
            .await
            .map_err(|e| ReleaseError::UpstreamList {
                page,
                message: format!("{:#}", e),
            })?;
        let last = batch.len() < usize::from(TAGS_PER_PAGE);
        tags.extend(batch);
        if last {
            return Ok(tags);
        }
        page += 1;
    }
}

/// Tag source and host backed by the GitHub REST API.
pub struct GitHubClient {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client for `owner/repo`.
    ///
    /// Without a token only public repositories can be read, and nothing can
    /// be published.
    pub fn new(owner: &str, repo: &str, github_token: Option<&str>) -> Result<Self> {
        let builder = octocrab::OctocrabBuilder::new();
        let octocrab = match github_token {
            Some(token) => builder.personal_token(token.to_string()).build(),
            None => builder.build(),
        }
        .context("Failed to create GitHub API client")?;

        Ok(Self {
            octocrab,
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    fn repo_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[async_trait]
impl TagSource for GitHubClient {
    async fn list_tags_page(&self, page: u32, per_page: u8) -> Result<Vec<String>> {
        let tags = self
            .octocrab
            .repos(&self.owner, &self.repo)
            .list_tags()
            .per_page(per_page)
            .page(page)
            .send()
            .await
            .with_context(|| format!("Failed to query tags of {}", self.repo_name()))?;

        Ok(tags.items.into_iter().map(|tag| tag.name).collect())
    }
}

#[async_trait]
impl TagHost for GitHubClient {
    async fn create_release(&self, tag: &str, sha: &str, prerelease: bool) -> Result<()> {
        self.octocrab
            .repos(&self.owner, &self.repo)
            .releases()
            .create(tag)
            .target_commitish(sha)
            .name(tag)
            .prerelease(prerelease)
            .send()
            .await
            .with_context(|| format!("Failed to create release {} in {}", tag, self.repo_name()))?;
        Ok(())
    }

    async fn create_ref(&self, reference: &str, sha: &str) -> Result<()> {
        self.octocrab
            .repos(&self.owner, &self.repo)
            .create_ref(&to_reference(reference)?, sha)
            .await
            .with_context(|| format!("Failed to create {} in {}", reference, self.repo_name()))?;
        Ok(())
    }

    async fn delete_ref(&self, reference: &str) -> Result<()> {
        self.octocrab
            .repos(&self.owner, &self.repo)
            .delete_ref(&to_reference(reference)?)
            .await
            .with_context(|| format!("Failed to delete {} in {}", reference, self.repo_name()))?;
        Ok(())
    }
}

/// Map a fully qualified ref to octocrab's reference type.
fn to_reference(reference: &str) -> Result<Reference> {
    if let Some(tag) = reference.strip_prefix("refs/tags/") {
        return Ok(Reference::Tag(tag.to_string()));
    }
    if let Some(branch) = reference.strip_prefix("refs/heads/") {
        return Ok(Reference::Branch(branch.to_string()));
    }
    anyhow::bail!("Unsupported reference: {}", reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTags;

    fn numbered(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("v0.{}.0", i)).collect()
    }

    #[tokio::test]
    async fn test_list_all_tags_drains_every_page() {
        let source = FakeTags::new(numbered(250));
        let tags = list_all_tags(&source).await.unwrap();

        assert_eq!(tags.len(), 250);
        assert_eq!(source.requested(), vec![1, 2, 3]);
        assert_eq!(tags.last().map(String::as_str), Some("v0.249.0"));
    }

    #[tokio::test]
    async fn test_list_all_tags_full_last_page_needs_one_more_request() {
        let source = FakeTags::new(numbered(200));
        let tags = list_all_tags(&source).await.unwrap();

        assert_eq!(tags.len(), 200);
        assert_eq!(source.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_list_all_tags_empty_repository() {
        let source = FakeTags::default();
        assert!(list_all_tags(&source).await.unwrap().is_empty());
        assert_eq!(source.requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_list_all_tags_fails_on_any_page() {
        let source = FakeTags {
            fail_on_page: Some(2),
            ..FakeTags::new(numbered(250))
        };
        let err = list_all_tags(&source).await.unwrap_err();

        assert!(matches!(err, ReleaseError::UpstreamList { page: 2, .. }));
        assert!(err.to_string().contains("502"));
        assert_eq!(source.requested(), vec![1, 2]);
    }

    #[test]
    fn test_to_reference() {
        assert!(matches!(
            to_reference("refs/tags/v1.2").unwrap(),
            Reference::Tag(ref t) if t == "v1.2"
        ));
        assert!(matches!(
            to_reference("refs/heads/main").unwrap(),
            Reference::Branch(ref b) if b == "main"
        ));
        assert!(to_reference("v1.2").is_err());
    }
}
