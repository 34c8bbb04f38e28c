//! In-memory doubles for the tag listing and mutation ports.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::github::TagSource;
use crate::reconcile::TagHost;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateRelease(String, String, bool),
    CreateRef(String, String),
    DeleteRef(String),
}

/// Records every mutation; fails the ones it is told to.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub calls: Mutex<Vec<Call>>,
    pub fail_release: bool,
    pub fail_create: Vec<String>,
    pub fail_delete: Vec<String>,
}

impl FakeHost {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TagHost for FakeHost {
    async fn create_release(&self, tag: &str, sha: &str, prerelease: bool) -> anyhow::Result<()> {
        self.record(Call::CreateRelease(
            tag.to_string(),
            sha.to_string(),
            prerelease,
        ));
        if self.fail_release {
            anyhow::bail!("Validation Failed: already_exists");
        }
        Ok(())
    }

    async fn create_ref(&self, reference: &str, sha: &str) -> anyhow::Result<()> {
        self.record(Call::CreateRef(reference.to_string(), sha.to_string()));
        if self.fail_create.iter().any(|r| r == reference) {
            anyhow::bail!("Reference already exists");
        }
        Ok(())
    }

    async fn delete_ref(&self, reference: &str) -> anyhow::Result<()> {
        self.record(Call::DeleteRef(reference.to_string()));
        if self.fail_delete.iter().any(|r| r == reference) {
            anyhow::bail!("Reference does not exist");
        }
        Ok(())
    }
}

/// Serves a fixed tag list in pages; optionally fails on one page.
#[derive(Debug, Default)]
pub struct FakeTags {
    pub tags: Vec<String>,
    pub fail_on_page: Option<u32>,
    pub requested: Mutex<Vec<u32>>,
}

impl FakeTags {
    pub fn new<S: Into<String>>(tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn requested(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TagSource for FakeTags {
    async fn list_tags_page(&self, page: u32, per_page: u8) -> anyhow::Result<Vec<String>> {
        self.requested.lock().unwrap().push(page);
        if self.fail_on_page == Some(page) {
            anyhow::bail!("GitHub API returned 502 Bad Gateway");
        }
        let per_page = usize::from(per_page);
        let start = (page as usize - 1) * per_page;
        Ok(self
            .tags
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }
}
