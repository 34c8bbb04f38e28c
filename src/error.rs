//! Error taxonomy for version resolution and tag publishing.

use thiserror::Error;

/// Errors raised while resolving or publishing a version.
///
/// `Configuration`, `UpstreamList` and `Publish` abort the run.
/// `AliasMutation` is only ever recorded in a
/// [`ReconcileReport`](crate::reconcile::ReconcileReport); alias tags are
/// best-effort.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    /// An input value cannot be used (unknown increment mode, malformed
    /// default version, non-numeric pinned component).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Listing existing tags failed.
    #[error("Failed to list tags (page {page}): {message}")]
    UpstreamList { page: u32, message: String },

    /// The full version tag or release could not be created.
    #[error("Failed to publish {tag}: {message}")]
    Publish { tag: String, message: String },

    /// Deleting or creating a floating alias ref failed.
    #[error("Failed to update alias {reference}: {message}")]
    AliasMutation { reference: String, message: String },
}

impl ReleaseError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
