//! Capability contract shared by every VCS backend.

use async_trait::async_trait;

use crate::git::GitAdapter;
use crate::subversion::SubversionAdapter;
use crate::vcs_types::{AdapterKind, RepositoryRef, RevisionMap};

/// Backend-specific detection, listing and checkout.
///
/// None of these operations fail loudly: an unreachable remote, a missing
/// client binary or an authentication prompt all surface as `false` or an empty
/// map so the caller decides how to report or retry.
#[async_trait]
pub trait VcsAdapter: Send + Sync {
    /// Whether this backend can handle the repository URL.
    ///
    /// Checks the client binary first, then known URL shapes, and only falls
    /// back to a network probe when no shape matches.
    async fn supports_repository(&self) -> bool;

    /// Branches on the remote, keyed by revision identifier.
    async fn branches(&self) -> RevisionMap;

    /// Tags on the remote, keyed by revision identifier.
    async fn tags(&self) -> RevisionMap;

    /// Bring the local working copy to `version` (a branch or tag name).
    async fn checkout(&self, version: &str) -> bool;
}

/// The adapter bound to a repository.
#[derive(Debug, Clone)]
pub enum Adapter {
    Git(GitAdapter),
    Subversion(SubversionAdapter),
}

impl Adapter {
    pub fn kind(&self) -> AdapterKind {
        match self {
            Adapter::Git(_) => AdapterKind::Git,
            Adapter::Subversion(_) => AdapterKind::Subversion,
        }
    }

    pub fn repository(&self) -> &RepositoryRef {
        match self {
            Adapter::Git(adapter) => adapter.repository(),
            Adapter::Subversion(adapter) => adapter.repository(),
        }
    }
}

#[async_trait]
impl VcsAdapter for Adapter {
    async fn supports_repository(&self) -> bool {
        match self {
            Adapter::Git(adapter) => adapter.supports_repository().await,
            Adapter::Subversion(adapter) => adapter.supports_repository().await,
        }
    }

    async fn branches(&self) -> RevisionMap {
        match self {
            Adapter::Git(adapter) => adapter.branches().await,
            Adapter::Subversion(adapter) => adapter.branches().await,
        }
    }

    async fn tags(&self) -> RevisionMap {
        match self {
            Adapter::Git(adapter) => adapter.tags().await,
            Adapter::Subversion(adapter) => adapter.tags().await,
        }
    }

    async fn checkout(&self, version: &str) -> bool {
        match self {
            Adapter::Git(adapter) => adapter.checkout(version).await,
            Adapter::Subversion(adapter) => adapter.checkout(version).await,
        }
    }
}
