use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use vb_process::{CommandRunner, ProcessExecutor};

use crate::adapter::{Adapter, VcsAdapter};
use crate::error::{VcsError, VcsResult};
use crate::vcs_types::{AdapterKind, RepositoryRef, RevisionMap};

/// A remote repository whose VCS backend is detected on first use.
///
/// The adapter list is probed in order and the first adapter that supports
/// the URL is bound for the lifetime of this value. Binding needs `&mut self`,
/// so one `Repository` serves one logical checkout at a time.
#[derive(Debug)]
pub struct Repository {
    repository: RepositoryRef,
    runner: Arc<dyn CommandRunner>,
    adapters: Vec<AdapterKind>,
    bound: Option<Adapter>,
}

impl Repository {
    /// Create a repository probing Git, then Subversion.
    pub fn new(
        url: impl Into<String>,
        local_directory: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            repository: RepositoryRef::new(url, local_directory),
            runner,
            adapters: AdapterKind::ALL.to_vec(),
            bound: None,
        }
    }

    /// Create a repository that runs commands through a [`ProcessExecutor`].
    pub fn with_process_executor(
        url: impl Into<String>,
        local_directory: impl Into<PathBuf>,
    ) -> Self {
        Self::new(url, local_directory, Arc::new(ProcessExecutor::new()))
    }

    /// Replace the adapter probe order.
    pub fn with_adapters(mut self, adapters: Vec<AdapterKind>) -> Self {
        self.set_adapters(adapters);
        self
    }

    /// Replace the adapter probe order.
    pub fn set_adapters(&mut self, adapters: Vec<AdapterKind>) {
        self.adapters = adapters;
    }

    pub fn adapters(&self) -> &[AdapterKind] {
        &self.adapters
    }

    pub fn url(&self) -> &str {
        self.repository.url()
    }

    pub fn local_directory(&self) -> &Path {
        self.repository.local_directory()
    }

    /// The bound adapter, without probing.
    pub fn bound_adapter(&self) -> Option<&Adapter> {
        self.bound.as_ref()
    }

    /// Find the adapter for this repository without binding it.
    ///
    /// Returns the bound adapter when there is one; otherwise instantiates each
    /// configured kind in order and returns the first that supports the URL.
    pub async fn select_adapter(&self) -> Option<Adapter> {
        if let Some(adapter) = &self.bound {
            return Some(adapter.clone());
        }

        for kind in &self.adapters {
            let adapter = kind.instantiate(self.repository.clone(), self.runner.clone());
            if adapter.supports_repository().await {
                debug!(adapter = %kind, url = self.url(), "Adapter supports repository");
                return Some(adapter);
            }
            debug!(adapter = %kind, url = self.url(), "Adapter does not support repository");
        }

        None
    }

    /// The adapter bound to this repository, detecting and binding it if needed.
    pub async fn adapter(&mut self) -> VcsResult<&Adapter> {
        if self.bound.is_none() {
            let adapter = self
                .select_adapter()
                .await
                .ok_or_else(|| VcsError::no_adapter(self.url()))?;
            info!(adapter = %adapter.kind(), url = self.url(), "Bound VCS adapter");
            self.bound = Some(adapter);
        }

        self.bound
            .as_ref()
            .ok_or_else(|| VcsError::no_adapter(self.repository.url()))
    }

    /// Branches on the remote, keyed by revision identifier.
    pub async fn branches(&mut self) -> VcsResult<RevisionMap> {
        Ok(self.adapter().await?.branches().await)
    }

    /// Tags on the remote, keyed by revision identifier.
    pub async fn tags(&mut self) -> VcsResult<RevisionMap> {
        Ok(self.adapter().await?.tags().await)
    }

    /// Check out `version` into the local directory.
    ///
    /// `Ok(false)` means the backend was found but the checkout did not succeed.
    pub async fn checkout(&mut self, version: &str) -> VcsResult<bool> {
        let adapter = self.adapter().await?;
        let checked_out = adapter.checkout(version).await;
        info!(
            adapter = %adapter.kind(),
            version,
            directory = %adapter.repository().local_directory().display(),
            checked_out,
            "Checkout finished"
        );
        Ok(checked_out)
    }
}
