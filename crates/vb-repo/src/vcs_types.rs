use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use vb_process::CommandRunner;

use crate::adapter::Adapter;
use crate::error::VcsError;
use crate::git::GitAdapter;
use crate::subversion::SubversionAdapter;

/// Revision identifier (commit hash or revision number) mapped to a branch or tag name.
pub type RevisionMap = HashMap<String, String>;

/// A remote repository URL paired with the location of its local working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    url: String,
    local_directory: PathBuf,
}

impl RepositoryRef {
    pub fn new(url: impl Into<String>, local_directory: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            local_directory: local_directory.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn local_directory(&self) -> &Path {
        &self.local_directory
    }
}

/// Supported VCS backends, in the order they are probed by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Git,
    Subversion,
}

impl AdapterKind {
    /// Default probe order.
    pub const ALL: [AdapterKind; 2] = [AdapterKind::Git, AdapterKind::Subversion];

    /// Name of the client binary this backend drives.
    pub fn binary(&self) -> &'static str {
        match self {
            AdapterKind::Git => "git",
            AdapterKind::Subversion => "svn",
        }
    }

    /// Build an adapter of this kind for `repository`.
    pub fn instantiate(&self, repository: RepositoryRef, runner: Arc<dyn CommandRunner>) -> Adapter {
        match self {
            AdapterKind::Git => Adapter::Git(GitAdapter::new(repository, runner)),
            AdapterKind::Subversion => {
                Adapter::Subversion(SubversionAdapter::new(repository, runner))
            }
        }
    }
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterKind::Git => write!(f, "git"),
            AdapterKind::Subversion => write!(f, "svn"),
        }
    }
}

impl FromStr for AdapterKind {
    type Err = VcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(AdapterKind::Git),
            "svn" | "subversion" => Ok(AdapterKind::Subversion),
            _ => Err(VcsError::UnknownAdapter(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_kind_names_round_trip() {
        for kind in AdapterKind::ALL {
            assert_eq!(kind.to_string().parse::<AdapterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn adapter_kind_parsing_is_lenient_about_case_and_aliases() {
        assert_eq!("GIT".parse::<AdapterKind>().unwrap(), AdapterKind::Git);
        assert_eq!(
            " Subversion ".parse::<AdapterKind>().unwrap(),
            AdapterKind::Subversion
        );
        assert!(matches!(
            "mercurial".parse::<AdapterKind>(),
            Err(VcsError::UnknownAdapter(name)) if name == "mercurial"
        ));
    }

    #[test]
    fn binaries() {
        assert_eq!(AdapterKind::Git.binary(), "git");
        assert_eq!(AdapterKind::Subversion.binary(), "svn");
    }
}
