//! VCS repository abstraction crate.
//!
//! This crate lists branches and tags of, and checks out versions from, a remote
//! repository identified only by its URL and a local working directory. The
//! backend (Git or Subversion) is detected by probing the registered adapters in
//! order; the first adapter that claims the URL is bound for the lifetime of the
//! [`Repository`].

pub mod adapter;
pub mod config;
pub mod error;
pub mod git;
pub mod repo;
pub mod subversion;
pub mod test_helpers;
pub mod vcs_types;

pub use adapter::{Adapter, VcsAdapter};
pub use config::RepositoryConfig;
pub use error::{VcsError, VcsResult};
pub use git::GitAdapter;
pub use repo::Repository;
pub use subversion::SubversionAdapter;
pub use vcs_types::{AdapterKind, RepositoryRef, RevisionMap};
