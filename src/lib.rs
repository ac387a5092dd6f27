//! Branching dialog trees.
//!
//! A [`Dialog`] owns a [`BranchTree`]: an arena of branches, each holding an
//! optional entry label, its dialog lines and its follow-up branches. Parent
//! links are arena indices, so they never own anything and can always be
//! rebuilt from the children lists.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ApplicationError, ApplicationResult};
pub use domain::{
    dsl, Branch, BranchBuilder, BranchPath, BranchTree, BranchView, Dialog, DialogBuilder,
    DialogLine, DomainError, DomainResult, Payload, TextDialog, Utterance,
};

use application::services::DialogStore;
use infrastructure::traits::RealFileSystem;

/// Save a dialog to `path`; the extension selects the format.
pub fn save<B, N>(dialog: &Dialog<B, N>, path: impl AsRef<Path>) -> ApplicationResult<()>
where
    B: Serialize,
    N: Serialize,
{
    DialogStore::new(Arc::new(RealFileSystem)).save(dialog, path.as_ref())
}

/// Load a dialog from `path` with parent links restored.
pub fn load<B, N>(path: impl AsRef<Path>) -> ApplicationResult<Dialog<B, N>>
where
    B: Payload + DeserializeOwned,
    N: Payload + DeserializeOwned,
{
    DialogStore::new(Arc::new(RealFileSystem)).load(path.as_ref())
}
