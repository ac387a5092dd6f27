//! Named dialog owning one branch tree.

use tracing::instrument;

use crate::domain::arena::BranchTree;
use crate::domain::error::DomainResult;
use crate::domain::line::{DialogLine, Payload};
use crate::domain::view::BranchView;

/// A dialog: an optional name and the tree starting at its start branch.
///
/// The tree is owned exclusively; copies are always deep.
#[derive(Debug, PartialEq)]
pub struct Dialog<B, N> {
    name: Option<String>,
    tree: BranchTree<B, N>,
}

/// Dialog with plain-text entry labels and speaker/content lines.
pub type TextDialog = Dialog<String, DialogLine>;

impl<B, N> Dialog<B, N> {
    pub fn new(name: Option<String>, tree: BranchTree<B, N>) -> Self {
        Self { name, tree }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn tree(&self) -> &BranchTree<B, N> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut BranchTree<B, N> {
        &mut self.tree
    }

    /// Where playback begins.
    pub fn start(&self) -> BranchView<'_, B, N> {
        self.tree.root()
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.tree.validate()
    }

    pub fn into_parts(self) -> (Option<String>, BranchTree<B, N>) {
        (self.name, self.tree)
    }
}

impl<B: Payload, N: Payload> Dialog<B, N> {
    #[instrument(level = "debug", skip(self), fields(name = ?self.name))]
    pub fn deep_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            tree: self.tree.deep_copy(),
        }
    }
}

impl<B: Payload, N: Payload> Clone for Dialog<B, N> {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}
