//! Read-only projection of a branch inside its tree.

use generational_arena::Index;

use crate::domain::arena::{Branch, BranchTree};
use crate::domain::path::BranchPath;

/// Borrowed, read-only handle on one branch of a [`BranchTree`].
///
/// Unlike [`Branch`] alone, a view can walk to its parent and children,
/// which is what playback and rendering need.
pub struct BranchView<'a, B, N> {
    tree: &'a BranchTree<B, N>,
    index: Index,
    branch: &'a Branch<B, N>,
}

impl<B, N> Clone for BranchView<'_, B, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B, N> Copy for BranchView<'_, B, N> {}

impl<'a, B: 'a, N: 'a> BranchView<'a, B, N> {
    pub(crate) fn new(tree: &'a BranchTree<B, N>, index: Index, branch: &'a Branch<B, N>) -> Self {
        Self { tree, index, branch }
    }

    pub fn index(&self) -> Index {
        self.index
    }

    pub fn branch(&self) -> &'a Branch<B, N> {
        self.branch
    }

    pub fn tree(&self) -> &'a BranchTree<B, N> {
        self.tree
    }

    pub fn entry(&self) -> Option<&'a B> {
        self.branch.entry()
    }

    pub fn lines(&self) -> &'a [N] {
        self.branch.lines()
    }

    pub fn first_line(&self) -> Option<&'a N> {
        self.branch.lines().first()
    }

    pub fn child_count(&self) -> usize {
        self.branch.children().len()
    }

    pub fn child(&self, position: usize) -> Option<Self> {
        let idx = *self.branch.children().get(position)?;
        self.tree.view(idx)
    }

    pub fn children(&self) -> impl Iterator<Item = BranchView<'a, B, N>> + 'a {
        let tree = self.tree;
        self.branch
            .children()
            .iter()
            .filter_map(move |&idx| tree.view(idx))
    }

    pub fn parent(&self) -> Option<Self> {
        self.tree.view(self.branch.parent()?)
    }

    pub fn has_previous(&self) -> bool {
        self.branch.has_previous()
    }

    pub fn continues(&self) -> bool {
        self.branch.continues()
    }

    pub fn path(&self) -> BranchPath {
        self.tree.path_of(self.index).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{BranchTree, DialogLine};

    #[test]
    fn given_view_when_walking_down_and_up_then_returns_to_start() {
        let child = BranchTree::new(
            Some("agree".to_string()),
            vec![DialogLine::new("Person", "Yes.")],
            Vec::new(),
        );
        let tree = BranchTree::new(None, vec![DialogLine::new("Cat", "Meow")], vec![child]);

        let start = tree.root();
        let yes = start.child(0).unwrap();

        assert_eq!(yes.entry().map(String::as_str), Some("agree"));
        assert_eq!(yes.first_line().unwrap().content, "Yes.");
        assert_eq!(yes.path().to_string(), "start.1");
        assert_eq!(yes.parent().unwrap().index(), start.index());
        assert!(start.child(1).is_none());
        assert_eq!(start.children().count(), 1);
    }
}
