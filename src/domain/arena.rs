use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::line::Payload;
use crate::domain::path::BranchPath;
use crate::domain::view::BranchView;

/// Tree node in the arena-based dialog structure.
///
/// Content (`entry`, `lines`) is freely editable; the links are owned by the
/// surrounding [`BranchTree`] and only change through its methods.
#[derive(Debug)]
pub struct Branch<B, N> {
    /// Label of the choice leading into this branch, None for the start branch
    entry: Option<B>,
    /// Dialog lines in speaking order
    lines: Vec<N>,
    /// Index of the parent branch in the arena, None for the start branch
    parent: Option<Index>,
    /// Indices of child branches in choice order
    children: Vec<Index>,
}

impl<B, N> Branch<B, N> {
    fn detached(entry: Option<B>, lines: Vec<N>, parent: Option<Index>) -> Self {
        Self {
            entry,
            lines,
            parent,
            children: Vec::new(),
        }
    }

    pub fn entry(&self) -> Option<&B> {
        self.entry.as_ref()
    }

    pub fn set_entry(&mut self, entry: Option<B>) {
        self.entry = entry;
    }

    pub fn lines(&self) -> &[N] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<N> {
        &mut self.lines
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn has_previous(&self) -> bool {
        self.parent.is_some()
    }

    /// True unless this branch ends the dialog.
    pub fn continues(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena-backed dialog tree.
///
/// Branches reference each other by generational index: children are owned
/// through the arena and the parent link is a plain index, so the structure
/// never forms a reference cycle. A tree always has a start branch.
#[derive(Debug)]
pub struct BranchTree<B, N> {
    arena: Arena<Branch<B, N>>,
    root: Index,
}

impl<B, N> BranchTree<B, N> {
    pub fn root_index(&self) -> Index {
        self.root
    }

    pub fn root(&self) -> BranchView<'_, B, N> {
        // the start branch is inserted on construction and never removed
        BranchView::new(self, self.root, &self.arena[self.root])
    }

    pub fn get(&self, idx: Index) -> Option<&Branch<B, N>> {
        self.arena.get(idx)
    }

    pub fn get_mut(&mut self, idx: Index) -> Option<&mut Branch<B, N>> {
        self.arena.get_mut(idx)
    }

    pub fn view(&self, idx: Index) -> Option<BranchView<'_, B, N>> {
        self.arena
            .get(idx)
            .map(|branch| BranchView::new(self, idx, branch))
    }

    pub fn branch_count(&self) -> usize {
        self.arena.len()
    }

    pub fn iter(&self) -> BranchIter<'_, B, N> {
        BranchIter::new(self)
    }

    /// Number of branches on the longest path from the start branch to an ending.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((idx, level)) = stack.pop() {
            if let Some(branch) = self.get(idx) {
                deepest = deepest.max(level);
                stack.extend(branch.children.iter().map(|&child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Collects the branches that end the dialog, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, branch)| !branch.continues())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Position of a branch below the start branch, following parent links.
    pub fn path_of(&self, idx: Index) -> Option<BranchPath> {
        let mut steps = Vec::new();
        let mut current = idx;
        let mut branch = self.get(current)?;
        while let Some(parent_idx) = branch.parent {
            let parent = self.get(parent_idx)?;
            let position = parent.children.iter().position(|&c| c == current)?;
            steps.push(position);
            current = parent_idx;
            branch = parent;
        }
        steps.reverse();
        Some(BranchPath::from(steps))
    }

    /// Rebuilds every parent link from the children lists alone.
    ///
    /// The start branch loses its parent; every other reachable branch points
    /// at the branch listing it as a child. Returns the number of branches
    /// visited, each exactly once.
    #[instrument(level = "debug", skip(self))]
    pub fn relink_parents(&mut self) -> usize {
        if let Some(root) = self.arena.get_mut(self.root) {
            root.parent = None;
        }

        let mut visited = 0;
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            let children = match self.arena.get(current) {
                Some(branch) => branch.children.clone(),
                None => continue,
            };
            for &child in &children {
                if let Some(branch) = self.arena.get_mut(child) {
                    branch.parent = Some(current);
                }
            }
            stack.extend(children.iter().rev());
            visited += 1;
        }
        visited
    }

    /// Finalize check: every branch must hold at least one line.
    ///
    /// Reports the first offending branch in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> DomainResult<()> {
        match self.iter().find(|(_, branch)| branch.lines.is_empty()) {
            Some((idx, _)) => Err(DomainError::EmptyBranch {
                path: self.path_of(idx).unwrap_or_default(),
            }),
            None => Ok(()),
        }
    }

    /// Adds a child without setting its back-reference.
    ///
    /// Only used while assembling decoded documents, which call
    /// [`BranchTree::relink_parents`] once the whole tree is in place.
    pub(crate) fn attach_unlinked(
        &mut self,
        parent: Index,
        entry: Option<B>,
        lines: Vec<N>,
    ) -> DomainResult<Index> {
        if !self.arena.contains(parent) {
            return Err(DomainError::UnknownBranch(parent));
        }
        let idx = self.arena.insert(Branch::detached(entry, lines, None));
        if let Some(branch) = self.arena.get_mut(parent) {
            branch.children.push(idx);
        }
        Ok(idx)
    }
}

impl<B: Payload, N: Payload> BranchTree<B, N> {
    /// Creates a tree whose start branch holds `entry` and `lines`, with
    /// copies of `children` attached in order.
    ///
    /// Lines are not checked here; see [`BranchTree::validate`].
    #[instrument(level = "trace", skip_all, fields(lines = lines.len(), children = children.len()))]
    pub fn new(entry: Option<B>, lines: Vec<N>, children: Vec<BranchTree<B, N>>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(Branch::detached(entry, lines, None));
        let mut tree = Self { arena, root };
        for child in &children {
            let child_root = &child.arena[child.root];
            let idx = copy_nodes(&child.arena, child_root, &mut tree.arena, Some(root));
            tree.arena[root].children.push(idx);
        }
        tree
    }

    #[instrument(level = "trace", skip(self, entry, lines))]
    pub fn insert_child(
        &mut self,
        parent: Index,
        entry: Option<B>,
        lines: Vec<N>,
    ) -> DomainResult<Index> {
        if !self.arena.contains(parent) {
            return Err(DomainError::UnknownBranch(parent));
        }
        let idx = self.arena.insert(Branch::detached(entry, lines, Some(parent)));
        if let Some(branch) = self.arena.get_mut(parent) {
            branch.children.push(idx);
        }
        Ok(idx)
    }

    /// Attaches a copy of `subtree` as the last child of `parent`.
    ///
    /// The subtree is copied, never shared, so the caller keeps an independent
    /// tree. Returns the index of the attached copy.
    #[instrument(level = "trace", skip(self, subtree), fields(branches = subtree.branch_count()))]
    pub fn graft(&mut self, parent: Index, subtree: &BranchTree<B, N>) -> DomainResult<Index> {
        if !self.arena.contains(parent) {
            return Err(DomainError::UnknownBranch(parent));
        }
        let top = &subtree.arena[subtree.root];
        let idx = copy_nodes(&subtree.arena, top, &mut self.arena, Some(parent));
        if let Some(branch) = self.arena.get_mut(parent) {
            branch.children.push(idx);
        }
        Ok(idx)
    }

    /// Structurally identical tree sharing nothing with `self`.
    ///
    /// Every back-reference of the copy points into the copy.
    #[instrument(level = "debug", skip(self), fields(branches = self.branch_count()))]
    pub fn deep_copy(&self) -> Self {
        let mut arena = Arena::with_capacity(self.arena.len());
        let root = copy_nodes(&self.arena, &self.arena[self.root], &mut arena, None);
        Self { arena, root }
    }

    /// Copies the branch at `idx` and everything below it into a new tree.
    ///
    /// The copied branch becomes the start branch of the result and has no parent.
    #[instrument(level = "debug", skip(self))]
    pub fn copy_subtree(&self, idx: Index) -> DomainResult<Self> {
        let top = self.arena.get(idx).ok_or(DomainError::UnknownBranch(idx))?;
        let mut arena = Arena::new();
        let root = copy_nodes(&self.arena, top, &mut arena, None);
        Ok(Self { arena, root })
    }
}

/// Copies `top` and its descendants from `source` into `target`.
///
/// The copy of `top` gets `parent` as back-reference but is not appended to
/// the parent's children; callers do that. Descendants are linked to their
/// new parents as they are inserted, preserving child order.
fn copy_nodes<B: Clone, N: Clone>(
    source: &Arena<Branch<B, N>>,
    top: &Branch<B, N>,
    target: &mut Arena<Branch<B, N>>,
    parent: Option<Index>,
) -> Index {
    let top_idx = target.insert(Branch::detached(top.entry.clone(), top.lines.clone(), parent));

    let mut stack: Vec<(Index, Index)> = top.children.iter().rev().map(|&c| (c, top_idx)).collect();
    while let Some((src_idx, dst_parent)) = stack.pop() {
        let Some(src) = source.get(src_idx) else {
            continue;
        };
        let dst_idx = target.insert(Branch::detached(
            src.entry.clone(),
            src.lines.clone(),
            Some(dst_parent),
        ));
        if let Some(parent_branch) = target.get_mut(dst_parent) {
            parent_branch.children.push(dst_idx);
        }
        // Push children in reverse order for left-to-right traversal
        stack.extend(src.children.iter().rev().map(|&c| (c, dst_idx)));
    }

    top_idx
}

impl<B: Payload, N: Payload> Clone for BranchTree<B, N> {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}

/// Structural equality: entries, lines and child order; arena slots are ignored.
impl<B: PartialEq, N: PartialEq> PartialEq for BranchTree<B, N> {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self.root, other.root)];
        while let Some((left, right)) = pairs.pop() {
            match (self.arena.get(left), other.arena.get(right)) {
                (Some(a), Some(b)) => {
                    if a.entry != b.entry
                        || a.lines != b.lines
                        || a.children.len() != b.children.len()
                    {
                        return false;
                    }
                    pairs.extend(a.children.iter().copied().zip(b.children.iter().copied()));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Pre-order traversal, children left to right.
pub struct BranchIter<'a, B, N> {
    tree: &'a BranchTree<B, N>,
    stack: Vec<Index>,
}

impl<'a, B, N> BranchIter<'a, B, N> {
    fn new(tree: &'a BranchTree<B, N>) -> Self {
        Self {
            tree,
            stack: vec![tree.root],
        }
    }
}

impl<'a, B, N> Iterator for BranchIter<'a, B, N> {
    type Item = (Index, &'a Branch<B, N>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(branch) = self.tree.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(branch.children.iter().rev());
                return Some((current_idx, branch));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DialogLine;

    type TextTree = BranchTree<String, DialogLine>;

    fn leaf(content: &str) -> TextTree {
        BranchTree::new(None, vec![DialogLine::new("Person", content)], Vec::new())
    }

    //        start
    //      /   |   \
    //    No. Yes. Maybe.
    //               |
    //             Sure?
    fn sample() -> TextTree {
        let maybe = BranchTree::new(
            Some("hedge".to_string()),
            vec![DialogLine::new("Person", "Maybe.")],
            vec![leaf("Sure?")],
        );
        BranchTree::new(
            None,
            vec![DialogLine::new("Cat", "Meow"), DialogLine::new("Person", "Hey!")],
            vec![leaf("No."), leaf("Yes."), maybe],
        )
    }

    fn assert_links_consistent(tree: &TextTree) {
        for (idx, branch) in tree.iter() {
            for &child in branch.children() {
                assert_eq!(tree.get(child).unwrap().parent(), Some(idx));
            }
        }
        assert_eq!(tree.get(tree.root_index()).unwrap().parent(), None);
    }

    #[test]
    fn given_children_when_constructing_then_links_and_order_are_kept() {
        let tree = sample();
        assert_eq!(tree.branch_count(), 5);
        assert_links_consistent(&tree);

        let contents: Vec<_> = tree
            .iter()
            .map(|(_, b)| b.lines()[0].content.clone())
            .collect();
        assert_eq!(contents, vec!["Meow", "No.", "Yes.", "Maybe.", "Sure?"]);
    }

    #[test]
    fn given_tree_when_querying_then_reports_terminal_branches() {
        let tree = sample();
        let root = tree.get(tree.root_index()).unwrap();
        assert!(root.continues());
        assert!(!root.has_previous());
        assert_eq!(tree.leaves().len(), 3);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn given_broken_links_when_relinking_then_every_parent_is_restored() {
        let mut tree = sample();
        let all: Vec<Index> = tree.iter().map(|(idx, _)| idx).collect();
        for idx in &all {
            tree.get_mut(*idx).unwrap().parent = None;
        }

        let visited = tree.relink_parents();

        assert_eq!(visited, tree.branch_count());
        assert_links_consistent(&tree);
    }

    #[test]
    fn given_linked_tree_when_relinking_twice_then_links_are_unchanged() {
        let mut tree = sample();
        let before: Vec<_> = tree.iter().map(|(idx, b)| (idx, b.parent())).collect();

        tree.relink_parents();
        tree.relink_parents();

        let after: Vec<_> = tree.iter().map(|(idx, b)| (idx, b.parent())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn given_tree_when_deep_copied_then_copy_is_equal_and_independent() {
        let original = sample();
        let mut copy = original.deep_copy();
        assert_eq!(original, copy);
        assert_links_consistent(&copy);

        let copy_root = copy.root_index();
        copy.get_mut(copy_root)
            .unwrap()
            .lines_mut()
            .push(DialogLine::new("Cat", "Purr"));

        assert_ne!(original, copy);
        assert_eq!(original.root().lines().len(), 2);
    }

    #[test]
    fn given_inner_branch_when_copying_subtree_then_copy_starts_without_parent() {
        let tree = sample();
        let maybe = tree.root().child(2).unwrap().index();

        let copy = tree.copy_subtree(maybe).unwrap();

        assert_eq!(copy.branch_count(), 2);
        assert!(!copy.root().has_previous());
        assert_eq!(copy.root().entry(), Some(&"hedge".to_string()));
        assert_links_consistent(&copy);
    }

    #[test]
    fn given_subtree_when_grafted_then_source_stays_untouched() {
        let mut tree = leaf("Hello");
        let branch = sample();
        let root = tree.root_index();

        let idx = tree.graft(root, &branch).unwrap();

        assert_eq!(tree.branch_count(), 6);
        assert_eq!(tree.get(idx).unwrap().parent(), Some(root));
        assert_eq!(branch.branch_count(), 5);
        assert_links_consistent(&tree);
    }

    #[test]
    fn given_empty_branch_when_validating_then_reports_its_path() {
        let mut tree = sample();
        let root = tree.root_index();
        tree.insert_child(root, None, Vec::new()).unwrap();

        let err = tree.validate().unwrap_err();
        assert_eq!(
            err,
            DomainError::EmptyBranch {
                path: BranchPath::from(vec![3])
            }
        );
    }

    #[test]
    fn given_index_from_other_tree_when_grafting_then_returns_unknown_branch() {
        let mut other = leaf("elsewhere");
        let foreign = other
            .insert_child(other.root_index(), None, Vec::new())
            .unwrap();
        let mut tree = leaf("here");

        let err = tree.graft(foreign, &other).unwrap_err();

        assert_eq!(err, DomainError::UnknownBranch(foreign));
        assert_eq!(tree.branch_count(), 1);
    }
}
