//! Text outline of a dialog tree, rendered with `termtree`.

use std::fmt::Display;

use termtree::Tree;

use crate::application::services::UNNAMED_DIALOG;
use crate::domain::{BranchTree, BranchView, Dialog, Utterance};

/// Anything that can be drawn as an indented tree of branches.
pub trait Outline {
    fn to_outline(&self) -> Tree<String>;
}

impl<B: Display, N: Utterance> Outline for BranchTree<B, N> {
    fn to_outline(&self) -> Tree<String> {
        build_outline(self.root())
    }
}

/// The dialog name becomes the top node, the start branch its only child.
impl<B: Display, N: Utterance> Outline for Dialog<B, N> {
    fn to_outline(&self) -> Tree<String> {
        let title = self.name().unwrap_or(UNNAMED_DIALOG).to_string();
        Tree::new(title).with_leaves([self.tree().to_outline()])
    }
}

fn build_outline<B: Display, N: Utterance>(branch: BranchView<'_, B, N>) -> Tree<String> {
    let leaves: Vec<_> = branch.children().map(build_outline).collect();
    Tree::new(branch_label(branch)).with_leaves(leaves)
}

/// `label (n lines)`; the label is the entry, else the first line.
pub fn branch_label<B: Display, N: Utterance>(branch: BranchView<'_, B, N>) -> String {
    let label = match (branch.entry(), branch.first_line()) {
        (Some(entry), _) => entry.to_string(),
        (None, Some(line)) => match line.speaker() {
            Some(speaker) => format!("{}: {}", speaker, line.text()),
            None => line.text().to_string(),
        },
        (None, None) => "<empty>".to_string(),
    };
    let count = branch.lines().len();
    let unit = if count == 1 { "line" } else { "lines" };
    format!("{} ({} {})", label, count, unit)
}
