//! Branch positions relative to the dialog start.

use std::fmt;

/// Position of a branch as the child offsets walked from the start branch.
///
/// Displayed 1-based (`start.2.1`) so it lines up with the choice numbers a
/// player sees during a walkthrough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BranchPath(Vec<usize>);

impl BranchPath {
    pub fn start() -> Self {
        Self(Vec::new())
    }

    /// Path of the `position`-th child below this branch.
    pub fn child(&self, position: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(position);
        Self(steps)
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }

    pub fn is_start(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for BranchPath {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start")?;
        for step in &self.0 {
            write!(f, ".{}", step + 1)?;
        }
        Ok(())
    }
}
