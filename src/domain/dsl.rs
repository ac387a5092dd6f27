//! Declarative construction by value composition.
//!
//! ```ignore
//! let dialog = dsl::dialog("cat").start(
//!     dsl::branch()
//!         .line(DialogLine::new("Cat", "Meow"))
//!         .then([dsl::branch().line(DialogLine::new("Person", "No."))]),
//! )?;
//! ```

use crate::domain::arena::BranchTree;
use crate::domain::dialog::Dialog;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::line::Payload;
use crate::domain::path::BranchPath;

pub fn dialog(name: impl Into<String>) -> DialogDraft {
    DialogDraft {
        name: Some(name.into()),
    }
}

pub fn unnamed() -> DialogDraft {
    DialogDraft { name: None }
}

pub fn branch<B, N>() -> BranchDraft<B, N> {
    BranchDraft {
        entry: None,
        lines: Vec::new(),
        next: Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct DialogDraft {
    name: Option<String>,
}

impl DialogDraft {
    /// Assembles the dialog, validating every branch on the way down.
    pub fn start<B: Payload, N: Payload>(
        self,
        start: BranchDraft<B, N>,
    ) -> DomainResult<Dialog<B, N>> {
        let tree = start.assemble(BranchPath::start())?;
        Ok(Dialog::new(self.name, tree))
    }
}

/// A branch described by value; nothing is checked until assembly.
#[derive(Debug, Clone)]
pub struct BranchDraft<B, N> {
    entry: Option<B>,
    lines: Vec<N>,
    next: Vec<BranchDraft<B, N>>,
}

impl<B: Payload, N: Payload> BranchDraft<B, N> {
    pub fn entry(mut self, entry: B) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn line(mut self, line: impl Into<N>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<N>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Appends follow-up branches in choice order.
    pub fn then<I>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = BranchDraft<B, N>>,
    {
        self.next.extend(branches);
        self
    }

    fn assemble(self, path: BranchPath) -> DomainResult<BranchTree<B, N>> {
        if self.lines.is_empty() {
            return Err(DomainError::EmptyBranch { path });
        }
        let children = self
            .next
            .into_iter()
            .enumerate()
            .map(|(position, draft)| draft.assemble(path.child(position)))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(BranchTree::new(self.entry, self.lines, children))
    }
}
