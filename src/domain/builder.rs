//! Fluent builders for dialogs.
//!
//! Builders accumulate branches without checking them; the single dialog rule
//! (every branch holds at least one line) is enforced when `build()` runs.

use tracing::{debug, instrument};

use crate::domain::arena::BranchTree;
use crate::domain::dialog::Dialog;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::line::Payload;
use crate::domain::path::BranchPath;

/// Builds a [`Dialog`] from a start branch configured through a callback.
///
/// ```ignore
/// let dialog = DialogBuilder::named("cat")
///     .start_branch(|b| {
///         b.add_lines([DialogLine::new("Cat", "Meow")])
///             .add_branch(|c| {
///                 c.add_line(DialogLine::new("Person", "No."));
///             });
///     })
///     .build()?;
/// ```
pub struct DialogBuilder<B, N> {
    name: Option<String>,
    start: Option<DomainResult<BranchTree<B, N>>>,
}

impl<B: Payload, N: Payload> Default for DialogBuilder<B, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Payload, N: Payload> DialogBuilder<B, N> {
    pub fn new() -> Self {
        Self {
            name: None,
            start: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            start: None,
        }
    }

    /// Defines the start branch. Calling it again replaces the previous one.
    pub fn start_branch<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut BranchBuilder<B, N>),
    {
        let mut builder = BranchBuilder::new(BranchPath::start());
        configure(&mut builder);
        self.start = Some(builder.build());
        self
    }

    /// Returns a deep copy of the assembled dialog, so later builder calls
    /// cannot affect dialogs already handed out.
    #[instrument(level = "debug", skip(self), fields(name = ?self.name))]
    pub fn build(&self) -> DomainResult<Dialog<B, N>> {
        match &self.start {
            None => Err(DomainError::MissingStart),
            Some(Err(e)) => Err(e.clone()),
            Some(Ok(tree)) => Ok(Dialog::new(self.name.clone(), tree.deep_copy())),
        }
    }
}

/// Accumulates one branch and its children.
///
/// Each child builder knows its position below this branch; once configured,
/// the child is built and grafted, which sets its back-reference.
pub struct BranchBuilder<B, N> {
    path: BranchPath,
    entry: Option<B>,
    lines: Vec<N>,
    children: Vec<BranchTree<B, N>>,
    next_position: usize,
    failure: Option<DomainError>,
}

impl<B: Payload, N: Payload> BranchBuilder<B, N> {
    fn new(path: BranchPath) -> Self {
        Self {
            path,
            entry: None,
            lines: Vec::new(),
            children: Vec::new(),
            next_position: 0,
            failure: None,
        }
    }

    /// Sets the label shown for the choice leading into this branch.
    pub fn entry(&mut self, entry: B) -> &mut Self {
        self.entry = Some(entry);
        self
    }

    pub fn add_line(&mut self, line: N) -> &mut Self {
        self.lines.push(line);
        self
    }

    pub fn add_lines<I>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = N>,
    {
        self.lines.extend(lines);
        self
    }

    /// Configures and appends a child branch.
    ///
    /// A child that fails to build is not appended; its error is reported by
    /// this builder's `build()`.
    pub fn add_branch<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut BranchBuilder<B, N>),
    {
        let mut child = BranchBuilder::new(self.path.child(self.next_position));
        self.next_position += 1;
        configure(&mut child);

        match child.build() {
            Ok(tree) => self.children.push(tree),
            Err(e) => {
                debug!("child branch failed: {}", e);
                self.failure.get_or_insert(e);
            }
        }
        self
    }

    /// Finalizes the branch.
    ///
    /// Fails with [`DomainError::EmptyBranch`] if no line was added, or with
    /// the first error of a child branch.
    pub(crate) fn build(self) -> DomainResult<BranchTree<B, N>> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        if self.lines.is_empty() {
            return Err(DomainError::EmptyBranch { path: self.path });
        }
        Ok(BranchTree::new(self.entry, self.lines, self.children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DialogLine;

    type TextBuilder = DialogBuilder<String, DialogLine>;

    #[test]
    fn given_builder_without_start_when_building_then_fails() {
        let builder = TextBuilder::named("nothing");
        assert_eq!(builder.build().unwrap_err(), DomainError::MissingStart);
    }

    #[test]
    fn given_built_dialog_when_builder_changes_then_dialog_is_unaffected() {
        let mut builder = TextBuilder::named("cat");
        builder.start_branch(|b| {
            b.add_line(DialogLine::new("Cat", "Meow"));
        });
        let first = builder.build().unwrap();

        builder.start_branch(|b| {
            b.add_line(DialogLine::new("Dog", "Woof"));
        });
        let second = builder.build().unwrap();

        assert_eq!(first.start().lines()[0].content, "Meow");
        assert_eq!(second.start().lines()[0].content, "Woof");
    }

    #[test]
    fn given_nested_empty_branch_when_building_then_reports_its_path() {
        let mut builder = TextBuilder::new();
        builder.start_branch(|b| {
            b.add_line(DialogLine::new("Npc", "Pick one"))
                .add_branch(|c| {
                    c.add_line(DialogLine::new("Player", "First"));
                })
                .add_branch(|c| {
                    c.add_line(DialogLine::new("Player", "Second"))
                        .add_branch(|_| {});
                });
        });

        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            DomainError::EmptyBranch {
                path: BranchPath::from(vec![1, 0])
            }
        );
        assert_eq!(err.to_string(), "branch must contain at least one line: start.2.1");
    }
}
