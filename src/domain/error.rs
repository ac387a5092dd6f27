//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

use crate::domain::path::BranchPath;

/// Domain errors represent violations of the dialog tree rules.
/// These are independent of serialization and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("branch must contain at least one line: {path}")]
    EmptyBranch { path: BranchPath },

    #[error("dialog must have a start branch")]
    MissingStart,

    #[error("unknown branch: {0:?}")]
    UnknownBranch(Index),
}

/// Result type for dialog tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
