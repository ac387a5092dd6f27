//! Domain layer: dialog tree data structure and construction
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod dialog;
pub mod dsl;
pub mod error;
pub mod line;
pub mod path;
pub mod view;

pub use arena::{Branch, BranchIter, BranchTree};
pub use builder::{BranchBuilder, DialogBuilder};
pub use dialog::{Dialog, TextDialog};
pub use error::{DomainError, DomainResult};
pub use line::{DialogLine, Payload, Utterance};
pub use path::BranchPath;
pub use view::BranchView;
