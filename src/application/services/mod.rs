//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, KeySource)
//! but are themselves concrete structs, not traits.

mod store;
mod walkthrough;

pub use store::DialogStore;
pub use walkthrough::{
    choice_label, Pacing, WalkReport, Walkthrough, MAX_LINE_PAUSE, UNNAMED_DIALOG,
};
