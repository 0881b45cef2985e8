//! Stateful sorting of crops into per-user and catalog folders

pub mod batch;
pub mod catalog;
pub mod sorter;

pub use batch::{BatchState, FolderOutcome};
pub use catalog::CATALOG;
pub use sorter::{PageKind, PageOutcome, SketchSorter, SortReport};
