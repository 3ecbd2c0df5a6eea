//! Archive orchestration module
//!
//! Turns a seed URL into a stored, self-contained capture of its site and
//! answers queries about what has been archived.

mod coordinator;
mod report;

pub use coordinator::{Archiver, ArchiverOptions};
pub use report::{print_report, ArchiveReport, AssetFailure};
