//! Backup export and import.

mod archive;

pub use archive::*;
