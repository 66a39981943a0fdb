//! Container framing for Media Station data files.
//!
//! Data files are *almost* RIFF, with two deviations that matter here:
//! - a file holds one or more RIFF subfiles after an optional preamble, and
//! - some identifiers are eight characters long (`IMTSrate`, `dataigod`)
//!   with no length field in between, so they cannot be LIST structures
//!   and have to be consumed as two 4-byte halves.

mod chunk;
mod data_file;
mod subfile;

pub use chunk::{Chunk, FourCc};
pub use data_file::DataFile;
pub use subfile::SubFile;
