//! Reader for the data files of 1990s Media Station CD-ROM titles.
//!
//! Three-layer architecture:
//! - **Layer 1** (`cursor`/`riff`): Raw byte and chunk I/O — RIFF envelope,
//!   subfile framing
//! - **Layer 2** (`datum`/`assets`): Tagged-value decoding and typed parsers
//!   for each asset kind
//! - **Layer 3** (`context`/`title`): Whole-file and whole-title assembly,
//!   including cross-file chunk resolution

pub mod assets;
pub mod context;
pub mod cursor;
pub mod datum;
pub mod error;
pub mod registry;
pub mod riff;
pub mod title;
pub mod version;

pub use assets::{Asset, AssetKind, AssetPayload};
pub use context::Context;
pub use datum::Datum;
pub use error::{Error, Result};
pub use riff::{Chunk, DataFile, FourCc, SubFile};
pub use title::Title;
pub use version::{EngineVersion, SessionContext};
