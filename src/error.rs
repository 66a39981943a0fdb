use thiserror::Error;

use crate::riff::FourCc;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid signature at offset {offset:#x}: expected {expected:?}, found {found:?}")]
    InvalidSignature {
        offset: usize,
        expected: [u8; 4],
        found: [u8; 4],
    },

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("unknown datum type {tag:#06x} at offset {offset:#x}")]
    UnknownDatumType { offset: usize, tag: u16 },

    #[error("datum at offset {offset:#x} holds {found}, expected {expected}")]
    DatumTypeMismatch {
        offset: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown asset type {raw:#06x} at offset {offset:#x}")]
    UnknownAssetType { offset: usize, raw: u32 },

    #[error("unknown section type {section:#06x} at offset {offset:#x}")]
    UnknownSectionType { offset: usize, section: u16 },

    #[error("zero-length chunk {fourcc} at offset {offset:#x} - likely corrupted data (CD-ROM read error?)")]
    ZeroLengthChunk { offset: usize, fourcc: FourCc },

    #[error("attempted to read {overrun} bytes past the end of chunk {fourcc} (read started at {offset:#x})")]
    ChunkOverrun {
        offset: usize,
        fourcc: FourCc,
        overrun: usize,
    },

    #[error("new chunk at offset {offset:#x} would start past the end of the subfile ending at {subfile_end:#x}")]
    SubfileOverrun { offset: usize, subfile_end: usize },

    #[error("chunk identifier {fourcc} has no trailing hexadecimal index")]
    BadChunkIndex { fourcc: FourCc },

    #[error("data chunk {fourcc} has no matching asset header in this context or the title registry")]
    UnresolvedChunk { fourcc: FourCc },

    #[error("context begins with data chunk {fourcc}; hard-drive cache files must be read last, after every other context")]
    HeaderlessContext { fourcc: FourCc },

    #[error("unknown bitmap compression type {raw:#06x} at offset {offset:#x}")]
    UnknownCompression { offset: usize, raw: u32 },

    #[error("bitmap compression type {kind:?} is recognized but cannot be decoded")]
    UnsupportedCompression {
        kind: crate::assets::bitmap::CompressionKind,
    },

    #[error("bitmap run at row {row}, column {col} falls outside a {width}x{height} image")]
    BitmapRunOutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    #[error("{context} at offset {offset:#x}: expected {expected}, found {found}")]
    UnexpectedValue {
        offset: usize,
        context: &'static str,
        expected: String,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
