use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Identifier of chunks that carry header sections rather than asset data.
const HEADER_FOURCC: [u8; 4] = *b"igod";

/// A 4-character chunk identifier.
///
/// Header chunks are always `igod`. Data chunks look like `a501`: a letter
/// followed by hexadecimal digits, unique across the whole title.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// Identifier as a string (for display).
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// Whether this identifies a header (`igod`) chunk.
    pub fn is_header(&self) -> bool {
        self.0 == HEADER_FOURCC
    }

    /// The integral part of a data identifier: the trailing characters
    /// parsed as hexadecimal. `a123` yields `0x123`.
    ///
    /// Related chunks correlate through these integers; a movie's header,
    /// video, and audio chunks are always three consecutive values.
    pub fn index(&self) -> Result<u32> {
        let digits =
            std::str::from_utf8(&self.0[1..]).map_err(|_| Error::BadChunkIndex { fourcc: *self })?;
        u32::from_str_radix(digits, 16).map_err(|_| Error::BadChunkIndex { fourcc: *self })
    }
}

impl std::fmt::Display for FourCc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for FourCc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FourCc({})", self.as_str())
    }
}

/// One identified, length-delimited record inside a data file.
///
/// The cursor is shared with the chunk, not owned by it: `read` protects
/// against running past the declared end, and `skip` discards whatever the
/// caller did not consume.
#[derive(Debug, Clone, Copy)]
pub struct Chunk {
    /// 4-character identifier.
    pub fourcc: FourCc,
    /// Declared length of the chunk payload in bytes.
    pub length: usize,
    /// Absolute offset where the payload begins.
    pub data_start: usize,
}

impl Chunk {
    /// Read the identifier and length of the chunk at the cursor position,
    /// skipping one pad byte first if the position is odd. The cursor is
    /// left at the start of the payload.
    ///
    /// A zero-length chunk is never valid and signals corrupted input.
    pub fn read_next(c: &mut Cursor) -> Result<Self> {
        c.align_even()?;
        let offset = c.position();
        let fourcc = FourCc(c.read_tag()?);
        let length = c.read_u32()? as usize;
        if length == 0 {
            return Err(Error::ZeroLengthChunk { offset, fourcc });
        }
        Ok(Self {
            fourcc,
            length,
            data_start: c.position(),
        })
    }

    /// Absolute offset where the payload ends.
    pub fn end(&self) -> usize {
        self.data_start + self.length
    }

    /// Payload bytes left between the cursor and the chunk end.
    pub fn remaining(&self, c: &Cursor) -> usize {
        self.end().saturating_sub(c.position())
    }

    /// Whether the cursor has consumed the whole payload.
    pub fn at_end(&self, c: &Cursor) -> bool {
        c.position() >= self.end()
    }

    /// Whether this is a header (`igod`) chunk.
    pub fn is_header(&self) -> bool {
        self.fourcc.is_header()
    }

    /// Bounds-checked read: fails, never truncates, when the requested
    /// bytes would run past the chunk end.
    pub fn read<'a>(&self, c: &mut Cursor<'a>, n: usize) -> Result<&'a [u8]> {
        let offset = c.position();
        let new_end = offset + n;
        if new_end > self.end() {
            return Err(Error::ChunkOverrun {
                offset,
                fourcc: self.fourcc,
                overrun: new_end - self.end(),
            });
        }
        c.read_bytes(n)
    }

    /// Discard any unread payload, leaving the cursor at the chunk end.
    pub fn skip(&self, c: &mut Cursor) -> Result<()> {
        c.skip(self.remaining(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Writer;

    fn chunk_bytes() -> Vec<u8> {
        let mut w = Writer::new();
        w.write_tag(b"a100");
        w.write_u32(3);
        w.write_bytes(&[1, 2, 3]);
        w.into_bytes()
    }

    #[test]
    fn reads_identifier_and_length() {
        let data = chunk_bytes();
        let mut c = Cursor::new(&data);
        let chunk = Chunk::read_next(&mut c).unwrap();
        assert_eq!(chunk.fourcc.as_str(), "a100");
        assert_eq!(chunk.length, 3);
        assert_eq!(chunk.data_start, 8);
        assert_eq!(chunk.end(), 11);
    }

    #[test]
    fn misaligned_chunk_skips_one_pad_byte() {
        let mut data = vec![0u8, 0u8];
        data.extend_from_slice(&chunk_bytes());
        let mut c = Cursor::new(&data);
        c.skip(1).unwrap();
        let chunk = Chunk::read_next(&mut c).unwrap();
        // Position was odd after the leading byte; one pad byte discarded.
        assert_eq!(chunk.fourcc.as_str(), "a100");

        // An even position reads the identifier directly.
        let data = chunk_bytes();
        let mut c = Cursor::new(&data);
        let chunk = Chunk::read_next(&mut c).unwrap();
        assert_eq!(chunk.data_start % 2, 0);
    }

    #[test]
    fn zero_length_chunk_is_fatal() {
        let mut w = Writer::new();
        w.write_tag(b"a100");
        w.write_u32(0);
        let data = w.into_bytes();
        let mut c = Cursor::new(&data);
        match Chunk::read_next(&mut c).unwrap_err() {
            Error::ZeroLengthChunk { offset, fourcc } => {
                assert_eq!(offset, 0);
                assert_eq!(fourcc.as_str(), "a100");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_past_chunk_end_fails() {
        let data = chunk_bytes();
        let mut c = Cursor::new(&data);
        let chunk = Chunk::read_next(&mut c).unwrap();
        chunk.read(&mut c, 2).unwrap();
        match chunk.read(&mut c, 2).unwrap_err() {
            Error::ChunkOverrun {
                fourcc, overrun, ..
            } => {
                assert_eq!(fourcc.as_str(), "a100");
                assert_eq!(overrun, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fourcc_index_parses_trailing_hex() {
        assert_eq!(FourCc(*b"a123").index().unwrap(), 0x123);
        assert_eq!(FourCc(*b"a000").index().unwrap(), 0);
        assert!(FourCc(*b"igod").index().is_err());
    }
}
