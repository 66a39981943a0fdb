use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::riff::Chunk;

/// One RIFF-style subfile grouping a related run of chunks.
///
/// Every subfile opens with the same skeleton:
/// - `RIFF` + length bounding the whole subfile,
/// - `IMTSrate` (an 8-character identifier) bounding one 32-bit value,
/// - `LIST` + length bounding all the data chunks,
/// - `dataXXXX`, where `XXXX` is the identifier of the first data chunk.
///
/// After `open` the cursor sits exactly at the first data chunk's
/// identifier; callers pull chunks with `next_chunk` until `at_end`.
#[derive(Debug, Clone, Copy)]
pub struct SubFile {
    /// Absolute offset where the RIFF payload starts.
    pub data_start: usize,
    /// Absolute offset where the subfile ends.
    pub end: usize,
    /// The value bounded by the `rate` record. Usually zero; its meaning
    /// is unknown.
    pub rate: u32,
}

impl SubFile {
    /// Consume the subfile skeleton from the cursor position.
    pub fn open(c: &mut Cursor) -> Result<Self> {
        let root = Chunk::read_next(c)?;
        if root.fourcc.0 != *b"RIFF" {
            return Err(Error::InvalidSignature {
                offset: root.data_start - 8,
                expected: *b"RIFF",
                found: root.fourcc.0,
            });
        }

        // First half of the 8-character "IMTSrate" identifier.
        let offset = c.position();
        let imts = c.read_tag()?;
        if imts != *b"IMTS" {
            return Err(Error::InvalidSignature {
                offset,
                expected: *b"IMTS",
                found: imts,
            });
        }

        // Second half is a normal record bounding one 32-bit value.
        let _rate_chunk = Chunk::read_next(c)?;
        let rate = c.read_u32()?;

        // The LIST record itself carries no data of interest; its chunks do.
        let _list = Chunk::read_next(c)?;

        // First half of the 8-character "dataXXXX" identifier. The second
        // half doubles as the first data chunk's identifier, so it is left
        // unconsumed for `next_chunk`.
        let offset = c.position();
        let data = c.read_tag()?;
        if data != *b"data" {
            return Err(Error::InvalidSignature {
                offset,
                expected: *b"data",
                found: data,
            });
        }

        Ok(Self {
            data_start: root.data_start,
            end: root.end(),
            rate,
        })
    }

    /// Read the metadata of the next chunk, refusing to start a chunk that
    /// cannot fit its own 8-byte header before the subfile end.
    pub fn next_chunk(&self, c: &mut Cursor) -> Result<Chunk> {
        c.align_even()?;
        if c.position() + 8 > self.end {
            return Err(Error::SubfileOverrun {
                offset: c.position(),
                subfile_end: self.end,
            });
        }
        Chunk::read_next(c)
    }

    /// Whether the cursor has reached the end of the subfile.
    ///
    /// No meaningful record fits in a single byte, so when the position is
    /// odd the final byte may only be padding and the effective end moves
    /// one byte closer.
    pub fn at_end(&self, c: &Cursor) -> bool {
        if c.position() % 2 == 1 {
            c.position() >= self.end - 1
        } else {
            c.position() >= self.end
        }
    }

    /// Discard everything left in the subfile, leaving the cursor at the
    /// start of the next record.
    pub fn skip(&self, c: &mut Cursor) -> Result<()> {
        let remaining = self.end.saturating_sub(c.position());
        c.skip(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Writer;

    /// Assemble a subfile skeleton holding the given pre-built chunks.
    fn build_subfile(chunks: &[&[u8]]) -> Vec<u8> {
        let mut list = Vec::new();
        for chunk in chunks {
            if list.len() % 2 == 1 {
                list.push(0);
            }
            list.extend_from_slice(chunk);
        }

        let mut w = Writer::new();
        w.write_tag(b"RIFF");
        // IMTSrate record (16) + LIST header (8) + "data" (4) + chunks.
        w.write_u32((16 + 8 + 4 + list.len()) as u32);
        w.write_tag(b"IMTS");
        w.write_tag(b"rate");
        w.write_u32(4);
        w.write_u32(0);
        w.write_tag(b"LIST");
        w.write_u32((4 + list.len()) as u32);
        w.write_tag(b"data");
        w.write_bytes(&list);
        w.into_bytes()
    }

    fn raw_chunk(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_tag(fourcc);
        w.write_u32(payload.len() as u32);
        w.write_bytes(payload);
        w.into_bytes()
    }

    #[test]
    fn open_leaves_cursor_at_first_chunk() {
        let chunk = raw_chunk(b"a100", &[9, 9]);
        let data = build_subfile(&[&chunk]);
        let mut c = Cursor::new(&data);
        let subfile = SubFile::open(&mut c).unwrap();
        assert_eq!(subfile.rate, 0);

        let first = subfile.next_chunk(&mut c).unwrap();
        assert_eq!(first.fourcc.as_str(), "a100");
        assert_eq!(first.length, 2);
    }

    #[test]
    fn chunk_boundaries_stay_even() {
        // An odd-length chunk forces a pad byte before its successor.
        let odd = raw_chunk(b"a100", &[1, 2, 3]);
        let next = raw_chunk(b"a101", &[4]);
        let data = build_subfile(&[&odd, &next]);
        let mut c = Cursor::new(&data);
        let subfile = SubFile::open(&mut c).unwrap();

        let first = subfile.next_chunk(&mut c).unwrap();
        first.skip(&mut c).unwrap();
        assert_eq!(c.position() % 2, 1);

        let second = subfile.next_chunk(&mut c).unwrap();
        assert_eq!(second.fourcc.as_str(), "a101");
        assert_eq!(second.data_start % 2, 0);
        second.skip(&mut c).unwrap();
        assert!(subfile.at_end(&c));
    }

    #[test]
    fn at_end_tolerates_trailing_pad_byte() {
        let odd = raw_chunk(b"a100", &[1, 2, 3]);
        // Subfile declares one extra pad byte after the odd-length chunk.
        let mut padded = odd.clone();
        padded.push(0);
        let data = build_subfile(&[&padded[..]]);
        let mut c = Cursor::new(&data);
        let subfile = SubFile::open(&mut c).unwrap();
        let chunk = subfile.next_chunk(&mut c).unwrap();
        // Consume only the declared chunk payload; the pad byte stays.
        c.skip(chunk.length).unwrap();
        assert!(subfile.at_end(&c));
    }

    #[test]
    fn chunk_past_subfile_end_is_rejected() {
        let chunk = raw_chunk(b"a100", &[1, 2]);
        let mut data = build_subfile(&[&chunk]);
        // An orphan chunk header beyond the declared subfile length.
        data.extend_from_slice(&raw_chunk(b"a101", &[3, 4]));
        let mut c = Cursor::new(&data);
        let subfile = SubFile::open(&mut c).unwrap();
        let first = subfile.next_chunk(&mut c).unwrap();
        first.skip(&mut c).unwrap();
        assert!(subfile.at_end(&c));
        assert!(matches!(
            subfile.next_chunk(&mut c),
            Err(Error::SubfileOverrun { .. })
        ));
    }
}
