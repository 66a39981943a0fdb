//! Image-set assets: a collection of still bitmaps sharing one header,
//! observed only in a handful of titles (changeable backgrounds).

use std::collections::BTreeMap;

use crate::cursor::Cursor;
use crate::datum;
use crate::error::{Error, Result};
use crate::riff::{Chunk, SubFile};

use super::bitmap::{Bitmap, BitmapHeader};

/// One bitmap declared in the asset header; the data follows later in
/// its own chunk.
#[derive(Debug, Clone, Copy)]
pub struct BitmapDeclaration {
    pub index: u32,
    /// The ID as reported in the title's profile listing.
    pub id: u32,
    /// Includes the space required for the bitmap header.
    pub chunk_length: u32,
}

impl BitmapDeclaration {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let index = datum::read_u32(c)?;
        let id = datum::read_u32(c)?;
        let chunk_length = datum::read_u32(c)?;
        Ok(Self {
            index,
            id,
            chunk_length,
        })
    }
}

/// The bitmaps of an image set, keyed by their declared index.
#[derive(Debug, Clone, Default)]
pub struct BitmapSet {
    pub bitmaps: BTreeMap<u32, Bitmap>,
}

impl BitmapSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one bitmap chunk. The same index can legitimately occur in
    /// more than one subfile; the data is expected to match.
    pub fn read_chunk(&mut self, c: &mut Cursor, chunk: &Chunk) -> Result<()> {
        let index = datum::read_u32(c)?;
        let header = BitmapHeader::read(c)?;
        let bitmap = Bitmap::read_body(c, header, chunk.remaining(c))?;
        if self.bitmaps.contains_key(&index) {
            log::warn!("image set bitmap {index} redeclared, keeping the later copy");
        }
        self.bitmaps.insert(index, bitmap);
        Ok(())
    }

    pub fn read_subfile(&mut self, c: &mut Cursor, subfile: &mut SubFile, first: Chunk) -> Result<()> {
        let label = first.fourcc;
        self.read_chunk(c, &first)?;
        while !subfile.at_end(c) {
            let offset = c.position();
            let chunk = subfile.next_chunk(c)?;
            if chunk.fourcc != label {
                return Err(Error::UnexpectedValue {
                    offset,
                    context: "image set chunk label",
                    expected: label.to_string(),
                    found: chunk.fourcc.to_string(),
                });
            }
            self.read_chunk(c, &chunk)?;
        }
        Ok(())
    }
}
