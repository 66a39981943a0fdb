//! Font assets. Structurally very close to sprites, but the frames are
//! glyphs keyed by character code rather than animation steps.

use crate::cursor::Cursor;
use crate::datum;
use crate::error::Result;
use crate::riff::Chunk;

use super::bitmap::Bitmap;

/// One glyph bitmap in a font.
#[derive(Debug, Clone)]
pub struct FontGlyph {
    pub ascii_code: u32,
    pub bitmap: Bitmap,
}

impl FontGlyph {
    pub fn read(c: &mut Cursor, chunk: &Chunk) -> Result<Self> {
        let ascii_code = datum::read_u32(c)?;
        let _ = datum::read_u32(c)?;
        let _ = datum::read_u32(c)?;
        datum::expect_u32(c, 0x0024, "font glyph signature")?;
        let dimensions = datum::read_point(c)?;
        datum::expect_u32(c, 0x0001, "font glyph marker")?;
        let _ = datum::read_u32(c)?;
        let bitmap = Bitmap::read_with_dimensions(c, dimensions, chunk.remaining(c))?;
        Ok(Self { ascii_code, bitmap })
    }
}

/// A font's glyph collection.
#[derive(Debug, Clone, Default)]
pub struct Font {
    pub glyphs: Vec<FontGlyph>,
}

impl Font {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_chunk(&mut self, c: &mut Cursor, chunk: &Chunk) -> Result<()> {
        let glyph = FontGlyph::read(c, chunk)?;
        self.glyphs.push(glyph);
        Ok(())
    }
}
