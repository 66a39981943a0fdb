//! Sprite assets: a short animation with one compressed frame per data
//! chunk and no audio.

use crate::cursor::Cursor;
use crate::datum::{self, BoundingBox};
use crate::error::Result;
use crate::riff::Chunk;

use super::bitmap::Bitmap;

/// One frame of a sprite.
#[derive(Debug, Clone)]
pub struct SpriteFrame {
    /// Zero-based position in the animation.
    pub index: u32,
    pub bounding_box: BoundingBox,
    pub bitmap: Bitmap,
}

impl SpriteFrame {
    pub fn read(c: &mut Cursor, chunk: &Chunk) -> Result<Self> {
        datum::expect_u32(c, 0x0024, "sprite frame signature")?;
        let dimensions = datum::read_point(c)?;
        datum::expect_u32(c, 0x0001, "sprite frame marker")?;
        let _ = datum::read_u32(c)?;
        let index = datum::read_u32(c)?;
        let bounding_box = datum::read_bounding_box(c)?;
        let bitmap = Bitmap::read_with_dimensions(c, dimensions, chunk.remaining(c))?;
        Ok(Self {
            index,
            bounding_box,
            bitmap,
        })
    }
}

/// A sprite's frames, collected one data chunk at a time.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub bounding_box: BoundingBox,
    pub frames: Vec<SpriteFrame>,
}

impl Sprite {
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            frames: Vec::new(),
        }
    }

    pub fn read_chunk(&mut self, c: &mut Cursor, chunk: &Chunk) -> Result<()> {
        let frame = SpriteFrame::read(c, chunk)?;
        self.frames.push(frame);
        Ok(())
    }
}
