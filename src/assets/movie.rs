//! Movie assets: animated frame sequences with keyframe compositing,
//! interleaved audio chunks, and optional "still" frames in the first
//! subfile.
//!
//! A movie's data spans three chunk identifiers with consecutive
//! integers: header, video, audio. Frame footers are not guaranteed to
//! immediately follow their frame; they are matched up by index after a
//! whole chunk has been read. A frame can also appear twice across
//! subfiles: the first occurrence carries the complete keyframe image
//! (and no footer), the later occurrence is mostly transparent and does
//! carry a footer.

use crate::cursor::Cursor;
use crate::datum::{self, BoundingBox};
use crate::error::{Error, Result};
use crate::riff::{Chunk, SubFile};
use crate::version::SessionContext;

use super::bitmap::{Bitmap, BitmapHeader, DEFAULT_REGION_RUN};
use super::sound::{AudioEncoding, Sound};

mod section {
    pub const ROOT: u16 = 0x06a8;
    pub const FRAME: u16 = 0x06a9;
    pub const FOOTER: u16 = 0x06aa;
}

/// The bitmap header of a movie frame, extended with the frame index and
/// the keyframe-end timestamp.
#[derive(Debug, Clone)]
pub struct MovieFrameHeader {
    pub bitmap: BitmapHeader,
    /// Zero-based.
    pub index: u32,
    pub keyframe_end_ms: u32,
}

impl MovieFrameHeader {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let bitmap = BitmapHeader::read(c)?;
        let index = datum::read_u32(c)?;
        let keyframe_end_ms = datum::read_u32(c)?;
        Ok(Self {
            bitmap,
            index,
            keyframe_end_ms,
        })
    }
}

/// Timing and placement metadata for one frame, stored separately from
/// the frame image.
#[derive(Debug, Clone, Copy)]
pub struct MovieFrameFooter {
    pub index: u32,
    pub start_ms: u32,
    pub end_ms: u32,
    /// Screen position, relative to the whole screen rather than the
    /// movie's bounding box.
    pub left: i16,
    pub top: i16,
}

impl MovieFrameFooter {
    /// The footer layout changed at engine 4.0; older titles store fewer
    /// fields.
    pub fn read(c: &mut Cursor, session: &SessionContext) -> Result<Self> {
        let _unk1 = datum::read_u32(c)?;
        let _unk2 = datum::read_u32(c)?;
        if session.has_short_movie_footers() {
            let start_ms = datum::read_u32(c)?;
            let end_ms = datum::read_u32(c)?;
            let left = datum::read_i16(c)?;
            let top = datum::read_i16(c)?;
            let _unk3 = datum::read_u32(c)?;
            let _unk4 = datum::read_u32(c)?;
            let index = datum::read_u32(c)?;
            Ok(Self {
                index,
                start_ms,
                end_ms,
                left,
                top,
            })
        } else {
            let _unk4 = datum::read_u32(c)?;
            let start_ms = datum::read_u32(c)?;
            let end_ms = datum::read_u32(c)?;
            let left = datum::read_i16(c)?;
            let top = datum::read_i16(c)?;
            let _unk5 = datum::read_u32(c)?;
            let _unk6 = datum::read_u32(c)?;
            let _unk7 = datum::read_u32(c)?;
            let index = datum::read_u32(c)?;
            let _unk8 = datum::read_u32(c)?;
            let _unk9 = datum::read_u32(c)?;
            Ok(Self {
                index,
                start_ms,
                end_ms,
                left,
                top,
            })
        }
    }
}

/// One frame: a bitmap plus its header and, once matched, its footer.
#[derive(Debug, Clone)]
pub struct MovieFrame {
    pub header: MovieFrameHeader,
    pub bitmap: Bitmap,
    pub footer: Option<MovieFrameFooter>,
    left: i16,
    top: i16,
}

impl MovieFrame {
    pub fn read(c: &mut Cursor, chunk: &Chunk) -> Result<Self> {
        let header = MovieFrameHeader::read(c)?;
        let bitmap = Bitmap::read_body(c, header.bitmap.clone(), chunk.remaining(c))?;
        Ok(Self {
            header,
            bitmap,
            footer: None,
            left: 0,
            top: 0,
        })
    }

    fn set_footer(&mut self, footer: MovieFrameFooter) {
        self.left = footer.left;
        self.top = footer.top;
        self.footer = Some(footer);
    }
}

/// One frame of the final composited animation.
#[derive(Debug, Clone)]
pub struct ComposedFrame {
    pub index: u32,
    pub start_ms: Option<u32>,
    pub end_ms: Option<u32>,
    /// `width * height` palette indices, movie-sized.
    pub pixels: Vec<u8>,
}

/// A movie asset's collected frames and audio.
#[derive(Debug, Clone)]
pub struct Movie {
    pub bounding_box: BoundingBox,
    pub frames: Vec<MovieFrame>,
    pub sound: Sound,
}

impl Movie {
    pub fn new(bounding_box: BoundingBox, encoding: Option<AudioEncoding>) -> Self {
        Self {
            bounding_box,
            frames: Vec::new(),
            sound: Sound::new(encoding),
        }
    }

    pub fn width(&self) -> usize {
        self.bounding_box.width() as usize
    }

    pub fn height(&self) -> usize {
        self.bounding_box.height() as usize
    }

    /// Read a still frame or footer from the first subfile. Stills
    /// display while the movie is not playing.
    pub fn read_still(&mut self, c: &mut Cursor, chunk: &Chunk, session: &SessionContext) -> Result<()> {
        let offset = c.position();
        let section = datum::read_u16(c)?;
        match section {
            section::FRAME => {
                let frame = MovieFrame::read(c, chunk)?;
                self.frames.push(frame);
            }
            section::FOOTER => {
                let footer = MovieFrameFooter::read(c, session)?;
                for frame in &mut self.frames {
                    if frame.header.index == footer.index {
                        frame.set_footer(footer);
                    }
                }
            }
            other => return Err(Error::UnknownSectionType { offset, section: other }),
        }
        Ok(())
    }

    /// Read one animation subfile: framesets of video chunks, an
    /// optional audio chunk, and a 4-byte delimiter chunk.
    pub fn read_subfile(
        &mut self,
        c: &mut Cursor,
        subfile: &mut SubFile,
        first: Chunk,
        session: &SessionContext,
    ) -> Result<()> {
        let header_int = first.fourcc.index()?;
        let video_int = header_int + 1;
        let audio_int = header_int + 2;

        datum::expect_u32(c, section::ROOT as u32, "movie root signature")?;
        let chunk_count = datum::read_u32(c)?;
        let _start_pointer = datum::read_u32(c)?;
        for _ in 0..chunk_count {
            let _chunk_size = datum::read_u32(c)?;
        }

        for _ in 0..chunk_count {
            if subfile.at_end(c) {
                break;
            }
            let mut chunk = subfile.next_chunk(c)?;
            let mut frames: Vec<MovieFrame> = Vec::new();
            let mut footers: Vec<MovieFrameFooter> = Vec::new();

            // Video always comes first.
            while chunk.fourcc.index()? == video_int {
                let offset = c.position();
                let section = datum::read_u16(c)?;
                match section {
                    section::FRAME => frames.push(MovieFrame::read(c, &chunk)?),
                    section::FOOTER => footers.push(MovieFrameFooter::read(c, session)?),
                    other => {
                        return Err(Error::UnknownSectionType { offset, section: other })
                    }
                }
                chunk = subfile.next_chunk(c)?;
            }

            if chunk.fourcc.index()? == audio_int {
                self.sound.read_chunk(c, &chunk)?;
                chunk = subfile.next_chunk(c)?;
            }

            // Every frameset ends in a 4-byte delimiter chunk.
            let offset = c.position();
            if chunk.fourcc.index()? == header_int {
                if chunk.length != 4 {
                    return Err(Error::UnexpectedValue {
                        offset,
                        context: "frameset delimiter size",
                        expected: "4".into(),
                        found: chunk.length.to_string(),
                    });
                }
                chunk.read(c, 4)?;
            } else {
                return Err(Error::UnexpectedValue {
                    offset,
                    context: "frameset delimiter",
                    expected: format!("chunk {header_int:#x}"),
                    found: chunk.fourcc.to_string(),
                });
            }

            for footer in &footers {
                for frame in &mut frames {
                    if frame.header.index == footer.index && frame.footer.is_none() {
                        frame.set_footer(*footer);
                    }
                }
            }
            self.frames.append(&mut frames);
        }
        Ok(())
    }

    /// Decode and composite all frames against their keyframes.
    ///
    /// Frames are visited in increasing keyframe-end order. A frame
    /// becomes the reference keyframe when its keyframe-end timestamp
    /// exceeds the running maximum and its index differs from the active
    /// keyframe's; keyframes themselves are excluded from the output.
    pub fn composited_frames(&self) -> Result<Vec<ComposedFrame>> {
        let width = self.width();
        let height = self.height();
        let origin_x = self.bounding_box.origin.x;
        let origin_y = self.bounding_box.origin.y;

        let mut order: Vec<usize> = (0..self.frames.len()).collect();
        order.sort_by_key(|&i| self.frames[i].header.keyframe_end_ms);

        let mut composed = Vec::new();
        let mut running_end: i64 = -1;
        let mut keyframe_index: Option<u32> = None;
        let mut keyframe_canvas: Option<Vec<u8>> = None;

        for i in order {
            let frame = &self.frames[i];
            let (left, top) = self.frame_position(frame);
            let decoded = frame.bitmap.decode()?;
            let fx = (left - origin_x) as isize;
            let fy = (top - origin_y) as isize;

            if i64::from(frame.header.keyframe_end_ms) > running_end {
                running_end = i64::from(frame.header.keyframe_end_ms);
                if keyframe_index != Some(frame.header.index) {
                    let mut canvas = vec![0u8; width * height];
                    blit(
                        &mut canvas, width, height,
                        &decoded.pixels, frame.bitmap.width(), frame.bitmap.height(),
                        fx, fy,
                    );
                    keyframe_index = Some(frame.header.index);
                    keyframe_canvas = Some(canvas);
                    continue;
                }
            }

            let mut canvas = vec![0u8; width * height];
            blit(
                &mut canvas, width, height,
                &decoded.pixels, frame.bitmap.width(), frame.bitmap.height(),
                fx, fy,
            );
            if let Some(reference) = &keyframe_canvas {
                if decoded.regions.is_empty() {
                    // Without transparency regions, every index-0 pixel
                    // shows the keyframe through.
                    for (pixel, &kf) in canvas.iter_mut().zip(reference.iter()) {
                        if *pixel == 0 {
                            *pixel = kf;
                        }
                    }
                } else {
                    // Recorded regions always show the keyframe, whatever
                    // the child drew there.
                    for region in &decoded.regions {
                        let run = region.run.unwrap_or(DEFAULT_REGION_RUN);
                        for dx in 0..run {
                            let x = fx + (region.x + dx) as isize;
                            let y = fy + region.y as isize;
                            if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
                                continue;
                            }
                            let at = y as usize * width + x as usize;
                            canvas[at] = reference[at];
                        }
                    }
                }
            }

            composed.push(ComposedFrame {
                index: frame.header.index,
                start_ms: frame.footer.map(|f| f.start_ms),
                end_ms: frame.footer.map(|f| f.end_ms),
                pixels: canvas,
            });
        }
        Ok(composed)
    }

    /// A footerless frame borrows the position of another occurrence of
    /// the same index.
    fn frame_position(&self, frame: &MovieFrame) -> (i16, i16) {
        if frame.footer.is_some() {
            return (frame.left, frame.top);
        }
        for other in &self.frames {
            if other.header.index == frame.header.index && other.footer.is_some() {
                return (other.left, other.top);
            }
        }
        (frame.left, frame.top)
    }
}

/// Copy a source pixel rectangle into a canvas at the given position,
/// clipping anything that falls outside.
fn blit(
    canvas: &mut [u8],
    canvas_width: usize,
    canvas_height: usize,
    source: &[u8],
    source_width: usize,
    source_height: usize,
    left: isize,
    top: isize,
) {
    for sy in 0..source_height {
        let y = top + sy as isize;
        if y < 0 || y >= canvas_height as isize {
            continue;
        }
        for sx in 0..source_width {
            let x = left + sx as isize;
            if x < 0 || x >= canvas_width as isize {
                continue;
            }
            canvas[y as usize * canvas_width + x as usize] = source[sy * source_width + sx];
        }
    }
}
