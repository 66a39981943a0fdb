//! Still bitmaps and the scanline RLE codec shared by every image-bearing
//! asset kind.
//!
//! The compression scheme is almost the standard Microsoft RLE8 but with
//! custom escapes for keyframe transparency regions and in-payload
//! position adjustment. Decoded output is always exactly `width * height`
//! palette-index bytes.

use crate::cursor::Cursor;
use crate::datum::{self, Point};
use crate::error::{Error, Result};
use crate::riff::Chunk;

/// How the pixel data of a bitmap is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    Uncompressed,
    Rle,
    /// Recognized but undocumented; decoding is not supported.
    Unknown6,
    /// A second uncompressed layout, identical on the wire to the first.
    Uncompressed2,
}

impl CompressionKind {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Uncompressed),
            1 => Some(Self::Rle),
            6 => Some(Self::Unknown6),
            7 => Some(Self::Uncompressed2),
            _ => None,
        }
    }

    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::Uncompressed | Self::Uncompressed2)
    }
}

/// The fields common to every bitmap header variant.
#[derive(Debug, Clone)]
pub struct BitmapHeader {
    pub header_size: u32,
    pub dimensions: Point,
    pub compression: CompressionKind,
    /// Usually a few pixels off from the width, but in rare cases it is
    /// the true row stride.
    pub stride: u32,
}

impl BitmapHeader {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let header_size = datum::read_u32(c)?;
        let dimensions = datum::read_point(c)?;
        let offset = c.position();
        let raw = datum::read_u32(c)?;
        let compression = CompressionKind::from_raw(raw)
            .ok_or(Error::UnknownCompression { offset, raw })?;
        let stride = datum::read_u32(c)?;
        Ok(Self {
            header_size,
            dimensions,
            compression,
            stride,
        })
    }
}

/// A keyframe transparency region recorded during decode: a starting
/// column and row, and the length of the run that closed the region (if
/// one did).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransparencyRegion {
    pub x: usize,
    pub y: usize,
    pub run: Option<usize>,
}

/// When a region was opened but never closed by a run on its line, the
/// engine behaves as if it covered this many pixels.
pub const DEFAULT_REGION_RUN: usize = 10;

/// A fully decoded bitmap: the pixel buffer plus any transparency
/// regions found in the compressed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBitmap {
    pub pixels: Vec<u8>,
    pub regions: Vec<TransparencyRegion>,
}

#[derive(Debug, Clone)]
enum BitmapData {
    Compressed(Vec<u8>),
    Pixels(Vec<u8>),
}

/// A single, still bitmap. Compressed pixel data is stored raw and
/// decoded on request.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub header: BitmapHeader,
    data: BitmapData,
}

impl Bitmap {
    /// Read a bitmap whose header precedes its pixel data, consuming the
    /// remainder of the given chunk.
    pub fn read(c: &mut Cursor, chunk: &Chunk) -> Result<Self> {
        let header = BitmapHeader::read(c)?;
        Self::read_body(c, header, chunk.remaining(c))
    }

    /// Read the pixel data for an already-read header.
    pub fn read_body(c: &mut Cursor, mut header: BitmapHeader, data_len: usize) -> Result<Self> {
        let width = header.dimensions.x.max(0) as usize;
        let height = header.dimensions.y.max(0) as usize;
        let data = if header.compression.is_compressed() {
            BitmapData::Compressed(c.read_bytes(data_len)?.to_vec())
        } else {
            // Uncompressed pixels always begin with a two-byte marker.
            let offset = c.position();
            let marker = c.read_bytes(2)?;
            if marker != [0, 0] {
                return Err(Error::UnexpectedValue {
                    offset,
                    context: "uncompressed bitmap marker",
                    expected: "00 00".into(),
                    found: format!("{:02x} {:02x}", marker[0], marker[1]),
                });
            }
            let pixels = c.read_bytes(data_len.saturating_sub(2))?.to_vec();
            if pixels.len() != width * height {
                // Sometimes the true width is the stride field instead.
                if pixels.len() == header.stride as usize * height {
                    log::warn!(
                        "uncompressed bitmap width {} corrected to stride {}",
                        width,
                        header.stride
                    );
                    header.dimensions.x = header.stride as i16;
                } else {
                    log::warn!(
                        "uncompressed bitmap has {} pixel bytes for {}x{}",
                        pixels.len(),
                        width,
                        height
                    );
                }
            }
            BitmapData::Pixels(pixels)
        };
        Ok(Self { header, data })
    }

    /// Read a bitmap whose dimensions were declared elsewhere (sprite
    /// frames and font glyphs). The data is always RLE-compressed.
    pub fn read_with_dimensions(c: &mut Cursor, dimensions: Point, data_len: usize) -> Result<Self> {
        let header = BitmapHeader {
            header_size: 0,
            dimensions,
            compression: CompressionKind::Rle,
            stride: dimensions.x.max(0) as u32,
        };
        let data = BitmapData::Compressed(c.read_bytes(data_len)?.to_vec());
        Ok(Self { header, data })
    }

    pub fn width(&self) -> usize {
        self.header.dimensions.x.max(0) as usize
    }

    pub fn height(&self) -> usize {
        self.header.dimensions.y.max(0) as usize
    }

    /// Decode this bitmap to its pixel buffer.
    pub fn decode(&self) -> Result<DecodedBitmap> {
        match &self.data {
            BitmapData::Pixels(pixels) => {
                let mut pixels = pixels.clone();
                pixels.resize(self.width() * self.height(), 0);
                Ok(DecodedBitmap {
                    pixels,
                    regions: Vec::new(),
                })
            }
            BitmapData::Compressed(raw) => match self.header.compression {
                CompressionKind::Rle => decompress_rle(raw, self.width(), self.height()),
                kind => Err(Error::UnsupportedCompression { kind }),
            },
        }
    }
}

/// Decompress one RLE stream into a `width * height` pixel buffer.
///
/// The stream is line-oriented: a horizontal write offset resets at the
/// start of every output row. `0x00` enters control mode, where the next
/// byte selects end-of-line (`0x00`), end-of-image (`0x01`), opening a
/// transparency region (`0x02`), a signed position adjustment (`0x03`),
/// or a literal run (>= `0x04`, padded to even within the payload). Any
/// other leading byte is an RLE run count followed by the color index.
pub fn decompress_rle(data: &[u8], width: usize, height: usize) -> Result<DecodedBitmap> {
    let mut pixels = vec![0u8; width * height];
    let mut regions: Vec<TransparencyRegion> = Vec::new();

    // Payloads of two bytes or fewer hold no image data at all.
    if data.len() <= 2 {
        return Ok(DecodedBitmap { pixels, regions });
    }
    let mut c = Cursor::new(data);
    if data[0] == 0 && data[1] == 0 {
        c.skip(2)?;
    }

    let mut row: usize = 0;
    'image: while row < height {
        let mut col: usize = 0;
        let mut open_region = false;
        loop {
            let operation = c.read_u8()?;
            if operation == 0x00 {
                let control = c.read_u8()?;
                match control {
                    0x00 => break,
                    0x01 => break 'image,
                    0x02 => {
                        regions.push(TransparencyRegion {
                            x: col,
                            y: row,
                            run: None,
                        });
                        open_region = true;
                    }
                    0x03 => {
                        let dx = c.read_u8()? as i8 as isize;
                        let dy = c.read_u8()? as i8 as isize;
                        col = apply_delta(col, dx, row, width, height)?;
                        row = apply_delta(row, dy, row, width, height)?;
                    }
                    run_length => {
                        let n = run_length as usize;
                        check_run(row, col, n, width, height)?;
                        let run = c.read_bytes(n)?;
                        pixels[row * width + col..row * width + col + n].copy_from_slice(run);
                        col += n;
                        if c.position() % 2 == 1 {
                            c.skip(1)?;
                        }
                    }
                }
            } else {
                let n = operation as usize;
                check_run(row, col, n, width, height)?;
                let color = c.read_u8()?;
                pixels[row * width + col..row * width + col + n].fill(color);
                col += n;
                if open_region {
                    if let Some(region) = regions.last_mut() {
                        region.run = Some(n);
                    }
                    open_region = false;
                }
            }
        }
        row += 1;
    }

    Ok(DecodedBitmap { pixels, regions })
}

fn apply_delta(value: usize, delta: isize, row: usize, width: usize, height: usize) -> Result<usize> {
    value
        .checked_add_signed(delta)
        .ok_or(Error::BitmapRunOutOfBounds {
            row,
            col: value,
            width,
            height,
        })
}

fn check_run(row: usize, col: usize, n: usize, width: usize, height: usize) -> Result<()> {
    if row >= height || row * width + col + n > width * height {
        return Err(Error::BitmapRunOutOfBounds {
            row,
            col,
            width,
            height,
        });
    }
    Ok(())
}

/// Compress pixels back into the RLE stream format. Only emits plain RLE
/// runs, which is enough to reconstruct any pixel buffer.
#[cfg(test)]
pub(crate) fn compress_rle(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    assert_eq!(pixels.len(), width * height);
    let mut out = vec![0u8, 0u8];
    for row in pixels.chunks(width.max(1)) {
        let mut i = 0;
        while i < row.len() {
            let color = row[i];
            let mut n = 1;
            while i + n < row.len() && row[i + n] == color && n < 0xff {
                n += 1;
            }
            out.push(n as u8);
            out.push(color);
            i += n;
        }
        out.push(0x00);
        out.push(0x00);
    }
    if height > 0 {
        // Replace the last end-of-line with an end-of-image.
        let last = out.len() - 1;
        out[last] = 0x01;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparency_region_closed_by_run() {
        // Open a region, run 3 pixels of index 7, end line, end image.
        let data = [0x00, 0x02, 0x03, 0x07, 0x00, 0x00, 0x00, 0x01];
        let decoded = decompress_rle(&data, 3, 1).unwrap();
        assert_eq!(decoded.pixels, vec![7, 7, 7]);
        assert_eq!(
            decoded.regions,
            vec![TransparencyRegion {
                x: 0,
                y: 0,
                run: Some(3)
            }]
        );
    }

    #[test]
    fn literal_run_pads_to_even() {
        // A five-byte literal leaves the payload at an odd offset, so a
        // pad byte sits before the end-of-line marker.
        let data = [
            0x00, 0x00, // leading marker
            0x00, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05, 0xee, // literal + pad
            0x00, 0x01, // end of image
        ];
        let decoded = decompress_rle(&data, 5, 1).unwrap();
        assert_eq!(decoded.pixels, vec![1, 2, 3, 4, 5]);
        assert!(decoded.regions.is_empty());
    }

    #[test]
    fn tiny_payload_decodes_to_blank() {
        let decoded = decompress_rle(&[0x00, 0x00], 4, 2).unwrap();
        assert_eq!(decoded.pixels, vec![0; 8]);
    }

    #[test]
    fn position_adjustment_moves_within_the_image() {
        // Skip 2 columns via the signed-delta escape, then write a run.
        let data = [0x02, 0x09, 0x00, 0x03, 0x02, 0x00, 0x02, 0x05, 0x00, 0x01];
        let decoded = decompress_rle(&data, 6, 1).unwrap();
        assert_eq!(decoded.pixels, vec![9, 9, 0, 0, 5, 5]);
    }

    #[test]
    fn run_past_image_end_is_an_error() {
        let data = [0x08, 0x01, 0x00, 0x01];
        assert!(matches!(
            decompress_rle(&data, 4, 1),
            Err(Error::BitmapRunOutOfBounds { .. })
        ));
    }

    #[test]
    fn round_trips_through_test_encoder() {
        let pixels: Vec<u8> = (0..48u32).map(|i| (i % 7) as u8 * 40).collect();
        let compressed = compress_rle(&pixels, 8, 6);
        let decoded = decompress_rle(&compressed, 8, 6).unwrap();
        assert_eq!(decoded.pixels, pixels);
    }

    #[test]
    fn output_length_is_always_width_times_height() {
        // Early end-of-image still produces a full buffer.
        let data = [0x02, 0x01, 0x00, 0x01];
        let decoded = decompress_rle(&data, 4, 4).unwrap();
        assert_eq!(decoded.pixels.len(), 16);
        assert_eq!(&decoded.pixels[..2], &[1, 1]);
    }
}
