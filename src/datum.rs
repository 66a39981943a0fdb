//! The tagged-value primitive ("datum") that nearly every field in a Media
//! Station file is encapsulated in.
//!
//! A datum is a 16-bit type tag followed by a tag-determined payload:
//!
//! ```text
//!  Type tag
//!  |     Payload
//!  |     |
//!  xx xx xx xx .. xx xx
//! ```
//!
//! Several logical types carry two tag values; titles built by different
//! compiler eras used different tags for the same semantic value. There is
//! no skip-unknown mechanism in the format, so an unrecognized tag is
//! always fatal: it is the primary signal that a title uses an unhandled
//! format variant.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::riff::FourCc;

/// Known datum type tags.
pub mod tag {
    pub const UINT8: u16 = 0x0002;
    pub const UINT16_1: u16 = 0x0003;
    pub const UINT16_2: u16 = 0x0013;
    pub const INT16_1: u16 = 0x0006;
    pub const INT16_2: u16 = 0x0010;
    pub const UINT32_1: u16 = 0x0004;
    pub const UINT32_2: u16 = 0x0007;
    pub const FLOAT64_1: u16 = 0x0011;
    pub const FLOAT64_2: u16 = 0x0009;
    pub const STRING: u16 = 0x0012;
    pub const FILENAME: u16 = 0x000a;
    pub const POINT_1: u16 = 0x000f;
    pub const POINT_2: u16 = 0x000e;
    pub const BOUNDING_BOX: u16 = 0x000d;
    pub const POLYGON: u16 = 0x001d;
    pub const PALETTE: u16 = 0x05aa;
    pub const REFERENCE: u16 = 0x001b;
}

/// Number of bytes in a palette blob: 256 entries x 3-byte RGB.
pub const PALETTE_BYTES: usize = 0x300;

/// A two-dimensional point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    /// Read the two coordinate datums that make up a point.
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let x = read_i16(c)?;
        let y = read_i16(c)?;
        Ok(Self { x, y })
    }
}

/// A rectangle: top-left corner plus dimensions, both stored as points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub origin: Point,
    pub dimensions: Point,
}

impl BoundingBox {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let origin = read_point(c)?;
        let dimensions = read_point(c)?;
        Ok(Self { origin, dimensions })
    }

    pub fn width(&self) -> u32 {
        self.dimensions.x.max(0) as u32
    }

    pub fn height(&self) -> u32 {
        self.dimensions.y.max(0) as u32
    }
}

/// A point list, used for clickable regions that need more exact
/// specification than a single rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let total = read_u32(c)?;
        let mut points = Vec::with_capacity(total as usize);
        for _ in 0..total {
            // Each point is preceded by a 2-byte marker.
            c.skip(2)?;
            points.push(Point::read(c)?);
        }
        Ok(Self { points })
    }
}

/// A reference to a data chunk, usually but not always in the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRef(pub FourCc);

impl ChunkRef {
    fn read(c: &mut Cursor) -> Result<Self> {
        Ok(Self(FourCc(c.read_tag()?)))
    }

    /// The integral part of the referenced identifier (`a123` -> `0x123`).
    pub fn index(&self) -> Result<u32> {
        self.0.index()
    }
}

impl std::fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One decoded tagged value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    U8(u8),
    U16(u16),
    I16(i16),
    U32(u32),
    F64(f64),
    String(String),
    Point(Point),
    BoundingBox(BoundingBox),
    Polygon(Polygon),
    Palette(Box<[u8; PALETTE_BYTES]>),
    Reference(ChunkRef),
}

impl Datum {
    /// Decode one datum from the cursor position, advancing exactly past
    /// its payload.
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let offset = c.position();
        let t = c.read_u16()?;
        match t {
            tag::UINT8 => Ok(Datum::U8(c.read_u8()?)),
            tag::UINT16_1 | tag::UINT16_2 => Ok(Datum::U16(c.read_u16()?)),
            tag::INT16_1 | tag::INT16_2 => Ok(Datum::I16(c.read_i16()?)),
            tag::UINT32_1 | tag::UINT32_2 => Ok(Datum::U32(c.read_u32()?)),
            tag::FLOAT64_1 | tag::FLOAT64_2 => Ok(Datum::F64(c.read_f64()?)),
            tag::STRING | tag::FILENAME => {
                // The length is itself a nested datum.
                let length = read_u32(c)?;
                let bytes = c.read_bytes(length as usize)?;
                Ok(Datum::String(decode_single_byte_text(bytes)))
            }
            tag::POINT_1 | tag::POINT_2 => Ok(Datum::Point(Point::read(c)?)),
            tag::BOUNDING_BOX => Ok(Datum::BoundingBox(BoundingBox::read(c)?)),
            tag::POLYGON => Ok(Datum::Polygon(Polygon::read(c)?)),
            tag::PALETTE => {
                let bytes = c.read_bytes(PALETTE_BYTES)?;
                let mut palette = Box::new([0u8; PALETTE_BYTES]);
                palette.copy_from_slice(bytes);
                Ok(Datum::Palette(palette))
            }
            tag::REFERENCE => Ok(Datum::Reference(ChunkRef::read(c)?)),
            _ => Err(Error::UnknownDatumType { offset, tag: t }),
        }
    }

    /// Name of the held variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Datum::U8(_) => "u8",
            Datum::U16(_) => "u16",
            Datum::I16(_) => "i16",
            Datum::U32(_) => "u32",
            Datum::F64(_) => "f64",
            Datum::String(_) => "string",
            Datum::Point(_) => "point",
            Datum::BoundingBox(_) => "bounding box",
            Datum::Polygon(_) => "polygon",
            Datum::Palette(_) => "palette",
            Datum::Reference(_) => "chunk reference",
        }
    }

    /// The held value as an unsigned integer, widening across the scalar
    /// variants.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Datum::U8(v) => Some(v as u32),
            Datum::U16(v) => Some(v as u32),
            Datum::U32(v) => Some(v),
            Datum::I16(v) if v >= 0 => Some(v as u32),
            _ => None,
        }
    }
}

/// Strings are single-byte-per-character text, not multi-byte-safe; every
/// byte maps directly to the code point of the same value.
fn decode_single_byte_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn mismatch(offset: usize, expected: &'static str, found: Datum) -> Error {
    Error::DatumTypeMismatch {
        offset,
        expected,
        found: found.kind_name(),
    }
}

/// Read a datum expected to hold an unsigned integer (any scalar width).
pub fn read_u32(c: &mut Cursor) -> Result<u32> {
    let offset = c.position();
    let d = Datum::read(c)?;
    d.as_u32()
        .ok_or_else(|| mismatch(offset, "unsigned integer", d))
}

/// Read a datum expected to hold a 16-bit value usable as a section tag.
pub fn read_u16(c: &mut Cursor) -> Result<u16> {
    let offset = c.position();
    let v = read_u32(c)?;
    u16::try_from(v).map_err(|_| Error::DatumTypeMismatch {
        offset,
        expected: "16-bit value",
        found: "wider integer",
    })
}

/// Read a datum expected to hold a signed 16-bit integer.
pub fn read_i16(c: &mut Cursor) -> Result<i16> {
    let offset = c.position();
    match Datum::read(c)? {
        Datum::I16(v) => Ok(v),
        Datum::U8(v) => Ok(v as i16),
        Datum::U16(v) if v <= i16::MAX as u16 => Ok(v as i16),
        d => Err(mismatch(offset, "signed 16-bit integer", d)),
    }
}

/// Read a datum expected to hold a float (integers are accepted and
/// widened; some titles store rates as plain integers).
pub fn read_f64(c: &mut Cursor) -> Result<f64> {
    let offset = c.position();
    let d = Datum::read(c)?;
    match d {
        Datum::F64(v) => Ok(v),
        _ => match d.as_u32() {
            Some(v) => Ok(v as f64),
            None => Err(mismatch(offset, "float", d)),
        },
    }
}

pub fn read_string(c: &mut Cursor) -> Result<String> {
    let offset = c.position();
    match Datum::read(c)? {
        Datum::String(s) => Ok(s),
        d => Err(mismatch(offset, "string", d)),
    }
}

pub fn read_point(c: &mut Cursor) -> Result<Point> {
    let offset = c.position();
    match Datum::read(c)? {
        Datum::Point(p) => Ok(p),
        d => Err(mismatch(offset, "point", d)),
    }
}

pub fn read_bounding_box(c: &mut Cursor) -> Result<BoundingBox> {
    let offset = c.position();
    match Datum::read(c)? {
        Datum::BoundingBox(b) => Ok(b),
        d => Err(mismatch(offset, "bounding box", d)),
    }
}

pub fn read_polygon(c: &mut Cursor) -> Result<Polygon> {
    let offset = c.position();
    match Datum::read(c)? {
        Datum::Polygon(p) => Ok(p),
        d => Err(mismatch(offset, "polygon", d)),
    }
}

pub fn read_reference(c: &mut Cursor) -> Result<ChunkRef> {
    let offset = c.position();
    match Datum::read(c)? {
        Datum::Reference(r) => Ok(r),
        d => Err(mismatch(offset, "chunk reference", d)),
    }
}

/// Verify that the next datum holds the expected integer value.
pub fn expect_u32(c: &mut Cursor, expected: u32, context: &'static str) -> Result<u32> {
    let offset = c.position();
    let found = read_u32(c)?;
    if found != expected {
        return Err(Error::UnexpectedValue {
            offset,
            context,
            expected: format!("{expected:#x}"),
            found: format!("{found:#x}"),
        });
    }
    Ok(found)
}
