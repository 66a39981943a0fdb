//! Asset headers and their kind-specific payloads.
//!
//! An asset header is a stream of tagged sections terminated by a zero
//! sentinel. Section order is not fixed by the format and most sections
//! are optional, so the reader loops and dispatches on each tag. An
//! unrecognized tag is always fatal; silently skipping it would hide
//! format drift between title versions.

pub mod bitmap;
pub mod bitmap_set;
pub mod font;
pub mod movie;
pub mod script;
pub mod sound;
pub mod sprite;
pub mod text;

use crate::cursor::Cursor;
use crate::datum::{self, BoundingBox, ChunkRef, Datum, Polygon, PALETTE_BYTES};
use crate::error::{Error, Result};
use crate::riff::Chunk;
use crate::version::SessionContext;

use bitmap::Bitmap;
use bitmap_set::{BitmapDeclaration, BitmapSet};
use font::Font;
use movie::Movie;
use script::EventHandler;
use sound::{AudioEncoding, Sound};
use sprite::Sprite;
use text::{Justification, TextSettings, VerticalPosition};

/// All of the known asset kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Screen,
    Stage,
    Path,
    Sound,
    Timer,
    Image,
    Hotspot,
    Cursor,
    Sprite,
    /// A sound variant used only by one title's minigame.
    ZazuSound,
    /// A sound variant used only by one title's minigame.
    ConstellationSound,
    Movie,
    Palette,
    Printer,
    Text,
    Font,
    Camera,
    ImageSet,
    Canvas,
    Function,
}

impl AssetKind {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x0001 => Some(Self::Screen),
            0x0002 => Some(Self::Stage),
            0x0004 => Some(Self::Path),
            0x0005 => Some(Self::Sound),
            0x0006 => Some(Self::Timer),
            0x0007 => Some(Self::Image),
            0x000b => Some(Self::Hotspot),
            0x000c => Some(Self::Cursor),
            0x000e => Some(Self::Sprite),
            0x000f => Some(Self::ZazuSound),
            0x0010 => Some(Self::ConstellationSound),
            0x0016 => Some(Self::Movie),
            0x0017 => Some(Self::Palette),
            0x0019 => Some(Self::Printer),
            0x001a => Some(Self::Text),
            0x001b => Some(Self::Font),
            0x001c => Some(Self::Camera),
            0x001d => Some(Self::ImageSet),
            0x001e => Some(Self::Canvas),
            0x0069 => Some(Self::Function),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Stage => "stage",
            Self::Path => "path",
            Self::Sound => "sound",
            Self::Timer => "timer",
            Self::Image => "image",
            Self::Hotspot => "hotspot",
            Self::Cursor => "cursor",
            Self::Sprite => "sprite",
            Self::ZazuSound => "zazu sound",
            Self::ConstellationSound => "constellation sound",
            Self::Movie => "movie",
            Self::Palette => "palette",
            Self::Printer => "printer",
            Self::Text => "text",
            Self::Font => "font",
            Self::Camera => "camera",
            Self::ImageSet => "image set",
            Self::Canvas => "canvas",
            Self::Function => "function",
        }
    }
}

/// Known asset header section tags.
mod section {
    pub const EMPTY: u16 = 0x0000;
    pub const SOUND_ENCODING_1: u16 = 0x0001;
    pub const SOUND_ENCODING_2: u16 = 0x0002;
    pub const EVENT_HANDLER: u16 = 0x0017;
    pub const STAGE_ID: u16 = 0x0019;
    pub const ASSET_ID: u16 = 0x001a;
    pub const CHUNK_REFERENCE: u16 = 0x001b;
    pub const BOUNDING_BOX: u16 = 0x001c;
    pub const POLYGON: u16 = 0x001d;
    pub const Z_INDEX: u16 = 0x001e;
    pub const STARTUP_VISIBILITY: u16 = 0x001f;
    pub const TRANSPARENCY: u16 = 0x0020;
    pub const HAS_OWN_SUBFILE: u16 = 0x0021;
    pub const SOUND_INFO: u16 = 0x0033;
    pub const FRAME_RATE: u16 = 0x0034;
    pub const TEXT_FONT: u16 = 0x0258;
    pub const TEXT_INITIAL: u16 = 0x0259;
    pub const TEXT_MAX_WIDTH: u16 = 0x025a;
    pub const TEXT_JUSTIFICATION: u16 = 0x025b;
    pub const TEXT_POSITION: u16 = 0x025f;
    pub const TEXT_UNK: u16 = 0x0262;
    pub const TEXT_MARKER: u16 = 0x0263;
    pub const TEXT_CHAR_RANGES: u16 = 0x0265;
    pub const TEXT_PAIR: u16 = 0x0266;
    pub const SPRITE_CHUNK_COUNT: u16 = 0x03e8;
    pub const SPRITE_FRAME_MAPPING: u16 = 0x03e9;
    pub const SPRITE_FIRST_FRAME: u16 = 0x03ea;
    pub const EDITABLE: u16 = 0x03eb;
    pub const CURSOR_RESOURCE: u16 = 0x03ec;
    pub const MOUSE_TIMERS: u16 = 0x03ed;
    pub const MOUSE_UNK: u16 = 0x03ee;
    pub const MOUSE_BARRIER: u16 = 0x03ef;
    pub const PALETTE: u16 = 0x05aa;
    pub const DISSOLVE_FACTOR: u16 = 0x05dc;
    pub const X_POSITION: u16 = 0x05de;
    pub const Y_POSITION: u16 = 0x05df;
    pub const PATH_START: u16 = 0x060e;
    pub const PATH_END: u16 = 0x060f;
    pub const PATH_STEP_RATE: u16 = 0x0610;
    pub const PATH_END_EXTRA: u16 = 0x0611;
    pub const PATH_START_EXTRA: u16 = 0x0612;
    pub const ASSET_REFERENCE: u16 = 0x077b;
    pub const IMAGE_SET_COUNT: u16 = 0x0774;
    pub const IMAGE_SET_MARKER: u16 = 0x0776;
    pub const IMAGE_SET_DECLARATION: u16 = 0x0778;
    pub const IMAGE_SET_BBOX: u16 = 0x0779;
    pub const NAME: u16 = 0x0bb8;
}

/// A reference from a sprite frame index to a screen position.
#[derive(Debug, Clone, Copy)]
pub struct SpriteFrameMapping {
    pub id: u32,
    pub x: u32,
    pub y: u32,
}

/// Path movement settings, kept as raw values; the exact meaning of the
/// individual fields varies by title era.
#[derive(Debug, Clone, Default)]
pub struct PathSettings {
    pub start: Vec<Datum>,
    pub end: Vec<Datum>,
    pub step_rate: Option<f64>,
}

/// The kind-specific payload of an asset. For several kinds the payload
/// bytes live in a different chunk or subfile and are attached later.
#[derive(Debug, Clone)]
pub enum AssetPayload {
    None,
    Image(Option<Bitmap>),
    Camera(Option<Bitmap>),
    ImageSet(BitmapSet),
    Sound(Sound),
    Sprite(Sprite),
    Font(Font),
    Movie(Movie),
    /// Indices into the owning context's asset arena.
    Stage(Vec<usize>),
}

/// One asset: the fixed header core, the optional per-section metadata,
/// and the kind-specific payload.
#[derive(Debug, Clone)]
pub struct Asset {
    pub file_number: u32,
    pub kind: AssetKind,
    pub id: u32,
    pub name: Option<String>,
    pub stage_id: Option<u32>,
    pub chunk_references: Vec<ChunkRef>,
    pub event_handlers: Vec<EventHandler>,
    pub bounding_box: Option<BoundingBox>,
    pub polygon: Option<Polygon>,
    pub z_index: Option<i16>,
    /// The ID of another asset whose image or sound data this asset
    /// shares.
    pub asset_reference: Option<u32>,
    pub visible_at_startup: Option<bool>,
    pub transparent: Option<bool>,
    pub has_own_subfile: bool,
    pub chunk_count: u32,
    pub rate: Option<f64>,
    pub frame_rate: Option<f64>,
    pub editable: Option<bool>,
    pub cursor_resource: Option<u32>,
    pub dissolve_factor: Option<f64>,
    pub x: Option<i16>,
    pub y: Option<i16>,
    pub sound_encoding: Option<AudioEncoding>,
    pub text: Option<TextSettings>,
    pub path: Option<PathSettings>,
    pub sprite_frame_mappings: Vec<SpriteFrameMapping>,
    pub sprite_first_frame: Option<u32>,
    pub image_set_count: Option<u32>,
    pub image_set_declarations: Vec<BitmapDeclaration>,
    pub palette: Option<Box<[u8; PALETTE_BYTES]>>,
    /// Sections whose values are read but not yet understood, keyed by
    /// their tag.
    pub unknowns: Vec<(u16, Datum)>,
    pub payload: AssetPayload,
}

impl Asset {
    /// Read one asset header from the current position, through the
    /// terminating empty section.
    pub fn read(c: &mut Cursor, chunk: &Chunk) -> Result<Self> {
        let file_number = datum::read_u32(c)?;
        let offset = c.position();
        let raw_kind = datum::read_u32(c)?;
        let kind = AssetKind::from_raw(raw_kind)
            .ok_or(Error::UnknownAssetType { offset, raw: raw_kind })?;
        let id = datum::read_u32(c)?;

        let mut asset = Self {
            file_number,
            kind,
            id,
            name: None,
            stage_id: None,
            chunk_references: Vec::new(),
            event_handlers: Vec::new(),
            bounding_box: None,
            polygon: None,
            z_index: None,
            asset_reference: None,
            visible_at_startup: None,
            transparent: None,
            has_own_subfile: false,
            chunk_count: 0,
            rate: None,
            frame_rate: None,
            editable: None,
            cursor_resource: None,
            dissolve_factor: None,
            x: None,
            y: None,
            sound_encoding: None,
            text: None,
            path: None,
            sprite_frame_mappings: Vec::new(),
            sprite_first_frame: None,
            image_set_count: None,
            image_set_declarations: Vec::new(),
            palette: None,
            unknowns: Vec::new(),
            payload: AssetPayload::None,
        };

        loop {
            let section = datum::read_u16(c)?;
            if section == section::EMPTY {
                break;
            }
            asset.read_section(c, chunk, section)?;
        }

        asset.payload = asset.build_payload(c)?;
        Ok(asset)
    }

    fn read_section(&mut self, c: &mut Cursor, chunk: &Chunk, section: u16) -> Result<()> {
        let offset = c.position();
        match section {
            section::EVENT_HANDLER => {
                let handler = EventHandler::read(c)?;
                self.event_handlers.push(handler);
            }
            section::STAGE_ID => self.stage_id = Some(datum::read_u32(c)?),
            section::ASSET_ID => {
                // The ID was already read in the fixed part of the
                // header; this section only repeats it.
                let duplicate = datum::read_u32(c)?;
                if duplicate != self.id {
                    return Err(Error::UnexpectedValue {
                        offset,
                        context: "repeated asset id",
                        expected: self.id.to_string(),
                        found: duplicate.to_string(),
                    });
                }
            }
            section::CHUNK_REFERENCE => {
                // Movies carry three references (header, audio, video)
                // with an unexplained extra datum between each pair.
                if self.kind == AssetKind::Movie {
                    let header = datum::read_reference(c)?;
                    self.chunk_references.push(header);
                    self.unknowns.push((section, Datum::read(c)?));
                    let audio = datum::read_reference(c)?;
                    self.chunk_references.push(audio);
                    self.unknowns.push((section, Datum::read(c)?));
                    let video = datum::read_reference(c)?;
                    self.chunk_references.push(video);
                } else {
                    self.chunk_references.push(datum::read_reference(c)?);
                }
            }
            section::BOUNDING_BOX => self.bounding_box = Some(datum::read_bounding_box(c)?),
            section::POLYGON => self.polygon = Some(datum::read_polygon(c)?),
            section::Z_INDEX => self.z_index = Some(datum::read_i16(c)?),
            section::ASSET_REFERENCE => self.asset_reference = Some(datum::read_u32(c)?),
            section::STARTUP_VISIBILITY => {
                self.visible_at_startup = Some(datum::read_u32(c)? != 0)
            }
            section::TRANSPARENCY => self.transparent = Some(datum::read_u32(c)? != 0),
            section::HAS_OWN_SUBFILE => self.has_own_subfile = datum::read_u32(c)? != 0,
            section::SOUND_INFO => {
                self.chunk_count = datum::read_u32(c)?;
                self.rate = Some(datum::read_f64(c)?);
            }
            section::FRAME_RATE => self.frame_rate = Some(datum::read_f64(c)?),
            section::TEXT_FONT => {
                let settings = self.text.get_or_insert_with(TextSettings::default);
                settings.font_asset_id = Some(datum::read_u32(c)?);
            }
            section::TEXT_INITIAL => {
                let settings = self.text.get_or_insert_with(TextSettings::default);
                settings.initial_text = Some(datum::read_string(c)?);
            }
            section::TEXT_MAX_WIDTH => {
                let settings = self.text.get_or_insert_with(TextSettings::default);
                settings.max_width = Some(datum::read_u32(c)?);
            }
            section::TEXT_JUSTIFICATION => {
                let raw = datum::read_u32(c)?;
                let justification =
                    Justification::from_raw(raw).ok_or(Error::UnexpectedValue {
                        offset,
                        context: "text justification",
                        expected: "0x25c..=0x25e".into(),
                        found: format!("{raw:#x}"),
                    })?;
                let settings = self.text.get_or_insert_with(TextSettings::default);
                settings.justification = Some(justification);
            }
            section::TEXT_POSITION => {
                let raw = datum::read_u32(c)?;
                let position =
                    VerticalPosition::from_raw(raw).ok_or(Error::UnexpectedValue {
                        offset,
                        context: "text vertical position",
                        expected: "0x25e, 0x260, or 0x261".into(),
                        found: format!("{raw:#x}"),
                    })?;
                let settings = self.text.get_or_insert_with(TextSettings::default);
                settings.position = Some(position);
            }
            section::TEXT_UNK => self.unknowns.push((section, Datum::read(c)?)),
            section::TEXT_MARKER => {}
            section::TEXT_CHAR_RANGES => {
                let settings = self.text.get_or_insert_with(TextSettings::default);
                for _ in 0..3 {
                    settings.character_ranges.push(Datum::read(c)?);
                }
            }
            section::TEXT_PAIR => {
                for _ in 0..2 {
                    self.unknowns.push((section, Datum::read(c)?));
                }
            }
            section::SPRITE_CHUNK_COUNT => self.chunk_count = datum::read_u32(c)?,
            section::SPRITE_FRAME_MAPPING => {
                let mapping = SpriteFrameMapping {
                    id: datum::read_u32(c)?,
                    x: datum::read_u32(c)?,
                    y: datum::read_u32(c)?,
                };
                self.sprite_frame_mappings.push(mapping);
            }
            section::SPRITE_FIRST_FRAME => self.sprite_first_frame = Some(datum::read_u32(c)?),
            section::EDITABLE => self.editable = Some(datum::read_u32(c)? != 0),
            section::CURSOR_RESOURCE => self.cursor_resource = Some(datum::read_u32(c)?),
            section::MOUSE_TIMERS => {
                // Only one known minigame uses these; five timers are
                // always declared.
                for _ in 0..15 {
                    self.unknowns.push((section, Datum::read(c)?));
                }
            }
            section::MOUSE_UNK => {
                for _ in 0..2 {
                    self.unknowns.push((section, Datum::read(c)?));
                }
            }
            section::MOUSE_BARRIER => self.unknowns.push((section, Datum::read(c)?)),
            section::PALETTE => {
                let bytes = chunk.read(c, PALETTE_BYTES)?;
                let mut palette = Box::new([0u8; PALETTE_BYTES]);
                palette.copy_from_slice(bytes);
                self.palette = Some(palette);
            }
            section::DISSOLVE_FACTOR => self.dissolve_factor = Some(datum::read_f64(c)?),
            section::X_POSITION => self.x = Some(datum::read_i16(c)?),
            section::Y_POSITION => self.y = Some(datum::read_i16(c)?),
            section::PATH_START => {
                let path = self.path.get_or_insert_with(PathSettings::default);
                path.start.push(Datum::read(c)?);
            }
            section::PATH_END => {
                let path = self.path.get_or_insert_with(PathSettings::default);
                path.end.push(Datum::read(c)?);
            }
            section::PATH_STEP_RATE => {
                let path = self.path.get_or_insert_with(PathSettings::default);
                path.step_rate = Some(datum::read_f64(c)?);
            }
            section::PATH_END_EXTRA => {
                let path = self.path.get_or_insert_with(PathSettings::default);
                path.end.push(Datum::read(c)?);
            }
            section::PATH_START_EXTRA => {
                let path = self.path.get_or_insert_with(PathSettings::default);
                path.start.push(Datum::read(c)?);
            }
            section::IMAGE_SET_COUNT => self.image_set_count = Some(datum::read_u32(c)?),
            section::IMAGE_SET_MARKER => self.unknowns.push((section, Datum::read(c)?)),
            section::IMAGE_SET_DECLARATION => {
                let declaration = BitmapDeclaration::read(c)?;
                self.image_set_declarations.push(declaration);
            }
            section::IMAGE_SET_BBOX => self.unknowns.push((section, Datum::read(c)?)),
            section::NAME => self.name = Some(datum::read_string(c)?),
            section::SOUND_ENCODING_1 | section::SOUND_ENCODING_2 => {
                let raw = datum::read_u32(c)?;
                let encoding = AudioEncoding::from_raw(raw).ok_or(Error::UnexpectedValue {
                    offset,
                    context: "sound encoding",
                    expected: "0x0004 or 0x0010".into(),
                    found: format!("{raw:#x}"),
                })?;
                self.sound_encoding = Some(encoding);
            }
            0x0022 | 0x0024 | 0x0032 | 0x0037 | 0x06ac | 0x0772 | 0x2734 | 0x27b2 => {
                self.unknowns.push((section, Datum::read(c)?))
            }
            0x03f0..=0x03f5 => self.unknowns.push((section, Datum::read(c)?)),
            0x0514..=0x0518 => self.unknowns.push((section, Datum::read(c)?)),
            0x0519 => {
                for _ in 0..3 {
                    self.unknowns.push((section, Datum::read(c)?));
                }
            }
            0x05dd => self.unknowns.push((section, Datum::read(c)?)),
            0x076f | 0x0770 | 0x0773 | 0x0775 | 0x0777 | 0x077a | 0x077c..=0x0780 => {
                self.unknowns.push((section, Datum::read(c)?))
            }
            0x3a98..=0x3afb => {
                // These sections re-key the asset by their own tag.
                self.id = section as u32;
                self.unknowns.push((section, Datum::read(c)?));
            }
            other => return Err(Error::UnknownSectionType { offset, section: other }),
        }
        Ok(())
    }

    /// Construct the payload container to be filled in later, once the
    /// referenced data chunk is located.
    fn build_payload(&self, c: &Cursor) -> Result<AssetPayload> {
        let payload = match self.kind {
            AssetKind::Image => AssetPayload::Image(None),
            AssetKind::Camera => AssetPayload::Camera(None),
            AssetKind::ImageSet => AssetPayload::ImageSet(BitmapSet::new()),
            AssetKind::Sound | AssetKind::ZazuSound | AssetKind::ConstellationSound => {
                AssetPayload::Sound(Sound::new(self.sound_encoding))
            }
            AssetKind::Sprite => AssetPayload::Sprite(Sprite::new(self.require_bounding_box(c)?)),
            AssetKind::Font => AssetPayload::Font(Font::new()),
            AssetKind::Movie => {
                AssetPayload::Movie(Movie::new(self.require_bounding_box(c)?, self.sound_encoding))
            }
            AssetKind::Stage => AssetPayload::Stage(Vec::new()),
            _ => AssetPayload::None,
        };
        Ok(payload)
    }

    fn require_bounding_box(&self, c: &Cursor) -> Result<BoundingBox> {
        self.bounding_box.ok_or(Error::UnexpectedValue {
            offset: c.position(),
            context: "asset bounding box",
            expected: format!("bounding box section for {} asset {}", self.kind.name(), self.id),
            found: "none".into(),
        })
    }

    /// Read this asset's data from a chunk in the first subfile.
    pub fn read_data_chunk(
        &mut self,
        c: &mut Cursor,
        chunk: &Chunk,
        session: &SessionContext,
    ) -> Result<()> {
        let offset = c.position();
        match &mut self.payload {
            AssetPayload::Image(slot) | AssetPayload::Camera(slot) => {
                *slot = Some(Bitmap::read(c, chunk)?);
                Ok(())
            }
            AssetPayload::ImageSet(set) => set.read_chunk(c, chunk),
            AssetPayload::Sound(sound) => sound.read_chunk(c, chunk),
            AssetPayload::Sprite(sprite) => sprite.read_chunk(c, chunk),
            AssetPayload::Font(font) => font.read_chunk(c, chunk),
            AssetPayload::Movie(movie) => movie.read_still(c, chunk, session),
            _ => Err(Error::UnexpectedValue {
                offset,
                context: "data chunk owner",
                expected: "a data-bearing asset kind".into(),
                found: self.kind.name().into(),
            }),
        }
    }

    /// Read this asset's data from its own subfile.
    pub fn read_data_subfile(
        &mut self,
        c: &mut Cursor,
        subfile: &mut crate::riff::SubFile,
        first: Chunk,
        session: &SessionContext,
    ) -> Result<()> {
        let offset = c.position();
        let chunk_count = self.chunk_count;
        match &mut self.payload {
            AssetPayload::Movie(movie) => movie.read_subfile(c, subfile, first, session),
            AssetPayload::Sound(sound) => sound.read_subfile(c, subfile, first, chunk_count),
            AssetPayload::ImageSet(set) => set.read_subfile(c, subfile, first),
            _ => Err(Error::UnexpectedValue {
                offset,
                context: "subfile owner",
                expected: "movie, sound, or image set".into(),
                found: self.kind.name().into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Writer;
    use crate::datum::tag;
    use crate::riff::FourCc;

    fn write_u16_datum(w: &mut Writer, v: u16) {
        w.write_u16(tag::UINT16_1);
        w.write_u16(v);
    }

    fn write_bbox_datum(w: &mut Writer, x: i16, y: i16, width: i16, height: i16) {
        w.write_u16(tag::BOUNDING_BOX);
        for (px, py) in [(x, y), (width, height)] {
            w.write_u16(tag::POINT_1);
            w.write_u16(tag::INT16_1);
            w.write_i16(px);
            w.write_u16(tag::INT16_1);
            w.write_i16(py);
        }
    }

    fn header_chunk(payload: &[u8]) -> (Vec<u8>, Chunk) {
        let mut w = Writer::new();
        w.write_tag(b"igod");
        w.write_u32(payload.len() as u32);
        w.write_bytes(payload);
        let data = w.into_bytes();
        let chunk = Chunk {
            fourcc: FourCc(*b"igod"),
            length: payload.len(),
            data_start: 8,
        };
        (data, chunk)
    }

    #[test]
    fn sections_accept_any_order() {
        let mut w = Writer::new();
        write_u16_datum(&mut w, 100); // file number
        write_u16_datum(&mut w, 0x0007); // image
        write_u16_datum(&mut w, 42); // id
        write_u16_datum(&mut w, 0x001e); // z-index first
        write_u16_datum(&mut w, 3);
        write_u16_datum(&mut w, 0x0019); // then stage id
        write_u16_datum(&mut w, 7);
        write_u16_datum(&mut w, 0x001b); // then a chunk reference
        w.write_u16(tag::REFERENCE);
        w.write_tag(b"a123");
        write_u16_datum(&mut w, 0x0000); // sentinel
        let (data, chunk) = header_chunk(&w.into_bytes());

        let mut c = Cursor::new(&data);
        c.seek(chunk.data_start);
        let asset = Asset::read(&mut c, &chunk).unwrap();
        assert_eq!(asset.kind, AssetKind::Image);
        assert_eq!(asset.id, 42);
        assert_eq!(asset.z_index, Some(3));
        assert_eq!(asset.stage_id, Some(7));
        assert_eq!(asset.chunk_references.len(), 1);
        assert!(matches!(asset.payload, AssetPayload::Image(None)));
    }

    #[test]
    fn camera_sections_are_kept_as_unknown_datums() {
        let mut w = Writer::new();
        write_u16_datum(&mut w, 100);
        write_u16_datum(&mut w, 0x001c); // camera
        write_u16_datum(&mut w, 12);
        write_u16_datum(&mut w, 0x076f);
        write_u16_datum(&mut w, 320);
        write_u16_datum(&mut w, 0x0770);
        write_u16_datum(&mut w, 240);
        write_u16_datum(&mut w, 0x0000);
        let (data, chunk) = header_chunk(&w.into_bytes());

        let mut c = Cursor::new(&data);
        c.seek(chunk.data_start);
        let asset = Asset::read(&mut c, &chunk).unwrap();
        assert_eq!(asset.kind, AssetKind::Camera);
        assert_eq!(
            asset.unknowns,
            vec![(0x076f, Datum::U16(320)), (0x0770, Datum::U16(240))]
        );
        assert!(matches!(asset.payload, AssetPayload::Camera(None)));
    }

    #[test]
    fn movie_reads_three_references_in_order() {
        let mut w = Writer::new();
        write_u16_datum(&mut w, 100);
        write_u16_datum(&mut w, 0x0016); // movie
        write_u16_datum(&mut w, 1);
        write_u16_datum(&mut w, 0x001c);
        write_bbox_datum(&mut w, 0, 0, 64, 48);
        write_u16_datum(&mut w, 0x001b);
        for (tag_bytes, filler) in [(b"a100", true), (b"a101", true), (b"a102", false)] {
            w.write_u16(tag::REFERENCE);
            w.write_tag(tag_bytes);
            if filler {
                write_u16_datum(&mut w, 0);
            }
        }
        write_u16_datum(&mut w, 0x0000);
        let (data, chunk) = header_chunk(&w.into_bytes());

        let mut c = Cursor::new(&data);
        c.seek(chunk.data_start);
        let asset = Asset::read(&mut c, &chunk).unwrap();
        assert_eq!(asset.kind, AssetKind::Movie);
        let references: Vec<String> = asset
            .chunk_references
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(references, vec!["a100", "a101", "a102"]);
        assert!(matches!(asset.payload, AssetPayload::Movie(_)));
    }

    #[test]
    fn bounding_box_section_decodes() {
        let mut w = Writer::new();
        write_u16_datum(&mut w, 100);
        write_u16_datum(&mut w, 0x000b); // hotspot
        write_u16_datum(&mut w, 9);
        write_u16_datum(&mut w, 0x001c);
        write_bbox_datum(&mut w, 10, 20, 30, 40);
        write_u16_datum(&mut w, 0x0000);
        let (data, chunk) = header_chunk(&w.into_bytes());

        let mut c = Cursor::new(&data);
        c.seek(chunk.data_start);
        let asset = Asset::read(&mut c, &chunk).unwrap();
        let bbox = asset.bounding_box.unwrap();
        assert_eq!(bbox.origin.x, 10);
        assert_eq!(bbox.dimensions.y, 40);
    }

    #[test]
    fn unknown_section_is_fatal() {
        let mut w = Writer::new();
        write_u16_datum(&mut w, 100);
        write_u16_datum(&mut w, 0x0007);
        write_u16_datum(&mut w, 1);
        write_u16_datum(&mut w, 0x4444); // bogus section tag
        let (data, chunk) = header_chunk(&w.into_bytes());

        let mut c = Cursor::new(&data);
        c.seek(chunk.data_start);
        match Asset::read(&mut c, &chunk).unwrap_err() {
            Error::UnknownSectionType { section, .. } => assert_eq!(section, 0x4444),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_asset_kind_is_fatal() {
        let mut w = Writer::new();
        write_u16_datum(&mut w, 100);
        write_u16_datum(&mut w, 0x0055);
        let (data, chunk) = header_chunk(&w.into_bytes());

        let mut c = Cursor::new(&data);
        c.seek(chunk.data_start);
        assert!(matches!(
            Asset::read(&mut c, &chunk),
            Err(Error::UnknownAssetType { raw: 0x0055, .. })
        ));
    }

    #[test]
    fn repeated_asset_id_must_match() {
        let mut w = Writer::new();
        write_u16_datum(&mut w, 100);
        write_u16_datum(&mut w, 0x0007);
        write_u16_datum(&mut w, 5);
        write_u16_datum(&mut w, 0x001a);
        write_u16_datum(&mut w, 6); // contradicts the id above
        let (data, chunk) = header_chunk(&w.into_bytes());

        let mut c = Cursor::new(&data);
        c.seek(chunk.data_start);
        assert!(matches!(
            Asset::read(&mut c, &chunk),
            Err(Error::UnexpectedValue { .. })
        ));
    }
}
