//! Context (CXT) files: the per-screen containers that hold asset
//! headers, palettes, bytecode, and most asset data.
//!
//! Subfile 0 carries the header sections. Old-style titles lump all of
//! them into one `igod` chunk; new-style titles give each section its own
//! `igod` chunk. After the headers come "chunk-only" assets (stills and
//! short sounds), then each later subfile holds the data for exactly one
//! movie, sound, or image-set asset.

use std::collections::HashMap;

use crate::assets::script::{EventHandler, Function};
use crate::assets::{Asset, AssetKind, AssetPayload};
use crate::cursor::Cursor;
use crate::datum::{self, Datum, PALETTE_BYTES};
use crate::error::{Error, Result};
use crate::riff::{Chunk, DataFile, FourCc, SubFile};
use crate::version::SessionContext;

/// Known context header section tags.
mod section {
    pub const EMPTY: u16 = 0x0000;
    pub const OLD_STYLE: u16 = 0x000d;
    pub const PARAMETERS: u16 = 0x000e;
    pub const END: u16 = 0x0010;
    pub const ASSET_HEADER: u16 = 0x0011;
    pub const ASSET_LINK: u16 = 0x0013;
    pub const FUNCTION: u16 = 0x0031;
    pub const POOH: u16 = 0x057a;
    pub const PALETTE: u16 = 0x05aa;
}

mod parameter_section {
    pub const EMPTY: u16 = 0x0014;
    pub const FILE_NUMBER: u16 = 0x0011;
    pub const NAME: u16 = 0x0bb9;
}

/// One value in the undocumented parameter declaration block.
#[derive(Debug, Clone)]
pub enum ParameterValue {
    Array(Vec<ParameterEntry>),
    String(String),
    Scalar(Datum),
}

#[derive(Debug, Clone)]
pub struct ParameterEntry {
    pub token: u32,
    pub value: ParameterValue,
}

/// Context-wide parameters: the file number, an optional human-readable
/// name, and any bytecode that runs when the context loads. Usually the
/// second header section, after the palette.
#[derive(Debug, Clone, Default)]
pub struct GlobalParameters {
    pub file_number: u32,
    /// Old-style titles have no context names; when present they look
    /// like `Decals_7x00`.
    pub name: Option<String>,
    pub entries: Vec<(u32, ParameterEntry)>,
    pub init_handlers: Vec<EventHandler>,
}

impl GlobalParameters {
    pub fn read(c: &mut Cursor, session: &SessionContext) -> Result<Self> {
        let mut parameters = Self {
            file_number: datum::read_u32(c)?,
            ..Self::default()
        };

        let offset = c.position();
        let section = datum::read_u16(c)?;
        match section {
            parameter_section::NAME => {
                datum::expect_u32(c, parameters.file_number, "parameter file number")?;
                parameters.name = Some(datum::read_string(c)?);
                datum::expect_u32(c, 0x0000, "parameter name terminator")?;
            }
            parameter_section::FILE_NUMBER => {
                read_file_number_block(c, parameters.file_number)?;
            }
            parameter_section::EMPTY => {
                let mut check = None;
                let mut ty = datum::read_u32(c)?;
                while ty != 0 {
                    if ty != parameters.file_number {
                        return Err(Error::UnexpectedValue {
                            offset,
                            context: "parameter declaration file number",
                            expected: parameters.file_number.to_string(),
                            found: ty.to_string(),
                        });
                    }
                    let id = datum::read_u32(c)?;
                    let token = datum::read_u32(c)?;
                    let entry = read_parameter_entry(c, token)?;
                    parameters.entries.push((id, entry));

                    let next = datum::read_u16(c)?;
                    check = Some(next);
                    if next != parameter_section::EMPTY {
                        break;
                    }
                    ty = datum::read_u32(c)?;
                }
                if check == Some(parameter_section::FILE_NUMBER) {
                    read_file_number_block(c, parameters.file_number)?;
                }
            }
            other => log::warn!("unrecognized context parameter section {other:#x}"),
        }

        // In first-generation titles the context-global bytecode follows
        // directly; the token after the last handler is consumed either
        // way.
        if session.is_first_generation() {
            let mut token = datum::read_u16(c)?;
            while token == 0x0017 {
                parameters.init_handlers.push(EventHandler::read(c)?);
                token = datum::read_u16(c)?;
            }
        }

        Ok(parameters)
    }
}

fn read_parameter_entry(c: &mut Cursor, token: u32) -> Result<ParameterEntry> {
    let value = match token {
        0x0007 => {
            let size = datum::read_u32(c)?;
            let mut entries = Vec::with_capacity(size as usize);
            for _ in 0..size {
                let inner = datum::read_u32(c)?;
                entries.push(read_parameter_entry(c, inner)?);
            }
            ParameterValue::Array(entries)
        }
        0x0006 => {
            let size = datum::read_u32(c)?;
            let bytes = c.read_bytes(size as usize)?;
            ParameterValue::String(bytes.iter().map(|&b| b as char).collect())
        }
        _ => ParameterValue::Scalar(Datum::read(c)?),
    };
    Ok(ParameterEntry { token, value })
}

/// An undocumented block present in every old-style title; all fields
/// except the file numbers are constant.
fn read_file_number_block(c: &mut Cursor, file_number: u32) -> Result<()> {
    datum::expect_u32(c, file_number, "repeated file number")?;
    datum::expect_u32(c, 0x0001, "file number block")?;
    datum::expect_u32(c, file_number, "repeated file number")?;
    datum::expect_u32(c, 0x0022, "file number block")?;
    let _ = Datum::read(c)?;
    Ok(())
}

/// One fully parsed context file.
#[derive(Debug, Default)]
pub struct Context {
    pub file: Option<DataFile>,
    pub parameters: Option<GlobalParameters>,
    /// All images in a context share this palette; there is no facility
    /// for palette changes within one context.
    pub palette: Option<Box<[u8; PALETTE_BYTES]>>,
    /// Arena of all assets in declaration order; stage children index
    /// into it.
    pub assets: Vec<Asset>,
    pub functions: Vec<Function>,
    /// Unexplained asset-link values found between header sections.
    pub links: Vec<u32>,
    by_id: HashMap<u32, usize>,
    referenced_chunks: HashMap<FourCc, usize>,
}

impl Context {
    /// Parse a whole context file.
    ///
    /// A file whose first data chunk is not a header chunk is a
    /// hard-drive cache: it has no asset headers of its own and can only
    /// be resolved against every other context, so it is rejected here
    /// and must go through the title-level cache reader instead.
    pub fn read(data: &[u8], session: &SessionContext) -> Result<Self> {
        let mut c = Cursor::new(data);
        let mut context = Self::default();
        let file = DataFile::open(&mut c, true)?;
        context.file = Some(file);
        if file.header_only {
            return Ok(context);
        }

        let mut subfile = file.next_subfile(&mut c)?;
        let mut chunk = subfile.next_chunk(&mut c)?;
        if !chunk.is_header() {
            return Err(Error::HeaderlessContext { fourcc: chunk.fourcc });
        }

        if session.is_first_generation() {
            chunk = context.read_old_style_header_sections(&mut c, &subfile, chunk, session)?;
        } else {
            chunk = context.read_new_style_header_sections(&mut c, &subfile, chunk, session)?;
        }

        // Most contexts have a palette; known exceptions exist, so this
        // is not an error.
        if context.palette.is_none() {
            log::warn!("no palette provided for this context");
        }

        // Chunk-only assets in the remainder of the first subfile.
        loop {
            context.read_asset_in_first_subfile(&mut c, &chunk, session)?;
            if subfile.at_end(&c) {
                break;
            }
            chunk = subfile.next_chunk(&mut c)?;
        }

        // Each later subfile holds the data for one asset. A subfile
        // that fails to parse is skipped, not fatal to the context.
        for _ in 1..file.subfile_count {
            subfile = file.next_subfile(&mut c)?;
            if let Err(err) = context.read_asset_from_later_subfile(&mut c, &mut subfile, session) {
                log::warn!("skipping remainder of subfile: {err}");
                subfile.skip(&mut c)?;
            }
        }

        Ok(context)
    }

    /// Old-style headers: all sections lumped into one `igod` chunk per
    /// run, each introduced by an `0x000d` marker datum.
    fn read_old_style_header_sections(
        &mut self,
        c: &mut Cursor,
        subfile: &SubFile,
        mut chunk: Chunk,
        session: &SessionContext,
    ) -> Result<Chunk> {
        let mut more_chunks = !subfile.at_end(c) && chunk.is_header();
        while more_chunks {
            datum::expect_u32(c, section::OLD_STYLE as u32, "header chunk marker")?;
            loop {
                let more_sections = self.read_header_section(c, &chunk, session, false)?;
                if !more_sections || chunk.at_end(c) {
                    break;
                }
            }

            more_chunks = !subfile.at_end(c) && chunk.is_header();
            if more_chunks {
                chunk = subfile.next_chunk(c)?;
                more_chunks = !subfile.at_end(c) && chunk.is_header();
            }
        }
        Ok(chunk)
    }

    /// New-style headers: one section per `igod` chunk, each opening with
    /// a header-marker datum.
    fn read_new_style_header_sections(
        &mut self,
        c: &mut Cursor,
        subfile: &SubFile,
        mut chunk: Chunk,
        session: &SessionContext,
    ) -> Result<Chunk> {
        let mut more_sections = chunk.is_header();
        while more_sections {
            let marker = datum::read_u16(c)?;
            if marker != section::OLD_STYLE {
                break;
            }
            if !self.read_header_section(c, &chunk, session, false)? {
                break;
            }
            if subfile.at_end(c) {
                break;
            }
            chunk = subfile.next_chunk(c)?;
            more_sections = chunk.is_header();
        }
        Ok(chunk)
    }

    /// Read one header section. Returns whether more sections follow.
    fn read_header_section(
        &mut self,
        c: &mut Cursor,
        chunk: &Chunk,
        session: &SessionContext,
        reading_stage: bool,
    ) -> Result<bool> {
        let offset = c.position();
        let section = datum::read_u16(c)?;
        match section {
            section::PARAMETERS => {
                if self.parameters.is_some() {
                    return Err(Error::UnexpectedValue {
                        offset,
                        context: "context parameters",
                        expected: "a single parameters section".into(),
                        found: "a second one".into(),
                    });
                }
                self.parameters = Some(GlobalParameters::read(c, session)?);
            }
            section::ASSET_LINK => {
                self.links.push(datum::read_u32(c)?);
                self.read_header_section(c, chunk, session, reading_stage)?;
            }
            section::PALETTE => {
                if self.palette.is_some() {
                    return Err(Error::UnexpectedValue {
                        offset,
                        context: "context palette",
                        expected: "a single palette section".into(),
                        found: "a second one".into(),
                    });
                }
                let bytes = chunk.read(c, PALETTE_BYTES)?;
                let mut palette = Box::new([0u8; PALETTE_BYTES]);
                palette.copy_from_slice(bytes);
                self.palette = Some(palette);
                let _ = Datum::read(c)?;
            }
            section::ASSET_HEADER => {
                self.read_asset_header(c, chunk, session, reading_stage)?;
                if chunk.at_end(c) && reading_stage {
                    return Ok(false);
                }
            }
            section::FUNCTION => {
                let function = Function::read(c, session)?;
                self.functions.push(function);
            }
            section::END => {
                let _ = Datum::read(c)?;
                let _ = Datum::read(c)?;
                return Ok(false);
            }
            section::EMPTY => {
                if reading_stage {
                    return Ok(false);
                }
            }
            section::POOH => {
                // A constant block found only in one title.
                for expected in [4.0, 4.0, 300.0, 3.0, 0.5, 1.0, 1.0, 1.0, 254.0, 0.0] {
                    let found = datum::read_f64(c)?;
                    if found != expected {
                        return Err(Error::UnexpectedValue {
                            offset,
                            context: "constant header block",
                            expected: expected.to_string(),
                            found: found.to_string(),
                        });
                    }
                }
            }
            other => return Err(Error::UnknownSectionType { offset, section: other }),
        }
        Ok(true)
    }

    fn read_asset_header(
        &mut self,
        c: &mut Cursor,
        chunk: &Chunk,
        session: &SessionContext,
        reading_stage: bool,
    ) -> Result<()> {
        let offset = c.position();
        let asset = Asset::read(c, chunk)?;
        if self.by_id.contains_key(&asset.id) {
            return Err(Error::UnexpectedValue {
                offset,
                context: "asset id",
                expected: "a not-yet-declared id".into(),
                found: format!("duplicate id {}", asset.id),
            });
        }
        let kind = asset.kind;
        let id = asset.id;
        let references: Vec<FourCc> = asset.chunk_references.iter().map(|r| r.0).collect();
        let index = self.assets.len();
        self.by_id.insert(id, index);
        self.assets.push(asset);
        // For movies the first reference alone would identify the asset,
        // but the chunks are consecutive so all three are registered.
        for fourcc in references {
            self.referenced_chunks.insert(fourcc, index);
        }

        if kind == AssetKind::Stage {
            let _ = Datum::read(c)?;
            let _ = Datum::read(c)?;
            if reading_stage {
                log::warn!("found embedded stage, there might be trouble afoot");
            }

            // One level of embedding is expected; the children land in
            // the arena right after their stage.
            let first_child = self.assets.len();
            while self.read_header_section(c, chunk, session, true)? {}
            let children: Vec<usize> = (first_child..self.assets.len()).collect();
            if let AssetPayload::Stage(slots) = &mut self.assets[index].payload {
                *slots = children;
            }
        }

        if !chunk.at_end(c) && !session.is_first_generation() && !reading_stage && kind != AssetKind::Stage {
            let _ = Datum::read(c)?;
        }
        Ok(())
    }

    /// Read one chunk-only asset from the first subfile.
    fn read_asset_in_first_subfile(
        &mut self,
        c: &mut Cursor,
        chunk: &Chunk,
        session: &SessionContext,
    ) -> Result<()> {
        // Stray igod chunks here hold asset-link structures; skip them.
        if chunk.is_header() {
            chunk.skip(c)?;
            return Ok(());
        }

        // Asset headers live in this same subfile, so a miss here is a
        // genuine error, not a cross-file reference.
        let index = self
            .asset_index_by_chunk(chunk.fourcc)
            .ok_or(Error::UnresolvedChunk { fourcc: chunk.fourcc })?;
        self.assets[index].read_data_chunk(c, chunk, session)
    }

    /// Read the single asset owning a later subfile.
    fn read_asset_from_later_subfile(
        &mut self,
        c: &mut Cursor,
        subfile: &mut SubFile,
        session: &SessionContext,
    ) -> Result<()> {
        let chunk = subfile.next_chunk(c)?;
        let index = self
            .asset_index_by_chunk(chunk.fourcc)
            .ok_or(Error::UnresolvedChunk { fourcc: chunk.fourcc })?;
        self.assets[index].read_data_subfile(c, subfile, chunk, session)
    }

    fn asset_index_by_chunk(&self, fourcc: FourCc) -> Option<usize> {
        self.referenced_chunks.get(&fourcc).copied()
    }

    /// All chunk identifiers claimed by this context's assets, for
    /// registration in the title-wide registry.
    pub fn chunk_claims(&self) -> impl Iterator<Item = (FourCc, usize)> + '_ {
        self.referenced_chunks.iter().map(|(&f, &i)| (f, i))
    }

    pub fn asset_by_id(&self, id: u32) -> Option<&Asset> {
        self.by_id.get(&id).map(|&i| &self.assets[i])
    }

    pub fn asset_by_chunk(&self, fourcc: FourCc) -> Option<&Asset> {
        self.asset_index_by_chunk(fourcc).map(|i| &self.assets[i])
    }

    /// The file number declared in the parameters section, when present.
    pub fn file_number(&self) -> Option<u32> {
        self.parameters.as_ref().map(|p| p.file_number)
    }

    pub(crate) fn asset_mut(&mut self, index: usize) -> &mut Asset {
        &mut self.assets[index]
    }
}
