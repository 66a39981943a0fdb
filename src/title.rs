//! Whole-title orchestration.
//!
//! A title is a set of context files plus, on some CD-ROM releases, a
//! hard-drive cache file whose subfiles carry asset data for chunks
//! declared in other contexts. The cache can only be resolved once every
//! regular context has been read, so contexts load in two phases: all
//! header parsing first, then the registry freezes and cache subfiles
//! route their data to the owning assets.

use crate::assets::Asset;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::registry::{AssetHandle, ChunkRegistry};
use crate::riff::{DataFile, FourCc};
use crate::version::SessionContext;

#[derive(Debug, Default)]
pub struct Title {
    pub session: SessionContext,
    pub contexts: Vec<crate::context::Context>,
    registry: ChunkRegistry,
}

impl Title {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    /// Parse one regular context file and register every chunk its
    /// assets claim. Returns the context's index.
    ///
    /// Must not be called after the first cache file has been read.
    pub fn read_context(&mut self, data: &[u8]) -> Result<usize> {
        let context = crate::context::Context::read(data, &self.session)?;
        let context_index = self.contexts.len();
        for (fourcc, asset_index) in context.chunk_claims() {
            self.registry.insert(
                fourcc,
                AssetHandle {
                    context_index,
                    asset_index,
                },
            );
        }
        self.contexts.push(context);
        Ok(context_index)
    }

    /// Parse a hard-drive cache file, routing each subfile to the asset
    /// that owns its first chunk. Freezes the registry on first use.
    pub fn read_cache_context(&mut self, data: &[u8]) -> Result<()> {
        if !self.registry.is_frozen() {
            self.registry.freeze();
        }

        let mut c = Cursor::new(data);
        let file = DataFile::open(&mut c, true)?;
        for _ in 0..file.subfile_count {
            let mut subfile = file.next_subfile(&mut c)?;
            let chunk = subfile.next_chunk(&mut c)?;
            match self.registry.resolve(chunk.fourcc) {
                Ok(handle) => {
                    let session = self.session.clone();
                    let asset = self.contexts[handle.context_index].asset_mut(handle.asset_index);
                    asset.read_data_subfile(&mut c, &mut subfile, chunk, &session)?;
                }
                Err(Error::UnresolvedChunk { fourcc }) => {
                    log::warn!("cache subfile for unknown chunk {}, skipping", fourcc.as_str());
                    subfile.skip(&mut c)?;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Look up an asset by the identifier of any chunk it owns. Only
    /// meaningful once every context has been read.
    pub fn asset_by_chunk(&self, fourcc: FourCc) -> Option<&Asset> {
        let handle = self.registry.resolve(fourcc).ok()?;
        Some(&self.contexts[handle.context_index].assets[handle.asset_index])
    }

    /// Find a context by its declared file number.
    pub fn context_by_file_number(&self, file_number: u32) -> Option<&crate::context::Context> {
        self.contexts
            .iter()
            .find(|context| context.file_number() == Some(file_number))
    }
}
