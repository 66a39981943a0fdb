//! Cross-file asset lookup.
//!
//! Context files reference each other's assets through chunk identifiers.
//! Ordinary context files register the chunks their assets own; cache
//! files (contexts with no header sections of their own) then resolve
//! those identifiers back to the owning asset. Registration and resolution
//! are separate phases: the registry is frozen before any cache file is
//! read, so a resolution miss is a real error and not an ordering accident.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::riff::FourCc;

/// Where an asset lives: which context file, and which slot in that
/// context's asset arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetHandle {
    pub context_index: usize,
    pub asset_index: usize,
}

#[derive(Debug, Default)]
pub struct ChunkRegistry {
    by_chunk: HashMap<FourCc, AssetHandle>,
    frozen: bool,
}

impl ChunkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chunk as owned by the given asset. Last write wins;
    /// titles occasionally re-declare a chunk and the engine took the
    /// later declaration.
    pub fn insert(&mut self, fourcc: FourCc, handle: AssetHandle) {
        debug_assert!(!self.frozen, "registration after freeze");
        self.by_chunk.insert(fourcc, handle);
    }

    /// End the registration phase.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Resolve a chunk identifier to its owning asset.
    pub fn resolve(&self, fourcc: FourCc) -> Result<AssetHandle> {
        self.by_chunk
            .get(&fourcc)
            .copied()
            .ok_or(Error::UnresolvedChunk { fourcc })
    }

    pub fn len(&self) -> usize {
        self.by_chunk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_chunk.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_chunks() {
        let mut registry = ChunkRegistry::new();
        let fourcc = FourCc(*b"a123");
        let handle = AssetHandle {
            context_index: 0,
            asset_index: 7,
        };
        registry.insert(fourcc, handle);
        registry.freeze();
        assert_eq!(registry.resolve(fourcc).unwrap(), handle);
    }

    #[test]
    fn unknown_chunk_is_an_error() {
        let mut registry = ChunkRegistry::new();
        registry.freeze();
        assert!(matches!(
            registry.resolve(FourCc(*b"a999")),
            Err(Error::UnresolvedChunk { .. })
        ));
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = ChunkRegistry::new();
        let fourcc = FourCc(*b"a123");
        registry.insert(
            fourcc,
            AssetHandle {
                context_index: 0,
                asset_index: 1,
            },
        );
        registry.insert(
            fourcc,
            AssetHandle {
                context_index: 0,
                asset_index: 2,
            },
        );
        registry.freeze();
        assert_eq!(registry.resolve(fourcc).unwrap().asset_index, 2);
    }
}
