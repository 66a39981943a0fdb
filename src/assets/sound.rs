//! Sound assets. The engine stores audio as a series of raw chunks, each
//! decoded independently at playback time; this module collects the raw
//! chunks and leaves sample decoding to the caller.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::riff::{Chunk, SubFile};

/// How the audio samples are encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// Uncompressed signed 16-bit little-endian PCM.
    PcmS16Le,
    /// IMA ADPCM; each chunk must be decoded independently or the volume
    /// jumps about every 0.6 seconds.
    ImaAdpcm,
}

impl AudioEncoding {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x0010 => Some(Self::PcmS16Le),
            0x0004 => Some(Self::ImaAdpcm),
            _ => None,
        }
    }
}

/// The raw audio chunks for one sound asset.
#[derive(Debug, Clone, Default)]
pub struct Sound {
    pub encoding: Option<AudioEncoding>,
    chunks: Vec<Vec<u8>>,
}

impl Sound {
    pub fn new(encoding: Option<AudioEncoding>) -> Self {
        Self {
            encoding,
            chunks: Vec::new(),
        }
    }

    /// The raw chunks, in playback order.
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Read one audio chunk.
    pub fn read_chunk(&mut self, c: &mut Cursor, chunk: &Chunk) -> Result<()> {
        let samples = chunk.read(c, chunk.remaining(c))?;
        self.chunks.push(samples.to_vec());
        Ok(())
    }

    /// Read all the audio chunks in one subfile. Every chunk must carry
    /// the same identifier as the first.
    pub fn read_subfile(
        &mut self,
        c: &mut Cursor,
        subfile: &mut SubFile,
        first: Chunk,
        total_chunks: u32,
    ) -> Result<()> {
        let label = first.fourcc;
        self.read_chunk(c, &first)?;
        for _ in 1..total_chunks {
            let offset = c.position();
            let chunk = subfile.next_chunk(c)?;
            if chunk.fourcc != label {
                return Err(Error::UnexpectedValue {
                    offset,
                    context: "sound chunk label",
                    expected: label.to_string(),
                    found: chunk.fourcc.to_string(),
                });
            }
            self.read_chunk(c, &chunk)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_decodes_known_values_only() {
        assert_eq!(AudioEncoding::from_raw(0x0010), Some(AudioEncoding::PcmS16Le));
        assert_eq!(AudioEncoding::from_raw(0x0004), Some(AudioEncoding::ImaAdpcm));
        assert_eq!(AudioEncoding::from_raw(0x0005), None);
    }
}
