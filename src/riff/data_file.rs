use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::riff::SubFile;

/// Signature of the preamble carried by context (CXT) files.
const CONTEXT_SIGNATURE: [u8; 4] = *b"II\x00\x00";

/// A Media Station data file: an optional 16-byte preamble followed by one
/// or more RIFF subfiles.
///
/// Context files carry the preamble; system (STM) files do not.
#[derive(Debug, Clone, Copy)]
pub struct DataFile {
    /// Unknown field after the signature.
    pub unk1: u32,
    /// Declared number of subfiles in this file.
    pub subfile_count: u32,
    /// Declared total file size, including the preamble.
    pub file_size: u32,
    /// Whether the file contains nothing but the preamble. Some older
    /// titles ship such files; there is nothing further to read from them.
    pub header_only: bool,
}

impl DataFile {
    /// Validate the preamble at the cursor position. When the declared
    /// size equals the post-preamble offset the file is legitimately empty
    /// and no subfile may be read from it.
    pub fn open(c: &mut Cursor, has_preamble: bool) -> Result<Self> {
        if !has_preamble {
            return Ok(Self {
                unk1: 0,
                subfile_count: 0,
                file_size: 0,
                header_only: false,
            });
        }

        let offset = c.position();
        let signature = c.read_tag()?;
        if signature != CONTEXT_SIGNATURE {
            return Err(Error::InvalidSignature {
                offset,
                expected: CONTEXT_SIGNATURE,
                found: signature,
            });
        }
        let unk1 = c.read_u32()?;
        let subfile_count = c.read_u32()?;
        let file_size = c.read_u32()?;
        let header_only = c.position() == file_size as usize;

        Ok(Self {
            unk1,
            subfile_count,
            file_size,
            header_only,
        })
    }

    /// Open the next subfile, skipping the pad byte between records if the
    /// previous subfile ended on an odd offset.
    pub fn next_subfile(&self, c: &mut Cursor) -> Result<SubFile> {
        c.align_even()?;
        SubFile::open(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Writer;

    #[test]
    fn header_only_file_reads_zero_subfiles() {
        let mut w = Writer::new();
        w.write_tag(b"II\x00\x00");
        w.write_u32(0);
        w.write_u32(0);
        w.write_u32(16); // declared size == post-preamble offset
        let data = w.into_bytes();
        let mut c = Cursor::new(&data);
        let file = DataFile::open(&mut c, true).unwrap();
        assert!(file.header_only);
        assert_eq!(c.position(), 16);
    }

    #[test]
    fn bad_signature_is_fatal() {
        let mut w = Writer::new();
        w.write_tag(b"MM\x00\x00");
        w.write_u32(0);
        w.write_u32(0);
        w.write_u32(16);
        let data = w.into_bytes();
        let mut c = Cursor::new(&data);
        assert!(matches!(
            DataFile::open(&mut c, true),
            Err(Error::InvalidSignature { offset: 0, .. })
        ));
    }
}
