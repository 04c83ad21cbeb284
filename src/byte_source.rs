// src/byte_source.rs
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

/// Trait alias for anything the reader can seek and read from.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Random-access byte provider backing one open TDMS file.
///
/// Constructed from a path (buffered or memory-mapped), an owned in-memory
/// buffer, or an externally-managed handle. Lives for the file's session;
/// `open()` in lazy mode keeps one around until `close()`, `read()` in eager
/// mode drops it once every channel is materialized.
pub enum ByteSource {
    File(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
    External(Box<dyn ReadSeek>),
    #[cfg(feature = "mmap")]
    Mmap(Cursor<Mmap>),
}

impl ByteSource {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(ByteSource::File(BufReader::with_capacity(1 << 16, file)))
    }

    #[cfg(feature = "mmap")]
    pub fn from_path_mmap(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(ByteSource::Mmap(Cursor::new(mmap)))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ByteSource::Memory(Cursor::new(bytes))
    }

    pub fn from_reader<R: ReadSeek + 'static>(reader: R) -> Self {
        ByteSource::External(Box::new(reader))
    }

    pub fn len(&mut self) -> Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(current))?;
        Ok(end)
    }

    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(buf)?;
        Ok(())
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            ByteSource::File(r) => r.read(buf),
            ByteSource::Memory(r) => r.read(buf),
            ByteSource::External(r) => r.read(buf),
            #[cfg(feature = "mmap")]
            ByteSource::Mmap(r) => r.read(buf),
        }
    }
}

impl Seek for ByteSource {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            ByteSource::File(r) => r.seek(pos),
            ByteSource::Memory(r) => r.seek(pos),
            ByteSource::External(r) => r.seek(pos),
            #[cfg(feature = "mmap")]
            ByteSource::Mmap(r) => r.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reports_length() {
        let mut src = ByteSource::from_bytes(vec![0u8; 128]);
        assert_eq!(src.len().unwrap(), 128);
    }

    #[test]
    fn read_exact_at_seeks_first() {
        let mut src = ByteSource::from_bytes(vec![1, 2, 3, 4, 5]);
        let mut buf = [0u8; 2];
        src.read_exact_at(3, &mut buf).unwrap();
        assert_eq!(buf, [4, 5]);
    }
}
